//! Decoding the renderer's text into [`MenuNode`] trees.

use crate::types::MenuNode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed menu text: {0}")]
    Json(#[from] serde_json::Error),
    #[error("menu is {depth} levels deep, configured for at most {max}")]
    TooDeep { depth: u32, max: u32 },
}

/// True for renderer results that mean "no menu": nothing, blank text, `0`.
pub fn is_empty_render(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(text) => {
            let text = text.trim();
            text.is_empty() || text == "0"
        }
    }
}

/// Decode the renderer's output.
///
/// Returns `Ok(None)` for an empty result. Non-empty text must be a JSON
/// array of nodes no deeper than `max_depth`.
pub fn decode(raw: Option<&str>, max_depth: u32) -> Result<Option<Vec<MenuNode>>, DecodeError> {
    let text = match raw {
        Some(text) if !is_empty_render(raw) => text,
        _ => return Ok(None),
    };

    let nodes: Vec<MenuNode> = serde_json::from_str(text)?;
    let depth = nodes.iter().map(MenuNode::depth).max().unwrap_or(0);
    if depth > max_depth {
        return Err(DecodeError::TooDeep {
            depth,
            max: max_depth,
        });
    }
    Ok(Some(nodes))
}
