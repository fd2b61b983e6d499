//! CSS emission for generated styles (e.g. per-element background images).
//!
//! Styles either go inline, right where the element is rendered, or into a
//! named block the page collects for its `<head>`. Block names derive from
//! the content hash, so identical CSS always lands in the same block and a
//! page registering it twice keeps one copy.

use maud::{Markup, PreEscaped, html};
use sha2::{Digest, Sha256};

/// Prefix of header block names.
pub const BLOCK_PREFIX: &str = "menutree_";

/// Where a piece of CSS ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssOutput {
    /// Markup to place in the body.
    Inline(String),
    /// A block to register with the page header; nothing goes in the body.
    Header { name: String, css: String },
}

impl CssOutput {
    /// What to print where the CSS was requested.
    pub fn body(&self) -> &str {
        match self {
            CssOutput::Inline(markup) => markup,
            CssOutput::Header { .. } => "",
        }
    }
}

/// Route `css` inline or into a header block.
pub fn render_css(css: &str, inline: bool) -> CssOutput {
    if inline {
        CssOutput::Inline(style_tag(css).into_string())
    } else {
        CssOutput::Header {
            name: block_name(css),
            css: css.to_string(),
        }
    }
}

fn style_tag(css: &str) -> Markup {
    html! {
        style { (PreEscaped(css)) }
    }
}

/// Stable header block name for `css`.
pub fn block_name(css: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(css.as_bytes()));
    format!("{BLOCK_PREFIX}{}", &digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_css_is_wrapped_in_style_tag() {
        let css = ".hero > .bg { background-image: url('a.jpg'); }";
        let out = render_css(css, true);
        assert_eq!(
            out,
            CssOutput::Inline(format!("<style>{css}</style>"))
        );
        assert_eq!(out.body(), format!("<style>{css}</style>"));
    }

    #[test]
    fn header_css_gets_a_named_block() {
        let out = render_css("body { margin: 0 }", false);
        match &out {
            CssOutput::Header { name, css } => {
                assert!(name.starts_with(BLOCK_PREFIX));
                assert_eq!(name.len(), BLOCK_PREFIX.len() + 16);
                assert_eq!(css, "body { margin: 0 }");
            }
            other => panic!("expected header block, got {other:?}"),
        }
        assert_eq!(out.body(), "");
    }

    #[test]
    fn block_names_follow_content() {
        assert_eq!(block_name("a { }"), block_name("a { }"));
        assert_ne!(block_name("a { }"), block_name("b { }"));
    }
}
