//! Sentinel tokens and the JSON encoding used to fill them.
//!
//! A menu item's template is fixed before the renderer knows which state the
//! item is in, but its link and target are only known afterwards, and they
//! may contain characters that would break the surrounding JSON. The template
//! therefore carries two reserved tokens, [`LINK_PLACEHOLDER`] and
//! [`TARGET_PLACEHOLDER`], and the renderer hands every rendered item back
//! through [`replace_placeholders`], which swaps each token for the
//! JSON-encoded value in a single literal replacement pass.
//!
//! ## Encoding
//!
//! [`json_encode`] produces standard JSON with two differences from
//! `serde_json::to_string`:
//!
//! - `<`, `>`, `'`, `"` and `&` inside strings become `\u003C`, `\u003E`,
//!   `\u0027`, `\u0022` and `\u0026`, so an encoded value can be dropped into
//!   HTML or a quoted attribute as-is.
//! - Non-ASCII text stays literal UTF-8; it is never turned into `\uXXXX`.

use crate::types::LinkTarget;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{CharEscape, CompactFormatter, Formatter, Serializer};
use std::io;

pub const LINK_PLACEHOLDER: &str = "###LINKPLACEHOLDER###";
pub const TARGET_PLACEHOLDER: &str = "###TARGETPLACEHOLDER###";

/// Compact JSON formatter that hex-escapes HTML-significant characters.
struct HexEscapeFormatter;

impl Formatter for HexEscapeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped = match c {
                '<' => "\\u003C",
                '>' => "\\u003E",
                '\'' => "\\u0027",
                '&' => "\\u0026",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        match char_escape {
            CharEscape::Quote => writer.write_all(b"\\u0022"),
            other => CompactFormatter.write_char_escape(writer, other),
        }
    }
}

/// JSON-encode any value with the escaping rules described in the module docs.
pub fn json_encode(value: &Value) -> String {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, HexEscapeFormatter);
    // Serializing a `Value` into memory cannot fail: keys are always strings
    // and writes to a Vec are infallible.
    if value.serialize(&mut serializer).is_err() {
        return "null".to_string();
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// JSON-encode a single string, quotes included.
pub fn encode_str(value: &str) -> String {
    json_encode(&Value::String(value.to_string()))
}

/// Whether `text` carries either sentinel.
pub fn has_placeholder(text: &str) -> bool {
    text.contains(LINK_PLACEHOLDER) || text.contains(TARGET_PLACEHOLDER)
}

/// Substitute both sentinels in a rendered item with the encoded link values.
///
/// A sentinel that already sits between double quotes is replaced together
/// with those quotes, so templates may carry either `"link":###LINK…###` or
/// `"link":"###LINK…###"` and still produce valid JSON. Every other byte of
/// `fragment` is left untouched.
///
/// Every occurrence is replaced, so `fragment` must be template text. Record
/// content that may itself contain a sentinel has to be kept out of it.
pub fn replace_placeholders(fragment: &str, link: &LinkTarget) -> String {
    let href = encode_str(&link.href);
    let target = encode_str(&link.target);
    let fragment = replace_token(fragment, LINK_PLACEHOLDER, &href);
    replace_token(&fragment, TARGET_PLACEHOLDER, &target)
}

fn replace_token(fragment: &str, token: &str, encoded: &str) -> String {
    let quoted = format!("\"{token}\"");
    fragment.replace(&quoted, encoded).replace(token, encoded)
}
