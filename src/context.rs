//! Explicit execution context for value expressions.
//!
//! Every place that needs to look at "the current record" gets its own
//! [`RecordContext`] passed in by value or reference. Menu items are printed
//! against their page and enrichers see one node at a time. Nothing is read
//! from ambient state, so two menus built side by side cannot observe each
//! other.
//!
//! ## Value expressions
//!
//! [`RecordContext::std_wrap`] evaluates a small mapping of instructions
//! against the context, always in this order:
//!
//! | Key | Effect |
//! |-----|--------|
//! | `value` | replace the content with a literal |
//! | `recordAsJson` | replace the content with the record, JSON-encoded |
//! | `field` | replace the content with a field, `a // b` falls back left to right |
//! | `data` | replace the content with `register:<name>` or `field:<name>` |
//! | `listNum` | pick one element of the (comma-separated) content |
//! | `trim` | trim surrounding whitespace |
//! | `encode` | JSON-encode the content as a string |
//! | `wrap` | `before|after` around the content |

use crate::placeholder;
use crate::types::flag_from_value;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A record's raw field values.
pub type Record = Map<String, Value>;

/// Register holding the 1-based position of the item being rendered
/// within its level.
pub const MENU_ITEM_COUNTER: &str = "count_menu_items";

/// One record plus the registers of whoever is evaluating against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordContext {
    table: String,
    data: Record,
    registers: BTreeMap<String, Value>,
}

impl RecordContext {
    pub fn new(table: impl Into<String>, data: Record) -> Self {
        Self {
            table: table.into(),
            data,
            registers: BTreeMap::new(),
        }
    }

    /// Context over a page record, the only record type menus deal with.
    pub fn page(data: Record) -> Self {
        Self::new("pages", data)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    /// A field rendered as text; `None` when the field is absent.
    pub fn field(&self, name: &str) -> Option<String> {
        self.data.get(name.trim()).map(value_to_string)
    }

    /// Resolve a `nav_title // title` style chain: the first field with
    /// non-blank content wins.
    pub fn field_chain(&self, chain: &str) -> Option<String> {
        chain
            .split("//")
            .filter_map(|name| self.field(name))
            .find(|value| !value.trim().is_empty())
    }

    pub fn register(&self, name: &str) -> Option<&Value> {
        self.registers.get(name)
    }

    pub fn set_register(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.registers.insert(name.into(), value.into());
    }

    /// Look up `register:<name>`, `field:<name>` or `table`.
    pub fn get_data(&self, key: &str) -> String {
        let key = key.trim();
        if let Some(name) = key.strip_prefix("register:") {
            return self
                .register(name.trim())
                .map(value_to_string)
                .unwrap_or_default();
        }
        if let Some(name) = key.strip_prefix("field:") {
            return self.field_chain(name).unwrap_or_default();
        }
        if key == "table" {
            return self.table.clone();
        }
        String::new()
    }

    /// Evaluate a value expression against `content`. See the module docs
    /// for the supported keys.
    pub fn std_wrap(&self, content: &str, conf: &Map<String, Value>) -> String {
        let mut content = content.to_string();

        if let Some(value) = conf.get("value") {
            content = value_to_string(value);
        }
        if conf.get("recordAsJson").is_some_and(is_enabled) {
            content = placeholder::json_encode(&Value::Object(self.data.clone()));
        }
        if let Some(chain) = conf.get("field").and_then(Value::as_str) {
            content = self.field_chain(chain).unwrap_or_default();
        }
        if let Some(key) = conf.get("data").and_then(Value::as_str) {
            content = self.get_data(key);
        }
        if let Some(list_num) = conf.get("listNum") {
            content = self.list_num(&content, list_num);
        }
        if conf.get("trim").is_some_and(is_enabled) {
            content = content.trim().to_string();
        }
        if conf.get("encode").is_some_and(is_enabled) {
            content = placeholder::encode_str(&content);
        }
        if let Some(wrap) = conf.get("wrap").and_then(Value::as_str) {
            content = apply_wrap(&content, wrap);
        }
        content
    }

    fn list_num(&self, content: &str, conf: &Value) -> String {
        let (expression, split_char) = match conf {
            Value::Object(map) => {
                let base = map.get("expression").map(value_to_string).unwrap_or_default();
                let expression = match map.get("stdWrap").and_then(Value::as_object) {
                    Some(wrap_conf) => self.std_wrap(&base, wrap_conf),
                    None => base,
                };
                let split_char = map
                    .get("splitChar")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(",")
                    .to_string();
                (expression, split_char)
            }
            other => (value_to_string(other), ",".to_string()),
        };

        let items: Vec<&str> = content.split(split_char.as_str()).collect();
        parse_list_index(&expression, items.len())
            .and_then(|index| items.get(index))
            .map(|item| item.trim().to_string())
            .unwrap_or_default()
    }
}

/// Render a raw field value the way templates see it.
///
/// Booleans follow the `1` / empty convention of the record store.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Apply a `before|after` wrap. A wrap without `|` is prepended.
pub fn apply_wrap(content: &str, wrap: &str) -> String {
    match wrap.split_once('|') {
        Some((before, after)) => format!("{before}{content}{after}"),
        None => format!("{wrap}{content}"),
    }
}

/// Evaluate a list index expression: an integer, `last`, or a chain of
/// `+`/`-` terms (`3-1`, `last-1`). Returns `None` when the result falls
/// outside `0..len`.
pub fn parse_list_index(expression: &str, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let expression = expression.trim().replace("last", &last.to_string());
    if expression.is_empty() {
        return Some(0);
    }

    let mut total: i64 = 0;
    let mut sign: i64 = 1;
    let mut term = String::new();
    for c in expression.chars().chain(std::iter::once('+')) {
        match c {
            '+' | '-' => {
                let term_value = if term.trim().is_empty() {
                    0
                } else {
                    term.trim().parse::<i64>().ok()?
                };
                total += sign * term_value;
                sign = if c == '-' { -1 } else { 1 };
                term.clear();
            }
            _ => term.push(c),
        }
    }

    usize::try_from(total).ok().filter(|&index| index <= last)
}

fn is_enabled(value: &Value) -> bool {
    flag_from_value(value).unwrap_or(false)
}
