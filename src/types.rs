//! Shared types passed between the pipeline stages.
//!
//! [`MenuNode`] is what the decoder produces, what enrichers receive and
//! return, and what finally lands in the caller's output slot. The renderer
//! emits its flags as `0`/`1` (numbers or strings); they are decoded leniently
//! and always serialized back as booleans for the presentation layer.
//!
//! [`PageRecord`] is the input side: one page of the tree the reference
//! renderer walks.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the menu tree, corresponding to one page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub current: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub spacer: bool,
    /// Only emitted by language menus.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub available: Option<bool>,
    #[serde(
        rename = "languageUid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub language_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
    /// The underlying page record.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Whatever enrichers attach to the node (`files`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuNode {
    /// A bare node with the given title and link, all flags off.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            target: String::new(),
            active: false,
            current: false,
            spacer: false,
            available: None,
            language_uid: None,
            children: Vec::new(),
            data: Map::new(),
            extra: Map::new(),
        }
    }

    /// Depth of the subtree rooted here (a leaf has depth 1).
    pub fn depth(&self) -> u32 {
        1 + self.children.iter().map(MenuNode::depth).max().unwrap_or(0)
    }
}

/// The late-bound values of a rendered item: resolved only after the
/// renderer has chosen the item's state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub href: String,
    #[serde(default)]
    pub target: String,
}

impl LinkTarget {
    pub fn new(href: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            target: target.into(),
        }
    }
}

/// Page type of regular pages.
pub const DOKTYPE_DEFAULT: u32 = 1;
/// Page type of spacers: menu separators without a target of their own.
pub const DOKTYPE_SPACER: u32 = 199;

/// One page of the page tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub uid: u64,
    #[serde(default = "default_doktype")]
    pub doktype: u32,
    /// Hidden from menus unless `includeNotInMenu` is set.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub nav_hide: bool,
    /// The remaining record fields (`title`, `nav_title`, `slug`, ...).
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Language ids this page is translated into. The default language 0
    /// is always available.
    #[serde(default)]
    pub languages: Vec<u32>,
    #[serde(default)]
    pub children: Vec<PageRecord>,
}

fn default_doktype() -> u32 {
    DOKTYPE_DEFAULT
}

impl PageRecord {
    pub fn new(uid: u64, title: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("title".into(), Value::String(title.into()));
        Self {
            uid,
            doktype: DOKTYPE_DEFAULT,
            nav_hide: false,
            fields,
            languages: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_spacer(&self) -> bool {
        self.doktype == DOKTYPE_SPACER
    }

    pub fn is_available_in(&self, language: u32) -> bool {
        language == 0 || self.languages.contains(&language)
    }

    /// The full record row: the free-form fields plus the structural ones.
    pub fn record(&self) -> Map<String, Value> {
        let mut record = self.fields.clone();
        record.insert("uid".into(), Value::from(self.uid));
        record.insert("doktype".into(), Value::from(self.doktype));
        record.insert("nav_hide".into(), Value::from(u8::from(self.nav_hide)));
        record
    }

    /// Find a page anywhere below (and including) this one.
    pub fn find(&self, uid: u64) -> Option<&PageRecord> {
        if self.uid == uid {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(uid))
    }
}

/// Find a page in a forest of page trees.
pub fn find_page(pages: &[PageRecord], uid: u64) -> Option<&PageRecord> {
    pages.iter().find_map(|page| page.find(uid))
}

/// The uids from a top-level page down to `uid`, inclusive.
pub fn rootline(pages: &[PageRecord], uid: u64) -> Option<Vec<u64>> {
    for page in pages {
        if page.uid == uid {
            return Some(vec![uid]);
        }
        if let Some(mut tail) = rootline(&page.children, uid) {
            tail.insert(0, page.uid);
            return Some(tail);
        }
    }
    None
}

/// Interpret a renderer-emitted flag (`1`, `"0"`, `true`, ...).
///
/// Returns `None` for values that cannot be read as a flag (arrays, objects,
/// non-numeric strings).
pub fn flag_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim() {
            "" | "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            other => other.parse::<f64>().ok().map(|f| f != 0.0),
        },
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    flag_from_value(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a 0/1 flag, got {value}")))
}

fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_flag(deserializer).map(Some)
}
