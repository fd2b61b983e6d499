//! Per-level rendering configuration.
//!
//! The renderer is told, for every depth `1..=N`, how to print one item in
//! each navigational state. All states share one item template: a mapping
//! of numbered *parts* that, concatenated in key order, form the body of a
//! JSON object:
//!
//! ```text
//! "data":{…record…},"title":"Home","link":###LINK…###,"target":###TARGET…###,
//! "active":0,"current":0,"spacer":0
//! ```
//!
//! A state is the base template with some of the `0`s flipped to `1`:
//!
//! | State | Derived from | Override |
//! |-------|--------------|----------|
//! | `NO` | base | |
//! | `SPC` | `NO` | spacer = 1 (only with `includeSpacer`) |
//! | `IFSUB` | `NO` | |
//! | `ACT` | `NO` | active = 1 |
//! | `ACTIFSUB` | `ACT` | |
//! | `CUR` | `ACT` | current = 1 |
//! | `CURIFSUB` | `CUR` | |
//! | `USERDEF1` | `NO` | available = 0 (language menus) |
//! | `USERDEF2` | `ACT` | available = 0 (language menus) |
//!
//! Derivation is a deep merge of a small overlay onto the parent state
//! ([`merge_value`]), so a change to the base template shows up in every
//! state.
//!
//! The item's link and target are not known until the renderer has chosen
//! the state, so the template carries sentinels instead and the renderer
//! hands each sentinel-bearing part to [`LevelConfig::process_item`].

use crate::config::{MenuOptions, merge_value};
use crate::context::{MENU_ITEM_COUNTER, value_to_string};
use crate::placeholder::{LINK_PLACEHOLDER, TARGET_PLACEHOLDER, replace_placeholders};
use crate::types::LinkTarget;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Wrap around the whole menu: a JSON array of item objects.
pub const MENU_WRAP: &str = "[|]";

/// Per-item wrap with option-split: every item becomes `{…}` followed by a
/// comma, except the last.
pub const WRAP_ITEM_AND_SUB: &str = "{|}, |*| {|}, |*| {|}";

/// Wrap around a nested level, attached to the parent item's object.
pub const CHILDREN_WRAP: &str = r#","children": [|]"#;

/// Selection mode that produces one item per language.
pub const LANGUAGE_MODE: &str = "language";

/// Navigational state of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ItemState {
    #[serde(rename = "NO")]
    Normal,
    #[serde(rename = "SPC")]
    Spacer,
    #[serde(rename = "IFSUB")]
    HasSubmenu,
    #[serde(rename = "ACT")]
    Active,
    #[serde(rename = "ACTIFSUB")]
    ActiveWithSubmenu,
    #[serde(rename = "CUR")]
    Current,
    #[serde(rename = "CURIFSUB")]
    CurrentWithSubmenu,
    /// Language not available for the current page.
    #[serde(rename = "USERDEF1")]
    Unavailable,
    /// Active language not available for the current page.
    #[serde(rename = "USERDEF2")]
    UnavailableActive,
}

impl ItemState {
    pub const ALL: [ItemState; 9] = [
        ItemState::Normal,
        ItemState::Spacer,
        ItemState::HasSubmenu,
        ItemState::Active,
        ItemState::ActiveWithSubmenu,
        ItemState::Current,
        ItemState::CurrentWithSubmenu,
        ItemState::Unavailable,
        ItemState::UnavailableActive,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            ItemState::Normal => "NO",
            ItemState::Spacer => "SPC",
            ItemState::HasSubmenu => "IFSUB",
            ItemState::Active => "ACT",
            ItemState::ActiveWithSubmenu => "ACTIFSUB",
            ItemState::Current => "CUR",
            ItemState::CurrentWithSubmenu => "CURIFSUB",
            ItemState::Unavailable => "USERDEF1",
            ItemState::UnavailableActive => "USERDEF2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }
}

/// Rendering instructions for one depth of the menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelConfig {
    /// 1-based depth.
    pub depth: u32,
    /// Render sub-menus of inactive items too.
    pub expand_all: bool,
    /// Wrap around the whole level, `None` for the top level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<String>,
    pub states: BTreeMap<ItemState, Value>,
}

impl LevelConfig {
    pub fn state(&self, state: ItemState) -> Option<&Value> {
        self.states.get(&state)
    }

    /// The template for `state`, or the `NO` template when the level does
    /// not define that state.
    pub fn template_for(&self, state: ItemState) -> Option<(ItemState, &Value)> {
        self.states
            .get(&state)
            .map(|template| (state, template))
            .or_else(|| {
                self.states
                    .get(&ItemState::Normal)
                    .map(|template| (ItemState::Normal, template))
            })
    }

    /// Post-process one printed item: substitute the link and target
    /// sentinels with the item's encoded values.
    pub fn process_item(&self, fragment: &str, link: &LinkTarget) -> String {
        replace_placeholders(fragment, link)
    }
}

/// Everything the renderer needs: menu wrap, allow-listed options, levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuConfiguration {
    pub wrap: String,
    pub options: Map<String, Value>,
    pub levels: Vec<LevelConfig>,
}

impl MenuConfiguration {
    /// The configuration for a 1-based depth.
    pub fn level(&self, depth: u32) -> Option<&LevelConfig> {
        let index = usize::try_from(depth).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }

    /// The `special` selection mode, if any.
    pub fn special(&self) -> Option<&str> {
        special_mode(&self.options)
    }

    /// The literal `special.value`, empty when unset.
    pub fn special_value(&self) -> String {
        special_value(&self.options)
    }

    pub fn is_language_menu(&self) -> bool {
        self.special() == Some(LANGUAGE_MODE)
    }
}

fn special_mode(options: &Map<String, Value>) -> Option<&str> {
    options.get("special").and_then(Value::as_str).map(str::trim)
}

fn special_value(options: &Map<String, Value>) -> String {
    options
        .get("special.")
        .and_then(|special| special.get("value"))
        .map(value_to_string)
        .unwrap_or_default()
}

/// The item template shared by every state.
pub fn base_template(title_field: &str) -> Value {
    json!({
        "doNotLinkIt": true,
        "wrapItemAndSub": WRAP_ITEM_AND_SUB,
        "parts": {
            "10": {"recordAsJson": true, "wrap": r#""data":|"#},
            "20": {"field": title_field, "trim": true, "encode": true, "wrap": r#","title":|"#},
            "21": {"value": LINK_PLACEHOLDER, "wrap": r#","link":|"#},
            "22": {"value": TARGET_PLACEHOLDER, "wrap": r#","target":|"#},
            "30": {"value": "0", "wrap": r#","active":|"#},
            "40": {"value": "0", "wrap": r#","current":|"#},
            "50": {"value": "0", "wrap": r#","spacer":|"#}
        }
    })
}

/// Extra parts for language menus. `languages` is the comma-separated list
/// of language ids the menu iterates; the item counter picks the entry for
/// each item.
pub fn language_parts(languages: &str) -> Value {
    json!({
        "parts": {
            "60": {"value": "1", "wrap": r#","available":|"#},
            "70": {
                "value": languages,
                "listNum": {
                    "stdWrap": {"data": format!("register:{MENU_ITEM_COUNTER}"), "wrap": "|-1"},
                    "splitChar": ","
                },
                "wrap": r#","languageUid":"|""#
            }
        }
    })
}

fn part_override(part: &str, value: &str) -> Value {
    json!({"parts": {part: {"value": value}}})
}

/// Builds the [`MenuConfiguration`] for one invocation.
#[derive(Debug, Clone)]
pub struct LevelConfigBuilder {
    levels: u32,
    expand_all: bool,
    include_spacer: bool,
    title_field: String,
    languages: Option<String>,
}

impl LevelConfigBuilder {
    pub fn new(options: &MenuOptions) -> Self {
        Self {
            levels: options.levels.max(1),
            expand_all: options.expand_all,
            include_spacer: options.include_spacer,
            title_field: options.title_field.clone(),
            languages: None,
        }
    }

    /// Switch to language mode, iterating the given language list.
    pub fn languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = Some(languages.into());
        self
    }

    /// The `NO` template: base shape, title field and language parts applied.
    pub fn item_template(&self) -> Value {
        let template = base_template(&self.title_field);
        match &self.languages {
            Some(languages) => merge_value(template, language_parts(languages)),
            None => template,
        }
    }

    /// All state templates for one level.
    pub fn states(&self) -> BTreeMap<ItemState, Value> {
        let normal = self.item_template();
        let active = merge_value(normal.clone(), part_override("30", "1"));
        let current = merge_value(active.clone(), part_override("40", "1"));

        let mut states = BTreeMap::new();
        if self.include_spacer {
            states.insert(
                ItemState::Spacer,
                merge_value(normal.clone(), part_override("50", "1")),
            );
        }
        states.insert(ItemState::HasSubmenu, normal.clone());
        states.insert(ItemState::ActiveWithSubmenu, active.clone());
        states.insert(ItemState::CurrentWithSubmenu, current.clone());
        states.insert(ItemState::Current, current);
        if self.languages.is_some() {
            states.insert(
                ItemState::Unavailable,
                merge_value(normal.clone(), part_override("60", "0")),
            );
            states.insert(
                ItemState::UnavailableActive,
                merge_value(active.clone(), part_override("60", "0")),
            );
        }
        states.insert(ItemState::Active, active);
        states.insert(ItemState::Normal, normal);
        states
    }

    pub fn build_level(&self, depth: u32) -> LevelConfig {
        LevelConfig {
            depth,
            expand_all: self.expand_all,
            wrap: (depth > 1).then(|| CHILDREN_WRAP.to_string()),
            states: self.states(),
        }
    }

    pub fn build(&self, options: Map<String, Value>) -> MenuConfiguration {
        let levels = (1..=self.levels).map(|depth| self.build_level(depth)).collect();
        MenuConfiguration {
            wrap: MENU_WRAP.to_string(),
            options,
            levels,
        }
    }
}

/// Build the complete configuration from the menu options and the
/// already allow-listed renderer options. Language mode is switched on by
/// `special = language`, using `special.value` as the language list.
pub fn build_configuration(options: &MenuOptions, renderer_options: Map<String, Value>) -> MenuConfiguration {
    let mut builder = LevelConfigBuilder::new(options);
    if special_mode(&renderer_options) == Some(LANGUAGE_MODE) {
        builder = builder.languages(special_value(&renderer_options));
    }
    builder.build(renderer_options)
}
