//! Menu options: defaults, coercion, the renderer allow-list, and options files.
//!
//! A caller hands the menu processor one flat option mapping. Five scalar
//! options are ours ([`MenuOptions`]); everything else is meant for the
//! renderer and must pass [`filter_renderer_options`] first. Keys the
//! renderer does not know are dropped silently, so a typo never turns
//! into renderer behaviour nobody asked for.
//!
//! ## Key conventions
//!
//! Option keys use the renderer's vocabulary: camelCase, and a key ending in
//! `.` carries the sub-options of the key without the dot (`special` holds
//! the selection mode, `special.` holds its `value`, ...). Any scalar option
//! may be computed: `levels.` next to `levels` is a value expression
//! evaluated against the calling record (see [`crate::context`]).
//!
//! ## Options file
//!
//! The CLI reads a TOML file; all sections are optional:
//!
//! ```toml
//! [menu]
//! levels = 2                  # Depth of the menu (1-20)
//! expandAll = 1               # 0 = only expand the active branch
//! includeSpacer = 0           # 1 = keep spacer pages
//! as = "menu"                 # Output slot name
//! titleField = "nav_title // title"
//! special = "list"            # Renderer options pass the allow-list
//! "special." = { value = "2,3" }
//!
//! [menu.dataProcessing.10]    # Enrichment pipeline (see `enrich`)
//! processor = "files"
//! fieldName = "media"
//!
//! [grid]                      # Image sizing (see `imaging`)
//! columns = 12
//! gutter = 30
//! ```
//!
//! User files are merged key-by-key over the stock defaults with
//! [`merge_value`], the same deep merge the level builder uses for state
//! templates. Unknown keys in `[grid]` are rejected; unknown keys in
//! `[menu]` are the allow-list's business.

use crate::context::{RecordContext, value_to_string};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Options error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Hard ceiling for the level count. Menu depth, and with it the recursion
/// depth of rendering and enrichment, never exceeds this.
pub const MAX_LEVELS: u32 = 20;

pub const DEFAULT_TITLE_FIELD: &str = "nav_title // title";
pub const DEFAULT_SLOT: &str = "menu";

/// Option keys forwarded to the renderer. Everything else stays here.
pub const ALLOWED_KEYS: &[&str] = &[
    "cache_period",
    "entryLevel",
    "entryLevel.",
    "special",
    "special.",
    "minItems",
    "minItems.",
    "maxItems",
    "maxItems.",
    "begin",
    "begin.",
    "excludeUidList",
    "excludeUidList.",
    "excludeDoktypes",
    "includeNotInMenu",
    "alwaysActivePIDlist",
    "alwaysActivePIDlist.",
    "protectLvar",
    "if",
    "if.",
];

/// The five options the menu processor reads itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOptions {
    /// Number of menu levels, `1..=MAX_LEVELS`.
    pub levels: u32,
    /// Render every submenu, not just the active branch.
    pub expand_all: bool,
    /// Keep spacer pages in the menu.
    pub include_spacer: bool,
    /// Output slot the finished menu is published under.
    pub slot: String,
    /// Field chain used for the node title.
    pub title_field: String,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            levels: 1,
            expand_all: true,
            include_spacer: false,
            slot: DEFAULT_SLOT.to_string(),
            title_field: DEFAULT_TITLE_FIELD.to_string(),
        }
    }
}

impl MenuOptions {
    /// Read the scalar options, falling back to defaults for absent keys.
    ///
    /// A level count of zero (or anything that does not coerce to a positive
    /// integer) becomes 1; a count above [`MAX_LEVELS`] is rejected.
    pub fn from_options(options: &Map<String, Value>, ctx: &RecordContext) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let levels = option_value(options, "levels", ctx)
            .map(|v| coerce_int(&v))
            .filter(|&n| n > 0)
            .unwrap_or(1);
        if levels > i64::from(MAX_LEVELS) {
            return Err(ConfigError::Validation(format!(
                "levels must be at most {MAX_LEVELS}, got {levels}"
            )));
        }

        let expand_all = option_value(options, "expandAll", ctx)
            .map(|v| coerce_int(&v) != 0)
            .unwrap_or(defaults.expand_all);
        let include_spacer = option_value(options, "includeSpacer", ctx)
            .map(|v| coerce_int(&v) != 0)
            .unwrap_or(defaults.include_spacer);
        let slot = option_value(options, "as", ctx)
            .map(|v| value_to_string(&v))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.slot);
        let title_field = option_value(options, "titleField", ctx)
            .map(|v| value_to_string(&v))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.title_field);

        Ok(Self {
            levels: levels as u32,
            expand_all,
            include_spacer,
            slot,
            title_field,
        })
    }
}

/// Read one option, evaluating its `key.` expression when present.
pub fn option_value(options: &Map<String, Value>, key: &str, ctx: &RecordContext) -> Option<Value> {
    let value = options.get(key);
    match options.get(&format!("{key}.")).and_then(Value::as_object) {
        Some(expression) => {
            let content = value.map(value_to_string).unwrap_or_default();
            Some(Value::String(ctx.std_wrap(&content, expression)))
        }
        None => value.cloned(),
    }
}

/// Coerce an option value to an integer.
///
/// Numbers are truncated, strings contribute their leading integer
/// (`"3 levels"` → 3, `"abc"` → 0), booleans count as 0/1.
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse().unwrap_or(0)
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Copy the allow-listed renderer options out of `options`.
///
/// A computed `special.value.` expression is evaluated here, once, against
/// `ctx`, and replaced by its literal result so the renderer never
/// evaluates it a second time.
pub fn filter_renderer_options(options: &Map<String, Value>, ctx: &RecordContext) -> Map<String, Value> {
    let mut filtered = Map::new();
    for (key, value) in options {
        if ALLOWED_KEYS.contains(&key.as_str()) {
            filtered.insert(key.clone(), value.clone());
        } else {
            tracing::trace!(key = %key, "option not forwarded to the renderer");
        }
    }

    if let Some(Value::Object(special)) = filtered.get_mut("special.") {
        if let Some(Value::Object(expression)) = special.get("value.").cloned() {
            let current = special.get("value").map(value_to_string).unwrap_or_default();
            let evaluated = ctx.std_wrap(&current, &expression);
            special.insert("value".to_string(), Value::String(evaluated));
            special.remove("value.");
        }
    }

    filtered
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Objects are merged key-by-key (overlay keys override base keys).
/// - Any other overlay value replaces the base value entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_value(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => merge_value(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

// =============================================================================
// Grid settings
// =============================================================================

/// Container widths per breakpoint, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerWidths {
    pub xs: f64,
    pub sm: f64,
    pub md: f64,
    pub lg: f64,
    pub xl: f64,
}

impl Default for ContainerWidths {
    fn default() -> Self {
        Self {
            xs: 480.0,
            sm: 750.0,
            md: 970.0,
            lg: 1170.0,
            xl: 1170.0,
        }
    }
}

/// Whether the layout is fluid at a breakpoint, i.e. an image may grow up
/// to the next breakpoint's container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FluidBreakpoints {
    pub xs: bool,
    pub sm: bool,
    pub md: bool,
    pub lg: bool,
}

impl Default for FluidBreakpoints {
    fn default() -> Self {
        Self {
            xs: true,
            sm: false,
            md: false,
            lg: false,
        }
    }
}

/// Layout grid used for responsive image sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSettings {
    pub columns: u32,
    pub gutter: f64,
    pub container: ContainerWidths,
    pub fluid: FluidBreakpoints,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: 12,
            gutter: 30.0,
            container: ContainerWidths::default(),
            fluid: FluidBreakpoints::default(),
        }
    }
}

// =============================================================================
// Options file loading
// =============================================================================

/// Contents of an options file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsFile {
    /// Menu option mapping, exactly as handed to the menu processor.
    pub menu: Map<String, Value>,
    pub grid: GridSettings,
}

impl Default for OptionsFile {
    fn default() -> Self {
        let defaults = MenuOptions::default();
        let mut menu = Map::new();
        menu.insert("levels".into(), Value::from(defaults.levels));
        menu.insert("expandAll".into(), Value::from(u8::from(defaults.expand_all)));
        menu.insert("includeSpacer".into(), Value::from(u8::from(defaults.include_spacer)));
        menu.insert("as".into(), Value::from(defaults.slot));
        menu.insert("titleField".into(), Value::from(defaults.title_field));
        Self {
            menu,
            grid: GridSettings::default(),
        }
    }
}

impl OptionsFile {
    /// Validate values that deserialization alone cannot catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns == 0 {
            return Err(ConfigError::Validation(
                "grid.columns must be non-zero".into(),
            ));
        }
        if self.grid.gutter < 0.0 {
            return Err(ConfigError::Validation(
                "grid.gutter must not be negative".into(),
            ));
        }
        MenuOptions::from_options(&self.menu, &RecordContext::default())?;
        Ok(())
    }
}

/// The stock defaults as a JSON value, the base layer for merging.
pub fn stock_defaults_value() -> Value {
    serde_json::to_value(OptionsFile::default()).unwrap_or(Value::Null)
}

/// Load an options file as a raw JSON value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_options(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(serde_json::to_value(value)?))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_options(base: Value, overlay: Option<Value>) -> Result<OptionsFile, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_value(base, ov),
        None => base,
    };
    let options: OptionsFile = serde_json::from_value(merged)?;
    options.validate()?;
    Ok(options)
}

/// Load an options file merged over the stock defaults.
pub fn load_options(path: &Path) -> Result<OptionsFile, ConfigError> {
    resolve_options(stock_defaults_value(), load_raw_options(path)?)
}

/// Returns a fully-commented stock options file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# menutree options
# ================
# All settings are optional. Values shown below are the defaults.

# ---------------------------------------------------------------------------
# Menu
# ---------------------------------------------------------------------------
[menu]
# Number of menu levels (1-20). 0 is treated as 1.
levels = 1

# 1 = render every submenu, 0 = only the submenu of the active page.
expandAll = 1

# 1 = keep spacer pages (rendered with spacer = true).
includeSpacer = 0

# Name of the output slot the finished menu is published under.
as = "menu"

# Field(s) used for the title; "a // b" takes the first non-empty one.
titleField = "nav_title // title"

# Renderer options. Only these keys are forwarded, anything else is
# dropped: cache_period, entryLevel, special, minItems, maxItems, begin,
# excludeUidList, excludeDoktypes, includeNotInMenu, alwaysActivePIDlist,
# protectLvar, if (plus their "key." sub-options).
#
# entryLevel = 0
# special = "list"                      # list | directory | language
# "special." = { value = "2,3" }
# excludeUidList = "9"
# excludeDoktypes = "254"
# includeNotInMenu = 0
# begin = 1
# maxItems = 10

# Enrichment applied to every node, children before parents.
# [menu.dataProcessing.10]
# processor = "files"
# fieldName = "media"
# as = "files"
# baseUrl = "/fileadmin/"

# ---------------------------------------------------------------------------
# Grid (responsive image sizing)
# ---------------------------------------------------------------------------
[grid]
columns = 12
gutter = 30.0

# Container width per breakpoint, in pixels.
[grid.container]
xs = 480.0
sm = 750.0
md = 970.0
lg = 1170.0
xl = 1170.0

# Fluid breakpoints may grow up to the next breakpoint's container.
[grid.fluid]
xs = true
sm = false
md = false
lg = false
"##
}
