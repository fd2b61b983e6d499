//! # menutree
//!
//! Builds nested JSON menu trees from a hierarchy of page records, runs a
//! configurable chain of enrichers over every node, and publishes the result
//! under a named slot of the caller's data.
//!
//! # Architecture: Render, Decode, Enrich
//!
//! The processor does not walk the page tree itself. It hands a level
//! configuration to a [`menu::MenuRenderer`], which prints each menu item as
//! a JSON fragment. The text is then decoded into typed nodes and enriched
//! bottom-up:
//!
//! ```text
//! 1. Configure  options   →  MenuConfiguration   (allow-list + per-level templates)
//! 2. Render     config    →  JSON text           (renderer fills the templates)
//! 3. Decode     text      →  Vec<MenuNode>       (lenient flags, bounded depth)
//! 4. Enrich     nodes     →  Vec<MenuNode>       (children before parents)
//! 5. Publish    nodes     →  data[slot]
//! ```
//!
//! Keeping the renderer behind a trait means the same orchestration runs over
//! any page source. [`render::PageTreeRenderer`] is the in-memory one the CLI
//! and the tests use.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Option allow-list, coercion and defaults, TOML options files, deep merge, grid settings |
//! | [`context`] | Explicit execution context: record data, registers, value expressions |
//! | [`placeholder`] | Link/target sentinels and their JSON-safe substitution |
//! | [`levels`] | Item states, per-level templates, the `MenuConfiguration` |
//! | [`decode`] | Renderer text → `MenuNode` tree |
//! | [`enrich`] | `RecordEnricher` trait, `Pipeline`, bottom-up walker, `files` enricher |
//! | [`menu`] | `MenuProcessor` orchestration and the `MenuRenderer` trait |
//! | [`render`] | Reference renderer over an in-memory page tree |
//! | [`types`] | `MenuNode`, `PageRecord`, `LinkTarget` |
//! | [`imaging`] | Responsive image sizes on a column grid |
//! | [`style`] | CSS emission, inline or as named header blocks |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Late-Bound Links
//!
//! A link is only known once the renderer has picked an item's state. Templates
//! therefore carry sentinels that [`levels::LevelConfig::process_item`]
//! replaces with JSON-encoded values. A sentinel already sitting inside quotes
//! is replaced together with its quotes, so the fragment stays valid JSON
//! either way. Only template parts are substituted; record content passes
//! through untouched even when it contains a sentinel.
//!
//! ## Explicit Context
//!
//! Value expressions (`field`, `data`, `listNum`, `wrap`, ...) read from a
//! [`context::RecordContext`] passed by argument. There is no ambient "current
//! record": each enricher call builds its own context from the node's data.
//!
//! ## Bounded Depth
//!
//! Menus are capped at [`config::MAX_LEVELS`] levels. The limit is checked when
//! options are read, when renderer output is decoded and when the enrichment
//! walker descends, so a misbehaving renderer cannot drive unbounded recursion.

pub mod config;
pub mod context;
pub mod decode;
pub mod enrich;
pub mod imaging;
pub mod levels;
pub mod menu;
pub mod output;
pub mod placeholder;
pub mod render;
pub mod style;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
