//! The menu processor: options in, enriched menu tree out.
//!
//! One call to [`MenuProcessor::process`] walks through these stages:
//!
//! ```text
//! Configuring ──► Built ──► Rendered ──► Decoded ──► Enriched ──► Published
//!                              │
//!                              └── empty ─────────────────────────► Published (unchanged)
//! ```
//!
//! 1. **Configuring**: read the five scalar options ([`MenuOptions`]).
//! 2. **Built**: allow-list the renderer options and build the
//!    [`MenuConfiguration`].
//! 3. **Rendered**: hand the configuration to a [`MenuRenderer`].
//! 4. An empty render returns the caller's data untouched.
//! 5. **Decoded**: parse the text into [`MenuNode`](crate::types::MenuNode)s.
//! 6. **Enriched**: run the enrichment pipeline over every node.
//! 7. **Published**: store the nodes under the configured slot.
//!
//! Nothing survives between calls; every invocation builds its own
//! configuration and tree.

use crate::config::{ConfigError, MenuOptions, filter_renderer_options};
use crate::context::RecordContext;
use crate::decode::{self, DecodeError};
use crate::enrich::{self, EnrichError, Pipeline};
use crate::levels::{MenuConfiguration, build_configuration};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Failed(String),
    #[error("invalid menu configuration: {0}")]
    Config(String),
}

#[derive(Error, Debug)]
pub enum MenuError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Enrich(#[from] EnrichError),
}

/// Produces the menu text for a configuration.
///
/// Implementations return `Ok(None)` (or empty text) when there is nothing
/// to show, otherwise a JSON array of item objects. The template parts that
/// carry sentinels must go through
/// [`LevelConfig::process_item`](crate::levels::LevelConfig::process_item)
/// once the item's link is known. Parts rendered from record data must not.
pub trait MenuRenderer {
    fn render(&self, config: &MenuConfiguration, ctx: &RecordContext) -> Result<Option<String>, RenderError>;
}

impl<R: MenuRenderer + ?Sized> MenuRenderer for &R {
    fn render(&self, config: &MenuConfiguration, ctx: &RecordContext) -> Result<Option<String>, RenderError> {
        (**self).render(config, ctx)
    }
}

/// Runs the menu pipeline against one renderer.
#[derive(Debug, Clone)]
pub struct MenuProcessor<R> {
    renderer: R,
}

impl<R: MenuRenderer> MenuProcessor<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Configuring and Built: the options and configuration a `process`
    /// call with the same arguments would render with.
    pub fn configure(
        &self,
        ctx: &RecordContext,
        options: &Map<String, Value>,
    ) -> Result<(MenuOptions, MenuConfiguration), MenuError> {
        let menu_options = MenuOptions::from_options(options, ctx)?;
        let renderer_options = filter_renderer_options(options, ctx);
        let config = build_configuration(&menu_options, renderer_options);
        tracing::debug!(
            levels = menu_options.levels,
            expand_all = menu_options.expand_all,
            include_spacer = menu_options.include_spacer,
            slot = %menu_options.slot,
            language = config.is_language_menu(),
            "menu configuration built"
        );
        Ok((menu_options, config))
    }

    /// Build, render, decode and enrich a menu.
    ///
    /// `ctx` is the record the menu is rendered for (a content element or a
    /// page). The returned mapping is `processed` plus the menu under the
    /// configured slot; when the renderer produces nothing, `processed` is
    /// returned as it came in.
    pub fn process(
        &self,
        ctx: &RecordContext,
        options: &Map<String, Value>,
        pipeline: &Pipeline,
        mut processed: Map<String, Value>,
    ) -> Result<Map<String, Value>, MenuError> {
        let (menu_options, config) = self.configure(ctx, options)?;

        let rendered = self.renderer.render(&config, ctx)?;
        if decode::is_empty_render(rendered.as_deref()) {
            tracing::debug!(slot = %menu_options.slot, "renderer produced no menu, passing data through");
            return Ok(processed);
        }
        tracing::debug!(bytes = rendered.as_deref().map_or(0, str::len), "menu rendered");

        let nodes = decode::decode(rendered.as_deref(), menu_options.levels)?.unwrap_or_default();
        tracing::debug!(items = nodes.len(), "menu decoded");

        let nodes = enrich::enrich_tree(nodes, pipeline)?;
        tracing::debug!(items = nodes.len(), stages = pipeline.len(), "menu enriched");

        let value = serde_json::to_value(&nodes).map_err(DecodeError::from)?;
        processed.insert(menu_options.slot.clone(), value);
        tracing::debug!(slot = %menu_options.slot, "menu published");
        Ok(processed)
    }
}
