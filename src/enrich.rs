//! Per-node enrichment of a decoded menu tree.
//!
//! An enrichment [`Pipeline`] is an ordered list of [`RecordEnricher`]s. The
//! walker runs it over every node of the tree, depth-first with children
//! before their parent, and gives each node a fresh [`RecordContext`] built
//! from that node's own `data`. An enricher therefore sees the already
//! enriched children of the node it works on, but never a sibling's state.
//!
//! Pipelines are usually built from the `dataProcessing` option:
//!
//! ```toml
//! [menu.dataProcessing.10]
//! processor = "files"
//! fieldName = "media"
//! as = "images"
//! ```
//!
//! Stages run in numeric key order (`10` before `20` before `100`).
//! The only built-in processor is [`FilesEnricher`]; anything else can be
//! added with [`Pipeline::push`].

use crate::config::MAX_LEVELS;
use crate::context::RecordContext;
use crate::types::MenuNode;
use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("menu tree exceeds {MAX_LEVELS} levels (reached depth {0})")]
    TooDeep(u32),
    #[error("unknown processor: {0}")]
    UnknownProcessor(String),
    #[error("invalid dataProcessing spec: {0}")]
    InvalidSpec(String),
    #[error("enrichment failed: {0}")]
    Failed(String),
}

/// Transforms one menu node given its record context.
pub trait RecordEnricher: Send + Sync {
    /// Return the node with whatever this enricher adds or changes.
    fn enrich(&self, ctx: &RecordContext, node: MenuNode) -> Result<MenuNode, EnrichError>;
}

/// An ordered list of keyed enrichers.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<(String, Box<dyn RecordEnricher>)>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|(key, _)| key))
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn push(&mut self, key: impl Into<String>, enricher: impl RecordEnricher + 'static) {
        self.stages.push((key.into(), Box::new(enricher)));
    }

    pub fn with(mut self, key: impl Into<String>, enricher: impl RecordEnricher + 'static) -> Self {
        self.push(key, enricher);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|(key, _)| key.as_str())
    }

    /// Build a pipeline from a `dataProcessing` mapping.
    ///
    /// Each key must be an integer; each value is either a processor name
    /// or a table with a `processor` entry plus that processor's options.
    /// `None` or an empty mapping gives an empty pipeline.
    pub fn from_spec(spec: Option<&Value>) -> Result<Self, EnrichError> {
        let entries = match spec {
            None | Some(Value::Null) => return Ok(Self::new()),
            Some(Value::Object(entries)) => entries,
            Some(other) => {
                return Err(EnrichError::InvalidSpec(format!(
                    "expected a mapping of numbered stages, got {other}"
                )));
            }
        };

        let mut numbered = Vec::with_capacity(entries.len());
        for (key, stage) in entries {
            let order: i64 = key.trim().parse().map_err(|_| {
                EnrichError::InvalidSpec(format!("stage key '{key}' is not a number"))
            })?;
            numbered.push((order, key, stage));
        }
        numbered.sort_by_key(|(order, _, _)| *order);

        let mut pipeline = Self::new();
        for (_, key, stage) in numbered {
            let (processor, options) = match stage {
                Value::String(name) => (name.as_str(), Map::new()),
                Value::Object(table) => {
                    let name = table.get("processor").and_then(Value::as_str).ok_or_else(|| {
                        EnrichError::InvalidSpec(format!("stage '{key}' has no processor"))
                    })?;
                    (name, table.clone())
                }
                other => {
                    return Err(EnrichError::InvalidSpec(format!(
                        "stage '{key}' must be a name or a table, got {other}"
                    )));
                }
            };
            match processor.trim() {
                FilesEnricher::NAME => pipeline.push(key.clone(), FilesEnricher::from_options(&options)),
                unknown => return Err(EnrichError::UnknownProcessor(unknown.to_string())),
            }
        }
        Ok(pipeline)
    }

    /// Run every stage over one node, in order.
    pub fn apply(&self, ctx: &RecordContext, node: MenuNode) -> Result<MenuNode, EnrichError> {
        self.stages
            .iter()
            .try_fold(node, |node, (_, enricher)| enricher.enrich(ctx, node))
    }
}

/// Enrich every top-level node, keeping their order.
pub fn enrich_tree(nodes: Vec<MenuNode>, pipeline: &Pipeline) -> Result<Vec<MenuNode>, EnrichError> {
    nodes
        .into_iter()
        .map(|node| enrich_node(node, pipeline, 1))
        .collect()
}

/// Enrich one node at the given 1-based depth: its children first, then the
/// node itself in a context of its own.
pub fn enrich_node(mut node: MenuNode, pipeline: &Pipeline, depth: u32) -> Result<MenuNode, EnrichError> {
    if depth > MAX_LEVELS {
        return Err(EnrichError::TooDeep(depth));
    }

    let children = std::mem::take(&mut node.children);
    node.children = children
        .into_iter()
        .map(|child| enrich_node(child, pipeline, depth + 1))
        .collect::<Result<_, _>>()?;

    let ctx = RecordContext::page(node.data.clone());
    pipeline.apply(&ctx, node)
}

/// Resolves a comma-separated list of file identifiers stored in a record
/// field into `[{identifier, url}]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesEnricher {
    pub field_name: String,
    pub slot: String,
    pub base_url: String,
}

impl Default for FilesEnricher {
    fn default() -> Self {
        Self {
            field_name: "media".to_string(),
            slot: "files".to_string(),
            base_url: "/fileadmin/".to_string(),
        }
    }
}

impl FilesEnricher {
    pub const NAME: &'static str = "files";

    pub fn from_options(options: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            options
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or(default)
        };
        Self {
            field_name: text("fieldName", defaults.field_name),
            slot: text("as", defaults.slot),
            base_url: text("baseUrl", defaults.base_url),
        }
    }
}

impl RecordEnricher for FilesEnricher {
    fn enrich(&self, ctx: &RecordContext, mut node: MenuNode) -> Result<MenuNode, EnrichError> {
        let files: Vec<Value> = ctx
            .field(&self.field_name)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|identifier| !identifier.is_empty())
            .map(|identifier| {
                let url = format!(
                    "{}/{}",
                    self.base_url.trim_end_matches('/'),
                    identifier.trim_start_matches('/')
                );
                json!({"identifier": identifier, "url": url})
            })
            .collect();
        node.extra.insert(self.slot.clone(), Value::Array(files));
        Ok(node)
    }
}
