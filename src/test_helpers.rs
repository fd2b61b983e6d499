//! Shared test utilities for the menutree test suite.
//!
//! Provides a small sample page tree, enrichers that record or fail, and
//! shape assertions over decoded menus.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let renderer = PageTreeRenderer::new(sample_pages()).with_current(4);
//! let recorder = RecordingEnricher::new();
//! let pipeline = Pipeline::new().with("10", recorder.clone());
//!
//! assert_menu_shape(&nodes, &[
//!     ("Products", &["Widgets"]),
//!     ("About us", &[]),
//! ]);
//! ```
//!
//! Sample tree (uid, title):
//!
//! ```text
//! 1 Home
//! ├── 2 Products
//! │   ├── 4 Widgets
//! │   └── 5 Internal     (hidden in menus)
//! ├── 3 ----             (spacer)
//! ├── 6 About            (nav_title "About us", translated to language 1)
//! │   └── 7 Team
//! └── 8 Storage          (folder)
//! ```

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::context::RecordContext;
use crate::enrich::{EnrichError, RecordEnricher};
use crate::types::{MenuNode, PageRecord};

// =========================================================================
// Fixture setup
// =========================================================================

/// The sample page tree described in the module docs.
pub fn sample_pages() -> Vec<PageRecord> {
    serde_json::from_value(json!([
        {"uid": 1, "fields": {"title": "Home", "slug": "/"}, "children": [
            {"uid": 2, "fields": {"title": "Products", "slug": "/products", "media": "teaser.jpg"}, "children": [
                {"uid": 4, "fields": {"title": "Widgets", "slug": "/products/widgets"}},
                {"uid": 5, "nav_hide": 1, "fields": {"title": "Internal", "slug": "/products/internal"}}
            ]},
            {"uid": 3, "doktype": 199, "fields": {"title": "----"}},
            {"uid": 6, "languages": [1], "fields": {"title": "About", "nav_title": "About us", "slug": "/about"}, "children": [
                {"uid": 7, "fields": {"title": "Team", "slug": "/about/team", "target": "_blank"}}
            ]},
            {"uid": 8, "doktype": 254, "fields": {"title": "Storage"}}
        ]}
    ]))
    .unwrap()
}

// =========================================================================
// Enrichers
// =========================================================================

/// One recorded `enrich` call.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichCall {
    pub title: String,
    pub table: String,
    pub node_uid: Option<Value>,
    pub context_uid: Option<Value>,
    /// How many enrichers touched the node before this one.
    pub visited_before: i64,
    /// For each child: had it been enriched already?
    pub children_enriched: Vec<bool>,
}

/// Enricher that records every call and stamps the node with `order` (its
/// 1-based call number) and `visited` (number of enrichers seen so far).
/// Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingEnricher {
    calls: Arc<Mutex<Vec<EnrichCall>>>,
}

impl RecordingEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<EnrichCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Titles in call order.
    pub fn titles(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.title).collect()
    }

    /// What the node titled `title` saw of its children, if it was called.
    pub fn children_seen(&self, title: &str) -> Option<Vec<bool>> {
        self.calls()
            .into_iter()
            .find(|call| call.title == title)
            .map(|call| call.children_enriched)
    }
}

impl RecordEnricher for RecordingEnricher {
    fn enrich(&self, ctx: &RecordContext, mut node: MenuNode) -> Result<MenuNode, EnrichError> {
        let mut calls = self.calls.lock().unwrap();
        let visited_before = node.extra.get("visited").and_then(Value::as_i64).unwrap_or(0);
        calls.push(EnrichCall {
            title: node.title.clone(),
            table: ctx.table().to_string(),
            node_uid: node.data.get("uid").cloned(),
            context_uid: ctx.data().get("uid").cloned(),
            visited_before,
            children_enriched: node
                .children
                .iter()
                .map(|child| child.extra.contains_key("order"))
                .collect(),
        });
        node.extra.insert("order".into(), json!(calls.len()));
        node.extra.insert("visited".into(), json!(visited_before + 1));
        Ok(node)
    }
}

/// Enricher that fails on the node with the given title.
#[derive(Debug, Clone)]
pub struct FailingEnricher {
    title: String,
}

impl FailingEnricher {
    pub fn on(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

impl RecordEnricher for FailingEnricher {
    fn enrich(&self, _ctx: &RecordContext, node: MenuNode) -> Result<MenuNode, EnrichError> {
        if node.title == self.title {
            return Err(EnrichError::Failed(format!("refused to enrich '{}'", node.title)));
        }
        Ok(node)
    }
}

// =========================================================================
// Menu lookups (panic with a clear message on miss)
// =========================================================================

/// Top-level titles in order.
pub fn menu_titles(nodes: &[MenuNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.title.as_str()).collect()
}

/// Find a top-level node by title. Panics if not found.
pub fn find_node<'a>(nodes: &'a [MenuNode], title: &str) -> &'a MenuNode {
    nodes.iter().find(|n| n.title == title).unwrap_or_else(|| {
        let titles = menu_titles(nodes);
        panic!("menu item '{title}' not found. Available: {titles:?}")
    })
}

/// Assert that a menu matches an expected two-level shape.
///
/// Each entry is `(title, children)`. Use `&[]` for leaf nodes.
pub fn assert_menu_shape(nodes: &[MenuNode], expected: &[(&str, &[&str])]) {
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(menu_titles(nodes), expected_titles, "menu top-level titles mismatch");

    for (title, children) in expected {
        let node = find_node(nodes, title);
        assert_eq!(
            menu_titles(&node.children),
            children.to_vec(),
            "menu children of '{title}' mismatch"
        );
    }
}
