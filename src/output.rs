//! CLI output formatting for the menu pipeline.
//!
//! # Information-First Display
//!
//! Every menu item is shown by its semantic identity first (positional index
//! and title) with the link as secondary context. Flags follow in brackets,
//! so the output reads as a navigation inventory while still showing why an
//! item looks the way it does.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! Menu (slot "menu")
//! 001 Products → /products [active]
//!     001 Widgets → /products/widgets [current]
//! 002 ---- [spacer]
//! 003 About us → /about
//!     001 Team → /about/team (_blank)
//!
//! 3 items, 2 submenu items
//! ```
//!
//! ## Levels
//!
//! ```text
//! Levels
//! 001 level 1 (expand all)
//!     States: NO, IFSUB, ACT, ACTIFSUB, CUR, CURIFSUB
//! Wrap: [|]
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure,
//! with no I/O and no side effects.

use crate::imaging::{Dimension, ImageSize};
use crate::levels::MenuConfiguration;
use crate::types::MenuNode;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Bracketed flag list, or an empty string when no flag is set.
fn flag_suffix(node: &MenuNode) -> String {
    let mut flags = Vec::new();
    if node.active {
        flags.push("active");
    }
    if node.current {
        flags.push("current");
    }
    if node.spacer {
        flags.push("spacer");
    }
    if node.available == Some(false) {
        flags.push("unavailable");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    }
}

/// Format one item line: index, title, link, target and flags.
///
/// ```text
/// 001 Products → /products [active]
/// 002 ---- [spacer]
/// ```
fn item_line(index: usize, node: &MenuNode) -> String {
    let mut line = format!("{} {}", format_index(index), node.title);
    if !node.link.is_empty() {
        line.push_str(&format!(" → {}", node.link));
    }
    if !node.target.is_empty() {
        line.push_str(&format!(" ({})", node.target));
    }
    line.push_str(&flag_suffix(node));
    line
}

fn walk_menu(nodes: &[MenuNode], depth: usize, lines: &mut Vec<String>) -> usize {
    let mut count = 0;
    for (i, node) in nodes.iter().enumerate() {
        lines.push(format!("{}{}", indent(depth), item_line(i + 1, node)));
        let extras: Vec<&str> = node.extra.keys().map(String::as_str).collect();
        if !extras.is_empty() {
            lines.push(format!("{}Enriched: {}", indent(depth + 1), extras.join(", ")));
        }
        count += 1 + walk_menu(&node.children, depth + 1, lines);
    }
    count
}

// ============================================================================
// Render
// ============================================================================

/// Format a decoded (and possibly enriched) menu tree.
pub fn format_menu(slot: &str, nodes: &[MenuNode]) -> Vec<String> {
    let mut lines = vec![format!("Menu (slot \"{slot}\")")];
    if nodes.is_empty() {
        lines.push("    (empty)".to_string());
        return lines;
    }
    let total = walk_menu(nodes, 0, &mut lines);
    let nested = total - nodes.len();
    lines.push(String::new());
    lines.push(format!(
        "{} {}, {} submenu {}",
        nodes.len(),
        plural(nodes.len(), "item"),
        nested,
        plural(nested, "item")
    ));
    lines
}

pub fn print_menu(slot: &str, nodes: &[MenuNode]) {
    for line in format_menu(slot, nodes) {
        println!("{}", line);
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

// ============================================================================
// Levels
// ============================================================================

/// Format the level configuration handed to the renderer.
pub fn format_levels(config: &MenuConfiguration) -> Vec<String> {
    let mut lines = vec!["Levels".to_string()];
    for level in &config.levels {
        let mut header = format!("{} level {}", format_index(level.depth as usize), level.depth);
        if level.expand_all {
            header.push_str(" (expand all)");
        }
        lines.push(header);
        let states: Vec<&str> = level.states.keys().map(|s| s.code()).collect();
        lines.push(format!("{}States: {}", indent(1), states.join(", ")));
        if let Some(wrap) = &level.wrap {
            lines.push(format!("{}Wrap: {}", indent(1), wrap));
        }
    }
    lines.push(format!("Wrap: {}", config.wrap));
    if let Some(special) = config.special() {
        lines.push(format!("Special: {} ({})", special, config.special_value()));
    }
    lines
}

pub fn print_levels(config: &MenuConfiguration) {
    for line in format_levels(config) {
        println!("{}", line);
    }
}

// ============================================================================
// Image size
// ============================================================================

fn size_line(name: &str, width: &Dimension, height: Option<&Dimension>) -> String {
    match height {
        Some(h) => format!("{}{name}: {width} × {h}", indent(1)),
        None => format!("{}{name}: {width}", indent(1)),
    }
}

/// Format a computed image size, one line per breakpoint.
pub fn format_image_size(size: &ImageSize) -> Vec<String> {
    let w = &size.width;
    let h = &size.height;
    let mut lines = vec![
        "Image size".to_string(),
        size_line("xxs", &w.xxs, h.xxs.as_ref()),
        size_line("xs", &w.xs, h.xs.as_ref()),
        size_line("sm", &w.sm, h.sm.as_ref()),
        size_line("md", &w.md, h.md.as_ref()),
        size_line("lg", &w.lg, h.lg.as_ref()),
    ];
    if size.ratio > 0.0 {
        lines.push(format!("Ratio: {}", size.ratio));
    }
    lines.push(format!("File ratio: {}", size.file_ratio));
    lines
}

pub fn print_image_size(size: &ImageSize) {
    for line in format_image_size(size) {
        println!("{}", line);
    }
}
