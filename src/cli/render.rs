//! Human renderer for CLI outputs.
//!
//! This module is pure formatting; handlers gather any extra data needed.

use crate::config::RenderConfig;
use crate::core::{Entry, EntryId};

/// Render the whole document as an indented tree.
///
/// Groups carry a trailing `/`, hidden entries a `(hidden)` marker, and
/// ids are shown in brackets when the config asks for them.
pub fn render_forest(roots: &[Entry], config: &RenderConfig) -> String {
    if roots.is_empty() {
        return "(empty document)".into();
    }
    let mut out = String::new();
    for entry in roots {
        render_into(&mut out, entry, 0, config);
    }
    out.trim_end().into()
}

pub fn render_entry(entry: &Entry, config: &RenderConfig) -> String {
    render_forest(std::slice::from_ref(entry), config)
}

fn render_into(out: &mut String, entry: &Entry, depth: usize, config: &RenderConfig) {
    for _ in 0..depth * config.indent_width {
        out.push(' ');
    }
    match entry.label() {
        Some(label) => out.push_str(label),
        None => out.push_str("(unlabelled)"),
    }
    if entry.children.is_group() {
        out.push('/');
    }
    if config.show_ids {
        out.push_str(&format!("  [{}]", entry.id));
    }
    if entry.hidden() {
        out.push_str("  (hidden)");
    }
    out.push('\n');
    for child in entry.child_entries() {
        render_into(out, child, depth + 1, config);
    }
}

pub fn render_added(id: &EntryId) -> String {
    format!("✓ Added {id}")
}

pub fn render_updated(id: &EntryId) -> String {
    format!("✓ Updated {id}")
}

pub fn render_removed(id: &EntryId) -> String {
    format!("✓ Removed {id}")
}

pub fn render_replaced(old: &EntryId, new: &EntryId) -> String {
    format!("✓ Replaced {old} with {new}")
}

pub fn render_moved(id: &EntryId) -> String {
    format!("✓ Moved {id}")
}
