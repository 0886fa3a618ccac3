//! Shared builders for integration tests.

use grove_rs::{EntryId, Forest, RawEntry};

pub fn id(s: &str) -> EntryId {
    EntryId::new(s).expect("fixture id")
}

/// Leaf source whose id equals its label.
pub fn entry(label: &str) -> RawEntry {
    RawEntry::labelled(label).with_id(id(label))
}

/// A small layer catalog: `[coastline, overlays[rivers, cities], terrain]`.
pub fn atlas() -> Forest {
    let mut forest = Forest::with_sequential_ids();
    forest.create(vec![
        entry("coastline"),
        entry("overlays").with_children(vec![entry("rivers"), entry("cities")]),
        entry("terrain"),
    ]);
    forest
}

pub fn root_ids(forest: &Forest) -> Vec<String> {
    forest
        .roots()
        .iter()
        .map(|entry| entry.id.to_string())
        .collect()
}

pub fn child_ids(forest: &Forest, parent: &EntryId) -> Vec<String> {
    forest
        .find(parent)
        .map(|entry| {
            entry
                .child_entries()
                .iter()
                .map(|child| child.id.to_string())
                .collect()
        })
        .unwrap_or_default()
}
