//! Layer 2: Raw entry sources
//!
//! RawEntry: caller-supplied input before normalization
//! RawChildren: the three-state children field of the wire form
//! ConversionRule: injected source-to-entry mapping

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::{Children, Entry};
use super::identity::EntryId;
use super::payload::Payload;

/// Children as callers supply them.
///
/// The wire form distinguishes three states: field absent (the factory
/// decides, producing a leaf), explicit `null` (leaf) and an array
/// (group). Absence is modelled by the surrounding `Option`.
#[derive(Clone, Debug, PartialEq)]
pub enum RawChildren {
    Leaf,
    Group(Vec<RawEntry>),
}

impl Serialize for RawChildren {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawChildren::Leaf => serializer.serialize_none(),
            RawChildren::Group(items) => items.serialize(serializer),
        }
    }
}

fn deserialize_raw_children<'de, D>(deserializer: D) -> Result<Option<RawChildren>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    // Only runs when the key is present; a missing key stays None via
    // the field default.
    Ok(Some(match Option::<Vec<RawEntry>>::deserialize(deserializer)? {
        None => RawChildren::Leaf,
        Some(items) => RawChildren::Group(items),
    }))
}

/// An entry as handed in by a caller, before the factory normalizes it.
///
/// Everything is optional: a fresh id is minted when `id` is absent, and
/// an absent `children` field becomes a leaf.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    #[serde(flatten)]
    pub payload: Payload,
    #[serde(
        default,
        deserialize_with = "deserialize_raw_children",
        skip_serializing_if = "Option::is_none"
    )]
    pub children: Option<RawChildren>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for the common labelled-leaf source.
    pub fn labelled(label: impl Into<String>) -> Self {
        let mut raw = Self::default();
        raw.payload.set_label(label);
        raw
    }

    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key, value);
        self
    }

    /// Mark as an explicit leaf (wire `children: null`).
    pub fn as_leaf(mut self) -> Self {
        self.children = Some(RawChildren::Leaf);
        self
    }

    /// Mark as a group with the given children (wire `children: [...]`).
    pub fn with_children(mut self, children: Vec<RawEntry>) -> Self {
        self.children = Some(RawChildren::Group(children));
        self
    }
}

impl From<&Entry> for RawEntry {
    /// Demote a normalized entry back to source form, subtree included.
    ///
    /// Used when an existing entry re-enters the factory: updates,
    /// replacements and drag previews.
    fn from(entry: &Entry) -> Self {
        let children = match &entry.children {
            Children::Leaf => RawChildren::Leaf,
            Children::Group(items) => {
                RawChildren::Group(items.iter().map(RawEntry::from).collect())
            }
        };
        Self {
            id: Some(entry.id.clone()),
            payload: entry.payload.clone(),
            children: Some(children),
        }
    }
}

/// Pure mapping applied to every source before normalization.
///
/// Defaults to identity. The catalog editor injects one to turn raw
/// resource descriptors into labelled entries.
pub type ConversionRule = Box<dyn Fn(RawEntry) -> RawEntry + Send>;

pub(crate) fn identity_rule() -> ConversionRule {
    Box::new(|raw| raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_null_and_array_children_stay_distinct() {
        let absent: RawEntry = serde_json::from_value(json!({ "label": "a" })).unwrap();
        assert_eq!(absent.children, None);

        let null: RawEntry = serde_json::from_value(json!({ "children": null })).unwrap();
        assert_eq!(null.children, Some(RawChildren::Leaf));

        let array: RawEntry = serde_json::from_value(json!({ "children": [] })).unwrap();
        assert_eq!(array.children, Some(RawChildren::Group(vec![])));
    }

    #[test]
    fn nested_sources_parse_recursively() {
        let raw: RawEntry = serde_json::from_value(json!({
            "id": "top",
            "label": "Topics",
            "children": [
                { "label": "Water" },
                { "id": 3, "children": null }
            ]
        }))
        .unwrap();

        let Some(RawChildren::Group(children)) = raw.children else {
            panic!("expected group");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].payload.label(), Some("Water"));
        assert_eq!(children[1].id.as_ref().map(EntryId::as_str), Some("3"));
        assert_eq!(children[1].children, Some(RawChildren::Leaf));
    }

    #[test]
    fn absent_fields_are_skipped_on_output() {
        let raw = RawEntry::labelled("bare");
        let value = serde_json::to_value(&raw).unwrap();
        assert_eq!(value, json!({ "label": "bare" }));

        let leaf = RawEntry::labelled("leaf").as_leaf();
        assert_eq!(
            serde_json::to_value(&leaf).unwrap(),
            json!({ "label": "leaf", "children": null })
        );
    }

    #[test]
    fn entry_round_trips_to_source_form() {
        let entry = Entry::group(
            EntryId::new("g").unwrap(),
            Payload::new(),
            vec![Entry::leaf(EntryId::new("a").unwrap(), Payload::new())],
        );
        let raw = RawEntry::from(&entry);
        assert_eq!(raw.id.as_ref().map(EntryId::as_str), Some("g"));
        let Some(RawChildren::Group(children)) = raw.children else {
            panic!("expected group");
        };
        assert_eq!(children[0].children, Some(RawChildren::Leaf));
    }
}
