//! Layer 1: The Entry
//!
//! Children: the leaf/group discriminator
//! Entry: id + payload + children, the node of the forest

use serde::{Deserialize, Serialize};

use super::identity::EntryId;
use super::payload::Payload;

/// Child slot of an entry.
///
/// Wire form keeps the legacy discriminator: `null` is a leaf, an array
/// (empty included) is a group. A group's order is the presentation order.
#[derive(Clone, Debug, PartialEq)]
pub enum Children {
    Leaf,
    Group(Vec<Entry>),
}

impl Children {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Children::Leaf)
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Children::Group(_))
    }

    pub fn as_group(&self) -> Option<&[Entry]> {
        match self {
            Children::Leaf => None,
            Children::Group(items) => Some(items),
        }
    }

    pub(crate) fn as_group_mut(&mut self) -> Option<&mut Vec<Entry>> {
        match self {
            Children::Leaf => None,
            Children::Group(items) => Some(items),
        }
    }
}

impl Serialize for Children {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Children::Leaf => serializer.serialize_none(),
            Children::Group(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Children {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Vec<Entry>>::deserialize(deserializer)? {
            None => Children::Leaf,
            Some(items) => Children::Group(items),
        })
    }
}

/// A node in the forest.
///
/// `id` is unique forest-wide and never changes after creation. All other
/// domain fields live in `payload` and travel flattened beside `id` and
/// `children` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(flatten)]
    pub payload: Payload,
    pub children: Children,
}

impl Entry {
    pub fn leaf(id: EntryId, payload: Payload) -> Self {
        Self {
            id,
            payload,
            children: Children::Leaf,
        }
    }

    pub fn group(id: EntryId, payload: Payload, children: Vec<Entry>) -> Self {
        Self {
            id,
            payload,
            children: Children::Group(children),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_leaf()
    }

    pub fn is_group(&self) -> bool {
        self.children.is_group()
    }

    pub fn label(&self) -> Option<&str> {
        self.payload.label()
    }

    pub fn hidden(&self) -> bool {
        self.payload.hidden()
    }

    /// Child entries, empty for leaves.
    pub fn child_entries(&self) -> &[Entry] {
        self.children.as_group().unwrap_or(&[])
    }

    /// Number of entries in this subtree, the entry itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .child_entries()
            .iter()
            .map(Entry::subtree_len)
            .sum::<usize>()
    }

    /// Depth of this subtree. A leaf is 1.
    pub fn subtree_depth(&self) -> usize {
        1 + self
            .child_entries()
            .iter()
            .map(Entry::subtree_depth)
            .max()
            .unwrap_or(0)
    }

    /// Whether `id` names this entry or anything below it.
    pub fn subtree_contains(&self, id: &EntryId) -> bool {
        &self.id == id
            || self
                .child_entries()
                .iter()
                .any(|child| child.subtree_contains(id))
    }
}
