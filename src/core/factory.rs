//! Layer 3: Entry factory
//!
//! Turns raw sources into well-formed entries: conversion rule first,
//! then id assignment, then children normalization, recursively.

use std::fmt;

use super::entry::{Children, Entry};
use super::identity::IdProvider;
use super::source::{identity_rule, ConversionRule, RawChildren, RawEntry};

/// Normalizes caller input into entries.
///
/// Owns the id provider and the injected conversion rule. Every source
/// passes through here before it enters the forest, so the forest only
/// ever holds normalized entries.
pub struct EntryFactory {
    provider: Box<dyn IdProvider>,
    rule: ConversionRule,
}

impl EntryFactory {
    pub fn new(provider: Box<dyn IdProvider>) -> Self {
        Self {
            provider,
            rule: identity_rule(),
        }
    }

    pub fn with_rule(provider: Box<dyn IdProvider>, rule: ConversionRule) -> Self {
        Self { provider, rule }
    }

    pub fn set_rule(&mut self, rule: ConversionRule) {
        self.rule = rule;
    }

    /// Normalize one source, subtree included.
    ///
    /// The conversion rule runs at every level, matching how bulk loads
    /// convert nested resource descriptors.
    pub fn create_entry(&mut self, source: RawEntry) -> Entry {
        let raw = (self.rule)(source);

        let id = match raw.id {
            Some(id) => id,
            None => {
                let minted = self.provider.mint();
                tracing::trace!(id = %minted, "minted entry id");
                minted
            }
        };

        let mut payload = raw.payload;
        payload.strip_reserved();

        let children = match raw.children {
            None | Some(RawChildren::Leaf) => Children::Leaf,
            Some(RawChildren::Group(items)) => Children::Group(
                items
                    .into_iter()
                    .map(|child| self.create_entry(child))
                    .collect(),
            ),
        };

        Entry {
            id,
            payload,
            children,
        }
    }

    /// Normalize a whole source list, preserving order.
    pub fn create_forest(&mut self, sources: Vec<RawEntry>) -> Vec<Entry> {
        sources
            .into_iter()
            .map(|source| self.create_entry(source))
            .collect()
    }
}

impl fmt::Debug for EntryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryFactory")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntryId, SequentialIds};
    use serde_json::json;

    fn factory() -> EntryFactory {
        EntryFactory::new(Box::new(SequentialIds::new("n")))
    }

    #[test]
    fn mints_id_only_when_absent() {
        let mut f = factory();
        let minted = f.create_entry(RawEntry::labelled("fresh"));
        assert_eq!(minted.id.as_str(), "n0");

        let kept = f.create_entry(RawEntry::labelled("named").with_id(EntryId::new("k").unwrap()));
        assert_eq!(kept.id.as_str(), "k");

        // The counter did not advance for the explicit id.
        let next = f.create_entry(RawEntry::new());
        assert_eq!(next.id.as_str(), "n1");
    }

    #[test]
    fn absent_and_null_children_become_leaves() {
        let mut f = factory();
        assert!(f.create_entry(RawEntry::new()).is_leaf());
        assert!(f.create_entry(RawEntry::new().as_leaf()).is_leaf());
    }

    #[test]
    fn empty_group_stays_a_group() {
        let mut f = factory();
        let entry = f.create_entry(RawEntry::new().with_children(vec![]));
        assert!(entry.is_group());
        assert_eq!(entry.child_entries().len(), 0);
    }

    #[test]
    fn children_are_normalized_recursively_in_order() {
        let mut f = factory();
        let entry = f.create_entry(RawEntry::labelled("top").with_children(vec![
            RawEntry::labelled("first"),
            RawEntry::labelled("second").with_children(vec![RawEntry::labelled("deep")]),
        ]));

        let children = entry.child_entries();
        assert_eq!(children[0].label(), Some("first"));
        assert_eq!(children[1].label(), Some("second"));
        assert!(children[0].is_leaf());
        let deep = &children[1].child_entries()[0];
        assert_eq!(deep.label(), Some("deep"));
        // Pre-order minting: top, first, second, deep.
        assert_eq!(entry.id.as_str(), "n0");
        assert_eq!(deep.id.as_str(), "n3");
    }

    #[test]
    fn conversion_rule_runs_at_every_level() {
        let rule: ConversionRule = Box::new(|mut raw| {
            let marked = match raw.payload.label() {
                Some(label) => format!("{label}!"),
                None => "!".to_string(),
            };
            raw.payload.set_label(marked);
            raw
        });
        let mut f = EntryFactory::with_rule(Box::new(SequentialIds::new("n")), rule);

        let entry = f.create_entry(
            RawEntry::labelled("group").with_children(vec![RawEntry::labelled("child")]),
        );
        assert_eq!(entry.label(), Some("group!"));
        assert_eq!(entry.child_entries()[0].label(), Some("child!"));
    }

    #[test]
    fn reserved_payload_keys_are_dropped() {
        let mut f = factory();
        let entry = f.create_entry(
            RawEntry::new()
                .with_id(EntryId::new("real").unwrap())
                .with_field("label", json!("x")),
        );
        assert_eq!(entry.payload.get("id"), None);
        assert_eq!(entry.payload.get("children"), None);
        assert_eq!(entry.label(), Some("x"));
    }
}
