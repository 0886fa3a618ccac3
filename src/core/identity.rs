//! Layer 0: Identity atoms
//!
//! EntryId: forest-wide entry identifier
//! IdProvider: injected minting capability
//! SequentialIds / RandomIds: provider implementations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{CoreError, InvalidId};

/// Sentinel id carried by the transient drop-target placeholder.
///
/// Exists only while a drag gesture is in flight. Must never survive a
/// committed or cancelled gesture.
pub const PREVIEW_ID: &str = "preview";

/// Alphabet for generated entry ids.
///
/// Lowercase alphanumeric, matching the ids callers tend to hand us, so
/// generated and caller-supplied ids are indistinguishable downstream.
const ENTRY_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Entry identifier - opaque, unique across the whole forest.
///
/// Canonically a string. Wire input may carry numbers; those are
/// stringified on deserialize, so `7` and `"7"` address the same entry.
/// Immutable once assigned.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            Err(InvalidId::Entry {
                raw: s,
                reason: "empty".into(),
            }
            .into())
        } else {
            Ok(Self(s))
        }
    }

    /// The drop-target placeholder id.
    pub fn preview() -> Self {
        Self(PREVIEW_ID.to_string())
    }

    pub fn is_preview(&self) -> bool {
        self.0 == PREVIEW_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({:?})", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for EntryId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(serde_json::Number),
        }
        match Wire::deserialize(deserializer)? {
            Wire::Text(s) => EntryId::new(s).map_err(serde::de::Error::custom),
            Wire::Number(n) => Ok(EntryId(n.to_string())),
        }
    }
}

/// Capability for minting fresh entry ids.
///
/// Uniqueness among entries live in one process is the only requirement;
/// nothing persists across sessions. Injected so tests can run with
/// deterministic ids.
pub trait IdProvider: fmt::Debug + Send {
    fn mint(&mut self) -> EntryId;
}

/// Deterministic provider - `{prefix}{counter}`.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("entry-")
    }
}

impl IdProvider for SequentialIds {
    fn mint(&mut self) -> EntryId {
        let id = EntryId(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// Random provider - short lowercase alphanumeric slug.
#[derive(Debug, Clone)]
pub struct RandomIds {
    len: usize,
}

impl RandomIds {
    pub fn new(len: usize) -> Self {
        assert!(len >= 4, "entry id slug must be >=4 chars");
        Self { len }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IdProvider for RandomIds {
    fn mint(&mut self) -> EntryId {
        use rand::Rng;
        let mut rng = rand::rng();
        let slug: String = (0..self.len)
            .map(|_| {
                let idx = rng.random_range(0..ENTRY_ALPHABET.len());
                ENTRY_ALPHABET[idx] as char
            })
            .collect();
        EntryId(slug)
    }
}
