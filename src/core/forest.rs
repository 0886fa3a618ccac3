//! Layer 4: The Forest
//!
//! The canonical ordered forest and its id-addressed operations.
//!
//! INVARIANT: every id is unique across the whole forest, nested entries
//! included. Insert operations refuse sources that would break this.
//!
//! INVARIANT: locate, then mutate. The walk that finds a position fully
//! returns before any structural change happens; no mutation runs inside
//! a visitor.
//!
//! Not-found is not an error here. Mutators no-op (or fall back, where
//! documented) so rapid gesture-driven call sequences stay resilient.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use super::entry::{Children, Entry};
use super::factory::EntryFactory;
use super::identity::{EntryId, IdProvider, RandomIds, SequentialIds};
use super::source::{ConversionRule, RawEntry};

/// Placement of a new entry relative to a located sibling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// One position of the pre-order walk.
///
/// Root-level entries have no parent. `siblings` is the run that holds
/// `entry`, with `entry == &siblings[index]`.
#[derive(Clone, Copy, Debug)]
pub struct Visit<'a> {
    pub entry: &'a Entry,
    pub index: usize,
    pub siblings: &'a [Entry],
    pub parent: Option<&'a Entry>,
}

/// The ordered forest plus the factory that feeds it.
///
/// Exactly one writer owns a forest; readers take owned snapshots via
/// [`Forest::snapshot`] and [`Forest::entry`], so no caller can reach the
/// canonical entries behind the store's back.
#[derive(Debug)]
pub struct Forest {
    roots: Vec<Entry>,
    factory: EntryFactory,
}

impl Forest {
    pub fn new(provider: Box<dyn IdProvider>) -> Self {
        Self {
            roots: Vec::new(),
            factory: EntryFactory::new(provider),
        }
    }

    /// Deterministic ids, for tests and reproducible runs.
    pub fn with_sequential_ids() -> Self {
        Self::new(Box::new(SequentialIds::default()))
    }

    /// Random ids, for interactive use over documents whose existing ids
    /// are arbitrary.
    pub fn with_random_ids() -> Self {
        Self::new(Box::new(RandomIds::default()))
    }

    pub fn set_conversion_rule(&mut self, rule: ConversionRule) {
        self.factory.set_rule(rule);
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Replace the whole forest with normalized entries built from
    /// `sources`, preserving order.
    pub fn create(&mut self, sources: Vec<RawEntry>) {
        self.roots = self.factory.create_forest(sources);
        tracing::debug!(roots = self.roots.len(), "forest created");
    }

    /// Normalize one source without inserting it.
    pub fn create_entry(&mut self, source: RawEntry) -> Entry {
        self.factory.create_entry(source)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Depth-first pre-order walk with early exit.
    ///
    /// The visitor runs before descent into an entry's children. Breaking
    /// stops the walk immediately: no further siblings, no descendants.
    pub fn walk<F>(&self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(Visit<'_>) -> ControlFlow<()>,
    {
        Self::walk_entries(&self.roots, None, &mut visit)
    }

    fn walk_entries<'a, F>(
        siblings: &'a [Entry],
        parent: Option<&'a Entry>,
        visit: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(Visit<'a>) -> ControlFlow<()>,
    {
        for (index, entry) in siblings.iter().enumerate() {
            visit(Visit {
                entry,
                index,
                siblings,
                parent,
            })?;
            if let Children::Group(children) = &entry.children {
                Self::walk_entries(children, Some(entry), visit)?;
            }
        }
        ControlFlow::Continue(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Owned deep copy of the whole forest.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.roots.clone()
    }

    /// Owned deep copy of one entry with its subtree.
    pub fn entry(&self, id: &EntryId) -> Option<Entry> {
        self.find(id).cloned()
    }

    /// Borrowed lookup, stopping at the first match.
    pub fn find(&self, id: &EntryId) -> Option<&Entry> {
        Self::find_in(&self.roots, id)
    }

    fn find_in<'a>(siblings: &'a [Entry], id: &EntryId) -> Option<&'a Entry> {
        for entry in siblings {
            if &entry.id == id {
                return Some(entry);
            }
            if let Children::Group(children) = &entry.children
                && let Some(found) = Self::find_in(children, id)
            {
                return Some(found);
            }
        }
        None
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.find(id).is_some()
    }

    /// Borrowed view of the root run, presentation order.
    pub fn roots(&self) -> &[Entry] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of entries, nested included.
    pub fn entry_count(&self) -> usize {
        self.roots.iter().map(Entry::subtree_len).sum()
    }

    /// Depth of the deepest entry. An empty forest is 0.
    pub fn max_depth(&self) -> usize {
        self.roots
            .iter()
            .map(Entry::subtree_depth)
            .max()
            .unwrap_or(0)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a new entry at the front of `parent`'s children, or at the
    /// front of the root run when `parent` is `None`.
    ///
    /// A missing or leaf parent falls back to the root run. That fallback
    /// is the documented contract, not an error; a debug event records it.
    ///
    /// Returns the inserted entry's id, or `None` when the source was
    /// refused for an id conflict.
    pub fn prepend_at(&mut self, parent: Option<&EntryId>, source: RawEntry) -> Option<EntryId> {
        self.insert_edge(parent, source, true)
    }

    /// Symmetric to [`Forest::prepend_at`]: inserts at the end of the
    /// addressed run, with the same root fallback.
    pub fn append_at(&mut self, parent: Option<&EntryId>, source: RawEntry) -> Option<EntryId> {
        self.insert_edge(parent, source, false)
    }

    fn insert_edge(
        &mut self,
        parent: Option<&EntryId>,
        source: RawEntry,
        front: bool,
    ) -> Option<EntryId> {
        let entry = self.factory.create_entry(source);
        if let Some(conflict) = self.conflicting_id(&entry) {
            tracing::warn!(id = %conflict, "insert refused, id already present");
            return None;
        }
        let id = entry.id.clone();

        let run = match parent {
            None => &mut self.roots,
            Some(parent_id) => match Self::group_children_mut(&mut self.roots, parent_id) {
                Some(children) => children,
                None => {
                    tracing::debug!(
                        parent = %parent_id,
                        "parent missing or a leaf, inserting at root run"
                    );
                    &mut self.roots
                }
            },
        };
        if front {
            run.insert(0, entry);
        } else {
            run.push(entry);
        }

        tracing::debug!(id = %id, front, "entry inserted at run edge");
        Some(id)
    }

    /// Insert a new entry immediately before or after `sibling`, in the
    /// run that currently holds it.
    ///
    /// No-op when `sibling` is absent. Returns the inserted entry's id.
    pub fn insert_at(
        &mut self,
        sibling: &EntryId,
        source: RawEntry,
        placement: Placement,
    ) -> Option<EntryId> {
        let entry = self.factory.create_entry(source);
        if let Some(conflict) = self.conflicting_id(&entry) {
            tracing::warn!(id = %conflict, "insert refused, id already present");
            return None;
        }

        let path = self.locate(sibling)?;
        let (run, index) = Self::run_mut(&mut self.roots, &path)?;
        let id = entry.id.clone();
        let at = match placement {
            Placement::Before => index,
            Placement::After => index + 1,
        };
        run.insert(at, entry);

        tracing::debug!(id = %id, sibling = %sibling, ?placement, "entry inserted at sibling");
        Some(id)
    }

    /// Merge `patch` onto the entry with `id` and renormalize it.
    ///
    /// The id is pinned: a patch cannot rename an entry. Payload keys
    /// overwrite top-level; the children field follows the wire rule of
    /// the patch (absent keeps the current subtree, `null` turns the
    /// entry into a leaf, an array replaces the subtree).
    ///
    /// Returns false (no-op) when `id` is absent, or when the patch's
    /// children carry an id held elsewhere in the forest. Ids freed by
    /// the replaced subtree stay legal to reuse within the patch.
    pub fn update(&mut self, id: &EntryId, patch: RawEntry) -> bool {
        let Some(existing) = self.find(id) else {
            return false;
        };

        let mut merged = RawEntry::from(existing);
        merged.payload.merge_from(&patch.payload);
        if let Some(children) = patch.children {
            merged.children = Some(children);
        }
        // Pinned regardless of what the patch carried.
        merged.id = Some(id.clone());

        let Some(path) = self.locate(id) else {
            return false;
        };
        let Some((run, index)) = Self::run_mut(&mut self.roots, &path) else {
            return false;
        };
        if index >= run.len() {
            return false;
        }
        let old = run.remove(index);

        // Checked with the old subtree out, so its ids stay reusable.
        let rebuilt = self.factory.create_entry(merged);
        if let Some(conflict) = self.conflicting_id(&rebuilt) {
            tracing::warn!(id = %conflict, "update refused, id already present");
            if let Some((run, index)) = Self::run_mut(&mut self.roots, &path) {
                run.insert(index, old);
            }
            return false;
        }

        match Self::run_mut(&mut self.roots, &path) {
            Some((run, index)) => {
                run.insert(index, rebuilt);
                tracing::debug!(id = %id, "entry updated");
                true
            }
            None => false,
        }
    }

    /// Delete the entry with `id` and its whole subtree.
    ///
    /// Idempotent: removing an absent id is a no-op returning false.
    pub fn remove(&mut self, id: &EntryId) -> bool {
        let Some(path) = self.locate(id) else {
            return false;
        };
        let Some((run, index)) = Self::run_mut(&mut self.roots, &path) else {
            return false;
        };
        if index < run.len() {
            run.remove(index);
            tracing::debug!(id = %id, "entry removed");
            true
        } else {
            false
        }
    }

    /// Substitute the entry with `id` by a freshly created entry from
    /// `source`, at the same position. Full replacement, no merge.
    ///
    /// No-op when `id` is absent. Returns the replacement's id.
    pub fn replace(&mut self, id: &EntryId, source: RawEntry) -> Option<EntryId> {
        let path = self.locate(id)?;
        let (run, index) = Self::run_mut(&mut self.roots, &path)?;
        if index >= run.len() {
            return None;
        }
        let old = run.remove(index);

        let entry = self.factory.create_entry(source);
        if let Some(conflict) = self.conflicting_id(&entry) {
            tracing::warn!(id = %conflict, "replace refused, id already present");
            let (run, index) = Self::run_mut(&mut self.roots, &path)?;
            run.insert(index, old);
            return None;
        }

        let new_id = entry.id.clone();
        let (run, index) = Self::run_mut(&mut self.roots, &path)?;
        run.insert(index, entry);
        tracing::debug!(old = %id, new = %new_id, "entry replaced");
        Some(new_id)
    }

    /// Write the hidden flag of one entry in place, without touching its
    /// position or subtree. `None` removes the flag.
    ///
    /// The reorder session uses this to blank out a dragged entry and to
    /// restore its exact pre-gesture shape on cancel.
    pub fn set_hidden(&mut self, id: &EntryId, hidden: Option<bool>) -> bool {
        match self.find_mut(id) {
            Some(entry) => {
                entry.payload.set_hidden(hidden);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Locate helpers
    // =========================================================================

    /// Child-index path from the root run to the entry with `id`.
    fn locate(&self, id: &EntryId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if Self::locate_in(&self.roots, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn locate_in(siblings: &[Entry], id: &EntryId, path: &mut Vec<usize>) -> bool {
        for (index, entry) in siblings.iter().enumerate() {
            path.push(index);
            if &entry.id == id {
                return true;
            }
            if let Children::Group(children) = &entry.children
                && Self::locate_in(children, id, path)
            {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Resolve a located path to the run holding its entry plus the
    /// entry's index in that run.
    fn run_mut<'a>(roots: &'a mut Vec<Entry>, path: &[usize]) -> Option<(&'a mut Vec<Entry>, usize)> {
        let (&last, leading) = path.split_last()?;
        let mut run = roots;
        for &index in leading {
            run = run.get_mut(index)?.children.as_group_mut()?;
        }
        Some((run, last))
    }

    fn find_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        let path = self.locate(id)?;
        let (run, index) = Self::run_mut(&mut self.roots, &path)?;
        run.get_mut(index)
    }

    /// Mutable children run of the group with `parent_id`, if it exists
    /// and is a group.
    fn group_children_mut<'a>(
        roots: &'a mut Vec<Entry>,
        parent_id: &EntryId,
    ) -> Option<&'a mut Vec<Entry>> {
        let mut path = Vec::new();
        if !Self::locate_in(roots, parent_id, &mut path) {
            return None;
        }
        let (run, index) = Self::run_mut(roots, &path)?;
        run.get_mut(index)?.children.as_group_mut()
    }

    /// First id in `entry`'s subtree that is already present in the
    /// forest or repeated within the subtree itself.
    fn conflicting_id(&self, entry: &Entry) -> Option<EntryId> {
        let mut seen = BTreeSet::new();
        self.first_conflict(entry, &mut seen)
    }

    fn first_conflict<'a>(
        &self,
        entry: &'a Entry,
        seen: &mut BTreeSet<&'a EntryId>,
    ) -> Option<EntryId> {
        if self.contains(&entry.id) || !seen.insert(&entry.id) {
            return Some(entry.id.clone());
        }
        for child in entry.child_entries() {
            if let Some(conflict) = self.first_conflict(child, seen) {
                return Some(conflict);
            }
        }
        None
    }
}

impl Default for Forest {
    fn default() -> Self {
        Self::with_random_ids()
    }
}
