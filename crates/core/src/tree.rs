//! Attaching parsed outline entries to the persisted forest.
//!
//! A [`TreeBuilder`] owns one [`ParentTracker`] for the duration of a single import run.
//! The tracker maps each depth to the most recent node persisted at that depth, so the
//! parent of an entry at depth `L` is whatever was last recorded at `L - 1`.

use crate::error::{CodeError, CodeResult};
use crate::node::{CodeNode, UpsertOutcome};
use crate::outline::OutlineEntry;
use crate::store::CodeStore;
use crate::uuid::NodeId;

/// Where an entry at a given depth attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentSlot {
    /// Depth 0: the entry is a chapter with no parent.
    Root,
    Child(NodeId),
    /// Nothing has been recorded at the parent depth.
    Missing,
}

/// Most recent node id per depth, for one import run.
///
/// Entries are only ever overwritten by a later successful upsert at the same depth.
/// Skipped and failed lines leave the mapping untouched.
#[derive(Debug, Default, Clone)]
pub struct ParentTracker {
    by_depth: Vec<NodeId>,
}

impl ParentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, depth: usize) -> ParentSlot {
        if depth == 0 {
            return ParentSlot::Root;
        }
        match self.by_depth.get(depth - 1) {
            Some(id) => ParentSlot::Child(*id),
            None => ParentSlot::Missing,
        }
    }

    /// Makes `id` the current node at `depth`.
    ///
    /// Only valid once the parent at `depth - 1` has been resolved.
    pub fn record(&mut self, depth: usize, id: NodeId) {
        debug_assert!(self.by_depth.len() >= depth, "parent depth not resolved");
        match self.by_depth.get_mut(depth) {
            Some(current) => *current = id,
            None => self.by_depth.push(id),
        }
    }

    /// Number of depths that have seen a node.
    pub fn len(&self) -> usize {
        self.by_depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_depth.is_empty()
    }
}

/// Resolves parents for outline entries and upserts them into a [`CodeStore`].
pub struct TreeBuilder<'a> {
    store: &'a dyn CodeStore,
    tracker: ParentTracker,
}

impl<'a> TreeBuilder<'a> {
    /// Starts a run with an empty tracker.
    pub fn new(store: &'a dyn CodeStore) -> Self {
        Self {
            store,
            tracker: ParentTracker::new(),
        }
    }

    /// Attaches `entry` under the most recent node at the depth above it and persists it.
    ///
    /// The tracker is only updated when the upsert succeeds.
    ///
    /// # Errors
    ///
    /// - [`CodeError::MissingParent`] if no node was ever recorded at `depth - 1`.
    /// - [`CodeError::AncestorCycle`] if the code already names the resolved parent or one
    ///   of its stored ancestors.
    /// - Any storage error from the underlying store.
    pub fn attach(&mut self, entry: &OutlineEntry) -> CodeResult<(CodeNode, UpsertOutcome)> {
        let (node, outcome) = self.upsert(entry)?;
        self.tracker.record(entry.depth, node.id);
        Ok((node, outcome))
    }

    pub fn tracker(&self) -> &ParentTracker {
        &self.tracker
    }

    fn upsert(&self, entry: &OutlineEntry) -> CodeResult<(CodeNode, UpsertOutcome)> {
        let parent_id = match self.tracker.slot(entry.depth) {
            ParentSlot::Root => None,
            ParentSlot::Child(id) => Some(id),
            ParentSlot::Missing => {
                return Err(CodeError::MissingParent {
                    line_number: entry.line_number,
                    parent_depth: entry.depth - 1,
                    code: entry.code.to_string(),
                })
            }
        };

        if let (Some(parent_id), Some(existing)) =
            (parent_id, self.store.find_by_code(entry.code.as_str())?)
        {
            if self.is_in_lineage(&existing.id, parent_id)? {
                return Err(CodeError::AncestorCycle {
                    line_number: entry.line_number,
                    code: entry.code.to_string(),
                });
            }
        }

        self.store.upsert(
            entry.code.as_str(),
            entry.description.as_str(),
            parent_id,
        )
    }

    /// True if `id` is `start` or one of its stored ancestors.
    fn is_in_lineage(&self, id: &NodeId, start: NodeId) -> CodeResult<bool> {
        let mut current = Some(start);
        while let Some(ancestor) = current {
            if &ancestor == id {
                return Ok(true);
            }
            current = self
                .store
                .find_by_id(&ancestor)?
                .and_then(|node| node.parent_id);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCodeStore;
    use hms_types::NonEmptyText;

    fn entry(line_number: usize, depth: usize, code: &str, description: &str) -> OutlineEntry {
        OutlineEntry {
            line_number,
            depth,
            code: NonEmptyText::new(code).unwrap(),
            description: NonEmptyText::new(description).unwrap(),
        }
    }

    #[test]
    fn test_tracker_slots_follow_recorded_depths() {
        let mut tracker = ParentTracker::new();
        let chapter = NodeId::new();
        let block = NodeId::new();

        assert_eq!(tracker.slot(0), ParentSlot::Root);
        assert_eq!(tracker.slot(1), ParentSlot::Missing);

        tracker.record(0, chapter);
        tracker.record(1, block);
        assert_eq!(tracker.slot(1), ParentSlot::Child(chapter));
        assert_eq!(tracker.slot(2), ParentSlot::Child(block));
    }

    #[test]
    fn test_recording_shallower_node_keeps_deeper_ones() {
        let mut tracker = ParentTracker::new();
        tracker.record(0, NodeId::new());
        let block = NodeId::new();
        tracker.record(1, block);
        tracker.record(2, NodeId::new());

        let next_chapter = NodeId::new();
        tracker.record(0, next_chapter);

        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.slot(1), ParentSlot::Child(next_chapter));
        assert_eq!(tracker.slot(2), ParentSlot::Child(block));
    }

    #[test]
    fn test_builds_three_level_chain() {
        let store = MemoryCodeStore::new();
        let mut builder = TreeBuilder::new(&store);

        let (chapter, _) = builder
            .attach(&entry(1, 0, "I", "Certain infectious and parasitic diseases"))
            .unwrap();
        let (block, _) = builder
            .attach(&entry(2, 1, "A00-A09", "Intestinal infectious diseases"))
            .unwrap();
        let (leaf, outcome) = builder.attach(&entry(3, 2, "A00", "Cholera")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(chapter.parent_id, None);
        assert_eq!(block.parent_id, Some(chapter.id));
        assert_eq!(leaf.parent_id, Some(block.id));
        assert_eq!(builder.tracker().len(), 3);
    }

    #[test]
    fn test_entry_without_parent_is_rejected() {
        let store = MemoryCodeStore::new();
        let mut builder = TreeBuilder::new(&store);

        match builder.attach(&entry(1, 2, "A00", "Cholera")) {
            Err(CodeError::MissingParent {
                line_number,
                parent_depth,
                code,
            }) => {
                assert_eq!(line_number, 1);
                assert_eq!(parent_depth, 1);
                assert_eq!(code, "A00");
            }
            other => panic!("expected MissingParent, got {:?}", other),
        }
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_deeper_line_uses_most_recent_entry_at_parent_depth() {
        let store = MemoryCodeStore::new();
        let mut builder = TreeBuilder::new(&store);

        builder.attach(&entry(1, 0, "I", "Infectious")).unwrap();
        let (block, _) = builder.attach(&entry(2, 1, "A00-A09", "Intestinal")).unwrap();
        builder.attach(&entry(3, 0, "II", "Neoplasms")).unwrap();

        let (leaf, _) = builder.attach(&entry(4, 2, "C00", "Lip")).unwrap();
        assert_eq!(leaf.parent_id, Some(block.id));
    }

    #[test]
    fn test_failed_line_leaves_tracker_untouched() {
        let store = MemoryCodeStore::new();
        let mut builder = TreeBuilder::new(&store);

        builder.attach(&entry(1, 0, "I", "Infectious")).unwrap();
        let (block, _) = builder.attach(&entry(2, 1, "A00-A09", "Intestinal")).unwrap();
        builder.attach(&entry(3, 2, "A00", "Cholera")).unwrap();

        let orphan = builder.attach(&entry(4, 4, "A00.9", "Unspecified"));
        assert!(matches!(orphan, Err(CodeError::MissingParent { .. })));

        let (leaf, _) = builder.attach(&entry(5, 2, "A01", "Typhoid")).unwrap();
        assert_eq!(leaf.parent_id, Some(block.id));
        assert_eq!(builder.tracker().len(), 3);
    }

    #[test]
    fn test_code_repeated_under_itself_is_refused() {
        let store = MemoryCodeStore::new();
        let mut builder = TreeBuilder::new(&store);

        let (chapter, _) = builder.attach(&entry(1, 0, "I", "Infectious")).unwrap();
        builder.attach(&entry(2, 1, "A00-A09", "Intestinal")).unwrap();

        let result = builder.attach(&entry(3, 2, "I", "Infectious again"));
        assert!(matches!(result, Err(CodeError::AncestorCycle { .. })));

        let stored = store.find_by_code("I").unwrap().unwrap();
        assert_eq!(stored, chapter);
    }

    #[test]
    fn test_code_repeated_under_stale_parent_is_refused() {
        let store = MemoryCodeStore::new();
        let mut builder = TreeBuilder::new(&store);

        let (chapter, _) = builder.attach(&entry(1, 0, "I", "Infectious")).unwrap();
        builder.attach(&entry(2, 1, "A00-A09", "Intestinal")).unwrap();
        builder.attach(&entry(3, 0, "II", "Neoplasms")).unwrap();

        // Depth 1 still maps to A00-A09, whose stored parent is I.
        let result = builder.attach(&entry(4, 2, "I", "Infectious again"));
        assert!(matches!(result, Err(CodeError::AncestorCycle { .. })));
        assert_eq!(store.find_by_code("I").unwrap().unwrap(), chapter);
    }

    #[test]
    fn test_code_repeated_elsewhere_moves_node() {
        let store = MemoryCodeStore::new();
        let mut builder = TreeBuilder::new(&store);

        builder.attach(&entry(1, 0, "I", "Infectious")).unwrap();
        let (first, _) = builder.attach(&entry(2, 1, "A00", "Cholera")).unwrap();
        let (chapter_ii, _) = builder.attach(&entry(3, 0, "II", "Neoplasms")).unwrap();
        let (moved, outcome) = builder.attach(&entry(4, 1, "A00", "Cholera")).unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(moved.id, first.id);
        assert_eq!(moved.parent_id, Some(chapter_ii.id));
        assert_eq!(store.count().unwrap(), 3);
    }
}
