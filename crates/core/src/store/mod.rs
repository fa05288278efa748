//! Persistence for the classification forest.
//!
//! [`CodeStore`] is the seam between the importer/search services and durable storage.
//! Implementations must honour three rules:
//!
//! - `code` is unique; [`CodeStore::upsert`] keyed by code keeps the existing id.
//! - Parent references are ids; children are derived by reverse lookup on `parent_id`.
//! - A leaf is a node with zero children *at query time*; leafness is never stored.

mod memory;
mod sqlite;

pub use memory::MemoryCodeStore;
pub use sqlite::SqliteCodeStore;

use crate::error::CodeResult;
use crate::node::{CodeNode, UpsertOutcome};
use crate::uuid::NodeId;

pub trait CodeStore: Send + Sync {
    fn find_by_code(&self, code: &str) -> CodeResult<Option<CodeNode>>;

    fn find_by_id(&self, id: &NodeId) -> CodeResult<Option<CodeNode>>;

    /// Creates the node if `code` is absent, otherwise rewrites its description and parent.
    ///
    /// Each call is its own transaction.
    fn upsert(
        &self,
        code: &str,
        description: &str,
        parent_id: Option<NodeId>,
    ) -> CodeResult<(CodeNode, UpsertOutcome)>;

    /// Direct children of `id`, ascending by code.
    fn children_of(&self, id: &NodeId) -> CodeResult<Vec<CodeNode>>;

    /// Depth-0 nodes, ascending by code.
    fn roots(&self) -> CodeResult<Vec<CodeNode>>;

    fn count(&self) -> CodeResult<usize>;

    /// Childless nodes whose code or description contains `needle` ignoring case, ascending
    /// by code, at most `limit` of them.
    fn search_leaves(&self, needle: &str, limit: usize) -> CodeResult<Vec<CodeNode>>;
}

/// Case folding shared by every store so matching is identical across backends.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
pub(crate) mod contract {
    //! Behaviour every `CodeStore` must share, run against each backend.

    use super::*;

    pub(crate) fn upsert_keeps_id_and_rewrites_fields(store: &dyn CodeStore) {
        let (chapter, outcome) = store.upsert("I", "Infectious", None).unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let (block, _) = store
            .upsert("A00-A09", "Intestinal", Some(chapter.id))
            .unwrap();
        let (again, outcome) = store
            .upsert("A00-A09", "Intestinal infectious diseases", Some(chapter.id))
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(again.id, block.id);
        assert_eq!(again.description, "Intestinal infectious diseases");
        assert_eq!(store.count().unwrap(), 2);

        let stored = store.find_by_code("A00-A09").unwrap().unwrap();
        assert_eq!(stored, again);
        assert_eq!(store.find_by_id(&block.id).unwrap().unwrap(), again);
    }

    pub(crate) fn children_and_roots_are_derived(store: &dyn CodeStore) {
        let (chapter_ii, _) = store.upsert("II", "Neoplasms", None).unwrap();
        let (chapter_i, _) = store.upsert("I", "Infectious", None).unwrap();
        store
            .upsert("A15-A19", "Tuberculosis", Some(chapter_i.id))
            .unwrap();
        store
            .upsert("A00-A09", "Intestinal", Some(chapter_i.id))
            .unwrap();

        let roots: Vec<String> = store.roots().unwrap().into_iter().map(|n| n.code).collect();
        assert_eq!(roots, vec!["I", "II"]);

        let children: Vec<String> = store
            .children_of(&chapter_i.id)
            .unwrap()
            .into_iter()
            .map(|n| n.code)
            .collect();
        assert_eq!(children, vec!["A00-A09", "A15-A19"]);
        assert!(store.children_of(&chapter_ii.id).unwrap().is_empty());
    }

    pub(crate) fn search_returns_only_matching_leaves(store: &dyn CodeStore) {
        let (chapter, _) = store
            .upsert("I", "Certain infectious and parasitic diseases", None)
            .unwrap();
        let (block, _) = store
            .upsert("A00-A09", "Intestinal infectious diseases", Some(chapter.id))
            .unwrap();
        store.upsert("A00", "Cholera", Some(block.id)).unwrap();
        store
            .upsert("A01", "Typhoid and paratyphoid fevers", Some(block.id))
            .unwrap();

        let hits = store.search_leaves("chol", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "A00");

        // "infectious" appears only on non-leaf nodes
        assert!(store.search_leaves("INFECTIOUS", 20).unwrap().is_empty());

        let by_code: Vec<String> = store
            .search_leaves("a0", 20)
            .unwrap()
            .into_iter()
            .map(|n| n.code)
            .collect();
        assert_eq!(by_code, vec!["A00", "A01"]);

        let capped = store.search_leaves("a0", 1).unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].code, "A00");
    }

    pub(crate) fn search_treats_wildcards_literally(store: &dyn CodeStore) {
        store.upsert("Z99", "Dependence on 100% oxygen", None).unwrap();
        store.upsert("Z98", "Other states", None).unwrap();

        let hits = store.search_leaves("0%", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "Z99");
        assert!(store.search_leaves("_", 20).unwrap().is_empty());
    }

    pub(crate) fn leafness_follows_new_children(store: &dyn CodeStore) {
        let (block, _) = store.upsert("B15-B19", "Viral hepatitis", None).unwrap();
        assert_eq!(store.search_leaves("hepatitis", 20).unwrap().len(), 1);

        store
            .upsert("B15", "Acute hepatitis A", Some(block.id))
            .unwrap();
        let hits = store.search_leaves("hepatitis", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "B15");
    }
}
