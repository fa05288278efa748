//! In-process [`CodeStore`] backed by an arena of nodes.
//!
//! Nodes live in a map keyed by [`NodeId`] with a secondary index from code to id. There is
//! no forward child list: children and leafness are computed from `parent_id` on demand.

use super::{fold_case, CodeStore};
use crate::error::{CodeError, CodeResult};
use crate::node::{CodeNode, UpsertOutcome};
use crate::uuid::NodeId;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Arena {
    nodes: HashMap<NodeId, CodeNode>,
    by_code: HashMap<String, NodeId>,
}

impl Arena {
    fn sorted(mut nodes: Vec<CodeNode>) -> Vec<CodeNode> {
        nodes.sort_by(|a, b| a.code.cmp(&b.code));
        nodes
    }
}

#[derive(Debug, Default)]
pub struct MemoryCodeStore {
    arena: RwLock<Arena>,
}

impl MemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CodeResult<RwLockReadGuard<'_, Arena>> {
        self.arena.read().map_err(|_| CodeError::StorePoisoned)
    }

    fn write(&self) -> CodeResult<RwLockWriteGuard<'_, Arena>> {
        self.arena.write().map_err(|_| CodeError::StorePoisoned)
    }
}

impl CodeStore for MemoryCodeStore {
    fn find_by_code(&self, code: &str) -> CodeResult<Option<CodeNode>> {
        let arena = self.read()?;
        Ok(arena
            .by_code
            .get(code)
            .and_then(|id| arena.nodes.get(id))
            .cloned())
    }

    fn find_by_id(&self, id: &NodeId) -> CodeResult<Option<CodeNode>> {
        Ok(self.read()?.nodes.get(id).cloned())
    }

    fn upsert(
        &self,
        code: &str,
        description: &str,
        parent_id: Option<NodeId>,
    ) -> CodeResult<(CodeNode, UpsertOutcome)> {
        let mut arena = self.write()?;

        if let Some(parent) = parent_id {
            if !arena.nodes.contains_key(&parent) {
                return Err(CodeError::InvalidInput(format!(
                    "parent {} does not exist",
                    parent
                )));
            }
        }

        if let Some(id) = arena.by_code.get(code).copied() {
            if let Some(node) = arena.nodes.get_mut(&id) {
                node.description = description.to_string();
                node.parent_id = parent_id;
                return Ok((node.clone(), UpsertOutcome::Updated));
            }
        }

        let node = CodeNode {
            id: NodeId::new(),
            code: code.to_string(),
            description: description.to_string(),
            parent_id,
        };
        arena.by_code.insert(node.code.clone(), node.id);
        arena.nodes.insert(node.id, node.clone());
        Ok((node, UpsertOutcome::Created))
    }

    fn children_of(&self, id: &NodeId) -> CodeResult<Vec<CodeNode>> {
        let arena = self.read()?;
        Ok(Arena::sorted(
            arena
                .nodes
                .values()
                .filter(|n| n.parent_id.as_ref() == Some(id))
                .cloned()
                .collect(),
        ))
    }

    fn roots(&self) -> CodeResult<Vec<CodeNode>> {
        let arena = self.read()?;
        Ok(Arena::sorted(
            arena
                .nodes
                .values()
                .filter(|n| n.parent_id.is_none())
                .cloned()
                .collect(),
        ))
    }

    fn count(&self) -> CodeResult<usize> {
        Ok(self.read()?.nodes.len())
    }

    fn search_leaves(&self, needle: &str, limit: usize) -> CodeResult<Vec<CodeNode>> {
        let arena = self.read()?;
        let needle = fold_case(needle);
        let parents: HashSet<NodeId> = arena.nodes.values().filter_map(|n| n.parent_id).collect();

        let mut hits = Arena::sorted(
            arena
                .nodes
                .values()
                .filter(|n| !parents.contains(&n.id))
                .filter(|n| {
                    fold_case(&n.code).contains(&needle)
                        || fold_case(&n.description).contains(&needle)
                })
                .cloned()
                .collect(),
        );
        hits.truncate(limit);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_upsert_keeps_id_and_rewrites_fields() {
        contract::upsert_keeps_id_and_rewrites_fields(&MemoryCodeStore::new());
    }

    #[test]
    fn test_children_and_roots_are_derived() {
        contract::children_and_roots_are_derived(&MemoryCodeStore::new());
    }

    #[test]
    fn test_search_returns_only_matching_leaves() {
        contract::search_returns_only_matching_leaves(&MemoryCodeStore::new());
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        contract::search_treats_wildcards_literally(&MemoryCodeStore::new());
    }

    #[test]
    fn test_leafness_follows_new_children() {
        contract::leafness_follows_new_children(&MemoryCodeStore::new());
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let store = MemoryCodeStore::new();
        let result = store.upsert("A00", "Cholera", Some(NodeId::new()));
        assert!(matches!(result, Err(CodeError::InvalidInput(_))));
        assert_eq!(store.count().unwrap(), 0);
    }
}
