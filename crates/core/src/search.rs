//! Leaf search and code lookup over the persisted forest.

use crate::config::CoreConfig;
use crate::constants::{MIN_QUERY_CHARS, SEARCH_RESULT_LIMIT};
use crate::error::CodeResult;
use crate::node::CodeNode;
use crate::store::CodeStore;
use std::sync::Arc;

/// A node together with its direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDetail {
    pub node: CodeNode,
    pub children: Vec<CodeNode>,
}

/// Read-only queries used by the diagnosis pickers.
///
/// Stateless apart from its limits; every call is an independent read.
#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn CodeStore>,
    limit: usize,
    min_query_chars: usize,
}

impl SearchService {
    pub fn new(store: Arc<dyn CodeStore>) -> Self {
        Self {
            store,
            limit: SEARCH_RESULT_LIMIT,
            min_query_chars: MIN_QUERY_CHARS,
        }
    }

    pub fn with_config(store: Arc<dyn CodeStore>, cfg: &CoreConfig) -> Self {
        Self {
            store,
            limit: cfg.search_limit(),
            min_query_chars: cfg.min_query_chars(),
        }
    }

    /// Leaf codes whose code or description contains `query`, ignoring case.
    ///
    /// Queries shorter than the minimum length return an empty list without touching the
    /// store. Results are ascending by code and capped at the configured limit.
    ///
    /// # Errors
    ///
    /// Storage errors are returned as-is; nothing is retried.
    pub fn search(&self, query: &str) -> CodeResult<Vec<CodeNode>> {
        if query.chars().count() < self.min_query_chars {
            return Ok(Vec::new());
        }
        self.store.search_leaves(query, self.limit)
    }

    /// Looks up a node by its exact code, with its children.
    pub fn lookup(&self, code: &str) -> CodeResult<Option<CodeDetail>> {
        let Some(node) = self.store.find_by_code(code)? else {
            return Ok(None);
        };
        let children = self.store.children_of(&node.id)?;
        Ok(Some(CodeDetail { node, children }))
    }
}
