//! Classification node records.

use crate::uuid::NodeId;
use serde::{Deserialize, Serialize};

/// One entry of the classification forest.
///
/// Parent links are stored as ids. Children are never stored on the node; they are always
/// derived by asking the store for nodes whose `parent_id` equals this node's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeNode {
    pub id: NodeId,
    pub code: String,
    pub description: String,
    pub parent_id: Option<NodeId>,
}

/// Whether an upsert created a new node or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}
