//! JSON response bodies.
//!
//! Every body carries a `success` flag. Successful responses put their payload under
//! `data`; failures carry a human-readable `error` and nothing else.

use hms_core::{CodeDetail, CodeNode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One classification node as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeNodeDto {
    /// Canonical 32-character hex id
    pub id: String,
    pub code: String,
    pub description: String,
    pub parent_id: Option<String>,
}

impl From<CodeNode> for CodeNodeDto {
    fn from(node: CodeNode) -> Self {
        Self {
            id: node.id.to_string(),
            code: node.code,
            description: node.description,
            parent_id: node.parent_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CodeDetailDto {
    #[serde(flatten)]
    pub node: CodeNodeDto,
    pub children: Vec<CodeNodeDto>,
}

impl From<CodeDetail> for CodeDetailDto {
    fn from(detail: CodeDetail) -> Self {
        Self {
            node: detail.node.into(),
            children: detail.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SearchRes {
    pub success: bool,
    pub data: Vec<CodeNodeDto>,
}

impl SearchRes {
    pub fn ok(nodes: Vec<CodeNode>) -> Self {
        Self {
            success: true,
            data: nodes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CodeDetailRes {
    pub success: bool,
    pub data: CodeDetailDto,
}

impl CodeDetailRes {
    pub fn ok(detail: CodeDetail) -> Self {
        Self {
            success: true,
            data: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub success: bool,
    pub error: String,
}

impl ErrorRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new("Not found")
    }
}
