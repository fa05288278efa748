//! # HMS Core
//!
//! Core logic for the hospital management system's ICD-10 classification tree:
//! - Parsing tab-indented outlines into `(depth, code, description)` entries
//! - Building a parent-linked forest of codes with idempotent upserts keyed by code
//! - Searching leaf codes by case-insensitive substring
//!
//! **No API concerns**: HTTP servers, routing and response envelopes belong in `api-rest`
//! or `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod import;
pub mod node;
pub mod outline;
pub mod report;
pub mod search;
pub mod store;
pub mod tree;
pub mod uuid;

pub use config::CoreConfig;
pub use constants::{DEFAULT_DATABASE_PATH, MIN_QUERY_CHARS, SEARCH_RESULT_LIMIT};
pub use error::{CodeError, CodeResult};
pub use hms_types::{NonEmptyText, TextError};
pub use import::{ImportService, ImportSummary};
pub use node::{CodeNode, UpsertOutcome};
pub use outline::{OutlineEntry, OutlineReader};
pub use report::{verify, VerifyReport};
pub use search::{CodeDetail, SearchService};
pub use store::{CodeStore, MemoryCodeStore, SqliteCodeStore};
pub use tree::{ParentTracker, TreeBuilder};
pub use uuid::NodeId;
