//! # API Shared
//!
//! Shared definitions for the HMS APIs.
//!
//! Contains:
//! - Wire types for classification nodes and the `{ success, data | error }` envelope
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the CLI so both speak the same JSON.

pub mod health;
pub mod response;

pub use health::{HealthRes, HealthService};
pub use response::{CodeDetailDto, CodeDetailRes, CodeNodeDto, ErrorRes, SearchRes};
