//! Constants used throughout the HMS core crate.

/// Default SQLite database file when no explicit path is configured.
pub const DEFAULT_DATABASE_PATH: &str = "hms.db";

/// Conventional filename of the ICD-10 outline shipped alongside the database.
pub const DEFAULT_OUTLINE_FILENAME: &str = "ICD10.md";

/// Maximum number of leaf nodes returned by a single search.
pub const SEARCH_RESULT_LIMIT: usize = 20;

/// Queries shorter than this (in characters) return no results without touching storage.
pub const MIN_QUERY_CHARS: usize = 2;

/// Character that marks one level of nesting in an outline line.
pub const OUTLINE_INDENT: char = '\t';

/// Chapter code inspected by the verify report when none is given.
pub const DEFAULT_VERIFY_CHAPTER: &str = "I";
