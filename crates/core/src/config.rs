//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in this crate reads environment variables during request handling.

use crate::constants::{DEFAULT_DATABASE_PATH, MIN_QUERY_CHARS, SEARCH_RESULT_LIMIT};
use crate::{CodeError, CodeResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_path: PathBuf,
    search_limit: usize,
    min_query_chars: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with the default search limits.
    pub fn new(database_path: PathBuf) -> CodeResult<Self> {
        if database_path.as_os_str().is_empty() {
            return Err(CodeError::InvalidInput(
                "database path cannot be empty".into(),
            ));
        }

        Ok(Self {
            database_path,
            search_limit: SEARCH_RESULT_LIMIT,
            min_query_chars: MIN_QUERY_CHARS,
        })
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    pub fn min_query_chars(&self) -> usize {
        self.min_query_chars
    }
}

/// Resolve the database path from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATABASE_PATH`].
pub fn database_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

/// Resolve an optional outline path; empty values count as unset.
pub fn outline_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_database_path() {
        let err = CoreConfig::new(PathBuf::new()).expect_err("empty path should be rejected");
        assert!(matches!(err, CodeError::InvalidInput(_)));
    }

    #[test]
    fn test_new_uses_default_limits() {
        let cfg = CoreConfig::new(PathBuf::from("codes.db")).unwrap();
        assert_eq!(cfg.database_path(), Path::new("codes.db"));
        assert_eq!(cfg.search_limit(), 20);
        assert_eq!(cfg.min_query_chars(), 2);
    }

    #[test]
    fn test_database_path_falls_back_to_default() {
        assert_eq!(
            database_path_from_env_value(None),
            PathBuf::from(DEFAULT_DATABASE_PATH)
        );
        assert_eq!(
            database_path_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_DATABASE_PATH)
        );
        assert_eq!(
            database_path_from_env_value(Some(" /data/hms.db ".into())),
            PathBuf::from("/data/hms.db")
        );
    }

    #[test]
    fn test_outline_path_treats_blank_as_unset() {
        assert_eq!(outline_path_from_env_value(Some("".into())), None);
        assert_eq!(
            outline_path_from_env_value(Some("ICD10.md".into())),
            Some(PathBuf::from("ICD10.md"))
        );
    }
}
