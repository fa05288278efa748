//! Node identifiers.
//!
//! Every classification node is keyed by a UUID in a *canonical* representation:
//! **32 lowercase hexadecimal characters** (no hyphens), the same value you would get from
//! `Uuid::new_v4().simple().to_string()`. Parent references are stored as these keys, never
//! as embedded nodes.
//!
//! Canonical form is required for externally supplied identifiers (stored rows, API input).
//! Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected.

use crate::error::{CodeError, CodeResult};
use std::{fmt, str::FromStr};

pub use ::uuid::Uuid;

/// Canonical identifier of a [`CodeNode`](crate::CodeNode).
///
/// Once constructed the contained UUID is guaranteed to render in canonical form, so ids
/// round-trip through storage as plain text without normalisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generates a fresh random identifier for a newly created node.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> CodeResult<Self> {
        if !Self::is_canonical(input) {
            return Err(CodeError::InvalidInput(format!(
                "node id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| CodeError::InvalidInput(e.to_string()))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for NodeId {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeId::parse(s)
    }
}

impl serde::Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NodeId::parse(&s).map_err(serde::de::Error::custom)
    }
}
