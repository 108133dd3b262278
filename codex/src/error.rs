//! Error types for the registry.

use codex_types::{EntryId, GenerationError};
use thiserror::Error;

/// Result type for registry operations that can fail.
pub type CodexResult<T> = Result<T, CodexError>;

/// Errors surfaced by the registry.
///
/// A missing or type-mismatched entry is not an error here: lookups answer
/// with `None` and removals with [`RemoveStatus::NotFound`](crate::RemoveStatus).
#[derive(Debug, Error)]
pub enum CodexError {
    /// The identifier generator could not produce a new identifier.
    #[error("identifier generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error while rendering a report.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a typed lookup produced no usable reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("entry not found: {0}")]
    NotFound(EntryId),

    #[error("entry {id} is a '{actual}', not a '{expected}'")]
    TypeMismatch {
        id: EntryId,
        expected: &'static str,
        actual: &'static str,
    },
}
