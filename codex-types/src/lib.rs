//! Identifier types for the codex registry.
//!
//! This crate defines the pieces of the registry that know nothing about
//! entries themselves:
//! - [`EntryId`], the key every entry is stored under and the soft reference
//!   other entries embed to point at it
//! - [`IdGenerator`] and its implementations (UUID v7, UUID v4, sequential)
//! - [`IdScheme`], the configuration-time choice of generator

mod generator;
mod ids;

pub use generator::{IdGenerator, IdScheme, SequentialGenerator, UuidV4Generator, UuidV7Generator};
pub use ids::EntryId;

/// Errors raised while producing a new identifier.
///
/// These are fatal for the operation that asked for the identifier; the
/// registry never retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("identifier space of generator '{generator}' is exhausted")]
    Exhausted { generator: &'static str },

    #[error("generator '{generator}' is unavailable: {reason}")]
    Unavailable {
        generator: &'static str,
        reason: String,
    },
}
