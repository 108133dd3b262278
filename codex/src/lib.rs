//! Central ownership registry.
//!
//! Entries of any type are handed to one authority, the registry, which
//! owns them exclusively and keys them by a unique [`EntryId`]. Everything
//! else holds identifiers only, and resolves them on demand:
//! - [`Entry`] — the contract stored values implement (identity,
//!   description, removal hook)
//! - [`Registry`] — the shared store; every operation takes the lock
//! - [`LockedRegistry`] — the same operations for code that already holds
//!   the lock, most importantly removal hooks
//! - [`Report`] — a printable snapshot of the registry
//!
//! Relationships between entries (parent/child, many-to-many, cycles) are
//! identifiers stored in the entries' own fields. Because no entry owns
//! another, there is nothing to leak and nothing to free twice: a removed
//! entry's identifier simply stops resolving.

mod config;
mod entry;
mod error;
mod locked;
mod registry;
mod report;

pub use codex_types::{
    EntryId, GenerationError, IdGenerator, IdScheme, SequentialGenerator, UuidV4Generator,
    UuidV7Generator,
};
pub use config::CodexConfig;
pub use entry::Entry;
pub use error::{CodexError, CodexResult, LookupError};
pub use locked::{LockedRegistry, RemoveStatus};
pub use registry::{EntryGuard, Registry};
pub use report::{Report, ReportLine};
