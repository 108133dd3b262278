//! Identifier generation.
//!
//! The registry only ever talks to the [`IdGenerator`] trait. Which
//! implementation backs it is decided once, when the registry is built,
//! usually from [`IdScheme`] in the configuration file.

use crate::{EntryId, GenerationError};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::{Builder, Uuid};

/// Source of fresh, never-repeating entry identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produces an identifier that this generator has never produced before.
    fn generate(&self) -> Result<EntryId, GenerationError>;

    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;
}

/// Fills `N` bytes from `rng`, reporting a failing entropy source as
/// [`GenerationError::Unavailable`].
fn random_bytes<const N: usize>(
    rng: &mut impl RngCore,
    generator: &'static str,
) -> Result<[u8; N], GenerationError> {
    let mut bytes = [0u8; N];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| GenerationError::Unavailable {
            generator,
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

/// Time-ordered UUID v7 identifiers. The default.
///
/// Ordering is by millisecond: ids minted within the same millisecond are
/// distinct but not ordered among themselves. Both a failing OS entropy
/// source and a system clock set before 1970 surface as
/// [`GenerationError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn generate(&self) -> Result<EntryId, GenerationError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| GenerationError::Unavailable {
                generator: self.name(),
                reason: format!("system clock is before the Unix epoch: {e}"),
            })?
            .as_millis();
        let millis = u64::try_from(millis).unwrap_or(u64::MAX);
        let random = random_bytes::<10>(&mut OsRng, self.name())?;
        let uuid = Builder::from_unix_timestamp_millis(millis, &random).into_uuid();
        Ok(EntryId::from_uuid(uuid))
    }

    fn name(&self) -> &'static str {
        "uuid-v7"
    }
}

/// Random UUID v4 identifiers, drawn from the OS entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> Result<EntryId, GenerationError> {
        let random = random_bytes::<16>(&mut OsRng, self.name())?;
        Ok(EntryId::from_uuid(Builder::from_random_bytes(random).into_uuid()))
    }

    fn name(&self) -> &'static str {
        "uuid-v4"
    }
}

/// Deterministic identifiers counting up from a start value.
///
/// Useful for reproducible reports and tests. The counter never wraps:
/// once `u64::MAX` would be handed out the generator reports
/// [`GenerationError::Exhausted`] for every further call.
#[derive(Debug)]
pub struct SequentialGenerator {
    next: AtomicU64,
}

impl SequentialGenerator {
    /// Creates a generator whose first identifier encodes `start`.
    #[must_use]
    pub const fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Default for SequentialGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&self) -> Result<EntryId, GenerationError> {
        let value = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map_err(|_| GenerationError::Exhausted {
                generator: self.name(),
            })?;
        Ok(EntryId::from_uuid(Uuid::from_u128(u128::from(value))))
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Which generator a registry is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    V7,
    V4,
    Sequential,
}

impl IdScheme {
    /// Builds the generator for this scheme.
    ///
    /// `sequential_start` is only read by [`IdScheme::Sequential`].
    #[must_use]
    pub fn generator(self, sequential_start: u64) -> Box<dyn IdGenerator> {
        match self {
            Self::V7 => Box::new(UuidV7Generator),
            Self::V4 => Box::new(UuidV4Generator),
            Self::Sequential => Box::new(SequentialGenerator::starting_at(sequential_start)),
        }
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::V7 => "v7",
            Self::V4 => "v4",
            Self::Sequential => "sequential",
        };
        f.write_str(name)
    }
}
