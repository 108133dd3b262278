//! The already-locked side of the registry.
//!
//! [`LockedRegistry`] is the store itself: the identifier map plus the
//! generator. It has no lock of its own. Exclusive access is proven by
//! holding `&mut LockedRegistry`, which callers get from
//! [`Registry::lock`](crate::Registry::lock), from inside a removal hook, or
//! by owning one outright in single-threaded code.

use crate::config::CodexConfig;
use crate::entry::Entry;
use crate::error::{CodexResult, LookupError};
use crate::report::Report;
use codex_types::{EntryId, IdGenerator, UuidV7Generator};
use std::any::type_name;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace, warn};

/// Outcome of a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveStatus {
    /// The entry existed; its hook ran and it has been dropped.
    Removed,
    /// No entry had that identifier. Nothing happened.
    NotFound,
}

impl RemoveStatus {
    #[must_use]
    pub const fn is_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}

/// Monomorphised [`Entry::on_remove`] of a stored entry's concrete type.
type RemovalHook = fn(EntryId, &mut LockedRegistry);

/// A stored entry together with its type's removal hook.
struct Slot {
    entry: Box<dyn Entry>,
    on_remove: RemovalHook,
}

/// Identifier map and generator, without synchronisation.
pub struct LockedRegistry {
    entries: HashMap<EntryId, Slot>,
    /// Entries whose removal hook is currently running.
    removing: HashSet<EntryId>,
    generator: Box<dyn IdGenerator>,
    run_hook_on_replace: bool,
}

impl LockedRegistry {
    /// Creates an empty registry that hands out UUID v7 identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(Box::new(UuidV7Generator))
    }

    /// Creates an empty registry backed by `generator`.
    #[must_use]
    pub fn with_generator(generator: Box<dyn IdGenerator>) -> Self {
        Self {
            entries: HashMap::new(),
            removing: HashSet::new(),
            generator,
            run_hook_on_replace: true,
        }
    }

    /// Creates an empty registry as described by `config`.
    #[must_use]
    pub fn from_config(config: &CodexConfig) -> Self {
        Self {
            entries: HashMap::new(),
            removing: HashSet::new(),
            generator: config.generator(),
            run_hook_on_replace: config.run_hook_on_replace,
        }
    }

    /// Name of the generator backing this registry.
    #[must_use]
    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    // ================================================================
    // Insertion
    // ================================================================

    /// Produces a fresh identifier without inserting anything.
    pub fn generate_id(&self) -> CodexResult<EntryId> {
        Ok(self.generator.generate()?)
    }

    /// Takes ownership of `entry`, keyed by `entry.id()`.
    ///
    /// If the identifier is already taken the previous entry is removed
    /// first; its hook runs unless the registry was configured with
    /// `run_hook_on_replace = false`, or the previous entry is the one whose
    /// hook is running right now.
    pub fn insert<T: Entry>(&mut self, entry: T) -> &mut T {
        let id = entry.id();
        if let Some(existing) = self.entries.get(&id) {
            warn!(
                id = %id,
                replaced = existing.entry.entry_type(),
                "Identifier collision, replacing existing entry"
            );
            let hook_running = self.removing.remove(&id);
            if self.run_hook_on_replace && !hook_running {
                self.remove(id);
            }
            self.entries.remove(&id);
        }

        debug!(id = %id, entry_type = type_name::<T>(), "Entry inserted");
        let slot = Slot {
            entry: Box::new(entry),
            on_remove: <T as Entry>::on_remove,
        };
        let slot = self.entries.entry(id).insert_entry(slot).into_mut();
        match slot.entry.downcast_mut::<T>() {
            Some(entry) => entry,
            None => unreachable!("entry {id} was just stored as {}", type_name::<T>()),
        }
    }

    /// Generates an identifier, builds the entry from it and inserts it.
    ///
    /// On generation failure nothing is built and the registry is unchanged.
    pub fn create<T, F>(&mut self, build: F) -> CodexResult<&mut T>
    where
        T: Entry,
        F: FnOnce(EntryId) -> T,
    {
        let id = self.generate_id()?;
        Ok(self.insert(build(id)))
    }

    // ================================================================
    // Lookup
    // ================================================================

    /// Typed lookup, reporting why it failed.
    pub fn try_lookup<T: Entry>(&self, id: EntryId) -> Result<&T, LookupError> {
        let entry = &self.entries.get(&id).ok_or(LookupError::NotFound(id))?.entry;
        entry.downcast_ref::<T>().ok_or_else(|| {
            trace!(
                id = %id,
                expected = type_name::<T>(),
                actual = entry.entry_type(),
                "Lookup type mismatch"
            );
            LookupError::TypeMismatch {
                id,
                expected: type_name::<T>(),
                actual: entry.entry_type(),
            }
        })
    }

    /// Typed lookup. `None` if the id is unknown or the entry is not a `T`.
    pub fn lookup<T: Entry>(&self, id: EntryId) -> Option<&T> {
        self.try_lookup(id).ok()
    }

    /// Mutable typed lookup. `None` if the id is unknown or the entry is not a `T`.
    pub fn lookup_mut<T: Entry>(&mut self, id: EntryId) -> Option<&mut T> {
        let entry = &mut self.entries.get_mut(&id)?.entry;
        if !entry.is::<T>() {
            trace!(
                id = %id,
                expected = type_name::<T>(),
                actual = entry.entry_type(),
                "Lookup type mismatch"
            );
            return None;
        }
        entry.downcast_mut::<T>()
    }

    /// Untyped lookup. `downcast_ref` on the result recovers a concrete type.
    pub fn get(&self, id: EntryId) -> Option<&(dyn Entry + 'static)> {
        let slot = self.entries.get(&id)?;
        Some(&*slot.entry)
    }

    /// Untyped mutable lookup.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut (dyn Entry + 'static)> {
        let slot = self.entries.get_mut(&id)?;
        Some(&mut *slot.entry)
    }

    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    // ================================================================
    // Removal
    // ================================================================

    /// Removes the entry with identifier `id`.
    ///
    /// The entry's [`Entry::on_remove`] hook runs first, while the entry is
    /// still registered and resolvable through this registry. Only once the
    /// hook returns is the entry erased and dropped.
    ///
    /// Hooks may remove further entries. Removing an entry whose hook is
    /// already running reports [`RemoveStatus::NotFound`], so cyclic
    /// cascades terminate and every hook runs once.
    pub fn remove(&mut self, id: EntryId) -> RemoveStatus {
        let Some(slot) = self.entries.get(&id) else {
            debug!(id = %id, "Remove skipped, entry not found");
            return RemoveStatus::NotFound;
        };
        let on_remove = slot.on_remove;
        if !self.removing.insert(id) {
            debug!(id = %id, "Remove skipped, removal already in progress");
            return RemoveStatus::NotFound;
        }

        on_remove(id, self);

        // Cleared by `insert` if the hook replaced the entry; the
        // replacement stays.
        if self.removing.remove(&id) {
            if let Some(slot) = self.entries.remove(&id) {
                debug!(id = %id, entry_type = slot.entry.entry_type(), "Entry removed");
            }
        }
        RemoveStatus::Removed
    }

    /// Removes the entry `entry` refers to, by its identifier.
    pub fn remove_entry<E: Entry + ?Sized>(&mut self, entry: &E) -> RemoveStatus {
        self.remove(entry.id())
    }

    /// Removes every entry, running each hook.
    ///
    /// Entries whose hook is already running (when called from a hook) are
    /// left to their own removal. Hooks that keep inserting new entries make
    /// this loop forever.
    pub fn clear(&mut self) {
        loop {
            let batch: Vec<EntryId> = self
                .entries
                .keys()
                .filter(|id| !self.removing.contains(id))
                .copied()
                .collect();
            if batch.is_empty() {
                break;
            }
            for id in batch {
                self.remove(id);
            }
        }
    }

    // ================================================================
    // Enumeration
    // ================================================================

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of all registered entries, in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = EntryId> {
        self.entries.keys().copied()
    }

    /// All registered entries, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &(dyn Entry + 'static))> {
        self.entries.iter().map(|(id, slot)| (*id, &*slot.entry))
    }

    /// Snapshot of every entry's identifier and description.
    #[must_use]
    pub fn report(&self) -> Report {
        self.iter()
            .map(|(id, entry)| (id, entry.describe()))
            .collect()
    }
}

impl Default for LockedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LockedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedRegistry")
            .field("len", &self.entries.len())
            .field("removing", &self.removing.len())
            .field("generator", &self.generator.name())
            .field("run_hook_on_replace", &self.run_hook_on_replace)
            .finish()
    }
}
