//! The shared, locking side of the registry.
//!
//! [`Registry`] wraps a [`LockedRegistry`] in a single mutex. Every method
//! here acquires that mutex for its whole duration and releases it on every
//! exit path. Code that already holds the lock (a removal hook, or a caller
//! in the middle of [`Registry::lock`]) works on the [`LockedRegistry`]
//! directly; it has no way to reach these locking methods by accident.

use crate::config::CodexConfig;
use crate::entry::Entry;
use crate::error::CodexResult;
use crate::locked::{LockedRegistry, RemoveStatus};
use crate::report::Report;
use codex_types::{EntryId, IdGenerator};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

/// Transient, non-owning reference to a registered entry.
///
/// The registry stays locked while the guard is alive. Drop it before
/// calling any other locking method on the same registry from the same
/// thread, or that call deadlocks.
pub type EntryGuard<'a, T> = MappedMutexGuard<'a, T>;

/// The single owner of every entry, shareable between threads.
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<LockedRegistry>,
}

impl Registry {
    /// Creates an empty registry that hands out UUID v7 identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry backed by `generator`.
    #[must_use]
    pub fn with_generator(generator: Box<dyn IdGenerator>) -> Self {
        Self {
            inner: Mutex::new(LockedRegistry::with_generator(generator)),
        }
    }

    /// Creates an empty registry as described by `config`.
    #[must_use]
    pub fn from_config(config: &CodexConfig) -> Self {
        Self {
            inner: Mutex::new(LockedRegistry::from_config(config)),
        }
    }

    /// Acquires the lock and hands out the already-locked registry.
    ///
    /// Use this to run several operations as one critical section.
    pub fn lock(&self) -> MutexGuard<'_, LockedRegistry> {
        self.inner.lock()
    }

    /// Produces a fresh identifier without inserting anything.
    pub fn generate_id(&self) -> CodexResult<EntryId> {
        self.inner.lock().generate_id()
    }

    // ================================================================
    // Insertion
    // ================================================================

    /// Takes ownership of `entry` and returns a guard over it.
    pub fn insert<T: Entry>(&self, entry: T) -> EntryGuard<'_, T> {
        MutexGuard::map(self.inner.lock(), |registry| registry.insert(entry))
    }

    /// Generates an identifier, builds the entry and inserts it, all under
    /// one acquisition of the lock.
    ///
    /// `build` runs while the registry is locked. Calling any locking method
    /// on the same registry from inside `build` deadlocks; build cross-links
    /// through [`Registry::lock`] and [`LockedRegistry::create`] instead.
    pub fn create<T, F>(&self, build: F) -> CodexResult<EntryGuard<'_, T>>
    where
        T: Entry,
        F: FnOnce(EntryId) -> T,
    {
        let guard = self.inner.lock();
        let id = guard.generate_id()?;
        Ok(MutexGuard::map(guard, move |registry| registry.insert(build(id))))
    }

    // ================================================================
    // Lookup
    // ================================================================

    /// Typed lookup. `None` if the id is unknown or the entry is not a `T`.
    pub fn lookup<T: Entry>(&self, id: EntryId) -> Option<EntryGuard<'_, T>> {
        MutexGuard::try_map(self.inner.lock(), |registry| registry.lookup_mut::<T>(id)).ok()
    }

    /// Runs `f` on the typed entry while holding the lock.
    pub fn with<T, R, F>(&self, id: EntryId, f: F) -> Option<R>
    where
        T: Entry,
        F: FnOnce(&T) -> R,
    {
        self.inner.lock().lookup::<T>(id).map(f)
    }

    /// Runs `f` on the typed entry, mutably, while holding the lock.
    pub fn with_mut<T, R, F>(&self, id: EntryId, f: F) -> Option<R>
    where
        T: Entry,
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock().lookup_mut::<T>(id).map(f)
    }

    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.inner.lock().contains(id)
    }

    // ================================================================
    // Removal
    // ================================================================

    /// Removes the entry with identifier `id`, running its removal hook.
    pub fn remove(&self, id: EntryId) -> RemoveStatus {
        self.inner.lock().remove(id)
    }

    /// Removes the entry behind `entry`.
    ///
    /// The guard is released before the removal re-acquires the lock, so
    /// another thread may win the race, in which case this reports
    /// [`RemoveStatus::NotFound`].
    pub fn remove_entry<T: Entry>(&self, entry: EntryGuard<'_, T>) -> RemoveStatus {
        let id = entry.id();
        drop(entry);
        self.remove(id)
    }

    /// Removes every entry, running each hook.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    // ================================================================
    // Enumeration
    // ================================================================

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Snapshot of all registered identifiers.
    #[must_use]
    pub fn ids(&self) -> Vec<EntryId> {
        self.inner.lock().ids().collect()
    }

    /// Visits every entry while holding the lock.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(EntryId, &(dyn Entry + 'static)),
    {
        let guard = self.inner.lock();
        for (id, entry) in guard.iter() {
            f(id, entry);
        }
    }

    /// Snapshot of every entry's identifier and description.
    #[must_use]
    pub fn describe_all(&self) -> Vec<(EntryId, String)> {
        self.inner
            .lock()
            .iter()
            .map(|(id, entry)| (id, entry.describe()))
            .collect()
    }

    /// Snapshot report of the registry's contents.
    #[must_use]
    pub fn report(&self) -> Report {
        self.inner.lock().report()
    }
}
