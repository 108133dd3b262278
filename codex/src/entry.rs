//! The contract every stored value satisfies.

use crate::LockedRegistry;
use codex_types::EntryId;
use std::any::{Any, type_name};

/// A value owned by the registry.
///
/// Entries never own each other. A relationship is expressed by storing the
/// other entry's [`EntryId`] (a soft reference) and resolving it through
/// [`LockedRegistry::lookup`] when needed. A soft reference may outlive its
/// target; resolving it then simply yields `None`.
///
/// # Example
///
/// ```
/// use codex::{Entry, EntryId, LockedRegistry, Registry};
///
/// struct Child {
///     id: EntryId,
///     parent: EntryId,
/// }
///
/// struct Parent {
///     id: EntryId,
///     children: Vec<EntryId>,
/// }
///
/// impl Entry for Parent {
///     fn id(&self) -> EntryId {
///         self.id
///     }
/// }
///
/// impl Entry for Child {
///     fn id(&self) -> EntryId {
///         self.id
///     }
///
///     fn on_remove(id: EntryId, registry: &mut LockedRegistry) {
///         let Some(parent) = registry.lookup::<Child>(id).map(|c| c.parent) else {
///             return;
///         };
///         if let Some(parent) = registry.lookup_mut::<Parent>(parent) {
///             parent.children.retain(|c| *c != id);
///         }
///     }
/// }
///
/// let registry = Registry::new();
/// let parent = registry
///     .create(|id| Parent { id, children: Vec::new() })
///     .unwrap()
///     .id();
/// let child = registry.create(|id| Child { id, parent }).unwrap().id();
/// registry.lookup::<Parent>(parent).unwrap().children.push(child);
///
/// assert!(registry.remove(child).is_removed());
/// assert!(registry.lookup::<Parent>(parent).unwrap().children.is_empty());
/// ```
pub trait Entry: Any + Send {
    /// The identifier this entry is stored under. Must never change.
    fn id(&self) -> EntryId;

    /// Human-readable rendering used by reports.
    ///
    /// Multi-line descriptions are indented by the report renderer.
    fn describe(&self) -> String {
        format!("<'{}' object at [{}]>", type_name::<Self>(), self.id())
    }

    /// Runtime type name of the entry.
    fn entry_type(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Called exactly once when the entry with identifier `id` is removed,
    /// right before the registry erases and drops it.
    ///
    /// The entry is still registered while this runs: the hook reaches its
    /// own state through `registry.lookup::<Self>(id)` (or `lookup_mut`) and
    /// every other entry the same way. `registry` is the already-locked side
    /// of the registry, so cascading removals and sibling updates cannot
    /// deadlock. Removing `id` again from inside the hook is a no-op that
    /// reports `NotFound`.
    fn on_remove(_id: EntryId, _registry: &mut LockedRegistry)
    where
        Self: Sized,
    {
    }
}

impl dyn Entry {
    /// Returns true if the entry's concrete type is `T`.
    pub fn is<T: Entry>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Checked downcast to a concrete entry type.
    pub fn downcast_ref<T: Entry>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Checked mutable downcast to a concrete entry type.
    pub fn downcast_mut<T: Entry>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}
