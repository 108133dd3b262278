//! A small parent/child tree kept in a [`Registry`].
//!
//! Nodes only ever hold identifiers of each other. Removing a child unlinks
//! it from its parent; removing a parent removes its whole subtree.

use codex::{CodexConfig, CodexResult, Entry, EntryId, LockedRegistry, Registry, Report};
use serde::Serialize;
use tracing::{debug, info};

/// A named tree node.
#[derive(Debug)]
pub struct Node {
    id: EntryId,
    pub name: String,
    pub parent: Option<EntryId>,
    pub children: Vec<EntryId>,
}

impl Node {
    /// Creates a root node in `registry`.
    pub fn add_root(registry: &mut LockedRegistry, name: &str) -> CodexResult<EntryId> {
        let node = registry.create(|id| Node {
            id,
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
        })?;
        Ok(node.id)
    }

    /// Creates a node under `parent` and links both directions.
    ///
    /// If `parent` is not a registered node the child is created detached.
    pub fn add_child(
        registry: &mut LockedRegistry,
        parent: EntryId,
        name: &str,
    ) -> CodexResult<EntryId> {
        let id = registry
            .create(|id| Node {
                id,
                name: name.to_string(),
                parent: Some(parent),
                children: Vec::new(),
            })?
            .id;
        match registry.lookup_mut::<Node>(parent) {
            Some(node) => node.children.push(id),
            None => {
                debug!(child = %id, parent = %parent, "Parent missing, child left detached");
                if let Some(child) = registry.lookup_mut::<Node>(id) {
                    child.parent = None;
                }
            }
        }
        Ok(id)
    }
}

impl Entry for Node {
    fn id(&self) -> EntryId {
        self.id
    }

    fn describe(&self) -> String {
        let mut out = format!("Node '{}'", self.name);
        if let Some(parent) = self.parent {
            out.push_str(&format!("\nparent: {parent}"));
        }
        if !self.children.is_empty() {
            out.push_str(&format!("\nchildren: {}", self.children.len()));
        }
        out
    }

    fn on_remove(id: EntryId, registry: &mut LockedRegistry) {
        let Some(node) = registry.lookup_mut::<Node>(id) else {
            return;
        };
        let parent = node.parent;
        let children = std::mem::take(&mut node.children);
        debug!(node = %id, name = %node.name, children = children.len(), "Removing node");

        if let Some(parent_id) = parent {
            if let Some(parent) = registry.lookup_mut::<Node>(parent_id) {
                parent.children.retain(|c| *c != id);
            }
        }
        for child in children {
            registry.remove(child);
        }
    }
}

/// Snapshots taken while walking the tree through its lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub root: EntryId,
    pub removed_child: Option<EntryId>,
    pub initial: Report,
    pub after_child_removal: Report,
    pub after_root_removal: Report,
}

/// Builds a root with `children` children, removes the first child, then
/// the root.
pub fn run_scenario(config: &CodexConfig, children: usize) -> CodexResult<Scenario> {
    let registry = Registry::from_config(config);

    let (root, kids) = {
        let mut locked = registry.lock();
        let root = Node::add_root(&mut locked, "root")?;
        let kids = (0..children)
            .map(|i| Node::add_child(&mut locked, root, &format!("child-{i}")))
            .collect::<CodexResult<Vec<_>>>()?;
        (root, kids)
    };
    info!(root = %root, children = kids.len(), "Built tree");
    let initial = registry.report();

    let removed_child = kids.first().copied();
    if let Some(child) = removed_child {
        registry.remove(child);
        info!(child = %child, "Removed one child");
    }
    let after_child_removal = registry.report();

    registry.remove(root);
    info!(root = %root, remaining = registry.len(), "Removed root");
    let after_root_removal = registry.report();

    Ok(Scenario {
        root,
        removed_child,
        initial,
        after_child_removal,
        after_root_removal,
    })
}
