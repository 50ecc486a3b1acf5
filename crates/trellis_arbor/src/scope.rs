//! The scope tree.
//!
//! Scopes are mutable property containers organized into a tree. The tree
//! owns every scope in an id-keyed table; adapters hold plain [`ScopeId`]
//! handles, never references, so destroying a subtree mid-digest cannot
//! dangle anything. Property and function lookups that miss locally walk
//! the parent chain (prototypal inheritance) unless the scope is marked
//! isolated, in which case the walk stops at that scope's own tables.

use std::rc::Rc;

use trellis_loam::{bitflags, CompactString, FxHashMap, Value, ValueMap};

use crate::watch::Watcher;

bitflags! {
    /// Per-scope behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ScopeFlags: u8 {
        /// Property and function lookups do not fall through to the
        /// parent chain.
        const ISOLATED = 1 << 0;
    }
}

/// Unique identifier for a scope in a [`ScopeTree`].
///
/// Ids are never reused within a tree; a destroyed scope's id simply
/// stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The root scope of every tree.
    pub const ROOT: Self = Self(0);

    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// A function callable from expression call forms, registered on a scope
/// and inherited down the chain like any property.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Value>;

/// One node in the tree. Owned by the tree, addressed by id.
pub(crate) struct ScopeNode {
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    pub(crate) flags: ScopeFlags,
    pub(crate) properties: ValueMap,
    pub(crate) functions: FxHashMap<CompactString, NativeFn>,
    /// Watchers in registration order, owned exclusively by this scope.
    pub(crate) watchers: Vec<Watcher>,
}

impl ScopeNode {
    fn new(parent: Option<ScopeId>, flags: ScopeFlags) -> Self {
        Self {
            parent,
            children: Vec::new(),
            flags,
            properties: ValueMap::default(),
            functions: FxHashMap::default(),
            watchers: Vec::new(),
        }
    }
}

/// The scope tree: owns every scope, watcher, and registered function.
///
/// Single-threaded by construction (callbacks are `Rc`); one digest may
/// run at a time, enforced by an in-progress flag.
pub struct ScopeTree {
    pub(crate) scopes: FxHashMap<ScopeId, ScopeNode>,
    next_scope: u32,
    pub(crate) next_watcher: u64,
    pub(crate) digesting: bool,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree containing only the root scope.
    pub fn new() -> Self {
        let mut scopes = FxHashMap::default();
        scopes.insert(ScopeId::ROOT, ScopeNode::new(None, ScopeFlags::empty()));
        Self {
            scopes,
            next_scope: 1,
            next_watcher: 0,
            digesting: false,
        }
    }

    /// The root scope id.
    #[inline]
    pub const fn root(&self) -> ScopeId {
        ScopeId::ROOT
    }

    /// Whether `scope` currently exists (i.e. has not been destroyed).
    #[inline]
    pub fn contains(&self, scope: ScopeId) -> bool {
        self.scopes.contains_key(&scope)
    }

    /// Create a child scope inheriting properties from `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` has been destroyed; creating children of dead
    /// scopes is an adapter bug, not a recoverable condition.
    pub fn create_child(&mut self, parent: ScopeId) -> ScopeId {
        self.create_child_with_flags(parent, ScopeFlags::empty())
    }

    /// Create an isolated child scope: its lookups never fall through to
    /// `parent`. The binding compiler builds component scopes this way.
    ///
    /// # Panics
    ///
    /// Panics if `parent` has been destroyed.
    pub fn create_isolate_child(&mut self, parent: ScopeId) -> ScopeId {
        self.create_child_with_flags(parent, ScopeFlags::ISOLATED)
    }

    fn create_child_with_flags(&mut self, parent: ScopeId, flags: ScopeFlags) -> ScopeId {
        if !self.scopes.contains_key(&parent) {
            panic!("cannot create a child of destroyed scope {parent:?}");
        }
        let id = ScopeId::new(self.next_scope);
        self.next_scope += 1;
        self.scopes.insert(id, ScopeNode::new(Some(parent), flags));
        if let Some(node) = self.scopes.get_mut(&parent) {
            node.children.push(id);
        }
        id
    }

    /// Destroy `scope` and, recursively, its children; their watchers are
    /// discarded with them. Detaches the scope from its parent's child
    /// list. Destroying the root or an already-destroyed scope is a
    /// no-op; destroying mid-digest is safe (the traversal skips scopes
    /// that disappear).
    pub fn destroy(&mut self, scope: ScopeId) {
        if scope == ScopeId::ROOT || !self.scopes.contains_key(&scope) {
            return;
        }
        // Detach from the parent before dropping the subtree.
        if let Some(parent) = self.scopes.get(&scope).and_then(|node| node.parent) {
            if let Some(parent_node) = self.scopes.get_mut(&parent) {
                parent_node.children.retain(|&child| child != scope);
            }
        }
        let mut pending = vec![scope];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.scopes.remove(&id) {
                pending.extend(node.children);
            }
        }
    }

    /// The parent of `scope`, if it exists and is not the root.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(&scope).and_then(|node| node.parent)
    }

    /// Child ids of `scope`, in creation order.
    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        self.scopes
            .get(&scope)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `scope` is marked isolated.
    pub fn is_isolated(&self, scope: ScopeId) -> bool {
        self.scopes
            .get(&scope)
            .is_some_and(|node| node.flags.contains(ScopeFlags::ISOLATED))
    }

    /// Set a property directly on `scope` (no chain walk). Writes to a
    /// destroyed scope are ignored.
    pub fn set(&mut self, scope: ScopeId, name: impl Into<CompactString>, value: Value) {
        if let Some(node) = self.scopes.get_mut(&scope) {
            node.properties.insert(name.into(), value);
        }
    }

    /// Remove a property from `scope`'s own mapping.
    pub fn remove(&mut self, scope: ScopeId, name: &str) {
        if let Some(node) = self.scopes.get_mut(&scope) {
            node.properties.remove(name);
        }
    }

    /// Look up a property through the inheritance chain. Missing scopes,
    /// missing names, and isolation misses all yield `Undefined`.
    pub fn get(&self, scope: ScopeId, name: &str) -> Value {
        self.lookup(scope, name).cloned().unwrap_or_default()
    }

    /// Look up a property in `scope`'s own mapping only.
    pub fn get_local(&self, scope: ScopeId, name: &str) -> Value {
        self.scopes
            .get(&scope)
            .and_then(|node| node.properties.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Register a function callable from expression call forms, inherited
    /// down the chain like a property.
    pub fn register_function<F>(&mut self, scope: ScopeId, name: impl Into<CompactString>, f: F)
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        if let Some(node) = self.scopes.get_mut(&scope) {
            node.functions.insert(name.into(), Rc::new(f));
        }
    }

    /// Walk the chain from `scope` toward the root, stopping after the
    /// first isolated scope, and return the first binding of `name`.
    pub(crate) fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Value> {
        let mut current = scope;
        loop {
            let node = self.scopes.get(&current)?;
            if let Some(value) = node.properties.get(name) {
                return Some(value);
            }
            if node.flags.contains(ScopeFlags::ISOLATED) {
                return None;
            }
            current = node.parent?;
        }
    }

    /// Like [`lookup`](Self::lookup), but returns the scope that owns the
    /// binding. `assign` writes through this.
    pub(crate) fn lookup_owner(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = scope;
        loop {
            let node = self.scopes.get(&current)?;
            if node.properties.contains_key(name) {
                return Some(current);
            }
            if node.flags.contains(ScopeFlags::ISOLATED) {
                return None;
            }
            current = node.parent?;
        }
    }

    /// Function lookup with the same chain-and-isolation rules as
    /// properties.
    pub(crate) fn lookup_function(&self, scope: ScopeId, name: &str) -> Option<NativeFn> {
        let mut current = scope;
        loop {
            let node = self.scopes.get(&current)?;
            if let Some(f) = node.functions.get(name) {
                return Some(Rc::clone(f));
            }
            if node.flags.contains(ScopeFlags::ISOLATED) {
                return None;
            }
            current = node.parent?;
        }
    }

    /// Pre-order scope ids of the subtree rooted at `root`. The digest
    /// snapshots this once per traversal.
    pub(crate) fn collect_subtree(&self, root: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.scopes.get(&id) {
                out.push(id);
                // Reverse so children pop in creation order.
                pending.extend(node.children.iter().rev());
            }
        }
        out
    }
}
