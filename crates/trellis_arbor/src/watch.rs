//! Watcher registration.
//!
//! A watcher is an (expression, last observed value, callback) triple
//! owned by the scope that registered it. The last value starts as the
//! unset sentinel - `None`, distinct from every legal `Value` including
//! a stored `Undefined` - so the first digest traversal always fires.

use std::rc::Rc;

use trellis_loam::Value;
use trellis_vine::{parse, Expr};

use crate::error::EvalError;
use crate::scope::{ScopeId, ScopeTree};

/// Unique identifier for a watcher, monotonic per tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(transparent)]
pub struct WatcherId(u64);

impl WatcherId {
    #[inline(always)]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Handle returned by watch registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherHandle {
    /// The scope the watcher was registered on.
    pub scope: ScopeId,
    /// The watcher within that scope.
    pub watcher: WatcherId,
}

/// Watcher callback, invoked as `(tree, new_value, old_value)` whenever
/// the watched expression's value changes during a digest. Callbacks may
/// mutate scope state through `tree`; the digest keeps traversing until
/// such mutations settle.
pub type WatchCallback = Rc<dyn Fn(&mut ScopeTree, &Value, &Value)>;

pub(crate) struct Watcher {
    pub(crate) id: WatcherId,
    pub(crate) expr: Expr,
    /// `None` until the first digest evaluation.
    pub(crate) last: Option<Value>,
    pub(crate) callback: WatchCallback,
}

impl ScopeTree {
    /// Parse `source` and register a watcher for it on `scope`.
    pub fn watch<F>(
        &mut self,
        scope: ScopeId,
        source: &str,
        callback: F,
    ) -> Result<WatcherHandle, EvalError>
    where
        F: Fn(&mut ScopeTree, &Value, &Value) + 'static,
    {
        let expr = parse(source)?;
        Ok(self.watch_expr(scope, expr, callback))
    }

    /// Register a watcher for an already-parsed expression.
    ///
    /// # Panics
    ///
    /// Panics if `scope` has been destroyed.
    pub fn watch_expr<F>(&mut self, scope: ScopeId, expr: Expr, callback: F) -> WatcherHandle
    where
        F: Fn(&mut ScopeTree, &Value, &Value) + 'static,
    {
        self.watch_shared(scope, expr, Rc::new(callback))
    }

    /// Registration with a pre-wrapped callback; the binding compiler
    /// shares one re-render callback across a template's embedded paths.
    pub fn watch_shared(
        &mut self,
        scope: ScopeId,
        expr: Expr,
        callback: WatchCallback,
    ) -> WatcherHandle {
        let id = WatcherId(self.next_watcher);
        self.next_watcher += 1;
        let Some(node) = self.scopes.get_mut(&scope) else {
            panic!("cannot watch destroyed scope {scope:?}");
        };
        node.watchers.push(Watcher {
            id,
            expr,
            last: None,
            callback,
        });
        WatcherHandle { scope, watcher: id }
    }

    /// Remove a watcher. Idempotent; safe to call from inside a watcher
    /// callback during a digest (the traversal skips watchers that have
    /// disappeared).
    pub fn unwatch(&mut self, handle: WatcherHandle) {
        if let Some(node) = self.scopes.get_mut(&handle.scope) {
            node.watchers.retain(|watcher| watcher.id != handle.watcher);
        }
    }

    /// Number of watchers currently registered on `scope`.
    pub fn watcher_count(&self, scope: ScopeId) -> usize {
        self.scopes
            .get(&scope)
            .map(|node| node.watchers.len())
            .unwrap_or(0)
    }
}
