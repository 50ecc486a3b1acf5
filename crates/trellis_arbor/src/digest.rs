//! The digest loop.
//!
//! A digest performs repeated depth-first traversals of the scope tree.
//! Each traversal re-evaluates every watcher in registration order and,
//! on change (by structural equality, with the unset sentinel counting
//! as changed), stores the new value and invokes the callback. Because
//! a callback may itself mutate watched state, traversals repeat until
//! one completes with zero fires - or the iteration cap is hit, which
//! reports the still-changing expressions.
//!
//! Re-entrancy is refused, not queued: a callback (or anything else)
//! calling `digest` while one is running gets `DigestError::InProgress`.

use std::rc::Rc;

use trellis_loam::SmallVec;

use crate::error::DigestError;
use crate::options::DigestOptions;
use crate::scope::{ScopeId, ScopeTree};
use crate::watch::WatcherId;

/// What a completed digest did. Useful for adapters that want to know
/// whether anything changed, and for convergence assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestReport {
    /// Full-tree traversals performed, including the final clean one.
    pub traversals: usize,
    /// Total watcher callback invocations.
    pub fires: usize,
}

impl ScopeTree {
    /// Digest the subtree rooted at `root` with default options.
    pub fn digest(&mut self, root: ScopeId) -> Result<DigestReport, DigestError> {
        self.digest_with(root, &DigestOptions::default())
    }

    /// Digest with an explicit traversal cap.
    pub fn digest_with(
        &mut self,
        root: ScopeId,
        options: &DigestOptions,
    ) -> Result<DigestReport, DigestError> {
        if self.digesting {
            return Err(DigestError::InProgress);
        }
        self.digesting = true;
        let result = self.run_to_stability(root, options);
        self.digesting = false;
        result
    }

    fn run_to_stability(
        &mut self,
        root: ScopeId,
        options: &DigestOptions,
    ) -> Result<DigestReport, DigestError> {
        let mut fires = 0;
        let mut dirty = Vec::new();
        for traversal in 1..=options.max_traversals {
            dirty.clear();
            fires += self.traverse_once(root, &mut dirty);
            if dirty.is_empty() {
                return Ok(DigestReport { traversals: traversal, fires });
            }
        }
        Err(DigestError::LimitExceeded {
            limit: options.max_traversals,
            watchers: dirty,
        })
    }

    /// One full traversal. Scope and watcher id lists are snapshotted up
    /// front so callbacks may register, remove, or destroy freely; ids
    /// that no longer resolve are skipped.
    fn traverse_once(&mut self, root: ScopeId, dirty: &mut Vec<String>) -> usize {
        let mut fires = 0;
        for scope in self.collect_subtree(root) {
            let Some(node) = self.scopes.get(&scope) else {
                continue;
            };
            let ids: SmallVec<[WatcherId; 8]> =
                node.watchers.iter().map(|watcher| watcher.id).collect();
            for id in ids {
                // The scope itself may have been destroyed by a callback.
                let Some(node) = self.scopes.get(&scope) else {
                    break;
                };
                let Some(watcher) = node.watchers.iter().find(|w| w.id == id) else {
                    continue;
                };
                let expr = watcher.expr.clone();
                let new = self.eval(scope, &expr);

                let Some(node) = self.scopes.get_mut(&scope) else {
                    break;
                };
                let Some(watcher) = node.watchers.iter_mut().find(|w| w.id == id) else {
                    continue;
                };
                if watcher.last.as_ref() == Some(&new) {
                    continue;
                }
                // First fire reports the new value as the old one, so
                // callbacks can rely on `old` being a legal value.
                let old = watcher.last.replace(new.clone()).unwrap_or_else(|| new.clone());
                let callback = Rc::clone(&watcher.callback);
                dirty.push(expr.to_string());
                fires += 1;
                callback(self, &new, &old);
            }
        }
        fires
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use trellis_loam::Value;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_first_digest_fires_with_new_as_old() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "x", Value::from(1));

        let seen = log();
        let sink = Rc::clone(&seen);
        tree.watch(root, "x", move |_, new, old| {
            sink.borrow_mut().push(format!("{new}|{old}"));
        })
        .unwrap();

        let report = tree.digest(root).unwrap();
        assert_eq!(report.fires, 1);
        assert_eq!(seen.borrow().as_slice(), ["1|1"]);
    }

    #[test]
    fn test_digest_is_idempotent_when_stable() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "x", Value::from(1));
        tree.watch(root, "x", |_, _, _| {}).unwrap();

        tree.digest(root).unwrap();
        let report = tree.digest(root).unwrap();
        assert_eq!(report.traversals, 1);
        assert_eq!(report.fires, 0);
    }

    #[test]
    fn test_change_between_digests_fires_once() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "x", Value::from(1));

        let seen = log();
        let sink = Rc::clone(&seen);
        tree.watch(root, "x", move |_, new, old| {
            sink.borrow_mut().push(format!("{old}->{new}"));
        })
        .unwrap();
        tree.digest(root).unwrap();

        tree.set(root, "x", Value::from(2));
        let report = tree.digest(root).unwrap();
        assert_eq!(report.fires, 1);
        assert_eq!(seen.borrow().last().unwrap(), "1->2");
    }

    #[test]
    fn test_unset_sentinel_is_distinct_from_stored_undefined() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        // Property never set: evaluates Undefined, still fires once.
        tree.watch(root, "ghost", |_, _, _| {}).unwrap();

        assert_eq!(tree.digest(root).unwrap().fires, 1);
        assert_eq!(tree.digest(root).unwrap().fires, 0);
    }

    #[test]
    fn test_cascading_mutation_converges() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "celsius", Value::from(25));

        tree.watch(root, "celsius", |tree, new, _| {
            let c = new.as_number().unwrap_or_default();
            let root = tree.root();
            tree.set(root, "fahrenheit", Value::from(c * 9.0 / 5.0 + 32.0));
        })
        .unwrap();

        let seen = log();
        let sink = Rc::clone(&seen);
        tree.watch(root, "fahrenheit", move |_, new, _| {
            sink.borrow_mut().push(new.render().into());
        })
        .unwrap();

        tree.digest(root).unwrap();
        assert_eq!(seen.borrow().last().unwrap(), "77");

        tree.set(root, "celsius", Value::from(0));
        tree.digest(root).unwrap();
        assert_eq!(seen.borrow().last().unwrap(), "32");
    }

    #[test]
    fn test_watchers_fire_in_registration_order() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "x", Value::from(1));

        let seen = log();
        for name in ["first", "second", "third"] {
            let sink = Rc::clone(&seen);
            tree.watch(root, "x", move |_, _, _| {
                sink.borrow_mut().push(name.to_string());
            })
            .unwrap();
        }

        tree.digest(root).unwrap();
        assert_eq!(seen.borrow().as_slice(), ["first", "second", "third"]);
    }

    #[test]
    fn test_traversal_is_depth_first() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let a = tree.create_child(root);
        let b = tree.create_child(root);
        let a1 = tree.create_child(a);

        let seen = log();
        for (scope, name) in [(root, "root"), (b, "b"), (a, "a"), (a1, "a1")] {
            let sink = Rc::clone(&seen);
            tree.watch(scope, "x", move |_, _, _| {
                sink.borrow_mut().push(name.to_string());
            })
            .unwrap();
        }

        tree.digest(root).unwrap();
        assert_eq!(seen.borrow().as_slice(), ["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_limit_exceeded_at_exact_cap() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "ping", Value::from(0));
        tree.set(root, "pong", Value::from(0));

        let fires = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&fires);
        tree.watch(root, "ping", move |tree, _, _| {
            *counter.borrow_mut() += 1;
            let root = tree.root();
            let next = tree.get(root, "pong").as_number().unwrap_or_default() + 1.0;
            tree.set(root, "pong", Value::from(next));
        })
        .unwrap();
        tree.watch(root, "pong", |tree, _, _| {
            let root = tree.root();
            let next = tree.get(root, "ping").as_number().unwrap_or_default() + 1.0;
            tree.set(root, "ping", Value::from(next));
        })
        .unwrap();

        let options = DigestOptions::with_max_traversals(3);
        let err = tree.digest_with(root, &options).unwrap_err();
        match err {
            DigestError::LimitExceeded { limit, watchers } => {
                assert_eq!(limit, 3);
                assert!(watchers.contains(&"ping".to_string()));
                assert!(watchers.contains(&"pong".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Exactly one fire per traversal for the ping watcher: the cap
        // bounds the loop precisely.
        assert_eq!(*fires.borrow(), 3);
    }

    #[test]
    fn test_reentrant_digest_is_refused() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "x", Value::from(1));

        let result = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);
        tree.watch(root, "x", move |tree, _, _| {
            let root = tree.root();
            *slot.borrow_mut() = Some(tree.digest(root));
        })
        .unwrap();

        tree.digest(root).unwrap();
        assert_eq!(
            result.borrow().clone().unwrap(),
            Err(DigestError::InProgress)
        );

        // The guard is released afterwards.
        assert!(tree.digest(root).is_ok());
    }

    #[test]
    fn test_unwatch_from_callback_mid_traversal() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "x", Value::from(1));

        let seen = log();
        let handle_slot: Rc<RefCell<Option<crate::WatcherHandle>>> =
            Rc::new(RefCell::new(None));

        let slot = Rc::clone(&handle_slot);
        tree.watch(root, "x", move |tree, _, _| {
            if let Some(handle) = slot.borrow_mut().take() {
                tree.unwatch(handle);
            }
        })
        .unwrap();

        let sink = Rc::clone(&seen);
        let doomed = tree
            .watch(root, "x", move |_, _, _| {
                sink.borrow_mut().push("doomed".to_string());
            })
            .unwrap();
        *handle_slot.borrow_mut() = Some(doomed);

        // The first watcher removes the second before it ever runs.
        tree.digest(root).unwrap();
        assert!(seen.borrow().is_empty());
        assert_eq!(tree.watcher_count(root), 1);
    }

    #[test]
    fn test_destroy_scope_from_callback_mid_traversal() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.set(root, "x", Value::from(1));
        let child = tree.create_child(root);

        let seen = log();
        let sink = Rc::clone(&seen);
        tree.watch(child, "x", move |_, _, _| {
            sink.borrow_mut().push("child".to_string());
        })
        .unwrap();

        tree.watch(root, "x", move |tree, _, _| {
            let doomed = tree.children(tree.root())[0];
            tree.destroy(doomed);
        })
        .unwrap();

        // Root's watcher destroys the child before the traversal reaches
        // it; the traversal tolerates the disappearance.
        tree.digest(root).unwrap();
        assert!(seen.borrow().is_empty());
        assert!(!tree.contains(child));
    }

    #[test]
    fn test_digest_detached_subtree_only() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let branch = tree.create_child(root);
        tree.set(root, "x", Value::from(1));

        let seen = log();
        let sink = Rc::clone(&seen);
        tree.watch(root, "x", move |_, _, _| {
            sink.borrow_mut().push("root".to_string());
        })
        .unwrap();

        // Digesting a branch leaves watchers above it untouched.
        tree.digest(branch).unwrap();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_deep_equality_suppresses_identical_rebuilds() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let make = || -> Value {
            [("tags", Value::Seq(vec![Value::from("a"), Value::from("b")]))]
                .into_iter()
                .collect()
        };
        tree.set(root, "meta", make());

        let fires = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&fires);
        tree.watch(root, "meta", move |_, _, _| {
            *counter.borrow_mut() += 1;
        })
        .unwrap();

        tree.digest(root).unwrap();
        // A structurally identical replacement is not a change.
        tree.set(root, "meta", make());
        tree.digest(root).unwrap();
        assert_eq!(*fires.borrow(), 1);
    }
}
