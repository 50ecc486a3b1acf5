//! Transclusion: content captured in one place, spliced into another.
//!
//! The defining rule is scope fidelity. Captured content stays tagged
//! with the scope that was active where it was authored, so when it is
//! later spliced into a component's interior any bindings the adapter
//! compiles inside it resolve against the author's data, not the
//! component's isolate scope. The splice site contributes placement
//! only. This module is structural; it never touches the scope tree.

use trellis_arbor::ScopeId;

use crate::error::TranscludeError;

/// Content nodes held between capture and splice, tagged with their
/// creating scope. The node type is the adapter's own content
/// representation; the engine is agnostic to it.
pub struct TranscludedContent<T> {
    creating_scope: ScopeId,
    nodes: Option<Vec<T>>,
}

/// Capture `nodes` authored while `creating_scope` was active. Call this
/// before building the component's isolate scope, while the host side is
/// still current.
pub fn capture<T>(nodes: Vec<T>, creating_scope: ScopeId) -> TranscludedContent<T> {
    TranscludedContent {
        creating_scope,
        nodes: Some(nodes),
    }
}

impl<T> TranscludedContent<T> {
    /// The scope the content was authored under. Remains available after
    /// the splice; bindings inside the content resolve against it.
    #[inline]
    pub fn creating_scope(&self) -> ScopeId {
        self.creating_scope
    }

    /// Whether the nodes have already been moved into a slot.
    #[inline]
    pub fn is_spliced(&self) -> bool {
        self.nodes.is_none()
    }

    /// Move the captured nodes into `slot`, tagging it with the creating
    /// scope. The nodes move exactly once; a second call fails, since the
    /// slot already owns them.
    pub fn splice(&mut self, slot: &mut Slot<T>) -> Result<(), TranscludeError> {
        let nodes = self.nodes.take().ok_or(TranscludeError::AlreadySpliced)?;
        slot.nodes.extend(nodes);
        slot.scope = Some(self.creating_scope);
        Ok(())
    }
}

/// The designated target container inside a component's compiled output.
///
/// After a splice the slot owns the nodes and carries the creating-scope
/// tag; adapter-side compilation of bindings inside the slot must use
/// [`Slot::scope`], never the surrounding isolate scope.
pub struct Slot<T> {
    nodes: Vec<T>,
    scope: Option<ScopeId>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    /// An empty slot awaiting content.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            scope: None,
        }
    }

    /// The spliced nodes, in capture order.
    #[inline]
    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    /// The creating scope of the spliced content; `None` until a splice
    /// has happened.
    #[inline]
    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    /// Hand the nodes to the adapter, leaving the slot empty but keeping
    /// the scope tag.
    pub fn take_nodes(&mut self) -> Vec<T> {
        std::mem::take(&mut self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_arbor::ScopeTree;
    use trellis_loam::Value;

    #[test]
    fn test_spliced_content_carries_the_creating_scope() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let author = tree.create_child(root);
        tree.set(author, "message", Value::from("from author"));

        // The isolate elsewhere in the tree has a conflicting value.
        let isolate = tree.create_isolate_child(root);
        tree.set(isolate, "message", Value::from("component internals"));

        let mut captured = capture(vec!["{{message}}"], author);
        let mut slot = Slot::new();
        captured.splice(&mut slot).unwrap();

        assert_eq!(slot.nodes(), ["{{message}}"]);
        let binding_scope = slot.scope().unwrap();
        assert_eq!(binding_scope, author);
        assert_eq!(
            tree.eval_str(binding_scope, "message").unwrap(),
            Value::from("from author")
        );
    }

    #[test]
    fn test_splice_is_once_only() {
        let mut captured = capture(vec![1, 2, 3], ScopeId::ROOT);
        let mut slot = Slot::new();

        assert!(!captured.is_spliced());
        captured.splice(&mut slot).unwrap();
        assert!(captured.is_spliced());
        assert!(matches!(
            captured.splice(&mut slot),
            Err(TranscludeError::AlreadySpliced)
        ));
        assert_eq!(slot.nodes(), [1, 2, 3]);
    }

    #[test]
    fn test_creating_scope_survives_the_splice() {
        let mut tree = ScopeTree::new();
        let author = tree.create_child(tree.root());

        let mut captured = capture(Vec::<()>::new(), author);
        let mut slot = Slot::new();
        captured.splice(&mut slot).unwrap();
        assert_eq!(captured.creating_scope(), author);
    }

    #[test]
    fn test_take_nodes_keeps_the_scope_tag() {
        let mut captured = capture(vec!["a", "b"], ScopeId::ROOT);
        let mut slot = Slot::new();
        captured.splice(&mut slot).unwrap();

        let nodes = slot.take_nodes();
        assert_eq!(nodes, ["a", "b"]);
        assert!(slot.nodes().is_empty());
        assert_eq!(slot.scope(), Some(ScopeId::ROOT));
    }
}
