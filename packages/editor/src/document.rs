//! # Document Handle
//!
//! An editable slim DOM document: the current root, a version counter and
//! undo/redo history.
//!
//! Every successful edit replaces the root wholesale. Earlier roots stay
//! valid values, so anything still holding one (a renderer mid-frame, a
//! pending diff) keeps seeing a consistent tree.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit → Render
//!   ↓      ↓       ↓
//! Tree  Mutations  Text/checksum
//! ```

use crate::config::EditorConfig;
use crate::errors::{EditorError, EditorResult};
use crate::mutations::{Mutation, MutationResult};
use crate::undo_stack::UndoStack;
use slim_dom::{
    checksum, collect_source_uris, stringify_node, sync_sources, IdGenerator, NodeRef,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Editable slim DOM document
#[derive(Debug)]
pub struct Document {
    /// URI of the source the tree was produced from
    pub uri: String,

    /// Current version number (increments on each change of root)
    pub version: u64,

    root: NodeRef,
    history: UndoStack,

    /// Tree the provenance was last synced from; reapplied to roots coming
    /// back from history
    provenance: Option<NodeRef>,
}

impl Document {
    pub fn new(uri: impl Into<String>, root: NodeRef) -> Self {
        Self::with_config(uri, root, &EditorConfig::default())
    }

    pub fn with_config(uri: impl Into<String>, root: NodeRef, config: &EditorConfig) -> Self {
        Self {
            uri: uri.into(),
            version: 0,
            root,
            history: UndoStack::with_max_levels(config.max_undo_levels),
            provenance: None,
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Apply a mutation
    #[instrument(skip(self, mutation), fields(uri = %self.uri, kind = mutation.kind()))]
    pub fn apply(&mut self, mutation: &Mutation) -> EditorResult<MutationResult> {
        let next = mutation.apply(&self.root)?;
        Ok(self.commit(next))
    }

    /// Apply mutations as one undo step. If any of them fails the document is
    /// left exactly as it was.
    pub fn apply_batch(
        &mut self,
        mutations: &[Mutation],
        description: impl Into<String>,
    ) -> EditorResult<MutationResult> {
        let mut next = self.root.clone();
        for (index, mutation) in mutations.iter().enumerate() {
            next = mutation
                .apply(&next)
                .map_err(|source| EditorError::Batch { index, source })?;
        }

        self.history.begin_batch(&self.root);
        self.history.set_batch_description(description);
        let result = self.commit(next);
        self.history.end_batch(&self.root);
        Ok(result)
    }

    /// Replace the whole tree, for instance after the source was reloaded.
    /// Recorded as an undo step like any edit.
    pub fn replace_root(&mut self, root: NodeRef) -> MutationResult {
        self.commit(root)
    }

    /// Copy provenance from a freshly produced tree without recording a step.
    ///
    /// `from` is kept and synced onto every root restored by undo or redo,
    /// so history never brings back stale provenance.
    pub fn sync_sources(&mut self, from: &NodeRef) {
        self.provenance = Some(from.clone());
        let synced = sync_sources(&self.root, from);
        if !Arc::ptr_eq(&synced, &self.root) {
            self.root = synced;
            self.version += 1;
        }
    }

    /// Generator for new identifiers that cannot clash with the current tree
    pub fn id_generator(&self) -> IdGenerator {
        IdGenerator::resume(&self.uri, &self.root)
    }

    fn restore(&mut self, root: NodeRef) {
        self.root = match &self.provenance {
            Some(from) => sync_sources(&root, from),
            None => root,
        };
        self.version += 1;
    }

    fn commit(&mut self, next: NodeRef) -> MutationResult {
        let previous = std::mem::replace(&mut self.root, next);
        let changed = checksum(&previous) != checksum(&self.root);

        self.history.record(previous);
        self.version += 1;
        debug!(version = self.version, changed, "Committed new root");

        MutationResult {
            version: self.version,
            checksum: checksum(&self.root),
            changed,
        }
    }

    /// Undo the most recent step. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.root.clone()) {
            Some(root) => {
                self.restore(root);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone step
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.root.clone()) {
            Some(root) => {
                self.restore(root);
                true
            }
            None => false,
        }
    }

    pub fn checksum(&self) -> u32 {
        checksum(&self.root)
    }

    /// Canonical rendering, shadow content included
    pub fn render(&self) -> Arc<str> {
        stringify_node(&self.root, true)
    }

    pub fn source_uris(&self) -> Vec<String> {
        collect_source_uris(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slim_dom::{Element, Source, TextNode};

    fn create_test_document() -> Document {
        let root = Element::new("root", "div")
            .with_child(TextNode::new("greeting", "Hello").into_ref())
            .into_ref();
        Document::new("file:///test.pc", root)
    }

    fn set_greeting(value: &str) -> Mutation {
        Mutation::SetTextValue {
            node_id: "greeting".to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_document_version_increments() {
        let mut doc = create_test_document();
        assert_eq!(doc.version, 0);

        let result = doc.apply(&set_greeting("Hi")).unwrap();
        assert_eq!(result.version, 1);
        assert!(result.changed);
        assert_eq!(doc.version, 1);
        assert_eq!(&*doc.render(), "<div>Hi</div>");
    }

    #[test]
    fn test_unchanged_content_reported() {
        let mut doc = create_test_document();
        let result = doc.apply(&set_greeting("Hello")).unwrap();
        assert!(!result.changed);
        assert_eq!(result.checksum, doc.checksum());
    }

    #[test]
    fn test_failed_mutation_leaves_document() {
        let mut doc = create_test_document();
        let before = doc.root().clone();

        let err = doc
            .apply(&Mutation::SetTextValue {
                node_id: "missing".to_string(),
                value: String::new(),
            })
            .unwrap_err();

        assert!(matches!(err, EditorError::Mutation(_)));
        assert!(Arc::ptr_eq(doc.root(), &before));
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_undo_redo() {
        let mut doc = create_test_document();
        let original = doc.root().clone();

        doc.apply(&set_greeting("One")).unwrap();
        doc.apply(&set_greeting("Two")).unwrap();

        assert!(doc.undo());
        assert_eq!(&*doc.render(), "<div>One</div>");
        assert!(doc.undo());
        assert!(Arc::ptr_eq(doc.root(), &original));
        assert!(!doc.undo());

        assert!(doc.redo());
        assert!(doc.redo());
        assert_eq!(&*doc.render(), "<div>Two</div>");
        assert!(!doc.redo());
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut doc = create_test_document();
        let before = doc.root().clone();

        let err = doc
            .apply_batch(
                &[
                    set_greeting("Changed"),
                    Mutation::RemoveChild {
                        parent_id: "root".to_string(),
                        index: 9,
                    },
                ],
                "broken",
            )
            .unwrap_err();

        assert!(matches!(err, EditorError::Batch { index: 1, .. }));
        assert!(Arc::ptr_eq(doc.root(), &before));
        assert!(!doc.history().can_undo());
    }

    #[test]
    fn test_batch_undoes_as_one_step() {
        let mut doc = create_test_document();
        let before = doc.root().clone();

        doc.apply_batch(
            &[
                set_greeting("Bye"),
                Mutation::InsertChild {
                    parent_id: "root".to_string(),
                    index: None,
                    child: TextNode::new("extra", "!").into_ref(),
                },
            ],
            "farewell",
        )
        .unwrap();
        assert_eq!(&*doc.render(), "<div>Bye!</div>");
        assert_eq!(doc.history().undo_description(), Some("farewell"));

        assert!(doc.undo());
        assert!(Arc::ptr_eq(doc.root(), &before));
    }

    #[test]
    fn test_sync_sources() {
        let mut doc = create_test_document();
        let loaded = Element::new("root", "div")
            .with_source(Source::new("file:///test.pc"))
            .with_child(
                TextNode::new("greeting", "Hello")
                    .with_source(Source::new("file:///strings.pc"))
                    .into_ref(),
            )
            .into_ref();

        doc.sync_sources(&loaded);

        assert_eq!(doc.source_uris(), vec!["file:///test.pc", "file:///strings.pc"]);
        assert_eq!(doc.version, 1);
        assert!(!doc.history().can_undo());

        doc.sync_sources(&loaded);
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_undo_keeps_synced_provenance() {
        let mut doc = create_test_document();
        doc.apply(&set_greeting("Edited")).unwrap();

        let loaded = Element::new("root", "div")
            .with_source(Source::new("file:///test.pc"))
            .with_child(TextNode::new("greeting", "Edited").into_ref())
            .into_ref();
        doc.sync_sources(&loaded);

        assert!(doc.undo());
        assert_eq!(&*doc.render(), "<div>Hello</div>");
        assert_eq!(doc.source_uris(), vec!["file:///test.pc"]);

        assert!(doc.redo());
        assert_eq!(doc.source_uris(), vec!["file:///test.pc"]);
    }

    #[test]
    fn test_id_generator_avoids_existing_ids() {
        let mut ids = IdGenerator::new("file:///test.pc");
        let taken = ids.next_id();

        let mut doc = create_test_document();
        doc.apply(&Mutation::InsertChild {
            parent_id: "root".to_string(),
            index: None,
            child: TextNode::new(taken.clone(), "!").into_ref(),
        })
        .unwrap();

        let fresh = doc.id_generator().next_id();
        assert_ne!(fresh, taken);
        doc.apply(&Mutation::InsertChild {
            parent_id: "root".to_string(),
            index: None,
            child: TextNode::new(fresh, "?").into_ref(),
        })
        .unwrap();
    }
}
