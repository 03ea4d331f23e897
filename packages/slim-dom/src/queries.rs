//! Memoized whole-tree queries.
//!
//! Each query is filed under the identity of the tree it was asked about,
//! so repeating it against an unchanged root is a cache hit and a new root
//! produced by an edit gets fresh answers.

use crate::index::FlatIndex;
use crate::memo::{Memo, MemoConfig, MemoStats};
use crate::node::NodeRef;
use crate::object::ObjectRef;
use crate::path::{compute_path, PathStep};
use crate::serialize::{CHECKSUM, STRINGIFY_NODE, STRINGIFY_RULE};
use crate::source::SOURCE_URIS;
use std::sync::Arc;
use tracing::debug;

thread_local! {
    static FLATTEN: Memo<(NodeRef,), Arc<FlatIndex>> = Memo::new("flatten");
    static PATH_TO: Memo<(String, NodeRef), Option<Vec<PathStep>>> = Memo::new("path_to");
}

/// Structural index of `root`, built once per root identity
pub fn flatten(root: &NodeRef) -> Arc<FlatIndex> {
    FLATTEN.with(|memo| {
        memo.get_or_insert_with(&(root.clone(),), || {
            let index = FlatIndex::build(root);
            debug!(root = %root.id(), entries = index.len(), "Built structural index");
            Arc::new(index)
        })
    })
}

pub fn get_object_by_id(id: &str, root: &NodeRef) -> Option<ObjectRef> {
    flatten(root).value(id)
}

pub fn get_parent(id: &str, root: &NodeRef) -> Option<ObjectRef> {
    let index = flatten(root);
    let parent_id = index.parent_id(id)?;
    index.value(parent_id)
}

/// Ancestors of `id` within `root`, nearest first
pub fn get_ancestors(id: &str, root: &NodeRef) -> Option<Vec<ObjectRef>> {
    flatten(root).ancestors(id)
}

/// Path from `root` to the object identified by `id`
pub fn path_to(id: &str, root: &NodeRef) -> Option<Vec<PathStep>> {
    PATH_TO.with(|memo| {
        memo.get_or_insert_with(&(id.to_string(), root.clone()), || {
            compute_path(&flatten(root), id)
        })
    })
}

/// Applies `config` to every query cache on the current thread
pub fn configure_memo(config: MemoConfig) {
    FLATTEN.with(|memo| memo.set_config(config.clone()));
    PATH_TO.with(|memo| memo.set_config(config.clone()));
    STRINGIFY_NODE.with(|memo| memo.set_config(config.clone()));
    STRINGIFY_RULE.with(|memo| memo.set_config(config.clone()));
    CHECKSUM.with(|memo| memo.set_config(config.clone()));
    SOURCE_URIS.with(|memo| memo.set_config(config));
}

/// Drops every query cache entry on the current thread
pub fn clear_memos() {
    FLATTEN.with(Memo::clear);
    PATH_TO.with(Memo::clear);
    STRINGIFY_NODE.with(Memo::clear);
    STRINGIFY_RULE.with(Memo::clear);
    CHECKSUM.with(Memo::clear);
    SOURCE_URIS.with(Memo::clear);
}

/// Sweeps dead anchors out of every query cache on the current thread
pub fn sweep_memos() {
    FLATTEN.with(Memo::sweep);
    PATH_TO.with(Memo::sweep);
    STRINGIFY_NODE.with(Memo::sweep);
    STRINGIFY_RULE.with(Memo::sweep);
    CHECKSUM.with(Memo::sweep);
    SOURCE_URIS.with(Memo::sweep);
}

pub fn memo_stats() -> Vec<(&'static str, MemoStats)> {
    vec![
        FLATTEN.with(|memo| (memo.name(), memo.stats())),
        PATH_TO.with(|memo| (memo.name(), memo.stats())),
        STRINGIFY_NODE.with(|memo| (memo.name(), memo.stats())),
        STRINGIFY_RULE.with(|memo| (memo.name(), memo.stats())),
        CHECKSUM.with(|memo| (memo.name(), memo.stats())),
        SOURCE_URIS.with(|memo| (memo.name(), memo.stats())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Element, TextNode};

    fn tree() -> NodeRef {
        Element::new("root", "div")
            .with_child(
                Element::new("a", "p")
                    .with_child(TextNode::new("t", "x").into_ref())
                    .into_ref(),
            )
            .into_ref()
    }

    #[test]
    fn test_flatten_is_memoized_per_root() {
        let root = tree();
        let first = flatten(&root);
        let second = flatten(&root);
        assert!(Arc::ptr_eq(&first, &second));

        let other = tree();
        assert!(!Arc::ptr_eq(&first, &flatten(&other)));
    }

    #[test]
    fn test_lookups() {
        let root = tree();

        assert_eq!(get_object_by_id("t", &root).unwrap().id(), "t");
        assert_eq!(get_parent("t", &root).unwrap().id(), "a");
        assert!(get_parent("root", &root).is_none());

        let ancestors: Vec<_> = get_ancestors("t", &root)
            .unwrap()
            .iter()
            .map(|o| o.id().to_string())
            .collect();
        assert_eq!(ancestors, vec!["a", "root"]);

        assert!(get_object_by_id("nope", &root).is_none());
        assert!(get_ancestors("nope", &root).is_none());
    }

    #[test]
    fn test_path_to() {
        let root = tree();
        assert_eq!(path_to("t", &root), Some(vec![PathStep::Child(0), PathStep::Child(0)]));
        assert_eq!(path_to("root", &root), Some(vec![]));
        assert_eq!(path_to("nope", &root), None);
    }

    #[test]
    fn test_dropped_roots_are_swept() {
        clear_memos();
        let kept = tree();
        flatten(&kept);
        for _ in 0..8 {
            let temp = tree();
            flatten(&temp);
            path_to("t", &temp);
        }

        sweep_memos();
        let stats: std::collections::HashMap<_, _> = memo_stats().into_iter().collect();
        assert_eq!(stats["flatten"].anchors, 1);
        assert_eq!(stats["path_to"].anchors, 0);
    }
}
