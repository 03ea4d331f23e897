//! # Path Addressing
//!
//! A path locates an object relative to a root as a sequence of steps. Paths
//! carry no identity, so a path computed against one tree can be resolved
//! against any structurally compatible tree (for instance the next version of
//! the same document, or a tree mirrored from the real DOM).

use crate::css::CssRule;
use crate::index::FlatIndex;
use crate::node::{Node, NodeRef};
use crate::object::ObjectRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStep {
    /// Index into `childNodes`
    Child(usize),
    /// Index into the `rules` of a grouping rule
    Rule(usize),
    /// Shadow root of an element
    Shadow,
    /// Style sheet of a `style` element
    Sheet,
    /// Declaration of a style rule
    Style,
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Child(index) => write!(f, "{}", index),
            PathStep::Rule(index) => write!(f, "rules[{}]", index),
            PathStep::Shadow => f.write_str("shadow"),
            PathStep::Sheet => f.write_str("sheet"),
            PathStep::Style => f.write_str("style"),
        }
    }
}

/// Which containment relation connects `parent` to `child`, if any
pub fn step_between(parent: &ObjectRef, child: &ObjectRef) -> Option<PathStep> {
    match (parent, child) {
        (ObjectRef::Node(parent), ObjectRef::Node(child)) => {
            if let Node::Element(element) = &**parent {
                if element.shadow.as_ref().is_some_and(|shadow| Arc::ptr_eq(shadow, child)) {
                    return Some(PathStep::Shadow);
                }
            }
            parent
                .child_nodes()?
                .iter()
                .position(|candidate| Arc::ptr_eq(candidate, child))
                .map(PathStep::Child)
        }
        (ObjectRef::Node(parent), ObjectRef::Rule(child)) => parent
            .as_element()?
            .sheet
            .as_ref()
            .filter(|sheet| Arc::ptr_eq(sheet, child))
            .map(|_| PathStep::Sheet),
        (ObjectRef::Rule(parent), ObjectRef::Rule(child)) => parent
            .rules()?
            .iter()
            .position(|candidate| Arc::ptr_eq(candidate, child))
            .map(PathStep::Rule),
        (ObjectRef::Rule(parent), ObjectRef::Style(child)) => parent
            .as_style_rule()
            .filter(|rule| Arc::ptr_eq(&rule.style, child))
            .map(|_| PathStep::Style),
        _ => None,
    }
}

/// Path from the root of `index` down to `id`, or `None` if `id` is not in
/// the tree. The root itself has the empty path.
pub fn compute_path(index: &FlatIndex, id: &str) -> Option<Vec<PathStep>> {
    let mut current = index.get(id)?;
    let mut path = Vec::new();

    while let Some(parent_id) = &current.parent_id {
        let parent = index.get(parent_id)?;
        path.push(step_between(&parent.value, &current.value)?);
        current = parent;
    }

    path.reverse();
    Some(path)
}

/// Follows `path` from `root`; `None` as soon as a step cannot be taken
pub fn resolve_object(path: &[PathStep], root: &ObjectRef) -> Option<ObjectRef> {
    let mut current = root.clone();

    for step in path {
        current = follow(&current, *step)?;
    }

    Some(current)
}

pub fn resolve(path: &[PathStep], root: &NodeRef) -> Option<ObjectRef> {
    resolve_object(path, &ObjectRef::Node(root.clone()))
}

/// Takes one step down from `current`
pub fn follow(current: &ObjectRef, step: PathStep) -> Option<ObjectRef> {
    match (current, step) {
        (ObjectRef::Node(node), PathStep::Child(index)) => {
            node.child_nodes()?.get(index).cloned().map(ObjectRef::Node)
        }
        (ObjectRef::Node(node), PathStep::Shadow) => {
            node.as_element()?.shadow.clone().map(ObjectRef::Node)
        }
        (ObjectRef::Node(node), PathStep::Sheet) => {
            node.as_element()?.sheet.clone().map(ObjectRef::Rule)
        }
        (ObjectRef::Rule(rule), PathStep::Rule(index)) => {
            rule.rules()?.get(index).cloned().map(ObjectRef::Rule)
        }
        (ObjectRef::Rule(rule), PathStep::Style) => match &**rule {
            CssRule::StyleRule(style_rule) => Some(ObjectRef::Style(style_rule.style.clone())),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{StyleDeclaration, StyleRule, StyleSheet};
    use crate::node::{DocumentFragment, Element, TextNode};

    fn fixture() -> NodeRef {
        let sheet = StyleSheet::new("sheet")
            .with_rule(StyleRule::new("rule", ".a", StyleDeclaration::new("decl")).into_ref())
            .into_ref();

        Element::new("root", "div")
            .with_child(Element::new("style", "style").with_sheet(sheet).into_ref())
            .with_child(
                Element::new("host", "span")
                    .with_shadow(
                        DocumentFragment::new("shadow")
                            .with_child(TextNode::new("deep", "x").into_ref())
                            .into_ref(),
                    )
                    .into_ref(),
            )
            .into_ref()
    }

    #[test]
    fn test_compute_path() {
        let root = fixture();
        let index = FlatIndex::build(&root);

        assert_eq!(compute_path(&index, "root"), Some(vec![]));
        assert_eq!(
            compute_path(&index, "deep"),
            Some(vec![PathStep::Child(1), PathStep::Shadow, PathStep::Child(0)])
        );
        assert_eq!(
            compute_path(&index, "decl"),
            Some(vec![
                PathStep::Child(0),
                PathStep::Sheet,
                PathStep::Rule(0),
                PathStep::Style
            ])
        );
        assert_eq!(compute_path(&index, "missing"), None);
    }

    #[test]
    fn test_resolve_round_trip() {
        let root = fixture();
        let index = FlatIndex::build(&root);

        for id in index.ids() {
            let path = compute_path(&index, id).unwrap();
            let resolved = resolve(&path, &root).unwrap();
            assert!(resolved.ptr_eq(&index.value(id).unwrap()), "round trip failed for {}", id);
        }
    }

    #[test]
    fn test_resolve_bad_paths() {
        let root = fixture();

        assert!(resolve(&[PathStep::Child(9)], &root).is_none());
        assert!(resolve(&[PathStep::Shadow], &root).is_none());
        assert!(resolve(&[PathStep::Rule(0)], &root).is_none());
        assert!(resolve(&[PathStep::Child(1), PathStep::Sheet], &root).is_none());
        let through_text = [PathStep::Child(0), PathStep::Child(0), PathStep::Child(0)];
        assert!(resolve(&through_text, &root).is_none());
    }

    #[test]
    fn test_resolve_against_compatible_tree() {
        let old = fixture();
        let new = fixture();
        let path = compute_path(&FlatIndex::build(&old), "deep").unwrap();

        let resolved = resolve(&path, &new).unwrap();
        assert_eq!(resolved.id(), "deep");
        assert!(!resolved.ptr_eq(&resolve(&path, &old).unwrap()));
    }

    #[test]
    fn test_path_json() {
        let path = vec![PathStep::Child(2), PathStep::Shadow, PathStep::Rule(1)];
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"[{"child":2},"shadow",{"rule":1}]"#);

        let back: Vec<PathStep> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
