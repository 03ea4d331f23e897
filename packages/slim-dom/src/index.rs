//! # Structural Index
//!
//! Flattens a tree into `identifier -> (parent identifier, value)`.
//!
//! The walk covers ordinary children, shadow roots (children of their host),
//! the sheet of a `style` element (child of the element), grouping-rule
//! children and the declaration of each style rule (child of the rule).
//!
//! A [`FlatIndex`] never keeps the tree it describes alive: values are held
//! weakly and upgraded on lookup. Whoever queries an index holds the root it
//! was built from, so every entry is still reachable at that point.

use crate::css::{CssRule, RuleRef};
use crate::node::{Node, NodeRef};
use crate::object::{ObjectRef, WeakObjectRef};
use std::collections::HashMap;
use tracing::warn;

/// One resolved index entry
#[derive(Debug, Clone)]
pub struct FlatEntry {
    /// `None` for the root the index was built from
    pub parent_id: Option<String>,
    pub value: ObjectRef,
}

#[derive(Debug, Clone)]
struct RawEntry {
    parent_id: Option<String>,
    value: WeakObjectRef,
}

#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    root_id: String,
    entries: HashMap<String, RawEntry>,
    duplicates: Vec<String>,
}

impl FlatIndex {
    /// Walks `root` once and records every identifier reachable from it
    pub fn build(root: &NodeRef) -> Self {
        let mut index = Self::empty(root.id());
        index.visit_node(root, None);
        index
    }

    /// Index of a detached rule tree, rooted at `root`
    pub fn build_rule(root: &RuleRef) -> Self {
        let mut index = Self::empty(root.id());
        index.visit_rule(root, None);
        index
    }

    /// Index of whatever `root` is: a node tree, a rule tree or a lone
    /// declaration
    pub fn build_object(root: &ObjectRef) -> Self {
        match root {
            ObjectRef::Node(node) => Self::build(node),
            ObjectRef::Rule(rule) => Self::build_rule(rule),
            ObjectRef::Style(_) => {
                let mut index = Self::empty(root.id());
                index.insert(root.clone(), None);
                index
            }
        }
    }

    fn empty(root_id: &str) -> Self {
        Self {
            root_id: root_id.to_string(),
            entries: HashMap::new(),
            duplicates: Vec::new(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Identifiers that occurred more than once during the walk, in the
    /// order the repeats were found. Empty for a well-formed tree.
    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicates
    }

    pub fn get(&self, id: &str) -> Option<FlatEntry> {
        let raw = self.entries.get(id)?;
        Some(FlatEntry {
            parent_id: raw.parent_id.clone(),
            value: raw.value.upgrade()?,
        })
    }

    pub fn value(&self, id: &str) -> Option<ObjectRef> {
        self.entries.get(id)?.value.upgrade()
    }

    /// Identifier of the parent of `id`; `None` for the root and for
    /// identifiers outside the tree
    pub fn parent_id(&self, id: &str) -> Option<&str> {
        self.entries.get(id)?.parent_id.as_deref()
    }

    /// Ancestors of `id`, nearest parent first and the root last.
    /// `None` if `id` is not part of the tree.
    pub fn ancestors(&self, id: &str) -> Option<Vec<ObjectRef>> {
        let mut current = self.entries.get(id)?;
        let mut ancestors = Vec::new();

        while let Some(parent_id) = &current.parent_id {
            let parent = self.entries.get(parent_id)?;
            ancestors.push(parent.value.upgrade()?);
            current = parent;
        }

        Some(ancestors)
    }

    fn insert(&mut self, value: ObjectRef, parent_id: Option<&str>) -> bool {
        if self.entries.contains_key(value.id()) {
            warn!(
                id = %value.id(),
                kind = value.kind(),
                "Duplicate identifier in tree, keeping first occurrence"
            );
            self.duplicates.push(value.id().to_string());
            return false;
        }

        self.entries.insert(
            value.id().to_string(),
            RawEntry {
                parent_id: parent_id.map(str::to_string),
                value: value.downgrade(),
            },
        );
        true
    }

    fn visit_node(&mut self, node: &NodeRef, parent_id: Option<&str>) {
        self.insert(ObjectRef::Node(node.clone()), parent_id);
        let id = node.id();

        if let Node::Element(element) = &**node {
            if let Some(sheet) = &element.sheet {
                self.visit_rule(sheet, Some(id));
            }
            if let Some(shadow) = &element.shadow {
                self.visit_node(shadow, Some(id));
            }
        }

        for child in node.child_nodes().unwrap_or_default() {
            self.visit_node(child, Some(id));
        }
    }

    fn visit_rule(&mut self, rule: &RuleRef, parent_id: Option<&str>) {
        self.insert(ObjectRef::Rule(rule.clone()), parent_id);

        match &**rule {
            CssRule::StyleSheet(_) | CssRule::MediaRule(_) => {
                for child in rule.rules().unwrap_or_default() {
                    self.visit_rule(child, Some(rule.id()));
                }
            }
            CssRule::StyleRule(style_rule) => {
                self.insert(ObjectRef::Style(style_rule.style.clone()), Some(rule.id()));
            }
        }
    }
}
