//! # Tree Mutations
//!
//! Edit requests against an immutable slim DOM tree.
//!
//! A [`Mutation`] names its target by identifier (or, for
//! [`Mutation::ReplaceAtPath`], by path) and carries the payload of the edit.
//! Applying it never touches the input tree: the result is a new root that
//! shares every subtree the edit did not reach.
//!
//! ## Semantics
//!
//! ### Child and rule edits
//! - `index: None` on insert appends
//! - Out-of-range indices fail, nothing is clamped
//! - Moves are remove-then-insert within the same parent
//!
//! ### SetAttribute
//! - `None` or empty value drops the attribute
//! - An explicit `index` relocates an existing attribute
//!
//! ### Inserted subtrees
//! - Every identifier in an inserted subtree must be new to the tree
//! - A replacement may reuse identifiers of the subtree it replaces
//! - No identifier may appear twice within the inserted subtree

use serde::{Deserialize, Serialize};
use slim_dom::{
    flatten, get_object_by_id, path_to, replace_nested_child, resolve, DomError, FlatIndex, Node,
    NodeExt, NodeRef, ObjectRef, PathStep, RuleExt, RuleRef,
};
use thiserror::Error;
use tracing::{debug, instrument};

/// Replacement payload of [`Mutation::ReplaceAtPath`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Replacement {
    Node(NodeRef),
    Rule(RuleRef),
}

impl From<Replacement> for ObjectRef {
    fn from(replacement: Replacement) -> Self {
        match replacement {
            Replacement::Node(node) => ObjectRef::Node(node),
            Replacement::Rule(rule) => ObjectRef::Rule(rule),
        }
    }
}

/// Edit requests (JSON wire form via serde)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Insert a node into a parent's children, appending when `index` is `None`
    InsertChild {
        parent_id: String,
        index: Option<usize>,
        child: NodeRef,
    },

    RemoveChild {
        parent_id: String,
        index: usize,
    },

    MoveChild {
        parent_id: String,
        index: usize,
        new_index: usize,
    },

    /// Insert a rule into a style sheet or media rule
    InsertRule {
        parent_id: String,
        index: Option<usize>,
        rule: RuleRef,
    },

    RemoveRule {
        parent_id: String,
        index: usize,
    },

    MoveRule {
        parent_id: String,
        index: usize,
        new_index: usize,
    },

    SetAttribute {
        node_id: String,
        name: String,
        value: Option<String>,
        index: Option<usize>,
    },

    SetSelectorText {
        rule_id: String,
        selector_text: String,
    },

    SetStyleProperty {
        rule_id: String,
        name: String,
        value: String,
    },

    RemoveStyleProperty {
        rule_id: String,
        name: String,
    },

    /// Replace a text node's value (atomic replacement)
    SetTextValue {
        node_id: String,
        value: String,
    },

    /// Substitute whatever sits at `path`
    ReplaceAtPath {
        path: Vec<PathStep>,
        replacement: Replacement,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Node cannot hold children: {0}")]
    NotAParent(String),

    #[error("Node is not an element: {0}")]
    NotAnElement(String),

    #[error("Node is not text: {0}")]
    NotText(String),

    #[error("Rule cannot hold rules: {0}")]
    NotAGroupingRule(String),

    #[error("Rule is not a style rule: {0}")]
    NotAStyleRule(String),

    #[error("Identifier already in use: {0}")]
    DuplicateId(String),

    #[error("Path does not resolve: {0:?}")]
    UnresolvedPath(Vec<PathStep>),

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl Mutation {
    /// Short name of the mutation, used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::InsertChild { .. } => "insert_child",
            Mutation::RemoveChild { .. } => "remove_child",
            Mutation::MoveChild { .. } => "move_child",
            Mutation::InsertRule { .. } => "insert_rule",
            Mutation::RemoveRule { .. } => "remove_rule",
            Mutation::MoveRule { .. } => "move_rule",
            Mutation::SetAttribute { .. } => "set_attribute",
            Mutation::SetSelectorText { .. } => "set_selector_text",
            Mutation::SetStyleProperty { .. } => "set_style_property",
            Mutation::RemoveStyleProperty { .. } => "remove_style_property",
            Mutation::SetTextValue { .. } => "set_text_value",
            Mutation::ReplaceAtPath { .. } => "replace_at_path",
        }
    }

    /// Identifier the mutation targets, if it targets one
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Mutation::InsertChild { parent_id, .. }
            | Mutation::RemoveChild { parent_id, .. }
            | Mutation::MoveChild { parent_id, .. }
            | Mutation::InsertRule { parent_id, .. }
            | Mutation::RemoveRule { parent_id, .. }
            | Mutation::MoveRule { parent_id, .. } => Some(parent_id),
            Mutation::SetAttribute { node_id, .. } | Mutation::SetTextValue { node_id, .. } => {
                Some(node_id)
            }
            Mutation::SetSelectorText { rule_id, .. }
            | Mutation::SetStyleProperty { rule_id, .. }
            | Mutation::RemoveStyleProperty { rule_id, .. } => Some(rule_id),
            Mutation::ReplaceAtPath { .. } => None,
        }
    }

    /// Apply the mutation to `root` with validation, returning the new root
    #[instrument(skip(self, root), fields(kind = self.kind(), target = self.target_id()))]
    pub fn apply(&self, root: &NodeRef) -> Result<NodeRef, MutationError> {
        self.validate(root)?;

        let next = match self {
            Mutation::InsertChild { parent_id, index, child } => {
                Self::edit_node(root, parent_id, |node| node.insert_child(child.clone(), *index))?
            }
            Mutation::RemoveChild { parent_id, index } => {
                Self::edit_node(root, parent_id, |node| node.remove_child_at(*index))?
            }
            Mutation::MoveChild { parent_id, index, new_index } => {
                Self::edit_node(root, parent_id, |node| node.move_child(*index, *new_index))?
            }
            Mutation::InsertRule { parent_id, index, rule } => {
                Self::edit_rule(root, parent_id, |parent| parent.insert_rule(rule.clone(), *index))?
            }
            Mutation::RemoveRule { parent_id, index } => {
                Self::edit_rule(root, parent_id, |parent| parent.remove_rule_at(*index))?
            }
            Mutation::MoveRule { parent_id, index, new_index } => {
                Self::edit_rule(root, parent_id, |parent| parent.move_rule(*index, *new_index))?
            }
            Mutation::SetAttribute { node_id, name, value, index } => {
                Self::edit_node(root, node_id, |node| {
                    node.set_attribute(name, value.as_deref(), *index)
                })?
            }
            Mutation::SetSelectorText { rule_id, selector_text } => {
                Self::edit_rule(root, rule_id, |rule| rule.set_selector_text(selector_text))?
            }
            Mutation::SetStyleProperty { rule_id, name, value } => {
                Self::edit_rule(root, rule_id, |rule| rule.set_style_property(name, value))?
            }
            Mutation::RemoveStyleProperty { rule_id, name } => {
                Self::edit_rule(root, rule_id, |rule| rule.remove_style_property(name))?
            }
            Mutation::SetTextValue { node_id, value } => {
                Self::edit_node(root, node_id, |node| node.set_text_value(value))?
            }
            Mutation::ReplaceAtPath { path, replacement } => {
                replace_nested_child(root, path, ObjectRef::from(replacement.clone()))?
            }
        };

        debug!(root = %next.id(), "Applied mutation");
        Ok(next)
    }

    fn edit_node(
        root: &NodeRef,
        id: &str,
        edit: impl FnOnce(&NodeRef) -> Result<NodeRef, DomError>,
    ) -> Result<NodeRef, MutationError> {
        let path = path_to(id, root).ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;
        let target = resolve(&path, root)
            .and_then(|object| object.as_node().cloned())
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        Ok(replace_nested_child(root, &path, edit(&target)?)?)
    }

    fn edit_rule(
        root: &NodeRef,
        id: &str,
        edit: impl FnOnce(&RuleRef) -> Result<RuleRef, DomError>,
    ) -> Result<NodeRef, MutationError> {
        let path = path_to(id, root).ok_or_else(|| MutationError::RuleNotFound(id.to_string()))?;
        let target = resolve(&path, root)
            .and_then(|object| object.as_rule().cloned())
            .ok_or_else(|| MutationError::RuleNotFound(id.to_string()))?;

        Ok(replace_nested_child(root, &path, edit(&target)?)?)
    }

    /// Validate the mutation against `root` without applying it
    pub fn validate(&self, root: &NodeRef) -> Result<(), MutationError> {
        match self {
            Mutation::InsertChild { parent_id, child, .. } => {
                let parent = Self::find_node(root, parent_id)?;
                if parent.child_nodes().is_none() {
                    return Err(MutationError::NotAParent(parent_id.clone()));
                }
                Self::check_new_ids(root, &FlatIndex::build(child), None)
            }

            Mutation::RemoveChild { parent_id, .. } | Mutation::MoveChild { parent_id, .. } => {
                let parent = Self::find_node(root, parent_id)?;
                match parent.child_nodes() {
                    Some(_) => Ok(()),
                    None => Err(MutationError::NotAParent(parent_id.clone())),
                }
            }

            Mutation::InsertRule { parent_id, rule, .. } => {
                let parent = Self::find_rule(root, parent_id)?;
                if parent.rules().is_none() {
                    return Err(MutationError::NotAGroupingRule(parent_id.clone()));
                }
                Self::check_new_ids(root, &FlatIndex::build_rule(rule), None)
            }

            Mutation::RemoveRule { parent_id, .. } | Mutation::MoveRule { parent_id, .. } => {
                let parent = Self::find_rule(root, parent_id)?;
                match parent.rules() {
                    Some(_) => Ok(()),
                    None => Err(MutationError::NotAGroupingRule(parent_id.clone())),
                }
            }

            Mutation::SetAttribute { node_id, .. } => match &*Self::find_node(root, node_id)? {
                Node::Element(_) => Ok(()),
                _ => Err(MutationError::NotAnElement(node_id.clone())),
            },

            Mutation::SetTextValue { node_id, .. } => match &*Self::find_node(root, node_id)? {
                Node::Text(_) => Ok(()),
                _ => Err(MutationError::NotText(node_id.clone())),
            },

            Mutation::SetSelectorText { rule_id, .. }
            | Mutation::SetStyleProperty { rule_id, .. }
            | Mutation::RemoveStyleProperty { rule_id, .. } => {
                match Self::find_rule(root, rule_id)?.as_style_rule() {
                    Some(_) => Ok(()),
                    None => Err(MutationError::NotAStyleRule(rule_id.clone())),
                }
            }

            Mutation::ReplaceAtPath { path, replacement } => {
                let replaced = resolve(path, root)
                    .ok_or_else(|| MutationError::UnresolvedPath(path.clone()))?;
                let inserted = FlatIndex::build_object(&ObjectRef::from(replacement.clone()));
                Self::check_new_ids(root, &inserted, Some(&FlatIndex::build_object(&replaced)))
            }
        }
    }

    fn find_node(root: &NodeRef, id: &str) -> Result<NodeRef, MutationError> {
        get_object_by_id(id, root)
            .and_then(|object| object.as_node().cloned())
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))
    }

    fn find_rule(root: &NodeRef, id: &str) -> Result<RuleRef, MutationError> {
        get_object_by_id(id, root)
            .and_then(|object| object.as_rule().cloned())
            .ok_or_else(|| MutationError::RuleNotFound(id.to_string()))
    }

    /// Ids of `inserted` must be unique among themselves and must not clash
    /// with anything in `root` outside of the `replaced` subtree.
    fn check_new_ids(
        root: &NodeRef,
        inserted: &FlatIndex,
        replaced: Option<&FlatIndex>,
    ) -> Result<(), MutationError> {
        if let Some(id) = inserted.duplicate_ids().first() {
            return Err(MutationError::DuplicateId(id.clone()));
        }

        let existing = flatten(root);
        let clash = inserted.ids().find(|id| {
            existing.contains(id) && !replaced.is_some_and(|replaced| replaced.contains(id))
        });
        match clash {
            Some(id) => Err(MutationError::DuplicateId(id.to_string())),
            None => Ok(()),
        }
    }
}

/// Result of applying a mutation to a document
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Checksum of the new root
    pub checksum: u32,

    /// Whether the rendering changed
    pub changed: bool,
}
