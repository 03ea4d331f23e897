//! Capabilities shared by node and rule kinds.
//!
//! Mutation and query code is written against these traits rather than the
//! concrete variants, so a new kind only has to declare what it can do.

use crate::css::{CssRule, MediaRule, RuleRef, StyleDeclaration, StyleRule, StyleSheet};
use crate::node::{Document, DocumentFragment, Element, Node, NodeRef, Source, TextNode};
use std::sync::Arc;

pub trait Identified {
    fn id(&self) -> &str;
}

/// Holds an ordered list of child nodes
pub trait ParentNode: Identified + Clone {
    fn child_nodes(&self) -> &[NodeRef];

    /// Copy of `self` holding `child_nodes` instead; every other field,
    /// identifier and source included, is carried over.
    fn with_child_nodes(&self, child_nodes: Vec<NodeRef>) -> Self;
}

/// Holds an ordered list of child rules
pub trait GroupingRule: Identified + Clone {
    fn rules(&self) -> &[RuleRef];

    fn with_rules(&self, rules: Vec<RuleRef>) -> Self;
}

pub trait ShadowHost {
    fn shadow(&self) -> Option<&NodeRef>;
}

pub trait HasStyle {
    fn style(&self) -> &Arc<StyleDeclaration>;
}

pub trait HasSource: Sized {
    fn source(&self) -> Option<&Source>;

    fn replace_source(&self, source: Option<Source>) -> Self;
}

macro_rules! impl_identified {
    ($($ty:ty),*) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_identified!(
    TextNode,
    Element,
    DocumentFragment,
    Document,
    StyleSheet,
    MediaRule,
    StyleRule,
    StyleDeclaration
);

impl Identified for Node {
    fn id(&self) -> &str {
        Node::id(self)
    }
}

impl Identified for CssRule {
    fn id(&self) -> &str {
        CssRule::id(self)
    }
}

macro_rules! impl_parent_node {
    ($($ty:ty),*) => {
        $(impl ParentNode for $ty {
            fn child_nodes(&self) -> &[NodeRef] {
                &self.child_nodes
            }

            fn with_child_nodes(&self, child_nodes: Vec<NodeRef>) -> Self {
                Self {
                    child_nodes,
                    ..self.clone_shallow()
                }
            }
        })*
    };
}

impl_parent_node!(Element, DocumentFragment, Document);

macro_rules! impl_grouping_rule {
    ($($ty:ty),*) => {
        $(impl GroupingRule for $ty {
            fn rules(&self) -> &[RuleRef] {
                &self.rules
            }

            fn with_rules(&self, rules: Vec<RuleRef>) -> Self {
                Self {
                    rules,
                    ..self.clone_shallow()
                }
            }
        })*
    };
}

impl_grouping_rule!(StyleSheet, MediaRule);

macro_rules! impl_has_source {
    ($($ty:ty),*) => {
        $(impl HasSource for $ty {
            fn source(&self) -> Option<&Source> {
                self.source.as_ref()
            }

            fn replace_source(&self, source: Option<Source>) -> Self {
                Self {
                    source,
                    ..self.clone()
                }
            }
        })*
    };
}

impl_has_source!(
    TextNode,
    Element,
    DocumentFragment,
    Document,
    StyleSheet,
    MediaRule,
    StyleRule
);

impl ShadowHost for Element {
    fn shadow(&self) -> Option<&NodeRef> {
        self.shadow.as_ref()
    }
}

impl HasStyle for StyleRule {
    fn style(&self) -> &Arc<StyleDeclaration> {
        &self.style
    }
}

/// Copies every field except the child list, which is left empty so the
/// caller's replacement list is not preceded by a throwaway clone of it.
trait CloneShallow {
    fn clone_shallow(&self) -> Self;
}

impl CloneShallow for Element {
    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            tag_name: self.tag_name.clone(),
            attributes: self.attributes.clone(),
            child_nodes: Vec::new(),
            shadow: self.shadow.clone(),
            sheet: self.sheet.clone(),
            source: self.source.clone(),
        }
    }
}

impl CloneShallow for DocumentFragment {
    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            child_nodes: Vec::new(),
            source: self.source.clone(),
        }
    }
}

impl CloneShallow for Document {
    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            child_nodes: Vec::new(),
            source: self.source.clone(),
        }
    }
}

impl CloneShallow for StyleSheet {
    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            rules: Vec::new(),
            source: self.source.clone(),
        }
    }
}

impl CloneShallow for MediaRule {
    fn clone_shallow(&self) -> Self {
        Self {
            id: self.id.clone(),
            condition_text: self.condition_text.clone(),
            rules: Vec::new(),
            source: self.source.clone(),
        }
    }
}
