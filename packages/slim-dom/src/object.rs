//! Uniform handle over every addressable object in a tree: nodes, CSS rules
//! and style declarations.

use crate::css::{CssRule, RuleRef, StyleDeclaration};
use crate::node::{Node, NodeRef, Source};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectRef {
    Node(NodeRef),
    Rule(RuleRef),
    Style(Arc<StyleDeclaration>),
}

impl ObjectRef {
    pub fn id(&self) -> &str {
        match self {
            ObjectRef::Node(node) => node.id(),
            ObjectRef::Rule(rule) => rule.id(),
            ObjectRef::Style(style) => &style.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ObjectRef::Node(node) => node.kind(),
            ObjectRef::Rule(rule) => rule.kind(),
            ObjectRef::Style(_) => "style declaration",
        }
    }

    pub fn source(&self) -> Option<&Source> {
        match self {
            ObjectRef::Node(node) => node.source(),
            ObjectRef::Rule(rule) => rule.source(),
            ObjectRef::Style(_) => None,
        }
    }

    /// Identity comparison: both handles point at the same allocation
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        match (self, other) {
            (ObjectRef::Node(a), ObjectRef::Node(b)) => Arc::ptr_eq(a, b),
            (ObjectRef::Rule(a), ObjectRef::Rule(b)) => Arc::ptr_eq(a, b),
            (ObjectRef::Style(a), ObjectRef::Style(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            ObjectRef::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_rule(&self) -> Option<&RuleRef> {
        match self {
            ObjectRef::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_style(&self) -> Option<&Arc<StyleDeclaration>> {
        match self {
            ObjectRef::Style(style) => Some(style),
            _ => None,
        }
    }

    pub(crate) fn downgrade(&self) -> WeakObjectRef {
        match self {
            ObjectRef::Node(node) => WeakObjectRef::Node(Arc::downgrade(node)),
            ObjectRef::Rule(rule) => WeakObjectRef::Rule(Arc::downgrade(rule)),
            ObjectRef::Style(style) => WeakObjectRef::Style(Arc::downgrade(style)),
        }
    }
}

impl From<NodeRef> for ObjectRef {
    fn from(node: NodeRef) -> Self {
        ObjectRef::Node(node)
    }
}

impl From<RuleRef> for ObjectRef {
    fn from(rule: RuleRef) -> Self {
        ObjectRef::Rule(rule)
    }
}

impl From<Arc<StyleDeclaration>> for ObjectRef {
    fn from(style: Arc<StyleDeclaration>) -> Self {
        ObjectRef::Style(style)
    }
}

impl From<Node> for ObjectRef {
    fn from(node: Node) -> Self {
        ObjectRef::Node(Arc::new(node))
    }
}

impl From<CssRule> for ObjectRef {
    fn from(rule: CssRule) -> Self {
        ObjectRef::Rule(Arc::new(rule))
    }
}

/// Non-owning counterpart of [`ObjectRef`]
#[derive(Debug, Clone)]
pub(crate) enum WeakObjectRef {
    Node(Weak<Node>),
    Rule(Weak<CssRule>),
    Style(Weak<StyleDeclaration>),
}

impl WeakObjectRef {
    pub(crate) fn upgrade(&self) -> Option<ObjectRef> {
        match self {
            WeakObjectRef::Node(node) => node.upgrade().map(ObjectRef::Node),
            WeakObjectRef::Rule(rule) => rule.upgrade().map(ObjectRef::Rule),
            WeakObjectRef::Style(style) => style.upgrade().map(ObjectRef::Style),
        }
    }
}
