//! Virtual node types
//!
//! Nodes are immutable once wrapped in an [`Arc`]. Children are held as
//! [`NodeRef`]s so that a new tree produced by an edit can reuse every
//! untouched subtree of the previous one by reference.

use crate::css::RuleRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a node. Identity is pointer identity.
pub type NodeRef = Arc<Node>;

/// Line/column position in an original source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// Provenance of a node or rule (debugging only, never part of the rendering)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Source {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            location: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.location = Some(SourceLocation { line, column });
        self
    }
}

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Text(TextNode),
    Element(Element),
    DocumentFragment(DocumentFragment),
    Document(Document),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub tag_name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub child_nodes: Vec<NodeRef>,
    /// Shadow root (a `DocumentFragment` in practice)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<NodeRef>,
    /// Style sheet owned by a `style` element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<RuleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFragment {
    pub id: String,
    #[serde(default)]
    pub child_nodes: Vec<NodeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub child_nodes: Vec<NodeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl TextNode {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(Node::Text(self))
    }
}

impl Element {
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            attributes: Vec::new(),
            child_nodes: Vec::new(),
            shadow: None,
            sheet: None,
            source: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: NodeRef) -> Self {
        self.child_nodes.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeRef>) -> Self {
        self.child_nodes.extend(children);
        self
    }

    pub fn with_shadow(mut self, shadow: NodeRef) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn with_sheet(mut self, sheet: RuleRef) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_style(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("style")
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(Node::Element(self))
    }
}

impl DocumentFragment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            child_nodes: Vec::new(),
            source: None,
        }
    }

    pub fn with_child(mut self, child: NodeRef) -> Self {
        self.child_nodes.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeRef>) -> Self {
        self.child_nodes.extend(children);
        self
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(Node::DocumentFragment(self))
    }
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            child_nodes: Vec::new(),
            source: None,
        }
    }

    pub fn with_child(mut self, child: NodeRef) -> Self {
        self.child_nodes.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeRef>) -> Self {
        self.child_nodes.extend(children);
        self
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(Node::Document(self))
    }
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Text(text) => &text.id,
            Node::Element(element) => &element.id,
            Node::DocumentFragment(fragment) => &fragment.id,
            Node::Document(document) => &document.id,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Text(_) => "text",
            Node::Element(_) => "element",
            Node::DocumentFragment(_) => "document fragment",
            Node::Document(_) => "document",
        }
    }

    pub fn source(&self) -> Option<&Source> {
        match self {
            Node::Text(text) => text.source.as_ref(),
            Node::Element(element) => element.source.as_ref(),
            Node::DocumentFragment(fragment) => fragment.source.as_ref(),
            Node::Document(document) => document.source.as_ref(),
        }
    }

    /// Ordered children, or `None` for text nodes
    pub fn child_nodes(&self) -> Option<&[NodeRef]> {
        match self {
            Node::Text(_) => None,
            Node::Element(element) => Some(&element.child_nodes),
            Node::DocumentFragment(fragment) => Some(&fragment.child_nodes),
            Node::Document(document) => Some(&document.child_nodes),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }
}

impl From<TextNode> for Node {
    fn from(text: TextNode) -> Self {
        Node::Text(text)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<DocumentFragment> for Node {
    fn from(fragment: DocumentFragment) -> Self {
        Node::DocumentFragment(fragment)
    }
}

impl From<Document> for Node {
    fn from(document: Document) -> Self {
        Node::Document(document)
    }
}
