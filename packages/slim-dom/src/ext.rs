//! # Variant-dispatching Extension Traits
//!
//! The functions in [`crate::mutations`] are typed against concrete node and
//! rule kinds. These traits lift them onto the [`Node`] and [`CssRule`]
//! enums, so callers holding an arbitrary node (for instance one looked up by
//! identifier) can edit it without matching on the variant first. Asking a
//! variant for an edit it does not support fails with
//! [`DomError::KindMismatch`].
//!
//! ```rust,ignore
//! use slim_dom::{Element, NodeExt, TextNode};
//!
//! let div = Element::new("a", "div").into_ref();
//! let next = div.insert_child(TextNode::new("b", "hi").into_ref(), None)?;
//! ```

use crate::css::{CssRule, RuleRef};
use crate::error::{DomError, DomResult};
use crate::mutations::{
    insert_child_node, insert_css_rule, move_child_node, move_css_rule, remove_child_node_at,
    remove_css_rule_at, remove_css_style_property, set_css_selector_text, set_css_style_property,
    set_element_attribute, set_text_node_value,
};
use crate::node::{Node, NodeRef};
use std::sync::Arc;

// ============================================================================
// Nodes
// ============================================================================

pub trait NodeExt {
    fn insert_child(&self, child: NodeRef, index: Option<usize>) -> DomResult<NodeRef>;
    fn remove_child_at(&self, index: usize) -> DomResult<NodeRef>;
    fn move_child(&self, index: usize, new_index: usize) -> DomResult<NodeRef>;
    /// See [`set_element_attribute`]
    fn set_attribute(
        &self,
        name: &str,
        value: Option<&str>,
        index: Option<usize>,
    ) -> DomResult<NodeRef>;
    fn set_text_value(&self, value: &str) -> DomResult<NodeRef>;
}

fn node_mismatch(expected: &'static str, node: &Node) -> DomError {
    DomError::KindMismatch {
        expected,
        found: node.kind(),
    }
}

impl NodeExt for NodeRef {
    fn insert_child(&self, child: NodeRef, index: Option<usize>) -> DomResult<NodeRef> {
        let node = match &**self {
            Node::Element(el) => Node::Element(insert_child_node(el, child, index)?),
            Node::DocumentFragment(f) => {
                Node::DocumentFragment(insert_child_node(f, child, index)?)
            }
            Node::Document(d) => Node::Document(insert_child_node(d, child, index)?),
            Node::Text(_) => return Err(node_mismatch("parent node", self)),
        };
        Ok(Arc::new(node))
    }

    fn remove_child_at(&self, index: usize) -> DomResult<NodeRef> {
        let node = match &**self {
            Node::Element(el) => Node::Element(remove_child_node_at(el, index)?),
            Node::DocumentFragment(f) => Node::DocumentFragment(remove_child_node_at(f, index)?),
            Node::Document(d) => Node::Document(remove_child_node_at(d, index)?),
            Node::Text(_) => return Err(node_mismatch("parent node", self)),
        };
        Ok(Arc::new(node))
    }

    fn move_child(&self, index: usize, new_index: usize) -> DomResult<NodeRef> {
        let node = match &**self {
            Node::Element(el) => Node::Element(move_child_node(el, index, new_index)?),
            Node::DocumentFragment(f) => {
                Node::DocumentFragment(move_child_node(f, index, new_index)?)
            }
            Node::Document(d) => Node::Document(move_child_node(d, index, new_index)?),
            Node::Text(_) => return Err(node_mismatch("parent node", self)),
        };
        Ok(Arc::new(node))
    }

    fn set_attribute(
        &self,
        name: &str,
        value: Option<&str>,
        index: Option<usize>,
    ) -> DomResult<NodeRef> {
        let element = self.as_element().ok_or_else(|| node_mismatch("element", self))?;
        Ok(Arc::new(Node::Element(set_element_attribute(element, name, value, index)?)))
    }

    fn set_text_value(&self, value: &str) -> DomResult<NodeRef> {
        let text = self.as_text().ok_or_else(|| node_mismatch("text", self))?;
        Ok(Arc::new(Node::Text(set_text_node_value(text, value))))
    }
}

// ============================================================================
// Rules
// ============================================================================

pub trait RuleExt {
    fn insert_rule(&self, rule: RuleRef, index: Option<usize>) -> DomResult<RuleRef>;
    fn remove_rule_at(&self, index: usize) -> DomResult<RuleRef>;
    fn move_rule(&self, index: usize, new_index: usize) -> DomResult<RuleRef>;
    fn set_selector_text(&self, selector_text: &str) -> DomResult<RuleRef>;
    fn set_style_property(&self, name: &str, value: &str) -> DomResult<RuleRef>;
    fn remove_style_property(&self, name: &str) -> DomResult<RuleRef>;
}

fn rule_mismatch(expected: &'static str, rule: &CssRule) -> DomError {
    DomError::KindMismatch {
        expected,
        found: rule.kind(),
    }
}

impl RuleExt for RuleRef {
    fn insert_rule(&self, rule: RuleRef, index: Option<usize>) -> DomResult<RuleRef> {
        let rule = match &**self {
            CssRule::StyleSheet(s) => CssRule::StyleSheet(insert_css_rule(s, rule, index)?),
            CssRule::MediaRule(m) => CssRule::MediaRule(insert_css_rule(m, rule, index)?),
            CssRule::StyleRule(_) => return Err(rule_mismatch("grouping rule", self)),
        };
        Ok(Arc::new(rule))
    }

    fn remove_rule_at(&self, index: usize) -> DomResult<RuleRef> {
        let rule = match &**self {
            CssRule::StyleSheet(s) => CssRule::StyleSheet(remove_css_rule_at(s, index)?),
            CssRule::MediaRule(m) => CssRule::MediaRule(remove_css_rule_at(m, index)?),
            CssRule::StyleRule(_) => return Err(rule_mismatch("grouping rule", self)),
        };
        Ok(Arc::new(rule))
    }

    fn move_rule(&self, index: usize, new_index: usize) -> DomResult<RuleRef> {
        let rule = match &**self {
            CssRule::StyleSheet(s) => CssRule::StyleSheet(move_css_rule(s, index, new_index)?),
            CssRule::MediaRule(m) => CssRule::MediaRule(move_css_rule(m, index, new_index)?),
            CssRule::StyleRule(_) => return Err(rule_mismatch("grouping rule", self)),
        };
        Ok(Arc::new(rule))
    }

    fn set_selector_text(&self, selector_text: &str) -> DomResult<RuleRef> {
        let rule = self.as_style_rule().ok_or_else(|| rule_mismatch("style rule", self))?;
        Ok(Arc::new(CssRule::StyleRule(set_css_selector_text(rule, selector_text))))
    }

    fn set_style_property(&self, name: &str, value: &str) -> DomResult<RuleRef> {
        let rule = self.as_style_rule().ok_or_else(|| rule_mismatch("style rule", self))?;
        Ok(Arc::new(CssRule::StyleRule(set_css_style_property(rule, name, value))))
    }

    fn remove_style_property(&self, name: &str) -> DomResult<RuleRef> {
        let rule = self.as_style_rule().ok_or_else(|| rule_mismatch("style rule", self))?;
        Ok(Arc::new(CssRule::StyleRule(remove_css_style_property(rule, name))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{MediaRule, StyleDeclaration, StyleRule, StyleSheet};
    use crate::node::{Element, TextNode};

    #[test]
    fn test_node_ext_dispatches_on_variant() {
        let div = Element::new("a", "div").into_ref();
        let text = TextNode::new("t", "hi").into_ref();

        let next = div.insert_child(text.clone(), None).unwrap();
        assert!(Arc::ptr_eq(&next.child_nodes().unwrap()[0], &text));
        assert_eq!(next.id(), "a");

        let next = next.set_attribute("class", Some("card"), None).unwrap();
        assert_eq!(next.as_element().unwrap().attributes[0].value, "card");

        let edited = text.set_text_value("bye").unwrap();
        assert_eq!(edited.as_text().unwrap().value, "bye");
    }

    #[test]
    fn test_node_ext_kind_mismatch() {
        let text = TextNode::new("t", "hi").into_ref();

        assert_eq!(
            text.insert_child(Element::new("x", "b").into_ref(), None),
            Err(DomError::KindMismatch {
                expected: "parent node",
                found: "text"
            })
        );
        assert!(matches!(
            text.set_attribute("a", Some("b"), None),
            Err(DomError::KindMismatch { expected: "element", .. })
        ));
        assert!(matches!(
            Element::new("e", "p").into_ref().set_text_value("x"),
            Err(DomError::KindMismatch { expected: "text", .. })
        ));
    }

    #[test]
    fn test_rule_ext() {
        let sheet = StyleSheet::new("s")
            .with_rule(StyleRule::new("r", ".a", StyleDeclaration::new("d")).into_ref())
            .into_ref();

        let next = sheet
            .insert_rule(MediaRule::new("m", "print").into_ref(), Some(0))
            .unwrap();
        assert_eq!(next.rules().unwrap()[0].id(), "m");

        let next = next.move_rule(0, 1).unwrap();
        assert_eq!(next.rules().unwrap()[1].id(), "m");

        let rule = next.rules().unwrap()[0].clone();
        let rule = rule.set_selector_text(".b").unwrap();
        let rule = rule.set_style_property("color", "red").unwrap();
        assert_eq!(rule.as_style_rule().unwrap().selector_text, ".b");
        assert_eq!(rule.as_style_rule().unwrap().style.get("color"), Some("red"));

        let rule = rule.remove_style_property("color").unwrap();
        assert!(rule.as_style_rule().unwrap().style.properties.is_empty());

        assert!(matches!(
            sheet.set_selector_text(".c"),
            Err(DomError::KindMismatch { expected: "style rule", found: "style sheet" })
        ));
        assert!(rule.remove_rule_at(0).is_err());
    }
}
