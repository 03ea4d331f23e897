//! # Immutable Mutation Operations
//!
//! Every operation takes a node or rule and returns a new one with the same
//! identifier. Anything the edit does not touch is carried into the result by
//! reference, so the old and new trees share all unchanged subtrees.
//!
//! Out-of-range indices are caller bugs and fail with
//! [`DomError::IndexOutOfRange`] instead of being clamped.

use crate::css::{CssRule, RuleRef, StyleDeclaration, StyleRule};
use crate::error::{DomError, DomResult};
use crate::node::{Attribute, Element, Node, NodeRef, TextNode};
use crate::object::ObjectRef;
use crate::path::PathStep;
use crate::traits::{GroupingRule, ParentNode};
use std::sync::Arc;

const CHILD_NODES: &str = "childNodes";
const RULES: &str = "rules";
const ATTRIBUTES: &str = "attributes";

fn inserted<T: Clone>(
    items: &[T],
    item: T,
    index: Option<usize>,
    kind: &'static str,
) -> DomResult<Vec<T>> {
    let index = index.unwrap_or(items.len());
    if index > items.len() {
        return Err(DomError::out_of_range(kind, index, items.len()));
    }

    let mut result = Vec::with_capacity(items.len() + 1);
    result.extend_from_slice(&items[..index]);
    result.push(item);
    result.extend_from_slice(&items[index..]);
    Ok(result)
}

fn removed<T: Clone>(items: &[T], index: usize, kind: &'static str) -> DomResult<Vec<T>> {
    if index >= items.len() {
        return Err(DomError::out_of_range(kind, index, items.len()));
    }

    let mut result = Vec::with_capacity(items.len() - 1);
    result.extend_from_slice(&items[..index]);
    result.extend_from_slice(&items[index + 1..]);
    Ok(result)
}

fn moved<T: Clone>(
    items: &[T],
    index: usize,
    new_index: usize,
    kind: &'static str,
) -> DomResult<Vec<T>> {
    if index >= items.len() {
        return Err(DomError::out_of_range(kind, index, items.len()));
    }
    if new_index >= items.len() {
        return Err(DomError::out_of_range(kind, new_index, items.len()));
    }

    let mut result = items.to_vec();
    let item = result.remove(index);
    result.insert(new_index, item);
    Ok(result)
}

/// Inserts `child` at `index`, or appends it when `index` is `None`
pub fn insert_child_node<P: ParentNode>(
    parent: &P,
    child: NodeRef,
    index: Option<usize>,
) -> DomResult<P> {
    let child_nodes = inserted(parent.child_nodes(), child, index, CHILD_NODES)?;
    Ok(parent.with_child_nodes(child_nodes))
}

pub fn push_child_node<P: ParentNode>(parent: &P, child: NodeRef) -> P {
    let mut child_nodes = parent.child_nodes().to_vec();
    child_nodes.push(child);
    parent.with_child_nodes(child_nodes)
}

pub fn remove_child_node_at<P: ParentNode>(parent: &P, index: usize) -> DomResult<P> {
    let child_nodes = removed(parent.child_nodes(), index, CHILD_NODES)?;
    Ok(parent.with_child_nodes(child_nodes))
}

/// Removes the child at `index` and re-inserts it at `new_index`
pub fn move_child_node<P: ParentNode>(parent: &P, index: usize, new_index: usize) -> DomResult<P> {
    let child_nodes = moved(parent.child_nodes(), index, new_index, CHILD_NODES)?;
    Ok(parent.with_child_nodes(child_nodes))
}

pub fn insert_css_rule<G: GroupingRule>(
    parent: &G,
    rule: RuleRef,
    index: Option<usize>,
) -> DomResult<G> {
    let rules = inserted(parent.rules(), rule, index, RULES)?;
    Ok(parent.with_rules(rules))
}

pub fn push_css_rule<G: GroupingRule>(parent: &G, rule: RuleRef) -> G {
    let mut rules = parent.rules().to_vec();
    rules.push(rule);
    parent.with_rules(rules)
}

pub fn remove_css_rule_at<G: GroupingRule>(parent: &G, index: usize) -> DomResult<G> {
    let rules = removed(parent.rules(), index, RULES)?;
    Ok(parent.with_rules(rules))
}

pub fn move_css_rule<G: GroupingRule>(parent: &G, index: usize, new_index: usize) -> DomResult<G> {
    let rules = moved(parent.rules(), index, new_index, RULES)?;
    Ok(parent.with_rules(rules))
}

pub fn set_css_selector_text(rule: &StyleRule, selector_text: impl Into<String>) -> StyleRule {
    StyleRule {
        selector_text: selector_text.into(),
        ..rule.clone()
    }
}

/// Sets one property of the rule's declaration. Existing properties keep
/// their position; new ones are appended.
pub fn set_css_style_property(
    rule: &StyleRule,
    name: impl Into<String>,
    value: impl Into<String>,
) -> StyleRule {
    let mut properties = rule.style.properties.clone();
    properties.insert(name.into(), value.into());

    StyleRule {
        style: Arc::new(StyleDeclaration {
            id: rule.style.id.clone(),
            properties,
        }),
        ..rule.clone()
    }
}

pub fn remove_css_style_property(rule: &StyleRule, name: &str) -> StyleRule {
    if !rule.style.properties.contains_key(name) {
        return rule.clone();
    }

    let mut properties = rule.style.properties.clone();
    properties.shift_remove(name);

    StyleRule {
        style: Arc::new(StyleDeclaration {
            id: rule.style.id.clone(),
            properties,
        }),
        ..rule.clone()
    }
}

pub fn set_text_node_value(text: &TextNode, value: impl Into<String>) -> TextNode {
    TextNode {
        value: value.into(),
        ..text.clone()
    }
}

pub fn get_attribute<'a>(name: &str, element: &'a Element) -> Option<&'a Attribute> {
    element.attributes.iter().find(|attribute| attribute.name == name)
}

pub fn has_attribute(name: &str, element: &Element) -> bool {
    get_attribute(name, element).is_some()
}

pub fn get_attribute_value<'a>(name: &str, element: &'a Element) -> Option<&'a str> {
    get_attribute(name, element).map(|attribute| attribute.value.as_str())
}

/// Sets, updates or drops the attribute `name`.
///
/// - An empty or absent `value` drops the attribute (no-op when missing).
/// - An existing attribute is updated where it stands, unless `index` names
///   a different position, in which case it is relocated there.
/// - A missing attribute is appended, or inserted at `index`.
pub fn set_element_attribute(
    element: &Element,
    name: &str,
    value: Option<&str>,
    index: Option<usize>,
) -> DomResult<Element> {
    let value = value.filter(|value| !value.is_empty());
    let position = element.attributes.iter().position(|attribute| attribute.name == name);
    let mut attributes = element.attributes.clone();

    let current = match (position, value) {
        (Some(position), None) => {
            attributes.remove(position);
            return Ok(Element {
                attributes,
                ..element.clone()
            });
        }
        (None, None) => return Ok(element.clone()),
        (Some(position), Some(value)) => {
            attributes[position].value = value.to_string();
            position
        }
        (None, Some(value)) => {
            attributes.push(Attribute::new(name, value));
            attributes.len() - 1
        }
    };

    if let Some(index) = index {
        if index != current {
            attributes = moved(&attributes, current, index, ATTRIBUTES)?;
        }
    }

    Ok(Element {
        attributes,
        ..element.clone()
    })
}

/// Rebuilds every ancestor along `path`, substituting `replacement` where the
/// path ends. Objects off the path are shared with `root`.
pub fn replace_nested_object(
    root: &ObjectRef,
    path: &[PathStep],
    replacement: ObjectRef,
) -> DomResult<ObjectRef> {
    replace_at(root, path, 0, replacement)
}

/// [`replace_nested_object`] for the common case of a node root
pub fn replace_nested_child(
    root: &NodeRef,
    path: &[PathStep],
    replacement: impl Into<ObjectRef>,
) -> DomResult<NodeRef> {
    match replace_at(&ObjectRef::Node(root.clone()), path, 0, replacement.into())? {
        ObjectRef::Node(node) => Ok(node),
        other => Err(DomError::KindMismatch {
            expected: "node",
            found: other.kind(),
        }),
    }
}

fn expect_node(object: ObjectRef) -> DomResult<NodeRef> {
    match object {
        ObjectRef::Node(node) => Ok(node),
        other => Err(DomError::KindMismatch {
            expected: "node",
            found: other.kind(),
        }),
    }
}

fn expect_rule(object: ObjectRef) -> DomResult<RuleRef> {
    match object {
        ObjectRef::Rule(rule) => Ok(rule),
        other => Err(DomError::KindMismatch {
            expected: "rule",
            found: other.kind(),
        }),
    }
}

fn replaced<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let mut result = items.to_vec();
    result[index] = item;
    result
}

fn replace_at(
    current: &ObjectRef,
    path: &[PathStep],
    depth: usize,
    replacement: ObjectRef,
) -> DomResult<ObjectRef> {
    let Some(step) = path.get(depth) else {
        return Ok(replacement);
    };
    let invalid = || DomError::InvalidPath { step: depth };
    let descend =
        |object: ObjectRef, replacement| replace_at(&object, path, depth + 1, replacement);

    match (current, *step) {
        (ObjectRef::Node(node), PathStep::Child(index)) => {
            let child = node.child_nodes().and_then(|c| c.get(index)).ok_or_else(invalid)?;
            let new_child = expect_node(descend(ObjectRef::Node(child.clone()), replacement)?)?;

            let node = match &**node {
                Node::Element(el) => {
                    Node::Element(el.with_child_nodes(replaced(&el.child_nodes, index, new_child)))
                }
                Node::DocumentFragment(f) => Node::DocumentFragment(
                    f.with_child_nodes(replaced(&f.child_nodes, index, new_child)),
                ),
                Node::Document(d) => {
                    Node::Document(d.with_child_nodes(replaced(&d.child_nodes, index, new_child)))
                }
                Node::Text(_) => return Err(invalid()),
            };
            Ok(ObjectRef::Node(Arc::new(node)))
        }
        (ObjectRef::Node(node), PathStep::Shadow) => {
            let element = node.as_element().ok_or_else(invalid)?;
            let shadow = element.shadow.clone().ok_or_else(invalid)?;
            let new_shadow = expect_node(descend(ObjectRef::Node(shadow), replacement)?)?;

            Ok(ObjectRef::Node(Arc::new(Node::Element(Element {
                shadow: Some(new_shadow),
                ..element.clone()
            }))))
        }
        (ObjectRef::Node(node), PathStep::Sheet) => {
            let element = node.as_element().ok_or_else(invalid)?;
            let sheet = element.sheet.clone().ok_or_else(invalid)?;
            let new_sheet = expect_rule(descend(ObjectRef::Rule(sheet), replacement)?)?;

            Ok(ObjectRef::Node(Arc::new(Node::Element(Element {
                sheet: Some(new_sheet),
                ..element.clone()
            }))))
        }
        (ObjectRef::Rule(rule), PathStep::Rule(index)) => {
            let child = rule.rules().and_then(|r| r.get(index)).ok_or_else(invalid)?;
            let new_child = expect_rule(descend(ObjectRef::Rule(child.clone()), replacement)?)?;

            let rule = match &**rule {
                CssRule::StyleSheet(s) => {
                    CssRule::StyleSheet(s.with_rules(replaced(&s.rules, index, new_child)))
                }
                CssRule::MediaRule(m) => {
                    CssRule::MediaRule(m.with_rules(replaced(&m.rules, index, new_child)))
                }
                CssRule::StyleRule(_) => return Err(invalid()),
            };
            Ok(ObjectRef::Rule(Arc::new(rule)))
        }
        (ObjectRef::Rule(rule), PathStep::Style) => {
            let style_rule = rule.as_style_rule().ok_or_else(invalid)?;
            let new_style = match replace_at(
                &ObjectRef::Style(style_rule.style.clone()),
                path,
                depth + 1,
                replacement,
            )? {
                ObjectRef::Style(style) => style,
                other => {
                    return Err(DomError::KindMismatch {
                        expected: "style declaration",
                        found: other.kind(),
                    })
                }
            };

            Ok(ObjectRef::Rule(Arc::new(CssRule::StyleRule(StyleRule {
                style: new_style,
                ..style_rule.clone()
            }))))
        }
        _ => Err(invalid()),
    }
}
