//! # Serialization & Checksum
//!
//! Canonical text rendering of a tree and a CRC32 checksum over it.
//!
//! The rendering depends on content only: identifiers and sources are never
//! rendered, so two independently built trees with the same content render
//! (and checksum) identically. Attribute values are JSON-quoted and text is
//! escaped so markup-looking text cannot collide with real elements.
//!
//! Every subtree rendering is memoized on the subtree's identity, so after an
//! edit only the rebuilt ancestors are rendered again.

use crate::css::{CssRule, RuleRef};
use crate::memo::Memo;
use crate::node::{Node, NodeRef};
use crc32fast::Hasher;
use std::sync::Arc;

thread_local! {
    pub(crate) static STRINGIFY_NODE: Memo<(NodeRef, bool), Arc<str>> = Memo::new("stringify_node");
    pub(crate) static STRINGIFY_RULE: Memo<(RuleRef,), Arc<str>> = Memo::new("stringify_rule");
    pub(crate) static CHECKSUM: Memo<(NodeRef,), u32> = Memo::new("checksum");
}

/// Renders `node`, recursing into shadow roots when `include_shadow` is set
pub fn stringify_node(node: &NodeRef, include_shadow: bool) -> Arc<str> {
    STRINGIFY_NODE.with(|memo| {
        memo.get_or_insert_with(&(node.clone(), include_shadow), || {
            let mut buffer = String::new();
            render_node(node, include_shadow, &mut buffer);
            Arc::from(buffer)
        })
    })
}

/// Renders a CSS rule tree as style sheet text
pub fn stringify_rule(rule: &RuleRef) -> Arc<str> {
    STRINGIFY_RULE.with(|memo| {
        memo.get_or_insert_with(&(rule.clone(),), || {
            let mut buffer = String::new();
            render_rule(rule, &mut buffer);
            Arc::from(buffer)
        })
    })
}

/// CRC32 of the canonical rendering of `root`, shadow content included
pub fn checksum(root: &NodeRef) -> u32 {
    CHECKSUM.with(|memo| {
        memo.get_or_insert_with(&(root.clone(),), || {
            let mut hasher = Hasher::new();
            hasher.update(stringify_node(root, true).as_bytes());
            hasher.finalize()
        })
    })
}

fn render_node(node: &NodeRef, include_shadow: bool, buffer: &mut String) {
    match &**node {
        Node::Text(text) => escape_text(&text.value, buffer),
        Node::Element(element) => {
            buffer.push('<');
            buffer.push_str(&element.tag_name);
            for attribute in &element.attributes {
                buffer.push(' ');
                buffer.push_str(&attribute.name);
                buffer.push('=');
                buffer.push_str(&serde_json::Value::from(attribute.value.as_str()).to_string());
            }
            buffer.push('>');

            if include_shadow {
                if let Some(shadow) = &element.shadow {
                    buffer.push_str("<#shadow>");
                    buffer.push_str(&stringify_node(shadow, include_shadow));
                    buffer.push_str("</#shadow>");
                }
            }
            if let Some(sheet) = &element.sheet {
                buffer.push_str(&stringify_rule(sheet));
            }
            for child in &element.child_nodes {
                buffer.push_str(&stringify_node(child, include_shadow));
            }

            buffer.push_str("</");
            buffer.push_str(&element.tag_name);
            buffer.push('>');
        }
        Node::DocumentFragment(_) | Node::Document(_) => {
            for child in node.child_nodes().unwrap_or_default() {
                buffer.push_str(&stringify_node(child, include_shadow));
            }
        }
    }
}

fn render_rule(rule: &RuleRef, buffer: &mut String) {
    match &**rule {
        CssRule::StyleSheet(sheet) => {
            for child in &sheet.rules {
                buffer.push_str(&stringify_rule(child));
            }
        }
        CssRule::MediaRule(media) => {
            buffer.push_str("@media ");
            buffer.push_str(&media.condition_text);
            buffer.push_str(" {");
            for child in &media.rules {
                buffer.push_str(&stringify_rule(child));
            }
            buffer.push('}');
        }
        CssRule::StyleRule(style_rule) => {
            buffer.push_str(&style_rule.selector_text);
            buffer.push_str(" {");
            for (name, value) in &style_rule.style.properties {
                buffer.push(' ');
                buffer.push_str(name);
                buffer.push_str(": ");
                buffer.push_str(value);
                buffer.push(';');
            }
            buffer.push_str(" }");
        }
    }
}

fn escape_text(value: &str, buffer: &mut String) {
    for c in value.chars() {
        match c {
            '&' => buffer.push_str("&amp;"),
            '<' => buffer.push_str("&lt;"),
            '>' => buffer.push_str("&gt;"),
            c => buffer.push(c),
        }
    }
}
