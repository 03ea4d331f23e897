//! Source provenance helpers: collecting the files a subtree came from and
//! carrying provenance from one tree onto a structurally parallel one.

use crate::css::{CssRule, RuleRef, StyleRule};
use crate::memo::Memo;
use crate::node::{Element, Node, NodeRef, Source};
use crate::traits::{GroupingRule, HasSource, ParentNode};
use std::collections::HashSet;
use std::sync::Arc;

thread_local! {
    pub(crate) static SOURCE_URIS: Memo<(NodeRef,), Arc<[String]>> =
        Memo::new("collect_source_uris");
}

/// Every distinct source URI in `node`'s subtree, in first-seen order.
/// Shadow roots, style sheets and rules are included.
pub fn collect_source_uris(node: &NodeRef) -> Vec<String> {
    nested_source_uris(node).to_vec()
}

fn nested_source_uris(node: &NodeRef) -> Arc<[String]> {
    SOURCE_URIS.with(|memo| {
        memo.get_or_insert_with(&(node.clone(),), || {
            let mut uris = UriSet::default();
            uris.push_source(node.source());

            if let Node::Element(element) = &**node {
                if let Some(shadow) = &element.shadow {
                    uris.extend(nested_source_uris(shadow).iter());
                }
                if let Some(sheet) = &element.sheet {
                    collect_rule_uris(sheet, &mut uris);
                }
            }
            for child in node.child_nodes().unwrap_or_default() {
                uris.extend(nested_source_uris(child).iter());
            }

            uris.into_shared()
        })
    })
}

fn collect_rule_uris(rule: &RuleRef, uris: &mut UriSet) {
    uris.push_source(rule.source());
    for child in rule.rules().unwrap_or_default() {
        collect_rule_uris(child, uris);
    }
}

#[derive(Default)]
struct UriSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl UriSet {
    fn push(&mut self, uri: &str) {
        if !uri.is_empty() && self.seen.insert(uri.to_string()) {
            self.ordered.push(uri.to_string());
        }
    }

    fn push_source(&mut self, source: Option<&Source>) {
        if let Some(source) = source {
            self.push(&source.uri);
        }
    }

    fn extend<'a>(&mut self, uris: impl Iterator<Item = &'a String>) {
        for uri in uris {
            self.push(uri);
        }
    }

    fn into_shared(self) -> Arc<[String]> {
        Arc::from(self.ordered)
    }
}

/// Returns `to` with the provenance of the parallel objects in `from`.
///
/// Trees are matched position by position (children, shadow, sheet, rules).
/// Positions that exist only in `to` keep their own provenance. Subtrees
/// whose provenance already matches are returned as-is, so the result shares
/// everything that did not need to change.
pub fn sync_sources(to: &NodeRef, from: &NodeRef) -> NodeRef {
    let source = from.source().cloned();

    let child_nodes = match (to.child_nodes(), from.child_nodes()) {
        (Some(to_children), Some(from_children)) => {
            Some(sync_list(to_children, from_children, sync_sources))
        }
        (to_children, _) => to_children.map(<[NodeRef]>::to_vec),
    };

    let (shadow, sheet) = match (&**to, &**from) {
        (Node::Element(to_el), Node::Element(from_el)) => (
            sync_optional(&to_el.shadow, &from_el.shadow, sync_sources),
            sync_optional(&to_el.sheet, &from_el.sheet, sync_rule_sources),
        ),
        (Node::Element(to_el), _) => (to_el.shadow.clone(), to_el.sheet.clone()),
        _ => (None, None),
    };

    let unchanged = to.source() == source.as_ref()
        && child_nodes
            .as_ref()
            .zip(to.child_nodes())
            .map_or(true, |(new, old)| all_ptr_eq(new.as_slice(), old))
        && to
            .as_element()
            .map_or(true, |el| opt_ptr_eq(&shadow, &el.shadow) && opt_ptr_eq(&sheet, &el.sheet));
    if unchanged {
        return to.clone();
    }

    let node = match &**to {
        Node::Text(text) => Node::Text(text.replace_source(source)),
        Node::Element(element) => Node::Element(Element {
            child_nodes: child_nodes.unwrap_or_default(),
            shadow,
            sheet,
            source,
            ..element.clone()
        }),
        Node::DocumentFragment(fragment) => Node::DocumentFragment(
            fragment
                .with_child_nodes(child_nodes.unwrap_or_default())
                .replace_source(source),
        ),
        Node::Document(document) => Node::Document(
            document
                .with_child_nodes(child_nodes.unwrap_or_default())
                .replace_source(source),
        ),
    };
    Arc::new(node)
}

/// Rule counterpart of [`sync_sources`]
pub fn sync_rule_sources(to: &RuleRef, from: &RuleRef) -> RuleRef {
    let source = from.source().cloned();
    let rules = match (to.rules(), from.rules()) {
        (Some(to_rules), Some(from_rules)) => {
            Some(sync_list(to_rules, from_rules, sync_rule_sources))
        }
        (to_rules, _) => to_rules.map(<[RuleRef]>::to_vec),
    };

    let unchanged = to.source() == source.as_ref()
        && rules
            .as_ref()
            .zip(to.rules())
            .map_or(true, |(new, old)| all_ptr_eq(new.as_slice(), old));
    if unchanged {
        return to.clone();
    }

    let rule = match &**to {
        CssRule::StyleSheet(sheet) => {
            CssRule::StyleSheet(sheet.with_rules(rules.unwrap_or_default()).replace_source(source))
        }
        CssRule::MediaRule(media) => {
            CssRule::MediaRule(media.with_rules(rules.unwrap_or_default()).replace_source(source))
        }
        CssRule::StyleRule(style_rule) => CssRule::StyleRule(StyleRule {
            source,
            ..style_rule.clone()
        }),
    };
    Arc::new(rule)
}

fn sync_list<T>(
    to: &[Arc<T>],
    from: &[Arc<T>],
    sync: fn(&Arc<T>, &Arc<T>) -> Arc<T>,
) -> Vec<Arc<T>> {
    to.iter()
        .enumerate()
        .map(|(i, item)| match from.get(i) {
            Some(counterpart) => sync(item, counterpart),
            None => item.clone(),
        })
        .collect()
}

fn sync_optional<T>(
    to: &Option<Arc<T>>,
    from: &Option<Arc<T>>,
    sync: fn(&Arc<T>, &Arc<T>) -> Arc<T>,
) -> Option<Arc<T>> {
    match (to, from) {
        (Some(to), Some(from)) => Some(sync(to, from)),
        (to, _) => to.clone(),
    }
}

fn all_ptr_eq<T>(a: &[Arc<T>], b: &[Arc<T>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Arc::ptr_eq(a, b))
}

fn opt_ptr_eq<T>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
