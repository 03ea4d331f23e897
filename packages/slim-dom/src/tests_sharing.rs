/// Structural sharing and identifier stability across edits
///
/// Every edit must return a tree in which siblings of the edited object are
/// the very same allocations as before, and no identifier other than the
/// replaced object's changes.
use crate::css::{MediaRule, StyleDeclaration, StyleRule, StyleSheet};
use crate::ext::{NodeExt, RuleExt};
use crate::index::FlatIndex;
use crate::mutations::{
    insert_child_node, move_child_node, remove_child_node_at, replace_nested_child,
};
use crate::node::{DocumentFragment, Element, NodeRef, TextNode};
use crate::path::{resolve, PathStep};
use crate::queries::{flatten, path_to};
use std::collections::BTreeSet;
use std::sync::Arc;

fn fixture() -> NodeRef {
    let sheet = StyleSheet::new("sheet")
        .with_rule(
            StyleRule::new(
                "rule-a",
                ".a",
                StyleDeclaration::new("decl-a").with_property("color", "red"),
            )
            .into_ref(),
        )
        .with_rule(
            MediaRule::new("media", "print")
                .with_rule(
                    StyleRule::new("rule-b", ".b", StyleDeclaration::new("decl-b")).into_ref(),
                )
                .into_ref(),
        )
        .into_ref();

    Element::new("root", "div")
        .with_child(Element::new("style", "style").with_sheet(sheet).into_ref())
        .with_child(
            Element::new("card", "x-card")
                .with_attribute("class", "card")
                .with_shadow(
                    DocumentFragment::new("card-shadow")
                        .with_child(TextNode::new("card-text", "inside").into_ref())
                        .into_ref(),
                )
                .into_ref(),
        )
        .with_child(
            Element::new("list", "ul")
                .with_child(Element::new("li-1", "li").into_ref())
                .with_child(Element::new("li-2", "li").into_ref())
                .with_child(Element::new("li-3", "li").into_ref())
                .into_ref(),
        )
        .into_ref()
}

fn ids(root: &NodeRef) -> BTreeSet<String> {
    FlatIndex::build(root).ids().map(str::to_string).collect()
}

fn child(node: &NodeRef, index: usize) -> &NodeRef {
    &node.child_nodes().unwrap()[index]
}

/// Applies `edit` to the object at `id` and writes it back into the tree
fn edit_at(root: &NodeRef, id: &str, edit: impl FnOnce(&NodeRef) -> NodeRef) -> NodeRef {
    let path = path_to(id, root).unwrap();
    let target = resolve(&path, root).unwrap();
    let replacement = edit(target.as_node().unwrap());
    replace_nested_child(root, &path, replacement).unwrap()
}

#[test]
fn test_siblings_are_shared_after_child_insert() {
    let root = fixture();
    let next = edit_at(&root, "list", |list| {
        list.insert_child(Element::new("li-0", "li").into_ref(), Some(0)).unwrap()
    });

    assert!(!Arc::ptr_eq(&root, &next));
    assert!(Arc::ptr_eq(child(&root, 0), child(&next, 0)));
    assert!(Arc::ptr_eq(child(&root, 1), child(&next, 1)));

    let old_list = child(&root, 2);
    let new_list = child(&next, 2);
    for i in 0..3 {
        assert!(Arc::ptr_eq(child(old_list, i), child(new_list, i + 1)));
    }
}

#[test]
fn test_identifiers_are_stable_across_edits() {
    let root = fixture();
    let before = ids(&root);

    let edited = edit_at(&root, "card", |card| {
        card.set_attribute("class", Some("wide"), None).unwrap()
    });
    assert_eq!(ids(&edited), before);
    assert_eq!(edited.id(), "root");

    let edited = edit_at(&edited, "card-text", |text| text.set_text_value("changed").unwrap());
    assert_eq!(ids(&edited), before);

    let edited = edit_at(&edited, "list", |list| list.move_child(0, 2).unwrap());
    assert_eq!(ids(&edited), before);
}

#[test]
fn test_rule_edit_shares_rest_of_sheet() {
    let root = fixture();
    let path = path_to("rule-a", &root).unwrap();
    assert_eq!(path, vec![PathStep::Child(0), PathStep::Sheet, PathStep::Rule(0)]);

    let rule = resolve(&path, &root).unwrap().as_rule().unwrap().clone();
    let next = replace_nested_child(&root, &path, rule.set_selector_text(".z").unwrap()).unwrap();

    let old_sheet = child(&root, 0).as_element().unwrap().sheet.clone().unwrap();
    let new_sheet = child(&next, 0).as_element().unwrap().sheet.clone().unwrap();
    assert!(Arc::ptr_eq(&old_sheet.rules().unwrap()[1], &new_sheet.rules().unwrap()[1]));
    assert_eq!(new_sheet.rules().unwrap()[0].id(), "rule-a");

    assert!(Arc::ptr_eq(child(&root, 1), child(&next, 1)));
    assert!(Arc::ptr_eq(child(&root, 2), child(&next, 2)));
}

#[test]
fn test_insert_then_remove_restores_children() {
    let root = fixture();
    let list = child(&root, 2).as_element().unwrap().clone();

    for index in 0..=list.child_nodes.len() {
        let tmp = TextNode::new("tmp", "x").into_ref();
        let inserted = insert_child_node(&list, tmp, Some(index)).unwrap();
        let restored = remove_child_node_at(&inserted, index).unwrap();

        assert_eq!(restored.child_nodes.len(), list.child_nodes.len());
        for (a, b) in restored.child_nodes.iter().zip(&list.child_nodes) {
            assert!(Arc::ptr_eq(a, b));
        }
    }
}

#[test]
fn test_move_to_same_index_is_noop() {
    let root = fixture();
    let list = child(&root, 2).as_element().unwrap().clone();

    for index in 0..list.child_nodes.len() {
        let moved = move_child_node(&list, index, index).unwrap();
        for (a, b) in moved.child_nodes.iter().zip(&list.child_nodes) {
            assert!(Arc::ptr_eq(a, b));
        }
    }
}

#[test]
fn test_old_tree_remains_queryable() {
    let root = fixture();
    let next = edit_at(&root, "list", |list| list.remove_child_at(0).unwrap());

    assert!(flatten(&root).contains("li-1"));
    assert!(!flatten(&next).contains("li-1"));
    assert_eq!(path_to("li-2", &root), Some(vec![PathStep::Child(2), PathStep::Child(1)]));
    assert_eq!(path_to("li-2", &next), Some(vec![PathStep::Child(2), PathStep::Child(0)]));
}
