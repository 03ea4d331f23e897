//! End-to-end edit scenarios through the public API

use slim_dom::{
    checksum, collect_source_uris, evaluate_block, get_ancestors, get_parent, insert_child_node,
    path_to, resolve, set_css_selector_text, set_element_attribute, stringify_node, stringify_rule,
    BlockNode, CssRule, Element, IdGenerator, JsonContextEvaluator, Node, NodeExt, PathStep, Source,
    StyleDeclaration, StyleRule, StyleSheet, TextNode,
};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_insert_text_after_span() {
    let div = Element::new("a", "div").with_child(Element::new("b", "span").into_ref());
    let before = div.clone().into_ref();

    let after = Arc::new(Node::Element(
        insert_child_node(&div, TextNode::new("c", "hi").into_ref(), Some(1)).unwrap(),
    ));

    assert_eq!(&*stringify_node(&after, false), "<div><span></span>hi</div>");
    assert_ne!(checksum(&before), checksum(&after));
    assert_eq!(path_to("c", &after), Some(vec![PathStep::Child(1)]));
    assert_eq!(after.id(), "a");
}

#[test]
fn test_selector_edit_renders_and_keeps_id() {
    let rule = StyleRule::new("r", ".a", StyleDeclaration::new("d").with_property("color", "red"));
    let sheet = StyleSheet::new("s").with_rule(rule.clone().into_ref());
    let style = Element::new("style", "style").with_sheet(sheet.clone().into_ref()).into_ref();

    let edited_rule = set_css_selector_text(&rule, ".b");
    assert_eq!(edited_rule.id, "r");

    let path = path_to("r", &style).unwrap();
    let edited =
        slim_dom::replace_nested_child(&style, &path, CssRule::StyleRule(edited_rule)).unwrap();

    let new_sheet = edited.as_element().unwrap().sheet.clone().unwrap();
    assert_eq!(&*stringify_rule(&new_sheet), ".b { color: red; }");
    assert_eq!(new_sheet.rules().unwrap()[0].id(), "r");
    assert!(stringify_node(&edited, false).contains(".b { color: red; }"));
}

#[test]
fn test_empty_class_removes_attribute() {
    let el = Element::new("e", "div")
        .with_attribute("id", "main")
        .with_attribute("class", "x");

    let edited = set_element_attribute(&el, "class", Some(""), None).unwrap();

    assert_eq!(edited.attributes.len(), 1);
    assert!(edited.attributes.iter().all(|a| a.name != "class"));
    assert_eq!(&*stringify_node(&edited.into_ref(), false), r#"<div id="main"></div>"#);
}

#[test]
fn test_content_identical_trees_match() {
    let a = Element::new("one", "p").with_attribute("class", "x").into_ref();
    let b = Element::new("two", "p").with_attribute("class", "x").into_ref();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(stringify_node(&a, true), stringify_node(&b, true));
    assert_eq!(checksum(&a), checksum(&b));
}

#[test]
fn test_shadow_and_sheet_addressing() {
    let root = Element::new("host", "x-app")
        .with_shadow(
            slim_dom::DocumentFragment::new("shadow")
                .with_child(
                    Element::new("style", "style")
                        .with_sheet(
                            StyleSheet::new("sheet")
                                .with_rule(
                                    StyleRule::new("rule", ".a", StyleDeclaration::new("decl"))
                                        .into_ref(),
                                )
                                .into_ref(),
                        )
                        .into_ref(),
                )
                .into_ref(),
        )
        .into_ref();

    let path = path_to("rule", &root).unwrap();
    assert_eq!(
        path,
        vec![PathStep::Shadow, PathStep::Child(0), PathStep::Sheet, PathStep::Rule(0)]
    );
    assert_eq!(resolve(&path, &root).unwrap().id(), "rule");
    assert_eq!(get_parent("rule", &root).unwrap().id(), "sheet");

    let ancestors: Vec<String> = get_ancestors("decl", &root)
        .unwrap()
        .iter()
        .map(|o| o.id().to_string())
        .collect();
    assert_eq!(ancestors, vec!["rule", "sheet", "style", "shadow", "host"]);
}

#[test]
fn test_block_fallback_keeps_tree_renderable() {
    init_tracing();
    let block = BlockNode::new("blk", "user.missing")
        .with_source(Source::new("file:///page.pc").at(4, 2));
    let mut ids = IdGenerator::new("/page.pc");
    let rendered = evaluate_block(&block, &JsonContextEvaluator, &serde_json::json!({}), &mut ids);

    let page = Element::new("page", "main").into_ref().insert_child(rendered, None).unwrap();

    assert_eq!(&*stringify_node(&page, false), "<main>${user.missing}</main>");
    assert_eq!(collect_source_uris(&page), vec!["file:///page.pc"]);
}
