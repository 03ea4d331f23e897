//! # Slim DOM
//!
//! Immutable virtual DOM and CSS object model used by the editor and the
//! preview renderer.
//!
//! Trees are built from [`Arc`](std::sync::Arc)-shared nodes. An edit never
//! modifies a tree: it returns a new root that reuses every untouched subtree
//! of the old one by reference. Queries over a tree (structural index, paths,
//! renderings, checksums) are memoized on the identity of the tree they were
//! asked about.
//!
//! - [`node`], [`css`]: data model
//! - [`index`], [`queries`]: structural index and memoized lookups
//! - [`path`]: identity-free addressing that survives edits
//! - [`mutations`], [`ext`]: edits
//! - [`serialize`]: canonical rendering and checksum
//! - [`source`]: provenance helpers
//! - [`block`]: embedded expression evaluation through an injected evaluator

pub mod block;
pub mod css;
pub mod error;
pub mod ext;
pub mod id_generator;
pub mod index;
pub mod memo;
pub mod mutations;
pub mod node;
pub mod object;
pub mod path;
pub mod queries;
pub mod serialize;
pub mod source;
pub mod traits;

#[cfg(test)]
mod tests_sharing;

pub use block::{
    evaluate_block, BlockNode, BlockValue, EvalError, ExpressionEvaluator, JsonContextEvaluator,
};
pub use css::{CssRule, MediaRule, RuleRef, StyleDeclaration, StyleRule, StyleSheet};
pub use error::{DomError, DomResult};
pub use ext::{NodeExt, RuleExt};
pub use id_generator::{get_document_id, IdGenerator};
pub use index::{FlatEntry, FlatIndex};
pub use memo::{Memo, MemoConfig, MemoStats};
pub use mutations::{
    get_attribute, get_attribute_value, has_attribute, insert_child_node, insert_css_rule,
    move_child_node, move_css_rule, push_child_node, push_css_rule, remove_child_node_at,
    remove_css_rule_at, remove_css_style_property, replace_nested_child, replace_nested_object,
    set_css_selector_text, set_css_style_property, set_element_attribute, set_text_node_value,
};
pub use node::{
    Attribute, Document, DocumentFragment, Element, Node, NodeRef, Source, SourceLocation,
    TextNode,
};
pub use object::ObjectRef;
pub use path::{resolve, resolve_object, PathStep};
pub use queries::{
    clear_memos, configure_memo, flatten, get_ancestors, get_object_by_id, get_parent, memo_stats,
    path_to, sweep_memos,
};
pub use serialize::{checksum, stringify_node, stringify_rule};
pub use source::{collect_source_uris, sync_rule_sources, sync_sources};
pub use traits::{GroupingRule, HasSource, HasStyle, Identified, ParentNode, ShadowHost};
