//! # Block Evaluation
//!
//! A block is an embedded expression (`${expression}` in source) whose value
//! becomes part of the tree. Expressions are never compiled or executed here:
//! an [`ExpressionEvaluator`] supplied by the host computes the value, and
//! [`evaluate_block`] turns it into a node.
//!
//! Evaluation never fails from the caller's point of view. When the
//! evaluator reports an error, the block renders as its own source text so
//! the document stays displayable.

use crate::id_generator::IdGenerator;
use crate::node::{NodeRef, Source, TextNode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub id: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl BlockNode {
    pub fn new(id: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expression: expression.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Text shown in place of the block when evaluation fails
    pub fn fallback_text(&self) -> String {
        format!("${{{}}}", self.expression)
    }
}

/// Value produced by evaluating a block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockValue {
    Node(NodeRef),
    Text(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl BlockValue {
    /// Display text for non-node values
    pub fn to_text(&self) -> Option<String> {
        match self {
            BlockValue::Node(_) => None,
            BlockValue::Text(text) => Some(text.clone()),
            BlockValue::Number(number) => Some(number.to_string()),
            BlockValue::Boolean(value) => Some(value.to_string()),
            BlockValue::Null => Some("null".to_string()),
        }
    }
}

impl From<&serde_json::Value> for BlockValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => BlockValue::Null,
            serde_json::Value::Bool(b) => BlockValue::Boolean(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(BlockValue::Null, BlockValue::Number),
            serde_json::Value::String(s) => BlockValue::Text(s.clone()),
            other => BlockValue::Text(other.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Reference '{name}' is not defined")]
    UndefinedReference { name: String },

    #[error("Evaluation of '{expression}' failed: {message}")]
    Failed { expression: String, message: String },
}

/// Computes the value of a block expression against a host context
pub trait ExpressionEvaluator<C: ?Sized> {
    fn evaluate(&self, expression: &str, context: &C) -> Result<BlockValue, EvalError>;
}

impl<C, F> ExpressionEvaluator<C> for F
where
    C: ?Sized,
    F: Fn(&str, &C) -> Result<BlockValue, EvalError>,
{
    fn evaluate(&self, expression: &str, context: &C) -> Result<BlockValue, EvalError> {
        self(expression, context)
    }
}

/// Resolves dotted references (`user.name`, `items.0`) in a JSON context
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonContextEvaluator;

impl ExpressionEvaluator<serde_json::Value> for JsonContextEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        context: &serde_json::Value,
    ) -> Result<BlockValue, EvalError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(EvalError::Failed {
                expression: expression.to_string(),
                message: "empty expression".to_string(),
            });
        }

        let mut current = context;
        for segment in expression.split('.') {
            if !is_reference_segment(segment) {
                return Err(EvalError::Failed {
                    expression: expression.to_string(),
                    message: format!("unsupported syntax near '{}'", segment),
                });
            }

            let next = match current {
                serde_json::Value::Object(map) => map.get(segment),
                serde_json::Value::Array(items) => {
                    segment.parse::<usize>().ok().and_then(|i| items.get(i))
                }
                _ => None,
            };
            current = next.ok_or_else(|| EvalError::UndefinedReference {
                name: segment.to_string(),
            })?;
        }

        Ok(BlockValue::from(current))
    }
}

fn is_reference_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Evaluates `block` and returns the node it renders as.
///
/// Node values are returned as-is; every other value becomes a text node.
/// On failure the result is a text node holding `${expression}` with the
/// block's source attached.
pub fn evaluate_block<C, E>(
    block: &BlockNode,
    evaluator: &E,
    context: &C,
    ids: &mut IdGenerator,
) -> NodeRef
where
    C: ?Sized,
    E: ExpressionEvaluator<C> + ?Sized,
{
    let value = match evaluator.evaluate(&block.expression, context) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                block = %block.id,
                expression = %block.expression,
                error = %err,
                "Block evaluation failed"
            );
            return text_node(ids.next_id(), block.fallback_text(), block.source.clone());
        }
    };

    match value {
        BlockValue::Node(node) => node,
        other => text_node(
            ids.next_id(),
            other.to_text().unwrap_or_default(),
            block.source.clone(),
        ),
    }
}

fn text_node(id: String, value: String, source: Option<Source>) -> NodeRef {
    TextNode { id, value, source }.into_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;
    use serde_json::json;
    use std::sync::Arc;

    fn context() -> serde_json::Value {
        json!({
            "user": { "name": "Ada", "age": 36, "admin": true },
            "items": ["a", "b"],
            "nothing": null
        })
    }

    fn eval(expression: &str) -> NodeRef {
        let block =
            BlockNode::new("b", expression).with_source(Source::new("file:///a.pc").at(3, 7));
        evaluate_block(&block, &JsonContextEvaluator, &context(), &mut IdGenerator::from_seed("t"))
    }

    #[test]
    fn test_values_become_text() {
        assert_eq!(eval("user.name").as_text().unwrap().value, "Ada");
        assert_eq!(eval("user.age").as_text().unwrap().value, "36");
        assert_eq!(eval("user.admin").as_text().unwrap().value, "true");
        assert_eq!(eval("items.1").as_text().unwrap().value, "b");
        assert_eq!(eval("nothing").as_text().unwrap().value, "null");
    }

    #[test]
    fn test_failure_falls_back_to_source_text() {
        for expression in ["user.missing", "user.name + 1", ""] {
            let node = eval(expression);
            let text = node.as_text().unwrap();
            assert_eq!(text.value, format!("${{{}}}", expression));
            assert_eq!(text.source.as_ref().unwrap().uri, "file:///a.pc");
        }
    }

    #[test]
    fn test_undefined_reference_error() {
        let err = JsonContextEvaluator.evaluate("user.email", &context()).unwrap_err();
        assert_eq!(err, EvalError::UndefinedReference { name: "email".to_string() });
    }

    #[test]
    fn test_closure_evaluator_returning_node() {
        let span = Element::new("s", "span").into_ref();
        let expected = span.clone();
        let evaluator = move |_: &str, _: &()| Ok::<_, EvalError>(BlockValue::Node(span.clone()));

        let node = evaluate_block(
            &BlockNode::new("b", "anything"),
            &evaluator,
            &(),
            &mut IdGenerator::from_seed("t"),
        );
        assert!(Arc::ptr_eq(&node, &expected));
    }

    #[test]
    fn test_generated_ids() {
        let mut ids = IdGenerator::from_seed("doc");
        let block = BlockNode::new("b", "user.name");
        let first = evaluate_block(&block, &JsonContextEvaluator, &context(), &mut ids);
        let second = evaluate_block(&block, &JsonContextEvaluator, &context(), &mut ids);

        assert_eq!(first.id(), "doc-1");
        assert_eq!(second.id(), "doc-2");
    }
}
