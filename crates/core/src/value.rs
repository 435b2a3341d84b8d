//! A closed view over the value kinds the engine walks.
//!
//! Plain data (`serde_json::Value`) and templates (`TemplateNode`) are both
//! walked by enrichment and deep-merge. Instead of probing shapes at runtime,
//! both expose their shape through [`TreeValue::kind`], and the passes match
//! on the returned [`NodeKind`].

use crate::template::{TemplateFn, TemplateNode};
use serde_json::Value;

/// The shape of a single tree position.
pub enum NodeKind<'a, T> {
    /// Null, boolean, number or string, as an owned JSON value.
    Scalar(Value),
    /// An ordered sequence of child positions.
    Sequence(&'a [T]),
    /// Key/child pairs in insertion order.
    Mapping(Vec<(&'a str, &'a T)>),
    /// A callable. Only templates can produce this kind.
    Function(&'a TemplateFn),
}

impl<T> NodeKind<'_, T> {
    /// A short human-readable name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Scalar(v) => kind_name(v),
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Function(_) => "function",
        }
    }
}

/// Anything that can be walked as a tree of [`NodeKind`]s.
pub trait TreeValue: Sized {
    fn kind(&self) -> NodeKind<'_, Self>;
}

impl TreeValue for Value {
    fn kind(&self) -> NodeKind<'_, Self> {
        match self {
            Value::Array(items) => NodeKind::Sequence(items),
            Value::Object(map) => NodeKind::Mapping(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            scalar => NodeKind::Scalar(scalar.clone()),
        }
    }
}

impl TreeValue for TemplateNode {
    fn kind(&self) -> NodeKind<'_, Self> {
        match self {
            TemplateNode::Null => NodeKind::Scalar(Value::Null),
            TemplateNode::Bool(b) => NodeKind::Scalar(Value::Bool(*b)),
            TemplateNode::Number(n) => NodeKind::Scalar(Value::Number(n.clone())),
            TemplateNode::String(s) => NodeKind::Scalar(Value::String(s.clone())),
            TemplateNode::Sequence(items) => NodeKind::Sequence(items),
            TemplateNode::Mapping(entries) => {
                NodeKind::Mapping(entries.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
            TemplateNode::Function(f) => NodeKind::Function(f),
        }
    }
}

/// Names a JSON value's kind the way error messages refer to it.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
