//! Template trees: JSON-shaped values whose mapping entries may be functions.

use crate::error::{FunctionError, TemplateError};
use crate::tree::NodeRef;
use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

type Callable = dyn Fn(&NodeRef<'_>) -> Result<Value, FunctionError> + Send + Sync;

/// A template function. It receives the enriched data node it is evaluated
/// against and returns the value to store under its template key.
#[derive(Clone)]
pub struct TemplateFn(Arc<Callable>);

impl TemplateFn {
    /// Wraps an infallible function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&NodeRef<'_>) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(move |this: &NodeRef<'_>| Ok::<_, FunctionError>(f(this))))
    }

    /// Wraps a function that can fail.
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&NodeRef<'_>) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A function that ignores its context and always yields `value`.
    pub fn constant(value: Value) -> Self {
        Self::new(move |_| value.clone())
    }

    pub fn call(&self, this: &NodeRef<'_>) -> Result<Value, FunctionError> {
        (self.0)(this)
    }
}

impl fmt::Debug for TemplateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TemplateFn(..)")
    }
}

/// A node of a template tree.
///
/// Mirrors the JSON value kinds, plus `Function` for positions that are
/// computed from the data. Functions are only legal as mapping entries, and
/// templates may only branch through mappings.
#[derive(Debug, Clone, Default)]
pub enum TemplateNode {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<TemplateNode>),
    Mapping(IndexMap<String, TemplateNode>),
    Function(TemplateFn),
}

impl TemplateNode {
    /// An empty mapping, to be filled with [`TemplateNode::with`].
    pub fn mapping() -> Self {
        TemplateNode::Mapping(IndexMap::new())
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&NodeRef<'_>) -> Value + Send + Sync + 'static,
    {
        TemplateNode::Function(TemplateFn::new(f))
    }

    pub fn try_function<F>(f: F) -> Self
    where
        F: Fn(&NodeRef<'_>) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        TemplateNode::Function(TemplateFn::fallible(f))
    }

    /// Adds (or replaces) an entry. Turns a non-mapping node into a mapping.
    pub fn with(mut self, key: impl Into<String>, node: impl Into<TemplateNode>) -> Self {
        if !matches!(self, TemplateNode::Mapping(_)) {
            self = TemplateNode::mapping();
        }
        if let TemplateNode::Mapping(entries) = &mut self {
            entries.insert(key.into(), node.into());
        }
        self
    }

    pub fn is_function(&self) -> bool {
        matches!(self, TemplateNode::Function(_))
    }

    /// Returns the literal JSON value of a scalar node.
    pub fn as_literal(&self) -> Option<Value> {
        match self {
            TemplateNode::Null => Some(Value::Null),
            TemplateNode::Bool(b) => Some(Value::Bool(*b)),
            TemplateNode::Number(n) => Some(Value::Number(n.clone())),
            TemplateNode::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    /// Checks the shape rules once, ahead of any evaluation: the root is not
    /// a function, and no sequence appears anywhere in the tree.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.is_function() {
            return Err(TemplateError::InvalidTemplate(
                "a function cannot be the template root".to_string(),
            ));
        }
        let mut path = Vec::new();
        validate_branch(self, &mut path)
    }
}

fn validate_branch<'a>(node: &'a TemplateNode, path: &mut Vec<&'a str>) -> Result<(), TemplateError> {
    match node {
        TemplateNode::Sequence(_) => Err(TemplateError::InvalidTemplate(format!(
            "templates should not contain sequences (found at '{}')",
            path.iter().join(".")
        ))),
        TemplateNode::Mapping(entries) => {
            for (key, child) in entries {
                path.push(key);
                validate_branch(child, path)?;
                path.pop();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

impl From<Value> for TemplateNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TemplateNode::Null,
            Value::Bool(b) => TemplateNode::Bool(b),
            Value::Number(n) => TemplateNode::Number(n),
            Value::String(s) => TemplateNode::String(s),
            Value::Array(items) => TemplateNode::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                TemplateNode::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<TemplateFn> for TemplateNode {
    fn from(f: TemplateFn) -> Self {
        TemplateNode::Function(f)
    }
}

impl From<&str> for TemplateNode {
    fn from(s: &str) -> Self {
        TemplateNode::String(s.to_string())
    }
}

impl From<String> for TemplateNode {
    fn from(s: String) -> Self {
        TemplateNode::String(s)
    }
}

impl<K: Into<String>> FromIterator<(K, TemplateNode)> for TemplateNode {
    fn from_iter<I: IntoIterator<Item = (K, TemplateNode)>>(iter: I) -> Self {
        TemplateNode::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
