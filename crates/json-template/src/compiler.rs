//! Implements the "Compilation" phase for JSON templates.
//! It turns a parsed JSON template into a `TemplateNode` tree whose
//! expression strings have become template functions.

use crate::error::JsonTemplateError;
use crate::scope::NodeScope;
use itertools::Itertools;
use ldtemplate_core::{FunctionError, NodeRef, TemplateFn, TemplateNode};
use ldtemplate_jpath::{self as jpath, EvaluationContext, Expression, FunctionRegistry};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionPart {
    Static(String),
    /// A compiled JPath expression.
    Dynamic(Expression),
}

/// A pre-compiled string that is either static or a series of parts.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledString {
    Static(String),
    Dynamic(Vec<ExpressionPart>),
}

/// Parses a template string like "urn:{{ $parent.name }}/{{ name }}" into parts.
pub fn parse_expression_string(text: &str) -> Result<CompiledString, JsonTemplateError> {
    if !text.contains("{{") {
        return Ok(CompiledString::Static(text.to_string()));
    }

    let mut parts = Vec::new();
    let mut last_end = 0;
    while let Some(offset) = text[last_end..].find("{{") {
        let start = last_end + offset;
        if start > last_end {
            parts.push(ExpressionPart::Static(text[last_end..start].to_string()));
        }
        let end = text[start..]
            .find("}}")
            .ok_or_else(|| JsonTemplateError::Compilation(format!("Unclosed {{{{ expression in '{}'", text)))?;
        let inner = &text[start + 2..start + end];
        parts.push(ExpressionPart::Dynamic(jpath::parse_expression(inner)?));
        last_end = start + end + 2;
    }
    if last_end < text.len() {
        parts.push(ExpressionPart::Static(text[last_end..].to_string()));
    }

    Ok(CompiledString::Dynamic(parts))
}

/// Renders compiled parts against a data node. A lone expression yields its
/// raw JSON value; anything else is concatenated into a string.
pub fn render_parts(
    parts: &[ExpressionPart],
    this: &NodeRef<'_>,
    functions: &FunctionRegistry,
) -> Result<Value, JsonTemplateError> {
    let scope = NodeScope(this);
    let e_ctx = EvaluationContext { scope: &scope, functions };
    if let [ExpressionPart::Dynamic(expr)] = parts {
        return Ok(jpath::evaluate(expr, &e_ctx)?);
    }
    let mut out = String::new();
    for part in parts {
        match part {
            ExpressionPart::Static(text) => out.push_str(text),
            ExpressionPart::Dynamic(expr) => out.push_str(&jpath::evaluate_as_string(expr, &e_ctx)?),
        }
    }
    Ok(Value::String(out))
}

/// Turns a JSON template into a `TemplateNode` tree.
pub struct Compiler {
    functions: Arc<FunctionRegistry>,
}

impl Compiler {
    pub fn new(functions: Arc<FunctionRegistry>) -> Self {
        Self { functions }
    }

    pub fn compile(&self, template: &Value) -> Result<TemplateNode, JsonTemplateError> {
        let mut path = Vec::new();
        self.compile_node(template, &mut path)
    }

    fn compile_node<'v>(&self, node: &'v Value, path: &mut Vec<&'v str>) -> Result<TemplateNode, JsonTemplateError> {
        match node {
            Value::Object(entries) => {
                let mut mapping = TemplateNode::mapping();
                for (key, child) in entries {
                    path.push(key);
                    mapping = mapping.with(key.as_str(), self.compile_node(child, path)?);
                    path.pop();
                }
                Ok(mapping)
            }
            Value::Array(_) if contains_expression(node) => Err(JsonTemplateError::Compilation(format!(
                "arrays cannot contain expressions (at '{}')",
                path.iter().join(".")
            ))),
            // Templates cannot branch through arrays; a static one is emitted as a whole.
            Value::Array(_) => Ok(TemplateFn::constant(node.clone()).into()),
            Value::String(text) => match parse_expression_string(text)? {
                CompiledString::Static(text) => Ok(TemplateNode::String(text)),
                CompiledString::Dynamic(parts) => Ok(self.expression_function(parts, path.last().copied())),
            },
            scalar => Ok(TemplateNode::from(scalar.clone())),
        }
    }

    fn expression_function(&self, parts: Vec<ExpressionPart>, key: Option<&str>) -> TemplateNode {
        let functions = Arc::clone(&self.functions);
        log::trace!("compiled expression function for '{}'", key.unwrap_or("<root>"));
        TemplateNode::try_function(move |this| {
            render_parts(&parts, this, &functions).map_err(|e| Box::new(e) as FunctionError)
        })
    }
}

fn contains_expression(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains("{{"),
        Value::Array(items) => items.iter().any(contains_expression),
        Value::Object(entries) => entries.values().any(contains_expression),
        _ => false,
    }
}
