//! Defines the registry and built-in implementations for JPath functions.
use super::engine::{EvaluationContext, to_display_string};
use super::error::JPathError;
use serde_json::{Value, json};
use std::collections::HashMap;

/// The signature for a custom JPath function implementation.
pub type JPathFunction = fn(e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError>;

/// A registry to hold all available functions for the evaluation engine.
pub struct FunctionRegistry {
    functions: HashMap<String, JPathFunction>,
}

impl FunctionRegistry {
    /// Creates a new, empty function registry.
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    /// Registers a new function.
    pub fn register(&mut self, name: &str, func: JPathFunction) {
        self.functions.insert(name.to_lowercase(), func);
    }

    /// Finds a function by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&JPathFunction> {
        self.functions.get(&name.to_lowercase())
    }
}

// --- Built-in Function Implementations ---

fn upper(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    Ok(args.first().and_then(|v| v.as_str()).map(|s| s.to_uppercase().into()).unwrap_or(Value::Null))
}

fn lower(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    Ok(args.first().and_then(|v| v.as_str()).map(|s| s.to_lowercase().into()).unwrap_or(Value::Null))
}

fn concat(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    Ok(args.iter().map(to_display_string).collect::<String>().into())
}

fn contains(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    let haystack = args.first().and_then(|v| v.as_str());
    let needle = args.get(1).and_then(|v| v.as_str());
    Ok(match (haystack, needle) {
        (Some(h), Some(n)) => h.contains(n).into(),
        _ => false.into(),
    })
}

fn count(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    Ok(json!(args.first().and_then(|v| v.as_array()).map(Vec::len).unwrap_or(0)))
}

fn position(e_ctx: &EvaluationContext, _args: Vec<Value>) -> Result<Value, JPathError> {
    // Position is 1-based for user-facing templates.
    Ok(e_ctx.scope.position().map(|p| json!(p.saturating_add(1))).unwrap_or(Value::Null))
}

fn equals(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    if args.len() != 2 {
        return Err(JPathError::FunctionError {
            function: "equals".to_string(),
            message: format!("expected 2 arguments, got {}", args.len()),
        });
    }
    Ok(json!(to_display_string(&args[0]) == to_display_string(&args[1])))
}

/// Percent-encodes its argument so it can be embedded in an IRI.
fn encode(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    let text = args.first().map(to_display_string).unwrap_or_default();
    Ok(urlencoding::encode(&text).into_owned().into())
}

/// Returns the first argument that is not `null`.
fn coalesce(_e_ctx: &EvaluationContext, args: Vec<Value>) -> Result<Value, JPathError> {
    Ok(args.into_iter().find(|v| !v.is_null()).unwrap_or(Value::Null))
}

impl Default for FunctionRegistry {
    /// Creates a new registry populated with all built-in functions.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("upper", upper);
        registry.register("lower", lower);
        registry.register("concat", concat);
        registry.register("contains", contains);
        registry.register("count", count);
        registry.register("position", position);
        registry.register("equals", equals);
        registry.register("encode", encode);
        registry.register("coalesce", coalesce);
        registry
    }
}
