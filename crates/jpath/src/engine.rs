//! Evaluates parsed JPath expressions against a [`Scope`].
use super::ast::{Expression, Path, Step};
use super::error::JPathError;
use super::functions::FunctionRegistry;
use serde_json::Value;

/// The data an expression is evaluated against.
///
/// Implementors decide how keys resolve, so a scope over an enriched tree can
/// fall back to ancestors and expose relation keys such as `$parent`.
pub trait Scope {
    /// Resolves a non-empty walk relative to the scope. `None` if nothing is there.
    fn select(&self, steps: &[Step]) -> Option<Value>;

    /// The scope's own value.
    fn current(&self) -> Value;

    /// Zero-based position of the scope in its enclosing sequence, if any.
    fn position(&self) -> Option<usize> {
        None
    }
}

impl Scope for Value {
    fn select(&self, steps: &[Step]) -> Option<Value> {
        let mut current = self;
        for step in steps {
            current = match step {
                Step::Key(key) => current.get(key)?,
                Step::Index(i) => current.get(*i)?,
            };
        }
        Some(current.clone())
    }

    fn current(&self) -> Value {
        self.clone()
    }
}

/// A container for all state needed during expression evaluation.
pub struct EvaluationContext<'a> {
    pub scope: &'a dyn Scope,
    pub functions: &'a FunctionRegistry,
}

/// Evaluates a compiled expression and returns a concrete JSON value.
pub fn evaluate(expr: &Expression, e_ctx: &EvaluationContext) -> Result<Value, JPathError> {
    match expr {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Path(path) => Ok(select(path, e_ctx)),
        Expression::Call { function, args } => {
            let func = e_ctx
                .functions
                .get(function)
                .ok_or_else(|| JPathError::UnknownFunction(function.clone()))?;
            let evaluated_args = args
                .iter()
                .map(|arg| evaluate(arg, e_ctx))
                .collect::<Result<Vec<_>, _>>()?;
            func(e_ctx, evaluated_args)
        }
    }
}

/// Resolves a path. Missing paths select `null`.
pub fn select(path: &Path, e_ctx: &EvaluationContext) -> Value {
    if path.is_current() {
        return e_ctx.scope.current();
    }
    e_ctx.scope.select(&path.steps).unwrap_or(Value::Null)
}

/// Evaluates an expression and coerces the result to a string.
/// `null` becomes the empty string; containers are written as JSON.
pub fn evaluate_as_string(expr: &Expression, e_ctx: &EvaluationContext) -> Result<String, JPathError> {
    Ok(to_display_string(&evaluate(expr, e_ctx)?))
}

/// Evaluates an expression and coerces the result to a boolean.
pub fn evaluate_as_bool(expr: &Expression, e_ctx: &EvaluationContext) -> Result<bool, JPathError> {
    let value = evaluate(expr, e_ctx)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    })
}

pub(crate) fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
