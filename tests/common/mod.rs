pub mod fixtures;

use ldtemplate::{ContextBuilder, ContextGenerator, GeneratorError};
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Builds a generator straight from a template document value.
pub fn generator_for(document: &Value) -> Result<ContextGenerator, GeneratorError> {
    ContextBuilder::new().with_template_source(&document.to_string())?.build()
}

/// True if any mapping key anywhere in `value` starts with `$`.
pub fn has_bookkeeping_keys(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.iter().any(|(k, v)| k.starts_with('$') || has_bookkeeping_keys(v)),
        Value::Array(items) => items.iter().any(has_bookkeeping_keys),
        _ => false,
    }
}
