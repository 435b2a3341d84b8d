//! Structural deep merge.

use crate::error::TemplateError;
use crate::value::{NodeKind, TreeValue, kind_name};
use serde_json::{Map, Value};

/// Merges `src` into `dest` and returns the result.
///
/// - sequences merge element by element; destination elements past the end
///   of `src` are kept, extra source elements are appended;
/// - mappings merge key by key; the result holds the union of both key sets;
/// - a scalar source replaces whatever the destination held.
///
/// `Value::Null` in the destination counts as absent.
pub fn deep_extend<S: TreeValue>(dest: Value, src: &S) -> Result<Value, TemplateError> {
    match src.kind() {
        NodeKind::Function(_) => Err(TemplateError::UnsupportedValue(
            "functions cannot be merged into data".to_string(),
        )),
        NodeKind::Sequence(items) => {
            let mut result = match dest {
                Value::Null => Vec::with_capacity(items.len()),
                Value::Array(existing) => existing,
                other => {
                    return Err(TemplateError::TypeMismatch {
                        dest: kind_name(&other).to_string(),
                        src: "sequence".to_string(),
                    });
                }
            };
            for (i, item) in items.iter().enumerate() {
                match result.get_mut(i) {
                    Some(slot) => {
                        let existing = std::mem::take(slot);
                        *slot = deep_extend(existing, item)?;
                    }
                    None => result.push(deep_extend(Value::Null, item)?),
                }
            }
            Ok(Value::Array(result))
        }
        NodeKind::Mapping(entries) => {
            let mut result = match dest {
                Value::Array(_) => return Err(TemplateError::ObjectArrayMismatch),
                Value::Object(existing) => existing,
                _ => Map::new(),
            };
            for (key, value) in entries {
                let existing = result.get_mut(key).map(std::mem::take).unwrap_or(Value::Null);
                let merged = deep_extend(existing, value)?;
                result.insert(key.to_string(), merged);
            }
            Ok(Value::Object(result))
        }
        NodeKind::Scalar(value) => Ok(value),
    }
}
