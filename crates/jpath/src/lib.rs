//! A simple, JSON-native path and expression engine.
//!
//! Expressions select data from a [`Scope`] and transform it with
//! registered functions. The JSON template compiler uses them to express
//! template functions declaratively, e.g. `concat('urn:', $parent.name)`.

pub mod ast;
pub mod engine;
pub mod error;
pub mod functions;
mod parser;

// --- Public API ---
pub use ast::{Expression, Path, Step};
pub use engine::{EvaluationContext, Scope, evaluate, evaluate_as_bool, evaluate_as_string, select};
pub use error::JPathError;
pub use functions::{FunctionRegistry, JPathFunction};
pub use parser::parse_expression;
