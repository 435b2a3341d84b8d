//! JSON template documents with `{{ ... }}` expressions.
//!
//! A document's `_template` tree is compiled into a core template: every
//! string holding an expression becomes a function evaluated with the
//! enriched data node as context, so `{{ $parent.name }}` and
//! `{{ $index }}` read the node's relations.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod processor;
pub mod scope;

pub use ast::{JsonTemplateFile, RelationsConfig};
pub use compiler::{CompiledString, Compiler, ExpressionPart, parse_expression_string};
pub use error::JsonTemplateError;
pub use processor::{CompiledJsonTemplate, JsonParser};
pub use scope::NodeScope;
