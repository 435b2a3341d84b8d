//! Generates JSON-LD documents from plain JSON data.
//!
//! ```no_run
//! use ldtemplate::ContextBuilder;
//! use serde_json::json;
//!
//! let generator = ContextBuilder::new()
//!     .with_template_source(r#"{ "@id": "urn:person:{{ name }}" }"#)?
//!     .build()?;
//! let document = generator.generate(&json!({ "name": "ada" }))?;
//! # Ok::<(), ldtemplate::GeneratorError>(())
//! ```

pub mod builder;
pub mod error;
pub mod generator;

pub use builder::ContextBuilder;
pub use error::GeneratorError;
pub use generator::ContextGenerator;

pub use ldtemplate_core::{
    CompiledTemplate, EnrichedTree, Indent, NodeRef, RelationNames, TemplateError, TemplateFn, TemplateNode,
    censor, censor_key, compile, deep_extend, enrich_with_parents, eval_functions, stringify_cyclic, stringify_value,
};
pub use ldtemplate_json_template::{CompiledJsonTemplate, JsonParser, JsonTemplateError};
pub use ldtemplate_jpath::FunctionRegistry;
