// src/generator.rs
use crate::error::GeneratorError;
use ldtemplate_core::{Indent, RelationNames, censor_value, deep_extend};
use ldtemplate_json_template::CompiledJsonTemplate;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Turns plain JSON data into a JSON-LD document.
///
/// Built by [`ContextBuilder`](crate::ContextBuilder). A generator holds no
/// per-call state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct ContextGenerator {
    template: CompiledJsonTemplate,
    schema: Option<Value>,
    indent: Indent,
}

impl ContextGenerator {
    pub(crate) fn new(template: CompiledJsonTemplate, schema: Option<Value>, indent: Indent) -> Self {
        Self { template, schema, indent }
    }

    /// Applies the template, then overlays the document's `_schema` and any
    /// schema given to the builder, in that order.
    pub fn generate(&self, data: &Value) -> Result<Value, GeneratorError> {
        let result = self.template.execute(data)?;
        match &self.schema {
            Some(schema) => Ok(deep_extend(result, &censor_value(schema))?),
            None => Ok(result),
        }
    }

    /// [`generate`](Self::generate), serialized with the configured indent.
    pub fn generate_string(&self, data: &Value) -> Result<String, GeneratorError> {
        let document = self.generate(data)?;
        Ok(ldtemplate_core::stringify_value(
            &document,
            Some(&ldtemplate_core::censor_key),
            &self.indent,
        )?)
    }

    pub fn generate_from_str(&self, data_source: &str) -> Result<String, GeneratorError> {
        let data: Value = serde_json::from_str(data_source)?;
        self.generate_string(&data)
    }

    pub fn generate_from_reader<R: Read>(&self, reader: R) -> Result<String, GeneratorError> {
        let data: Value = serde_json::from_reader(reader)?;
        self.generate_string(&data)
    }

    /// Reads `input`, generates, and writes the document to `output`.
    pub fn generate_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<(), GeneratorError> {
        let source = fs::read_to_string(input.as_ref())?;
        let document = self.generate_from_str(&source)?;
        fs::write(output.as_ref(), document)?;
        log::info!("wrote {}", output.as_ref().display());
        Ok(())
    }

    pub fn relations(&self) -> &RelationNames {
        self.template.relations()
    }

    pub fn indent(&self) -> &Indent {
        &self.indent
    }
}
