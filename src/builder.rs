// src/builder.rs
use crate::error::GeneratorError;
use crate::generator::ContextGenerator;
use ldtemplate_core::{Indent, RelationNames, deep_extend};
use ldtemplate_json_template::JsonParser;
use ldtemplate_jpath::FunctionRegistry;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// A builder for creating a `ContextGenerator`.
///
/// The template document is compiled in [`build`](Self::build), so the
/// order of the `with_*` calls does not matter.
#[derive(Default)]
pub struct ContextBuilder {
    template_source: Option<String>,
    functions: Option<FunctionRegistry>,
    schema: Option<Value>,
    relations: Option<RelationNames>,
    indent: Indent,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the built-in expression functions.
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Loads a template document from a file.
    pub fn with_template_file<P: AsRef<Path>>(self, path: P) -> Result<Self, GeneratorError> {
        let path_ref = path.as_ref();
        let source = read(path_ref, "template")?;
        log::debug!("loading template from '{}'", path_ref.display());
        self.with_template_source(&source)
    }

    /// Sets the template document source.
    pub fn with_template_source(mut self, source: &str) -> Result<Self, GeneratorError> {
        self.template_source = Some(source.to_string());
        Ok(self)
    }

    /// Reads a static schema document merged over every generated result.
    pub fn with_schema_file<P: AsRef<Path>>(self, path: P) -> Result<Self, GeneratorError> {
        let source = read(path.as_ref(), "schema")?;
        let schema: Value = serde_json::from_str(&source)?;
        self.with_schema(schema)
    }

    /// Adds a static schema. Repeated calls merge, later schemas winning;
    /// schemas whose shapes do not merge are an error.
    pub fn with_schema(mut self, schema: Value) -> Result<Self, GeneratorError> {
        self.schema = Some(match self.schema.take() {
            Some(existing) => deep_extend(existing, &schema)?,
            None => schema,
        });
        Ok(self)
    }

    /// Overrides the relation names declared by the template document.
    pub fn with_relations(mut self, relations: RelationNames) -> Self {
        self.relations = Some(relations);
        self
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn build(self) -> Result<ContextGenerator, GeneratorError> {
        let source = self
            .template_source
            .ok_or_else(|| GeneratorError::Config("No template provided".to_string()))?;
        let parser = match self.functions {
            Some(functions) => JsonParser::with_functions(functions),
            None => JsonParser::new(),
        };
        let mut template = parser.parse(&source)?;
        if let Some(relations) = self.relations {
            template = template.with_relations(relations)?;
        }
        Ok(ContextGenerator::new(template, self.schema, self.indent))
    }
}

fn read(path: &Path, what: &str) -> Result<String, GeneratorError> {
    fs::read_to_string(path).map_err(|e| {
        GeneratorError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read {} from '{}': {}", what, path.display(), e),
        ))
    })
}
