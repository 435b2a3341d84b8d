// src/error.rs
use ldtemplate_core::TemplateError;
use ldtemplate_json_template::JsonTemplateError;
use thiserror::Error;

/// Errors raised while configuring or running a context generator.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Template failed: {0}")]
    Template(#[from] JsonTemplateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generator is misconfigured: {0}")]
    Config(String),
}

impl From<serde_json::Error> for GeneratorError {
    fn from(e: serde_json::Error) -> Self {
        GeneratorError::Template(JsonTemplateError::JsonParse(e))
    }
}

impl From<TemplateError> for GeneratorError {
    fn from(e: TemplateError) -> Self {
        GeneratorError::Template(JsonTemplateError::Template(e))
    }
}
