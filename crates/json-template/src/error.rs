use ldtemplate_core::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonTemplateError {
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("JPath evaluation error: {0}")]
    JPath(#[from] ldtemplate_jpath::JPathError),

    #[error("Template evaluation error: {0}")]
    Template(#[from] TemplateError),

    #[error("Template compilation error: {0}")]
    Compilation(String),
}
