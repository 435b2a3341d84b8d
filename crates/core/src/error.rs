//! Error types for enrichment, evaluation, merging and serialization.

use thiserror::Error;

/// Boxed error returned by a failing template function.
pub type FunctionError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure the engine can report. All of them abort the current call.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A function value was found where plain data was expected.
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// The template violates the shape rules (function at the root, sequence as a branch).
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// The parent and index relation names are empty or collide.
    #[error("Invalid relation names: {0}")]
    InvalidRelations(String),

    /// A sequence source was merged into a destination that is neither absent nor a sequence.
    #[error("Type mismatch: attempted to extend {dest} with {src}")]
    TypeMismatch { dest: String, src: String },

    /// A mapping source was merged into a sequence destination.
    #[error("Object/array mismatch: attempted to extend a sequence with a mapping")]
    ObjectArrayMismatch,

    /// A template function reported a failure.
    #[error("Template function for '{key}' failed: {message}")]
    Function { key: String, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization produced invalid output: {0}")]
    Serialization(String),
}
