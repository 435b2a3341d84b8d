use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JPathError {
    #[error("JPath parse error in '{0}': {1}")]
    JPathParse(String, String),

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },
}
