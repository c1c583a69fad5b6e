use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayoffError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PayoffError {
    fn from(e: serde_json::Error) -> Self {
        PayoffError::SerializationError(e.to_string())
    }
}

impl From<chrono::ParseError> for PayoffError {
    fn from(e: chrono::ParseError) -> Self {
        PayoffError::DateError(e.to_string())
    }
}
