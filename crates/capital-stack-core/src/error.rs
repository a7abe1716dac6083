use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapitalStackError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for CapitalStackError {
    fn from(e: serde_json::Error) -> Self {
        CapitalStackError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for CapitalStackError {
    fn from(e: std::io::Error) -> Self {
        CapitalStackError::Storage(e.to_string())
    }
}
