use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object '{id}' not found")]
    NotFound { id: String },

    #[error("Write error: {0}")]
    Write(String),

    #[error("Identifier generation failed: {0}")]
    IdGeneration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound { id: id.into() }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
