use thiserror::Error;

/// Error types for mediahub-data operations.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Conference '{0}' not found")]
    ConferenceNotFound(String),

    #[error("Invalid schedule transition: cannot go from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid schedule state value: {0}. Valid values: not_present, new, downloading, downloaded")]
    InvalidState(String),

    #[error("Invalid compile mode: {0}. Valid values: full, fast")]
    InvalidCompileMode(String),

    #[error("Compiler '{command}' exited with {status}: {stderr}")]
    CompileFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to spawn compiler '{command}': {source}")]
    CompileSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DataError>;
