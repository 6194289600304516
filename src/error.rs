//! Error types for strandpress

use thiserror::Error;

/// Result type alias for strandpress operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input rejected before any work was done
    Validation,
    /// MAC or AEAD tag mismatch
    Integrity,
    /// A node or payload the call depends on does not exist
    NotFound,
    /// The ledger reported a failure
    Collaborator,
    /// Local IO, serialization or configuration trouble
    Io,
}

/// Errors that can occur in strandpress operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input text is empty")]
    EmptyInput,

    #[error("{shape} payload too large: {actual} bytes (maximum {max})")]
    PayloadTooLarge {
        shape: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Invalid ledger file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput
            | Error::PayloadTooLarge { .. }
            | Error::InvalidPayload(_)
            | Error::InvalidKey(_)
            | Error::InvalidHash(_)
            | Error::InvalidCiphertext(_) => ErrorKind::Validation,
            Error::Integrity(_) => ErrorKind::Integrity,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Ledger(_)
            | Error::Corruption(_)
            | Error::InvalidFile(_)
            | Error::VersionMismatch { .. } => ErrorKind::Collaborator,
            Error::Io(_) | Error::Serialization(_) | Error::Json(_) | Error::Config(_) => {
                ErrorKind::Io
            }
        }
    }
}
