use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Solana RPC error: {0}")]
    SolanaRpc(String),

    #[error("Invalid wallet address: {0}")]
    InvalidWalletAddress(String),

    #[error("Malformed token account record at index {index}: expected at least {expected} bytes, got {actual}")]
    MalformedRecord {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
