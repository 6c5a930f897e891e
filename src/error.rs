use std::sync::PoisonError;

use thiserror::Error;

use crate::status::Status;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("ValueError: {0}")]
    Value(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("MemoryError: {0}")]
    Memory(String),
    #[error("HyperClientException: {status} (code {})", .status.code())]
    HyperClient { status: Status },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl ClientError {
    /// The raw status carried by a `HyperClientException`, if any.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::HyperClient { status } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

// Helper conversions
impl From<config::ConfigError> for ClientError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl<T> From<PoisonError<T>> for ClientError {
    fn from(e: PoisonError<T>) -> Self { Self::Lock(e.to_string()) }
}
