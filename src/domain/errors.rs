use std::error::Error;
use std::fmt;

use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::rpc::error::RpcClientError;

/// Error type for binary/hex field decoding
#[derive(Debug)]
pub enum DecodeError {
    /// Odd-length or non-hex input
    MalformedHex(String),
    /// More than 128 significant bits
    Overflow(String),
    /// A structurally valid value outside the range a record can hold
    FieldOutOfRange(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedHex(input) => write!(f, "Malformed hex input: {}", input),
            DecodeError::Overflow(input) => write!(f, "Value does not fit in 128 bits: {}", input),
            DecodeError::FieldOutOfRange(msg) => write!(f, "Field out of range: {}", msg),
        }
    }
}

impl Error for DecodeError {}

/// Error type for crawler loop iterations
#[derive(Debug)]
pub enum CrawlerError {
    RpcClientError(RpcClientError),
    DbError(DbError),
    DecodeError(DecodeError),
    ProcessingError(String),
}

impl fmt::Display for CrawlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlerError::RpcClientError(e) => write!(f, "RPC client error: {}", e),
            CrawlerError::DbError(e) => write!(f, "Database error: {}", e),
            CrawlerError::DecodeError(e) => write!(f, "Decode error: {}", e),
            CrawlerError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl Error for CrawlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CrawlerError::RpcClientError(e) => Some(e),
            CrawlerError::DbError(e) => Some(e),
            CrawlerError::DecodeError(e) => Some(e),
            CrawlerError::ProcessingError(_) => None,
        }
    }
}

impl From<RpcClientError> for CrawlerError {
    fn from(error: RpcClientError) -> Self {
        CrawlerError::RpcClientError(error)
    }
}

impl From<DbError> for CrawlerError {
    fn from(error: DbError) -> Self {
        CrawlerError::DbError(error)
    }
}

impl From<DecodeError> for CrawlerError {
    fn from(error: DecodeError) -> Self {
        CrawlerError::DecodeError(error)
    }
}
