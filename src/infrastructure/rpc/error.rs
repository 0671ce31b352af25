use std::error::Error;
use std::fmt;

/// Error type for RPC client operations
#[derive(Debug)]
pub enum RpcClientError {
    /// Transport-level failure; retried by the client up to the attempt budget
    Transient(String),
    /// The node returned a JSON-RPC error object; never retried
    Application(String),
    /// The attempt budget was spent without a usable response
    Exhausted { method: String, attempts: u32 },
    /// The response did not have the expected shape
    Parse(String),
}

impl fmt::Display for RpcClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcClientError::Transient(msg) => write!(f, "Transient network error: {}", msg),
            RpcClientError::Application(msg) => write!(f, "RPC application error: {}", msg),
            RpcClientError::Exhausted { method, attempts } => {
                write!(f, "RPC call {} exhausted {} attempts", method, attempts)
            }
            RpcClientError::Parse(msg) => write!(f, "RPC response parse error: {}", msg),
        }
    }
}

impl Error for RpcClientError {}
