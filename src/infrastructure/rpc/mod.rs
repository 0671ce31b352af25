pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::CkbRpcClient;
pub use error::RpcClientError;
