//! Transport seam for the JSON-RPC client.
//!
//! The client talks to a `JsonRpcTransport` trait object so tests can inject
//! a scripted transport instead of a live node.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::infrastructure::rpc::error::RpcClientError;

/// One JSON-RPC round trip: takes the request envelope, returns the raw
/// response envelope. Transport failures are `Transient`, malformed bodies
/// are `Parse`.
#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    async fn send(&self, body: &Value) -> Result<Value, RpcClientError>;
}

/// HTTP POST transport over reqwest
#[derive(Debug)]
pub struct HttpTransport {
    endpoint: String,
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a fixed per-call timeout
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, RpcClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcClientError::Transient(e.to_string()))?;

        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl JsonRpcTransport for HttpTransport {
    async fn send(&self, body: &Value) -> Result<Value, RpcClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| RpcClientError::Transient(e.to_string()))?;

        let response_text = response
            .text()
            .await
            .map_err(|e| RpcClientError::Transient(e.to_string()))?;

        serde_json::from_str(&response_text).map_err(|e| RpcClientError::Parse(e.to_string()))
    }
}
