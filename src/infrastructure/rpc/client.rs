use std::sync::Arc;

use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

use crate::config::RpcConfig;
use crate::domain::services::decoder;
use crate::infrastructure::rpc::error::RpcClientError;
use crate::infrastructure::rpc::transport::{HttpTransport, JsonRpcTransport};
use crate::infrastructure::rpc::types::{
    CellIndexEntry, IndexerPage, LiveCell, TransactionWithStatus, TxIndexEntry,
};
use crate::utils::logging;

/// CKB JSON-RPC client with a single retry policy shared by every method.
///
/// One instance is constructed at startup and shared (via `Arc`) by all
/// crawler loops; the transport session is safe for concurrent use.
pub struct CkbRpcClient {
    transport: Arc<dyn JsonRpcTransport>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl CkbRpcClient {
    /// Create a client over an HTTP transport
    pub fn new(config: &RpcConfig) -> Result<Self, RpcClientError> {
        let transport = HttpTransport::new(
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;

        Ok(Self::with_transport(
            Arc::new(transport),
            config.max_attempts,
            Duration::from_secs(config.retry_delay_secs),
        ))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(
        transport: Arc<dyn JsonRpcTransport>,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            transport,
            max_attempts,
            retry_delay,
        }
    }

    /// Perform one JSON-RPC call under the retry policy.
    ///
    /// Transient transport failures consume an attempt and back off for a
    /// fixed delay; a JSON-RPC error object from the node is surfaced
    /// immediately and never retried.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcClientError> {
        let body = json!({ "id": 42, "jsonrpc": "2.0", "method": method, "params": params });
        logging::log_debug(&format!("rpc request: {}", body));

        for attempt in 1..=self.max_attempts {
            match self.transport.send(&body).await {
                Ok(response) => {
                    if let Some(error) = response.get("error") {
                        let message = error
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown error")
                            .to_string();
                        return Err(RpcClientError::Application(message));
                    }
                    return Ok(response.get("result").cloned().unwrap_or(Value::Null));
                }
                Err(RpcClientError::Transient(msg)) => {
                    logging::log_warning(&format!(
                        "{} attempt {}/{} failed: {}",
                        method, attempt, self.max_attempts, msg
                    ));
                    // No point backing off once the budget is spent.
                    if attempt < self.max_attempts {
                        sleep(self.retry_delay).await;
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Err(RpcClientError::Exhausted {
            method: method.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Current chain tip, decoded from its hex form
    pub async fn get_tip_block_number(&self) -> Result<u64, RpcClientError> {
        let result = self.call("get_tip_block_number", json!([])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| RpcClientError::Parse("tip block number is not a string".to_string()))?;
        decoder::decode_hex_u64(hex).map_err(|e| RpcClientError::Parse(e.to_string()))
    }

    /// Fetch a committed transaction by hash
    pub async fn get_transaction(
        &self,
        tx_hash: &str,
    ) -> Result<TransactionWithStatus, RpcClientError> {
        let result = self.call("get_transaction", json!([tx_hash])).await?;
        serde_json::from_value(result).map_err(|e| RpcClientError::Parse(e.to_string()))
    }

    /// Indexer query for transactions matching a search key, ascending
    pub async fn get_transactions(
        &self,
        search_key: Value,
        limit: &str,
    ) -> Result<IndexerPage<TxIndexEntry>, RpcClientError> {
        let result = self
            .call("get_transactions", json!([search_key, "asc", limit, Value::Null]))
            .await?;
        serde_json::from_value(result).map_err(|e| RpcClientError::Parse(e.to_string()))
    }

    /// Indexer query for live cells matching a search key, ascending
    pub async fn get_cells(
        &self,
        search_key: Value,
        limit: &str,
    ) -> Result<IndexerPage<CellIndexEntry>, RpcClientError> {
        let result = self
            .call("get_cells", json!([search_key, "asc", limit, Value::Null]))
            .await?;
        serde_json::from_value(result).map_err(|e| RpcClientError::Parse(e.to_string()))
    }

    /// Liveness of one transaction output, with its data
    pub async fn get_live_cell(
        &self,
        index: &str,
        tx_hash: &str,
    ) -> Result<LiveCell, RpcClientError> {
        let result = self
            .call(
                "get_live_cell",
                json!([{ "index": index, "tx_hash": tx_hash }, true]),
            )
            .await?;
        serde_json::from_value(result).map_err(|e| RpcClientError::Parse(e.to_string()))
    }

    /// Hash of the block at the given (hex) number
    pub async fn get_block_hash(&self, block_number_hex: &str) -> Result<String, RpcClientError> {
        let result = self.call("get_block_hash", json!([block_number_hex])).await?;
        result
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| RpcClientError::Parse("block hash is not a string".to_string()))
    }

    /// Median time of the block with the given hash, in milliseconds
    pub async fn get_block_median_time(&self, block_hash: &str) -> Result<u64, RpcClientError> {
        let result = self.call("get_block_median_time", json!([block_hash])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| RpcClientError::Parse("median time is not a string".to_string()))?;
        decoder::decode_hex_u64(hex).map_err(|e| RpcClientError::Parse(e.to_string()))
    }

    /// Orderly shutdown marker for the shared session. The underlying
    /// connection pool is released when the last clone of the transport
    /// drops.
    pub fn close(&self) {
        logging::log_info("RPC session closed");
    }
}
