//! Windowed indexer queries over a block range.
//!
//! The indexer caps how much it returns per query, so a scan over a large
//! range is broken into fixed-size windows issued one after another.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::errors::CrawlerError;
use crate::infrastructure::rpc::client::CkbRpcClient;
use crate::infrastructure::rpc::types::{CellIndexEntry, TxIndexEntry};

const WINDOW_QUERY_LIMIT: &str = "0xffff";

/// Split the half-open range `[begin, end)` into consecutive half-open
/// windows of at most `batch_size` blocks, in ascending order.
pub fn batch_windows(begin: u64, end: u64, batch_size: u64) -> Vec<(u64, u64)> {
    let mut windows = Vec::new();
    if batch_size == 0 {
        return windows;
    }

    let mut lo = begin;
    while lo < end {
        let hi = end.min(lo.saturating_add(batch_size));
        windows.push((lo, hi));
        lo = hi;
    }
    windows
}

/// Issues windowed prefix queries for a lock script over a block range.
pub struct BlockRangeScanner {
    rpc: Arc<CkbRpcClient>,
    batch_size: u64,
}

impl BlockRangeScanner {
    pub fn new(rpc: Arc<CkbRpcClient>, batch_size: u64) -> Self {
        Self { rpc, batch_size }
    }

    /// All transactions touching cells under `code_hash` in `[begin, end)`
    pub async fn transactions_in_range(
        &self,
        code_hash: &str,
        begin: u64,
        end: u64,
    ) -> Result<Vec<TxIndexEntry>, CrawlerError> {
        let mut entries = Vec::new();
        for (lo, hi) in batch_windows(begin, end, self.batch_size) {
            let page = self
                .rpc
                .get_transactions(prefix_search_key(code_hash, lo, hi), WINDOW_QUERY_LIMIT)
                .await?;
            entries.extend(page.objects);
        }
        Ok(entries)
    }

    /// All live cells under `code_hash` created in `[begin, end)`
    pub async fn cells_in_range(
        &self,
        code_hash: &str,
        begin: u64,
        end: u64,
    ) -> Result<Vec<CellIndexEntry>, CrawlerError> {
        let mut entries = Vec::new();
        for (lo, hi) in batch_windows(begin, end, self.batch_size) {
            let page = self
                .rpc
                .get_cells(prefix_search_key(code_hash, lo, hi), WINDOW_QUERY_LIMIT)
                .await?;
            entries.extend(page.objects);
        }
        Ok(entries)
    }
}

fn prefix_search_key(code_hash: &str, lo: u64, hi: u64) -> Value {
    json!({
        "script": {
            "code_hash": code_hash,
            "hash_type": "type",
            "args": "0x",
        },
        "script_type": "lock",
        "script_search_mode": "prefix",
        "filter": {
            "block_range": [format!("{:#x}", lo), format!("{:#x}", hi)],
        },
    })
}
