//! Scan for funding transactions under the funding lock script.
//!
//! The scan is incremental: it resumes one block past the highest block
//! already stored, so a restart never re-walks the whole chain.

use std::sync::Arc;

use chrono::Utc;

use crate::config::CrawlerConfig;
use crate::domain::errors::CrawlerError;
use crate::domain::models::OpenChannelRecord;
use crate::domain::services::decoder;
use crate::application::crawler::scanner::BlockRangeScanner;
use crate::infrastructure::persistence::repositories::OpenChannelRepository;
use crate::infrastructure::rpc::client::CkbRpcClient;
use crate::infrastructure::rpc::types::{LiveCell, TxIndexEntry};
use crate::utils::logging;

pub struct OpenChannelScan {
    rpc: Arc<CkbRpcClient>,
    scanner: BlockRangeScanner,
    repo: OpenChannelRepository,
    config: CrawlerConfig,
}

impl OpenChannelScan {
    pub fn new(rpc: Arc<CkbRpcClient>, repo: OpenChannelRepository, config: CrawlerConfig) -> Self {
        let scanner = BlockRangeScanner::new(rpc.clone(), config.batch_size);
        Self {
            rpc,
            scanner,
            repo,
            config,
        }
    }

    /// One scan pass from the watermark to the current tip
    pub async fn run_once(&self) -> Result<(), CrawlerError> {
        let begin = match self.repo.last_by_block_number().await? {
            Some(last) => last as u64 + 1,
            None => self.config.genesis_block_number,
        };
        let tip = self.rpc.get_tip_block_number().await?;
        if begin > tip {
            return Ok(());
        }
        logging::log_info(&format!(
            "scanning funding transactions in blocks {}..={}",
            begin, tip
        ));

        let entries = self
            .scanner
            .transactions_in_range(&self.config.funding_lock_code_hash, begin, tip + 1)
            .await?;

        for entry in entries.iter().filter(|e| e.io_type == "output") {
            if self.repo.find_by_tx_hash(&entry.tx_hash).await?.is_some() {
                continue;
            }

            let block_number = decoder::decode_hex_u64(&entry.block_number)?;
            let live = self.rpc.get_live_cell(&entry.io_index, &entry.tx_hash).await?;
            let (ckb_capacity, udt_capacity) = self.funding_capacities(&live, entry).await?;

            let block_hash = self.rpc.get_block_hash(&entry.block_number).await?;
            let median_time = self.rpc.get_block_median_time(&block_hash).await?;

            let record = OpenChannelRecord::new(
                block_number,
                &entry.tx_hash,
                &live.status,
                ckb_capacity,
                udt_capacity,
                Some(Utc::now().timestamp_millis()),
                decoder::millis_to_i64(median_time)?,
            )?;
            if self.repo.insert_or_ignore(&record).await? {
                logging::log_info(&format!(
                    "recorded channel funding {} at block {}",
                    entry.tx_hash, block_number
                ));
            }
        }

        Ok(())
    }

    /// Capacity and token balance of the funding output. A cell that has
    /// already been spent is read off its creating transaction instead of
    /// the live-cell view.
    async fn funding_capacities(
        &self,
        live: &LiveCell,
        entry: &TxIndexEntry,
    ) -> Result<(u64, u128), CrawlerError> {
        if let Some(cell) = &live.cell {
            let capacity = decoder::decode_hex_u64(&cell.output.capacity)?;
            let udt = match &cell.data {
                Some(data) if data.content != "0x" => decoder::decode_uint128_le(&data.content)?,
                _ => 0,
            };
            return Ok((capacity, udt));
        }

        let tx = self.rpc.get_transaction(&entry.tx_hash).await?.transaction;
        let index = decoder::decode_hex_u64(&entry.io_index)? as usize;
        let output = tx.outputs.get(index).ok_or_else(|| {
            CrawlerError::ProcessingError(format!(
                "output index {} out of range in {}",
                index, entry.tx_hash
            ))
        })?;
        let capacity = decoder::decode_hex_u64(&output.capacity)?;
        let udt = match tx.outputs_data.get(index) {
            Some(data) if data != "0x" => decoder::decode_uint128_le(data)?,
            _ => 0,
        };
        Ok((capacity, udt))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::Duration;

    use super::*;
    use crate::infrastructure::persistence::connection::DbPool;
    use crate::infrastructure::persistence::repositories::OpenChannelRepository;
    use crate::infrastructure::rpc::transport::test_support::ScriptedTransport;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig {
            genesis_block_number: 100,
            funding_lock_code_hash: "0xfund".to_string(),
            commitment_lock_code_hash: "0xcommit".to_string(),
            batch_size: 1000,
            open_scan_interval_secs: 60,
            shutdown_scan_interval_secs: 60,
            closed_scan_interval_secs: 60,
            status_check_interval_secs: 300,
        }
    }

    async fn test_repo() -> OpenChannelRepository {
        let pool = DbPool::from_url("sqlite::memory:").await.unwrap();
        pool.init_schema().await.unwrap();
        OpenChannelRepository::new(pool.get_connection().clone())
    }

    #[tokio::test]
    async fn scan_records_funding_outputs_and_advances_the_watermark() {
        let funding_hash = format!("0x{:064x}", 0xabcdu64);
        let other_hash = format!("0x{:064x}", 0x1111u64);

        let transport = Arc::new(ScriptedTransport::new());
        transport.push_result("get_tip_block_number", json!("0x96"));
        transport.push_result(
            "get_transactions",
            json!({
                "objects": [
                    {
                        "tx_hash": funding_hash,
                        "block_number": "0x78",
                        "io_index": "0x0",
                        "io_type": "output"
                    },
                    {
                        "tx_hash": other_hash,
                        "block_number": "0x79",
                        "io_index": "0x0",
                        "io_type": "input"
                    }
                ]
            }),
        );
        transport.push_result(
            "get_live_cell",
            json!({
                "cell": {
                    "output": {
                        "capacity": "0xba43b7400",
                        "lock": { "code_hash": "0xfund", "hash_type": "type", "args": "0x" },
                        "type": null
                    },
                    "data": { "content": "0xf4010000000000000000000000000000" }
                },
                "status": "live"
            }),
        );
        transport.push_result("get_block_hash", json!("0xblockhash"));
        transport.push_result("get_block_median_time", json!("0x18f8e9d2c00"));

        let rpc = Arc::new(CkbRpcClient::with_transport(
            transport.clone(),
            1,
            Duration::from_millis(1),
        ));
        let repo = test_repo().await;
        let scan = OpenChannelScan::new(rpc, repo.clone(), test_config());

        scan.run_once().await.unwrap();

        let row = repo.find_by_tx_hash(&funding_hash).await.unwrap().unwrap();
        assert_eq!(row.block_number, 120);
        assert_eq!(row.status, "live");
        assert_eq!(row.ckb_capacity, 50_000_000_000);
        assert_eq!(row.udt_capacity, 500);
        assert_eq!(row.created_at, 0x18f8e9d2c00);
        assert!(repo.find_by_tx_hash(&other_hash).await.unwrap().is_none());

        // Next pass resumes past block 120 and finds nothing new.
        transport.push_result("get_tip_block_number", json!("0x96"));
        transport.push_result("get_transactions", json!({ "objects": [] }));
        scan.run_once().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn median_time_beyond_storage_width_is_an_error() {
        let funding_hash = format!("0x{:064x}", 0xabcdu64);

        let transport = Arc::new(ScriptedTransport::new());
        transport.push_result("get_tip_block_number", json!("0x96"));
        transport.push_result(
            "get_transactions",
            json!({
                "objects": [
                    {
                        "tx_hash": funding_hash,
                        "block_number": "0x78",
                        "io_index": "0x0",
                        "io_type": "output"
                    }
                ]
            }),
        );
        transport.push_result(
            "get_live_cell",
            json!({
                "cell": {
                    "output": {
                        "capacity": "0xba43b7400",
                        "lock": { "code_hash": "0xfund", "hash_type": "type", "args": "0x" },
                        "type": null
                    },
                    "data": { "content": "0x" }
                },
                "status": "live"
            }),
        );
        transport.push_result("get_block_hash", json!("0xblockhash"));
        transport.push_result("get_block_median_time", json!("0xffffffffffffffff"));

        let rpc = Arc::new(CkbRpcClient::with_transport(
            transport,
            1,
            Duration::from_millis(1),
        ));
        let repo = test_repo().await;
        let scan = OpenChannelScan::new(rpc, repo.clone(), test_config());

        assert!(scan.run_once().await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
