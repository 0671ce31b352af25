//! Scan for live commitment cells under the commitment lock script.
//!
//! Commitment cells can appear out of block order relative to what is
//! already stored, so this scan always walks the full range from genesis
//! and relies on the store to skip known cells.

use std::sync::Arc;

use chrono::Utc;

use crate::application::crawler::scanner::BlockRangeScanner;
use crate::config::CrawlerConfig;
use crate::domain::errors::CrawlerError;
use crate::domain::models::ShutdownCellRecord;
use crate::domain::services::{decoder, link_resolver};
use crate::infrastructure::persistence::repositories::ShutdownCellRepository;
use crate::infrastructure::rpc::client::CkbRpcClient;
use crate::utils::logging;

pub struct ShutdownCellScan {
    rpc: Arc<CkbRpcClient>,
    scanner: BlockRangeScanner,
    repo: ShutdownCellRepository,
    config: CrawlerConfig,
}

impl ShutdownCellScan {
    pub fn new(
        rpc: Arc<CkbRpcClient>,
        repo: ShutdownCellRepository,
        config: CrawlerConfig,
    ) -> Self {
        let scanner = BlockRangeScanner::new(rpc.clone(), config.batch_size);
        Self {
            rpc,
            scanner,
            repo,
            config,
        }
    }

    /// One full pass over all live commitment cells
    pub async fn run_once(&self) -> Result<(), CrawlerError> {
        let tip = self.rpc.get_tip_block_number().await?;
        logging::log_info("scanning commitment cells");

        let cells = self
            .scanner
            .cells_in_range(
                &self.config.commitment_lock_code_hash,
                self.config.genesis_block_number,
                tip + 1,
            )
            .await?;

        for cell in &cells {
            let tx_hash = &cell.out_point.tx_hash;
            if self.repo.find_by_tx_hash(tx_hash).await?.is_some() {
                continue;
            }

            let block_number = decoder::decode_hex_u64(&cell.block_number)?;
            let pre_tx_hash = link_resolver::resolve_linked_pair(&self.rpc, tx_hash)
                .await?
                .map(|pair| pair.0);

            let ckb_capacity = decoder::decode_hex_u64(&cell.output.capacity)?;
            let udt_capacity = match &cell.output_data {
                Some(data) if data != "0x" => Some(decoder::decode_uint128_le(data)?),
                _ => None,
            };
            // Foreign or malformed args leave the settlement fields empty
            // rather than dropping the cell.
            let lock_args = decoder::parse_commitment_lock_args(&cell.output.lock.args).ok();

            let block_hash = self.rpc.get_block_hash(&cell.block_number).await?;
            let median_time = self.rpc.get_block_median_time(&block_hash).await?;

            let record = ShutdownCellRecord::new(
                block_number,
                pre_tx_hash,
                tx_hash,
                "live",
                Some(ckb_capacity),
                udt_capacity,
                lock_args.as_ref().map(|args| args.delay_epoch),
                lock_args.as_ref().map(|args| args.have_htlcs),
                Some(Utc::now().timestamp_millis()),
                decoder::millis_to_i64(median_time)?,
            )?;
            if self.repo.insert_or_ignore(&record).await? {
                logging::log_info(&format!(
                    "recorded commitment cell {} at block {}",
                    tx_hash, block_number
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::Duration;

    use super::*;
    use crate::infrastructure::persistence::connection::DbPool;
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

    fn commitment_args(delay_epoch: u64, version: u64) -> String {
        format!(
            "0x{}{}{}",
            "aa".repeat(20),
            hex::encode(delay_epoch.to_le_bytes()),
            hex::encode(version.to_le_bytes()),
        )
    }

    #[tokio::test]
    async fn scan_records_commitment_cells_with_settlement_fields() {
        let commit_hash = format!("0x{:064x}", 0xc0ffeeu64);
        let funding_hash = format!("0x{:064x}", 0xf00du64);
        let sibling_hash = format!("0x{:064x}", 0xbeefu64);

        let transport = Arc::new(ScriptedTransport::new());
        transport.push_result("get_tip_block_number", json!("0x96"));
        transport.push_result(
            "get_cells",
            json!({
                "objects": [
                    {
                        "out_point": { "tx_hash": commit_hash, "index": "0x0" },
                        "block_number": "0x80",
                        "output": {
                            "capacity": "0x2540be400",
                            "lock": {
                                "code_hash": "0xcommit",
                                "hash_type": "type",
                                "args": commitment_args(42, 7)
                            },
                            "type": null
                        },
                        "output_data": "0x"
                    }
                ]
            }),
        );
        // Link resolution: commitment tx, then its funding tx.
        transport.push_result(
            "get_transaction",
            json!({
                "transaction": {
                    "inputs": [
                        { "previous_output": { "tx_hash": funding_hash, "index": "0x0" } }
                    ],
                    "outputs": [],
                    "outputs_data": []
                }
            }),
        );
        transport.push_result(
            "get_transaction",
            json!({
                "transaction": {
                    "inputs": [],
                    "outputs": [
                        {
                            "capacity": "0x2540be400",
                            "lock": { "code_hash": "0xfund", "hash_type": "type", "args": "0x11" },
                            "type": null
                        }
                    ],
                    "outputs_data": ["0x"]
                }
            }),
        );
        transport.push_result(
            "get_transactions",
            json!({
                "objects": [
                    { "tx_hash": funding_hash, "block_number": "0x10", "io_index": "0x0", "io_type": "output" },
                    { "tx_hash": sibling_hash, "block_number": "0x80", "io_index": "0x0", "io_type": "input" }
                ]
            }),
        );
        transport.push_result("get_block_hash", json!("0xblockhash"));
        transport.push_result("get_block_median_time", json!("0x18f8e9d2c00"));

        let rpc = Arc::new(CkbRpcClient::with_transport(
            transport,
            1,
            Duration::from_millis(1),
        ));
        let pool = DbPool::from_url("sqlite::memory:").await.unwrap();
        pool.init_schema().await.unwrap();
        let repo = ShutdownCellRepository::new(pool.get_connection().clone());
        let scan = ShutdownCellScan::new(rpc, repo.clone(), test_config());

        scan.run_once().await.unwrap();

        let row = repo.find_by_tx_hash(&commit_hash).await.unwrap().unwrap();
        assert_eq!(row.block_number, 128);
        assert_eq!(row.pre_tx_hash, Some(funding_hash));
        assert_eq!(row.status, "live");
        assert_eq!(row.ckb_capacity, Some(10_000_000_000));
        assert_eq!(row.udt_capacity, None);
        assert_eq!(row.delay_epoch, Some(42));
        assert_eq!(row.have_htlcs, Some(false));
    }
}
