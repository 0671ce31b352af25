//! Reconciles stored "live" rows against the chain's live-cell view.
//!
//! A failed check for one cell is logged and skipped; the remaining cells
//! in the batch are still checked.

use std::sync::Arc;

use crate::domain::errors::CrawlerError;
use crate::infrastructure::persistence::repositories::{
    OpenChannelRepository, ShutdownCellRepository,
};
use crate::infrastructure::rpc::client::CkbRpcClient;
use crate::utils::logging;

const FUNDING_OUTPUT_INDEX: &str = "0x0";

pub struct LiveStatusChecker {
    rpc: Arc<CkbRpcClient>,
    open_channels: OpenChannelRepository,
    shutdown_cells: ShutdownCellRepository,
}

impl LiveStatusChecker {
    pub fn new(
        rpc: Arc<CkbRpcClient>,
        open_channels: OpenChannelRepository,
        shutdown_cells: ShutdownCellRepository,
    ) -> Self {
        Self {
            rpc,
            open_channels,
            shutdown_cells,
        }
    }

    pub async fn check_open_channels(&self) -> Result<(), CrawlerError> {
        let channels = self.open_channels.all_live().await?;
        logging::log_info(&format!("checking {} live funding cells", channels.len()));

        for channel in &channels {
            match self.current_status(&channel.tx_hash).await {
                Ok(status) if status != channel.status => {
                    logging::log_info(&format!(
                        "funding cell {} changed: {} -> {}",
                        channel.tx_hash, channel.status, status
                    ));
                    self.open_channels
                        .update_status(&channel.tx_hash, &status)
                        .await?;
                }
                Ok(_) => {}
                Err(e) => {
                    logging::log_warning(&format!(
                        "status check failed for {}: {}",
                        channel.tx_hash, e
                    ));
                }
            }
        }

        Ok(())
    }

    pub async fn check_shutdown_cells(&self) -> Result<(), CrawlerError> {
        let cells = self.shutdown_cells.all_live().await?;
        logging::log_info(&format!("checking {} live commitment cells", cells.len()));

        for cell in &cells {
            match self.current_status(&cell.tx_hash).await {
                Ok(status) if status != cell.status => {
                    logging::log_info(&format!(
                        "commitment cell {} changed: {} -> {}",
                        cell.tx_hash, cell.status, status
                    ));
                    self.shutdown_cells
                        .update_status(&cell.tx_hash, &status)
                        .await?;
                }
                Ok(_) => {}
                Err(e) => {
                    logging::log_warning(&format!(
                        "status check failed for {}: {}",
                        cell.tx_hash, e
                    ));
                }
            }
        }

        Ok(())
    }

    async fn current_status(&self, tx_hash: &str) -> Result<String, CrawlerError> {
        let live = self
            .rpc
            .get_live_cell(FUNDING_OUTPUT_INDEX, tx_hash)
            .await?;
        Ok(live.status)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use tokio::time::Duration;

    use super::*;
    use crate::domain::models::OpenChannelRecord;
    use crate::infrastructure::persistence::connection::DbPool;
    use crate::infrastructure::rpc::transport::test_support::ScriptedTransport;

    async fn repos() -> (OpenChannelRepository, ShutdownCellRepository) {
        let pool = DbPool::from_url("sqlite::memory:").await.unwrap();
        pool.init_schema().await.unwrap();
        let conn = pool.get_connection().clone();
        (
            OpenChannelRepository::new(conn.clone()),
            ShutdownCellRepository::new(conn),
        )
    }

    #[tokio::test]
    async fn spent_cells_are_marked_and_one_failure_does_not_stop_the_batch() {
        let spent_hash = format!("0x{:064x}", 1u64);
        let flaky_hash = format!("0x{:064x}", 2u64);
        let live_hash = format!("0x{:064x}", 3u64);

        let (open_repo, shutdown_repo) = repos().await;
        let now = Utc::now().timestamp_millis();
        for (block, hash) in [(10, &spent_hash), (11, &flaky_hash), (12, &live_hash)] {
            let record =
                OpenChannelRecord::new(block, hash, "live", 500, 0, None, now).unwrap();
            assert!(open_repo.insert_or_ignore(&record).await.unwrap());
        }

        // Rows come back oldest block first: spent, flaky, live.
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_result("get_live_cell", json!({ "cell": null, "status": "unknown" }));
        transport.push_error_object("get_live_cell", "internal error");
        transport.push_result(
            "get_live_cell",
            json!({
                "cell": {
                    "output": {
                        "capacity": "0x1f4",
                        "lock": { "code_hash": "0xfund", "hash_type": "type", "args": "0x" },
                        "type": null
                    },
                    "data": { "content": "0x" }
                },
                "status": "live"
            }),
        );

        let rpc = Arc::new(CkbRpcClient::with_transport(
            transport,
            1,
            Duration::from_millis(1),
        ));
        let checker = LiveStatusChecker::new(rpc, open_repo.clone(), shutdown_repo);

        checker.check_open_channels().await.unwrap();

        let spent = open_repo.find_by_tx_hash(&spent_hash).await.unwrap().unwrap();
        assert_eq!(spent.status, "unknown");
        assert!(spent.status_updated_at.is_some());

        let flaky = open_repo.find_by_tx_hash(&flaky_hash).await.unwrap().unwrap();
        assert_eq!(flaky.status, "live");

        let live = open_repo.find_by_tx_hash(&live_hash).await.unwrap().unwrap();
        assert_eq!(live.status, "live");

        assert_eq!(open_repo.all_live().await.unwrap().len(), 2);
    }
}
