//! Scan for transactions that spend commitment cells, the terminal
//! lifecycle step, and settle their fee deltas.

use std::sync::Arc;

use crate::application::crawler::scanner::BlockRangeScanner;
use crate::config::CrawlerConfig;
use crate::domain::errors::CrawlerError;
use crate::domain::models::ClosedChannelRecord;
use crate::domain::services::{decoder, economics, link_resolver};
use crate::infrastructure::persistence::repositories::ClosedChannelRepository;
use crate::infrastructure::rpc::client::CkbRpcClient;
use crate::utils::logging;

pub struct ClosedChannelScan {
    rpc: Arc<CkbRpcClient>,
    scanner: BlockRangeScanner,
    repo: ClosedChannelRepository,
    config: CrawlerConfig,
}

impl ClosedChannelScan {
    pub fn new(
        rpc: Arc<CkbRpcClient>,
        repo: ClosedChannelRepository,
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
            "scanning channel closures in blocks {}..={}",
            begin, tip
        ));

        let entries = self
            .scanner
            .transactions_in_range(&self.config.commitment_lock_code_hash, begin, tip + 1)
            .await?;

        for entry in entries.iter().filter(|e| e.io_type == "input") {
            let block_number = decoder::decode_hex_u64(&entry.block_number)?;
            let economics = economics::transaction_economics(&self.rpc, &entry.tx_hash).await?;
            let pre_tx_hash = link_resolver::resolve_linked_pair(&self.rpc, &entry.tx_hash)
                .await?
                .map(|pair| pair.0);

            let block_hash = self.rpc.get_block_hash(&entry.block_number).await?;
            let median_time = self.rpc.get_block_median_time(&block_hash).await?;

            let record = ClosedChannelRecord::new(
                block_number,
                pre_tx_hash,
                &entry.tx_hash,
                economics.ckb_fee,
                economics.udt_fee,
                decoder::millis_to_i64(median_time)?,
            )?;
            if self.repo.insert_or_ignore(&record).await? {
                logging::log_info(&format!(
                    "recorded channel closure {} at block {} (ckb fee {}, udt fee {})",
                    entry.tx_hash, block_number, record.ckb_fee, record.udt_fee
                ));
            }
        }

        Ok(())
    }
}
