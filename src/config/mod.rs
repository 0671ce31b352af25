use dotenv::dotenv;
use std::env;

/// Configuration for the CKB RPC client
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// CKB node JSON-RPC endpoint
    pub url: String,
    /// Attempt budget for a single RPC call
    pub max_attempts: u32,
    /// Fixed backoff between attempts, in seconds
    pub retry_delay_secs: u64,
    /// Per-call HTTP timeout, in seconds
    pub timeout_secs: u64,
}

/// Configuration for the database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
}

/// Configuration for the crawler loops
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Block number the scans start from when the store is empty
    pub genesis_block_number: u64,
    /// Code hash of the funding lock script
    pub funding_lock_code_hash: String,
    /// Code hash of the commitment lock script
    pub commitment_lock_code_hash: String,
    /// Maximum blocks per indexer query window
    pub batch_size: u64,
    /// Open-channel scan interval in seconds
    pub open_scan_interval_secs: u64,
    /// Shutdown-cell scan interval in seconds
    pub shutdown_scan_interval_secs: u64,
    /// Closed-channel scan interval in seconds
    pub closed_scan_interval_secs: u64,
    /// Live-status reconciler interval in seconds
    pub status_check_interval_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// RPC client configuration
    pub rpc: RpcConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Crawler configuration
    pub crawler: CrawlerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Ensure .env file is loaded
        dotenv().ok();

        let rpc_config = RpcConfig {
            url: env::var("CKB_RPC_URL").unwrap_or_else(|_| "https://testnet.ckb.dev/".to_string()),
            max_attempts: parse_env("RPC_MAX_ATTEMPTS", 5),
            retry_delay_secs: parse_env("RPC_RETRY_DELAY_SECS", 2),
            timeout_secs: parse_env("RPC_TIMEOUT_SECS", 30),
        };

        let database_config = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://fiber_monit.db?mode=rwc".to_string()),
        };

        let crawler_config = CrawlerConfig {
            genesis_block_number: parse_env("GENESIS_BLOCK_NUMBER", 18483877),
            funding_lock_code_hash: env::var("FUNDING_LOCK_CODE_HASH").unwrap_or_else(|_| {
                "0x6c67887fe201ee0c7853f1682c0b77c0e6214044c156c7558269390a8afa6d7c".to_string()
            }),
            commitment_lock_code_hash: env::var("COMMITMENT_LOCK_CODE_HASH").unwrap_or_else(
                |_| "0x740dee83f87c6f309824d8fd3fbdd3c8380ee6fc9acc90b1a748438afcdf81d8".to_string(),
            ),
            batch_size: parse_env("SCAN_BATCH_SIZE", 1000),
            open_scan_interval_secs: parse_env("OPEN_SCAN_INTERVAL_SECS", 60),
            shutdown_scan_interval_secs: parse_env("SHUTDOWN_SCAN_INTERVAL_SECS", 60),
            closed_scan_interval_secs: parse_env("CLOSED_SCAN_INTERVAL_SECS", 60),
            status_check_interval_secs: parse_env("STATUS_CHECK_INTERVAL_SECS", 300),
        };

        Self {
            rpc: rpc_config,
            database: database_config,
            crawler: crawler_config,
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
