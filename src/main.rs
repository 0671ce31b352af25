use std::sync::Arc;

use fiber_indexer::application::crawler::CrawlerManager;
use fiber_indexer::config::AppConfig;
use fiber_indexer::infrastructure::persistence::{DbPool, RepositoryFactory};
use fiber_indexer::infrastructure::rpc::CkbRpcClient;
use fiber_indexer::utils::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logger();
    logging::log_info("Starting fiber channel indexer");

    let config = AppConfig::from_env();

    let db_pool = DbPool::new(&config).await?;
    db_pool.init_schema().await?;
    let repositories = RepositoryFactory::create_repositories(&db_pool);

    let rpc = Arc::new(CkbRpcClient::new(&config.rpc)?);

    let mut manager = CrawlerManager::new(rpc, &repositories, config.crawler.clone());
    manager.start();

    tokio::signal::ctrl_c().await?;
    logging::log_info("Received shutdown signal");
    manager.stop().await;

    Ok(())
}
