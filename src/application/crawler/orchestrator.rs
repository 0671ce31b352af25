//! Runs the crawler loops as independent tokio tasks.
//!
//! Each loop owns its own interval and survives its own iteration
//! failures; one broken loop never takes the others down. Shutdown is a
//! broadcast watch flag, so every loop finishes its current iteration
//! before exiting.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::application::crawler::closed_channels::ClosedChannelScan;
use crate::application::crawler::open_channels::OpenChannelScan;
use crate::application::crawler::shutdown_cells::ShutdownCellScan;
use crate::application::crawler::status_checker::LiveStatusChecker;
use crate::config::CrawlerConfig;
use crate::domain::errors::CrawlerError;
use crate::infrastructure::persistence::repositories::Repositories;
use crate::infrastructure::rpc::client::CkbRpcClient;
use crate::utils::logging;

pub struct CrawlerManager {
    rpc: Arc<CkbRpcClient>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    open_scan: Arc<OpenChannelScan>,
    shutdown_scan: Arc<ShutdownCellScan>,
    closed_scan: Arc<ClosedChannelScan>,
    status_checker: Arc<LiveStatusChecker>,
    config: CrawlerConfig,
}

impl CrawlerManager {
    /// Creates a new crawler manager instance
    pub fn new(rpc: Arc<CkbRpcClient>, repositories: &Repositories, config: CrawlerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            open_scan: Arc::new(OpenChannelScan::new(
                rpc.clone(),
                repositories.open_channels.clone(),
                config.clone(),
            )),
            shutdown_scan: Arc::new(ShutdownCellScan::new(
                rpc.clone(),
                repositories.shutdown_cells.clone(),
                config.clone(),
            )),
            closed_scan: Arc::new(ClosedChannelScan::new(
                rpc.clone(),
                repositories.closed_channels.clone(),
                config.clone(),
            )),
            status_checker: Arc::new(LiveStatusChecker::new(
                rpc.clone(),
                repositories.open_channels.clone(),
                repositories.shutdown_cells.clone(),
            )),
            rpc,
            shutdown,
            tasks: Vec::new(),
            config,
        }
    }

    /// Start all crawler loops
    pub fn start(&mut self) {
        logging::log_info("Starting crawler loops");

        let open_interval = Duration::from_secs(self.config.open_scan_interval_secs);
        let shutdown_interval = Duration::from_secs(self.config.shutdown_scan_interval_secs);
        let closed_interval = Duration::from_secs(self.config.closed_scan_interval_secs);
        let status_interval = Duration::from_secs(self.config.status_check_interval_secs);

        let scan = self.open_scan.clone();
        self.tasks.push(spawn_loop(
            "open channel scan",
            open_interval,
            self.shutdown.subscribe(),
            move || {
                let scan = scan.clone();
                async move { scan.run_once().await }
            },
        ));

        let scan = self.shutdown_scan.clone();
        self.tasks.push(spawn_loop(
            "shutdown cell scan",
            shutdown_interval,
            self.shutdown.subscribe(),
            move || {
                let scan = scan.clone();
                async move { scan.run_once().await }
            },
        ));

        let scan = self.closed_scan.clone();
        self.tasks.push(spawn_loop(
            "closed channel scan",
            closed_interval,
            self.shutdown.subscribe(),
            move || {
                let scan = scan.clone();
                async move { scan.run_once().await }
            },
        ));

        let checker = self.status_checker.clone();
        self.tasks.push(spawn_loop(
            "open channel status check",
            status_interval,
            self.shutdown.subscribe(),
            move || {
                let checker = checker.clone();
                async move { checker.check_open_channels().await }
            },
        ));

        let checker = self.status_checker.clone();
        self.tasks.push(spawn_loop(
            "shutdown cell status check",
            status_interval,
            self.shutdown.subscribe(),
            move || {
                let checker = checker.clone();
                async move { checker.check_shutdown_cells().await }
            },
        ));
    }

    /// Stop all loops and wait for their current iterations to finish
    pub async fn stop(mut self) {
        logging::log_info("Stopping crawler loops");
        let _ = self.shutdown.send(true);

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                logging::log_warning(&format!("crawler task ended abnormally: {}", e));
            }
        }

        self.rpc.close();
        logging::log_info("Crawler shutdown complete");
    }
}

/// One iteration per tick until the shutdown flag flips. An iteration
/// error is logged and the loop keeps going.
fn spawn_loop<F, Fut>(
    name: &'static str,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    iteration: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), CrawlerError>> + Send,
{
    tokio::spawn(async move {
        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = iteration().await {
                logging::log_error(&format!("{} iteration failed: {}", name, e));
            }

            tokio::select! {
                _ = sleep(interval) => {}
                _ = shutdown.changed() => {}
            }
        }
        logging::log_info(&format!("{} loop stopped", name));
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn a_failing_loop_keeps_running_and_does_not_stall_others() {
        let (tx, _) = watch::channel(false);
        let ok_count = Arc::new(AtomicU32::new(0));
        let err_count = Arc::new(AtomicU32::new(0));

        let ok = ok_count.clone();
        let healthy = spawn_loop(
            "healthy",
            Duration::from_millis(5),
            tx.subscribe(),
            move || {
                let ok = ok.clone();
                async move {
                    ok.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        let err = err_count.clone();
        let broken = spawn_loop(
            "broken",
            Duration::from_millis(5),
            tx.subscribe(),
            move || {
                let err = err.clone();
                async move {
                    err.fetch_add(1, Ordering::SeqCst);
                    Err(CrawlerError::ProcessingError("boom".to_string()))
                }
            },
        );

        sleep(Duration::from_millis(50)).await;
        let _ = tx.send(true);
        healthy.await.unwrap();
        broken.await.unwrap();

        assert!(ok_count.load(Ordering::SeqCst) >= 3);
        assert!(err_count.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn shutdown_interrupts_the_interval_sleep() {
        let (tx, _) = watch::channel(false);
        let count = Arc::new(AtomicU32::new(0));

        let counter = count.clone();
        let handle = spawn_loop(
            "slow",
            Duration::from_secs(3600),
            tx.subscribe(),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        sleep(Duration::from_millis(20)).await;
        let _ = tx.send(true);
        handle.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
