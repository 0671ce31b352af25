pub mod closed_channels;
pub mod open_channels;
pub mod orchestrator;
pub mod scanner;
pub mod shutdown_cells;
pub mod status_checker;

pub use orchestrator::CrawlerManager;
