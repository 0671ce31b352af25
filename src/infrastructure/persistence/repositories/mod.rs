pub mod closed_channel_repository;
pub mod lifecycle_repository;
pub mod open_channel_repository;
pub mod shutdown_cell_repository;

pub use closed_channel_repository::ClosedChannelRepository;
pub use lifecycle_repository::{
    ChannelLifecycle, ChannelStatistics, DailyChannelStats, LifecycleRepository,
};
pub use open_channel_repository::OpenChannelRepository;
pub use shutdown_cell_repository::ShutdownCellRepository;

/// Collection of all repositories
pub struct Repositories {
    /// Repository for funding transaction rows
    pub open_channels: OpenChannelRepository,
    /// Repository for commitment cell rows
    pub shutdown_cells: ShutdownCellRepository,
    /// Repository for terminal spend rows
    pub closed_channels: ClosedChannelRepository,
    /// Cross-table lifecycle and statistics queries
    pub lifecycle: LifecycleRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(
        open_channels: OpenChannelRepository,
        shutdown_cells: ShutdownCellRepository,
        closed_channels: ClosedChannelRepository,
        lifecycle: LifecycleRepository,
    ) -> Self {
        Self {
            open_channels,
            shutdown_cells,
            closed_channels,
            lifecycle,
        }
    }
}
