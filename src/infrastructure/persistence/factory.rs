use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    ClosedChannelRepository, LifecycleRepository, OpenChannelRepository, Repositories,
    ShutdownCellRepository,
};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all repositories
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(
            Self::create_open_channel_repository(conn.clone()),
            Self::create_shutdown_cell_repository(conn.clone()),
            Self::create_closed_channel_repository(conn.clone()),
            Self::create_lifecycle_repository(conn),
        )
    }

    /// Create an open_channels repository
    pub fn create_open_channel_repository(conn: DatabaseConnection) -> OpenChannelRepository {
        OpenChannelRepository::new(conn)
    }

    /// Create a shutdown_cells repository
    pub fn create_shutdown_cell_repository(conn: DatabaseConnection) -> ShutdownCellRepository {
        ShutdownCellRepository::new(conn)
    }

    /// Create a closed_channels repository
    pub fn create_closed_channel_repository(conn: DatabaseConnection) -> ClosedChannelRepository {
        ClosedChannelRepository::new(conn)
    }

    /// Create a lifecycle repository
    pub fn create_lifecycle_repository(conn: DatabaseConnection) -> LifecycleRepository {
        LifecycleRepository::new(conn)
    }
}
