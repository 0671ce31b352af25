use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::config::AppConfig;
use crate::infrastructure::persistence::entities::{
    closed_channels, open_channels, shutdown_cells,
};
use crate::infrastructure::persistence::error::DbError;
use crate::utils::logging;

/// Manages database connection pool
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Creates a new database connection pool
    pub async fn new(config: &AppConfig) -> Result<Self, DbError> {
        Self::from_url(&config.database.url).await
    }

    /// Connects to an explicit database URL
    pub async fn from_url(url: &str) -> Result<Self, DbError> {
        logging::log_info(&format!("Connecting to database: {}", url));

        match Database::connect(url).await {
            Ok(connection) => {
                logging::log_info("Database connection established successfully");
                Ok(DbPool { connection })
            }
            Err(e) => {
                logging::log_error(&format!("Failed to connect to database: {}", e));
                Err(DbError::ConnectionError(format!(
                    "Failed to connect to database: {}",
                    e
                )))
            }
        }
    }

    /// Creates the channel tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let backend = self.connection.get_database_backend();
        let schema = Schema::new(backend);

        let mut statements = vec![
            schema.create_table_from_entity(open_channels::Entity),
            schema.create_table_from_entity(shutdown_cells::Entity),
            schema.create_table_from_entity(closed_channels::Entity),
        ];
        for statement in &mut statements {
            statement.if_not_exists();
            self.connection.execute(backend.build(&*statement)).await?;
        }

        Ok(())
    }

    /// Returns the database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
