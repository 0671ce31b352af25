use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::domain::models::ShutdownCellRecord;
use crate::infrastructure::persistence::entities::shutdown_cells;
use crate::infrastructure::persistence::error::DbError;

/// Repository for commitment cell rows
#[derive(Clone)]
pub struct ShutdownCellRepository {
    conn: DatabaseConnection,
}

impl ShutdownCellRepository {
    /// Create a new ShutdownCellRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a record, leaving an existing row with the same hash
    /// untouched. Returns whether a row was actually written.
    pub async fn insert_or_ignore(&self, record: &ShutdownCellRecord) -> Result<bool, DbError> {
        let model = shutdown_cells::ActiveModel {
            block_number: Set(record.block_number as i64),
            pre_tx_hash: Set(record.pre_tx_hash.clone()),
            tx_hash: Set(record.tx_hash.clone()),
            status: Set(record.status.clone()),
            ckb_capacity: Set(record.ckb_capacity),
            udt_capacity: Set(record.udt_capacity),
            delay_epoch: Set(record.delay_epoch),
            have_htlcs: Set(record.have_htlcs),
            status_updated_at: Set(record.status_updated_at),
            created_at: Set(record.created_at),
        };

        let result = shutdown_cells::Entity::insert(model)
            .on_conflict(
                OnConflict::column(shutdown_cells::Column::TxHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_tx_hash(
        &self,
        tx_hash: &str,
    ) -> Result<Option<shutdown_cells::Model>, DbError> {
        Ok(shutdown_cells::Entity::find_by_id(tx_hash.to_string())
            .one(&self.conn)
            .await?)
    }

    pub async fn find_by_pre_tx_hash(
        &self,
        pre_tx_hash: &str,
    ) -> Result<Vec<shutdown_cells::Model>, DbError> {
        Ok(shutdown_cells::Entity::find()
            .filter(shutdown_cells::Column::PreTxHash.eq(pre_tx_hash))
            .all(&self.conn)
            .await?)
    }

    /// All rows still marked live, oldest block first, for the status
    /// reconciler
    pub async fn all_live(&self) -> Result<Vec<shutdown_cells::Model>, DbError> {
        Ok(shutdown_cells::Entity::find()
            .filter(shutdown_cells::Column::Status.eq("live"))
            .order_by_asc(shutdown_cells::Column::BlockNumber)
            .all(&self.conn)
            .await?)
    }

    /// Patch a row's status and stamp the change time
    pub async fn update_status(&self, tx_hash: &str, status: &str) -> Result<(), DbError> {
        let model = shutdown_cells::ActiveModel {
            tx_hash: Set(tx_hash.to_string()),
            status: Set(status.to_string()),
            status_updated_at: Set(Some(Utc::now().timestamp_millis())),
            ..Default::default()
        };

        shutdown_cells::Entity::update(model).exec(&self.conn).await?;
        Ok(())
    }

    /// Page through rows, newest block first. Pages are one-based.
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<shutdown_cells::Model>, u64), DbError> {
        let paginator = shutdown_cells::Entity::find()
            .order_by_desc(shutdown_cells::Column::BlockNumber)
            .paginate(&self.conn, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    pub async fn list_by_status(
        &self,
        status: &str,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<shutdown_cells::Model>, u64), DbError> {
        let paginator = shutdown_cells::Entity::find()
            .filter(shutdown_cells::Column::Status.eq(status))
            .order_by_desc(shutdown_cells::Column::BlockNumber)
            .paginate(&self.conn, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(shutdown_cells::Entity::find().count(&self.conn).await?)
    }
}
