use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::domain::models::ClosedChannelRecord;
use crate::infrastructure::persistence::entities::closed_channels;
use crate::infrastructure::persistence::error::DbError;

/// Repository for terminal spend rows
#[derive(Clone)]
pub struct ClosedChannelRepository {
    conn: DatabaseConnection,
}

impl ClosedChannelRepository {
    /// Create a new ClosedChannelRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a record, leaving an existing row with the same hash
    /// untouched. Returns whether a row was actually written.
    pub async fn insert_or_ignore(&self, record: &ClosedChannelRecord) -> Result<bool, DbError> {
        let model = closed_channels::ActiveModel {
            block_number: Set(record.block_number as i64),
            pre_tx_hash: Set(record.pre_tx_hash.clone()),
            tx_hash: Set(record.tx_hash.clone()),
            ckb_fee: Set(record.ckb_fee),
            udt_fee: Set(record.udt_fee),
            created_at: Set(record.created_at),
        };

        let result = closed_channels::Entity::insert(model)
            .on_conflict(
                OnConflict::column(closed_channels::Column::TxHash)
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

    /// Highest block number seen so far, the scan watermark
    pub async fn last_by_block_number(&self) -> Result<Option<i64>, DbError> {
        let row = closed_channels::Entity::find()
            .order_by_desc(closed_channels::Column::BlockNumber)
            .one(&self.conn)
            .await?;

        Ok(row.map(|r| r.block_number))
    }

    pub async fn find_by_pre_tx_hash(
        &self,
        pre_tx_hash: &str,
    ) -> Result<Vec<closed_channels::Model>, DbError> {
        Ok(closed_channels::Entity::find()
            .filter(closed_channels::Column::PreTxHash.eq(pre_tx_hash))
            .all(&self.conn)
            .await?)
    }

    /// Page through rows, newest block first. Pages are one-based.
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<closed_channels::Model>, u64), DbError> {
        let paginator = closed_channels::Entity::find()
            .order_by_desc(closed_channels::Column::BlockNumber)
            .paginate(&self.conn, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(closed_channels::Entity::find().count(&self.conn).await?)
    }
}
