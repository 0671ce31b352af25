use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::domain::models::OpenChannelRecord;
use crate::infrastructure::persistence::entities::open_channels;
use crate::infrastructure::persistence::error::DbError;

/// Repository for funding transaction rows
#[derive(Clone)]
pub struct OpenChannelRepository {
    conn: DatabaseConnection,
}

impl OpenChannelRepository {
    /// Create a new OpenChannelRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a record, leaving an existing row with the same hash
    /// untouched. Returns whether a row was actually written.
    pub async fn insert_or_ignore(&self, record: &OpenChannelRecord) -> Result<bool, DbError> {
        let model = open_channels::ActiveModel {
            block_number: Set(record.block_number as i64),
            tx_hash: Set(record.tx_hash.clone()),
            status: Set(record.status.clone()),
            ckb_capacity: Set(record.ckb_capacity),
            udt_capacity: Set(record.udt_capacity),
            status_updated_at: Set(record.status_updated_at),
            created_at: Set(record.created_at),
        };

        let result = open_channels::Entity::insert(model)
            .on_conflict(
                OnConflict::column(open_channels::Column::TxHash)
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
        let row = open_channels::Entity::find()
            .order_by_desc(open_channels::Column::BlockNumber)
            .one(&self.conn)
            .await?;

        Ok(row.map(|r| r.block_number))
    }

    pub async fn find_by_tx_hash(
        &self,
        tx_hash: &str,
    ) -> Result<Option<open_channels::Model>, DbError> {
        Ok(open_channels::Entity::find_by_id(tx_hash.to_string())
            .one(&self.conn)
            .await?)
    }

    /// All rows still marked live, oldest block first, for the status
    /// reconciler
    pub async fn all_live(&self) -> Result<Vec<open_channels::Model>, DbError> {
        Ok(open_channels::Entity::find()
            .filter(open_channels::Column::Status.eq("live"))
            .order_by_asc(open_channels::Column::BlockNumber)
            .all(&self.conn)
            .await?)
    }

    /// Patch a row's status and stamp the change time
    pub async fn update_status(&self, tx_hash: &str, status: &str) -> Result<(), DbError> {
        let model = open_channels::ActiveModel {
            tx_hash: Set(tx_hash.to_string()),
            status: Set(status.to_string()),
            status_updated_at: Set(Some(Utc::now().timestamp_millis())),
            ..Default::default()
        };

        open_channels::Entity::update(model).exec(&self.conn).await?;
        Ok(())
    }

    /// Page through rows, newest block first. Pages are one-based.
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<open_channels::Model>, u64), DbError> {
        let paginator = open_channels::Entity::find()
            .order_by_desc(open_channels::Column::BlockNumber)
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
    ) -> Result<(Vec<open_channels::Model>, u64), DbError> {
        let paginator = open_channels::Entity::find()
            .filter(open_channels::Column::Status.eq(status))
            .order_by_desc(open_channels::Column::BlockNumber)
            .paginate(&self.conn, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(open_channels::Entity::find().count(&self.conn).await?)
    }

    /// Summed (ckb, udt) capacity across all rows
    pub async fn capacity_totals(&self) -> Result<(i64, i64), DbError> {
        let totals: Option<(Option<i64>, Option<i64>)> = open_channels::Entity::find()
            .select_only()
            .column_as(open_channels::Column::CkbCapacity.sum(), "ckb_total")
            .column_as(open_channels::Column::UdtCapacity.sum(), "udt_total")
            .into_tuple()
            .one(&self.conn)
            .await?;

        let (ckb, udt) = totals.unwrap_or((None, None));
        Ok((ckb.unwrap_or(0), udt.unwrap_or(0)))
    }
}
