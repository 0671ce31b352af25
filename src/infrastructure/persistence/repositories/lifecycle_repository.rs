use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use serde::Serialize;

use crate::infrastructure::persistence::entities::{
    closed_channels, open_channels, shutdown_cells,
};
use crate::infrastructure::persistence::error::DbError;

/// Everything recorded about one channel, keyed by its funding hash.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelLifecycle {
    pub open: Option<open_channels::Model>,
    pub shutdown: Vec<shutdown_cells::Model>,
    pub closed: Vec<closed_channels::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatistics {
    pub open_channels: u64,
    pub shutdown_cells: u64,
    pub closed_channels: u64,
    pub total_ckb_capacity: i64,
    pub total_udt_capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyChannelStats {
    pub date: NaiveDate,
    pub opened: u64,
    pub shutdown: u64,
}

/// Cross-table queries over the three channel tables
#[derive(Clone)]
pub struct LifecycleRepository {
    conn: DatabaseConnection,
}

impl LifecycleRepository {
    /// Create a new LifecycleRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Assemble the full history of one channel from its funding hash.
    ///
    /// Closure rows point at whatever transaction their first input spent,
    /// so a cooperative close links straight to the funding hash while a
    /// delayed settlement links to a commitment cell in between.
    pub async fn lifecycle(&self, tx_hash: &str) -> Result<ChannelLifecycle, DbError> {
        let open = open_channels::Entity::find_by_id(tx_hash.to_string())
            .one(&self.conn)
            .await?;
        let shutdown = shutdown_cells::Entity::find()
            .filter(shutdown_cells::Column::PreTxHash.eq(tx_hash))
            .all(&self.conn)
            .await?;

        let mut predecessors: Vec<String> = vec![tx_hash.to_string()];
        predecessors.extend(shutdown.iter().map(|cell| cell.tx_hash.clone()));
        let closed = closed_channels::Entity::find()
            .filter(closed_channels::Column::PreTxHash.is_in(predecessors))
            .all(&self.conn)
            .await?;

        Ok(ChannelLifecycle {
            open,
            shutdown,
            closed,
        })
    }

    pub async fn statistics(&self) -> Result<ChannelStatistics, DbError> {
        let open_count = open_channels::Entity::find().count(&self.conn).await?;
        let shutdown_count = shutdown_cells::Entity::find().count(&self.conn).await?;
        let closed_count = closed_channels::Entity::find().count(&self.conn).await?;

        let totals: Option<(Option<i64>, Option<i64>)> = open_channels::Entity::find()
            .select_only()
            .column_as(open_channels::Column::CkbCapacity.sum(), "ckb_total")
            .column_as(open_channels::Column::UdtCapacity.sum(), "udt_total")
            .into_tuple()
            .one(&self.conn)
            .await?;
        let (ckb, udt) = totals.unwrap_or((None, None));

        Ok(ChannelStatistics {
            open_channels: open_count,
            shutdown_cells: shutdown_count,
            closed_channels: closed_count,
            total_ckb_capacity: ckb.unwrap_or(0),
            total_udt_capacity: udt.unwrap_or(0),
        })
    }

    /// Channel openings and shutdowns for one calendar day (UTC)
    pub async fn daily_stats(&self, date: NaiveDate) -> Result<DailyChannelStats, DbError> {
        let (start, end) = day_bounds_millis(date)?;

        let opened = open_channels::Entity::find()
            .filter(open_channels::Column::CreatedAt.gte(start))
            .filter(open_channels::Column::CreatedAt.lt(end))
            .count(&self.conn)
            .await?;
        let shutdown = shutdown_cells::Entity::find()
            .filter(shutdown_cells::Column::CreatedAt.gte(start))
            .filter(shutdown_cells::Column::CreatedAt.lt(end))
            .count(&self.conn)
            .await?;

        Ok(DailyChannelStats {
            date,
            opened,
            shutdown,
        })
    }

    /// Per-day opening/shutdown counts over an inclusive date range (UTC).
    /// Days with no activity are omitted.
    pub async fn range_stats(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyChannelStats>, DbError> {
        let (start_ms, _) = day_bounds_millis(start)?;
        let (_, end_ms) = day_bounds_millis(end)?;

        let opened = open_channels::Entity::find()
            .filter(open_channels::Column::CreatedAt.gte(start_ms))
            .filter(open_channels::Column::CreatedAt.lt(end_ms))
            .all(&self.conn)
            .await?;
        let shutdown = shutdown_cells::Entity::find()
            .filter(shutdown_cells::Column::CreatedAt.gte(start_ms))
            .filter(shutdown_cells::Column::CreatedAt.lt(end_ms))
            .all(&self.conn)
            .await?;

        let mut buckets: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
        for row in &opened {
            if let Some(date) = date_of_millis(row.created_at) {
                buckets.entry(date).or_default().0 += 1;
            }
        }
        for row in &shutdown {
            if let Some(date) = date_of_millis(row.created_at) {
                buckets.entry(date).or_default().1 += 1;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(date, (opened, shutdown))| DailyChannelStats {
                date,
                opened,
                shutdown,
            })
            .collect())
    }
}

/// Half-open [start, end) epoch-millisecond bounds of a UTC day
fn day_bounds_millis(date: NaiveDate) -> Result<(i64, i64), DbError> {
    let next = date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| DbError::QueryError(format!("date out of range: {}", date)))?;
    let start = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    let end = next.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    Ok((start, end))
}

fn date_of_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}
