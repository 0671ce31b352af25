//! SeaORM entity for the shutdown_cells table
//! Commitment cells in their settlement window, keyed by the creating
//! transaction's hash; pre_tx_hash links back to the funding row

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shutdown_cells")]
pub struct Model {
    pub block_number: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub pre_tx_hash: Option<String>,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub tx_hash: String,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub ckb_capacity: Option<i64>,
    pub udt_capacity: Option<i64>,
    pub delay_epoch: Option<i64>,
    pub have_htlcs: Option<bool>,
    pub status_updated_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
