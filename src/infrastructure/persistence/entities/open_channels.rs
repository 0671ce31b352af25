//! SeaORM entity for the open_channels table
//! One row per funding transaction, keyed by its hash

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "open_channels")]
pub struct Model {
    pub block_number: i64,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub tx_hash: String,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub ckb_capacity: i64,
    pub udt_capacity: i64,
    pub status_updated_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
