//! SeaORM entity for the closed_channels table
//! Terminal spends with their settled fee deltas; rows are never updated

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "closed_channels")]
pub struct Model {
    pub block_number: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub pre_tx_hash: Option<String>,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub tx_hash: String,
    pub ckb_fee: i64,
    pub udt_fee: i64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
