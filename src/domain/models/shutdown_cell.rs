use crate::domain::errors::DecodeError;
use crate::domain::models::{block_number_to_i64, validate_tx_hash};

/// A commitment cell entering the settlement phase.
///
/// `pre_tx_hash` links back to the funding transaction when the sibling
/// pair could be resolved; an unresolved link is a legitimate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownCellRecord {
    pub block_number: u64,
    pub pre_tx_hash: Option<String>,
    pub tx_hash: String,
    pub status: String,
    pub ckb_capacity: Option<i64>,
    pub udt_capacity: Option<i64>,
    pub delay_epoch: Option<i64>,
    pub have_htlcs: Option<bool>,
    pub status_updated_at: Option<i64>,
    pub created_at: i64,
}

impl ShutdownCellRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        block_number: u64,
        pre_tx_hash: Option<String>,
        tx_hash: &str,
        status: &str,
        ckb_capacity: Option<u64>,
        udt_capacity: Option<u128>,
        delay_epoch: Option<u64>,
        have_htlcs: Option<bool>,
        status_updated_at: Option<i64>,
        created_at: i64,
    ) -> Result<Self, DecodeError> {
        validate_tx_hash(tx_hash)?;
        block_number_to_i64(block_number)?;
        if let Some(pre) = &pre_tx_hash {
            validate_tx_hash(pre)?;
        }
        if status.is_empty() {
            return Err(DecodeError::FieldOutOfRange(
                "status must not be empty".to_string(),
            ));
        }

        Ok(Self {
            block_number,
            pre_tx_hash,
            tx_hash: tx_hash.to_string(),
            status: status.to_string(),
            ckb_capacity: narrow(ckb_capacity.map(u128::from), "ckb capacity")?,
            udt_capacity: narrow(udt_capacity, "udt capacity")?,
            delay_epoch: narrow(delay_epoch.map(u128::from), "delay epoch")?,
            have_htlcs,
            status_updated_at,
            created_at,
        })
    }
}

fn narrow(value: Option<u128>, field: &str) -> Result<Option<i64>, DecodeError> {
    value
        .map(|v| {
            i64::try_from(v)
                .map_err(|_| DecodeError::FieldOutOfRange(format!("{} out of range: {}", field, v)))
        })
        .transpose()
}
