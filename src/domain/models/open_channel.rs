use crate::domain::errors::DecodeError;
use crate::domain::models::{block_number_to_i64, validate_tx_hash};

/// A funding cell observed as a transaction output.
///
/// Created once per distinct `tx_hash`; only the live-status reconciler
/// mutates it afterwards (status and status timestamp).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenChannelRecord {
    pub block_number: u64,
    pub tx_hash: String,
    pub status: String,
    pub ckb_capacity: i64,
    pub udt_capacity: i64,
    pub status_updated_at: Option<i64>,
    pub created_at: i64,
}

impl OpenChannelRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        block_number: u64,
        tx_hash: &str,
        status: &str,
        ckb_capacity: u64,
        udt_capacity: u128,
        status_updated_at: Option<i64>,
        created_at: i64,
    ) -> Result<Self, DecodeError> {
        validate_tx_hash(tx_hash)?;
        block_number_to_i64(block_number)?;
        if status.is_empty() {
            return Err(DecodeError::FieldOutOfRange(
                "status must not be empty".to_string(),
            ));
        }
        let ckb_capacity = i64::try_from(ckb_capacity).map_err(|_| {
            DecodeError::FieldOutOfRange(format!("ckb capacity out of range: {}", ckb_capacity))
        })?;
        let udt_capacity = i64::try_from(udt_capacity).map_err(|_| {
            DecodeError::FieldOutOfRange(format!("udt capacity out of range: {}", udt_capacity))
        })?;

        Ok(Self {
            block_number,
            tx_hash: tx_hash.to_string(),
            status: status.to_string(),
            ckb_capacity,
            udt_capacity,
            status_updated_at,
            created_at,
        })
    }
}
