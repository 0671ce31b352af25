use crate::domain::errors::DecodeError;
use crate::domain::models::{block_number_to_i64, validate_tx_hash};

/// The terminal spend of a commitment cell. Immutable once created; there
/// is no status field because closure is final.
///
/// Fees are signed: a negative delta means net value flowed out of the
/// matched cells, which is directional information, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedChannelRecord {
    pub block_number: u64,
    pub pre_tx_hash: Option<String>,
    pub tx_hash: String,
    pub ckb_fee: i64,
    pub udt_fee: i64,
    pub created_at: i64,
}

impl ClosedChannelRecord {
    pub fn new(
        block_number: u64,
        pre_tx_hash: Option<String>,
        tx_hash: &str,
        ckb_fee: i128,
        udt_fee: i128,
        created_at: i64,
    ) -> Result<Self, DecodeError> {
        validate_tx_hash(tx_hash)?;
        block_number_to_i64(block_number)?;
        if let Some(pre) = &pre_tx_hash {
            validate_tx_hash(pre)?;
        }
        let ckb_fee = i64::try_from(ckb_fee).map_err(|_| {
            DecodeError::FieldOutOfRange(format!("ckb fee out of range: {}", ckb_fee))
        })?;
        let udt_fee = i64::try_from(udt_fee).map_err(|_| {
            DecodeError::FieldOutOfRange(format!("udt fee out of range: {}", udt_fee))
        })?;

        Ok(Self {
            block_number,
            pre_tx_hash,
            tx_hash: tx_hash.to_string(),
            ckb_fee,
            udt_fee,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_fees_are_accepted() {
        let tx_hash = format!("0x{}", "33".repeat(32));
        let record = ClosedChannelRecord::new(9, None, &tx_hash, -150, -7, 0).unwrap();
        assert_eq!(record.ckb_fee, -150);
        assert_eq!(record.udt_fee, -7);
    }

    #[test]
    fn fee_outside_storage_width_is_rejected() {
        let tx_hash = format!("0x{}", "33".repeat(32));
        let result = ClosedChannelRecord::new(9, None, &tx_hash, i128::from(i64::MAX) + 1, 0, 0);
        assert!(result.is_err());
    }
}
