pub mod cell;
pub mod closed_channel;
pub mod open_channel;
pub mod shutdown_cell;

pub use cell::{CellSnapshot, TxEconomics};
pub use closed_channel::ClosedChannelRecord;
pub use open_channel::OpenChannelRecord;
pub use shutdown_cell::ShutdownCellRecord;

use crate::domain::errors::DecodeError;

/// A transaction hash is a 0x-prefixed 32-byte hex string.
pub(crate) fn validate_tx_hash(tx_hash: &str) -> Result<(), DecodeError> {
    let digits = tx_hash.strip_prefix("0x").ok_or_else(|| {
        DecodeError::FieldOutOfRange(format!("tx_hash missing 0x prefix: {}", tx_hash))
    })?;
    if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::FieldOutOfRange(format!(
            "tx_hash is not a 32-byte hex string: {}",
            tx_hash
        )));
    }
    Ok(())
}

pub(crate) fn block_number_to_i64(block_number: u64) -> Result<i64, DecodeError> {
    i64::try_from(block_number).map_err(|_| {
        DecodeError::FieldOutOfRange(format!("block number out of range: {}", block_number))
    })
}
