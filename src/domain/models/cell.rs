/// A resolved cell, classified for fee accounting.
///
/// `udt_balance` is `Some` only for token-bearing cells (a type script is
/// present and the adjacent output data decoded as a 128-bit balance);
/// plain cells never contribute to the UDT delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSnapshot {
    pub lock_args: String,
    pub capacity: u64,
    pub udt_balance: Option<u128>,
}

impl CellSnapshot {
    pub fn plain(lock_args: String, capacity: u64) -> Self {
        Self {
            lock_args,
            capacity,
            udt_balance: None,
        }
    }

    pub fn token_bearing(lock_args: String, capacity: u64, udt_balance: u128) -> Self {
        Self {
            lock_args,
            capacity,
            udt_balance: Some(udt_balance),
        }
    }

    pub fn is_token_bearing(&self) -> bool {
        self.udt_balance.is_some()
    }
}

/// Capacity-conservation accounting for one transaction.
///
/// A positive `ckb_fee` means more value entered as inputs than left as
/// outputs, i.e. the fee was paid by the spender.
#[derive(Debug, Clone)]
pub struct TxEconomics {
    pub ckb_fee: i128,
    pub udt_fee: i128,
    pub input_cells: Vec<CellSnapshot>,
    pub output_cells: Vec<CellSnapshot>,
}
