//! Serde views of the CKB RPC objects this crate consumes.
//!
//! Numeric ledger fields (capacities, block numbers, indices, median times)
//! stay `0x`-prefixed hex strings here; decoding happens at the decoder
//! boundary, never in the transport layer.

use serde::{Deserialize, Serialize};

/// A lock or type script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub code_hash: String,
    pub hash_type: String,
    pub args: String,
}

/// Reference to a transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: String,
    pub index: String,
}

/// A cell as it appears in a transaction's outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOutput {
    pub capacity: String,
    pub lock: Script,
    #[serde(rename = "type")]
    pub type_script: Option<Script>,
}

/// A transaction input
#[derive(Debug, Clone, Deserialize)]
pub struct CellInput {
    pub previous_output: OutPoint,
}

/// The parts of a transaction the crawler reads
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionView {
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    pub outputs_data: Vec<String>,
}

/// `get_transaction` result envelope
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionWithStatus {
    pub transaction: TransactionView,
}

/// One entry of an ungrouped `get_transactions` page
#[derive(Debug, Clone, Deserialize)]
pub struct TxIndexEntry {
    pub tx_hash: String,
    pub block_number: String,
    pub io_index: String,
    pub io_type: String,
}

/// One entry of a `get_cells` page
#[derive(Debug, Clone, Deserialize)]
pub struct CellIndexEntry {
    pub out_point: OutPoint,
    pub block_number: String,
    pub output: CellOutput,
    pub output_data: Option<String>,
}

/// Page wrapper returned by the indexer queries
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerPage<T> {
    pub objects: Vec<T>,
}

/// Data field of a live cell
#[derive(Debug, Clone, Deserialize)]
pub struct CellData {
    pub content: String,
}

/// Output and data of a live cell
#[derive(Debug, Clone, Deserialize)]
pub struct CellInfo {
    pub output: CellOutput,
    pub data: Option<CellData>,
}

/// `get_live_cell` result: `cell` is absent when the cell is not live
#[derive(Debug, Clone, Deserialize)]
pub struct LiveCell {
    pub cell: Option<CellInfo>,
    pub status: String,
}
