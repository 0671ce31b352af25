//! Fee engine: capacity-conservation accounting for a single transaction.
//!
//! The settlement arithmetic is pure; only the cell gathering touches the
//! network. Callers decide what to persist.

use std::collections::HashMap;

use crate::domain::errors::{CrawlerError, DecodeError};
use crate::domain::models::{CellSnapshot, TxEconomics};
use crate::domain::services::decoder;
use crate::infrastructure::rpc::client::CkbRpcClient;
use crate::infrastructure::rpc::types::{CellOutput, TransactionView};

/// Signed (ckb, udt) deltas between resolved inputs and outputs.
///
/// The UDT delta sums token-bearing cells only; plain cells are invisible
/// to it by construction.
pub fn settle(input_cells: &[CellSnapshot], output_cells: &[CellSnapshot]) -> (i128, i128) {
    let ckb_in: i128 = input_cells.iter().map(|c| c.capacity as i128).sum();
    let ckb_out: i128 = output_cells.iter().map(|c| c.capacity as i128).sum();
    let udt_in: i128 = input_cells
        .iter()
        .filter_map(|c| c.udt_balance)
        .map(|b| b as i128)
        .sum();
    let udt_out: i128 = output_cells
        .iter()
        .filter_map(|c| c.udt_balance)
        .map(|b| b as i128)
        .sum();

    (ckb_in - ckb_out, udt_in - udt_out)
}

fn snapshot_cell(output: &CellOutput, data: &str) -> Result<CellSnapshot, DecodeError> {
    let capacity = decoder::decode_hex_u64(&output.capacity)?;
    match &output.type_script {
        None => Ok(CellSnapshot::plain(output.lock.args.clone(), capacity)),
        Some(_) => {
            let balance = decoder::decode_uint128_le(data)?;
            Ok(CellSnapshot::token_bearing(
                output.lock.args.clone(),
                capacity,
                balance,
            ))
        }
    }
}

/// Resolve every input of `tx_hash` to its originating output, classify all
/// cells, and settle the fee deltas.
pub async fn transaction_economics(
    rpc: &CkbRpcClient,
    tx_hash: &str,
) -> Result<TxEconomics, CrawlerError> {
    let tx = rpc.get_transaction(tx_hash).await?.transaction;

    // Referenced transactions are fetched once even when several inputs
    // spend outputs of the same one.
    let mut resolved: HashMap<String, TransactionView> = HashMap::new();
    let mut input_cells = Vec::with_capacity(tx.inputs.len());
    for input in &tx.inputs {
        let prev_hash = &input.previous_output.tx_hash;
        if !resolved.contains_key(prev_hash) {
            let prev = rpc.get_transaction(prev_hash).await?.transaction;
            resolved.insert(prev_hash.clone(), prev);
        }
        let prev = &resolved[prev_hash];
        let index = decoder::decode_hex_u64(&input.previous_output.index)? as usize;
        let output = prev.outputs.get(index).ok_or_else(|| {
            CrawlerError::ProcessingError(format!(
                "output index {} out of range in {}",
                index, prev_hash
            ))
        })?;
        let data = prev.outputs_data.get(index).map(String::as_str).unwrap_or("0x");
        input_cells.push(snapshot_cell(output, data)?);
    }

    let mut output_cells = Vec::with_capacity(tx.outputs.len());
    for (index, output) in tx.outputs.iter().enumerate() {
        let data = tx.outputs_data.get(index).map(String::as_str).unwrap_or("0x");
        output_cells.push(snapshot_cell(output, data)?);
    }

    let (ckb_fee, udt_fee) = settle(&input_cells, &output_cells);
    Ok(TxEconomics {
        ckb_fee,
        udt_fee,
        input_cells,
        output_cells,
    })
}
