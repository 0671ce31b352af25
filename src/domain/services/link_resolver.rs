//! Resolves the sibling settlement pair of a commitment transaction.
//!
//! A funding lock script is expected to show up in exactly two subsequent
//! transactions (the two parties' settlement paths). Anything else means
//! the link cannot be resolved yet; that is an expected steady state, so
//! the result is `None` rather than an error.

use serde_json::json;

use crate::domain::errors::CrawlerError;
use crate::infrastructure::rpc::client::CkbRpcClient;

const LINK_QUERY_LIMIT: &str = "0xff";

/// Walk `tx_hash`'s first input back to its funding transaction and find
/// the two transactions whose lock script exactly matches the funding
/// output's.
pub async fn resolve_linked_pair(
    rpc: &CkbRpcClient,
    tx_hash: &str,
) -> Result<Option<(String, String)>, CrawlerError> {
    let tx = rpc.get_transaction(tx_hash).await?.transaction;
    let first_input = match tx.inputs.first() {
        Some(input) => input,
        None => return Ok(None),
    };

    let funding = rpc
        .get_transaction(&first_input.previous_output.tx_hash)
        .await?
        .transaction;
    let funding_lock = match funding.outputs.first() {
        Some(output) => output.lock.clone(),
        None => return Ok(None),
    };

    let search_key = json!({
        "script": funding_lock,
        "script_type": "lock",
        "script_search_mode": "exact",
    });
    let page = rpc.get_transactions(search_key, LINK_QUERY_LIMIT).await?;

    if page.objects.len() == 2 {
        return Ok(Some((
            page.objects[0].tx_hash.clone(),
            page.objects[1].tx_hash.clone(),
        )));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};
    use tokio::time::Duration;

    use super::*;
    use crate::infrastructure::rpc::transport::test_support::ScriptedTransport;

    fn transaction_chain(transport: &ScriptedTransport) {
        let lock = json!({ "code_hash": "0xfundlock", "hash_type": "type", "args": "0x99" });
        transport.push_result(
            "get_transaction",
            json!({
                "transaction": {
                    "inputs": [
                        { "previous_output": { "tx_hash": "0xfund", "index": "0x0" } }
                    ],
                    "outputs": [],
                    "outputs_data": []
                }
            }),
        );
        transport.push_result(
            "get_transaction",
            json!({
                "transaction": {
                    "inputs": [],
                    "outputs": [
                        { "capacity": "0x64", "lock": lock, "type": null }
                    ],
                    "outputs_data": ["0x"]
                }
            }),
        );
    }

    fn index_entry(tx_hash: &str) -> Value {
        json!({
            "tx_hash": tx_hash,
            "block_number": "0x10",
            "io_index": "0x0",
            "io_type": "input"
        })
    }

    async fn resolve_with_matches(matches: Vec<Value>) -> Option<(String, String)> {
        let transport = Arc::new(ScriptedTransport::new());
        transaction_chain(&transport);
        transport.push_result("get_transactions", json!({ "objects": matches }));

        let rpc = CkbRpcClient::with_transport(transport, 1, Duration::from_millis(1));
        resolve_linked_pair(&rpc, "0xcommit").await.unwrap()
    }

    #[tokio::test]
    async fn exactly_two_matches_form_the_pair() {
        let pair = resolve_with_matches(vec![index_entry("0xaaa"), index_entry("0xbbb")]).await;
        assert_eq!(pair, Some(("0xaaa".to_string(), "0xbbb".to_string())));
    }

    #[tokio::test]
    async fn zero_matches_is_unresolved_not_an_error() {
        assert_eq!(resolve_with_matches(vec![]).await, None);
    }

    #[tokio::test]
    async fn three_matches_is_unresolved_not_an_error() {
        let pair = resolve_with_matches(vec![
            index_entry("0xaaa"),
            index_entry("0xbbb"),
            index_entry("0xccc"),
        ])
        .await;
        assert_eq!(pair, None);
    }
}
