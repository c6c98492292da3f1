//! Activity reconstruction from raw transaction events.
//!
//! The `tx_search` RPC returns each transaction's ABCI event list.
//! Events carrying a `_contract_address` attribute matching the target
//! contract are inspected for an `action` attribute, and one activity
//! item is synthesized per recognized action. Block timestamps are not
//! available from this source; callers supply an approximation derived
//! from the block height.

use serde::Deserialize;

use crate::domain::views::ActivityItem;
use crate::domain::ActivityKind;

/// `tx_search` result payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TxSearchResult {
    /// Matching transactions, newest first when `order_by=desc`.
    #[serde(default)]
    pub txs: Vec<RawTx>,
}

/// One transaction as returned by `tx_search`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTx {
    /// Transaction hash (hex).
    pub hash: String,
    /// Block height, string-encoded by the RPC.
    pub height: String,
    /// Execution result carrying the emitted events.
    pub tx_result: RawTxResult,
}

/// Execution result of a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTxResult {
    /// ABCI events emitted during execution.
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// One ABCI event.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    /// Event type, e.g. `"wasm"` or `"wasm-mint"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Key/value attributes.
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
}

/// One event attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAttribute {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: String,
}

impl RawEvent {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// Parses one transaction's events into activity items for the given
/// contract. `timestamp` is the caller's block-height approximation.
#[must_use]
pub fn parse_transaction(
    tx: &RawTx,
    contract: &str,
    timestamp: i64,
    default_denom: &str,
) -> Vec<ActivityItem> {
    let block_height = tx.height.parse::<i64>().ok();
    let mut items = Vec::new();

    for event in &tx.tx_result.events {
        if !event.kind.starts_with("wasm") {
            continue;
        }
        if event.attr("_contract_address") != Some(contract) {
            continue;
        }

        let action = if event.kind == "wasm-mint" {
            Some("mint")
        } else {
            event.attr("action")
        };
        let Some(action) = action else {
            continue;
        };
        let Some(token_id) = event.attr("token_id") else {
            continue;
        };

        let item = match action {
            "mint" => Some(ActivityItem {
                kind: ActivityKind::Mint,
                from: None,
                to: event
                    .attr("owner")
                    .or_else(|| event.attr("minter"))
                    .map(str::to_string),
                price: None,
                denom: None,
                description: Some(format!("Minted Token #{token_id}")),
                ..base_item(tx, "mint", token_id, timestamp, block_height)
            }),
            "transfer_nft" => Some(ActivityItem {
                kind: ActivityKind::Transfer,
                from: event.attr("sender").map(str::to_string),
                to: event.attr("recipient").map(str::to_string),
                price: None,
                denom: None,
                description: Some(format!("Transferred Token #{token_id}")),
                ..base_item(tx, "transfer", token_id, timestamp, block_height)
            }),
            "list_token" | "list" => Some(ActivityItem {
                kind: ActivityKind::List,
                from: event.attr("seller").map(str::to_string),
                to: None,
                price: event.attr("price").map(str::to_string),
                denom: event.attr("price").map(|_| default_denom.to_string()),
                description: Some(format!("Listed Token #{token_id}")),
                ..base_item(tx, "list", token_id, timestamp, block_height)
            }),
            "delist_token" | "delist" | "cancel_listing" => Some(ActivityItem {
                kind: ActivityKind::Delist,
                from: event.attr("seller").map(str::to_string),
                to: None,
                price: None,
                denom: None,
                description: Some(format!("Delisted Token #{token_id}")),
                ..base_item(tx, "delist", token_id, timestamp, block_height)
            }),
            "buy_token" | "buy" => Some(ActivityItem {
                kind: ActivityKind::Buy,
                from: event.attr("seller").map(str::to_string),
                to: event.attr("buyer").map(str::to_string),
                price: event.attr("price").map(str::to_string),
                denom: event.attr("price").map(|_| default_denom.to_string()),
                description: Some(format!("Purchased Token #{token_id}")),
                ..base_item(tx, "buy", token_id, timestamp, block_height)
            }),
            _ => None,
        };

        if let Some(item) = item {
            items.push(item);
        }
    }

    items
}

fn base_item(
    tx: &RawTx,
    action: &str,
    token_id: &str,
    timestamp: i64,
    block_height: Option<i64>,
) -> ActivityItem {
    ActivityItem {
        id: format!("{}-{action}-{token_id}", tx.hash),
        kind: ActivityKind::Admin,
        token_id: token_id.to_string(),
        from: None,
        to: None,
        price: None,
        denom: None,
        timestamp,
        tx_hash: Some(tx.hash.clone()),
        block_height,
        description: None,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx(events: serde_json::Value) -> RawTx {
        let Ok(tx) = serde_json::from_value(json!({
            "hash": "ABC123",
            "height": "500",
            "tx_result": {"events": events}
        })) else {
            panic!("tx should decode");
        };
        tx
    }

    fn wasm_event(attrs: &[(&str, &str)]) -> serde_json::Value {
        json!({
            "type": "wasm",
            "attributes": attrs
                .iter()
                .map(|(k, v)| json!({"key": k, "value": v}))
                .collect::<Vec<_>>()
        })
    }

    #[test]
    fn mint_action_becomes_mint_activity() {
        let tx = tx(json!([wasm_event(&[
            ("_contract_address", "xion1asset"),
            ("action", "mint"),
            ("token_id", "7"),
            ("owner", "alice"),
        ])]));
        let items = parse_transaction(&tx, "xion1asset", 1_000, "uxion");
        assert_eq!(items.len(), 1);
        let Some(item) = items.first() else {
            panic!("expected an item");
        };
        assert_eq!(item.kind, ActivityKind::Mint);
        assert_eq!(item.token_id, "7");
        assert_eq!(item.to.as_deref(), Some("alice"));
        assert_eq!(item.id, "ABC123-mint-7");
        assert_eq!(item.block_height, Some(500));
    }

    #[test]
    fn buy_action_carries_price_and_parties() {
        let tx = tx(json!([wasm_event(&[
            ("_contract_address", "xion1asset"),
            ("action", "buy_token"),
            ("token_id", "7"),
            ("seller", "alice"),
            ("buyer", "bob"),
            ("price", "1000000"),
        ])]));
        let items = parse_transaction(&tx, "xion1asset", 1_000, "uxion");
        let Some(item) = items.first() else {
            panic!("expected an item");
        };
        assert_eq!(item.kind, ActivityKind::Buy);
        assert_eq!(item.from.as_deref(), Some("alice"));
        assert_eq!(item.to.as_deref(), Some("bob"));
        assert_eq!(item.price.as_deref(), Some("1000000"));
        assert_eq!(item.denom.as_deref(), Some("uxion"));
    }

    #[test]
    fn events_for_other_contracts_are_skipped() {
        let tx = tx(json!([wasm_event(&[
            ("_contract_address", "xion1other"),
            ("action", "mint"),
            ("token_id", "7"),
        ])]));
        assert!(parse_transaction(&tx, "xion1asset", 1_000, "uxion").is_empty());
    }

    #[test]
    fn non_wasm_events_and_unknown_actions_are_skipped() {
        let tx = tx(json!([
            {"type": "transfer", "attributes": [{"key": "amount", "value": "1uxion"}]},
            wasm_event(&[
                ("_contract_address", "xion1asset"),
                ("action", "update_config"),
                ("token_id", "7"),
            ]),
        ]));
        assert!(parse_transaction(&tx, "xion1asset", 1_000, "uxion").is_empty());
    }

    #[test]
    fn wasm_mint_event_type_implies_mint_action() {
        let tx = tx(json!([{
            "type": "wasm-mint",
            "attributes": [
                {"key": "_contract_address", "value": "xion1asset"},
                {"key": "token_id", "value": "3"},
                {"key": "minter", "value": "alice"},
            ]
        }]));
        let items = parse_transaction(&tx, "xion1asset", 1_000, "uxion");
        let Some(item) = items.first() else {
            panic!("expected an item");
        };
        assert_eq!(item.kind, ActivityKind::Mint);
        assert_eq!(item.to.as_deref(), Some("alice"));
    }
}
