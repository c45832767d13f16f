//! Chainhook delivery payload.
//!
//! Only the fields the receiver reads are modeled. Everything else in a
//! delivery is ignored. Fields default when absent or `null`, and receipt
//! events accept any JSON so that one odd event never sinks the batch.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A delivery that carries blocks to apply.
#[derive(Debug)]
pub struct ChainhookPayload {
    /// Newly applied blocks, never empty.
    pub apply: Vec<ApplyBlock>,
}

impl ChainhookPayload {
    /// Extract the applied blocks from a decoded delivery body.
    ///
    /// Returns `Ok(None)` when there is nothing to do: the body is not an
    /// object, `apply` is absent or not an array, or its first entry is
    /// missing or `null`. Blocks that are present but do not have the
    /// expected shape are an error.
    pub fn from_value(raw: Value) -> Result<Option<Self>, serde_json::Error> {
        let Value::Object(mut body) = raw else {
            return Ok(None);
        };
        let Some(Value::Array(apply)) = body.remove("apply") else {
            return Ok(None);
        };
        if apply.first().map_or(true, Value::is_null) {
            return Ok(None);
        }

        let apply = apply
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ApplyBlock>, _>>()?;
        Ok(Some(Self { apply }))
    }
}

/// One block from the `apply` list.
#[derive(Debug, Deserialize)]
pub struct ApplyBlock {
    /// Height and hash of the block.
    #[serde(default, deserialize_with = "null_as_default")]
    pub block_identifier: BlockIdentifier,
    /// Transactions matched by the subscription.
    #[serde(default, deserialize_with = "null_as_default")]
    pub transactions: Vec<Transaction>,
}

/// Block height and hash.
#[derive(Debug, Default, Deserialize)]
pub struct BlockIdentifier {
    /// Block height.
    #[serde(default, deserialize_with = "null_as_default")]
    pub index: u64,
    /// Block hash.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hash: String,
}

/// A transaction inside an applied block. The hash is the only required
/// field since it becomes the stored event id.
#[derive(Debug, Deserialize)]
pub struct Transaction {
    /// Transaction identity.
    pub transaction_identifier: TransactionIdentifier,
    /// Outcome and receipt.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: TransactionMetadata,
}

impl Transaction {
    /// Transaction hash.
    pub fn hash(&self) -> &str {
        &self.transaction_identifier.hash
    }

    /// Receipt events, empty when the receipt is missing.
    pub fn events(&self) -> &[ReceiptEvent] {
        self.metadata
            .receipt
            .as_ref()
            .map(|receipt| receipt.events.as_slice())
            .unwrap_or_default()
    }
}

/// Wrapper around the transaction hash.
#[derive(Debug, Deserialize)]
pub struct TransactionIdentifier {
    /// `0x`-prefixed transaction hash.
    pub hash: String,
}

/// Execution outcome of a transaction.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionMetadata {
    /// Top-level success flag. Kept loose so a non-boolean value reads as
    /// unknown instead of failing the delivery.
    #[serde(default)]
    pub success: Option<Value>,
    /// Transaction kind as reported by the indexer. Its `data` shape differs
    /// per kind.
    #[serde(default)]
    pub kind: Option<Value>,
    /// Emitted events.
    #[serde(default)]
    pub receipt: Option<Receipt>,
}

impl TransactionMetadata {
    /// Whether the transaction succeeded. Reads `success`, falling back to
    /// `kind.data.success`; a transaction reporting neither counts as failed.
    pub fn succeeded(&self) -> bool {
        self.success
            .as_ref()
            .and_then(Value::as_bool)
            .or_else(|| {
                self.kind
                    .as_ref()
                    .and_then(|kind| kind.pointer("/data/success"))
                    .and_then(Value::as_bool)
            })
            .unwrap_or(false)
    }
}

/// Transaction receipt.
#[derive(Debug, Default, Deserialize)]
pub struct Receipt {
    /// Events emitted during execution.
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<ReceiptEvent>,
}

/// One receipt event. Built from any JSON value, so events of unexpected
/// shape simply fail to match the print filter.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Value")]
pub struct ReceiptEvent {
    /// Indexer event-type discriminator, when it is a string.
    pub kind: Option<String>,
    /// Event body, `null` when absent.
    pub data: Value,
}

impl From<Value> for ReceiptEvent {
    fn from(raw: Value) -> Self {
        let Value::Object(mut fields) = raw else {
            return Self {
                kind: None,
                data: Value::Null,
            };
        };
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => Some(kind),
            _ => None,
        };
        Self {
            kind,
            data: fields.remove("data").unwrap_or(Value::Null),
        }
    }
}

impl ReceiptEvent {
    /// `data.topic` when present and a string.
    pub fn topic(&self) -> Option<&str> {
        self.data.get("topic").and_then(Value::as_str)
    }

    /// Decoded print value, `null` when absent.
    pub fn value(&self) -> Value {
        self.data.get("value").cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx(metadata: Value) -> Transaction {
        serde_json::from_value(json!({
            "transaction_identifier": {"hash": "0x01"},
            "metadata": metadata,
        }))
        .unwrap()
    }

    fn parse(raw: Value) -> Option<ChainhookPayload> {
        ChainhookPayload::from_value(raw).unwrap()
    }

    #[test]
    fn parses_full_delivery() {
        let payload = parse(json!({
            "apply": [{
                "block_identifier": {"index": 42, "hash": "0xblock"},
                "transactions": [{
                    "transaction_identifier": {"hash": "0xtx"},
                    "metadata": {
                        "success": true,
                        "receipt": {"events": [
                            {"type": "SmartContractEvent", "data": {"topic": "print", "value": {"msg": "hi"}}}
                        ]}
                    }
                }]
            }],
            "rollback": [],
            "chainhook": {"uuid": "abc"}
        }))
        .unwrap();

        let block = &payload.apply[0];
        assert_eq!(block.block_identifier.index, 42);
        let tx = &block.transactions[0];
        assert_eq!(tx.hash(), "0xtx");
        assert!(tx.metadata.succeeded());
        assert_eq!(tx.events()[0].kind.as_deref(), Some("SmartContractEvent"));
        assert_eq!(tx.events()[0].topic(), Some("print"));
        assert_eq!(tx.events()[0].value(), json!({"msg": "hi"}));
    }

    #[test]
    fn nothing_to_apply() {
        for raw in [
            json!(null),
            json!(5),
            json!("x"),
            json!(true),
            json!([]),
            json!({}),
            json!({"apply": null}),
            json!({"apply": {}}),
            json!({"apply": "nope"}),
            json!({"apply": []}),
            json!({"apply": [null]}),
        ] {
            assert!(parse(raw.clone()).is_none(), "expected nothing for {raw}");
        }
    }

    #[test]
    fn misshapen_block_is_an_error() {
        assert!(ChainhookPayload::from_value(json!({"apply": [5]})).is_err());
        assert!(
            ChainhookPayload::from_value(json!({"apply": [{"transactions": [{}]}]})).is_err()
        );
    }

    #[test]
    fn nulls_read_as_absent() {
        let payload = parse(json!({"apply": [{
            "block_identifier": null,
            "transactions": [
                {"transaction_identifier": {"hash": "0xa"}, "metadata": null},
                {"transaction_identifier": {"hash": "0xb"},
                 "metadata": {"success": true, "receipt": {"events": null}}},
            ]
        }]}))
        .unwrap();

        let block = &payload.apply[0];
        assert_eq!(block.block_identifier.index, 0);
        assert!(!block.transactions[0].metadata.succeeded());
        assert!(block.transactions[1].events().is_empty());

        let empty = parse(json!({"apply": [{"transactions": null}]})).unwrap();
        assert!(empty.apply[0].transactions.is_empty());
    }

    #[test]
    fn odd_receipt_events_still_parse() {
        let t = tx(json!({"success": true, "receipt": {"events": [
            {"type": 7, "data": {}},
            null,
            "garbage",
            {"data": {"topic": "print"}},
            {"type": "SmartContractEvent", "data": {"topic": "print", "value": 1}},
        ]}}));

        let events = t.events();
        assert_eq!(events.len(), 5);
        assert!(events[..4].iter().all(|e| e.kind.is_none()));
        assert!(events[1].data.is_null());
        assert_eq!(events[4].kind.as_deref(), Some("SmartContractEvent"));
        assert_eq!(events[4].value(), json!(1));
    }

    #[test]
    fn success_falls_back_to_kind_data() {
        assert!(tx(json!({"kind": {"type": "ContractCall", "data": {"success": true}}}))
            .metadata
            .succeeded());
        assert!(!tx(json!({"kind": {"data": {"success": false}}})).metadata.succeeded());
    }

    #[test]
    fn top_level_success_wins() {
        let t = tx(json!({"success": false, "kind": {"data": {"success": true}}}));
        assert!(!t.metadata.succeeded());
    }

    #[test]
    fn unknown_success_counts_as_failed() {
        assert!(!tx(json!({})).metadata.succeeded());
        assert!(!tx(json!({"success": "yes"})).metadata.succeeded());
        assert!(!tx(json!({"kind": {"type": "Coinbase", "data": "opaque"}})).metadata.succeeded());
    }

    #[test]
    fn missing_receipt_has_no_events() {
        assert!(tx(json!({"success": true})).events().is_empty());
    }

    #[test]
    fn value_defaults_to_null() {
        let event = ReceiptEvent::from(json!({"type": "SmartContractEvent", "data": {}}));
        assert!(event.value().is_null());
        assert_eq!(event.topic(), None);
    }

    #[test]
    fn transaction_requires_hash() {
        let result: Result<Transaction, _> = serde_json::from_value(json!({"metadata": {}}));
        assert!(result.is_err());
    }
}
