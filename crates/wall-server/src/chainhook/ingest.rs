//! Print-event extraction from applied blocks.

use tracing::debug;
use wall_core::{EventKind, EventStore, NewEvent};

use super::payload::{ApplyBlock, ReceiptEvent};

/// Decides which receipt events are contract print events.
#[derive(Clone, Debug)]
pub struct PrintEventFilter {
    event_type: String,
    topic: String,
}

impl PrintEventFilter {
    /// Filter on an exact event `type` and the expected `data.topic`.
    pub fn new(event_type: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            topic: topic.into(),
        }
    }

    /// Exact match on the event type; the topic is checked only when the
    /// event carries one.
    pub fn matches(&self, event: &ReceiptEvent) -> bool {
        event.kind.as_deref() == Some(self.event_type.as_str())
            && event.topic().map_or(true, |t| t == self.topic)
    }
}

/// What one delivery did to the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Blocks in the delivery.
    pub blocks: usize,
    /// Transactions seen across all blocks.
    pub transactions: usize,
    /// Transactions skipped because they did not succeed.
    pub failed_transactions: usize,
    /// Events appended to the store.
    pub ingested: usize,
}

/// Append every print event from successful transactions to the store.
pub fn ingest_blocks(
    blocks: &[ApplyBlock],
    filter: &PrintEventFilter,
    store: &EventStore,
) -> IngestReport {
    let mut report = IngestReport {
        blocks: blocks.len(),
        ..IngestReport::default()
    };

    for block in blocks {
        debug!(
            block_height = block.block_identifier.index,
            block_hash = %block.block_identifier.hash,
            transactions = block.transactions.len(),
            "processing block"
        );

        for tx in &block.transactions {
            report.transactions += 1;
            if !tx.metadata.succeeded() {
                report.failed_transactions += 1;
                continue;
            }

            for event in tx.events().iter().filter(|e| filter.matches(e)) {
                let stored = store.add(NewEvent::new(tx.hash(), EventKind::NewPost, event.value()));
                debug!(tx = %stored.id, timestamp = stored.timestamp, "event captured");
                report.ingested += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn filter() -> PrintEventFilter {
        PrintEventFilter::new("SmartContractEvent", "print")
    }

    fn event(value: Value) -> ReceiptEvent {
        serde_json::from_value(value).unwrap()
    }

    fn blocks(value: Value) -> Vec<ApplyBlock> {
        serde_json::from_value(value).unwrap()
    }

    fn print(value: Value) -> Value {
        json!({"type": "SmartContractEvent", "data": {"topic": "print", "value": value}})
    }

    fn tx(hash: &str, success: bool, events: Vec<Value>) -> Value {
        json!({
            "transaction_identifier": {"hash": hash},
            "metadata": {"success": success, "receipt": {"events": events}}
        })
    }

    #[test]
    fn filter_requires_exact_type() {
        let f = filter();
        assert!(f.matches(&event(print(json!(1)))));
        for kind in ["SmartContractEvents", "smartcontractevent", "Smart", "STXTransferEvent", ""] {
            let e = event(json!({"type": kind, "data": {"topic": "print"}}));
            assert!(!f.matches(&e), "matched {kind:?}");
        }
    }

    #[test]
    fn filter_skips_non_string_type() {
        let f = filter();
        for raw in [
            json!({"type": 7, "data": {"topic": "print"}}),
            json!({"type": null, "data": {"topic": "print"}}),
            json!({"data": {"topic": "print"}}),
            json!(["SmartContractEvent"]),
        ] {
            assert!(!f.matches(&event(raw.clone())), "matched {raw}");
        }
    }

    #[test]
    fn filter_checks_topic_when_present() {
        let f = filter();
        let other_topic = event(json!({"type": "SmartContractEvent", "data": {"topic": "log"}}));
        assert!(!f.matches(&other_topic));
        let no_topic = event(json!({"type": "SmartContractEvent", "data": {"value": 1}}));
        assert!(f.matches(&no_topic));
    }

    #[test]
    fn one_matching_event_is_stored_under_tx_hash() {
        let store = EventStore::new();
        let b = blocks(json!([{
            "block_identifier": {"index": 7, "hash": "0xb"},
            "transactions": [tx("0xtx1", true, vec![print(json!({"message": "gm"}))])]
        }]));

        let report = ingest_blocks(&b, &filter(), &store);

        assert_eq!(report.ingested, 1);
        let events = store.get_all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "0xtx1");
        assert_eq!(events[0].kind, EventKind::NewPost);
        assert_eq!(events[0].data, json!({"message": "gm"}));
    }

    #[test]
    fn failed_transactions_are_skipped() {
        let store = EventStore::new();
        let b = blocks(json!([{
            "transactions": [tx("0xbad", false, vec![print(json!(1)), print(json!(2))])]
        }]));

        let report = ingest_blocks(&b, &filter(), &store);

        assert_eq!(report.failed_transactions, 1);
        assert_eq!(report.ingested, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn non_print_events_are_skipped() {
        let store = EventStore::new();
        let b = blocks(json!([{
            "transactions": [tx("0x1", true, vec![
                json!({"type": "STXTransferEvent", "data": {"amount": "1000000"}}),
                print(json!("kept")),
            ])]
        }]));

        let report = ingest_blocks(&b, &filter(), &store);

        assert_eq!(report.ingested, 1);
        assert_eq!(store.get_all()[0].data, json!("kept"));
    }

    #[test]
    fn odd_neighbours_do_not_block_good_events() {
        let store = EventStore::new();
        let b = blocks(json!([{
            "transactions": [
                {
                    "transaction_identifier": {"hash": "0xnull"},
                    "metadata": {"success": true, "receipt": {"events": null}}
                },
                tx("0xgood", true, vec![json!({"type": 7, "data": {}}), print(json!("kept"))]),
            ]
        }]));

        let report = ingest_blocks(&b, &filter(), &store);

        assert_eq!(report.ingested, 1);
        let events = store.get_all();
        assert_eq!(events[0].id, "0xgood");
        assert_eq!(events[0].data, json!("kept"));
    }

    #[test]
    fn multiple_blocks_keep_delivery_order_newest_first() {
        let store = EventStore::new();
        let b = blocks(json!([
            {"transactions": [tx("0xa", true, vec![print(json!(1))])]},
            {"transactions": [
                tx("0xb", true, vec![print(json!(2)), print(json!(3))]),
                tx("0xc", false, vec![print(json!(4))]),
            ]},
        ]));

        let report = ingest_blocks(&b, &filter(), &store);

        assert_eq!(
            report,
            IngestReport {
                blocks: 2,
                transactions: 3,
                failed_transactions: 1,
                ingested: 3,
            }
        );
        let ids: Vec<_> = store.get_all().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["0xb", "0xb", "0xa"]);
    }

    #[test]
    fn custom_discriminator() {
        let store = EventStore::new();
        let f = PrintEventFilter::new("smart_contract_log", "print");
        let b = blocks(json!([{
            "transactions": [tx("0x1", true, vec![
                json!({"type": "smart_contract_log", "data": {"value": "x"}}),
                print(json!("y")),
            ])]
        }]));

        let report = ingest_blocks(&b, &f, &store);

        assert_eq!(report.ingested, 1);
        assert_eq!(store.get_all()[0].data, json!("x"));
    }
}
