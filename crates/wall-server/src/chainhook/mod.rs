//! Chainhook webhook receiver.
//!
//! Deliveries are authorized with a shared bearer secret, parsed, and every
//! print event from a successful transaction is appended to the event store.
//! Any authorized delivery is acknowledged with `200` so the indexer never
//! backs off on batches that carried nothing of interest.

pub mod auth;
pub mod ingest;
pub mod payload;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::server::AppState;

pub use auth::WebhookAuth;
pub use ingest::{ingest_blocks, IngestReport, PrintEventFilter};
pub use payload::ChainhookPayload;

/// Acknowledgement returned to the indexer.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Ack {
    /// Whether the delivery carried blocks.
    pub status: AckStatus,
}

/// Outcome reported in an [`Ack`].
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    /// Blocks were processed, whether or not any event matched.
    Ok,
    /// Nothing to apply.
    Ignored,
}

/// POST /api/chainhook, POST /events
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Ack>, ApiError> {
    if !state.webhook_auth.verify(headers.get(AUTHORIZATION)) {
        warn!("chainhook delivery rejected: bad or missing bearer token");
        return Err(ApiError::Unauthorized);
    }

    let raw: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "chainhook delivery is not valid JSON");
        ApiError::MalformedPayload(e.to_string())
    })?;
    let payload = match ChainhookPayload::from_value(raw) {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            debug!("chainhook delivery has no blocks to apply");
            return Ok(Json(Ack {
                status: AckStatus::Ignored,
            }));
        }
        Err(e) => {
            warn!(error = %e, "chainhook delivery has an unexpected block shape");
            return Err(ApiError::MalformedPayload(e.to_string()));
        }
    };

    let blocks = &payload.apply;
    let report = ingest_blocks(blocks, &state.print_filter, &state.store);
    info!(
        blocks = report.blocks,
        block_heights = ?blocks.iter().map(|b| b.block_identifier.index).collect::<Vec<_>>(),
        transactions = report.transactions,
        failed_transactions = report.failed_transactions,
        ingested = report.ingested,
        buffered = state.store.len(),
        "chainhook delivery processed"
    );

    Ok(Json(Ack {
        status: AckStatus::Ok,
    }))
}
