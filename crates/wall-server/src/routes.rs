//! Read handlers over local state.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use wall_core::ChainEvent;
use wall_settings::Network;

use crate::health::{self, HealthResponse};
use crate::server::AppState;

/// Body of `GET /api/events`.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    /// Buffered events, newest first.
    pub events: Vec<ChainEvent>,
}

/// GET /api/events
pub async fn list_events(State(state): State<AppState>) -> Json<EventsResponse> {
    Json(EventsResponse {
        events: state.store.get_all(),
    })
}

/// Which chain and contract the dashboard should talk to.
#[derive(Debug, Serialize)]
pub struct NetworkInfo {
    /// Configured network.
    pub network: Network,
    /// Deployer address on that network.
    pub contract_address: String,
    /// Contract name.
    pub contract_name: String,
}

/// GET /api/network
pub async fn network_info(State(state): State<AppState>) -> Json<NetworkInfo> {
    let network = &state.settings.network;
    Json(NetworkInfo {
        network: network.network,
        contract_address: network.contract_address().to_string(),
        contract_name: network.contract_name.clone(),
    })
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, state.store.len()))
}
