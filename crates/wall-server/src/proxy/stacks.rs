//! Hiro Stacks API passthrough.

use axum::extract::{Query, State};
use axum::Json;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::error;
use wall_settings::Network;

use super::upstream::join_path;
use crate::error::ApiError;
use crate::server::AppState;

const FAILURE: &str = "Failed to fetch from Stacks API";

/// Query string of `GET /api/stacks`.
#[derive(Debug, Default, Deserialize)]
pub struct StacksQuery {
    /// Upstream path including any query string, e.g. `/v2/info`.
    pub path: Option<String>,
    /// `"true"` selects mainnet, any other value testnet. Absent falls back
    /// to the configured network.
    pub mainnet: Option<String>,
}

impl StacksQuery {
    /// Network selected by `mainnet`, or `default` when it is absent.
    pub fn network(&self, default: Network) -> Network {
        match self.mainnet.as_deref() {
            Some("true") => Network::Mainnet,
            Some(_) => Network::Testnet,
            None => default,
        }
    }
}

/// GET /api/stacks
pub async fn proxy(
    State(state): State<AppState>,
    Query(query): Query<StacksQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = query
        .path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingParameter("Path is required"))?;
    if !path.starts_with('/') {
        return Err(ApiError::InvalidParameter("Path must start with '/'".into()));
    }

    let upstream = &state.settings.upstream;
    let network = query.network(state.settings.network.network);
    let url = join_path(upstream.stacks_url(network), path).map_err(|source| {
        error!(error = %source, %network, "stacks proxy URL rejected");
        ApiError::Upstream {
            message: FAILURE,
            source,
        }
    })?;

    let api_key = upstream.hiro_api_key.as_ref().map(|k| k.expose_secret());
    let headers: Vec<(&'static str, &str)> =
        api_key.map(|key| ("x-api-key", key)).into_iter().collect();

    state
        .upstream
        .get_json(url, &headers)
        .await
        .map(Json)
        .map_err(|source| {
            error!(error = %source, %network, path, "stacks API proxy error");
            ApiError::Upstream {
                message: FAILURE,
                source,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(mainnet: Option<&str>) -> StacksQuery {
        StacksQuery {
            path: Some("/v2/info".into()),
            mainnet: mainnet.map(String::from),
        }
    }

    #[test]
    fn explicit_selector() {
        assert_eq!(query(Some("true")).network(Network::Testnet), Network::Mainnet);
        assert_eq!(query(Some("false")).network(Network::Mainnet), Network::Testnet);
        assert_eq!(query(Some("1")).network(Network::Mainnet), Network::Testnet);
    }

    #[test]
    fn absent_selector_uses_default() {
        assert_eq!(query(None).network(Network::Mainnet), Network::Mainnet);
        assert_eq!(query(None).network(Network::Testnet), Network::Testnet);
    }
}
