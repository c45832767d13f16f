//! `WallServer`: Axum HTTP server wiring.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::Router;
use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use wall_core::EventStore;
use wall_settings::{WallSettings, DEFAULT_CHAINHOOK_SECRET};

use crate::chainhook::{self, PrintEventFilter, WebhookAuth};
use crate::proxy::{stacks, talent, UpstreamClient, UpstreamError};
use crate::routes;

/// Time allowed for in-flight requests to drain on shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to construct or start the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The shared upstream HTTP client could not be built.
    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] UpstreamError),
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address as configured, `host:port`.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Buffered chain events.
    pub store: Arc<EventStore>,
    /// Bearer check for webhook deliveries.
    pub webhook_auth: Arc<WebhookAuth>,
    /// Which receipt events count as print events.
    pub print_filter: Arc<PrintEventFilter>,
    /// Client for the Stacks and Talent proxies.
    pub upstream: Arc<UpstreamClient>,
    /// Effective settings.
    pub settings: Arc<WallSettings>,
    /// When the server was built, for uptime.
    pub start_time: Instant,
}

/// The Jackpot Wall HTTP server.
pub struct WallServer {
    state: AppState,
}

impl WallServer {
    /// Build a server over `store`. The store is shared so callers can inspect
    /// it; the server never replaces it.
    pub fn new(settings: WallSettings, store: Arc<EventStore>) -> Result<Self, ServerError> {
        let secret = match settings.chainhook.secret.as_ref() {
            Some(secret) if !secret.expose_secret().is_empty() => secret.clone(),
            _ => {
                warn!("CHAINHOOK_SECRET is not set, accepting deliveries signed with the default token");
                SecretString::from(DEFAULT_CHAINHOOK_SECRET)
            }
        };
        let upstream = UpstreamClient::new(Duration::from_millis(settings.upstream.timeout_ms))?;
        let print_filter = PrintEventFilter::new(
            settings.chainhook.print_event_type.clone(),
            settings.chainhook.print_topic.clone(),
        );

        Ok(Self {
            state: AppState {
                store,
                webhook_auth: Arc::new(WebhookAuth::new(secret)),
                print_filter: Arc::new(print_filter),
                upstream: Arc::new(upstream),
                settings: Arc::new(settings),
                start_time: Instant::now(),
            },
        })
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// The event store handlers write to.
    pub fn store(&self) -> &Arc<EventStore> {
        &self.state.store
    }

    /// Bind the configured address and serve until [`ServerHandle::shutdown`].
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let server = &self.state.settings.server;
        let addr = format!("{}:{}", server.host, server.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!(
            addr = %local_addr,
            network = %self.state.settings.network.network,
            "jackpot wall server started"
        );

        let router = self.router();
        let token = CancellationToken::new();
        let stop = token.clone();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { stop.cancelled().await })
                .await;
            if let Err(e) = result {
                warn!(error = %e, "HTTP server exited with error");
            }
        });

        Ok(ServerHandle {
            addr: local_addr,
            token,
            task,
        })
    }
}

/// Build the router over prepared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chainhook", post(chainhook::receive))
        .route("/events", post(chainhook::receive))
        .route("/api/events", get(routes::list_events))
        .route("/api/stacks", get(stacks::proxy))
        .route("/api/talent", get(talent::reputation))
        .route("/api/network", get(routes::network_info))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Handle to a running server. Dropping it leaves the server running.
pub struct ServerHandle {
    addr: SocketAddr,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Bound address, with the real port when `0` was configured.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bound port.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting connections and give in-flight requests up to
    /// `timeout` (default [`DEFAULT_DRAIN_TIMEOUT`]) to finish. Whatever is
    /// still running afterwards is aborted.
    pub async fn shutdown(self, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        info!(timeout_secs = timeout.as_secs(), "shutting down HTTP server");
        self.token.cancel();

        let abort = self.task.abort_handle();
        if tokio::time::timeout(timeout, self.task).await.is_err() {
            warn!("HTTP server did not drain within {timeout:?}, aborting open connections");
            abort.abort();
        }
    }
}
