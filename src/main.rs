//! `jackpot-wall` binary: loads settings, starts the server, waits for a
//! shutdown signal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use wall_core::EventStore;
use wall_server::WallServer;
use wall_telemetry::{LogFormat, TelemetryConfig};

/// Jackpot Wall backend: Chainhook receiver, event feed and API proxies.
#[derive(Debug, Parser)]
#[command(name = "jackpot-wall", version, about)]
struct Cli {
    /// Settings file (defaults to ./jackpot-wall.json when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind host, overrides settings and WALL_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides settings and WALL_PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Log output format.
    #[arg(long, value_parser = parse_log_format, default_value = "json")]
    log_format: LogFormat,
}

fn parse_log_format(val: &str) -> Result<LogFormat, String> {
    LogFormat::parse(val).ok_or_else(|| format!("unknown log format {val:?}, expected json or pretty"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    wall_telemetry::init_telemetry(&TelemetryConfig {
        format: cli.log_format,
        ..TelemetryConfig::default()
    })
    .context("failed to initialize logging")?;

    let path = cli.config.unwrap_or_else(wall_settings::settings_path);
    let mut settings = wall_settings::load_settings_from_path(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    tracing::info!(
        network = %settings.network.network,
        contract = settings.network.contract_address(),
        "starting jackpot wall"
    );

    let store = Arc::new(EventStore::new());
    let server = WallServer::new(settings, store).context("failed to build server")?;
    let handle = server.start().await.context("failed to start server")?;

    tracing::info!(addr = %handle.addr(), "jackpot wall ready");

    shutdown_signal().await;
    handle.shutdown(None).await;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                let _ = sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["jackpot-wall"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::try_parse_from([
            "jackpot-wall",
            "--config",
            "/etc/wall.json",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-format",
            "pretty",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/wall.json")));
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn cli_rejects_bad_log_format() {
        assert!(Cli::try_parse_from(["jackpot-wall", "--log-format", "xml"]).is_err());
    }
}
