//! tracklog server
//!
//! Entry point for the GPS data HTTP API: loads configuration, connects the
//! database pool, wires the repositories into the router, and serves with
//! graceful shutdown.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use tracklog_api::{build_router, AppState, AuthState};
use tracklog_db::{
    close_pool, create_pool, pool::mask_password, DatabaseProbe, Executor, PgActivityRepository,
    PgLocationRepository, PgReferenceRepository, PgSpatialRepository, PgUnifiedRepository,
    PoolConfig,
};

use config::ServerConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Server host
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config_dir, &args.environment)
        .unwrap_or_else(|e| {
            eprintln!("warning: failed to load configuration: {e}");
            eprintln!("using default configuration");
            ServerConfig::default()
        });

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    telemetry::init_with_config(
        telemetry::TelemetryConfig::new()
            .with_log_level(config.logging.level.clone())
            .with_json_format(config.logging.json_format)
            .with_target(config.logging.include_target),
    );

    info!("starting tracklog server");
    info!(environment = %args.environment);
    info!(address = %config.bind_address());
    info!(database = %mask_password(&config.database.url));

    let pool_config = PoolConfig::new(&config.database.url)
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_seconds))
        .max_lifetime(Duration::from_secs(config.database.max_lifetime_seconds));

    let pool = create_pool(&pool_config)
        .await
        .context("failed to create database connection pool")?;

    let executor = Executor::new(pool.clone()).with_statement_timeout(Duration::from_secs(
        config.database.statement_timeout_seconds,
    ));

    let state = AppState::new(
        Arc::new(PgLocationRepository::new(executor.clone())),
        Arc::new(PgActivityRepository::new(executor.clone())),
        Arc::new(PgReferenceRepository::new(executor.clone())),
        Arc::new(PgSpatialRepository::new(executor.clone())),
        Arc::new(PgUnifiedRepository::new(executor.clone())),
        Arc::new(DatabaseProbe::new(executor)),
        config.pagination.clone(),
    );

    let auth = AuthState::new(&config.auth)
        .map_err(|e| anyhow::anyhow!("auth configuration error: {e}"))?;

    let app = build_router(state, auth);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind HTTP server")?;

    info!("listening on http://{addr}");

    if config.server.graceful_shutdown {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;
    } else {
        axum::serve(listener, app.into_make_service())
            .await
            .context("HTTP server error")?;
    }

    close_pool(&pool).await;
    info!("server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("received SIGTERM, starting graceful shutdown");
        },
    }
}
