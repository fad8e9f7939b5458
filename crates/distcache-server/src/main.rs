//! `distcache-server` binary: CLI argument parsing, configuration
//! loading, TCP line-protocol server, HTTP status endpoint, heartbeat
//! discovery, and graceful shutdown on SIGINT/SIGTERM.
//!
//! Exit codes: `0` on clean shutdown, non-zero on a fatal startup error
//! (cannot bind a listener, cannot open the WAL for append). Runtime
//! errors never exit the process.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use distcache_core::DistCacheConfig;
use distcache_server::handlers::{health_check, status_report};
use distcache_server::{server, AppState};

/// Command-line arguments, layered on top of `distcache.toml` and
/// `DISTCACHE_*` environment variables.
#[derive(Parser, Debug)]
#[command(
    name = "distcache-server",
    version,
    about = "Distributed in-memory key-value cache with a Redis-compatible line protocol"
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "distcache.toml", env = "DISTCACHE_CONFIG")]
    config: String,

    /// Host address to bind the TCP and HTTP listeners to.
    #[arg(long, env = "DISTCACHE_SERVER_HOST")]
    host: Option<String>,

    /// TCP port for the line protocol (Redis-compatible default: 6379).
    #[arg(short, long, env = "DISTCACHE_SERVER_PORT")]
    port: Option<u16>,

    /// HTTP port for the status endpoint.
    #[arg(long, env = "DISTCACHE_SERVER_HTTP_PORT")]
    http_port: Option<u16>,

    /// Path to the write-ahead log file.
    #[arg(long, env = "DISTCACHE_WAL_PATH")]
    wal_path: Option<String>,

    /// Path to the snapshot file.
    #[arg(long, env = "DISTCACHE_SNAPSHOT_PATH")]
    snapshot_path: Option<String>,

    /// Maximum number of entries the cache holds.
    #[arg(long, env = "DISTCACHE_CAPACITY")]
    capacity: Option<usize>,

    /// This node's identifier on the hash ring.
    #[arg(long, env = "DISTCACHE_NODE_ID")]
    node_id: Option<String>,

    /// Comma-separated seed node ids added to the hash ring at startup.
    #[arg(long, value_delimiter = ',', env = "DISTCACHE_SEED_NODES")]
    seed_nodes: Vec<String>,
}

fn apply_overrides(mut config: DistCacheConfig, args: &Args) -> DistCacheConfig {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(http_port) = args.http_port {
        config.server.http_port = http_port;
    }
    if let Some(path) = &args.wal_path {
        config.wal.path = path.clone();
    }
    if let Some(path) = &args.snapshot_path {
        config.snapshot.path = path.clone();
    }
    if let Some(capacity) = args.capacity {
        config.cache.capacity = capacity;
    }
    if let Some(node_id) = &args.node_id {
        config.ring.node_id = node_id.clone();
    }
    if !args.seed_nodes.is_empty() {
        config.ring.seed_nodes.clone_from(&args.seed_nodes);
    }
    config
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match DistCacheConfig::load_from_path(&args.config) {
        Ok(config) => apply_overrides(config, &args),
        Err(err) => {
            eprintln!("fatal: failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let state = match AppState::new(&config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "fatal startup error");
            return ExitCode::FAILURE;
        }
    };

    let report = match distcache_core::recover(
        &state.cache,
        &state.wal,
        &state.snapshot,
        state.default_ttl,
    ) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "fatal startup error during recovery");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        loaded_from_snapshot = report.loaded_from_snapshot,
        replayed_from_wal = report.replayed_from_wal,
        "recovery complete"
    );

    let sweeper = {
        let state = state.clone();
        distcache_core::spawn_sweeper(
            Arc::clone(&state.cache),
            Duration::from_secs(config.snapshot.interval_secs),
            state.shutdown.clone(),
            move |removed| {
                if removed > 0 {
                    tracing::debug!(removed, "sweeper pass removed expired entries");
                }
                let entries: Vec<_> = state
                    .cache
                    .snapshot_entries()
                    .into_iter()
                    .map(|(key, value, ttl)| (key, value, Some(ttl)))
                    .collect();
                let snapshot = Arc::clone(&state.snapshot);
                let wal = Arc::clone(&state.wal);
                tokio::spawn(async move {
                    match snapshot.async_snapshot(entries).await {
                        Ok(Ok(())) => {
                            // The WAL is truncated only once this snapshot has
                            // landed durably, per the recovery protocol: a
                            // crash before this point must still find every
                            // mutation in the (untruncated) WAL.
                            if let Err(err) = wal.truncate() {
                                tracing::error!(error = %err, "WAL truncate after snapshot failed");
                            }
                        }
                        Ok(Err(err)) => {
                            tracing::error!(error = %err, "snapshot failed, WAL left untruncated");
                        }
                        Err(join_err) => {
                            tracing::error!(error = %join_err, "snapshot task panicked");
                        }
                    }
                });
            },
        )
    };

    let discovery_task = {
        let discovery = Arc::clone(&state.discovery);
        let shutdown = state.shutdown.clone();
        let interval = discovery.heartbeat_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if shutdown.is_requested() {
                    break;
                }
                discovery.broadcast_heartbeat();
            }
        })
    };

    let http_listener = match tokio::net::TcpListener::bind((
        config.server.host.as_str(),
        config.server.http_port,
    ))
    .await
    {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, "fatal: cannot bind HTTP status listener");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        host = %config.server.host,
        port = config.server.http_port,
        "http status endpoint bound"
    );

    let http_router = Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let http_shutdown = state.shutdown.clone();
    let http_task = tokio::spawn(async move {
        axum::serve(http_listener, http_router)
            .with_graceful_shutdown(poll_shutdown(http_shutdown))
            .await
    });

    let run_result = tokio::select! {
        res = server::run(state.clone(), &config.server.host, config.server.port) => res,
        () = wait_for_signal() => {
            tracing::info!("shutdown signal received");
            Ok(())
        }
    };

    state.shutdown.request();
    sweeper.join().await;
    discovery_task.abort();
    let _ = http_task.await;

    match run_result {
        Ok(()) => {
            tracing::info!("clean shutdown");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "server loop exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn poll_shutdown(shutdown: distcache_core::ShutdownFlag) {
    while !shutdown.is_requested() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Waits for SIGINT or SIGTERM (Unix) or Ctrl-C (other platforms),
/// driving the cooperative shutdown flag.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
