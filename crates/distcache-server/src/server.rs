//! TCP accept loop for the line protocol.
//!
//! One task per connection (tokio), reading lines, dispatching through
//! ring lookup → circuit breaker → cache → WAL, and writing the framed
//! response. Tracks `connection_count` for the status endpoint.

use std::sync::atomic::Ordering;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::protocol::{self, Command};
use crate::{AppState, Result};

/// Binds the listener and accepts connections until shutdown is
/// requested. Returns an error (fatal at startup) if the address cannot
/// be bound.
pub async fn run(state: AppState, host: &str, port: u16) -> Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!(host, port, "tcp listener bound");

    loop {
        if state.shutdown.is_requested() {
            break;
        }

        let accept = tokio::select! {
            res = listener.accept() => res,
            () = wait_for_shutdown(&state) => break,
        };

        match accept {
            Ok((socket, peer)) => {
                let state = state.clone();
                tokio::spawn(async move {
                    handle_connection(state, socket, peer).await;
                });
            }
            Err(err) => tracing::warn!(error = %err, "accept failed"),
        }
    }

    tracing::info!("tcp listener stopped");
    Ok(())
}

async fn wait_for_shutdown(state: &AppState) {
    while !state.shutdown.is_requested() {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

async fn handle_connection(state: AppState, socket: TcpStream, peer: std::net::SocketAddr) {
    let count = state.connection_count.fetch_add(1, Ordering::SeqCst) + 1;
    state.metrics.record_active_connections(count);
    tracing::debug!(%peer, connections = count, "client connected");

    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(%peer, error = %err, "connection read error");
                break;
            }
        };

        let response = dispatch(&state, &line);
        if writer.write_all(response.as_bytes()).await.is_err() {
            break;
        }
    }

    let count = state.connection_count.fetch_sub(1, Ordering::SeqCst) - 1;
    state.metrics.record_active_connections(count);
    tracing::debug!(%peer, connections = count, "client disconnected");
}

/// Parses and executes one line of client input, returning the fully
/// framed RESP response.
///
/// Circuit breaker admits or rejects first, then the hash ring decides
/// whether this node owns the key (local) or the caller should retry
/// elsewhere, and only then does the request reach the cache.
fn dispatch(state: &AppState, line: &str) -> String {
    let start = Instant::now();
    state.metrics.increment_counter("requests_total");

    let response = match protocol::parse(line) {
        Ok(command) => {
            if state.breaker.allow_request() {
                execute(state, command)
            } else {
                state.metrics.increment_counter("breaker_rejections_total");
                protocol::serialize_error("ERR circuit breaker open")
            }
        }
        Err(reason) => {
            state.metrics.increment_counter("client_errors_total");
            protocol::serialize_error(&format!("ERR {reason}"))
        }
    };

    state.metrics.record_latency(start.elapsed());
    response
}

fn execute(state: &AppState, command: Command) -> String {
    match command {
        Command::Ping => protocol::serialize_simple("PONG"),
        Command::Get { key } => {
            let Some(response) = redirect(state, &key) else {
                return match state.cache.get(&key) {
                    Some(value) => protocol::serialize_simple(&value),
                    None => protocol::serialize_nil(),
                };
            };
            response
        }
        Command::Set { key, value } => {
            if let Some(response) = redirect(state, &key) {
                return response;
            }
            match state.wal.append(distcache_core::Op::Set, &key, Some(&value)) {
                Ok(()) => {
                    state.breaker.record_success();
                    state.cache.set(key, value, Some(state.default_ttl));
                    protocol::serialize_simple("OK")
                }
                Err(err) => server_error(state, &err),
            }
        }
        Command::Del { key } => {
            if let Some(response) = redirect(state, &key) {
                return response;
            }
            match state.wal.append(distcache_core::Op::Del, &key, None) {
                Ok(()) => {
                    state.breaker.record_success();
                    state.cache.del(&key);
                    protocol::serialize_simple("OK")
                }
                Err(err) => server_error(state, &err),
            }
        }
    }
}

/// Consults the hash ring for `key`'s owner. Returns `None` when this
/// node owns it (the request should proceed locally); otherwise returns
/// a `-MOVED` framed response naming the owning node so the caller (or a
/// smart proxy in front of it) can retry there. Ring membership is fixed
/// at seed time, so this is a routing hint, not a forward.
fn redirect(state: &AppState, key: &str) -> Option<String> {
    let owner = state.ring.get_node(key);
    if owner == state.node_id {
        None
    } else {
        state.metrics.increment_counter("redirects_total");
        Some(protocol::serialize_error(&format!("MOVED {owner}")))
    }
}

fn server_error(state: &AppState, err: &distcache_core::Error) -> String {
    if err.trips_breaker() {
        state.breaker.record_failure();
    }
    state.metrics.increment_counter("server_errors_total");
    tracing::warn!(error = %err, "request failed");
    protocol::serialize_error(&format!("ERR {err}"))
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
