//! Status endpoint: cache stats, WAL backlog, breaker state, ring
//! membership, and connection/latency metrics, expressed as JSON.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::AppState;

/// `GET /status` — a snapshot of cache, WAL, ring, breaker, and metrics
/// state for operators and health checks.
pub async fn status_report(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.cache.stats();
    let pending_wal_ops = state.wal.pending_ops();
    let metrics = state.metrics.snapshot();

    Json(serde_json::json!({
        "node_id": state.node_id,
        "cache": {
            "size": state.cache.size(),
            "capacity": state.cache.capacity(),
            "hits": stats.hits,
            "misses": stats.misses,
            "evictions": stats.evictions,
            "hit_rate": stats.hit_rate(),
        },
        "wal": {
            "pending_ops": pending_wal_ops,
        },
        "breaker": {
            "state": state.breaker.state().as_str(),
            "failure_count": state.breaker.failure_count(),
        },
        "ring": {
            "nodes": state.ring.get_all_nodes(),
        },
        "discovery": {
            "alive_nodes": state
                .discovery
                .get_alive_nodes()
                .into_iter()
                .map(|n| n.node_id)
                .collect::<Vec<_>>(),
        },
        "metrics": metrics,
    }))
}
