//! # falkoga-server
//!
//! The serving boundary: WebSocket fan-out of the live stream plus the
//! HTTP read API (health, stats, history, prometheus metrics). All
//! pipeline behavior lives in `falkoga-engine`; this crate only bridges
//! it onto transports.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use falkoga_engine::{EngineError, Runtime};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Binds and serves until the listener fails or the process stops.
pub async fn serve(runtime: Arc<Runtime>, listen: String) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!(addr = %listen, "serving boundary listening");
    axum::serve(listener, router(runtime)).await?;
    Ok(())
}

fn router(runtime: Arc<Runtime>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_upgrade))
        .route("/api/stats", get(stats))
        .route("/api/history", get(history))
        .route("/metrics", get(metrics))
        .with_state(runtime)
}

fn dependency_label(online: bool) -> &'static str {
    if online {
        "online"
    } else {
        "offline"
    }
}

async fn health(State(runtime): State<Arc<Runtime>>) -> Json<serde_json::Value> {
    let status = runtime.status();
    Json(json!({
        "status": "ok",
        "storage": dependency_label(status.storage_online),
        "relay": dependency_label(status.relay_online),
    }))
}

async fn ws_upgrade(State(runtime): State<Arc<Runtime>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| subscriber_session(runtime, socket))
}

/// Bridges one hub subscription onto one socket. The session ends when
/// either side closes; the subscriber is always deregistered.
async fn subscriber_session(runtime: Arc<Runtime>, mut socket: WebSocket) {
    let (id, mut frames) = runtime.subscribe();
    debug!(id, "viewer connected");

    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Some(frame) = frame else { break };
                if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    // viewers are passive; anything they send is discarded
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    runtime.unsubscribe(id);
    debug!(id, "viewer disconnected");
}

async fn stats(State(runtime): State<Arc<Runtime>>) -> impl IntoResponse {
    Json(runtime.snapshot().await)
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    from: i64,
    to: i64,
}

async fn history(
    State(runtime): State<Arc<Runtime>>,
    Query(params): Query<HistoryParams>,
) -> Response {
    match runtime.history(params.from, params.to).await {
        Ok(events) => Json(events).into_response(),
        Err(EngineError::StorageOffline) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "storage offline"})),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "history query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "query failed"})),
            )
                .into_response()
        }
    }
}

async fn metrics(State(runtime): State<Arc<Runtime>>) -> Response {
    match runtime.metrics().gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "metrics gathering failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
