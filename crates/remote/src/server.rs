// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP and WebSocket server implementation.
//!
//! REST handlers mutate the store; every successful mutation is fanned
//! out to connected websocket clients as a push frame.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use bk_core::{NewRecord, Record};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::ServerState;

/// Error returned by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<bk_core::Error> for ApiError {
    fn from(e: bk_core::Error) -> Self {
        match e {
            bk_core::Error::NotFound(id) => ApiError::NotFound(id),
            bk_core::Error::Duplicate(id) => ApiError::BadRequest(format!("duplicate id {}", id)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Builds the router with all endpoints.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/health", get(health))
        .route("/appointments", get(list).post(create))
        .route("/appointments/:id", put(update).delete(delete))
        .with_state(state)
}

/// Serves on an already bound listener.
pub async fn serve(listener: TcpListener, state: ServerState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Runs the server on the given address.
pub async fn run(addr: SocketAddr, state: ServerState) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", addr);
    serve(listener, state).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Record>>, ApiError> {
    Ok(Json(state.list()?))
}

async fn create(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let draft: NewRecord = parse_body(&body)?;
    validate(&draft.owner_id, &draft.subject_id, &draft.label)?;
    let record = state.create(draft)?;
    debug!(id = %record.id, "created appointment");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let record: Record = parse_body(&body)?;
    validate(&record.owner_id, &record.subject_id, &record.label)?;
    let record = state.update(&id, record)?;
    debug!(id = %record.id, "updated appointment");
    Ok(Json(record))
}

async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.delete(&id)?;
    debug!(id = %id, "deleted appointment");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn validate(owner_id: &str, subject_id: &str, label: &str) -> Result<(), ApiError> {
    for (name, value) in [
        ("userID", owner_id),
        ("practitionerID", subject_id),
        ("service", label),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("{} is required", name)));
        }
    }
    Ok(())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Pushes broadcasts to one client until either side goes away.
async fn handle_socket(socket: WebSocket, state: ServerState) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Subscribe before greeting so nothing after the greeting is missed
    let mut broadcast_rx = state.subscribe();
    if ws_sink.send(Message::Ping(Vec::new())).await.is_err() {
        return;
    }
    info!("push client connected ({} total)", state.client_count());

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }

            broadcast = broadcast_rx.recv() => {
                match broadcast {
                    Ok(event) => {
                        let json = match event.to_json() {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("failed to encode push event: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = ws_sink.send(Message::Text(json)).await {
                            warn!("Failed to send broadcast: {}", e);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!("push client lagged by {} messages", n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("push client disconnected");
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
