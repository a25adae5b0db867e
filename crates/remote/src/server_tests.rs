// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use axum::body::Body;
use axum::http::Request;
use bk_core::protocol::Decoded;
use bk_core::{PushEvent, RecordState};
use chrono::{TimeZone, Utc};
use std::time::Duration;
use tower::util::ServiceExt;

fn state() -> ServerState {
    ServerState::in_memory().unwrap()
}

fn draft_json(label: &str) -> String {
    let draft = NewRecord::new(
        "user-1",
        "practitioner-1",
        label,
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    );
    serde_json::to_string(&draft).unwrap()
}

fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let response = router(state())
        .oneshot(request("GET", "/health", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_returns_201_with_server_id() {
    let state = state();
    let response = router(state.clone())
        .oneshot(request("POST", "/appointments", draft_json("Checkup")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Record = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(uuid::Uuid::parse_str(&created.id).is_ok());
    assert_eq!(created.state, RecordState::Scheduled);
    assert_eq!(state.list().unwrap(), vec![created]);
}

#[tokio::test]
async fn create_without_required_field_is_400() {
    let response = router(state())
        .oneshot(request(
            "POST",
            "/appointments",
            r#"{"userID":"u","service":"Checkup","date":"2026-03-01T09:00:00Z"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_with_blank_service_is_400() {
    let response = router(state())
        .oneshot(request("POST", "/appointments", draft_json("  ")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_returns_records_sorted_by_date() {
    let state = state();
    let late = NewRecord::new(
        "u",
        "p",
        "Late",
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    );
    let early = NewRecord::new(
        "u",
        "p",
        "Early",
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    );
    state.create(late).unwrap();
    state.create(early).unwrap();

    let response = router(state)
        .oneshot(request("GET", "/appointments", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let records: Vec<Record> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Early", "Late"]);
}

#[tokio::test]
async fn update_uses_path_identity() {
    let state = state();
    let created = state
        .create(serde_json::from_str(&draft_json("Checkup")).unwrap())
        .unwrap();
    let mut body = created.clone();
    body.id = "ignored".to_string();
    body.state = RecordState::Completed;

    let response = router(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/appointments/{}", created.id),
            serde_json::to_string(&body).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = state.list().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, created.id);
    assert_eq!(stored[0].state, RecordState::Completed);
}

#[tokio::test]
async fn update_and_delete_unknown_are_404() {
    let record = serde_json::from_str::<NewRecord>(&draft_json("Checkup"))
        .unwrap()
        .into_record("ghost");

    let response = router(state())
        .oneshot(request(
            "PUT",
            "/appointments/ghost",
            serde_json::to_string(&record).unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router(state())
        .oneshot(request("DELETE", "/appointments/ghost", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_204() {
    let state = state();
    let created = state
        .create(serde_json::from_str(&draft_json("Checkup")).unwrap())
        .unwrap();

    let response = router(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/appointments/{}", created.id),
            Body::empty(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.list().unwrap().is_empty());
}

#[tokio::test]
async fn mutations_are_broadcast() {
    let state = state();
    let mut rx = state.subscribe();

    let created = state
        .create(serde_json::from_str(&draft_json("Checkup")).unwrap())
        .unwrap();
    state.update(&created.id, created.clone()).unwrap();
    state.delete(&created.id).unwrap();

    assert_eq!(rx.recv().await.unwrap(), PushEvent::created(created.clone()));
    assert_eq!(rx.recv().await.unwrap(), PushEvent::updated(created.clone()));
    assert_eq!(rx.recv().await.unwrap(), PushEvent::deleted(created.id));
}

#[tokio::test]
async fn failed_mutation_is_not_broadcast() {
    let state = state();
    let mut rx = state.subscribe();

    assert!(state.delete("ghost").is_err());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn websocket_client_gets_ping_then_events() {
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    let state = state();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state.clone()));

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/", addr))
        .await
        .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(matches!(first, WsMessage::Ping(_)));

    let created = state
        .create(serde_json::from_str(&draft_json("Checkup")).unwrap())
        .unwrap();

    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let WsMessage::Text(text) = frame else {
        unreachable!("expected text frame, got {:?}", frame);
    };
    assert_eq!(
        PushEvent::from_json(&text).unwrap(),
        Decoded::Event(PushEvent::created(created))
    );
}

#[test]
fn core_errors_map_to_status() {
    let not_found: ApiError = bk_core::Error::NotFound("x".into()).into();
    assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

    let duplicate: ApiError = bk_core::Error::Duplicate("x".into()).into();
    assert_eq!(duplicate.into_response().status(), StatusCode::BAD_REQUEST);

    let other: ApiError = bk_core::Error::Store("poisoned".into()).into();
    assert_eq!(
        other.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
