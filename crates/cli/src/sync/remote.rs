// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response client for the appointment REST service.
//!
//! [`RemoteApi`] is the seam the coordinator talks through; [`HttpRemote`]
//! is the production implementation over `reqwest`. Every call is stateless
//! and idempotent by identifier.

use std::time::Duration;

use bk_core::{NewRecord, Record};
use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Error type for remote operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (connect, timeout, reset).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The server answered with an unexpected status code.
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    /// The response body could not be decoded.
    #[error("invalid server response: {0}")]
    Decoding(String),
}

impl RemoteError {
    /// Returns the HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns true if the failure means the service itself is down.
    pub fn is_outage(&self) -> bool {
        match self {
            RemoteError::Unreachable(_) => true,
            RemoteError::HttpStatus(code) => *code >= 500,
            RemoteError::Decoding(_) => false,
        }
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Unreachable(_) => {
                "Server unreachable. Changes are saved on this device.".to_string()
            }
            RemoteError::HttpStatus(400) => "The server rejected the appointment.".to_string(),
            RemoteError::HttpStatus(404) => "Appointment not found on the server.".to_string(),
            RemoteError::HttpStatus(code) if *code >= 500 => {
                format!("Server error ({code}). Changes are saved on this device.")
            }
            RemoteError::HttpStatus(code) => format!("Unexpected server response ({code})."),
            RemoteError::Decoding(_) => "The server sent data this app cannot read.".to_string(),
        }
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The remote appointment service.
pub trait RemoteApi: Send + Sync {
    /// Lightweight availability check. Never fails, only answers.
    fn probe(&self) -> BoxFuture<'_, bool>;

    /// `GET /appointments`.
    fn fetch_all(&self) -> BoxFuture<'_, RemoteResult<Vec<Record>>>;

    /// `POST /appointments`; the server assigns the id.
    fn create<'a>(&'a self, draft: &'a NewRecord) -> BoxFuture<'a, RemoteResult<Record>>;

    /// `PUT /appointments/{id}`.
    fn update<'a>(&'a self, record: &'a Record) -> BoxFuture<'a, RemoteResult<Record>>;

    /// `DELETE /appointments/{id}`.
    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, RemoteResult<()>>;
}

/// Default timeout for regular requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default timeout for the availability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// [`RemoteApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpRemote {
    /// Create a client for the service at `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, DEFAULT_REQUEST_TIMEOUT, DEFAULT_PROBE_TIMEOUT)
    }

    /// Create a client with explicit request and probe timeouts.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        request_timeout: Duration,
        probe_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpRemote {
            client: reqwest::Client::new(),
            base_url,
            request_timeout,
            probe_timeout,
        }
    }

    /// The REST base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/appointments", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/appointments/{}", self.base_url, id)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        expected: StatusCode,
    ) -> RemoteResult<reqwest::Response> {
        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| RemoteError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status != expected {
            tracing::debug!(%status, %expected, "unexpected status from server");
            return Err(RemoteError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> RemoteResult<T> {
        // Body read failures are transport problems, parse failures are not
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Unreachable(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| RemoteError::Decoding(e.to_string()))
    }
}

impl RemoteApi for HttpRemote {
    fn probe(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let url = format!("{}/health", self.base_url);
            match self
                .client
                .get(&url)
                .timeout(self.probe_timeout)
                .send()
                .await
            {
                Ok(response) => response.status() == StatusCode::OK,
                Err(e) => {
                    tracing::debug!("probe failed: {}", e);
                    false
                }
            }
        })
    }

    fn fetch_all(&self) -> BoxFuture<'_, RemoteResult<Vec<Record>>> {
        Box::pin(async move {
            let request = self.client.get(self.collection_url());
            let response = self.send(request, StatusCode::OK).await?;
            Self::decode(response).await
        })
    }

    fn create<'a>(&'a self, draft: &'a NewRecord) -> BoxFuture<'a, RemoteResult<Record>> {
        Box::pin(async move {
            let request = self.client.post(self.collection_url()).json(draft);
            let response = self.send(request, StatusCode::CREATED).await?;
            Self::decode(response).await
        })
    }

    fn update<'a>(&'a self, record: &'a Record) -> BoxFuture<'a, RemoteResult<Record>> {
        Box::pin(async move {
            let request = self.client.put(self.item_url(&record.id)).json(record);
            let response = self.send(request, StatusCode::OK).await?;
            Self::decode(response).await
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, RemoteResult<()>> {
        Box::pin(async move {
            let request = self.client.delete(self.item_url(id));
            self.send(request, StatusCode::NO_CONTENT).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
