// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel delivering other clients' changes.
//!
//! The channel keeps one receive loop running in a background task. The
//! first frame received on a fresh connection (of any kind) marks it as
//! connected. If the connection drops, a reconnect is attempted after a
//! fixed delay until [`RealtimeChannel::disconnect`] is called.
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──first frame──► Connected
//!      ▲                          │                           │
//!      └──── open/recv failure ───┴───────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bk_core::protocol::Decoded;
use bk_core::{PushEvent, Record};
use futures_util::future::BoxFuture;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::transport::{Frame, Transport, WebSocketTransport};

/// Default delay before a reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Connection state of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

impl ChannelState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ChannelState::Connecting,
            2 => ChannelState::Connected,
            _ => ChannelState::Disconnected,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ChannelState::Disconnected => 0,
            ChannelState::Connecting => 1,
            ChannelState::Connected => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelState::Disconnected => "disconnected",
            ChannelState::Connecting => "connecting",
            ChannelState::Connected => "connected",
        }
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel state visible to both the receive task and callers.
///
/// Every connect or disconnect starts a new generation. A background task
/// only writes the state while its generation is current, so a task that
/// is winding down cannot clobber the state of its successor.
#[derive(Debug, Default)]
pub struct SharedChannelState {
    state: AtomicU8,
    generation: AtomicU64,
}

impl SharedChannelState {
    pub fn get(&self) -> ChannelState {
        ChannelState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Starts a new generation in the given state and returns its number.
    fn advance(&self, state: ChannelState) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.store(state.as_u8(), Ordering::Release);
        generation
    }

    /// Sets the state if `generation` is still current.
    fn set(&self, generation: u64, state: ChannelState) -> bool {
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        self.state.store(state.as_u8(), Ordering::Release);
        true
    }
}

/// Receiver of decoded push events.
///
/// Implemented by the sync coordinator. Callbacks run on the channel's
/// receive task, one at a time, in frame order.
pub trait ChannelHandler: Send + Sync {
    /// The first frame arrived on a fresh connection.
    fn on_connected(&self) -> BoxFuture<'_, ()>;

    /// Another client created a record.
    fn on_created(&self, record: Record) -> BoxFuture<'_, ()>;

    /// A record was updated.
    fn on_updated(&self, record: Record) -> BoxFuture<'_, ()>;

    /// A record was deleted.
    fn on_deleted(&self, id: String) -> BoxFuture<'_, ()>;
}

/// Builds a fresh transport for each connection attempt.
pub type TransportFactory = Arc<dyn Fn() -> Box<dyn Transport> + Send + Sync>;

/// Configuration for the push channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Push URL (`ws://` or `wss://`).
    pub url: String,
    /// Delay between a failure and the next attempt.
    pub reconnect_delay: Duration,
}

impl ChannelConfig {
    /// Derives the channel configuration from the REST base URL.
    pub fn for_base_url(base_url: &str) -> Self {
        ChannelConfig {
            url: push_url(base_url),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Derives the push URL from a REST base URL by swapping the scheme.
///
/// `http` becomes `ws` and `https` becomes `wss`. URLs already using a
/// websocket scheme are returned unchanged.
pub fn push_url(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base_url.to_string()
    }
}

struct ChannelInner {
    config: ChannelConfig,
    handler: Arc<dyn ChannelHandler>,
    factory: TransportFactory,
    state: SharedChannelState,
}

/// Persistent push connection to the service.
pub struct RealtimeChannel {
    inner: Arc<ChannelInner>,
    /// Token of the running receive task, cancelled by `disconnect()`.
    cancel_token: Mutex<CancellationToken>,
}

impl RealtimeChannel {
    /// Creates a channel over real websockets.
    pub fn new(config: ChannelConfig, handler: Arc<dyn ChannelHandler>) -> Self {
        let factory: TransportFactory =
            Arc::new(|| Box::new(WebSocketTransport::new()) as Box<dyn Transport>);
        Self::with_transport_factory(config, handler, factory)
    }

    /// Creates a channel with an injected transport factory.
    pub fn with_transport_factory(
        config: ChannelConfig,
        handler: Arc<dyn ChannelHandler>,
        factory: TransportFactory,
    ) -> Self {
        RealtimeChannel {
            inner: Arc::new(ChannelInner {
                config,
                handler,
                factory,
                state: SharedChannelState::default(),
            }),
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        self.inner.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ChannelState::Connected
    }

    pub fn url(&self) -> &str {
        &self.inner.config.url
    }

    /// Opens the channel.
    ///
    /// No-op while connecting or connected. While waiting for a scheduled
    /// reconnect this attempts immediately instead.
    pub async fn connect(&self) {
        let mut token = self.cancel_token.lock().await;
        if self.state() != ChannelState::Disconnected {
            return;
        }

        // Supersede a task sleeping before its reconnect
        token.cancel();
        *token = CancellationToken::new();

        let generation = self.inner.state.advance(ChannelState::Connecting);
        tracing::info!(url = %self.inner.config.url, "opening push channel");

        let inner = Arc::clone(&self.inner);
        let task_token = token.clone();
        tokio::spawn(async move {
            run(inner, generation, task_token).await;
        });
    }

    /// Closes the channel and cancels any scheduled reconnect.
    ///
    /// No further attempts are made until `connect()` is called again.
    pub async fn disconnect(&self) {
        let token = self.cancel_token.lock().await;
        token.cancel();
        self.inner.state.advance(ChannelState::Disconnected);
        tracing::info!("push channel closed");
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.cancel_token.get_mut().cancel();
    }
}

/// Connect, receive until failure, wait, repeat. Exits on cancellation.
async fn run(inner: Arc<ChannelInner>, generation: u64, cancel_token: CancellationToken) {
    loop {
        inner.state.set(generation, ChannelState::Connecting);
        let mut transport = (inner.factory)();

        let connect_result = tokio::select! {
            _ = cancel_token.cancelled() => return,
            result = transport.connect(&inner.config.url) => result,
        };

        match connect_result {
            Ok(()) => {
                if receive(&inner, generation, &cancel_token, transport.as_mut()).await {
                    return;
                }
            }
            Err(e) => tracing::warn!("push channel connect failed: {}", e),
        }

        if !inner.state.set(generation, ChannelState::Disconnected) {
            return;
        }
        tracing::debug!(delay = ?inner.config.reconnect_delay, "scheduling reconnect");

        tokio::select! {
            _ = cancel_token.cancelled() => return,
            _ = tokio::time::sleep(inner.config.reconnect_delay) => {}
        }
    }
}

/// Runs the receive loop on an open transport.
///
/// Returns true if the loop ended because of cancellation.
async fn receive(
    inner: &ChannelInner,
    generation: u64,
    cancel_token: &CancellationToken,
    transport: &mut dyn Transport,
) -> bool {
    let mut announced = false;

    loop {
        let received = tokio::select! {
            _ = cancel_token.cancelled() => {
                let _ = transport.disconnect().await;
                return true;
            }
            result = transport.recv() => result,
        };

        match received {
            Ok(Some(frame)) => {
                if !announced {
                    announced = true;
                    if inner.state.set(generation, ChannelState::Connected) {
                        tracing::info!("push channel connected");
                        inner.handler.on_connected().await;
                    }
                }
                dispatch(inner.handler.as_ref(), frame).await;
            }
            Ok(None) => {
                tracing::info!("push channel closed by server");
                return false;
            }
            Err(e) => {
                tracing::warn!("push channel receive failed: {}", e);
                return false;
            }
        }
    }
}

/// Decodes a frame and hands the event to the handler.
async fn dispatch(handler: &dyn ChannelHandler, frame: Frame) {
    let text = match frame {
        Frame::Text(text) => text,
        Frame::Binary(data) => match String::from_utf8(data) {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!("dropping non-UTF-8 binary frame");
                return;
            }
        },
        Frame::Control => return,
    };

    match PushEvent::from_json(&text) {
        Ok(Decoded::Event(PushEvent::Created(record))) => handler.on_created(record).await,
        Ok(Decoded::Event(PushEvent::Updated(record))) => handler.on_updated(record).await,
        Ok(Decoded::Event(PushEvent::Deleted(id))) => handler.on_deleted(id).await,
        Ok(Decoded::Unknown(kind)) => {
            tracing::warn!(kind = %kind, "dropping unknown push event");
        }
        Err(e) => tracing::warn!("dropping undecodable push frame: {}", e),
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
