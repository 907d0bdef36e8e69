//! Session lifecycle with reconnection.
//!
//! A session ties together one [`PushClient`], the SSE stream it opens,
//! and a [`SyncListener`] applying events to the stores. When the
//! stream dies the session reconnects with capped exponential backoff;
//! shutdown cancels everything promptly.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::sync::{EventDispatcher, SyncListener};

use super::client::{ConnectError, PushClient, PushStream};

/// Session connection state, observable through a watch channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Connected,
    Reconnecting { attempt: u8 },
    Disconnected,
}

/// Configuration for a push session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub project_key: String,
    pub languages: Vec<String>,
    pub max_retries: u8,
    pub max_backoff_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            token: None,
            project_key: String::new(),
            languages: Vec::new(),
            max_retries: 5,
            max_backoff_secs: 30,
        }
    }
}

/// Error type for session startup.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to push endpoint: {0}")]
    Connect(#[from] ConnectError),
}

/// Owns the connect/pump/listen lifecycle for one server.
///
/// `start` requires the initial connection to succeed; after that the
/// background loop keeps the stores in sync and reconnects on failure
/// until [`shutdown`](Self::shutdown) or drop.
pub struct PushSession {
    state_rx: watch::Receiver<SessionState>,
    cancel: CancellationToken,
}

impl PushSession {
    /// Connect and start the background sync loop.
    pub async fn start(
        config: SessionConfig,
        dispatcher: EventDispatcher,
    ) -> Result<Self, SessionError> {
        let mut client = PushClient::new(config.base_url.clone());
        if let Some(token) = &config.token {
            client = client.with_token(token.clone());
        }

        let cancel = CancellationToken::new();
        let stream = client
            .connect_with_cancel(&config.project_key, &config.languages, cancel.child_token())
            .await?;
        info!("connected to push endpoint at {}", config.base_url);

        let (state_tx, state_rx) = watch::channel(SessionState::Connected);
        let loop_cancel = cancel.clone();
        tokio::spawn(async move {
            run_session_loop(client, config, dispatcher, stream, state_tx, loop_cancel).await;
        });

        Ok(Self { state_rx, cancel })
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        matches!(*self.state_rx.borrow(), SessionState::Connected)
    }

    /// Get the current connection state.
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to connection state changes.
    pub fn state_receiver(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Stop the session. Idempotent; the background loop exits at its
    /// next suspension point.
    pub fn shutdown(&self) {
        info!("shutting down push session");
        self.cancel.cancel();
    }
}

impl Drop for PushSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run pump + listener for each connection, reconnecting between them.
async fn run_session_loop(
    client: PushClient,
    config: SessionConfig,
    dispatcher: EventDispatcher,
    mut stream: PushStream,
    state_tx: watch::Sender<SessionState>,
    cancel: CancellationToken,
) {
    loop {
        let pump = stream.begin_listening();
        let pump_handle = tokio::spawn(pump);

        let mut listener = SyncListener::with_cancel(stream, dispatcher.clone(), cancel.clone());
        listener.listen().await;
        drop(listener);

        match pump_handle.await {
            Ok(Ok(())) => debug!("event stream ended"),
            Ok(Err(e)) => warn!("event stream failed: {}", e),
            // Do not mask unrecoverable state corruption
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => {}
        }

        if cancel.is_cancelled() {
            debug!("session shutdown requested");
            break;
        }

        match attempt_reconnect(&client, &config, &state_tx, &cancel).await {
            Some(new_stream) => {
                stream = new_stream;
                let _ = state_tx.send(SessionState::Connected);
            }
            None => break,
        }
    }

    let _ = state_tx.send(SessionState::Disconnected);
}

/// Attempt to reconnect with exponential backoff.
async fn attempt_reconnect(
    client: &PushClient,
    config: &SessionConfig,
    state_tx: &watch::Sender<SessionState>,
    cancel: &CancellationToken,
) -> Option<PushStream> {
    for attempt in 1..=config.max_retries {
        if cancel.is_cancelled() {
            debug!("shutdown requested during reconnection");
            return None;
        }

        let _ = state_tx.send(SessionState::Reconnecting { attempt });

        // Backoff: 1s, 2s, 4s, 8s, ... capped at max_backoff_secs
        let backoff_secs = std::cmp::min(1u64 << (attempt - 1), config.max_backoff_secs);
        info!(
            "reconnection attempt {} of {}, waiting {}s",
            attempt, config.max_retries, backoff_secs
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("shutdown requested during backoff");
                return None;
            }
            _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
        }

        match client
            .connect_with_cancel(&config.project_key, &config.languages, cancel.child_token())
            .await
        {
            Ok(stream) => {
                info!("reconnected on attempt {}", attempt);
                return Some(stream);
            }
            Err(e) => {
                warn!("reconnection attempt {} failed: {}", attempt, e);
            }
        }
    }

    error!(
        "failed to reconnect after {} attempts, giving up",
        config.max_retries
    );
    None
}
