//! Listener consumption loop

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::traits::EventSource;

use super::dispatch::EventDispatcher;

/// Lifecycle of a [`SyncListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Constructed, `listen` not yet called
    Idle,
    /// Inside the consumption loop
    Listening,
    /// The source returned the end-of-stream sentinel
    Terminated,
    /// Cancellation stopped the loop
    Disposed,
}

/// Pulls events from a source until the end-of-stream sentinel and
/// applies each one to the stores via the dispatcher.
///
/// A failure to apply one event is logged and skipped so one malformed
/// event does not kill the whole session; panics (unrecoverable state
/// corruption) are never caught. After cancellation fires, the pending
/// read resolves, the loop exits, and no further store updates occur.
pub struct SyncListener<S> {
    source: S,
    dispatcher: EventDispatcher,
    cancel: CancellationToken,
    state: ListenerState,
}

impl<S: EventSource> SyncListener<S> {
    /// Create a listener with its own cancellation token.
    pub fn new(source: S, dispatcher: EventDispatcher) -> Self {
        Self::with_cancel(source, dispatcher, CancellationToken::new())
    }

    /// Create a listener observing an externally owned cancellation
    /// token.
    pub fn with_cancel(source: S, dispatcher: EventDispatcher, cancel: CancellationToken) -> Self {
        Self {
            source,
            dispatcher,
            cancel,
            state: ListenerState::Idle,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// A clone of the cancellation token governing this listener.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the consumption loop until the source ends or cancellation
    /// fires. Only callable once; later calls return immediately.
    pub async fn listen(&mut self) {
        if self.state != ListenerState::Idle {
            return;
        }
        if self.cancel.is_cancelled() {
            self.state = ListenerState::Disposed;
            return;
        }

        self.state = ListenerState::Listening;
        loop {
            let event = tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("listener disposed");
                    self.state = ListenerState::Disposed;
                    return;
                }
                event = self.source.next_event() => event,
            };

            match event {
                Some(event) => {
                    if let Err(e) = self.dispatcher.dispatch(&event) {
                        warn!(
                            event_type = %event.event_type,
                            "skipping server event that could not be applied: {}", e
                        );
                    }
                }
                None => {
                    debug!("event source ended");
                    self.state = ListenerState::Terminated;
                    return;
                }
            }
        }
    }

    /// Request the listener stop. Idempotent; safe to call in any
    /// state.
    pub fn dispose(&mut self) {
        self.cancel.cancel();
        if self.state != ListenerState::Terminated {
            self.state = ListenerState::Disposed;
        }
    }
}
