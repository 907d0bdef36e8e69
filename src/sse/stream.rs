//! Stream façade composing reader and pump

use std::future::Future;

use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::event::ServerEvent;
use super::pump::SsePump;
use super::reader::SseFrameReader;

/// One disposable handle over a live SSE connection.
///
/// Composes the frame reader and the pump behind a single object so the
/// task that drives the pump and the task that consumes events can be
/// chosen independently. Both sides share one unbounded hand-off
/// channel and one cancellation token; events reach the consumer in
/// exactly the order frames were completed, with no loss while the
/// channel is open and no duplication.
///
/// ```ignore
/// let mut stream = SseStream::new(line_reader);
/// tokio::spawn(stream.begin_listening());
/// while let Some(event) = stream.read_event().await {
///     handle(event);
/// }
/// ```
pub struct SseStream<R> {
    pump: Option<SsePump<R>>,
    events_rx: mpsc::UnboundedReceiver<ServerEvent>,
    cancel: CancellationToken,
    closed: bool,
}

impl<R: AsyncBufRead + Unpin + Send> SseStream<R> {
    /// Create a stream over `lines` with its own cancellation token.
    pub fn new(lines: R) -> Self {
        Self::with_cancel(lines, CancellationToken::new())
    }

    /// Create a stream observing an externally owned cancellation token.
    ///
    /// Cancelling the token makes the pump exit its loop promptly and
    /// completes the hand-off channel, so a consumer blocked in
    /// [`read_event`](Self::read_event) resolves to `None` instead of
    /// hanging.
    pub fn with_cancel(lines: R, cancel: CancellationToken) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let reader = SseFrameReader::new(lines, cancel.clone());
        let pump = SsePump::new(reader, events_tx);
        Self {
            pump: Some(pump),
            events_rx,
            cancel,
            closed: false,
        }
    }

    /// Hand out the long-running pump future.
    ///
    /// The caller must spawn it on a dedicated task; it occupies that
    /// task until the stream ends, fails, or is cancelled. Subsequent
    /// calls return a future that resolves immediately.
    pub fn begin_listening(&mut self) -> impl Future<Output = std::io::Result<()>> + Send {
        let pump = self.pump.take();
        async move {
            match pump {
                Some(pump) => pump.begin_listening().await,
                None => Ok(()),
            }
        }
    }

    /// Await the next event from the hand-off channel.
    ///
    /// Suspends cooperatively until an event arrives or the channel is
    /// marked complete. Returns `None` once the stream has ended or the
    /// handle was closed; repeated calls keep returning `None`.
    pub async fn read_event(&mut self) -> Option<ServerEvent> {
        if self.closed {
            return None;
        }
        self.events_rx.recv().await
    }

    /// A clone of the shared cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the pump and complete the hand-off channel. Idempotent.
    ///
    /// Does not forcibly abort an in-flight read; the pump observes the
    /// cancelled token at its next suspension point. Events still
    /// queued in the channel are discarded: after `close`, reads return
    /// `None`.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.events_rx.close();
        self.closed = true;
    }
}

impl<R> std::fmt::Debug for SseStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseStream")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<R> Drop for SseStream<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
