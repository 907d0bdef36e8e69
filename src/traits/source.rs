//! Event source trait abstraction.
//!
//! Abstracts "give me the next server event or the end-of-stream
//! sentinel" so the sync listener can be driven by a live
//! [`SseStream`] in production and by scripted sources in tests.

use async_trait::async_trait;
use tokio::io::AsyncBufRead;

use crate::sse::{ServerEvent, SseStream};

/// A pull-based source of server events.
///
/// `next_event` suspends until an event is available and returns `None`
/// once the source is exhausted; after that, every further call must
/// also return `None`. There is a single logical consumer at a time.
#[async_trait]
pub trait EventSource: Send {
    /// Await the next event, or `None` at end of stream.
    async fn next_event(&mut self) -> Option<ServerEvent>;
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for SseStream<R> {
    async fn next_event(&mut self) -> Option<ServerEvent> {
        self.read_event().await
    }
}
