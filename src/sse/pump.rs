//! Read-loop pump feeding the hand-off channel

use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tracing::debug;

use super::event::ServerEvent;
use super::reader::SseFrameReader;

/// Owns the long-running read loop of an SSE stream.
///
/// Continuously drives the frame reader against the live stream and
/// pushes each event into the hand-off channel. The channel sender is
/// dropped when the loop exits, which marks the channel complete so
/// waiting consumers unblock with the `None` sentinel.
pub struct SsePump<R> {
    reader: SseFrameReader<R>,
    events_tx: mpsc::UnboundedSender<ServerEvent>,
}

impl<R: AsyncBufRead + Unpin> SsePump<R> {
    pub(crate) fn new(
        reader: SseFrameReader<R>,
        events_tx: mpsc::UnboundedSender<ServerEvent>,
    ) -> Self {
        Self { reader, events_tx }
    }

    /// Run the pump until the stream ends, fails, or is cancelled.
    ///
    /// Occupies its task for the lifetime of the connection; callers
    /// must spawn it on a dedicated task, never await it inline on a
    /// latency-sensitive task.
    ///
    /// A transport failure stops the loop and propagates - the
    /// connection is dead at that point and reconnecting is the
    /// caller's concern.
    pub async fn begin_listening(mut self) -> std::io::Result<()> {
        loop {
            match self.reader.read_event().await {
                Ok(Some(event)) => {
                    if self.events_tx.send(event).is_err() {
                        debug!("consumer side closed, stopping pump");
                        return Ok(());
                    }
                }
                Ok(None) => {
                    debug!("event stream ended");
                    return Ok(());
                }
                Err(e) => {
                    debug!("event stream failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    fn pump(
        input: &'static [u8],
        cancel: CancellationToken,
    ) -> (SsePump<&'static [u8]>, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = SseFrameReader::new(input, cancel);
        (SsePump::new(reader, tx), rx)
    }

    #[tokio::test]
    async fn test_pump_forwards_events_in_order() {
        let (pump, mut rx) = pump(
            b"event: X\ndata: 1\n\nevent: Y\ndata: 2\n\n",
            CancellationToken::new(),
        );
        pump.begin_listening().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().event_type, "X");
        assert_eq!(rx.recv().await.unwrap().event_type, "Y");
        // Sender dropped when the pump exited: channel is complete
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_completes_channel_on_empty_stream() {
        let (pump, mut rx) = pump(b"", CancellationToken::new());
        pump.begin_listening().await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_skips_malformed_frames() {
        let (pump, mut rx) = pump(
            b"data: no event type\n\nevent: X\ndata: A\n\n",
            CancellationToken::new(),
        );
        pump.begin_listening().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().event_type, "X");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_stops_when_consumer_dropped() {
        let (pump, rx) = pump(b"event: X\ndata: A\n\n", CancellationToken::new());
        drop(rx);
        // Send fails once the receiver is gone; the pump exits cleanly
        pump.begin_listening().await.unwrap();
    }

    #[tokio::test]
    async fn test_pump_exits_on_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (pump, mut rx) = pump(b"event: X\ndata: A\n\n", cancel);
        pump.begin_listening().await.unwrap();
        assert!(rx.recv().await.is_none());
    }
}
