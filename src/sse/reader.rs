//! Frame assembly over a live text stream

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use super::event::ServerEvent;
use super::parser::parse_frame;

/// Assembles SSE frames from a line-based text stream.
///
/// Reads lines one at a time, accumulating non-blank lines into the
/// current frame. A blank line terminates the frame, which is handed to
/// [`parse_frame`]; frames that parse to `None` are skipped and reading
/// continues with the next frame.
///
/// There must be a single logical consumer at a time; the underlying
/// stream is owned exclusively by this reader.
pub struct SseFrameReader<R> {
    lines: R,
    cancel: CancellationToken,
    frame: Vec<String>,
    done: bool,
}

impl<R: AsyncBufRead + Unpin> SseFrameReader<R> {
    /// Create a reader over `lines`, observing `cancel` for shutdown.
    pub fn new(lines: R, cancel: CancellationToken) -> Self {
        Self {
            lines,
            cancel,
            frame: Vec::new(),
            done: false,
        }
    }

    /// Read the next event from the stream.
    ///
    /// Returns `Ok(None)` once the stream is exhausted or cancellation
    /// is observed - the designed termination path, idempotent across
    /// calls. An unterminated trailing frame at end-of-stream is
    /// discarded.
    ///
    /// Transport failures from the underlying stream propagate as
    /// `Err`; they are fatal for the connection and are never retried
    /// here.
    pub async fn read_event(&mut self) -> std::io::Result<Option<ServerEvent>> {
        if self.done {
            return Ok(None);
        }

        let mut line = String::new();
        loop {
            if self.cancel.is_cancelled() {
                self.done = true;
                return Ok(None);
            }

            line.clear();
            // read_line is not cancel-safe, but on cancellation the
            // whole frame is discarded anyway.
            let bytes_read = tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.done = true;
                    return Ok(None);
                }
                result = self.lines.read_line(&mut line) => result?,
            };

            if bytes_read == 0 {
                self.done = true;
                return Ok(None);
            }

            let trimmed = line.strip_suffix('\n').unwrap_or(line.as_str());
            let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);

            if trimmed.is_empty() {
                let frame = std::mem::take(&mut self.frame);
                if let Some(event) = parse_frame(&frame) {
                    return Ok(Some(event));
                }
                // Malformed or empty frame: skip and keep reading
            } else {
                self.frame.push(trimmed.to_string());
            }
        }
    }
}
