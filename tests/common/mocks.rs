//! Mock implementations for test fixtures.

use std::collections::VecDeque;

use async_trait::async_trait;
use pushsync::sse::ServerEvent;
use pushsync::traits::EventSource;

/// Event source that yields a scripted list of events, then either
/// ends or hangs until cancelled.
#[allow(dead_code)]
pub struct ScriptedSource {
    events: VecDeque<ServerEvent>,
    hang_when_empty: bool,
}

#[allow(dead_code)]
impl ScriptedSource {
    /// Yield the events, then report end-of-stream.
    pub fn new(events: Vec<ServerEvent>) -> Self {
        Self {
            events: events.into(),
            hang_when_empty: false,
        }
    }

    /// Yield the events, then block forever - the shape of a live
    /// connection with nothing to say.
    pub fn hanging(events: Vec<ServerEvent>) -> Self {
        Self {
            events: events.into(),
            hang_when_empty: true,
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&mut self) -> Option<ServerEvent> {
        match self.events.pop_front() {
            Some(event) => Some(event),
            None if self.hang_when_empty => futures::future::pending().await,
            None => None,
        }
    }
}
