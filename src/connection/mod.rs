//! Push endpoint connection management
//!
//! `client` opens one authenticated SSE connection; `session` owns the
//! connect/pump/listen lifecycle and reconnects with backoff when the
//! connection dies.

mod client;
mod session;

pub use client::{ConnectError, EventStreamReader, PushClient, PushStream};
pub use session::{PushSession, SessionConfig, SessionError, SessionState};
