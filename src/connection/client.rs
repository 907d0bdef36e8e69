//! HTTP client for the push-event endpoint.
//!
//! Opens the long-lived SSE connection against the server and adapts
//! the response body into the line-based reader the SSE core consumes.

use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use tokio::io::AsyncBufRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;

use crate::sse::SseStream;

/// Path of the push-event endpoint, relative to the server base URL.
pub const EVENTS_PATH: &str = "/api/push/events";

/// Boxed line reader over a live response body.
pub type EventStreamReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// An open SSE connection, ready to pump and consume.
pub type PushStream = SseStream<EventStreamReader>;

/// Error type for connection attempts.
#[derive(Debug)]
pub enum ConnectError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Server returned an error status
    ServerError { status: u16, message: String },
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectError::Http(e) => write!(f, "HTTP error: {}", e),
            ConnectError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::Http(e) => Some(e),
            ConnectError::ServerError { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ConnectError {
    fn from(e: reqwest::Error) -> Self {
        ConnectError::Http(e)
    }
}

/// Client for opening push-event connections.
///
/// Holds the base URL and optional bearer token; one client can open
/// any number of connections, each owning its response body for the
/// lifetime of the stream.
#[derive(Debug, Clone)]
pub struct PushClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl PushClient {
    /// Create a client for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Attach a bearer token used on every connection attempt.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open an SSE connection subscribed to the given project and
    /// languages, with a fresh cancellation token.
    pub async fn connect(
        &self,
        project_key: &str,
        languages: &[String],
    ) -> Result<PushStream, ConnectError> {
        self.connect_with_cancel(project_key, languages, CancellationToken::new())
            .await
    }

    /// Open an SSE connection observing an externally owned
    /// cancellation token.
    pub async fn connect_with_cancel(
        &self,
        project_key: &str,
        languages: &[String],
        cancel: CancellationToken,
    ) -> Result<PushStream, ConnectError> {
        let url = format!("{}{}", self.base_url, EVENTS_PATH);
        let languages = languages.join(",");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream")
            .query(&[
                ("projectKeys", project_key),
                ("languages", languages.as_str()),
            ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConnectError::ServerError { status, message });
        }

        let bytes_stream = response
            .bytes_stream()
            .map(|result| result.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)));

        Ok(SseStream::with_cancel(into_line_reader(bytes_stream), cancel))
    }
}

/// Adapt a response byte stream into the boxed line reader the SSE
/// core consumes.
fn into_line_reader<S>(stream: S) -> EventStreamReader
where
    S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
{
    Box::new(StreamReader::new(Box::pin(stream)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_client_new() {
        let client = PushClient::new("http://localhost:9000");
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_push_client_with_token() {
        let client = PushClient::new("http://localhost:9000").with_token("squ_abc");
        assert_eq!(client.token.as_deref(), Some("squ_abc"));
    }

    #[test]
    fn test_push_client_clone() {
        let client = PushClient::new("http://localhost:9000");
        let cloned = client.clone();
        assert_eq!(cloned.base_url(), client.base_url());
    }

    #[test]
    fn test_connect_error_display() {
        let err = ConnectError::ServerError {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("401"));
        assert!(display.contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_into_line_reader_adapts_chunks() {
        // Chunk boundaries need not align with line boundaries
        let chunks: Vec<std::io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"event: X\nda")),
            Ok(Bytes::from_static(b"ta: A\n\n")),
        ];
        let reader = into_line_reader(futures::stream::iter(chunks));

        let mut stream = SseStream::new(reader);
        tokio::spawn(stream.begin_listening());
        let event = stream.read_event().await.unwrap();
        assert_eq!(event.event_type, "X");
        assert_eq!(event.data, "A");
        assert!(stream.read_event().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_server_fails() {
        let client = PushClient::new("http://127.0.0.1:1");
        let result = client.connect("proj", &["rust".to_string()]).await;
        assert!(matches!(result, Err(ConnectError::Http(_))));
    }
}
