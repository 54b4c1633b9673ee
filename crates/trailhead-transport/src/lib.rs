//! Batch execution layer for Trailhead.
//!
//! Provides the [`RequestExecutor`] trait: send an ordered batch of typed
//! requests, get back one raw response per request, or fail the whole
//! batch. The session layer is written against this trait only, so tests
//! can script responses without a network.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — [`WebSocketExecutor`] via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketExecutor, WebSocketExecutorConfig};

use trailhead_protocol::RequestBatch;

/// Executes request batches against the game service.
///
/// A batch is atomic from the caller's point of view: either every
/// request gets a response (returned in request order) or the call fails.
/// Retries and backoff, if any, belong inside the implementation.
///
/// # Trait bounds
///
/// - `Send + Sync` → a session context holding the executor can move
///   between Tokio worker threads.
/// - `'static` → the executor owns its connection; it borrows nothing.
///
/// # Example
///
/// ```rust
/// use trailhead_protocol::RequestBatch;
/// use trailhead_transport::{RequestExecutor, TransportError};
///
/// /// Answers every request with an empty buffer.
/// struct Blank;
///
/// impl RequestExecutor for Blank {
///     async fn execute_batch(
///         &self,
///         batch: &RequestBatch,
///     ) -> Result<Vec<Vec<u8>>, TransportError> {
///         Ok(vec![Vec::new(); batch.len()])
///     }
/// }
/// ```
pub trait RequestExecutor: Send + Sync + 'static {
    /// Sends `batch` and waits for all of its responses.
    ///
    /// # Returns
    /// - `Ok(responses)` — one raw payload per request, same order
    /// - `Err(TransportError)` — the batch as a whole failed
    fn execute_batch(
        &self,
        batch: &RequestBatch,
    ) -> impl std::future::Future<
        Output = Result<Vec<Vec<u8>>, TransportError>,
    > + Send;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use trailhead_protocol::ProtocolError;

    use super::*;

    #[test]
    fn test_timeout_error_message_includes_duration() {
        let err = TransportError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "no response within 250ms");
    }

    #[test]
    fn test_protocol_error_converts_transparently() {
        let err: TransportError =
            ProtocolError::InvalidMessage("bad status".into()).into();
        assert!(matches!(err, TransportError::Protocol(_)));
        assert_eq!(err.to_string(), "invalid message: bad status");
    }
}
