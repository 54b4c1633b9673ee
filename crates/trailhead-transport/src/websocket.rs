//! WebSocket batch executor using `tokio-tungstenite`.
//!
//! One batch is one binary frame each way: the client sends a
//! [`RequestEnvelope`] and waits for the [`ResponseEnvelope`] carrying the
//! same request id. Late replies to batches that already timed out are
//! discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use trailhead_protocol::{
    Codec, JsonCodec, RequestBatch, RequestEnvelope, ResponseEnvelope,
};

use crate::{RequestExecutor, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Settings for [`WebSocketExecutor`].
#[derive(Debug, Clone)]
pub struct WebSocketExecutorConfig {
    /// How long to wait for a batch's response frame.
    ///
    /// Default: 10 seconds.
    pub response_timeout: Duration,
}

impl Default for WebSocketExecutorConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(10),
        }
    }
}

/// A [`RequestExecutor`] speaking to the game service over one WebSocket.
///
/// The socket sits behind a Tokio `Mutex` held for the full round-trip,
/// so two batches can never interleave their frames.
pub struct WebSocketExecutor<C: Codec = JsonCodec> {
    ws: Mutex<WsStream>,
    codec: C,
    config: WebSocketExecutorConfig,
    next_request_id: AtomicU64,
}

impl WebSocketExecutor<JsonCodec> {
    /// Connects to `url` with the JSON codec and default settings.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        Self::connect_with(url, JsonCodec, WebSocketExecutorConfig::default())
            .await
    }
}

impl<C: Codec> WebSocketExecutor<C> {
    /// Connects to `url` with an explicit codec and config.
    pub async fn connect_with(
        url: &str,
        codec: C,
        config: WebSocketExecutorConfig,
    ) -> Result<Self, TransportError> {
        let (ws, _response) =
            tokio_tungstenite::connect_async(url).await.map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        tracing::info!(url, "WebSocket executor connected");

        Ok(Self {
            ws: Mutex::new(ws),
            codec,
            config,
            next_request_id: AtomicU64::new(1),
        })
    }

    /// Closes the underlying socket.
    pub async fn close(&self) -> Result<(), TransportError> {
        self.ws.lock().await.close(None).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }
}

impl<C: Codec> RequestExecutor for WebSocketExecutor<C> {
    async fn execute_batch(
        &self,
        batch: &RequestBatch,
    ) -> Result<Vec<Vec<u8>>, TransportError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let data = self.codec.encode(&RequestEnvelope {
            request_id,
            batch: batch.clone(),
        })?;

        let mut ws = self.ws.lock().await;
        ws.send(Message::Binary(data.into())).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })?;
        tracing::debug!(request_id, requests = batch.len(), "batch sent");

        // A batch that timed out earlier may still get its reply; those
        // carry a lower id and are skipped.
        let timeout = self.config.response_timeout;
        let envelope = tokio::time::timeout(timeout, async {
            loop {
                let reply = recv_frame(&mut ws).await?;
                let envelope: ResponseEnvelope = self.codec.decode(&reply)?;
                if envelope.request_id < request_id {
                    tracing::debug!(
                        stale = envelope.request_id,
                        request_id,
                        "dropping late batch response"
                    );
                    continue;
                }
                return Ok::<_, TransportError>(envelope);
            }
        })
        .await
        .map_err(|_| TransportError::Timeout(timeout))??;

        let responses = envelope.into_responses(request_id, batch.len())?;
        tracing::debug!(request_id, "batch answered");
        Ok(responses)
    }
}

/// Reads the next data frame, skipping control frames.
async fn recv_frame(ws: &mut WsStream) -> Result<Vec<u8>, TransportError> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Binary(data))) => return Ok(data.into()),
            Some(Ok(Message::Text(text))) => {
                return Ok(text.as_bytes().to_vec());
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(TransportError::ConnectionClosed(
                    "closed while waiting for batch response".into(),
                ));
            }
            Some(Ok(_)) => continue, // ping/pong/frame
            Some(Err(e)) => {
                return Err(TransportError::ReceiveFailed(
                    std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    ),
                ));
            }
        }
    }
}
