use std::time::Duration;

use trailhead_protocol::ProtocolError;

/// Errors that can occur while executing a batch.
///
/// The session layer doesn't distinguish between these: any of them
/// turns into a remote-server failure for the bootstrap attempt. They
/// stay separate here so logs say what actually went wrong.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Establishing the connection failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The connection was closed before the batch was answered.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// No response arrived within the configured timeout.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The envelope couldn't be encoded, decoded, or didn't answer the
    /// batch that was sent.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
