//! Error types for the protocol layer.
//!
//! Each Trailhead crate defines its own error enum. A `ProtocolError`
//! always means "the bytes or the message shape were wrong", never
//! "the network broke" (that's `TransportError`) or "the session was
//! used wrong" (that's `SessionError`).

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// During bootstrap this is the "structural decode failure" that
    /// aborts the whole login.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but breaks a protocol rule: a response
    /// envelope answering the wrong request, carrying the wrong number
    /// of responses, or reporting a non-OK status.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
