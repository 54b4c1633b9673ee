//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The session layer never touches a serialization library directly: it
//! decodes bootstrap responses through whatever implements [`Codec`], so
//! the JSON codec used in development can be swapped for a binary one
//! without touching the bootstrap sequence.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → a session context holding a codec can be moved
///   into (and shared between) Tokio tasks.
/// - `'static` → the codec owns everything it needs and borrows nothing
///   temporary, so it can live as long as the session does.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input bytes. The bootstrap sequence drops each
/// batch's raw responses as soon as they're decoded, so this matters.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Human-readable, so scripted test executors and packet captures are
/// easy to read. Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use trailhead_protocol::{Codec, GetInventoryMessage, JsonCodec};
///
/// let codec = JsonCodec;
///
/// let msg = GetInventoryMessage { last_timestamp_ms: Some(1_500) };
/// let bytes = codec.encode(&msg).unwrap();
///
/// let decoded: GetInventoryMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
