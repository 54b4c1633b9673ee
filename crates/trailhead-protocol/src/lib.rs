//! Wire-level vocabulary for Trailhead.
//!
//! This crate defines what a client says to the game service and what it
//! gets back:
//!
//! - **Requests** ([`ServerRequest`], [`RequestBatch`]) — the typed calls
//!   the session layer issues, always grouped into ordered batches.
//! - **Responses** ([`GetInventoryResponse`], [`DownloadSettingsResponse`])
//!   — the payloads the bootstrap sequence decodes and hands to
//!   sub-services.
//! - **Envelopes** ([`RequestEnvelope`], [`ResponseEnvelope`]) — how a
//!   batch travels over a concrete transport.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how all of the above
//!   are converted to/from bytes.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about sockets or sessions. It only
//! knows message shapes and how to serialize them.
//!
//! ```text
//! Session (bootstrap) → Protocol (ServerRequest) → Transport (bytes)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AuthInfo, AuthToken, CheckAwardedBadgesMessage,
    DownloadRemoteConfigVersionMessage, DownloadSettingsMessage,
    DownloadSettingsResponse, GetAssetDigestMessage, GetHatchedEggsMessage,
    GetInventoryMessage, GetInventoryResponse, GlobalSettings,
    InventoryDelta, InventoryItem, MapSettings, Platform, RequestBatch,
    RequestEnvelope, RequestType, ResponseEnvelope, ServerRequest,
    SessionHash,
};
