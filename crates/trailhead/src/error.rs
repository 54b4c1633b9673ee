//! Unified error type for Trailhead.

use trailhead_protocol::ProtocolError;
use trailhead_session::SessionError;
use trailhead_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Application code that talks to more than one layer (connect a
/// socket, then log in) can use this single type with `?`.
#[derive(Debug, thiserror::Error)]
pub enum TrailheadError {
    /// Connecting or talking to the service failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Login, location, or session-state failure.
    #[error(transparent)]
    Session(#[from] SessionError),
}
