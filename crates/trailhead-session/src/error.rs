//! Error types for the session layer.

/// Errors that can occur while logging in or using a session.
///
/// The first two are local mistakes the caller can fix and retry. The
/// last two end the current login attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The caller passed a value outside its legal range (e.g. a latitude
    /// of 91). Nothing was changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation needs a precondition that hasn't happened yet (or
    /// can't happen again): map access before a location is set,
    /// sub-service access before login finished, a second login.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The credential provider couldn't produce valid auth info.
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// A batch failed in transit, or one of its responses couldn't be
    /// decoded or was rejected by a sub-service.
    #[error("remote server failure: {0}")]
    RemoteServerFailure(String),
}

/// A sub-service refused a decoded payload as structurally invalid.
///
/// Never surfaces on its own: the bootstrap turns it into
/// [`SessionError::RemoteServerFailure`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decoded payload rejected: {0}")]
pub struct DecodeRejected(pub String);

impl From<DecodeRejected> for SessionError {
    fn from(err: DecodeRejected) -> Self {
        Self::RemoteServerFailure(err.to_string())
    }
}

impl From<trailhead_transport::TransportError> for SessionError {
    fn from(err: trailhead_transport::TransportError) -> Self {
        Self::RemoteServerFailure(err.to_string())
    }
}

impl From<trailhead_protocol::ProtocolError> for SessionError {
    fn from(err: trailhead_protocol::ProtocolError) -> Self {
        Self::RemoteServerFailure(err.to_string())
    }
}
