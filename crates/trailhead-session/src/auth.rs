//! Credential hook for obtaining auth info.
//!
//! Trailhead doesn't talk to login providers itself. A
//! [`CredentialProvider`] knows how to produce a valid [`AuthInfo`],
//! refreshing its token over the network when it has to, and the
//! session asks it for one before every batch.

use trailhead_protocol::AuthInfo;

use crate::SessionError;

/// Produces the auth info attached to each request batch.
///
/// # Trait bounds
///
/// - `Send + Sync` → the provider lives inside the session context,
///   which may be moved between Tokio worker threads.
/// - `'static` → it owns its state (cached token, HTTP client, ...).
///
/// # Example
///
/// ```rust
/// use trailhead_protocol::{AuthInfo, AuthToken};
/// use trailhead_session::{CredentialProvider, SessionError};
///
/// /// Hands out a fixed token. Only useful against a test server.
/// struct StaticToken(String);
///
/// impl CredentialProvider for StaticToken {
///     async fn auth_info(&self) -> Result<AuthInfo, SessionError> {
///         if self.0.is_empty() {
///             return Err(SessionError::LoginFailed("empty token".into()));
///         }
///         Ok(AuthInfo {
///             provider: "static".into(),
///             token: AuthToken { contents: self.0.clone(), expiry_ms: u64::MAX },
///         })
///     }
/// }
/// ```
pub trait CredentialProvider: Send + Sync + 'static {
    /// Returns currently valid auth info.
    ///
    /// # Returns
    /// - `Ok(AuthInfo)` — ready to attach to a batch
    /// - `Err(SessionError::LoginFailed)` — credentials were rejected
    /// - `Err(SessionError::RemoteServerFailure)` — the token refresh
    ///   itself couldn't reach the provider
    fn auth_info(
        &self,
    ) -> impl std::future::Future<Output = Result<AuthInfo, SessionError>> + Send;
}
