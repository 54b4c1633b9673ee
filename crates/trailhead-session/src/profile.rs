//! Player profile handle.
//!
//! Profile data itself is loaded on demand by profile features outside
//! this crate. The session only creates the handle at login and
//! publishes it once the bootstrap succeeds.

/// Identifies whose session this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    /// Auth provider the player logged in with.
    pub provider: String,
    /// Login start time, milliseconds since the Unix epoch.
    pub logged_in_at_ms: u64,
}
