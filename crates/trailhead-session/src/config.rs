//! Session configuration.

use serde::{Deserialize, Serialize};
use trailhead_protocol::Platform;

/// Client identity announced to the server during login.
///
/// Serde-serializable so a host application can keep it in its own
/// config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Client version number sent with the remote-config and
    /// asset-digest requests.
    ///
    /// Default: 4500.
    pub app_version: u32,

    /// Platform sent alongside `app_version`.
    ///
    /// Default: iOS.
    pub platform: Platform,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_version: 4500,
            platform: Platform::Ios,
        }
    }
}
