//! Settings sub-service.

use trailhead_protocol::{DownloadSettingsResponse, GlobalSettings, MapSettings};

/// What the bootstrap needs from a settings store.
pub trait SettingsStore: Send + Sync + 'static {
    /// Adopts a decoded settings response.
    fn update_from_decoded(&mut self, response: DownloadSettingsResponse);

    /// Hash of the settings currently held (empty before any sync).
    fn current_hash(&self) -> &str;
}

/// Default settings store.
///
/// A keyed download answered with "unchanged" carries only the hash; the
/// previously downloaded settings body is kept in that case.
#[derive(Debug, Default)]
pub struct Settings {
    hash: String,
    global: Option<GlobalSettings>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full global settings, once downloaded.
    pub fn global(&self) -> Option<&GlobalSettings> {
        self.global.as_ref()
    }

    pub fn map_settings(&self) -> Option<&MapSettings> {
        self.global.as_ref()?.map_settings.as_ref()
    }

    pub fn minimum_client_version(&self) -> Option<&str> {
        self.global
            .as_ref()
            .map(|g| g.minimum_client_version.as_str())
    }
}

impl SettingsStore for Settings {
    fn update_from_decoded(&mut self, response: DownloadSettingsResponse) {
        let replaced_body = response.settings.is_some();
        if let Some(global) = response.settings {
            self.global = Some(global);
        }
        self.hash = response.hash;
        tracing::debug!(hash = %self.hash, replaced_body, "settings updated");
    }

    fn current_hash(&self) -> &str {
        &self.hash
    }
}
