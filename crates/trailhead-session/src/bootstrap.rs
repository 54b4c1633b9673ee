//! The two-phase login bootstrap.
//!
//! Before a session may do anything else, it must bring the server and
//! client into agreement about inventory and settings:
//!
//! ```text
//! Phase one (baseline)             Phase two (incremental)
//! ─────────────────────            ─────────────────────────────
//! 0 DOWNLOAD_REMOTE_CONFIG_VERSION 0 GET_ASSET_DIGEST
//! 1 GET_HATCHED_EGGS               1 GET_HATCHED_EGGS
//! 2 GET_INVENTORY (no filter)  ──→ 2 GET_INVENTORY (since timestamp T)
//! 3 CHECK_AWARDED_BADGES           3 CHECK_AWARDED_BADGES
//! 4 DOWNLOAD_SETTINGS (no hash)──→ 4 DOWNLOAD_SETTINGS (hash H)
//! ```
//!
//! Phase two is built from what phase one produced (T and H), so it can
//! only be built from a [`SyncCursor`], and only this module can make
//! one out of an applied batch.

use std::fmt;

use trailhead_protocol::{
    AuthInfo, CheckAwardedBadgesMessage, Codec,
    DownloadRemoteConfigVersionMessage, DownloadSettingsMessage,
    DownloadSettingsResponse, GetAssetDigestMessage, GetHatchedEggsMessage,
    GetInventoryMessage, GetInventoryResponse, RequestBatch, ServerRequest,
    SessionHash,
};
use trailhead_transport::RequestExecutor;

use crate::{
    CredentialProvider, InventoryLedger, SessionConfig, SessionError,
    SettingsStore,
};

/// Position of the inventory request (and response) in both batches.
pub const INVENTORY_SLOT: usize = 2;
/// Position of the settings request (and response) in both batches.
pub const SETTINGS_SLOT: usize = 4;
/// Requests per bootstrap batch.
pub const BATCH_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// BootstrapState
// ---------------------------------------------------------------------------

/// Where a session is in its login sequence.
///
/// The happy path is strictly ordered:
///
/// ```text
/// Unauthenticated → CredentialBound → Phase1Sent → Phase1Parsed
///     → Phase2Sent → Phase2Parsed → Ready
/// ```
///
/// `Failed` can be reached from any state except `Ready`, and nothing
/// leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapState {
    Unauthenticated,
    CredentialBound,
    Phase1Sent,
    Phase1Parsed,
    Phase2Sent,
    Phase2Parsed,
    Ready,
    Failed,
}

impl BootstrapState {
    /// The next state on the happy path, or `None` from `Ready`/`Failed`.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Unauthenticated => Some(Self::CredentialBound),
            Self::CredentialBound => Some(Self::Phase1Sent),
            Self::Phase1Sent => Some(Self::Phase1Parsed),
            Self::Phase1Parsed => Some(Self::Phase2Sent),
            Self::Phase2Sent => Some(Self::Phase2Parsed),
            Self::Phase2Parsed => Some(Self::Ready),
            Self::Ready | Self::Failed => None,
        }
    }

    /// Returns `true` if moving to `target` is legal.
    pub fn can_transition_to(self, target: Self) -> bool {
        match target {
            Self::Failed => !self.is_terminal(),
            _ => self.next() == Some(target),
        }
    }

    /// `Ready` and `Failed` are final.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::CredentialBound => "CredentialBound",
            Self::Phase1Sent => "Phase1Sent",
            Self::Phase1Parsed => "Phase1Parsed",
            Self::Phase2Sent => "Phase2Sent",
            Self::Phase2Parsed => "Phase2Parsed",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

/// What the client knows after applying a sync batch.
///
/// Fields are private and there is no public constructor: the only way
/// to get one is to have a batch decoded and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCursor {
    inventory_timestamp_ms: i64,
    settings_hash: String,
}

impl SyncCursor {
    /// Newest inventory timestamp known to the client.
    pub fn inventory_timestamp_ms(&self) -> i64 {
        self.inventory_timestamp_ms
    }

    /// Hash of the settings the client holds.
    pub fn settings_hash(&self) -> &str {
        &self.settings_hash
    }
}

/// Phase one: full baseline sync.
pub fn phase_one_requests(config: &SessionConfig) -> Vec<ServerRequest> {
    vec![
        ServerRequest::DownloadRemoteConfigVersion(
            DownloadRemoteConfigVersionMessage {
                platform: config.platform,
                app_version: config.app_version,
            },
        ),
        ServerRequest::GetHatchedEggs(GetHatchedEggsMessage {}),
        ServerRequest::GetInventory(GetInventoryMessage {
            last_timestamp_ms: None,
        }),
        ServerRequest::CheckAwardedBadges(CheckAwardedBadgesMessage {}),
        ServerRequest::DownloadSettings(DownloadSettingsMessage { hash: None }),
    ]
}

/// Phase two: the same sync calls, scoped by what phase one returned.
pub fn phase_two_requests(
    config: &SessionConfig,
    cursor: &SyncCursor,
) -> Vec<ServerRequest> {
    vec![
        ServerRequest::GetAssetDigest(GetAssetDigestMessage {
            platform: config.platform,
            app_version: config.app_version,
        }),
        ServerRequest::GetHatchedEggs(GetHatchedEggsMessage {}),
        ServerRequest::GetInventory(GetInventoryMessage {
            last_timestamp_ms: Some(cursor.inventory_timestamp_ms),
        }),
        ServerRequest::CheckAwardedBadges(CheckAwardedBadgesMessage {}),
        ServerRequest::DownloadSettings(DownloadSettingsMessage {
            hash: Some(cursor.settings_hash.clone()),
        }),
    ]
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// The two payloads of a batch that feed sub-services.
#[derive(Debug)]
struct SyncPayloads {
    inventory: GetInventoryResponse,
    settings: DownloadSettingsResponse,
}

/// Decodes both sync payloads, or neither.
fn decode_sync_payloads<C: Codec>(
    codec: &C,
    responses: &[Vec<u8>],
) -> Result<SyncPayloads, SessionError> {
    let inventory: GetInventoryResponse = codec
        .decode(response_at(responses, INVENTORY_SLOT)?)
        .map_err(|e| {
            SessionError::RemoteServerFailure(format!(
                "inventory response: {e}"
            ))
        })?;
    let settings: DownloadSettingsResponse = codec
        .decode(response_at(responses, SETTINGS_SLOT)?)
        .map_err(|e| {
            SessionError::RemoteServerFailure(format!(
                "settings response: {e}"
            ))
        })?;

    Ok(SyncPayloads {
        inventory,
        settings,
    })
}

fn response_at(
    responses: &[Vec<u8>],
    index: usize,
) -> Result<&[u8], SessionError> {
    responses.get(index).map(Vec::as_slice).ok_or_else(|| {
        SessionError::RemoteServerFailure(format!(
            "batch has no response at position {index}"
        ))
    })
}

/// Hands decoded payloads to the sub-services and reads back the cursor.
fn apply_sync<I, S>(
    payloads: SyncPayloads,
    inventories: &mut I,
    settings: &mut S,
) -> Result<SyncCursor, SessionError>
where
    I: InventoryLedger + ?Sized,
    S: SettingsStore + ?Sized,
{
    inventories.update_from_decoded(payloads.inventory)?;
    settings.update_from_decoded(payloads.settings);

    Ok(SyncCursor {
        inventory_timestamp_ms: inventories.last_inventory_timestamp(),
        settings_hash: settings.current_hash().to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// Drives one login's two-phase sync.
///
/// A `Bootstrap` starts in [`BootstrapState::CredentialBound`] and can
/// [`run`](Self::run) once. Afterwards [`state`](Self::state) is either
/// `Ready` or `Failed`.
pub struct Bootstrap<'a, E, P, C> {
    executor: &'a E,
    credential: &'a P,
    codec: &'a C,
    config: &'a SessionConfig,
    session_hash: SessionHash,
    state: BootstrapState,
    provider: Option<String>,
}

impl<'a, E, P, C> Bootstrap<'a, E, P, C>
where
    E: RequestExecutor,
    P: CredentialProvider,
    C: Codec,
{
    /// Prepares a bootstrap for a freshly bound credential.
    pub fn new(
        executor: &'a E,
        credential: &'a P,
        codec: &'a C,
        config: &'a SessionConfig,
        session_hash: SessionHash,
    ) -> Self {
        Self {
            executor,
            credential,
            codec,
            config,
            session_hash,
            state: BootstrapState::CredentialBound,
            provider: None,
        }
    }

    /// Current checkpoint.
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Auth provider named by the most recent auth info, if any batch
    /// got that far.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Runs both phases against the given sub-services.
    ///
    /// On error the state is `Failed`. Sub-services may already hold
    /// phase-one data at that point; callers must throw them away
    /// rather than publish them.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] if this bootstrap already ran
    /// - [`SessionError::LoginFailed`] if the credential gave up
    /// - [`SessionError::RemoteServerFailure`] on any transport, decode,
    ///   or sub-service rejection
    pub async fn run<I, S>(
        &mut self,
        inventories: &mut I,
        settings: &mut S,
    ) -> Result<(), SessionError>
    where
        I: InventoryLedger + ?Sized,
        S: SettingsStore + ?Sized,
    {
        if self.state != BootstrapState::CredentialBound {
            return Err(SessionError::InvalidState(format!(
                "bootstrap cannot start from {}",
                self.state
            )));
        }

        match self.sync(inventories, settings).await {
            Ok(()) => {
                self.advance(BootstrapState::Ready)?;
                tracing::info!("bootstrap complete, session ready");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    at = %self.state,
                    error = %e,
                    "bootstrap failed"
                );
                self.state = BootstrapState::Failed;
                Err(e)
            }
        }
    }

    async fn sync<I, S>(
        &mut self,
        inventories: &mut I,
        settings: &mut S,
    ) -> Result<(), SessionError>
    where
        I: InventoryLedger + ?Sized,
        S: SettingsStore + ?Sized,
    {
        // --- Phase one: baseline ---
        let responses = self
            .execute(phase_one_requests(self.config), BootstrapState::Phase1Sent)
            .await?;
        let payloads = decode_sync_payloads(self.codec, &responses)?;
        let cursor = apply_sync(payloads, inventories, settings)?;
        self.advance(BootstrapState::Phase1Parsed)?;
        tracing::info!(
            inventory_timestamp_ms = cursor.inventory_timestamp_ms(),
            settings_hash = cursor.settings_hash(),
            "baseline sync applied"
        );

        // --- Phase two: incremental, keyed by the cursor ---
        let responses = self
            .execute(
                phase_two_requests(self.config, &cursor),
                BootstrapState::Phase2Sent,
            )
            .await?;
        let payloads = decode_sync_payloads(self.codec, &responses)?;
        let cursor = apply_sync(payloads, inventories, settings)?;
        self.advance(BootstrapState::Phase2Parsed)?;
        tracing::info!(
            inventory_timestamp_ms = cursor.inventory_timestamp_ms(),
            settings_hash = cursor.settings_hash(),
            "incremental sync applied"
        );

        Ok(())
    }

    /// Fetches fresh auth info, sends one batch, and checks that every
    /// request got a response.
    async fn execute(
        &mut self,
        requests: Vec<ServerRequest>,
        sent: BootstrapState,
    ) -> Result<Vec<Vec<u8>>, SessionError> {
        let auth_info: AuthInfo = self.credential.auth_info().await?;
        self.provider = Some(auth_info.provider.clone());

        let batch = RequestBatch {
            auth_info,
            session_hash: self.session_hash,
            requests,
        };
        self.advance(sent)?;

        let responses = self.executor.execute_batch(&batch).await?;
        if responses.len() != batch.len() {
            return Err(SessionError::RemoteServerFailure(format!(
                "expected {} responses, got {}",
                batch.len(),
                responses.len()
            )));
        }
        Ok(responses)
    }

    fn advance(&mut self, target: BootstrapState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(target) {
            return Err(SessionError::InvalidState(format!(
                "illegal bootstrap transition {} -> {target}",
                self.state
            )));
        }
        tracing::debug!(from = %self.state, to = %target, "bootstrap transition");
        self.state = target;
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for the state machine and the request/response helpers.
    //! Full runs against a scripted executor live in `tests/bootstrap.rs`.

    use trailhead_protocol::{
        InventoryDelta, JsonCodec, Platform, RequestType,
    };

    use super::*;
    use crate::{DecodeRejected, Inventories, Settings};

    fn inventory_bytes(new_ts: i64) -> Vec<u8> {
        serde_json::to_vec(&GetInventoryResponse {
            success: true,
            inventory_delta: InventoryDelta {
                original_timestamp_ms: 0,
                new_timestamp_ms: new_ts,
                inventory_items: vec![],
            },
        })
        .unwrap()
    }

    fn settings_bytes(hash: &str) -> Vec<u8> {
        serde_json::to_vec(&DownloadSettingsResponse {
            hash: hash.into(),
            settings: None,
        })
        .unwrap()
    }

    fn batch_responses(inventory: Vec<u8>, settings: Vec<u8>) -> Vec<Vec<u8>> {
        vec![b"{}".to_vec(), b"{}".to_vec(), inventory, b"{}".to_vec(), settings]
    }

    // =====================================================================
    // BootstrapState
    // =====================================================================

    #[test]
    fn test_next_walks_happy_path_in_order() {
        let mut state = BootstrapState::Unauthenticated;
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            seen.push(next);
            state = next;
        }
        assert_eq!(
            seen,
            vec![
                BootstrapState::Unauthenticated,
                BootstrapState::CredentialBound,
                BootstrapState::Phase1Sent,
                BootstrapState::Phase1Parsed,
                BootstrapState::Phase2Sent,
                BootstrapState::Phase2Parsed,
                BootstrapState::Ready,
            ]
        );
    }

    #[test]
    fn test_can_transition_to_rejects_skips() {
        assert!(
            !BootstrapState::Phase1Sent
                .can_transition_to(BootstrapState::Phase2Sent)
        );
        assert!(
            !BootstrapState::CredentialBound
                .can_transition_to(BootstrapState::Ready)
        );
    }

    #[test]
    fn test_failed_is_reachable_from_non_terminal_only() {
        assert!(
            BootstrapState::Phase2Sent.can_transition_to(BootstrapState::Failed)
        );
        assert!(
            !BootstrapState::Ready.can_transition_to(BootstrapState::Failed)
        );
        assert!(
            !BootstrapState::Failed.can_transition_to(BootstrapState::Failed)
        );
        assert_eq!(BootstrapState::Failed.next(), None);
    }

    // =====================================================================
    // Request construction
    // =====================================================================

    #[test]
    fn test_phase_one_requests_order_and_baseline_filters() {
        let config = SessionConfig {
            app_version: 4700,
            platform: Platform::Android,
        };
        let requests = phase_one_requests(&config);

        let types: Vec<_> = requests.iter().map(|r| r.request_type()).collect();
        assert_eq!(
            types,
            vec![
                RequestType::DownloadRemoteConfigVersion,
                RequestType::GetHatchedEggs,
                RequestType::GetInventory,
                RequestType::CheckAwardedBadges,
                RequestType::DownloadSettings,
            ]
        );
        assert_eq!(
            requests[0],
            ServerRequest::DownloadRemoteConfigVersion(
                DownloadRemoteConfigVersionMessage {
                    platform: Platform::Android,
                    app_version: 4700,
                }
            )
        );
        assert_eq!(
            requests[INVENTORY_SLOT],
            ServerRequest::GetInventory(GetInventoryMessage {
                last_timestamp_ms: None
            })
        );
        assert_eq!(
            requests[SETTINGS_SLOT],
            ServerRequest::DownloadSettings(DownloadSettingsMessage {
                hash: None
            })
        );
    }

    #[test]
    fn test_phase_two_requests_use_cursor() {
        let mut inv = Inventories::new();
        let mut settings = Settings::new();
        let payloads = decode_sync_payloads(
            &JsonCodec,
            &batch_responses(inventory_bytes(1234), settings_bytes("H")),
        )
        .unwrap();
        let cursor = apply_sync(payloads, &mut inv, &mut settings).unwrap();

        let requests = phase_two_requests(&SessionConfig::default(), &cursor);

        assert_eq!(requests.len(), BATCH_SIZE);
        assert_eq!(requests[0].request_type(), RequestType::GetAssetDigest);
        assert_eq!(
            requests[INVENTORY_SLOT],
            ServerRequest::GetInventory(GetInventoryMessage {
                last_timestamp_ms: Some(1234)
            })
        );
        assert_eq!(
            requests[SETTINGS_SLOT],
            ServerRequest::DownloadSettings(DownloadSettingsMessage {
                hash: Some("H".into())
            })
        );
    }

    // =====================================================================
    // Response handling
    // =====================================================================

    #[test]
    fn test_decode_sync_payloads_bad_settings_returns_remote_failure() {
        let result = decode_sync_payloads(
            &JsonCodec,
            &batch_responses(inventory_bytes(1), b"not json".to_vec()),
        );
        assert!(
            matches!(result, Err(SessionError::RemoteServerFailure(ref m)) if m.contains("settings"))
        );
    }

    #[test]
    fn test_decode_sync_payloads_short_batch_returns_remote_failure() {
        let result =
            decode_sync_payloads(&JsonCodec, &[b"{}".to_vec(), b"{}".to_vec()]);
        assert!(matches!(result, Err(SessionError::RemoteServerFailure(_))));
    }

    /// An inventory that refuses everything.
    struct RejectingLedger;

    impl InventoryLedger for RejectingLedger {
        fn update_from_decoded(
            &mut self,
            _response: GetInventoryResponse,
        ) -> Result<(), DecodeRejected> {
            Err(DecodeRejected("nope".into()))
        }

        fn last_inventory_timestamp(&self) -> i64 {
            0
        }
    }

    #[test]
    fn test_apply_sync_rejected_inventory_skips_settings() {
        let mut settings = Settings::new();
        let payloads = decode_sync_payloads(
            &JsonCodec,
            &batch_responses(inventory_bytes(5), settings_bytes("H")),
        )
        .unwrap();

        let result = apply_sync(payloads, &mut RejectingLedger, &mut settings);

        assert!(matches!(result, Err(SessionError::RemoteServerFailure(_))));
        assert_eq!(settings.current_hash(), "", "settings must stay untouched");
    }
}
