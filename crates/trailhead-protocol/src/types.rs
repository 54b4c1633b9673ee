//! Core protocol types: every request the client issues and every
//! response payload the session layer decodes.
//!
//! Requests are strongly typed ([`ServerRequest`] is an enum with one
//! variant per call), so a batch can never carry a payload that doesn't
//! match its request type. Responses arrive as raw bytes, one buffer per
//! request, and are decoded on demand with a [`Codec`](crate::Codec).

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity and authentication
// ---------------------------------------------------------------------------

/// The client platform announced to the server.
///
/// Sent with the remote-config and asset-digest requests so the server
/// can pick the right asset bundle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "PascalCase")]
pub enum Platform {
    #[default]
    Ios,
    Android,
}

/// An access token issued by an auth provider.
///
/// `Debug` is implemented by hand so the token contents never end up in
/// logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// The opaque token string.
    pub contents: String,
    /// Absolute expiry time in milliseconds since the Unix epoch.
    pub expiry_ms: u64,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("contents", &"<redacted>")
            .field("expiry_ms", &self.expiry_ms)
            .finish()
    }
}

/// Who the player is, as far as the server is concerned.
///
/// Produced by a credential provider and attached to every batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Auth provider name, e.g. `"ptc"` or `"google"`.
    pub provider: String,
    /// The provider-issued token.
    pub token: AuthToken,
}

/// A 32-byte correlation token generated once per session.
///
/// `#[serde(transparent)]` encodes it as the bare byte array.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHash(pub [u8; 32]);

impl SessionHash {
    /// Borrows the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Lowercase hex, 64 characters.
impl fmt::Display for SessionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SessionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionHash({self})")
    }
}

// ---------------------------------------------------------------------------
// Request messages
// ---------------------------------------------------------------------------

/// Asks which remote-config version the server currently publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRemoteConfigVersionMessage {
    pub platform: Platform,
    pub app_version: u32,
}

/// Asks for the digest of the asset bundle for this platform/version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAssetDigestMessage {
    pub platform: Platform,
    pub app_version: u32,
}

/// Asks for eggs that hatched since the last call. Carries no fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetHatchedEggsMessage {}

/// Asks for newly awarded badges. Carries no fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckAwardedBadgesMessage {}

/// Fetches the player's inventory.
///
/// Without a timestamp this is a baseline sync (the full inventory). With
/// one, the server only returns items modified after it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetInventoryMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp_ms: Option<i64>,
}

/// Downloads the global game settings.
///
/// Without a hash the server always sends the full settings. With the
/// hash of the settings the client already has, it may answer with just
/// the hash (nothing changed).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DownloadSettingsMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

// ---------------------------------------------------------------------------
// ServerRequest — one typed call inside a batch
// ---------------------------------------------------------------------------

/// The request types the session layer knows how to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    DownloadRemoteConfigVersion,
    GetAssetDigest,
    GetHatchedEggs,
    GetInventory,
    CheckAwardedBadges,
    DownloadSettings,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DownloadRemoteConfigVersion => {
                "DOWNLOAD_REMOTE_CONFIG_VERSION"
            }
            Self::GetAssetDigest => "GET_ASSET_DIGEST",
            Self::GetHatchedEggs => "GET_HATCHED_EGGS",
            Self::GetInventory => "GET_INVENTORY",
            Self::CheckAwardedBadges => "CHECK_AWARDED_BADGES",
            Self::DownloadSettings => "DOWNLOAD_SETTINGS",
        };
        f.write_str(name)
    }
}

/// A single request inside a batch: its type plus its typed payload.
///
/// `#[serde(tag = "type", content = "data")]` produces adjacently
/// tagged JSON:
///   `{ "type": "GetInventory", "data": { "last_timestamp_ms": 1500 } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerRequest {
    DownloadRemoteConfigVersion(DownloadRemoteConfigVersionMessage),
    GetAssetDigest(GetAssetDigestMessage),
    GetHatchedEggs(GetHatchedEggsMessage),
    GetInventory(GetInventoryMessage),
    CheckAwardedBadges(CheckAwardedBadgesMessage),
    DownloadSettings(DownloadSettingsMessage),
}

impl ServerRequest {
    /// Returns the request type tag for this request.
    pub fn request_type(&self) -> RequestType {
        match self {
            Self::DownloadRemoteConfigVersion(_) => {
                RequestType::DownloadRemoteConfigVersion
            }
            Self::GetAssetDigest(_) => RequestType::GetAssetDigest,
            Self::GetHatchedEggs(_) => RequestType::GetHatchedEggs,
            Self::GetInventory(_) => RequestType::GetInventory,
            Self::CheckAwardedBadges(_) => RequestType::CheckAwardedBadges,
            Self::DownloadSettings(_) => RequestType::DownloadSettings,
        }
    }
}

/// An ordered group of requests executed as one unit.
///
/// The executor must answer with exactly one raw response per request,
/// in the same order, or fail the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBatch {
    /// Credentials for this round-trip.
    pub auth_info: AuthInfo,
    /// The session's correlation token.
    pub session_hash: SessionHash,
    /// The requests, in the order their responses must come back.
    pub requests: Vec<ServerRequest>,
}

impl RequestBatch {
    /// Number of requests in the batch.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` if the batch carries no requests.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// One inventory entry as the server reports it.
///
/// The item body is opaque to this crate; the inventory sub-service
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Stable key identifying the entry (item id, pokemon id, ...).
    pub key: String,
    /// When the entry last changed, server clock.
    pub modified_timestamp_ms: i64,
    /// `true` if the entry was removed since the requested timestamp.
    #[serde(default)]
    pub deleted: bool,
    /// Opaque item body.
    #[serde(default)]
    pub data: Vec<u8>,
}

/// The set of inventory changes in a response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryDelta {
    /// The timestamp the client asked from (0 for a baseline sync).
    #[serde(default)]
    pub original_timestamp_ms: i64,
    /// The newest modification time covered by this delta.
    pub new_timestamp_ms: i64,
    #[serde(default)]
    pub inventory_items: Vec<InventoryItem>,
}

/// Response to [`GetInventoryMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInventoryResponse {
    pub success: bool,
    pub inventory_delta: InventoryDelta,
}

/// Map refresh tuning published by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    pub get_map_objects_min_refresh_seconds: f32,
    pub get_map_objects_max_refresh_seconds: f32,
    pub encounter_range_meters: f64,
}

/// Global game settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub minimum_client_version: String,
    #[serde(default)]
    pub map_settings: Option<MapSettings>,
}

/// Response to [`DownloadSettingsMessage`].
///
/// `settings` is absent when the client sent the current hash and
/// nothing changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSettingsResponse {
    pub hash: String,
    #[serde(default)]
    pub settings: Option<GlobalSettings>,
}

// ---------------------------------------------------------------------------
// Envelopes — a batch on the wire
// ---------------------------------------------------------------------------

/// Client → server: one batch, tagged with a request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub request_id: u64,
    pub batch: RequestBatch,
}

/// Server → client: the raw responses to one [`RequestEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub request_id: u64,
    /// HTTP-style status for the whole batch. 200 is the only success.
    pub status_code: u16,
    #[serde(default)]
    pub responses: Vec<Vec<u8>>,
}

impl ResponseEnvelope {
    /// Status code for a batch the server processed.
    pub const STATUS_OK: u16 = 200;

    /// Checks that this envelope answers `request_id` successfully with
    /// exactly `expected` responses, and returns them.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] on an id mismatch, a
    /// non-OK status, or a response count that doesn't match the batch.
    pub fn into_responses(
        self,
        request_id: u64,
        expected: usize,
    ) -> Result<Vec<Vec<u8>>, ProtocolError> {
        if self.request_id != request_id {
            return Err(ProtocolError::InvalidMessage(format!(
                "response for request {} while waiting on {request_id}",
                self.request_id
            )));
        }
        if self.status_code != Self::STATUS_OK {
            return Err(ProtocolError::InvalidMessage(format!(
                "batch {request_id} failed with status {}",
                self.status_code
            )));
        }
        if self.responses.len() != expected {
            return Err(ProtocolError::InvalidMessage(format!(
                "batch {request_id} returned {} responses for {expected} requests",
                self.responses.len()
            )));
        }
        Ok(self.responses)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The JSON shapes matter: scripted executors in tests and the
    //! WebSocket executor both rely on them.

    use super::*;

    fn auth() -> AuthInfo {
        AuthInfo {
            provider: "ptc".into(),
            token: AuthToken {
                contents: "secret-token".into(),
                expiry_ms: 10_000,
            },
        }
    }

    // =====================================================================
    // ServerRequest
    // =====================================================================

    #[test]
    fn test_server_request_json_is_adjacently_tagged() {
        let req = ServerRequest::GetInventory(GetInventoryMessage {
            last_timestamp_ms: Some(1500),
        });
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["type"], "GetInventory");
        assert_eq!(json["data"]["last_timestamp_ms"], 1500);
    }

    #[test]
    fn test_baseline_inventory_request_omits_timestamp() {
        // A baseline sync must not send a filter at all, not even 0.
        let req = ServerRequest::GetInventory(GetInventoryMessage::default());
        let json = serde_json::to_value(&req).unwrap();

        assert!(json["data"].get("last_timestamp_ms").is_none());
    }

    #[test]
    fn test_request_type_matches_variant() {
        let cases = [
            (
                ServerRequest::GetHatchedEggs(GetHatchedEggsMessage {}),
                RequestType::GetHatchedEggs,
            ),
            (
                ServerRequest::CheckAwardedBadges(CheckAwardedBadgesMessage {}),
                RequestType::CheckAwardedBadges,
            ),
            (
                ServerRequest::DownloadSettings(
                    DownloadSettingsMessage::default(),
                ),
                RequestType::DownloadSettings,
            ),
        ];
        for (req, expected) in cases {
            assert_eq!(req.request_type(), expected);
        }
    }

    #[test]
    fn test_request_type_display_uses_wire_names() {
        assert_eq!(
            RequestType::DownloadRemoteConfigVersion.to_string(),
            "DOWNLOAD_REMOTE_CONFIG_VERSION"
        );
        assert_eq!(RequestType::GetAssetDigest.to_string(), "GET_ASSET_DIGEST");
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_auth_token_debug_hides_contents() {
        let printed = format!("{:?}", auth());
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("expiry_ms"));
    }

    #[test]
    fn test_session_hash_display_is_lowercase_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xAB;
        bytes[31] = 0x01;
        let shown = SessionHash(bytes).to_string();

        assert_eq!(shown.len(), 64);
        assert!(shown.starts_with("ab"));
        assert!(shown.ends_with("01"));
    }

    #[test]
    fn test_session_hash_serializes_as_bare_bytes() {
        let hash = SessionHash([7; 32]);

        let json = serde_json::to_value(hash).unwrap();

        assert_eq!(json, serde_json::json!(hash.as_bytes().to_vec()));
    }

    #[test]
    fn test_platform_default_is_ios() {
        assert_eq!(Platform::default(), Platform::Ios);
    }

    // =====================================================================
    // Responses
    // =====================================================================

    #[test]
    fn test_inventory_response_defaults_optional_fields() {
        let json = r#"{
            "success": true,
            "inventory_delta": {
                "new_timestamp_ms": 77,
                "inventory_items": [
                    { "key": "item-1", "modified_timestamp_ms": 70 }
                ]
            }
        }"#;
        let resp: GetInventoryResponse = serde_json::from_str(json).unwrap();

        assert_eq!(resp.inventory_delta.original_timestamp_ms, 0);
        assert_eq!(resp.inventory_delta.new_timestamp_ms, 77);
        let item = &resp.inventory_delta.inventory_items[0];
        assert!(!item.deleted);
        assert!(item.data.is_empty());
    }

    #[test]
    fn test_settings_response_without_settings_body() {
        // The "nothing changed" answer to a keyed settings download.
        let resp: DownloadSettingsResponse =
            serde_json::from_str(r#"{"hash": "abc"}"#).unwrap();
        assert_eq!(resp.hash, "abc");
        assert!(resp.settings.is_none());
    }

    // =====================================================================
    // ResponseEnvelope
    // =====================================================================

    fn envelope(request_id: u64, status_code: u16, n: usize) -> ResponseEnvelope {
        ResponseEnvelope {
            request_id,
            status_code,
            responses: vec![Vec::new(); n],
        }
    }

    #[test]
    fn test_into_responses_accepts_matching_envelope() {
        let responses = envelope(7, 200, 5).into_responses(7, 5).unwrap();
        assert_eq!(responses.len(), 5);
    }

    #[test]
    fn test_into_responses_wrong_id_returns_invalid_message() {
        let result = envelope(8, 200, 5).into_responses(7, 5);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_into_responses_error_status_returns_invalid_message() {
        let result = envelope(7, 403, 0).into_responses(7, 5);
        assert!(
            matches!(result, Err(ProtocolError::InvalidMessage(ref m)) if m.contains("403"))
        );
    }

    #[test]
    fn test_into_responses_short_batch_returns_invalid_message() {
        let result = envelope(7, 200, 4).into_responses(7, 5);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_request_envelope_carries_batch() {
        let env = RequestEnvelope {
            request_id: 3,
            batch: RequestBatch {
                auth_info: auth(),
                session_hash: SessionHash([1; 32]),
                requests: vec![ServerRequest::GetHatchedEggs(
                    GetHatchedEggsMessage {},
                )],
            },
        };
        let bytes = serde_json::to_vec(&env).unwrap();
        let decoded: RequestEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(env, decoded);
        assert_eq!(decoded.batch.len(), 1);
    }
}
