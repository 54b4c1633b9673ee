//! Logs in against an in-process fake service and prints what the
//! session learned. Run with `RUST_LOG=debug` to watch the bootstrap.

use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::json;
use trailhead::prelude::*;
use trailhead::protocol::{ProtocolError, ServerRequest};

// ---------------------------------------------------------------------------
// Fake service
// ---------------------------------------------------------------------------

/// Answers sync requests the way a live service would: a full baseline
/// the first time, then an "unchanged" reply once the client sends back
/// the settings hash.
struct FakeService {
    clock_ms: AtomicI64,
}

const SETTINGS_HASH: &str = "5a1b0c7e";

impl FakeService {
    fn respond(&self, request: &ServerRequest) -> serde_json::Value {
        let now = self.clock_ms.fetch_add(1_000, Ordering::SeqCst);
        match request {
            ServerRequest::GetInventory(msg) => {
                let items = match msg.last_timestamp_ms {
                    None => vec![
                        json!({ "key": "item/potion", "modified_timestamp_ms": now }),
                        json!({ "key": "item/poke_ball", "modified_timestamp_ms": now }),
                    ],
                    Some(_) => vec![
                        json!({ "key": "item/potion", "modified_timestamp_ms": now, "deleted": true }),
                        json!({ "key": "item/great_ball", "modified_timestamp_ms": now }),
                    ],
                };
                json!({
                    "success": true,
                    "inventory_delta": {
                        "original_timestamp_ms": msg.last_timestamp_ms.unwrap_or(0),
                        "new_timestamp_ms": now,
                        "inventory_items": items,
                    },
                })
            }
            ServerRequest::DownloadSettings(msg) if msg.hash.as_deref() == Some(SETTINGS_HASH) => {
                json!({ "hash": SETTINGS_HASH })
            }
            ServerRequest::DownloadSettings(_) => json!({
                "hash": SETTINGS_HASH,
                "settings": {
                    "minimum_client_version": "0.45.0",
                    "map_settings": {
                        "get_map_objects_min_refresh_seconds": 10.0,
                        "get_map_objects_max_refresh_seconds": 30.0,
                        "encounter_range_meters": 50.0,
                    },
                },
            }),
            _ => json!({}),
        }
    }
}

impl RequestExecutor for FakeService {
    async fn execute_batch(
        &self,
        batch: &RequestBatch,
    ) -> Result<Vec<Vec<u8>>, TransportError> {
        tracing::info!(
            requests = batch.len(),
            provider = %batch.auth_info.provider,
            "fake service received batch"
        );
        batch
            .requests
            .iter()
            .map(|request| {
                serde_json::to_vec(&self.respond(request))
                    .map_err(|e| TransportError::from(ProtocolError::Encode(e)))
            })
            .collect()
    }
}

/// A credential that never expires.
struct DemoCredential;

impl CredentialProvider for DemoCredential {
    async fn auth_info(&self) -> Result<AuthInfo, SessionError> {
        Ok(AuthInfo {
            provider: "ptc".into(),
            token: AuthToken {
                contents: "demo-token".into(),
                expiry_ms: u64::MAX,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), TrailheadError> {
    trailhead::telemetry::init_tracing();

    let service = FakeService {
        clock_ms: AtomicI64::new(1_700_000_000_000),
    };
    let mut session = SessionContext::builder()
        .seed(Seed::from_identifier("demo-player"))
        .build(service);

    session.login(DemoCredential).await?;
    session.set_location(40.758_896, -73.985_130, 10.0)?;

    let device = session.device_identity();
    println!("seed:         {}", session.seed());
    println!("session hash: {}", session.session_hash());
    println!(
        "device:       {} ({}, {})",
        device.device_id, device.device_model_boot, device.firmware_type
    );
    println!("state:        {}", session.state());

    let inventories = session.inventories()?;
    let mut keys: Vec<_> = inventories.items().map(|item| item.key.as_str()).collect();
    keys.sort_unstable();
    println!("inventory:    {keys:?}");

    let settings = session.settings()?;
    println!(
        "settings:     min client {}",
        settings.minimum_client_version().unwrap_or("unknown")
    );
    println!(
        "location:     {:?}, {:?} @ {}m",
        session.latitude(),
        session.longitude(),
        session.altitude()
    );
    Ok(())
}
