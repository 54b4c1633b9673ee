//! Session state for Trailhead clients.
//!
//! This crate owns everything one logged-in player has:
//!
//! 1. **Identity**: a [`Seed`], a random [`SessionHash`], and a
//!    [`DeviceIdentity`] derived from the seed
//! 2. **Login**: binding a [`CredentialProvider`] and running the
//!    two-phase [`Bootstrap`] that syncs inventory and settings
//! 3. **Location**: a [`LocationGuard`] that range-checks coordinates and
//!    tells the [`MapCache`] when the player moved
//!
//! [`SessionContext`] ties them together.
//!
//! # How it fits in the stack
//!
//! ```text
//! Application features (above)  ← read inventories, settings, map
//!     ↕
//! Session Layer (this crate)  ← login ordering, location, identity
//!     ↕
//! Transport Layer (below)  ← sends RequestBatch, returns raw responses
//! ```
//!
//! [`SessionHash`]: trailhead_protocol::SessionHash

#![allow(async_fn_in_trait)]

mod auth;
pub mod bootstrap;
mod clock;
mod config;
mod context;
mod device;
mod error;
mod inventory;
mod location;
mod map;
mod profile;
mod seed;
mod settings;

pub use auth::CredentialProvider;
pub use bootstrap::{Bootstrap, BootstrapState, SyncCursor};
pub use clock::{Clock, SystemClock};
pub use config::SessionConfig;
pub use context::{SessionContext, SessionContextBuilder};
pub use device::{DefaultDeviceBuilder, DeviceIdentity, DeviceIdentityBuilder};
pub use error::{DecodeRejected, SessionError};
pub use inventory::{Inventories, InventoryLedger};
pub use location::{Location, LocationGuard};
pub use map::{CachedCell, Map, MapCache};
pub use profile::PlayerProfile;
pub use seed::Seed;
pub use settings::{Settings, SettingsStore};
