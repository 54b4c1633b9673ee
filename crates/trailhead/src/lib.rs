//! # Trailhead
//!
//! Client-side session toolkit for a location-based game service.
//!
//! A [`SessionContext`](trailhead_session::SessionContext) owns one
//! player's session: it logs in with a two-phase bootstrap that syncs
//! inventory and settings in a fixed order, keeps the player's location
//! range-checked, and derives a stable device identity from a seed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trailhead::prelude::*;
//!
//! # struct MyCredential;
//! # impl CredentialProvider for MyCredential {
//! #     async fn auth_info(&self) -> Result<AuthInfo, SessionError> {
//! #         unimplemented!()
//! #     }
//! # }
//! # async fn run() -> Result<(), TrailheadError> {
//! trailhead::telemetry::init_tracing();
//!
//! let executor = WebSocketExecutor::connect("ws://127.0.0.1:9000").await?;
//! let mut session = SessionContext::builder()
//!     .seed(Seed::from_identifier("player@example.com"))
//!     .build(executor);
//!
//! session.login(MyCredential).await?;
//! session.set_location(40.7589, -73.9851, 10.0)?;
//! println!("{} items", session.inventories()?.len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;

pub use error::TrailheadError;

pub use trailhead_protocol as protocol;
pub use trailhead_session as session;
pub use trailhead_transport as transport;

/// Everything a typical client needs, in one import.
pub mod prelude {
    pub use crate::TrailheadError;

    pub use trailhead_protocol::{
        AuthInfo, AuthToken, Codec, JsonCodec, Platform, RequestBatch,
    };
    pub use trailhead_session::{
        BootstrapState, CredentialProvider, DeviceIdentity, Inventories, Map,
        MapCache, Seed, SessionConfig, SessionContext, SessionError, Settings,
    };
    pub use trailhead_transport::{
        RequestExecutor, TransportError, WebSocketExecutor,
    };
}
