//! The session context: everything one logged-in player owns.
//!
//! A [`SessionContext`] is created once per logical session and handed
//! (by reference) to every feature that needs session state. There are
//! no globals: two contexts in one process are two unrelated sessions.
//!
//! # Concurrency note
//!
//! Every mutating method takes `&mut self`, including [`login`]. While a
//! login is in flight nobody else can touch the location or credential:
//! the borrow checker enforces single-writer access. If several tasks
//! need one session, wrap it in a `tokio::sync::Mutex`.
//!
//! [`login`]: SessionContext::login

use std::sync::OnceLock;

use rand::Rng;
use trailhead_protocol::{AuthInfo, Codec, JsonCodec, SessionHash};
use trailhead_transport::RequestExecutor;

use crate::{
    Bootstrap, BootstrapState, Clock, CredentialProvider, DefaultDeviceBuilder,
    DeviceIdentity, DeviceIdentityBuilder, Inventories, LocationGuard, Map,
    MapCache, PlayerProfile, Seed, SessionConfig, SessionError, Settings,
    SystemClock,
};

/// Handles that only exist once login succeeded. Kept together so they
/// are published all at once or not at all.
#[derive(Debug)]
struct SessionServices {
    profile: PlayerProfile,
    inventories: Inventories,
    settings: Settings,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SessionContext`].
///
/// # Example
///
/// ```rust,ignore
/// let mut session = SessionContext::builder()
///     .seed(Seed::from_identifier("my-device"))
///     .config(SessionConfig { app_version: 4700, ..Default::default() })
///     .build(executor);
/// session.login(credentials).await?;
/// ```
pub struct SessionContextBuilder<M = Map, C = JsonCodec> {
    seed: Option<Seed>,
    config: SessionConfig,
    clock: Box<dyn Clock>,
    device_builder: Box<dyn DeviceIdentityBuilder>,
    map: M,
    codec: C,
}

impl SessionContextBuilder {
    /// Creates a builder with a random seed, default config, the system
    /// clock, the default map, and the JSON codec.
    pub fn new() -> Self {
        Self {
            seed: None,
            config: SessionConfig::default(),
            clock: Box::new(SystemClock),
            device_builder: Box::new(DefaultDeviceBuilder),
            map: Map::new(),
            codec: JsonCodec,
        }
    }
}

impl Default for SessionContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MapCache, C: Codec> SessionContextBuilder<M, C> {
    /// Uses a fixed seed, so the device identity is the same every run.
    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Overrides the app version and platform sent during login.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the system clock, e.g. to pin the login time in tests.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replaces how the device identity is derived from the seed.
    pub fn device_builder(mut self, builder: impl DeviceIdentityBuilder) -> Self {
        self.device_builder = Box::new(builder);
        self
    }

    /// Swaps in a different map collaborator.
    pub fn map<M2: MapCache>(self, map: M2) -> SessionContextBuilder<M2, C> {
        SessionContextBuilder {
            seed: self.seed,
            config: self.config,
            clock: self.clock,
            device_builder: self.device_builder,
            map,
            codec: self.codec,
        }
    }

    /// Swaps in a different response codec.
    pub fn codec<C2: Codec>(self, codec: C2) -> SessionContextBuilder<M, C2> {
        SessionContextBuilder {
            seed: self.seed,
            config: self.config,
            clock: self.clock,
            device_builder: self.device_builder,
            map: self.map,
            codec,
        }
    }

    /// Builds the context. No network traffic happens until
    /// [`SessionContext::login`].
    pub fn build<E, P>(self, executor: E) -> SessionContext<E, P, M, C>
    where
        E: RequestExecutor,
        P: CredentialProvider,
    {
        let seed = self.seed.unwrap_or_else(Seed::random);
        let session_hash = SessionHash(rand::rng().random());
        tracing::debug!(%seed, "session context created");

        SessionContext {
            executor,
            codec: self.codec,
            config: self.config,
            clock: self.clock,
            session_hash,
            seed,
            start_time_ms: None,
            credential: None,
            state: BootstrapState::Unauthenticated,
            location: LocationGuard::new(),
            map: self.map,
            device_builder: self.device_builder,
            device_identity: OnceLock::new(),
            services: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// One player's session.
///
/// ## Lifecycle
///
/// ```text
/// build() ──→ login() ──→ [Ready] ──→ set_location(), inventories(), ...
///                │
///                └──(any failure)──→ [Failed]  (discard, build a new one)
/// ```
///
/// Type parameters: `E` sends batches, `P` supplies credentials, `M` is
/// the map collaborator, `C` decodes responses.
pub struct SessionContext<E, P, M = Map, C = JsonCodec> {
    executor: E,
    codec: C,
    config: SessionConfig,
    clock: Box<dyn Clock>,

    /// Random, fixed for the session's lifetime.
    session_hash: SessionHash,
    seed: Seed,

    /// Set when a credential is bound, never changed afterwards.
    start_time_ms: Option<u64>,
    credential: Option<P>,
    state: BootstrapState,

    location: LocationGuard,
    map: M,

    device_builder: Box<dyn DeviceIdentityBuilder>,
    /// Built on first access from `seed`.
    device_identity: OnceLock<DeviceIdentity>,

    /// `Some` exactly when `state` is `Ready`.
    services: Option<SessionServices>,
}

impl SessionContext<(), ()> {
    /// Shorthand for [`SessionContextBuilder::new`].
    pub fn builder() -> SessionContextBuilder {
        SessionContextBuilder::new()
    }
}

impl<E, P, M, C> SessionContext<E, P, M, C>
where
    E: RequestExecutor,
    P: CredentialProvider,
    M: MapCache,
    C: Codec,
{
    // -- Login ------------------------------------------------------------

    /// Binds `credential` and runs the two-phase bootstrap.
    ///
    /// On success the session is [`Ready`](BootstrapState::Ready) and the
    /// sub-service accessors start working. On failure the session is
    /// `Failed` for good; build a new context to try again.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] if a credential is already bound
    ///   (this context already logged in, or tried to)
    /// - [`SessionError::LoginFailed`] if the credential gave up
    /// - [`SessionError::RemoteServerFailure`] on any batch failure
    pub async fn login(&mut self, credential: P) -> Result<(), SessionError> {
        if self.credential.is_some() {
            return Err(SessionError::InvalidState(format!(
                "a credential is already bound (state {})",
                self.state
            )));
        }

        let start_time_ms = self.clock.current_time_millis();
        self.start_time_ms = Some(start_time_ms);
        let credential = self.credential.insert(credential);
        self.state = BootstrapState::CredentialBound;
        tracing::info!(seed = %self.seed, start_time_ms, "login started");

        // Fresh sub-services; they're only published if both phases land.
        let mut inventories = Inventories::new();
        let mut settings = Settings::new();

        let mut bootstrap = Bootstrap::new(
            &self.executor,
            &*credential,
            &self.codec,
            &self.config,
            self.session_hash,
        );
        let result = bootstrap.run(&mut inventories, &mut settings).await;
        self.state = bootstrap.state();
        let provider = bootstrap.provider().unwrap_or_default().to_owned();
        result?;

        self.services = Some(SessionServices {
            profile: PlayerProfile {
                provider,
                logged_in_at_ms: start_time_ms,
            },
            inventories,
            settings,
        });
        Ok(())
    }

    /// Current login checkpoint.
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Returns `true` once login fully succeeded.
    pub fn is_ready(&self) -> bool {
        self.state == BootstrapState::Ready
    }

    /// Fresh auth info from the bound credential.
    ///
    /// May hit the network if the credential needs to refresh its token.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] before [`login`](Self::login)
    /// - whatever the credential returns (`LoginFailed`,
    ///   `RemoteServerFailure`)
    pub async fn auth_info(&self) -> Result<AuthInfo, SessionError> {
        let credential = self.credential.as_ref().ok_or_else(|| {
            SessionError::InvalidState("no credential bound yet".into())
        })?;
        credential.auth_info().await
    }

    // -- Location ---------------------------------------------------------

    /// Validates and stores the player's position, invalidating the map
    /// cache if it changed.
    ///
    /// # Errors
    /// [`SessionError::InvalidArgument`] for out-of-range coordinates;
    /// nothing changes in that case.
    pub fn set_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<(), SessionError> {
        self.location
            .set(latitude, longitude, altitude, &mut self.map)
            .map(|_| ())
    }

    /// Changes only the altitude. The map cache is kept.
    ///
    /// # Errors
    /// [`SessionError::InvalidArgument`] for a NaN or infinite altitude.
    pub fn set_altitude(&mut self, altitude: f64) -> Result<(), SessionError> {
        self.location.set_altitude(altitude)
    }

    /// `None` until a location is set.
    pub fn latitude(&self) -> Option<f64> {
        self.location.latitude()
    }

    /// `None` until a location is set.
    pub fn longitude(&self) -> Option<f64> {
        self.location.longitude()
    }

    pub fn altitude(&self) -> f64 {
        self.location.altitude()
    }

    /// The map collaborator.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] if no location has been set.
    pub fn map(&self) -> Result<&M, SessionError> {
        self.location.require()?;
        Ok(&self.map)
    }

    /// Mutable access to the map collaborator.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] if no location has been set.
    pub fn map_mut(&mut self) -> Result<&mut M, SessionError> {
        self.location.require()?;
        Ok(&mut self.map)
    }

    // -- Device identity --------------------------------------------------

    /// The device this session claims to be, built from the seed on
    /// first call and cached after that.
    pub fn device_identity(&self) -> &DeviceIdentity {
        self.device_identity.get_or_init(|| {
            tracing::debug!(seed = %self.seed, "building device identity");
            self.device_builder.build_default(self.seed)
        })
    }

    // -- Sub-services -----------------------------------------------------

    fn services(&self) -> Result<&SessionServices, SessionError> {
        self.services.as_ref().ok_or_else(|| self.not_ready())
    }

    fn not_ready(&self) -> SessionError {
        SessionError::InvalidState(format!(
            "session is not ready (state {})",
            self.state
        ))
    }

    /// # Errors
    /// [`SessionError::InvalidState`] before login succeeded.
    pub fn player_profile(&self) -> Result<&PlayerProfile, SessionError> {
        Ok(&self.services()?.profile)
    }

    /// # Errors
    /// [`SessionError::InvalidState`] before login succeeded.
    pub fn inventories(&self) -> Result<&Inventories, SessionError> {
        Ok(&self.services()?.inventories)
    }

    /// # Errors
    /// [`SessionError::InvalidState`] before login succeeded.
    pub fn inventories_mut(&mut self) -> Result<&mut Inventories, SessionError> {
        let state = self.state;
        self.services
            .as_mut()
            .map(|s| &mut s.inventories)
            .ok_or_else(|| {
                SessionError::InvalidState(format!("session is not ready (state {state})"))
            })
    }

    /// # Errors
    /// [`SessionError::InvalidState`] before login succeeded.
    pub fn settings(&self) -> Result<&Settings, SessionError> {
        Ok(&self.services()?.settings)
    }

    // -- Session identity -------------------------------------------------

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn session_hash(&self) -> &SessionHash {
        &self.session_hash
    }

    /// When the credential was bound; `None` before login.
    pub fn start_time_ms(&self) -> Option<u64> {
        self.start_time_ms
    }

    /// Reads the session's clock.
    pub fn current_time_millis(&self) -> u64 {
        self.clock.current_time_millis()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The executor, for features that send their own batches.
    pub fn executor(&self) -> &E {
        &self.executor
    }
}
