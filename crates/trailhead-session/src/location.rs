//! Player location with range checks and cache invalidation.
//!
//! Latitude and longitude start out *unset*, which is a separate state
//! and not a magic coordinate: (0, 0) is a real place in the Gulf of
//! Guinea, so it can't double as "never configured".

use crate::{MapCache, SessionError};

/// A validated position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Degrees, in [-90, 90].
    pub latitude: f64,
    /// Degrees, in [-180, 180].
    pub longitude: f64,
    /// Meters. Any finite value.
    pub altitude: f64,
}

/// Owns the player's coordinates.
///
/// Every update is all-or-nothing: if either coordinate is out of range,
/// none of the three fields change and the map isn't notified.
#[derive(Debug, Clone, Default)]
pub struct LocationGuard {
    /// `None` until the first successful [`set`](Self::set).
    coordinates: Option<(f64, f64)>,
    altitude: f64,
}

impl LocationGuard {
    /// Creates a guard with no location and altitude 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a new position.
    ///
    /// If anything differs from the stored position, `map` is told to
    /// invalidate its cache *before* the new values are committed.
    /// Setting the identical position again is a no-op for the map.
    ///
    /// Returns `true` if the position changed.
    ///
    /// # Errors
    /// [`SessionError::InvalidArgument`] if `latitude` is outside
    /// [-90, 90], `longitude` outside [-180, 180] (NaN included), or
    /// `altitude` is not finite.
    pub fn set<M: MapCache + ?Sized>(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        map: &mut M,
    ) -> Result<bool, SessionError> {
        // `RangeInclusive::contains` is false for NaN, so NaN is rejected
        // along with everything else out of range.
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SessionError::InvalidArgument(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SessionError::InvalidArgument(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        check_altitude(altitude)?;

        let changed = self.coordinates != Some((latitude, longitude))
            || self.altitude != altitude;
        if changed {
            map.invalidate_cache();
        }

        self.coordinates = Some((latitude, longitude));
        self.altitude = altitude;

        if changed {
            tracing::debug!(latitude, longitude, altitude, "location updated");
        }
        Ok(changed)
    }

    /// Sets the altitude alone, without invalidating the map cache.
    ///
    /// # Errors
    /// [`SessionError::InvalidArgument`] if `altitude` is NaN or infinite.
    pub fn set_altitude(&mut self, altitude: f64) -> Result<(), SessionError> {
        check_altitude(altitude)?;
        self.altitude = altitude;
        Ok(())
    }

    /// Latitude, or `None` if no location was ever set.
    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|(lat, _)| lat)
    }

    /// Longitude, or `None` if no location was ever set.
    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|(_, lon)| lon)
    }

    /// Altitude in meters (0 until set).
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Returns `true` once a location has been set.
    pub fn is_set(&self) -> bool {
        self.coordinates.is_some()
    }

    /// The full position, if one has been set.
    pub fn location(&self) -> Option<Location> {
        self.coordinates.map(|(latitude, longitude)| Location {
            latitude,
            longitude,
            altitude: self.altitude,
        })
    }

    /// The full position, or an error if none has been set yet.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] before the first successful `set`.
    pub fn require(&self) -> Result<Location, SessionError> {
        self.location().ok_or_else(|| {
            SessionError::InvalidState(
                "location must be set before using the map".into(),
            )
        })
    }
}

/// NaN never compares equal to itself, so it would make every repeated
/// `set` look like a move.
fn check_altitude(altitude: f64) -> Result<(), SessionError> {
    if !altitude.is_finite() {
        return Err(SessionError::InvalidArgument(format!(
            "altitude {altitude} is not finite"
        )));
    }
    Ok(())
}
