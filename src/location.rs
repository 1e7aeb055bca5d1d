//! Device location resolution for the Spark Clock.
//!
//! [`LocationResolver::resolve`] turns whatever position source is configured
//! into a [`GeoPosition`] and never fails: a disabled source, a lookup error,
//! a timeout or nonsense coordinates all collapse into a fixed fallback so the
//! weather pipeline can always proceed.

use crate::config::{Config, LocationConfig};
use crate::error::LocationError;
use crate::models::GeoPosition;
use ipgeolocate::{Locator, Service};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// New York City, used when nothing better is known.
pub const DEFAULT_POSITION: GeoPosition = GeoPosition {
    latitude: 40.7128,
    longitude: -74.0060,
};

/// Something that can report where the device roughly is.
#[allow(async_fn_in_trait)]
pub trait PositionSource {
    async fn current_position(&self) -> Result<GeoPosition, LocationError>;
}

/// IP geolocation through the [ip-api](https://ip-api.com/) service.
///
/// Accuracy is city-level at best, which is all a weather lookup needs. The
/// last successful fix is remembered and handed back without a network call
/// while it is younger than `max_fix_age`.
pub struct IpLocator {
    max_fix_age: Duration,
    last_fix: Mutex<Option<(GeoPosition, Instant)>>,
}

impl IpLocator {
    pub fn new(max_fix_age: Duration) -> Self {
        Self {
            max_fix_age,
            last_fix: Mutex::new(None),
        }
    }

    fn cached_fix(&self) -> Option<GeoPosition> {
        let guard = self.last_fix.lock().ok()?;
        match *guard {
            Some((pos, taken)) if taken.elapsed() < self.max_fix_age => Some(pos),
            _ => None,
        }
    }

    fn remember(&self, pos: GeoPosition) {
        if let Ok(mut guard) = self.last_fix.lock() {
            *guard = Some((pos, Instant::now()));
        }
    }
}

impl PositionSource for IpLocator {
    async fn current_position(&self) -> Result<GeoPosition, LocationError> {
        if let Some(pos) = self.cached_fix() {
            debug!("Reusing cached fix ({}, {})", pos.latitude, pos.longitude);
            return Ok(pos);
        }

        // An empty address makes ip-api locate the caller's own public IP.
        let loc = Locator::get("", Service::IpApi)
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let pos = match (loc.latitude.parse::<f64>(), loc.longitude.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => GeoPosition::new(lat, lon),
            _ => return Err(LocationError::InvalidCoordinates(loc.latitude, loc.longitude)),
        };

        self.remember(pos);
        Ok(pos)
    }
}

/// Wraps a [`PositionSource`] with a timeout and a fallback position.
pub struct LocationResolver<S> {
    source: Option<S>,
    timeout: Duration,
    fallback: GeoPosition,
}

impl<S: PositionSource> LocationResolver<S> {
    pub fn new(source: S, timeout: Duration, fallback: GeoPosition) -> Self {
        Self {
            source: Some(source),
            timeout,
            fallback: sanitize_fallback(fallback),
        }
    }

    /// A resolver with no location capability at all.
    pub fn disabled(fallback: GeoPosition) -> Self {
        Self {
            source: None,
            timeout: Duration::ZERO,
            fallback: sanitize_fallback(fallback),
        }
    }

    /// Resolves the device's approximate position.
    ///
    /// # Returns
    ///
    /// The source's coordinates when it answers in time with a valid
    /// position, otherwise the configured fallback. For example, with
    /// detection disabled and default settings this is `(40.7128, -74.0060)`.
    ///
    /// # Panics
    ///
    /// Does not panic. Every failure is logged and replaced by the fallback.
    pub async fn resolve(&self) -> GeoPosition {
        match self.try_resolve().await {
            Ok(pos) => {
                info!(
                    "Geolocation successful - ({}, {})",
                    pos.latitude, pos.longitude
                );
                pos
            }
            Err(e) => {
                warn!(
                    "{}. Using default location ({}, {}).",
                    e, self.fallback.latitude, self.fallback.longitude
                );
                self.fallback
            }
        }
    }

    async fn try_resolve(&self) -> Result<GeoPosition, LocationError> {
        let source = self.source.as_ref().ok_or(LocationError::Disabled)?;

        let pos = tokio::time::timeout(self.timeout, source.current_position())
            .await
            .map_err(|_| LocationError::Timeout)??;

        if !pos.is_valid() {
            return Err(LocationError::InvalidCoordinates(
                pos.latitude.to_string(),
                pos.longitude.to_string(),
            ));
        }
        Ok(pos)
    }
}

impl LocationResolver<IpLocator> {
    pub fn from_config(config: &LocationConfig) -> Self {
        let fallback = GeoPosition::new(config.fallback_lat, config.fallback_lon);
        if !config.auto_detect {
            return Self::disabled(fallback);
        }
        Self::new(
            IpLocator::new(Duration::from_secs(config.max_fix_age_secs)),
            Duration::from_secs(config.timeout_secs),
            fallback,
        )
    }
}

fn sanitize_fallback(pos: GeoPosition) -> GeoPosition {
    if pos.is_valid() {
        pos
    } else {
        DEFAULT_POSITION
    }
}

/// One-shot resolution with a fresh resolver built from `config`.
pub async fn resolve_location(config: &Config) -> GeoPosition {
    LocationResolver::from_config(&config.location).resolve().await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(GeoPosition);

    impl PositionSource for Fixed {
        async fn current_position(&self) -> Result<GeoPosition, LocationError> {
            Ok(self.0)
        }
    }

    struct Denied;

    impl PositionSource for Denied {
        async fn current_position(&self) -> Result<GeoPosition, LocationError> {
            Err(LocationError::Unavailable("permission denied".to_string()))
        }
    }

    struct Stalled;

    impl PositionSource for Stalled {
        async fn current_position(&self) -> Result<GeoPosition, LocationError> {
            std::future::pending().await
        }
    }

    fn resolver<S: PositionSource>(source: S) -> LocationResolver<S> {
        LocationResolver::new(source, Duration::from_millis(50), DEFAULT_POSITION)
    }

    #[tokio::test]
    async fn returns_source_position() {
        let paris = GeoPosition::new(48.8566, 2.3522);
        assert_eq!(resolver(Fixed(paris)).resolve().await, paris);
    }

    #[tokio::test]
    async fn disabled_detection_uses_new_york() {
        let pos = LocationResolver::<Denied>::disabled(DEFAULT_POSITION)
            .resolve()
            .await;
        assert_eq!(pos, GeoPosition::new(40.7128, -74.0060));
    }

    #[tokio::test]
    async fn source_error_falls_back() {
        assert_eq!(resolver(Denied).resolve().await, DEFAULT_POSITION);
    }

    #[tokio::test]
    async fn stalled_source_times_out_to_fallback() {
        assert_eq!(resolver(Stalled).resolve().await, DEFAULT_POSITION);
    }

    #[tokio::test]
    async fn invalid_coordinates_fall_back() {
        let bogus = GeoPosition::new(f64::NAN, 500.0);
        let pos = resolver(Fixed(bogus)).resolve().await;
        assert!(pos.is_valid());
        assert_eq!(pos, DEFAULT_POSITION);
    }

    #[tokio::test]
    async fn invalid_fallback_is_replaced() {
        let pos = LocationResolver::<Denied>::disabled(GeoPosition::new(f64::INFINITY, 0.0))
            .resolve()
            .await;
        assert_eq!(pos, DEFAULT_POSITION);
    }

    #[tokio::test]
    async fn config_without_detection_is_disabled() {
        let mut config = Config::default();
        config.location.auto_detect = false;
        config.location.fallback_lat = 51.5074;
        config.location.fallback_lon = -0.1278;

        let pos = resolve_location(&config).await;
        assert_eq!(pos, GeoPosition::new(51.5074, -0.1278));
    }

    #[tokio::test]
    async fn fresh_fix_is_reused_without_lookup() {
        let locator = IpLocator::new(Duration::from_secs(300));
        let tokyo = GeoPosition::new(35.6762, 139.6503);
        locator.remember(tokyo);

        assert_eq!(locator.current_position().await.unwrap(), tokyo);
    }

    #[test]
    fn stale_fix_is_ignored() {
        let locator = IpLocator::new(Duration::ZERO);
        locator.remember(GeoPosition::new(35.6762, 139.6503));
        assert!(locator.cached_fix().is_none());
    }
}
