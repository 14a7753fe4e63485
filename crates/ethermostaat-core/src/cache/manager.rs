use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{Credentials, SessionToken};
use crate::host::{Notifier, SettingsStore};
use crate::models::{Capability, Device, ThermostatSnapshot};
use crate::temperature::normalize_target;

/// Serve a cached reading for at most two minutes.
pub const DEFAULT_MAX_AGE_SECS: i64 = 120;

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self::at(data, Utc::now())
    }

    pub fn at(data: T, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }

    /// Fresh means `0 <= age < max_age`. A timestamp in the future (clock
    /// moved backwards) never counts as fresh.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now - self.cached_at;
        age >= Duration::zero() && age < max_age
    }

    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.is_fresh_at(Utc::now(), max_age)
    }
}

/// Remote data cache scoped to one device and its credentials.
///
/// Every remote operation resolves the credentials from settings, logs in
/// for a new session token and then talks to `/data`. Methods take
/// `&mut self`, so callers cannot interleave operations on one device.
pub struct ThermostatCache {
    device: Device,
    api: ApiClient,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    max_age: Duration,
    snapshot: Option<CachedData<ThermostatSnapshot>>,
}

impl ThermostatCache {
    pub fn new(
        device: Device,
        api: ApiClient,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            device,
            api,
            settings,
            notifier,
            max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
            snapshot: None,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Last reading, without any remote call and regardless of age
    pub fn cached(&self) -> Option<&ThermostatSnapshot> {
        self.snapshot.as_ref().map(|c| &c.data)
    }

    pub fn age(&self) -> Option<Duration> {
        self.snapshot.as_ref().map(|c| c.age())
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    /// Current reading.
    ///
    /// Served from memory unless `force` is set or the reading is older than
    /// the max age. A failed fetch keeps the previous reading in place.
    pub async fn get(&mut self, force: bool) -> Result<ThermostatSnapshot> {
        if !force {
            if let Some(cached) = &self.snapshot {
                if cached.is_fresh(self.max_age) {
                    debug!(device_id = %self.device.id, age_secs = cached.age().num_seconds(), "Serving cached reading");
                    return Ok(cached.data.clone());
                }
            }
        }

        debug!(device_id = %self.device.id, force, "Fetching fresh reading");
        let credentials = self.credentials();
        let token = self.session(&credentials).await?;
        let snapshot = self.api.fetch_data(&token, &credentials).await?;

        self.snapshot = Some(CachedData::new(snapshot.clone()));

        self.notifier.notify(&self.device.id, Capability::MeasureTemperature, snapshot.measured_temperature);
        self.notifier.notify(&self.device.id, Capability::TargetTemperature, snapshot.target_temperature);

        Ok(snapshot)
    }

    /// Clamp and round `value`, submit it, then force a fresh reading.
    ///
    /// Returns the target actually sent. Once the write is accepted the old
    /// reading is dropped, so a failed refresh never serves the stale target.
    pub async fn set_target(&mut self, value: f64) -> Result<f64> {
        let target = normalize_target(value)?;
        if target != value {
            debug!(requested = value, target, "Target temperature normalized");
        }

        info!(device_id = %self.device.id, target, "Sending new target temperature");
        let credentials = self.credentials();
        let token = self.session(&credentials).await?;
        self.api.write_target(&token, &self.device.id, target).await?;
        self.invalidate();

        self.notifier.notify(&self.device.id, Capability::TargetTemperature, target);

        self.get(true).await?;
        Ok(target)
    }

    fn credentials(&self) -> Credentials {
        Credentials::resolve(self.settings.as_ref(), &self.device)
    }

    /// Log in for a fresh token and keep the device availability in sync
    async fn session(&self, credentials: &Credentials) -> Result<SessionToken> {
        debug!(device_id = %self.device.id, "Retrieving new session token");
        match self.api.login(credentials).await {
            Ok(session) => {
                self.notifier.set_available(&self.device.id);
                Ok(session.token)
            }
            Err(e) => {
                if let Some(api_error @ ApiError::ServiceUnavailable) = e.downcast_ref::<ApiError>() {
                    self.notifier.set_unavailable(&self.device.id, &api_error.to_string());
                }
                warn!(device_id = %self.device.id, error = %e, "Login failed");
                Err(e)
            }
        }
    }
}
