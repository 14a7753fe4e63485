//! Capability surface exposed to the hub.
//!
//! The driver owns one `ThermostatCache` per paired device and routes
//! capability reads and writes to it.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Duration;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::cache::{ThermostatCache, DEFAULT_MAX_AGE_SECS};
use crate::host::{Notifier, SettingsStore};
use crate::models::{Capability, Device, ThermostatSnapshot};

pub struct ThermostatDriver {
    api: ApiClient,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    max_age: Duration,
    devices: HashMap<String, ThermostatCache>,
}

impl ThermostatDriver {
    pub fn new(api: ApiClient, settings: Arc<dyn SettingsStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            settings,
            notifier,
            max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
            devices: HashMap::new(),
        }
    }

    /// Max age applied to caches of devices registered afterwards
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Register the devices the hub already knows about
    pub fn init(&mut self, devices: impl IntoIterator<Item = Device>) {
        for device in devices {
            self.added(device);
        }
        info!(count = self.devices.len(), "E-Thermostaat driver ready");
    }

    pub fn added(&mut self, device: Device) {
        debug!(device_id = %device.id, "Device added");
        let cache = ThermostatCache::new(
            device.clone(),
            self.api.clone(),
            Arc::clone(&self.settings),
            Arc::clone(&self.notifier),
        )
        .with_max_age(self.max_age);
        self.devices.insert(device.id, cache);
    }

    /// Forget a device and its cached reading. Returns false if unknown.
    pub fn deleted(&mut self, device_id: &str) -> bool {
        debug!(device_id, "Device deleted");
        self.devices.remove(device_id).is_some()
    }

    pub fn device_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.devices.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn cache(&self, device_id: &str) -> Result<&ThermostatCache> {
        self.devices
            .get(device_id)
            .ok_or_else(|| anyhow!("Unknown device: {}", device_id))
    }

    fn cache_mut(&mut self, device_id: &str) -> Result<&mut ThermostatCache> {
        self.devices
            .get_mut(device_id)
            .ok_or_else(|| anyhow!("Unknown device: {}", device_id))
    }

    /// Read a capability, from cache when the reading is recent enough
    pub async fn get(&mut self, device_id: &str, capability: Capability) -> Result<f64> {
        let snapshot = self.cache_mut(device_id)?.get(false).await?;
        Ok(match capability {
            Capability::TargetTemperature => snapshot.target_temperature,
            Capability::MeasureTemperature => snapshot.measured_temperature,
        })
    }

    /// Write a capability. Returns the value actually sent to the thermostat.
    pub async fn set(&mut self, device_id: &str, capability: Capability, value: f64) -> Result<f64> {
        if !capability.is_writable() {
            return Err(anyhow!("Capability {} is read-only", capability));
        }
        self.cache_mut(device_id)?.set_target(value).await
    }

    /// Bypass the cache and fetch a new reading
    pub async fn refresh(&mut self, device_id: &str) -> Result<ThermostatSnapshot> {
        self.cache_mut(device_id)?.get(true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemorySettings, RecordingNotifier};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_portal(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": {"code": 200},
                "token": "tok-1",
                "serialthermostat1": "ICY-9"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "temperature1": "21.5",
                "temperature2": "19.8"
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": {"code": 200}})))
            .mount(server)
            .await;
    }

    fn driver_for(server: &MockServer, notifier: Arc<RecordingNotifier>) -> ThermostatDriver {
        let api = ApiClient::with_base_url(server.uri()).unwrap();
        let mut driver = ThermostatDriver::new(api, Arc::new(MemorySettings::new()), notifier);
        driver.init([Device::new("ICY-9", "alice", "secret")]);
        driver
    }

    #[tokio::test]
    async fn test_get_capabilities() {
        let server = MockServer::start().await;
        mock_portal(&server).await;
        let mut driver = driver_for(&server, Arc::new(RecordingNotifier::new()));

        assert_eq!(driver.get("ICY-9", Capability::TargetTemperature).await.unwrap(), 21.5);
        assert_eq!(driver.get("ICY-9", Capability::MeasureTemperature).await.unwrap(), 19.8);
    }

    #[tokio::test]
    async fn test_set_returns_normalized_value() {
        let server = MockServer::start().await;
        mock_portal(&server).await;
        let notifier = Arc::new(RecordingNotifier::new());
        let mut driver = driver_for(&server, notifier.clone());

        let sent = driver.set("ICY-9", Capability::TargetTemperature, 1.0).await.unwrap();
        assert_eq!(sent, 5.0);
        assert!(notifier
            .events()
            .contains(&crate::host::Notification::Value {
                device_id: "ICY-9".into(),
                capability: Capability::TargetTemperature,
                value: 5.0,
            }));
    }

    #[tokio::test]
    async fn test_measure_temperature_is_read_only() {
        let server = MockServer::start().await;
        let mut driver = driver_for(&server, Arc::new(RecordingNotifier::new()));

        let err = driver
            .set("ICY-9", Capability::MeasureTemperature, 20.0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let server = MockServer::start().await;
        let mut driver = driver_for(&server, Arc::new(RecordingNotifier::new()));

        assert!(driver.get("nope", Capability::TargetTemperature).await.is_err());
        assert!(driver.cache("nope").is_err());
    }

    #[test]
    fn test_lifecycle() {
        let api = ApiClient::with_base_url("http://localhost").unwrap();
        let mut driver = ThermostatDriver::new(
            api,
            Arc::new(MemorySettings::new()),
            Arc::new(RecordingNotifier::new()),
        )
        .with_max_age(Duration::seconds(30));

        driver.init([Device::new("b", "u", "p"), Device::new("a", "u", "p")]);
        assert_eq!(driver.device_ids(), vec!["a", "b"]);
        assert_eq!(driver.cache("a").unwrap().max_age(), Duration::seconds(30));

        assert!(driver.deleted("a"));
        assert!(!driver.deleted("a"));
        assert_eq!(driver.device_ids(), vec!["b"]);
    }
}
