//! Collaborators provided by the hosting hub.
//!
//! The core only ever reads settings, emits pairing events and pushes
//! capability values. Hosts implement these traits; the in-memory versions
//! below serve tests and simple embeddings such as the CLI.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::models::Capability;

/// Read access to the host's settings store
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Event channel back to the pairing UI
pub trait PairingSocket: Send + Sync {
    fn emit(&self, event: &str, payload: Option<&str>);
}

/// Realtime capability updates and device availability
pub trait Notifier: Send + Sync {
    fn notify(&self, device_id: &str, capability: Capability, value: f64);

    fn set_available(&self, _device_id: &str) {}

    fn set_unavailable(&self, _device_id: &str, _reason: &str) {}
}

/// Settings held in a plain map
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Value {
        device_id: String,
        capability: Capability,
        value: f64,
    },
    Available(String),
    Unavailable { device_id: String, reason: String },
}

/// Notifier that keeps everything it was told, in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent value pushed for a device capability
    pub fn last_value(&self, device_id: &str, capability: Capability) -> Option<f64> {
        self.events().into_iter().rev().find_map(|event| match event {
            Notification::Value {
                device_id: id,
                capability: cap,
                value,
            } if id == device_id && cap == capability => Some(value),
            _ => None,
        })
    }

    fn push(&self, notification: Notification) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, device_id: &str, capability: Capability, value: f64) {
        debug!(device_id, %capability, value, "Capability update");
        self.push(Notification::Value {
            device_id: device_id.to_string(),
            capability,
            value,
        });
    }

    fn set_available(&self, device_id: &str) {
        self.push(Notification::Available(device_id.to_string()));
    }

    fn set_unavailable(&self, device_id: &str, reason: &str) {
        self.push(Notification::Unavailable {
            device_id: device_id.to_string(),
            reason: reason.to_string(),
        });
    }
}

/// Pairing socket that records emitted events as `(event, payload)` pairs
#[derive(Debug, Default)]
pub struct RecordingSocket {
    events: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingSocket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Option<String>)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<(String, Option<String>)> {
        self.events().pop()
    }
}

impl PairingSocket for RecordingSocket {
    fn emit(&self, event: &str, payload: Option<&str>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((event.to_string(), payload.map(str::to_string)));
    }
}
