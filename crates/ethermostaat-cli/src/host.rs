//! Host collaborators for the command line.
//!
//! Settings come from the environment, the config file and the OS keychain.
//! Capability updates and pairing events are written to the log.

use ethermostaat_core::auth::{CredentialStore, PASSWORD_KEY, USERNAME_KEY};
use ethermostaat_core::host::{Notifier, PairingSocket, SettingsStore};
use ethermostaat_core::Capability;
use tracing::{debug, info, warn};

pub const USERNAME_ENV: &str = "ETHERMOSTAAT_USERNAME";
pub const PASSWORD_ENV: &str = "ETHERMOSTAAT_PASSWORD";

pub struct CliSettings {
    username: Option<String>,
}

impl CliSettings {
    /// `configured_username` is the one remembered in the config file
    pub fn new(configured_username: Option<String>) -> Self {
        let username = std::env::var(USERNAME_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or(configured_username);
        Self { username }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn password(&self) -> Option<String> {
        if let Some(password) = std::env::var(PASSWORD_ENV).ok().filter(|v| !v.is_empty()) {
            return Some(password);
        }
        let username = self.username.as_deref()?;
        match CredentialStore::get_password(username) {
            Ok(password) => Some(password),
            Err(e) => {
                debug!(error = %e, "No password in keychain");
                None
            }
        }
    }
}

impl SettingsStore for CliSettings {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            USERNAME_KEY => self.username.clone(),
            PASSWORD_KEY => self.password(),
            _ => None,
        }
    }
}

/// Sends capability updates to the log
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, device_id: &str, capability: Capability, value: f64) {
        info!(device_id, %capability, value, "Capability update");
    }

    fn set_available(&self, device_id: &str) {
        debug!(device_id, "Device available");
    }

    fn set_unavailable(&self, device_id: &str, reason: &str) {
        warn!(device_id, reason, "Device unavailable");
    }
}

/// Pairing events go to the log; the command reads the returned step
pub struct LogSocket;

impl PairingSocket for LogSocket {
    fn emit(&self, event: &str, payload: Option<&str>) {
        debug!(event, payload = ?payload, "Pairing event");
    }
}
