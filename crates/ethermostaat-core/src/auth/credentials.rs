use std::fmt;

use anyhow::{Context, Result};
use keyring::Entry;

use crate::host::SettingsStore;
use crate::models::Device;

const SERVICE_NAME: &str = "ethermostaat";

/// Settings key holding the portal username
pub const USERNAME_KEY: &str = "username";

/// Settings key holding the portal password
pub const PASSWORD_KEY: &str = "password";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Current credentials for a device.
    ///
    /// Settings win over the values captured at pairing time, so a password
    /// changed in the hub takes effect on the next call.
    pub fn resolve(settings: &dyn SettingsStore, device: &Device) -> Self {
        let lookup = |key: &str| settings.get(key).filter(|v| !v.is_empty());
        Self {
            username: lookup(USERNAME_KEY).unwrap_or_else(|| device.username.clone()),
            password: lookup(PASSWORD_KEY).unwrap_or_else(|| device.password.clone()),
        }
    }

    /// Form fields for endpoints that take the credentials in the body
    pub fn form(&self) -> [(&'static str, &str); 2] {
        [
            (USERNAME_KEY, self.username.as_str()),
            (PASSWORD_KEY, self.password.as_str()),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub struct CredentialStore;

impl CredentialStore {
    /// Store username and password in the OS keychain.
    ///
    /// The password is read back through a fresh entry; a keychain that
    /// accepts the write but keeps nothing (no platform backend) is an error.
    pub fn store(username: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;

        let stored = Self::get_password(username)
            .context("Password was not persisted in keychain")?;
        if stored != password {
            anyhow::bail!("Keychain returned a different password than was stored");
        }
        Ok(())
    }

    /// Retrieve password for a username from the OS keychain
    pub fn get_password(username: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete stored credentials for a username
    pub fn delete(username: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Check if credentials exist for a username
    pub fn has_credentials(username: &str) -> bool {
        if let Ok(entry) = Entry::new(SERVICE_NAME, username) {
            entry.get_password().is_ok()
        } else {
            false
        }
    }
}
