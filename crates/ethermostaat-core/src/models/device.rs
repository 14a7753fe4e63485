use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name given to every thermostat produced by pairing
pub const DEVICE_NAME: &str = "E-Thermostaat";

/// A paired thermostat.
///
/// `id` is the thermostat serial reported by the login endpoint. The
/// credentials are the ones that were accepted during pairing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub username: String,
    pub password: String,
}

impl Device {
    pub fn new(id: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What pairing hands back to the hub for each discovered thermostat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub data: Device,
    pub name: String,
}

impl DeviceDescriptor {
    pub fn new(data: Device) -> Self {
        Self {
            data,
            name: DEVICE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    TargetTemperature,
    MeasureTemperature,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::TargetTemperature => "target_temperature",
            Capability::MeasureTemperature => "measure_temperature",
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, Capability::TargetTemperature)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "target_temperature" | "target" => Ok(Capability::TargetTemperature),
            "measure_temperature" | "measure" | "measured" => Ok(Capability::MeasureTemperature),
            other => Err(anyhow::anyhow!("Unknown capability: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_from_str() {
        assert_eq!("target_temperature".parse::<Capability>().unwrap(), Capability::TargetTemperature);
        assert_eq!("Target".parse::<Capability>().unwrap(), Capability::TargetTemperature);
        assert_eq!("measure".parse::<Capability>().unwrap(), Capability::MeasureTemperature);
        assert!("humidity".parse::<Capability>().is_err());
    }

    #[test]
    fn test_capability_writable() {
        assert!(Capability::TargetTemperature.is_writable());
        assert!(!Capability::MeasureTemperature.is_writable());
    }

    #[test]
    fn test_device_debug_hides_password() {
        let device = Device::new("ICY-1", "alice", "hunter2");
        let debug = format!("{:?}", device);
        assert!(debug.contains("ICY-1"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_descriptor_json_shape() {
        let descriptor = DeviceDescriptor::new(Device::new("ICY-1", "alice", "secret"));
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["name"], "E-Thermostaat");
        assert_eq!(value["data"]["id"], "ICY-1");
        assert_eq!(value["data"]["username"], "alice");
        assert_eq!(value["data"]["password"], "secret");
    }
}
