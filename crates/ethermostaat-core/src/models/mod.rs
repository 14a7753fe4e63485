//! Data models for the E-Thermostaat integration.
//!
//! - `ThermostatSnapshot`: one reading of the `/data` endpoint
//! - `Device`, `DeviceDescriptor`: a paired thermostat and its pairing record
//! - `Capability`: the hub-facing properties a thermostat exposes

pub mod device;
pub mod thermostat;

pub use device::{Capability, Device, DeviceDescriptor, DEVICE_NAME};
pub use thermostat::ThermostatSnapshot;
