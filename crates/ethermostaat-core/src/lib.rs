//! ICY E-Thermostaat integration.
//!
//! Exposes the `target_temperature` and `measure_temperature` capabilities
//! of a cloud-connected thermostat, backed by the ICY portal's HTTP API.
//!
//! - `api`: HTTP client for `/login` and `/data`
//! - `auth`: credentials, keychain storage and session tokens
//! - `cache`: per-device reading cache with a two minute lifetime
//! - `driver`: capability get/set routed to the device caches
//! - `pairing`: credential check and device listing for the pairing UI
//! - `host`: the hub collaborators the core talks to

pub mod api;
pub mod auth;
pub mod cache;
pub mod driver;
pub mod host;
pub mod models;
pub mod pairing;
pub mod temperature;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::ThermostatCache;
pub use driver::ThermostatDriver;
pub use models::{Capability, Device, DeviceDescriptor, ThermostatSnapshot};
pub use pairing::{PairingSession, PairingStep};
