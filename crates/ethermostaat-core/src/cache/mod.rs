//! Short-lived caching of thermostat readings.
//!
//! This module provides the `ThermostatCache`, one per paired device. A
//! reading is served from memory for two minutes; after that, or when a
//! caller forces it, the cache logs in again and fetches a fresh reading.
//!
//! Nothing is persisted: a restarted host starts with an empty cache.

pub mod manager;

pub use manager::{CachedData, ThermostatCache, DEFAULT_MAX_AGE_SECS};
