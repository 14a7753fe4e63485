//! REST API client module for the ICY portal.
//!
//! This module provides the `ApiClient` for logging in to the portal and
//! reading or writing thermostat data.
//!
//! The portal authorizes data requests with a `Session-token` header whose
//! value is obtained from the `/login` endpoint.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
