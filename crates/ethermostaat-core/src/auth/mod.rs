//! Authentication module for the ICY portal.
//!
//! This module provides:
//! - `Credentials`: username/password resolved from host settings per call
//! - `CredentialStore`: OS-level password storage via keyring
//! - `Session`: the outcome of a successful login
//!
//! Sessions are never reused: every remote operation logs in again.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, Credentials, PASSWORD_KEY, USERNAME_KEY};
pub use session::{LoginResponse, Session, SessionToken};
