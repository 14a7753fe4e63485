//! Pairing flow.
//!
//! The hub's pairing UI submits credentials with `get_devices`; the session
//! answers through the socket with `continue` or `error`, and then hands the
//! thermostat found on the account to `list_devices`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::Credentials;
use crate::host::PairingSocket;
use crate::models::{Device, DeviceDescriptor};

pub const EVENT_CONTINUE: &str = "continue";
pub const EVENT_ERROR: &str = "error";

/// Payload of an `error` event for refused credentials
pub const PAYLOAD_NOT_AUTHORIZED: &str = "notauthorized";

/// Payload of an `error` event for everything else
pub const PAYLOAD_ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStep {
    Continue,
    NotAuthorized,
    Failed,
}

pub struct PairingSession {
    api: ApiClient,
    socket: Arc<dyn PairingSocket>,
    credentials: Option<Credentials>,
    serial: Option<String>,
}

impl PairingSession {
    pub fn new(api: ApiClient, socket: Arc<dyn PairingSocket>) -> Self {
        info!("ICY E-Thermostaat pairing has started");
        Self {
            api,
            socket,
            credentials: None,
            serial: None,
        }
    }

    /// Check the submitted credentials against the portal
    pub async fn get_devices(&mut self, username: &str, password: &str) -> PairingStep {
        let credentials = Credentials::new(username, password);
        info!(username, "Checking E-Thermostaat credentials");

        let step = match self.api.login(&credentials).await {
            Ok(session) => {
                info!(serial = ?session.serial, "E-Thermostaat credentials accepted");
                self.serial = Some(session.serial.unwrap_or_default());
                self.credentials = Some(credentials);
                PairingStep::Continue
            }
            Err(e) => {
                let step = Self::classify(&e);
                warn!(error = %e, ?step, "E-Thermostaat credentials could not be verified");
                step
            }
        };

        match step {
            PairingStep::Continue => self.socket.emit(EVENT_CONTINUE, None),
            PairingStep::NotAuthorized => self.socket.emit(EVENT_ERROR, Some(PAYLOAD_NOT_AUTHORIZED)),
            PairingStep::Failed => self.socket.emit(EVENT_ERROR, Some(PAYLOAD_ERROR)),
        }
        step
    }

    /// Transport and parse failures are plain errors; any answer from the
    /// portal that is not a success counts as not authorized.
    fn classify(error: &anyhow::Error) -> PairingStep {
        match error.downcast_ref::<ApiError>() {
            Some(
                ApiError::NotAuthorized
                | ApiError::Unauthorized
                | ApiError::LoginRejected(_)
                | ApiError::ServiceUnavailable,
            ) => PairingStep::NotAuthorized,
            _ => PairingStep::Failed,
        }
    }

    /// Thermostat found by the last successful `get_devices`
    pub fn list_devices(&self) -> Vec<DeviceDescriptor> {
        match (&self.serial, &self.credentials) {
            (Some(serial), Some(credentials)) => vec![DeviceDescriptor::new(Device::new(
                serial.clone(),
                credentials.username.clone(),
                credentials.password.clone(),
            ))],
            _ => Vec::new(),
        }
    }

    pub fn disconnect(&mut self) {
        info!("E-Thermostaat pairing disconnected");
        self.credentials = None;
        self.serial = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingSocket;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn session_answering(body: serde_json::Value) -> (MockServer, PairingSession, Arc<RecordingSocket>) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let socket = Arc::new(RecordingSocket::new());
        let api = ApiClient::with_base_url(server.uri()).unwrap();
        let session = PairingSession::new(api, socket.clone());
        (server, session, socket)
    }

    #[tokio::test]
    async fn test_accepted_credentials_continue() {
        let (_server, mut session, socket) = session_answering(json!({
            "status": {"code": 200},
            "token": "tok",
            "serialthermostat1": "ICY-77"
        }))
        .await;

        assert!(session.list_devices().is_empty());
        assert_eq!(session.get_devices("alice", "secret").await, PairingStep::Continue);
        assert_eq!(socket.last(), Some((EVENT_CONTINUE.to_string(), None)));

        let devices = session.list_devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "E-Thermostaat");
        assert_eq!(devices[0].data, Device::new("ICY-77", "alice", "secret"));
    }

    #[tokio::test]
    async fn test_rejected_credentials_not_authorized() {
        let (_server, mut session, socket) = session_answering(json!({"status": {"code": 401}})).await;

        assert_eq!(session.get_devices("alice", "wrong").await, PairingStep::NotAuthorized);
        assert_eq!(
            socket.last(),
            Some((EVENT_ERROR.to_string(), Some(PAYLOAD_NOT_AUTHORIZED.to_string())))
        );
        assert!(session.list_devices().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_status_not_authorized() {
        let (_server, mut session, socket) = session_answering(json!({"status": {"code": 500}})).await;

        assert_eq!(session.get_devices("alice", "secret").await, PairingStep::NotAuthorized);
        assert_eq!(
            socket.last(),
            Some((EVENT_ERROR.to_string(), Some(PAYLOAD_NOT_AUTHORIZED.to_string())))
        );
    }

    #[tokio::test]
    async fn test_unreachable_portal_is_error() {
        let socket = Arc::new(RecordingSocket::new());
        let api = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
        let mut session = PairingSession::new(api, socket.clone());

        assert_eq!(session.get_devices("alice", "secret").await, PairingStep::Failed);
        assert_eq!(
            socket.last(),
            Some((EVENT_ERROR.to_string(), Some(PAYLOAD_ERROR.to_string())))
        );
    }

    #[tokio::test]
    async fn test_disconnect_forgets_credentials() {
        let (_server, mut session, _socket) = session_answering(json!({
            "status": {"code": 200},
            "token": "tok",
            "serialthermostat1": "ICY-77"
        }))
        .await;

        session.get_devices("alice", "secret").await;
        session.disconnect();
        assert!(session.list_devices().is_empty());
    }
}
