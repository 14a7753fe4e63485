use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::api::ApiError;
use crate::models::thermostat::deserialize_string_or_number;

/// Status code the portal reports for accepted credentials
const STATUS_OK: i64 = 200;

/// Status code the portal reports for rejected credentials
const STATUS_NOT_AUTHORIZED: i64 = 401;

/// Opaque token sent as the `Session-token` header
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} chars>)", self.0.len())
    }
}

/// A successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    /// Serial of the first thermostat on the account
    pub serial: Option<String>,
}

/// Body of the `/login` reply. The HTTP status is always 200; the outcome is
/// carried in `status.code`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    status: Option<LoginStatus>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    serialthermostat1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginStatus {
    #[serde(default)]
    code: Option<Value>,
}

impl LoginResponse {
    /// Status code, accepting both `200` and `"200"`
    pub fn code(&self) -> Option<i64> {
        let code = self.status.as_ref()?.code.as_ref()?;
        match code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the reply.
    ///
    /// A reply without a status code means the webservice is not answering
    /// properly and is reported as unavailable.
    pub fn into_session(self) -> Result<Session, ApiError> {
        match self.code() {
            None => Err(ApiError::ServiceUnavailable),
            Some(STATUS_OK) => {
                let token = self
                    .token
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| ApiError::InvalidResponse("Login succeeded without a token".into()))?;
                Ok(Session {
                    token: SessionToken::new(token),
                    serial: self.serialthermostat1,
                })
            }
            Some(STATUS_NOT_AUTHORIZED) => Err(ApiError::NotAuthorized),
            Some(code) => Err(ApiError::LoginRejected(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LoginResponse {
        serde_json::from_str(json).expect("Failed to parse login test JSON")
    }

    #[test]
    fn test_successful_login() {
        let session = parse(r#"{"status": {"code": 200}, "token": "abc", "serialthermostat1": "ICY-42"}"#)
            .into_session()
            .unwrap();
        assert_eq!(session.token.as_str(), "abc");
        assert_eq!(session.serial.as_deref(), Some("ICY-42"));
    }

    #[test]
    fn test_string_status_code() {
        let response = parse(r#"{"status": {"code": "200"}, "token": "abc", "serialthermostat1": 1234}"#);
        assert_eq!(response.code(), Some(200));
        assert_eq!(response.into_session().unwrap().serial.as_deref(), Some("1234"));
    }

    #[test]
    fn test_float_serial() {
        let response = parse(r#"{"status": {"code": 200}, "token": "abc", "serialthermostat1": 1234.0}"#);
        assert_eq!(response.into_session().unwrap().serial.as_deref(), Some("1234"));
    }

    #[test]
    fn test_not_authorized() {
        let err = parse(r#"{"status": {"code": 401}}"#).into_session().unwrap_err();
        assert!(matches!(err, ApiError::NotAuthorized));
    }

    #[test]
    fn test_other_status_is_rejected() {
        let err = parse(r#"{"status": {"code": 403}}"#).into_session().unwrap_err();
        assert!(matches!(err, ApiError::LoginRejected(403)));
    }

    #[test]
    fn test_missing_status_means_offline() {
        for json in [r#"{}"#, r#"{"status": null}"#, r#"{"status": {"code": null}}"#] {
            let err = parse(json).into_session().unwrap_err();
            assert!(matches!(err, ApiError::ServiceUnavailable), "{json}");
        }
    }

    #[test]
    fn test_ok_without_token_is_invalid() {
        let err = parse(r#"{"status": {"code": 200}, "token": ""}"#).into_session().unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("secret-token");
        assert!(!format!("{:?}", token).contains("secret"));
    }
}
