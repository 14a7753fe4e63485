//! API client for communicating with the ICY portal.
//!
//! Every method issues exactly one HTTP request. Retrying is left to the
//! caller, which in practice means the next capability invocation.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::auth::{Credentials, LoginResponse, Session, SessionToken};
use crate::models::ThermostatSnapshot;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the ICY portal
pub const DEFAULT_API_URL: &str = "https://portal.icy.nl";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the session token on data requests
const SESSION_TOKEN_HEADER: &str = "Session-token";

/// API client for the ICY portal.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the production portal
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_URL)
    }

    /// Create a client for a different portal location (tests, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in and obtain a session token
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let url = self.url("/login");
        debug!(username = %credentials.username, "Requesting session token");

        let response = self
            .client
            .post(&url)
            .form(&credentials.form())
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .map_err(ApiError::from)
            .context("Failed to read login response body")?;
        let login: LoginResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("login: {}", e)))?;

        debug!(code = ?login.code(), "Login answered");
        Ok(login.into_session()?)
    }

    /// Fetch the current thermostat reading
    pub async fn fetch_data(
        &self,
        token: &SessionToken,
        credentials: &Credentials,
    ) -> Result<ThermostatSnapshot> {
        let url = self.url("/data");

        let response = self
            .client
            .get(&url)
            .header(SESSION_TOKEN_HEADER, token.as_str())
            .form(&credentials.form())
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let body: Value = response
            .json()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to parse JSON response from {}", url))?;

        Self::check_body_status(&body)?;

        let snapshot: ThermostatSnapshot = serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("data: {}", e)))?;
        Ok(snapshot)
    }

    /// Submit a new target temperature for a thermostat
    pub async fn write_target(
        &self,
        token: &SessionToken,
        device_id: &str,
        temperature: f64,
    ) -> Result<()> {
        let url = self.url("/data");
        let temperature = temperature.to_string();

        let response = self
            .client
            .post(&url)
            .header(SESSION_TOKEN_HEADER, token.as_str())
            .form(&[("uid", device_id), ("temperature1", temperature.as_str())])
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;

        // An empty or non-JSON reply carries no status and counts as accepted
        let text = response
            .text()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to read response body from {}", url))?;
        if let Ok(body) = serde_json::from_str::<Value>(&text) {
            Self::check_body_status(&body)?;
        }

        debug!(device_id, temperature = %temperature, "Target temperature submitted");
        Ok(())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// The portal answers data requests with HTTP 200 even when the token is
    /// refused; the real outcome sits in an optional `status.code`.
    fn check_body_status(body: &Value) -> Result<(), ApiError> {
        let code = body
            .get("status")
            .and_then(|s| s.get("code"))
            .and_then(|c| c.as_i64().or_else(|| c.as_str().and_then(|s| s.trim().parse().ok())));

        match code {
            None | Some(200) => Ok(()),
            Some(401) => Err(ApiError::Unauthorized),
            Some(code) => Err(ApiError::InvalidResponse(format!("Status code {} in data reply", code))),
        }
    }
}
