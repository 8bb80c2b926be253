//! Credential exchange with the identity endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use voxgate_auth::{AuthError, SessionGrant};

use crate::config::ClientConfig;

/// Turns a username/password pair into a session grant.
///
/// Exactly one attempt per call; retry policy belongs to the caller.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionGrant, AuthError>;
}

/// Success body of `POST /token`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    role: Option<String>,
}

/// Gateway backed by the identity service's form-encoded `/token` endpoint.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    token_url: String,
}

impl HttpGateway {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            token_url: format!("{}/token", api_url.trim_end_matches('/')),
        }
    }

    pub fn from_config(config: &ClientConfig) -> reqwest::Result<Self> {
        Ok(Self::new(config.http_client()?, &config.api_url))
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionGrant, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::invalid_credentials(
                "Username and password are required",
            ));
        }

        let resp = self
            .http
            .post(&self.token_url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %self.token_url, "identity endpoint unreachable");
                AuthError::invalid_credentials(format!("Invalid credentials ({e})"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::info!(%username, status = status.as_u16(), "identity endpoint rejected login");
            return Err(AuthError::invalid_credentials("Invalid credentials"));
        }

        let body: TokenResponse = resp.json().await.map_err(|e| {
            tracing::warn!(error = %e, "identity endpoint returned an unreadable body");
            AuthError::malformed(format!("Unreadable response from server: {e}"))
        })?;

        if let Some(kind) = body.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                tracing::debug!(
                    token_type = kind,
                    "unexpected token type; using it as bearer anyway"
                );
            }
        }

        let grant = SessionGrant::from_wire(
            body.access_token.as_deref(),
            username,
            body.role.as_deref(),
        )?;

        tracing::info!(%username, role = %grant.role, "login accepted by identity endpoint");
        Ok(grant)
    }
}
