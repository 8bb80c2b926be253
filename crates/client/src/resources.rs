//! Bearer-authorized calls to the backend resource endpoints.
//!
//! Every request carries `Authorization: Bearer <token>`. Authorization
//! failures (401/403) are not special-cased: like any other non-2xx answer
//! they surface as [`RequestError::Status`].

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::types::{
    AssignmentResponse, AudioAssignment, AudioItem, MessageResponse, NewUser, ReviewDecision,
    TranscriptionResponse,
};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("No auth token")]
    MissingToken,

    #[error("network error: {0}")]
    Network(String),

    /// Non-success status; `message` is what the backend said about it.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Decoded response body: JSON when the backend says so, text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceBody {
    Json(Value),
    Text(String),
}

impl ResourceBody {
    /// Decode into `T`. Text bodies are accepted if they happen to hold JSON.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        let value = match self {
            ResourceBody::Json(value) => value,
            ResourceBody::Text(text) => serde_json::from_str(&text)
                .map_err(|_| RequestError::Decode(format!("expected JSON, got text: {text}")))?,
        };
        serde_json::from_value(value).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    api_url: String,
}

impl ResourceClient {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> reqwest::Result<Self> {
        Ok(Self::new(config.http_client()?, &config.api_url))
    }

    /// Send one authorized request to `path` (relative to the API root).
    pub async fn send(
        &self,
        token: Option<&str>,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ResourceBody, RequestError> {
        let token = token.ok_or(RequestError::MissingToken)?;
        let url = format!("{}{}", self.api_url, path);

        let mut req = self.http.request(method.clone(), &url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        let status = resp.status();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = resp
            .text()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = failure_message(status, &text);
            tracing::warn!(
                %method,
                path,
                status = status.as_u16(),
                %message,
                "resource request failed"
            );
            return Err(RequestError::Status {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(%method, path, status = status.as_u16(), "resource request ok");

        if is_json {
            serde_json::from_str(&text)
                .map(ResourceBody::Json)
                .map_err(|e| RequestError::Decode(e.to_string()))
        } else {
            Ok(ResourceBody::Text(text))
        }
    }

    async fn call<B, T>(
        &self,
        token: Option<&str>,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, RequestError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| RequestError::Decode(e.to_string()))?;
        self.send(token, method, path, body.as_ref()).await?.decode()
    }

    pub async fn assigned_audios(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<AudioItem>, RequestError> {
        self.call::<(), _>(token, Method::GET, "/assigned-audios", None)
            .await
    }

    pub async fn create_user(
        &self,
        token: Option<&str>,
        user: &NewUser,
    ) -> Result<MessageResponse, RequestError> {
        self.call(token, Method::POST, "/create-user", Some(user)).await
    }

    pub async fn assign_audio(
        &self,
        token: Option<&str>,
        assignment: &AudioAssignment,
    ) -> Result<AssignmentResponse, RequestError> {
        self.call(token, Method::POST, "/assign-audio", Some(assignment))
            .await
    }

    pub async fn force_transcription(
        &self,
        token: Option<&str>,
        audio_id: u64,
    ) -> Result<TranscriptionResponse, RequestError> {
        let path = format!("/force-transcription/{audio_id}");
        self.call::<(), _>(token, Method::POST, &path, None).await
    }

    pub async fn review_transcription(
        &self,
        token: Option<&str>,
        audio_id: u64,
        approve: bool,
    ) -> Result<MessageResponse, RequestError> {
        let path = format!("/review-transcription/{audio_id}");
        self.call(token, Method::POST, &path, Some(&ReviewDecision { approve }))
            .await
    }

    /// Free-form report; the backend does not fix its shape.
    pub async fn audio_quality_report(
        &self,
        token: Option<&str>,
        audio_id: u64,
    ) -> Result<ResourceBody, RequestError> {
        let path = format!("/audio-quality-report/{audio_id}");
        self.send(token, Method::GET, &path, None).await
    }

    /// Direct download link; fetching it is left to the caller.
    pub fn download_audio_url(&self, audio_id: u64) -> String {
        format!("{}/download-audio/{audio_id}", self.api_url)
    }
}

/// Best human-readable reason for a failed request.
fn failure_message(status: StatusCode, text: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(text) {
        for field in ["detail", "msg"] {
            match json.get(field) {
                None | Some(Value::Null) | Some(Value::Bool(false)) => {}
                Some(Value::String(s)) => {
                    if !s.is_empty() {
                        return s.clone();
                    }
                }
                // Zero is as empty as a missing field.
                Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {}
                Some(other) => return other.to_string(),
            }
        }
        return json.to_string();
    }

    if !text.is_empty() {
        return text.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("Request failed: {} {reason}", status.as_u16()),
        None => format!("Request failed: {}", status.as_u16()),
    }
}
