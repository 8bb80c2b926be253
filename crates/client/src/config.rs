//! Client configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_URL_VAR: &str = "VOXGATE_API_URL";
const SESSION_FILE_VAR: &str = "VOXGATE_SESSION_FILE";
const TIMEOUT_VAR: &str = "VOXGATE_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_url: String,
    /// Where the session survives restarts.
    pub session_file: PathBuf,
    pub request_timeout: Duration,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: API URL must not be empty")]
    EmptyUrl { var: &'static str },

    #[error("{var}: '{value}' is not an http(s) URL")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var}: '{value}' is not a positive number of seconds")]
    InvalidTimeout { var: &'static str, value: String },
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = match lookup(API_URL_VAR) {
            Some(url) => normalize_api_url(API_URL_VAR, &url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let session_file = lookup(SESSION_FILE_VAR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: TIMEOUT_VAR,
                        value: raw,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url,
            session_file,
            request_timeout,
        })
    }

    /// Replace the API URL (e.g. from a command-line flag).
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url("--api-url", url)?;
        Ok(self)
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// HTTP client shared by the gateway and the resource client.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
    }
}

fn normalize_api_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::EmptyUrl { var });
    }
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(url.to_string()),
        _ => Err(ConfigError::InvalidUrl {
            var,
            value: raw.to_string(),
        }),
    }
}

fn default_session_file() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("voxgate").join("session.json"),
        None => PathBuf::from("voxgate-session.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.session_file.ends_with("session.json")
            || config.session_file.ends_with("voxgate-session.json"));
    }

    #[test]
    fn overrides_are_read_and_trailing_slash_trimmed() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("VOXGATE_API_URL", "https://api.example.org/"),
            ("VOXGATE_SESSION_FILE", "/tmp/vg.json"),
            ("VOXGATE_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://api.example.org");
        assert_eq!(config.session_file, PathBuf::from("/tmp/vg.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("VOXGATE_API_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyUrl { .. }));

        let err = ClientConfig::from_lookup(lookup(&[("VOXGATE_API_URL", "localhost:8000")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        for timeout in ["0", "soon", "-3"] {
            let err = ClientConfig::from_lookup(lookup(&[("VOXGATE_HTTP_TIMEOUT_SECS", timeout)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }), "{timeout}");
        }
    }

    #[test]
    fn flag_override_is_validated_too() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.clone().with_api_url("ftp://x").is_err());
        assert_eq!(
            config.with_api_url("http://10.0.0.2:9000//").unwrap().api_url,
            "http://10.0.0.2:9000"
        );
    }
}
