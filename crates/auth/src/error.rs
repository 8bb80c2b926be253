//! Login error model.

use thiserror::Error;

/// Why a login attempt did not produce a session.
///
/// The two kinds stay distinct internally but are shown to the user as one
/// message (see [`AuthError::user_message`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The identity endpoint rejected the credentials or could not be reached.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The endpoint answered with success but the body is not a usable session.
    #[error("{0}")]
    MalformedResponse(String),
}

impl AuthError {
    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials(msg) | AuthError::MalformedResponse(msg) => msg,
        }
    }

    /// Presentation string shown next to the login form.
    pub fn user_message(&self) -> String {
        let msg = self.message();
        if msg.is_empty() {
            "Login failed".to_string()
        } else {
            format!("Login failed: {msg}")
        }
    }
}
