//! In-memory session model.

use serde::{Deserialize, Serialize};

use crate::{AuthError, Role};

/// Identity handed back by a successful login.
///
/// Token and role travel together, so a session can never hold one without
/// the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub token: String,
    pub username: String,
    pub role: Role,
}

impl SessionGrant {
    pub fn new(token: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
            role,
        }
    }

    /// Validate raw identity-service fields into a grant.
    ///
    /// `username` is whatever the caller submitted, not what the server says.
    pub fn from_wire(
        token: Option<&str>,
        username: impl Into<String>,
        role: Option<&str>,
    ) -> Result<Self, AuthError> {
        let role = role.ok_or_else(|| AuthError::malformed("Role not provided by server"))?;
        let role: Role = role
            .parse()
            .map_err(|e| AuthError::malformed(format!("{e} provided by server")))?;

        let grant = Self::new(token.unwrap_or_default(), username, role);
        grant.check()?;
        Ok(grant)
    }

    /// Reject a grant that cannot back a session.
    pub fn check(&self) -> Result<(), AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::malformed("Access token not provided by server"));
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Authenticating,
    Authenticated,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Authenticating => "authenticating",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Failed => "failed",
        }
    }
}

impl core::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication state of the client.
///
/// Only [`crate::reduce`] changes a session after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub(crate) grant: Option<SessionGrant>,
    pub(crate) status: SessionStatus,
    pub(crate) error: Option<String>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(grant: SessionGrant) -> Self {
        Self {
            grant: Some(grant),
            status: SessionStatus::Authenticated,
            error: None,
        }
    }

    /// Rebuild a session from persisted values.
    ///
    /// Anything short of a complete record with a recognized role yields an
    /// empty session; a tampered store must not produce a half-authorized one.
    pub fn rehydrate(
        token: Option<String>,
        username: Option<String>,
        role: Option<String>,
    ) -> Self {
        match (token, username, role) {
            (None, None, None) => Self::empty(),
            (Some(token), Some(username), Some(role)) if !token.is_empty() => {
                match role.parse::<Role>() {
                    Ok(role) => Self::authenticated(SessionGrant::new(token, username, role)),
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "stored session has an unrecognized role; ignoring it"
                        );
                        Self::empty()
                    }
                }
            }
            _ => {
                tracing::warn!("stored session is incomplete; ignoring it");
                Self::empty()
            }
        }
    }

    pub fn grant(&self) -> Option<&SessionGrant> {
        self.grant.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.grant.as_ref().map(|g| g.token.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.grant.as_ref().map(|g| g.username.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.grant.as_ref().map(|g| g.role)
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Message from the last failed login, if the session is in `failed`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.grant.is_some()
    }
}
