use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role granted to an authenticated user.
///
/// The set is closed: anything the identity service sends outside of it is
/// rejected at parse time, so guard logic never sees an unknown role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[serde(alias = "datacollector")]
    DataCollector,
    Transcriber,
    Validator,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::DataCollector,
        Role::Transcriber,
        Role::Validator,
    ];

    /// Canonical name, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::DataCollector => "data_collector",
            Role::Transcriber => "transcriber",
            Role::Validator => "validator",
        }
    }

    /// The dashboard this role lands on after login or a refused navigation.
    pub fn home_path(&self) -> &'static str {
        crate::guard::Route::Dashboard(*self).path()
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            // The identity service spells it without the underscore.
            "data_collector" | "datacollector" => Ok(Role::DataCollector),
            "transcriber" => Ok(Role::Transcriber),
            "validator" => Ok(Role::Validator),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
