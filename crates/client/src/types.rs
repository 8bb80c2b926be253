//! Wire types for the backend resource endpoints.
//!
//! These mirror the backend's JSON shapes; fields the backend may omit are
//! `Option` with a serde default.

use serde::{Deserialize, Serialize, Serializer};
use voxgate_auth::Role;

/// An audio recording moving through collection, transcription and review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioItem {
    pub id: u64,
    pub topic: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub download_url: String,
    pub filename: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub quality_issues: Option<Vec<String>>,
    #[serde(default)]
    pub ai_transcription: Option<String>,
    #[serde(default)]
    pub ai_transcription_english: Option<String>,
    #[serde(default)]
    pub human_transcription: Option<String>,
    #[serde(default)]
    pub final_transcription: Option<String>,
}

/// Body of `POST /create-user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(serialize_with = "backend_role")]
    pub role: Role,
}

/// The backend stores the collector role without the underscore.
fn backend_role<S: Serializer>(role: &Role, s: S) -> Result<S::Ok, S::Error> {
    match role {
        Role::DataCollector => s.serialize_str("datacollector"),
        other => s.serialize_str(other.as_str()),
    }
}

/// Body of `POST /assign-audio`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioAssignment {
    pub topic: String,
    pub collector_id: u64,
    pub transcriber_id: u64,
    pub validator_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDecision {
    pub approve: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignmentResponse {
    pub msg: String,
    #[serde(default)]
    pub audio_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptionResponse {
    pub msg: String,
    #[serde(default)]
    pub transcription: Option<String>,
}
