//! API Models
//!
//! Request and response payloads for the REST API, annotated for OpenAPI
//! documentation with `utoipa`. Domain types (scenarios, results) live in
//! `wardsim-core`; this module only defines the HTTP-facing envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use wardsim_core::scenario::{HospitalSetting, Interaction};

/// Full scenario definition as submitted by an instructor.
///
/// Used for both creation and update: an update is a diff-free overwrite
/// that preserves the scenario's id, author, and creation timestamp.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPayload {
    #[schema(example = "Chest Pain Assessment")]
    pub title: String,
    pub hospital_setting: HospitalSetting,
    pub description: String,
    pub patient_profile: String,
    /// Countdown length in minutes; omit or zero for untimed playback.
    #[serde(default)]
    pub timer_minutes: Option<u32>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[schema(example = "1234")]
    pub pin: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(value_type = String, format = Uuid)]
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePinPayload {
    #[schema(example = "4321")]
    pub pin: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
