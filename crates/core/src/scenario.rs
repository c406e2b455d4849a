//! Scenario Data Model
//!
//! A scenario is an authored, ordered training script: a sequence of scripted
//! system/patient messages interleaved with nurse-response prompts that the
//! learner answers at runtime. Scenarios are immutable for the duration of a
//! playback session; editing replaces the whole definition while preserving
//! its identity and authoring metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The hospital unit a scenario takes place in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HospitalSetting {
    Emergency,
    Icu,
    Medical,
    Surgical,
    Pediatric,
    Maternity,
}

impl HospitalSetting {
    /// Human-readable name for display in clients.
    pub fn display_name(&self) -> &'static str {
        match self {
            HospitalSetting::Emergency => "Emergency Department",
            HospitalSetting::Icu => "Intensive Care Unit",
            HospitalSetting::Medical => "Medical Ward",
            HospitalSetting::Surgical => "Surgical Ward",
            HospitalSetting::Pediatric => "Pediatric Unit",
            HospitalSetting::Maternity => "Maternity Ward",
        }
    }
}

/// One scripted step within a scenario.
///
/// `system` and `patient` steps carry a display message and auto-advance.
/// `nurse` steps carry no message of their own; the learner supplies the text
/// at runtime and it is scored against `expected_response`, a comma-delimited
/// keyword list. An empty keyword list marks the prompt as ungraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Interaction {
    System {
        message: String,
    },
    Patient {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Nurse {
        /// Comma-delimited keywords the learner's answer is matched against.
        #[serde(default)]
        expected_response: String,
        /// A model answer shown during result review.
        #[serde(default)]
        correct_response: String,
        /// Optional explanation of why the model answer is appropriate.
        #[serde(default)]
        rationale: String,
    },
}

impl Interaction {
    pub fn is_nurse(&self) -> bool {
        matches!(self, Interaction::Nurse { .. })
    }
}

/// An authored training script.
///
/// The `interactions` order is significant and fixed at authoring time; it is
/// the script the simulation engine replays. A missing `interactions` field in
/// stored data deserializes to an empty script rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub hospital_setting: HospitalSetting,
    pub description: String,
    pub patient_profile: String,
    /// Countdown length in minutes. Absent or zero means untimed.
    #[serde(default)]
    pub timer_minutes: Option<u32>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    pub created_by: String,
    pub date_created: DateTime<Utc>,
}

impl Scenario {
    /// Number of nurse prompts in the script, i.e. the number of gradeable
    /// questions a full playthrough answers.
    pub fn total_nurse_interactions(&self) -> usize {
        self.interactions.iter().filter(|i| i.is_nurse()).count()
    }

    /// Whether a countdown should run during playback.
    pub fn is_timed(&self) -> bool {
        self.timer_minutes.is_some_and(|m| m > 0)
    }
}
