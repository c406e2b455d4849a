//! Collaborator Seams
//!
//! The engine's external collaborators are expressed as traits so the host
//! service can back them with its store while tests substitute mocks. The
//! engine itself never performs I/O; the session driver calls through these
//! seams at the session boundaries (scenario lookup at start, result
//! persistence at completion).

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::result::SimulationResult;
use crate::scenario::Scenario;

/// Read access to authored scenarios.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScenarioRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>>;
}

/// Destination for completed session results.
///
/// Recording is fire-and-forget from the session's point of view: a failure
/// here must be logged by the caller and never surfaced as a session failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn record(&self, scenario_id: &str, result: &SimulationResult) -> Result<()>;
}

/// Resolves a scenario for playback, turning an absent scenario into a
/// lookup failure so no session begins.
pub async fn load_scenario(repo: &dyn ScenarioRepository, id: &str) -> Result<Scenario> {
    repo.get_by_id(id)
        .await?
        .with_context(|| format!("Scenario '{id}' not found"))
}
