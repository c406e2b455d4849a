//! Data Store
//!
//! JSON-file-backed persistence for scenarios, session results and the
//! instructor PIN. Everything is held in memory behind `RwLock`s and written
//! back as whole files on mutation; the data set is small (tens of scenarios,
//! hundreds of results) so full-file rewrites are the simplest durable option.
//!
//! Concurrent writers serialize on the lock, so the last write wins at the
//! file level too. A fresh data directory is seeded with the built-in
//! scenarios from [`crate::seed`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use wardsim_core::repository::{ResultSink, ScenarioRepository};
use wardsim_core::result::{SimulationResult, StoredResult};
use wardsim_core::scenario::Scenario;

use crate::models::ScenarioPayload;
use crate::seed;

const SCENARIOS_FILE: &str = "scenarios.json";
const RESULTS_FILE: &str = "results.json";
const PIN_FILE: &str = "pin.txt";

pub struct Store {
    dir: PathBuf,
    scenarios: RwLock<Vec<Scenario>>,
    results: RwLock<Vec<StoredResult>>,
    pin: RwLock<String>,
}

impl Store {
    /// Opens the store at `dir`, creating and seeding it on first run.
    ///
    /// `default_pin` is only used when no PIN has been stored yet; once an
    /// instructor changes the PIN, the stored value takes precedence over
    /// configuration.
    #[instrument(skip(default_pin))]
    pub async fn open(dir: &Path, default_pin: &str) -> Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

        let scenarios_path = dir.join(SCENARIOS_FILE);
        let scenarios = if scenarios_path.exists() {
            read_json(&scenarios_path).await?
        } else {
            let seeded = seed::default_scenarios();
            write_json(&scenarios_path, &seeded).await?;
            info!(count = seeded.len(), "Seeded data store with built-in scenarios");
            seeded
        };

        let results_path = dir.join(RESULTS_FILE);
        let results = if results_path.exists() {
            read_json(&results_path).await?
        } else {
            Vec::new()
        };

        let pin_path = dir.join(PIN_FILE);
        let pin = if pin_path.exists() {
            tokio::fs::read_to_string(&pin_path)
                .await
                .with_context(|| format!("Failed to read {}", pin_path.display()))?
                .trim()
                .to_string()
        } else {
            default_pin.to_string()
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            scenarios: RwLock::new(scenarios),
            results: RwLock::new(results),
            pin: RwLock::new(pin),
        })
    }

    // --- Scenarios ---

    pub async fn list_scenarios(&self) -> Vec<Scenario> {
        self.scenarios.read().await.clone()
    }

    pub async fn get_scenario(&self, id: &str) -> Option<Scenario> {
        self.scenarios
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Creates a new instructor-authored scenario. Ids are timestamp-based,
    /// matching the record shape older exports used.
    pub async fn create_scenario(&self, payload: ScenarioPayload) -> Result<Scenario> {
        let scenario = Scenario {
            id: format!("custom-{}", Utc::now().timestamp_millis()),
            title: payload.title,
            hospital_setting: payload.hospital_setting,
            description: payload.description,
            patient_profile: payload.patient_profile,
            timer_minutes: payload.timer_minutes,
            interactions: payload.interactions,
            created_by: "instructor".to_string(),
            date_created: Utc::now(),
        };

        let mut scenarios = self.scenarios.write().await;
        scenarios.push(scenario.clone());
        write_json(&self.dir.join(SCENARIOS_FILE), &*scenarios).await?;
        Ok(scenario)
    }

    /// Replaces a scenario's definition, keeping its id, author and creation
    /// timestamp. Returns `None` when no scenario has the given id.
    pub async fn update_scenario(
        &self,
        id: &str,
        payload: ScenarioPayload,
    ) -> Result<Option<Scenario>> {
        let mut scenarios = self.scenarios.write().await;
        let Some(existing) = scenarios.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        existing.title = payload.title;
        existing.hospital_setting = payload.hospital_setting;
        existing.description = payload.description;
        existing.patient_profile = payload.patient_profile;
        existing.timer_minutes = payload.timer_minutes;
        existing.interactions = payload.interactions;
        let updated = existing.clone();

        write_json(&self.dir.join(SCENARIOS_FILE), &*scenarios).await?;
        Ok(Some(updated))
    }

    /// Deletes a scenario. Returns `false` when no scenario had the given id.
    /// Recorded results for the scenario are kept.
    pub async fn delete_scenario(&self, id: &str) -> Result<bool> {
        let mut scenarios = self.scenarios.write().await;
        let before = scenarios.len();
        scenarios.retain(|s| s.id != id);
        if scenarios.len() == before {
            return Ok(false);
        }
        write_json(&self.dir.join(SCENARIOS_FILE), &*scenarios).await?;
        Ok(true)
    }

    /// Replaces the entire scenario collection, for bulk import.
    pub async fn replace_scenarios(&self, imported: Vec<Scenario>) -> Result<()> {
        let mut scenarios = self.scenarios.write().await;
        *scenarios = imported;
        write_json(&self.dir.join(SCENARIOS_FILE), &*scenarios).await
    }

    // --- Results ---

    pub async fn list_results(&self) -> Vec<StoredResult> {
        self.results.read().await.clone()
    }

    pub async fn results_for(&self, scenario_id: &str) -> Vec<StoredResult> {
        self.results
            .read()
            .await
            .iter()
            .filter(|r| r.scenario_id == scenario_id)
            .cloned()
            .collect()
    }

    pub async fn record_result(&self, stored: StoredResult) -> Result<()> {
        let mut results = self.results.write().await;
        results.push(stored);
        write_json(&self.dir.join(RESULTS_FILE), &*results).await
    }

    // --- Instructor PIN ---

    pub async fn pin(&self) -> String {
        self.pin.read().await.clone()
    }

    pub async fn set_pin(&self, new_pin: &str) -> Result<()> {
        let mut pin = self.pin.write().await;
        *pin = new_pin.to_string();
        tokio::fs::write(self.dir.join(PIN_FILE), new_pin.as_bytes())
            .await
            .context("Failed to persist instructor PIN")
    }
}

#[async_trait]
impl ScenarioRepository for Store {
    async fn get_by_id(&self, id: &str) -> Result<Option<Scenario>> {
        Ok(self.get_scenario(id).await)
    }
}

#[async_trait]
impl ResultSink for Store {
    async fn record(&self, scenario_id: &str, result: &SimulationResult) -> Result<()> {
        self.record_result(StoredResult::new(scenario_id, result))
            .await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value).context("Failed to serialize store data")?;
    tokio::fs::write(path, raw)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
