//! Experiment grid
//!
//! The instances, vehicle counts and objective parameters one experiment
//! covers. Reports iterate it to build their rows and the generators use it
//! to decide which runs to schedule.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{Objective, RunConfiguration, RunKey};

use crate::error::{PipelineError, PipelineResult};

/// Parameter grid of an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperimentGrid {
    pub instances: Vec<String>,
    pub vehicle_counts: Vec<u32>,
    pub p_norms: Vec<u32>,
    pub fairness_coefficients: Vec<f64>,
}

impl Default for ExperimentGrid {
    fn default() -> Self {
        Self {
            instances: vec![
                "burma14.tsp".to_string(),
                "bays29.tsp".to_string(),
                "eil51.tsp".to_string(),
                "eil76.tsp".to_string(),
            ],
            vehicle_counts: vec![3, 4, 5],
            p_norms: vec![2, 3, 5, 10],
            fairness_coefficients: vec![0.1, 0.3, 0.5, 0.7, 0.9],
        }
    }
}

impl ExperimentGrid {
    /// Load a grid from a JSON file; omitted fields keep their defaults
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(PipelineError::fs("read", path))?;
        let grid: Self = serde_json::from_str(&content)
            .map_err(|e| PipelineError::config("grid", format!("{}: {e}", path.display())))?;
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.instances.is_empty() {
            return Err(PipelineError::config("grid.instances", "at least one instance is required"));
        }
        if self.vehicle_counts.iter().any(|&v| v == 0) {
            return Err(PipelineError::config("grid.vehicleCounts", "vehicle counts must be positive"));
        }
        if self.p_norms.iter().any(|&p| p == 0) {
            return Err(PipelineError::config("grid.pNorms", "norm orders must be positive"));
        }
        if self
            .fairness_coefficients
            .iter()
            .any(|fc| !(0.0..=1.0).contains(fc))
        {
            return Err(PipelineError::config(
                "grid.fairnessCoefficients",
                "fairness coefficients must lie in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Every `(instance, vehicles)` pair in grid order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.instances
            .iter()
            .flat_map(move |instance| self.vehicle_counts.iter().map(move |&v| (instance.as_str(), v)))
    }

    /// Run keys the grid schedules for one objective and pair
    pub fn keys_for(&self, instance: &str, num_vehicles: u32, objective: Objective) -> Vec<RunKey> {
        match objective {
            Objective::Min | Objective::MinMax => vec![RunKey::baseline(instance, num_vehicles, objective)],
            Objective::PNorm => self
                .p_norms
                .iter()
                .map(|&p| RunKey::p_norm(instance, num_vehicles, p))
                .collect(),
            Objective::EpsFair | Objective::DeltaFair => self
                .fairness_coefficients
                .iter()
                .map(|&fc| RunKey::fairness(instance, num_vehicles, objective, fc))
                .collect(),
        }
    }

    /// Phase 0 configurations for one objective over the whole grid
    pub fn baseline_configurations(&self, objective: Objective, time_limit_seconds: u32) -> Vec<RunConfiguration> {
        self.pairs()
            .flat_map(|(instance, vehicles)| self.keys_for(instance, vehicles, objective))
            .map(|key| RunConfiguration {
                instance_name: key.instance_name,
                num_vehicles: key.num_vehicles,
                objective: key.objective,
                p_norm: key.p_norm,
                fairness_coefficient: key.fairness_coefficient,
                time_limit_seconds,
            })
            .collect()
    }
}
