//! Solver result file decoding and validation

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};
use crate::numeric::round_to;
use crate::types::{FairnessIndexTriple, Objective, RunKey, RunResult};

/// Result file as written by the solver
///
/// Only the fields the pipeline consumes are modelled; tours, vertex
/// coordinates and the raw objective value are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResultFile {
    pub instance_name: String,
    pub num_vehicles: u32,
    pub num_vertices: u32,
    pub objective_type: String,
    pub p_norm: u32,
    pub fairness_coefficient: f64,
    /// Per-vehicle path costs; the sign is not meaningful, the magnitude is
    pub tour_cost: Vec<f64>,
    pub optimality_gap_percent: f64,
    pub computation_time_in_sec: f64,
    pub gini_index: f64,
    pub jain_index: f64,
    pub norm_index: f64,
}

/// Decode and validate one result file
pub fn decode_result(bytes: &[u8]) -> SharedResult<RunResult> {
    let raw: RawResultFile =
        serde_json::from_slice(bytes).map_err(|e| SharedError::malformed(e.to_string()))?;
    raw.into_run_result()
}

fn require_finite(name: &str, value: f64) -> SharedResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SharedError::malformed(format!("{name} is not a finite number: {value}")))
    }
}

fn require_non_negative(name: &str, value: f64) -> SharedResult<f64> {
    let value = require_finite(name, value)?;
    if value < 0.0 {
        return Err(SharedError::malformed(format!("{name} must be non-negative, got {value}")));
    }
    Ok(value)
}

impl RawResultFile {
    /// Validate the decoded file and derive the stored record
    pub fn into_run_result(self) -> SharedResult<RunResult> {
        if self.instance_name.trim().is_empty() {
            return Err(SharedError::malformed("instanceName is empty"));
        }
        if self.num_vehicles == 0 {
            return Err(SharedError::malformed("numVehicles must be a positive integer"));
        }
        if self.num_vertices < 2 {
            return Err(SharedError::malformed(format!(
                "numVertices must include the depot and at least one target, got {}",
                self.num_vertices
            )));
        }
        if self.tour_cost.is_empty() {
            return Err(SharedError::malformed("tourCost is empty"));
        }
        if self.tour_cost.len() != self.num_vehicles as usize {
            return Err(SharedError::malformed(format!(
                "tourCost has {} entries for {} vehicles",
                self.tour_cost.len(),
                self.num_vehicles
            )));
        }
        for (vehicle, cost) in self.tour_cost.iter().enumerate() {
            require_finite(&format!("tourCost[{vehicle}]"), *cost)?;
        }

        let objective: Objective = self.objective_type.parse().map_err(SharedError::malformed)?;
        let fairness_coefficient = require_finite("fairnessCoefficient", self.fairness_coefficient)?;
        let gap_percent = require_non_negative("optimalityGapPercent", self.optimality_gap_percent)?;
        let computation_time = require_non_negative("computationTimeInSec", self.computation_time_in_sec)?;
        let indices = FairnessIndexTriple {
            gini: require_finite("giniIndex", self.gini_index)?,
            jain: require_finite("jainIndex", self.jain_index)?,
            norm: require_finite("normIndex", self.norm_index)?,
        };

        let key = RunKey::new(
            self.instance_name,
            self.num_vehicles,
            objective,
            self.p_norm,
            fairness_coefficient,
        );

        Ok(RunResult::new(
            key,
            self.num_vertices - 1,
            self.tour_cost,
            round_to(gap_percent / 100.0, 2),
            computation_time,
            indices,
        ))
    }
}
