//! Core types used throughout the experiment pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Global pipeline stage singleton - set once at startup
static STAGE: OnceLock<Stage> = OnceLock::new();

/// Pipeline stage the current process is running
///
/// Every log record carries the stage so that interleaved logs from an
/// ingestion job and a generation job can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Rebuilding the result store from result files
    Ingest,
    /// Exporting CSV reports from the store
    Report,
    /// Generating a phase 0 baseline batch
    Generate,
    /// Generating a phase 1 batch from ingested baselines
    Feedback,
}

impl Stage {
    /// Initialize the global stage (first call wins)
    pub fn init(stage: Stage) -> &'static Stage {
        STAGE.get_or_init(|| stage)
    }

    /// Get the global stage, defaulting to `Ingest` when nothing was initialized
    pub fn current() -> &'static Stage {
        STAGE.get_or_init(|| Stage::Ingest)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => write!(f, "ingest"),
            Stage::Report => write!(f, "report"),
            Stage::Generate => write!(f, "generate"),
            Stage::Feedback => write!(f, "feedback"),
        }
    }
}

/// Objective kinds understood by the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    /// Unconstrained minimum total cost
    Min,
    /// Minimize the longest tour
    MinMax,
    /// Minimize the p-norm of the tour length vector
    PNorm,
    /// Minimum cost subject to a lower bound on the norm index
    EpsFair,
    /// Minimum cost subject to an upper bound on the Gini index
    DeltaFair,
}

impl Objective {
    pub const ALL: [Objective; 5] = [
        Objective::Min,
        Objective::MinMax,
        Objective::PNorm,
        Objective::EpsFair,
        Objective::DeltaFair,
    ];

    /// Canonical solver spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Objective::Min => "min",
            Objective::MinMax => "min-max",
            Objective::PNorm => "p-norm",
            Objective::EpsFair => "eps-fair",
            Objective::DeltaFair => "delta-fair",
        }
    }

    /// Whether runs of this objective are parameterized by a fairness coefficient
    pub fn is_fairness_constrained(self) -> bool {
        matches!(self, Objective::EpsFair | Objective::DeltaFair)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "min" => Ok(Objective::Min),
            "min-max" | "minmax" => Ok(Objective::MinMax),
            "p-norm" | "pnorm" => Ok(Objective::PNorm),
            "eps-fair" | "epsfair" => Ok(Objective::EpsFair),
            "delta-fair" | "deltafair" => Ok(Objective::DeltaFair),
            _ => Err(format!("Unknown objective: {s}")),
        }
    }
}

/// Natural key of a solved run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunKey {
    pub instance_name: String,
    pub num_vehicles: u32,
    pub objective: Objective,
    pub p_norm: u32,
    pub fairness_coefficient: f64,
}

impl RunKey {
    pub fn new(
        instance_name: impl Into<String>,
        num_vehicles: u32,
        objective: Objective,
        p_norm: u32,
        fairness_coefficient: f64,
    ) -> Self {
        Self {
            instance_name: instance_name.into(),
            num_vehicles,
            objective,
            p_norm,
            fairness_coefficient,
        }
    }

    /// Key of an unparameterized run (`pNorm = 1`, coefficient `0.0`)
    pub fn baseline(instance_name: impl Into<String>, num_vehicles: u32, objective: Objective) -> Self {
        Self::new(instance_name, num_vehicles, objective, 1, 0.0)
    }

    /// Key of a p-norm run of the given order
    pub fn p_norm(instance_name: impl Into<String>, num_vehicles: u32, order: u32) -> Self {
        Self::new(instance_name, num_vehicles, Objective::PNorm, order, 0.0)
    }

    /// Key of a fairness-constrained run
    pub fn fairness(
        instance_name: impl Into<String>,
        num_vehicles: u32,
        objective: Objective,
        fairness_coefficient: f64,
    ) -> Self {
        Self::new(instance_name, num_vehicles, objective, 1, fairness_coefficient)
    }

    /// Key of the `min` run this key is normalized against
    pub fn min_baseline(&self) -> Self {
        Self::baseline(self.instance_name.clone(), self.num_vehicles, Objective::Min)
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/v{}/{}/p{}/fc{:?}",
            self.instance_name, self.num_vehicles, self.objective, self.p_norm, self.fairness_coefficient
        )
    }
}

/// Stored fairness indices of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessIndexTriple {
    pub gini: f64,
    pub jain: f64,
    pub norm: f64,
}

/// One completed solver invocation
///
/// Built through [`RawResultFile::into_run_result`](crate::records::RawResultFile::into_run_result)
/// or [`RunResult::new`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub key: RunKey,
    pub num_targets: u32,
    /// Per-vehicle tour lengths (magnitudes, in vehicle order)
    pub tour_lengths: Vec<f64>,
    pub sum_of_tours: f64,
    pub optimality_gap_fraction: f64,
    pub computation_time_seconds: f64,
    pub indices: FairnessIndexTriple,
}

impl RunResult {
    /// Assemble a record from already-validated parts
    ///
    /// Tour lengths are stored as magnitudes and `sum_of_tours` is derived
    /// from them, so the sum invariant holds by construction.
    pub fn new(
        key: RunKey,
        num_targets: u32,
        tour_lengths: Vec<f64>,
        optimality_gap_fraction: f64,
        computation_time_seconds: f64,
        indices: FairnessIndexTriple,
    ) -> Self {
        let tour_lengths: Vec<f64> = tour_lengths.into_iter().map(f64::abs).collect();
        let sum_of_tours = tour_lengths.iter().sum();
        Self {
            key,
            num_targets,
            tour_lengths,
            sum_of_tours,
            optimality_gap_fraction,
            computation_time_seconds,
            indices,
        }
    }
}

/// One solver invocation to be scheduled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub instance_name: String,
    pub num_vehicles: u32,
    pub objective: Objective,
    pub p_norm: u32,
    pub fairness_coefficient: f64,
    pub time_limit_seconds: u32,
}

impl RunConfiguration {
    pub fn key(&self) -> RunKey {
        RunKey::new(
            self.instance_name.clone(),
            self.num_vehicles,
            self.objective,
            self.p_norm,
            self.fairness_coefficient,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_round_trips_canonical_names() {
        for objective in Objective::ALL {
            assert_eq!(objective.as_str().parse::<Objective>().unwrap(), objective);
        }
    }

    #[test]
    fn test_objective_accepts_legacy_directory_names() {
        assert_eq!("minmax".parse::<Objective>().unwrap(), Objective::MinMax);
        assert_eq!("pNorm".parse::<Objective>().unwrap(), Objective::PNorm);
        assert_eq!("epsFair".parse::<Objective>().unwrap(), Objective::EpsFair);
        assert_eq!("deltaFair".parse::<Objective>().unwrap(), Objective::DeltaFair);
        assert!("COF".parse::<Objective>().is_err());
    }

    #[test]
    fn test_objective_serializes_kebab_case() {
        let json = serde_json::to_string(&Objective::DeltaFair).unwrap();
        assert_eq!(json, "\"delta-fair\"");
    }

    #[test]
    fn test_run_result_takes_tour_magnitudes() {
        let key = RunKey::baseline("eil51.tsp", 3, Objective::Min);
        let indices = FairnessIndexTriple { gini: 0.1, jain: 0.9, norm: 0.8 };
        let record = RunResult::new(key, 50, vec![10.0, -20.0, 30.5], 0.0, 1.0, indices);

        assert_eq!(record.tour_lengths, vec![10.0, 20.0, 30.5]);
        assert!((record.sum_of_tours - 60.5).abs() < 1e-9);
    }

    #[test]
    fn test_min_baseline_key() {
        let key = RunKey::fairness("bays29.tsp", 4, Objective::EpsFair, 0.3);
        let baseline = key.min_baseline();
        assert_eq!(baseline, RunKey::new("bays29.tsp", 4, Objective::Min, 1, 0.0));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Ingest.to_string(), "ingest");
        assert_eq!(Stage::Feedback.to_string(), "feedback");
    }
}
