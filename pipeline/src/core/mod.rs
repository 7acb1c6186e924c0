//! Pure pipeline logic: no I/O beyond the store trait

pub mod grid;
pub mod manifest;
pub mod metrics;
pub mod state;
pub mod thresholds;

pub use grid::ExperimentGrid;
pub use manifest::{render_manifest, SolverCommand, SOLVER_ARTIFACT_NAME};
pub use metrics::{
    coefficient_of_variation, computation_time_ratio, computed_fairness_indices, cost_of_fairness,
    fairness_indices, TimeRatio, DEFAULT_TIME_LIMIT_SECONDS,
};
pub use state::{Phase, PhaseGate};
pub use thresholds::{delta_fair_threshold, eps_fair_threshold, FairnessThresholds};
