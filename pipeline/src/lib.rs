//! Fair multi-vehicle routing experiment pipeline
//!
//! Ingests solver result files into a queryable store, derives comparison
//! metrics against the cost-optimal `min` runs, and generates the next batch
//! of fairness-constrained solver runs from completed baselines.

pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::PipelinePaths;
pub use core::{ExperimentGrid, PhaseGate, SolverCommand, TimeRatio};
pub use error::{PipelineError, PipelineResult};
pub use generator::{FeedbackBaseline, FeedbackPlan, FeedbackRunGenerator};
pub use pipeline::{ExperimentPipeline, FeedbackOutcome};
pub use traits::{BatchFileSystem, InsertOutcome, ResultStore};
