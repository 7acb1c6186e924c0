//! Derived metrics
//!
//! Stateless queries over the result store. Every ratio is normalized
//! against the unconstrained `min` run of the same instance and vehicle
//! count; when that run (or the candidate itself) has not been ingested the
//! functions return [`PipelineError::BaselineMissing`], which callers treat
//! as "not comparable yet".

use std::fmt;

use shared::numeric::round_to;
use shared::{FairnessIndexTriple, RunKey, RunResult};

use crate::error::{PipelineError, PipelineResult};
use crate::traits::ResultStore;

/// Time limit the solver runs are given unless configured otherwise
pub const DEFAULT_TIME_LIMIT_SECONDS: f64 = 3600.0;

/// Computation time of a run relative to its `min` baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeRatio {
    /// Ratio rounded to two decimals
    Ratio(f64),
    /// The run hit its time limit, so it was not solved to optimality
    TimeLimitReached,
}

impl fmt::Display for TimeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRatio::Ratio(ratio) => write!(f, "{ratio}"),
            TimeRatio::TimeLimitReached => write!(f, "TL"),
        }
    }
}

fn lookup_required<S: ResultStore + ?Sized>(store: &S, key: &RunKey) -> PipelineResult<RunResult> {
    store
        .lookup_one(key)?
        .ok_or_else(|| PipelineError::BaselineMissing { missing: key.clone() })
}

/// Computation time of `key` divided by the `min` run's computation time
pub fn computation_time_ratio<S: ResultStore + ?Sized>(
    store: &S,
    key: &RunKey,
    time_limit_seconds: f64,
) -> PipelineResult<TimeRatio> {
    let candidate = lookup_required(store, key)?;
    if candidate.computation_time_seconds >= time_limit_seconds {
        return Ok(TimeRatio::TimeLimitReached);
    }

    let baseline_key = key.min_baseline();
    let baseline = lookup_required(store, &baseline_key)?;
    if baseline.computation_time_seconds == 0.0 {
        return Err(PipelineError::DegenerateBaseline {
            baseline: baseline_key,
            quantity: "computation time".to_string(),
        });
    }

    Ok(TimeRatio::Ratio(round_to(
        candidate.computation_time_seconds / baseline.computation_time_seconds,
        2,
    )))
}

/// Relative excess total cost of `key` over the `min` run, rounded to two decimals
pub fn cost_of_fairness<S: ResultStore + ?Sized>(store: &S, key: &RunKey) -> PipelineResult<f64> {
    let candidate = lookup_required(store, key)?;
    let baseline_key = key.min_baseline();
    let baseline = lookup_required(store, &baseline_key)?;
    if baseline.sum_of_tours == 0.0 {
        return Err(PipelineError::DegenerateBaseline {
            baseline: baseline_key,
            quantity: "sum of tours".to_string(),
        });
    }

    Ok(round_to(
        (candidate.sum_of_tours - baseline.sum_of_tours) / baseline.sum_of_tours,
        2,
    ))
}

/// Population standard deviation over mean of the tour lengths, rounded to three decimals
///
/// Empty input and a zero mean both yield `0.0`.
pub fn coefficient_of_variation(tour_lengths: &[f64]) -> f64 {
    if tour_lengths.is_empty() {
        return 0.0;
    }
    let n = tour_lengths.len() as f64;
    let mean = tour_lengths.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = tour_lengths.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
    round_to(variance.sqrt() / mean, 3)
}

/// Stored `(gini, jain, norm)` indices of a run
pub fn fairness_indices<S: ResultStore + ?Sized>(store: &S, key: &RunKey) -> PipelineResult<FairnessIndexTriple> {
    Ok(lookup_required(store, key)?.indices)
}

/// Recompute the fairness indices from tour lengths
///
/// Jain is `(Σt)² / (n·Σt²)`. Gini is `Σ (n + 1 − 2i)·t_i / (Σt·(n − 1))`
/// with `t_1 ≥ … ≥ t_n`. The norm index is `(Σt / ‖t‖₂ − 1) / (√n − 1)`.
/// Needs at least two vehicles and a positive total length.
pub fn computed_fairness_indices(tour_lengths: &[f64]) -> Option<FairnessIndexTriple> {
    let n = tour_lengths.len();
    if n < 2 {
        return None;
    }
    let sum: f64 = tour_lengths.iter().sum();
    if sum <= 0.0 {
        return None;
    }
    let n_f = n as f64;
    let sum_sq: f64 = tour_lengths.iter().map(|t| t * t).sum();

    let mut sorted = tour_lengths.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, t)| (n_f + 1.0 - 2.0 * (i as f64 + 1.0)) * t)
        .sum();

    Some(FairnessIndexTriple {
        gini: weighted / sum / (n_f - 1.0),
        jain: sum * sum / sum_sq / n_f,
        norm: (sum / sum_sq.sqrt() - 1.0) / (n_f.sqrt() - 1.0),
    })
}
