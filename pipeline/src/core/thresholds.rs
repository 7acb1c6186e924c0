//! Feedback thresholds derived from a baseline's fairness indices

use shared::numeric::{ceil_to, floor_to};
use shared::FairnessIndexTriple;

/// Decimal places thresholds are truncated to
pub const THRESHOLD_DECIMALS: u32 = 4;

/// `ε` for an `eps-fair` run: the baseline norm index rounded down
///
/// Rounding down keeps the baseline tour set feasible for the constrained run.
pub fn eps_fair_threshold(norm_index: f64) -> f64 {
    floor_to(norm_index, THRESHOLD_DECIMALS)
}

/// `Δ` for a `delta-fair` run: the baseline Gini index rounded up
pub fn delta_fair_threshold(gini_index: f64) -> f64 {
    ceil_to(gini_index, THRESHOLD_DECIMALS)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FairnessThresholds {
    pub eps: f64,
    pub delta: f64,
}

impl FairnessThresholds {
    pub fn from_indices(indices: &FairnessIndexTriple) -> Self {
        Self {
            eps: eps_fair_threshold(indices.norm),
            delta: delta_fair_threshold(indices.gini),
        }
    }
}
