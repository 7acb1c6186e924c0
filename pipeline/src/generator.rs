//! Feedback run generation
//!
//! Turns a completed baseline run (`min-max`, or `p-norm` of a fixed order)
//! into a pair of fairness-constrained runs per grid cell: an `eps-fair` run
//! bounded by the baseline's norm index and a `delta-fair` run bounded by its
//! Gini index. The constrained runs then show whether a comparable fairness
//! level can be reached at a lower total cost.

use std::fmt;

use shared::{stage_debug, stage_info, Objective, RunConfiguration, RunKey};

use crate::core::{ExperimentGrid, FairnessThresholds};
use crate::error::PipelineResult;
use crate::traits::ResultStore;

/// Time limit of generated feedback runs
pub const DEFAULT_FEEDBACK_TIME_LIMIT_SECONDS: u32 = 7200;

/// Time limit of phase 0 runs
pub const DEFAULT_BASELINE_TIME_LIMIT_SECONDS: u32 = 3600;

/// Norm order used for a `p-norm` baseline when none is given
pub const DEFAULT_FEEDBACK_NORM_ORDER: u32 = 2;

/// The unconstrained-fairness run feedback thresholds are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackBaseline {
    MinMax,
    PNorm { order: u32 },
}

impl FeedbackBaseline {
    pub fn key(&self, instance_name: &str, num_vehicles: u32) -> RunKey {
        match self {
            FeedbackBaseline::MinMax => RunKey::baseline(instance_name, num_vehicles, Objective::MinMax),
            FeedbackBaseline::PNorm { order } => RunKey::p_norm(instance_name, num_vehicles, *order),
        }
    }

    /// Norm order carried into the generated runs
    pub fn p_norm(&self) -> u32 {
        match self {
            FeedbackBaseline::MinMax => 1,
            FeedbackBaseline::PNorm { order } => *order,
        }
    }

    pub fn batch_name(&self) -> String {
        match self {
            FeedbackBaseline::MinMax => "feedback-min-max".to_string(),
            FeedbackBaseline::PNorm { order } => format!("feedback-p-norm-{order}"),
        }
    }
}

impl fmt::Display for FeedbackBaseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackBaseline::MinMax => write!(f, "min-max"),
            FeedbackBaseline::PNorm { order } => write!(f, "p-norm (p = {order})"),
        }
    }
}

/// Configurations derived for one baseline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackPlan {
    pub configurations: Vec<RunConfiguration>,
    /// Baseline runs that were not in the store
    pub skipped: Vec<RunKey>,
}

#[derive(Debug, Clone)]
pub struct FeedbackRunGenerator {
    grid: ExperimentGrid,
    time_limit_seconds: u32,
}

impl FeedbackRunGenerator {
    pub fn new(grid: ExperimentGrid, time_limit_seconds: u32) -> Self {
        Self {
            grid,
            time_limit_seconds,
        }
    }

    pub fn grid(&self) -> &ExperimentGrid {
        &self.grid
    }

    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_seconds
    }

    /// Derive the feedback configurations in grid order
    ///
    /// Each available baseline yields exactly two configurations, `eps-fair`
    /// first. Pairs whose baseline has not been computed are skipped.
    pub fn derive_configurations<S: ResultStore + ?Sized>(
        &self,
        store: &S,
        baseline: FeedbackBaseline,
    ) -> PipelineResult<FeedbackPlan> {
        let mut plan = FeedbackPlan::default();

        for (instance, vehicles) in self.grid.pairs() {
            let key = baseline.key(instance, vehicles);
            let Some(record) = store.lookup_one(&key)? else {
                stage_info!("⏭️ No {} baseline for {} with {} vehicles, skipping", baseline, instance, vehicles);
                plan.skipped.push(key);
                continue;
            };

            let thresholds = FairnessThresholds::from_indices(&record.indices);
            stage_debug!("{} -> eps {:?}, delta {:?}", key, thresholds.eps, thresholds.delta);

            for (objective, coefficient) in [
                (Objective::EpsFair, thresholds.eps),
                (Objective::DeltaFair, thresholds.delta),
            ] {
                plan.configurations.push(RunConfiguration {
                    instance_name: instance.to_string(),
                    num_vehicles: vehicles,
                    objective,
                    p_norm: baseline.p_norm(),
                    fairness_coefficient: coefficient,
                    time_limit_seconds: self.time_limit_seconds,
                });
            }
        }

        stage_info!(
            "🧮 Derived {} feedback runs from {} baselines ({} missing)",
            plan.configurations.len(),
            plan.configurations.len() / 2,
            plan.skipped.len()
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockResultStore;
    use shared::{FairnessIndexTriple, RunResult};

    fn grid() -> ExperimentGrid {
        ExperimentGrid {
            instances: vec!["bays29.tsp".to_string(), "eil51.tsp".to_string()],
            vehicle_counts: vec![4],
            ..ExperimentGrid::default()
        }
    }

    fn baseline_record(key: RunKey) -> RunResult {
        RunResult::new(
            key,
            28,
            vec![500.0, 510.0, 505.0, 498.0],
            0.0,
            120.0,
            FairnessIndexTriple { gini: 0.2001, jain: 0.99, norm: 0.8 },
        )
    }

    #[test]
    fn test_min_max_feedback_pair() {
        let mut store = MockResultStore::new();
        store.expect_lookup_one().returning(|key| {
            Ok((key.instance_name == "bays29.tsp").then(|| baseline_record(key.clone())))
        });
        let generator = FeedbackRunGenerator::new(grid(), DEFAULT_FEEDBACK_TIME_LIMIT_SECONDS);

        let plan = generator.derive_configurations(&store, FeedbackBaseline::MinMax).unwrap();

        assert_eq!(plan.configurations.len(), 2);
        assert_eq!(plan.configurations[0].objective, Objective::EpsFair);
        assert_eq!(plan.configurations[0].fairness_coefficient, 0.8);
        assert_eq!(plan.configurations[1].objective, Objective::DeltaFair);
        assert_eq!(plan.configurations[1].fairness_coefficient, 0.2001);
        assert_eq!(
            plan.configurations[0].key(),
            RunKey::fairness("bays29.tsp", 4, Objective::EpsFair, 0.8)
        );
        assert!(plan.configurations.iter().all(|c| c.p_norm == 1 && c.time_limit_seconds == 7200));
        assert_eq!(plan.skipped, vec![RunKey::baseline("eil51.tsp", 4, Objective::MinMax)]);
    }

    #[test]
    fn test_p_norm_baseline_carries_order() {
        let mut store = MockResultStore::new();
        store
            .expect_lookup_one()
            .withf(|key| key.objective == Objective::PNorm && key.p_norm == 3)
            .returning(|key| Ok(Some(baseline_record(key.clone()))));
        let generator = FeedbackRunGenerator::new(grid(), 600);

        let plan = generator
            .derive_configurations(&store, FeedbackBaseline::PNorm { order: 3 })
            .unwrap();

        assert_eq!(plan.configurations.len(), 4);
        assert!(plan.configurations.iter().all(|c| c.p_norm == 3 && c.time_limit_seconds == 600));
        assert_eq!(plan.configurations[2].instance_name, "eil51.tsp");
    }

    #[test]
    fn test_empty_store_yields_nothing() {
        let mut store = MockResultStore::new();
        store.expect_lookup_one().returning(|_| Ok(None));
        let generator = FeedbackRunGenerator::new(grid(), 7200);

        let plan = generator.derive_configurations(&store, FeedbackBaseline::MinMax).unwrap();

        assert!(plan.configurations.is_empty());
        assert_eq!(plan.skipped.len(), 2);
    }

    #[test]
    fn test_batch_names() {
        assert_eq!(FeedbackBaseline::MinMax.batch_name(), "feedback-min-max");
        assert_eq!(FeedbackBaseline::PNorm { order: 2 }.batch_name(), "feedback-p-norm-2");
    }
}
