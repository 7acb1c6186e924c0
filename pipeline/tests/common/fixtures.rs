//! Result file fixtures in the solver's JSON format

use serde_json::json;
use shared::{FairnessIndexTriple, Objective};

/// One solver result file to be written into a workspace
#[derive(Debug, Clone)]
pub struct ResultFixture {
    pub instance: String,
    pub vehicles: u32,
    pub objective: Objective,
    pub p_norm: u32,
    pub fairness_coefficient: f64,
    pub tour_cost: Vec<f64>,
    pub computation_time: f64,
    pub indices: FairnessIndexTriple,
}

impl ResultFixture {
    pub fn new(instance: &str, objective: Objective, tour_cost: Vec<f64>) -> Self {
        Self {
            instance: instance.to_string(),
            vehicles: tour_cost.len() as u32,
            objective,
            p_norm: 1,
            fairness_coefficient: 0.0,
            tour_cost,
            computation_time: 10.0,
            indices: FairnessIndexTriple { gini: 0.1, jain: 0.9, norm: 0.85 },
        }
    }

    pub fn with_indices(mut self, gini: f64, jain: f64, norm: f64) -> Self {
        self.indices = FairnessIndexTriple { gini, jain, norm };
        self
    }

    pub fn with_time(mut self, seconds: f64) -> Self {
        self.computation_time = seconds;
        self
    }

    pub fn with_p_norm(mut self, p: u32) -> Self {
        self.p_norm = p;
        self
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_p{}_fc{}.json",
            self.instance.trim_end_matches(".tsp"),
            self.vehicles,
            self.objective,
            self.p_norm,
            self.fairness_coefficient
        )
    }

    pub fn to_json(&self) -> String {
        json!({
            "instanceName": self.instance,
            "numVehicles": self.vehicles,
            "numVertices": 51,
            "objectiveType": self.objective.as_str(),
            "pNorm": self.p_norm,
            "fairnessCoefficient": self.fairness_coefficient,
            "tourCost": self.tour_cost,
            "tours": [],
            "objectiveValue": 0.0,
            "optimalityGapPercent": 0.0,
            "computationTimeInSec": self.computation_time,
            "giniIndex": self.indices.gini,
            "jainIndex": self.indices.jain,
            "normIndex": self.indices.norm,
        })
        .to_string()
    }
}

/// Standard test data
pub struct TestFixtures;

impl TestFixtures {
    pub const LIBRARY_PATH: &'static str = "/opt/solver/lib";

    /// eil51 with 5 vehicles, cost-optimal split (sum 515)
    pub fn eil51_min() -> ResultFixture {
        ResultFixture::new("eil51.tsp", Objective::Min, vec![100.0, 120.0, 90.0, 110.0, 95.0])
    }

    /// eil51 with 5 vehicles, balanced split (sum 600)
    pub fn eil51_min_max() -> ResultFixture {
        ResultFixture::new("eil51.tsp", Objective::MinMax, vec![120.0; 5]).with_time(40.0)
    }

    /// bays29 with 4 vehicles, a min-max baseline with known indices
    pub fn bays29_min_max() -> ResultFixture {
        ResultFixture::new("bays29.tsp", Objective::MinMax, vec![500.0, 510.0, 505.0, 498.0])
            .with_indices(0.2001, 0.99, 0.8000)
    }

    pub fn bays29_min() -> ResultFixture {
        ResultFixture::new("bays29.tsp", Objective::Min, vec![400.0, 600.0, 450.0, 500.0])
    }
}
