//! Service-specific tests
//!
//! Each service has its own test file with dedicated fixtures and helpers.

mod batch;

/// Helpers shared by the service tests
pub mod common {
    use std::path::Path;

    use shared::Objective;

    /// Result file body in the solver's JSON format
    pub fn result_json(instance: &str, vehicles: u32, objective: Objective, p: u32, fc: f64, tours: &[f64]) -> String {
        serde_json::json!({
            "instanceName": instance,
            "numVehicles": vehicles,
            "numVertices": 51,
            "objectiveType": objective.as_str(),
            "pNorm": p,
            "fairnessCoefficient": fc,
            "tourCost": tours,
            "optimalityGapPercent": 0.0,
            "computationTimeInSec": 12.5,
            "giniIndex": 0.2001,
            "jainIndex": 0.95,
            "normIndex": 0.8,
        })
        .to_string()
    }

    pub fn write_result(root: &Path, dir: &str, file: &str, body: &str) {
        let dir = root.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), body).unwrap();
    }
}
