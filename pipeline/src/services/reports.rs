//! CSV reports over the result store
//!
//! Three kinds of table are produced, one row per grid cell (or per stored
//! run for the fairness table):
//! - `COF.csv`: sum of tours of the `min` run and the cost of fairness of every
//!   other objective
//! - `<objective>.csv`: computation time of the `min` run and the time ratios
//!   of `min-max` and the objective's parameter sweep
//! - `fairness.csv`: stored fairness indices, the coefficient of variation of
//!   the tour lengths and the recomputed indices as a cross-check
//!
//! A cell whose run or baseline has not been computed yet prints `-`.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use shared::numeric::round_to;
use shared::{stage_info, FairnessIndexTriple, Objective, RunKey, RunResult};

use crate::core::metrics::{
    coefficient_of_variation, computation_time_ratio, computed_fairness_indices, cost_of_fairness,
};
use crate::core::ExperimentGrid;
use crate::error::PipelineResult;
use crate::traits::{BatchFileSystem, ResultStore};

/// Placeholder for cells that cannot be computed yet
pub const MISSING_CELL: &str = "-";

/// Objectives that get a computation-time table
pub const TIME_TABLE_OBJECTIVES: [Objective; 3] = [Objective::PNorm, Objective::EpsFair, Objective::DeltaFair];

/// Column header for a run key
pub fn column_label(key: &RunKey) -> String {
    match key.objective {
        Objective::PNorm => format!("p-norm-{}", key.p_norm),
        objective if objective.is_fairness_constrained() => format!("{objective}-{:?}", key.fairness_coefficient),
        objective => objective.to_string(),
    }
}

/// Render a metric, mapping "not computed yet" to [`MISSING_CELL`]
fn cell<T: Display>(value: PipelineResult<T>) -> PipelineResult<String> {
    match value {
        Ok(v) => Ok(v.to_string()),
        Err(e) if e.is_incomplete() => Ok(MISSING_CELL.to_string()),
        Err(e) => Err(e),
    }
}

fn csv_line(cells: &[String]) -> String {
    cells.join(",") + "\n"
}

/// Builds report tables from a store and an experiment grid
pub struct ReportWriter<'a, S: ResultStore + ?Sized> {
    store: &'a S,
    grid: &'a ExperimentGrid,
    time_limit_seconds: f64,
}

impl<'a, S: ResultStore + ?Sized> ReportWriter<'a, S> {
    pub fn new(store: &'a S, grid: &'a ExperimentGrid, time_limit_seconds: f64) -> Self {
        Self {
            store,
            grid,
            time_limit_seconds,
        }
    }

    /// Keys compared against `min` in the cost-of-fairness table, in column order
    fn cof_keys(&self, instance: &str, vehicles: u32) -> Vec<RunKey> {
        [Objective::MinMax, Objective::PNorm, Objective::EpsFair, Objective::DeltaFair]
            .into_iter()
            .flat_map(|objective| self.grid.keys_for(instance, vehicles, objective))
            .collect()
    }

    fn time_keys(&self, instance: &str, vehicles: u32, objective: Objective) -> Vec<RunKey> {
        let mut keys = vec![RunKey::baseline(instance, vehicles, Objective::MinMax)];
        keys.extend(self.grid.keys_for(instance, vehicles, objective));
        keys
    }

    fn header(&self, leading: &[&str], keys: &[RunKey]) -> String {
        let cells: Vec<String> = leading
            .iter()
            .map(|s| s.to_string())
            .chain(keys.iter().map(column_label))
            .collect();
        csv_line(&cells)
    }

    fn min_record_cell(&self, instance: &str, vehicles: u32, pick: impl Fn(&RunResult) -> f64) -> PipelineResult<String> {
        let key = RunKey::baseline(instance, vehicles, Objective::Min);
        Ok(match self.store.lookup_one(&key)? {
            Some(record) => pick(&record).to_string(),
            None => MISSING_CELL.to_string(),
        })
    }

    /// `COF.csv` body
    pub fn cost_of_fairness_table(&self) -> PipelineResult<String> {
        let Some((first_instance, first_vehicles)) = self.grid.pairs().next() else {
            return Ok(String::new());
        };
        let mut out = self.header(&["instance", "vehicles", "min"], &self.cof_keys(first_instance, first_vehicles));

        for (instance, vehicles) in self.grid.pairs() {
            let mut row = vec![
                instance.to_string(),
                vehicles.to_string(),
                self.min_record_cell(instance, vehicles, |r| r.sum_of_tours)?,
            ];
            for key in self.cof_keys(instance, vehicles) {
                row.push(cell(cost_of_fairness(self.store, &key))?);
            }
            out.push_str(&csv_line(&row));
        }
        Ok(out)
    }

    /// `<objective>.csv` body
    pub fn computation_time_table(&self, objective: Objective) -> PipelineResult<String> {
        let Some((first_instance, first_vehicles)) = self.grid.pairs().next() else {
            return Ok(String::new());
        };
        let mut out = self.header(
            &["instance", "vehicles", "min (s)"],
            &self.time_keys(first_instance, first_vehicles, objective),
        );

        for (instance, vehicles) in self.grid.pairs() {
            let mut row = vec![
                instance.to_string(),
                vehicles.to_string(),
                self.min_record_cell(instance, vehicles, |r| r.computation_time_seconds)?,
            ];
            for key in self.time_keys(instance, vehicles, objective) {
                row.push(cell(computation_time_ratio(self.store, &key, self.time_limit_seconds))?);
            }
            out.push_str(&csv_line(&row));
        }
        Ok(out)
    }

    /// `fairness.csv` body: every stored run of the grid's cells
    pub fn fairness_table(&self) -> PipelineResult<String> {
        let mut out = csv_line(
            &[
                "instance", "vehicles", "objective", "p", "fc", "sum", "gini", "jain", "norm", "cv",
                "computed_gini", "computed_jain", "computed_norm",
            ]
            .map(String::from),
        );

        for (instance, vehicles) in self.grid.pairs() {
            for record in self.store.records_for(instance, vehicles)? {
                let computed = computed_fairness_indices(&record.tour_lengths);
                let computed_cell = |pick: fn(&FairnessIndexTriple) -> f64| {
                    computed
                        .as_ref()
                        .map(|c| round_to(pick(c), 4).to_string())
                        .unwrap_or_else(|| MISSING_CELL.to_string())
                };
                let row = vec![
                    record.key.instance_name.clone(),
                    record.key.num_vehicles.to_string(),
                    record.key.objective.to_string(),
                    record.key.p_norm.to_string(),
                    format!("{:?}", record.key.fairness_coefficient),
                    record.sum_of_tours.to_string(),
                    record.indices.gini.to_string(),
                    record.indices.jain.to_string(),
                    record.indices.norm.to_string(),
                    coefficient_of_variation(&record.tour_lengths).to_string(),
                    computed_cell(|c| c.gini),
                    computed_cell(|c| c.jain),
                    computed_cell(|c| c.norm),
                ];
                out.push_str(&csv_line(&row));
            }
        }
        Ok(out)
    }

    /// Write every report into `dir`, returning the written paths
    pub fn write_all<F: BatchFileSystem + ?Sized>(&self, file_system: &F, dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        file_system.create_dir_all(dir)?;

        let mut tables = vec![("COF.csv".to_string(), self.cost_of_fairness_table()?)];
        for objective in TIME_TABLE_OBJECTIVES {
            tables.push((format!("{objective}.csv"), self.computation_time_table(objective)?));
        }
        tables.push(("fairness.csv".to_string(), self.fairness_table()?));

        let mut written = Vec::with_capacity(tables.len());
        for (name, body) in tables {
            let path = dir.join(name);
            file_system.write_file(&path, body.as_bytes())?;
            written.push(path);
        }

        stage_info!("📊 Wrote {} reports to {}", written.len(), dir.display());
        Ok(written)
    }
}
