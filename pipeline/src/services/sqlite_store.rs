//! SQLite-backed result store
//!
//! One table holds every run; `num_vehicles` is an ordinary column and the
//! natural key carries a unique index, so re-ingesting a file can never
//! store a second copy of the same run.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use shared::{stage_debug, FairnessIndexTriple, Objective, RunKey, RunResult};

use crate::error::PipelineResult;
use crate::traits::{InsertOutcome, ResultStore};

const SCHEMA: &str = "\
    CREATE TABLE IF NOT EXISTS run_results (\
        instance_name TEXT NOT NULL,\
        num_vehicles INTEGER NOT NULL,\
        objective TEXT NOT NULL,\
        p_norm INTEGER NOT NULL,\
        fairness_coefficient REAL NOT NULL,\
        num_targets INTEGER NOT NULL,\
        tour_lengths TEXT NOT NULL,\
        sum_of_tours REAL NOT NULL,\
        gap_to_opt REAL NOT NULL,\
        computation_time_sec REAL NOT NULL,\
        gini_index REAL NOT NULL,\
        jain_index REAL NOT NULL,\
        norm_index REAL NOT NULL\
    );\
    CREATE UNIQUE INDEX IF NOT EXISTS idx_run_results_key \
        ON run_results(instance_name, num_vehicles, objective, p_norm, fairness_coefficient);";

const SELECT_COLUMNS: &str = "instance_name, num_vehicles, objective, p_norm, fairness_coefficient, \
     num_targets, tour_lengths, gap_to_opt, computation_time_sec, gini_index, jain_index, norm_index";

/// Result store persisted in a SQLite database file
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    /// Open (or create) the database at `path`
    ///
    /// Existing records are kept; call [`ResultStore::rebuild`] to start over.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    /// Private in-memory database, mostly useful for tests
    pub fn in_memory() -> PipelineResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> PipelineResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn aggregate_fairness_coefficient(
        &self,
        aggregate: &str,
        instance_name: &str,
        num_vehicles: u32,
        objective: Objective,
    ) -> PipelineResult<Option<f64>> {
        let sql = format!(
            "SELECT {aggregate}(fairness_coefficient) FROM run_results \
             WHERE instance_name = ?1 AND num_vehicles = ?2 AND objective = ?3"
        );
        let value = self.conn.query_row(
            &sql,
            params![instance_name, num_vehicles, objective.as_str()],
            |row| row.get::<_, Option<f64>>(0),
        )?;
        Ok(value)
    }
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

fn row_to_result(row: &Row<'_>) -> rusqlite::Result<RunResult> {
    let objective_text: String = row.get(2)?;
    let objective: Objective = objective_text.parse().map_err(|e: String| conversion_error(2, e))?;
    let tours_text: String = row.get(6)?;
    let tour_lengths: Vec<f64> =
        serde_json::from_str(&tours_text).map_err(|e| conversion_error(6, e.to_string()))?;

    let key = RunKey::new(
        row.get::<_, String>(0)?,
        row.get(1)?,
        objective,
        row.get(3)?,
        row.get(4)?,
    );
    Ok(RunResult::new(
        key,
        row.get(5)?,
        tour_lengths,
        row.get(7)?,
        row.get(8)?,
        FairnessIndexTriple {
            gini: row.get(9)?,
            jain: row.get(10)?,
            norm: row.get(11)?,
        },
    ))
}

impl ResultStore for SqliteResultStore {
    fn rebuild(&mut self) -> PipelineResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS run_results;")?;
        self.conn.execute_batch(SCHEMA)?;
        stage_debug!("🗑️ Result store rebuilt");
        Ok(())
    }

    fn insert(&mut self, record: &RunResult) -> PipelineResult<InsertOutcome> {
        let tours = serde_json::to_string(&record.tour_lengths)?;
        let key = &record.key;
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO run_results (\
                instance_name, num_vehicles, objective, p_norm, fairness_coefficient, \
                num_targets, tour_lengths, sum_of_tours, gap_to_opt, computation_time_sec, \
                gini_index, jain_index, norm_index) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                key.instance_name,
                key.num_vehicles,
                key.objective.as_str(),
                key.p_norm,
                key.fairness_coefficient,
                record.num_targets,
                tours,
                record.sum_of_tours,
                record.optimality_gap_fraction,
                record.computation_time_seconds,
                record.indices.gini,
                record.indices.jain,
                record.indices.norm,
            ],
        )?;

        Ok(if changed == 0 {
            InsertOutcome::Duplicate
        } else {
            InsertOutcome::Inserted
        })
    }

    fn lookup_one(&self, key: &RunKey) -> PipelineResult<Option<RunResult>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM run_results \
             WHERE instance_name = ?1 AND num_vehicles = ?2 AND objective = ?3 \
               AND p_norm = ?4 AND fairness_coefficient = ?5 \
             ORDER BY rowid LIMIT 1"
        );
        let record = self
            .conn
            .query_row(
                &sql,
                params![
                    key.instance_name,
                    key.num_vehicles,
                    key.objective.as_str(),
                    key.p_norm,
                    key.fairness_coefficient,
                ],
                row_to_result,
            )
            .optional()?;
        Ok(record)
    }

    fn min_fairness_coefficient(
        &self,
        instance_name: &str,
        num_vehicles: u32,
        objective: Objective,
    ) -> PipelineResult<Option<f64>> {
        self.aggregate_fairness_coefficient("MIN", instance_name, num_vehicles, objective)
    }

    fn max_fairness_coefficient(
        &self,
        instance_name: &str,
        num_vehicles: u32,
        objective: Objective,
    ) -> PipelineResult<Option<f64>> {
        self.aggregate_fairness_coefficient("MAX", instance_name, num_vehicles, objective)
    }

    fn count(&self) -> PipelineResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM run_results", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn records_for(&self, instance_name: &str, num_vehicles: u32) -> PipelineResult<Vec<RunResult>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM run_results \
             WHERE instance_name = ?1 AND num_vehicles = ?2 ORDER BY rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![instance_name, num_vehicles], row_to_result)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
