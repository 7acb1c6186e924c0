//! Experiment pipeline
//!
//! Owns the result store and the services around it and runs the phases in
//! order: ingest the results directory, then derive and materialize the next
//! batch. Services are injected so tests can swap the store or file system.

use std::path::{Path, PathBuf};

use shared::{logging, stage_info, Objective, RunKey, Stage};

use crate::core::{Phase, PhaseGate};
use crate::error::{PipelineError, PipelineResult};
use crate::generator::{FeedbackBaseline, FeedbackRunGenerator};
use crate::services::{BatchMaterializer, IngestReport, IngestionEngine, ReportWriter, RunBatch};
use crate::traits::{ArtifactBuilder, BatchFileSystem, ResultStore};

/// A feedback batch and the baselines that were not available for it
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackOutcome {
    pub batch: RunBatch,
    pub skipped: Vec<RunKey>,
}

pub struct ExperimentPipeline<S, F>
where
    S: ResultStore,
    F: BatchFileSystem,
{
    store: S,
    ingestion: IngestionEngine,
    generator: FeedbackRunGenerator,
    materializer: BatchMaterializer<F>,
    results_dir: PathBuf,
    gate: PhaseGate,
}

impl<S, F> ExperimentPipeline<S, F>
where
    S: ResultStore,
    F: BatchFileSystem,
{
    /// Create a pipeline with injected services
    pub fn new(
        store: S,
        ingestion: IngestionEngine,
        generator: FeedbackRunGenerator,
        materializer: BatchMaterializer<F>,
        results_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            ingestion,
            generator,
            materializer,
            results_dir: results_dir.into(),
            gate: PhaseGate::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    pub fn generator(&self) -> &FeedbackRunGenerator {
        &self.generator
    }

    /// Rebuild the store from the results directory
    ///
    /// On failure the pipeline stays in [`Phase::Fresh`] and ingestion can simply be rerun.
    pub fn ingest(&mut self) -> PipelineResult<IngestReport> {
        self.gate.begin_ingest();
        logging::log_progress(Stage::current(), "Ingesting", &self.results_dir.display().to_string());

        let report = self.ingestion.ingest(&self.results_dir, &mut self.store)?;
        self.gate.complete_ingest();
        Ok(report)
    }

    /// Accept the store's current contents as ingested
    ///
    /// Only a non-empty store qualifies; an empty one almost always means
    /// ingestion never ran against it.
    pub fn attach_existing_store(&mut self) -> PipelineResult<usize> {
        let count = self.store.count()?;
        if count == 0 {
            return Err(PipelineError::PhaseOrder {
                message: "the result store is empty; run ingestion first".to_string(),
            });
        }
        stage_info!("🗄️ Using existing result store with {} records", count);
        self.gate.complete_ingest();
        Ok(count)
    }

    /// Build the solver artifact batches copy; allowed in every phase
    pub fn prepare_artifact<B: ArtifactBuilder + ?Sized>(&self, builder: &B) -> PipelineResult<()> {
        self.materializer.prepare_artifact(builder)
    }

    /// Derive the feedback runs for `baseline` and write them as a batch
    pub fn generate_feedback_batch(&mut self, baseline: FeedbackBaseline) -> PipelineResult<FeedbackOutcome> {
        self.gate.require_ingested("feedback generation")?;

        stage_info!(
            "🔁 Generating {} feedback runs with a {}s time limit",
            baseline,
            self.generator.time_limit_seconds()
        );
        let plan = self.generator.derive_configurations(&self.store, baseline)?;
        let batch = self
            .materializer
            .materialize(&baseline.batch_name(), plan.configurations)?;
        self.gate.complete_generation();

        Ok(FeedbackOutcome {
            batch,
            skipped: plan.skipped,
        })
    }

    /// Write the phase 0 batch for one objective over the whole grid
    ///
    /// Needs no ingested results, so it is allowed in every phase.
    pub fn generate_baseline_batch(&mut self, objective: Objective, time_limit_seconds: u32) -> PipelineResult<RunBatch> {
        let configurations = self
            .generator
            .grid()
            .baseline_configurations(objective, time_limit_seconds);
        let batch = self.materializer.materialize(objective.as_str(), configurations)?;
        if self.gate.phase() == Phase::Ingested {
            self.gate.complete_generation();
        }
        Ok(batch)
    }

    /// Write the CSV reports for the ingested store into `dir`
    pub fn write_reports(&self, dir: &Path, time_limit_seconds: f64) -> PipelineResult<Vec<PathBuf>> {
        self.gate.require_ingested("report generation")?;
        ReportWriter::new(&self.store, self.generator.grid(), time_limit_seconds)
            .write_all(self.materializer.file_system(), dir)
    }
}
