//! `fairmtsp` command line entry point
//!
//! Wires the real store and file system into an [`ExperimentPipeline`] and
//! runs one phase per invocation.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use pipeline::core::DEFAULT_TIME_LIMIT_SECONDS;
use pipeline::generator::{DEFAULT_BASELINE_TIME_LIMIT_SECONDS, DEFAULT_FEEDBACK_NORM_ORDER, DEFAULT_FEEDBACK_TIME_LIMIT_SECONDS};
use pipeline::services::artifact::DEFAULT_BUILD_COMMAND;
use pipeline::services::{
    CommandArtifactBuilder, IngestionConfig, IngestionEngine, RealFileSystem, SolverEnvironment, SqliteResultStore,
};
use pipeline::services::BatchMaterializer;
use pipeline::{ExperimentGrid, ExperimentPipeline, FeedbackBaseline, FeedbackRunGenerator, PipelinePaths, SolverCommand};
use shared::{logging, stage_debug, stage_info, stage_warn, Objective, Stage};

/// Fair multi-vehicle routing experiment pipeline
#[derive(Parser)]
#[command(name = "fairmtsp")]
#[command(about = "Ingests solver results, reports metrics and generates feedback run batches")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Result store database (defaults to results/results.db under the base directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Experiment grid JSON file (defaults to the built-in grid)
    #[arg(long, global = true)]
    pub grid: Option<PathBuf>,

    /// Vehicle counts accepted during ingestion (defaults to the grid's vehicle counts)
    #[arg(long, global = true, value_delimiter = ',')]
    pub vehicles: Option<Vec<u32>>,

    /// Accept results for any vehicle count during ingestion
    #[arg(long, global = true)]
    pub all_vehicles: bool,

    /// Command that builds the solver artifact, run in the base directory
    #[arg(long, global = true, default_value = DEFAULT_BUILD_COMMAND)]
    pub build_command: String,

    /// Use the existing solver artifact instead of building it
    #[arg(long, global = true)]
    pub skip_build: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rebuild the result store from the results directory
    Ingest,

    /// Write the CSV reports for the current store
    Report {
        /// Time limit the solver runs were given, in seconds
        #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_SECONDS)]
        time_limit: f64,

        /// Output directory (defaults to reports/ under the base directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate the phase 0 batch for one objective
    Generate {
        #[arg(long)]
        objective: Objective,

        #[arg(long, default_value_t = DEFAULT_BASELINE_TIME_LIMIT_SECONDS)]
        time_limit: u32,
    },

    /// Ingest, then generate the feedback batch for a baseline objective
    Feedback {
        #[arg(long, value_enum, default_value_t = BaselineArg::MinMax)]
        baseline: BaselineArg,

        /// Norm order of a p-norm baseline
        #[arg(long, default_value_t = DEFAULT_FEEDBACK_NORM_ORDER)]
        norm_order: u32,

        #[arg(long, default_value_t = DEFAULT_FEEDBACK_TIME_LIMIT_SECONDS)]
        time_limit: u32,

        /// Use the store as is instead of ingesting first
        #[arg(long)]
        skip_ingest: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BaselineArg {
    MinMax,
    PNorm,
}

impl Command {
    fn stage(&self) -> Stage {
        match self {
            Command::Ingest => Stage::Ingest,
            Command::Report { .. } => Stage::Report,
            Command::Generate { .. } => Stage::Generate,
            Command::Feedback { .. } => Stage::Feedback,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let stage = Stage::init(args.command.stage());
    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(stage, &format!("fairmtsp {stage}"));

    if let Err(err) = run(args) {
        logging::log_error(stage, "fairmtsp", &err);
        return Err(err);
    }
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut paths = PipelinePaths::from_env()?;
    if let Some(db) = &args.db {
        paths = paths.with_database(db);
    }
    stage_debug!("Base directory: {}", paths.base_dir.display());

    let grid = match &args.grid {
        Some(path) => ExperimentGrid::load(path).with_context(|| format!("loading grid {}", path.display()))?,
        None => ExperimentGrid::default(),
    };

    let ingestion_config = if args.all_vehicles {
        IngestionConfig { vehicle_partitions: Vec::new() }
    } else if let Some(vehicles) = &args.vehicles {
        IngestionConfig { vehicle_partitions: vehicles.clone() }
    } else {
        IngestionConfig::for_grid(&grid)
    };

    let feedback_time_limit = match &args.command {
        Command::Feedback { time_limit, .. } => *time_limit,
        _ => DEFAULT_FEEDBACK_TIME_LIMIT_SECONDS,
    };

    // Only batch generation needs the solver library
    let library_path = match &args.command {
        Command::Generate { .. } | Command::Feedback { .. } => SolverEnvironment::library_path()?,
        Command::Ingest | Command::Report { .. } => PathBuf::new(),
    };

    if let Some(parent) = paths.database.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = SqliteResultStore::open(&paths.database)?;

    let mut pipeline = ExperimentPipeline::new(
        store,
        IngestionEngine::new(ingestion_config),
        FeedbackRunGenerator::new(grid, feedback_time_limit),
        BatchMaterializer::new(RealFileSystem::new(), paths.batch_layout(), SolverCommand::new(library_path)),
        paths.results_dir.clone(),
    );

    let builds_batch = matches!(args.command, Command::Generate { .. } | Command::Feedback { .. });
    if builds_batch && !args.skip_build {
        let builder = CommandArtifactBuilder::new(&paths.base_dir, &args.build_command)?;
        pipeline.prepare_artifact(&builder)?;
    }

    match args.command {
        Command::Ingest => {
            let report = pipeline.ingest()?;
            for malformed in &report.malformed {
                stage_warn!("{}: {}", malformed.path.display(), malformed.reason);
            }
            logging::log_success(
                Stage::current(),
                &format!("{} runs stored in {}", report.inserted, paths.database.display()),
            );
        }
        Command::Report { time_limit, output } => {
            pipeline.attach_existing_store()?;
            let dir = output.unwrap_or_else(|| paths.reports_dir.clone());
            let written = pipeline.write_reports(&dir, time_limit)?;
            for path in written {
                stage_info!("📄 {}", path.display());
            }
        }
        Command::Generate { objective, time_limit } => {
            let batch = pipeline.generate_baseline_batch(objective, time_limit)?;
            logging::log_success(
                Stage::current(),
                &format!("{} runs written to {}", batch.configurations.len(), batch.manifest_path.display()),
            );
        }
        Command::Feedback {
            baseline,
            norm_order,
            skip_ingest,
            ..
        } => {
            if skip_ingest {
                pipeline.attach_existing_store()?;
            } else {
                pipeline.ingest()?;
            }
            let baseline = match baseline {
                BaselineArg::MinMax => FeedbackBaseline::MinMax,
                BaselineArg::PNorm => FeedbackBaseline::PNorm { order: norm_order },
            };
            let outcome = pipeline.generate_feedback_batch(baseline)?;
            for key in &outcome.skipped {
                stage_debug!("Baseline not computed yet: {}", key);
            }
            logging::log_success(
                Stage::current(),
                &format!(
                    "{} feedback runs written to {}",
                    outcome.batch.configurations.len(),
                    outcome.batch.manifest_path.display()
                ),
            );
        }
    }
    Ok(())
}
