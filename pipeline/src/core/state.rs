//! Phase ordering of the experiment pipeline

use std::fmt;

use crate::error::{PipelineError, PipelineResult};

/// How far the pipeline has progressed against its store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No successful ingestion yet
    #[default]
    Fresh,
    /// The store reflects the results directory
    Ingested,
    /// At least one batch has been generated from the ingested store
    Generated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Fresh => "fresh",
            Phase::Ingested => "ingested",
            Phase::Generated => "generated",
        };
        write!(f, "{name}")
    }
}

/// Tracks the pipeline phase and rejects out-of-order steps
#[derive(Debug, Clone, Default)]
pub struct PhaseGate {
    phase: Phase,
}

impl PhaseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ingestion is about to run; the store is not usable until it completes
    pub fn begin_ingest(&mut self) {
        self.phase = Phase::Fresh;
    }

    pub fn complete_ingest(&mut self) {
        self.phase = Phase::Ingested;
    }

    /// Fails unless an ingestion has completed
    pub fn require_ingested(&self, step: &str) -> PipelineResult<()> {
        match self.phase {
            Phase::Ingested | Phase::Generated => Ok(()),
            Phase::Fresh => Err(PipelineError::PhaseOrder {
                message: format!("{step} requires a completed ingestion (phase is {})", self.phase),
            }),
        }
    }

    pub fn complete_generation(&mut self) {
        self.phase = Phase::Generated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_requires_ingest() {
        let gate = PhaseGate::new();
        assert_eq!(gate.phase(), Phase::Fresh);
        assert!(matches!(
            gate.require_ingested("feedback generation"),
            Err(PipelineError::PhaseOrder { .. })
        ));
    }

    #[test]
    fn test_phase_transitions() {
        let mut gate = PhaseGate::new();
        gate.begin_ingest();
        gate.complete_ingest();
        assert!(gate.require_ingested("feedback generation").is_ok());

        gate.complete_generation();
        assert_eq!(gate.phase(), Phase::Generated);
        assert!(gate.require_ingested("feedback generation").is_ok());

        gate.begin_ingest();
        assert!(gate.require_ingested("feedback generation").is_err());
    }
}
