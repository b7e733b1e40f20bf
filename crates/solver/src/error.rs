use std::time::Duration;

use sizing_config::ConfigError;
use sizing_core::state::IterationState;
use sizing_mission::{EvaluationError, ExtractionError};
use sizing_propulsion::SurrogateError;
use thiserror::Error;

use crate::criteria::ConvergenceReport;

/// Inputs that cannot produce a physical aircraft or a valid solver setup.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "cruise distance would be non-positive: mission {mission_nmi:.1} nmi, climb {climb_nmi:.1} nmi, step climb {step_climb_nmi:.1} nmi, descent {descent_nmi:.1} nmi"
    )]
    NonPositiveCruise {
        mission_nmi: f64,
        climb_nmi: f64,
        step_climb_nmi: f64,
        descent_nmi: f64,
    },
    #[error(
        "reserve cruise distance would be non-positive: reserve {reserve_nmi:.1} nmi, climb {climb_nmi:.1} nmi, descent {descent_nmi:.1} nmi"
    )]
    NonPositiveReserveCruise {
        reserve_nmi: f64,
        climb_nmi: f64,
        descent_nmi: f64,
    },
    #[error("relaxation gain '{name}' must be finite and positive (got {value})")]
    InvalidGain { name: &'static str, value: f64 },
    #[error("gain band thresholds must satisfy 0 < near ({near}) < far ({far})")]
    InvalidGainBands { near: f64, far: f64 },
    #[error("invalid sizing setup: {0}")]
    Invalid(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("engine tables unavailable: {0}")]
    EngineTables(#[from] SurrogateError),
}

/// Why a sizing run stopped without a converged aircraft.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("mission results incomplete: {0}")]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(
        "no convergence after {iterations} iterations (worst residual {worst:.3} × tolerance)",
        worst = .report.worst_residual
    )]
    NonConvergence {
        iterations: usize,
        state: Box<IterationState>,
        report: ConvergenceReport,
    },
    #[error(
        "residual grew for {window} consecutive iterations (worst residual {worst:.3} × tolerance at iteration {iterations})",
        worst = .report.worst_residual
    )]
    Divergence {
        iterations: usize,
        window: usize,
        state: Box<IterationState>,
        report: ConvergenceReport,
    },
    #[error("wall-clock limit of {limit:?} exceeded after {iterations} iterations")]
    Timeout {
        iterations: usize,
        limit: Duration,
        state: Box<IterationState>,
        report: ConvergenceReport,
    },
}

impl SizingError {
    /// Last state reached before giving up, for the terminal failure kinds.
    pub fn last_state(&self) -> Option<&IterationState> {
        match self {
            Self::NonConvergence { state, .. }
            | Self::Divergence { state, .. }
            | Self::Timeout { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn last_report(&self) -> Option<&ConvergenceReport> {
        match self {
            Self::NonConvergence { report, .. }
            | Self::Divergence { report, .. }
            | Self::Timeout { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Short machine-readable kind, used in sweep summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Extraction(_) => "extraction",
            Self::Evaluation(_) => "evaluation",
            Self::NonConvergence { .. } => "non_convergence",
            Self::Divergence { .. } => "divergence",
            Self::Timeout { .. } => "timeout",
        }
    }
}
