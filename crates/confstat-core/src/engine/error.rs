use thiserror::Error;

use super::config::ConfigError;
use super::history::HistoryError;
use crate::core::cell_model::CellModelError;
use crate::core::models::simulation_box::BoxError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Precondition not met: {0}")]
    Precondition(String),

    #[error("Argument outside of the mathematical domain: {0}")]
    Domain(String),

    #[error("Configuration history error: {source}")]
    History {
        #[from]
        source: HistoryError,
    },

    #[error("Cell model error: {source}")]
    CellModel {
        #[from]
        source: CellModelError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid simulation box: {source}")]
    SimulationBox {
        #[from]
        source: BoxError,
    },
}

/// Coarse classification of every failure an analysis can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A malformed or out-of-range argument.
    Validation,
    /// The system state does not allow the operation.
    Precondition,
    /// An iterative method failed.
    Convergence,
    /// A mathematically invalid input.
    Domain,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation(_) => ErrorKind::Validation,
            EngineError::Precondition(_) => ErrorKind::Precondition,
            EngineError::Domain(_) => ErrorKind::Domain,
            EngineError::History { source } => match source {
                HistoryError::EmptyHistory | HistoryError::IndexOutOfRange { .. } => {
                    ErrorKind::Validation
                }
                HistoryError::NoParticles
                | HistoryError::LengthMismatch { .. }
                | HistoryError::Store(_) => ErrorKind::Precondition,
            },
            EngineError::CellModel { source } => match source {
                CellModelError::Domain(_) => ErrorKind::Domain,
                CellModelError::InvalidRadii { .. } | CellModelError::InvalidAccuracy(_) => {
                    ErrorKind::Validation
                }
                CellModelError::BracketInvalid { .. } | CellModelError::NotConverged { .. } => {
                    ErrorKind::Convergence
                }
            },
            EngineError::Config { .. } | EngineError::SimulationBox { .. } => ErrorKind::Validation,
        }
    }
}
