use crate::core::date::ParseError;
use crate::core::obligation::ObligationError;
use crate::optimization::simplex::SolverError;
use crate::schedule::ScheduleError;
use thiserror::Error;

/// Top-level error for a dedication run.
///
/// Every failure aborts the run; no partial portfolio is ever returned.
#[derive(Debug, Error)]
pub enum DedicationError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Obligation(#[from] ObligationError),
    #[error("no feasible portfolio matches the liability schedule: {message}")]
    Infeasible { message: String },
    #[error("solver failure: {0}")]
    Solver(SolverError),
    #[error("the instrument universe is empty after screening")]
    EmptyUniverse,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
