use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Build-time validation failures. Raised before a program ever reaches a solver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("pool {pool}: fee {fee} is outside (0, 1]")]
    FeeOutOfRange { pool: usize, fee: f64 },
    #[error("pool {pool}: {indices} local indices but {reserves} reserves")]
    ArityMismatch { pool: usize, indices: usize, reserves: usize },
    #[error("pool {pool}: pool has no tokens")]
    EmptyPool { pool: usize },
    #[error("unrecognized curve type `{0}`")]
    UnrecognizedCurve(String),
    #[error("pool {pool}: weighted geometric mean curve requires weights")]
    MissingWeights { pool: usize },
    #[error("pool {pool}: curve `{curve}` does not take weights")]
    UnexpectedWeights { pool: usize, curve: String },
    #[error("pool {pool}: {weights} weights for {reserves} reserves")]
    WeightsLength { pool: usize, weights: usize, reserves: usize },
    #[error("pool {pool}: weight {weight} must be finite and positive")]
    InvalidWeight { pool: usize, weight: f64 },
    #[error("pool {pool}: reserve {reserve} must be finite and non-negative")]
    InvalidReserve { pool: usize, reserve: f64 },
    #[error("pool {pool}: token index {index} out of range for {tokens} tokens")]
    IndexOutOfRange { pool: usize, index: usize, tokens: usize },
    #[error("pool {pool}: token index {index} appears more than once")]
    DuplicateIndex { pool: usize, index: usize },
    #[error("{name} has length {actual}, expected {expected}")]
    VectorLength { name: &'static str, expected: usize, actual: usize },
    #[error("target token {target} out of range for {tokens} tokens")]
    TargetOutOfRange { target: usize, tokens: usize },
    #[error("token space is empty")]
    NoTokens,
    #[error("no pools supplied")]
    NoPools,
}

impl ConfigError {
    /// Re-tags a pool-scoped error with the pool's position in the caller's list.
    pub fn at_pool(self, position: usize) -> Self {
        match self {
            ConfigError::FeeOutOfRange { fee, .. } => ConfigError::FeeOutOfRange { pool: position, fee },
            ConfigError::ArityMismatch { indices, reserves, .. } => ConfigError::ArityMismatch { pool: position, indices, reserves },
            ConfigError::EmptyPool { .. } => ConfigError::EmptyPool { pool: position },
            ConfigError::MissingWeights { .. } => ConfigError::MissingWeights { pool: position },
            ConfigError::UnexpectedWeights { curve, .. } => ConfigError::UnexpectedWeights { pool: position, curve },
            ConfigError::WeightsLength { weights, reserves, .. } => ConfigError::WeightsLength { pool: position, weights, reserves },
            ConfigError::InvalidWeight { weight, .. } => ConfigError::InvalidWeight { pool: position, weight },
            ConfigError::InvalidReserve { reserve, .. } => ConfigError::InvalidReserve { pool: position, reserve },
            ConfigError::IndexOutOfRange { index, tokens, .. } => ConfigError::IndexOutOfRange { pool: position, index, tokens },
            ConfigError::DuplicateIndex { index, .. } => ConfigError::DuplicateIndex { pool: position, index },
            other => other,
        }
    }
}

/// Terminal status reported by a solver backend.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    SolverError,
}

/// A solve that did not finish with status `optimal`. Carries no variable values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("problem not solved optimally, status: {status}")]
pub struct SolveError {
    pub status: SolveStatus,
}

impl SolveError {
    pub fn new(status: SolveStatus) -> Self {
        Self { status }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}
