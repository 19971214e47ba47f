//! Solver seam.
//!
//! The numerical algorithm lives behind [`ConicSolver`]; this crate only
//! fixes the program shape and the status contract. [`ClarabelSolver`] is the
//! bundled backend.

pub mod clarabel_solver;

pub use clarabel_solver::ClarabelSolver;

use crate::errors::{SolveError, SolveStatus};
use crate::program::Program;
use serde::{Deserialize, Serialize};

/// Optimal point of a program, expressed in the caller's terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub optimal_value: f64,
    /// Net flow per global token.
    pub psi: Vec<f64>,
    /// Tendered amounts, one vector per pool in pool order.
    pub deltas: Vec<Vec<f64>>,
    /// Received amounts, one vector per pool in pool order.
    pub lambdas: Vec<Vec<f64>>,
    pub status: SolveStatus,
}

impl Solution {
    /// Read every output of `program` off an optimal assignment `x` of its variables.
    pub fn from_point(program: &Program, x: &[f64]) -> Self {
        Self {
            optimal_value: program.objective_value(x),
            psi: program.psi_values(x),
            deltas: program.deltas(x),
            lambdas: program.lambdas(x),
            status: SolveStatus::Optimal,
        }
    }
}

pub trait ConicSolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Solve `program` to optimality.
    ///
    /// Any terminal status other than `optimal` is an error carrying that status.
    fn solve(&self, program: &Program) -> Result<Solution, SolveError>;
}
