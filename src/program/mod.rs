//! Solver-independent convex programs built from a pool set.
//!
//! A [`Program`] owns its variable layout, the net-flow expressions `psi`,
//! a linear objective to maximize and the full constraint list. Building one
//! validates every input; solving is left to a [`crate::solver::ConicSolver`].

pub mod builder;
pub mod constraint;
pub mod expr;
pub mod rebalance;

pub use builder::{PoolVariables, Program, ProgramKind, build_arbitrage_program};
pub use constraint::Constraint;
pub use expr::{AffineExpr, VarId};
pub use rebalance::build_rebalance_program;
