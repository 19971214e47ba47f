// Convex routing: pools -> program -> solver -> analysis
pub mod pools; // Pool model, curves, incidence mapping
pub mod program; // Arbitrage and rebalance programs
pub mod solver; // Solver seam and the clarabel backend
pub mod logic; // One-call pipelines and trade analysis

// Cycle arbitrage over quoted rates
pub mod graph;

// Common utilities and types
pub mod constants;
pub mod errors;
pub mod utils;

pub use errors::{ConfigError, RouteError, SolveError, SolveStatus};
pub use graph::{Opportunity, Symbol, Ticker, find_best_opportunity};
pub use logic::{ArbitrageRouter, ArbitrageRouterBuilder, Liquidation, PoolActivity, RouteOutcome, TradeAnalysis};
pub use pools::{Curve, CurveKind, IncidenceMatrix, Pool, PoolSpec, build_incidence};
pub use program::{Program, build_arbitrage_program, build_rebalance_program};
pub use solver::{ClarabelSolver, ConicSolver, Solution};
pub use utils::{AnalyzerConfig, DetectorConfig, EngineConfig, SolverConfig};
