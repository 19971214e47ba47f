use super::analyzer::TradeAnalysis;
use crate::errors::RouteError;
use crate::pools::Pool;
use crate::program::{build_arbitrage_program, build_rebalance_program};
use crate::solver::{ClarabelSolver, ConicSolver, Solution};
use crate::utils::config::{AnalyzerConfig, EngineConfig, SolverConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Optimal arbitrage trade together with its market-value summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub solution: Solution,
    pub analysis: TradeAnalysis,
}

/// Optimal liquidation of a portfolio into one target token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Liquidation {
    pub target: usize,
    /// Amount of the target token obtained, `psi[target]` at the optimum.
    pub value: f64,
    pub solution: Solution,
}

/// One-call pipelines: build the program, hand it to the solver, read the result back.
///
/// Every call is independent; the router holds only configuration and the
/// solver backend.
pub struct ArbitrageRouter<S: ConicSolver = ClarabelSolver> {
    solver: S,
    analyzer: AnalyzerConfig,
}

impl<S: ConicSolver> ArbitrageRouter<S> {
    pub fn new(solver: S, analyzer: AnalyzerConfig) -> Self {
        Self { solver, analyzer }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn analyzer_config(&self) -> &AnalyzerConfig {
        &self.analyzer
    }

    /// Maximize `market_value · psi` over `pools` and summarize the resulting trade.
    pub fn optimize_arbitrage(&self, n: usize, pools: &[Pool], market_value: &[f64]) -> Result<RouteOutcome, RouteError> {
        let program = build_arbitrage_program(n, pools, market_value)?;

        let solution = self.solver.solve(&program).inspect_err(|e| {
            warn!(solver = self.solver.name(), status = %e.status, "arbitrage solve failed");
        })?;
        debug!(solver = self.solver.name(), optimal_value = solution.optimal_value, "arbitrage solved");

        let analysis = TradeAnalysis::from_solution(pools, n, market_value, &solution, self.analyzer.noise_threshold)?;
        if !analysis.is_idle() {
            info!(
                optimal_value = solution.optimal_value,
                active_pools = analysis.active_pools.len(),
                value_traded = analysis.total_value_traded,
                fees_paid = analysis.fees_paid,
                "found arbitrage trade"
            );
        }

        Ok(RouteOutcome { solution, analysis })
    }

    /// Liquidate `current_assets` into `target`, returning the amount of `target` obtained.
    pub fn rebalance(&self, n: usize, pools: &[Pool], current_assets: &[f64], target: usize) -> Result<Liquidation, RouteError> {
        let program = build_rebalance_program(n, pools, current_assets, target)?;

        let solution = self.solver.solve(&program).inspect_err(|e| {
            warn!(solver = self.solver.name(), status = %e.status, target, "rebalance solve failed");
        })?;
        let value = solution.psi[target];
        debug!(solver = self.solver.name(), target, value, "rebalance solved");

        Ok(Liquidation { target, value, solution })
    }
}

impl ArbitrageRouter<ClarabelSolver> {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(ClarabelSolver::new(config.solver.clone()), config.analyzer.clone())
    }
}

impl Default for ArbitrageRouter<ClarabelSolver> {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Builder for a clarabel-backed [`ArbitrageRouter`]
#[derive(Default)]
pub struct ArbitrageRouterBuilder {
    solver: SolverConfig,
    analyzer: AnalyzerConfig,
}

impl ArbitrageRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_noise_threshold(mut self, threshold: f64) -> Self {
        self.analyzer.noise_threshold = threshold;
        self
    }

    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.solver.max_iter = max_iter;
        self
    }

    pub fn with_time_limit(mut self, secs: f64) -> Self {
        self.solver.time_limit_secs = Some(secs);
        self
    }

    pub fn with_accept_inaccurate(mut self, accept: bool) -> Self {
        self.solver.accept_inaccurate = accept;
        self
    }

    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn build(self) -> ArbitrageRouter<ClarabelSolver> {
        ArbitrageRouter::new(ClarabelSolver::new(self.solver), self.analyzer)
    }
}
