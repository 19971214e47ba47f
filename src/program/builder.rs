use super::constraint::Constraint;
use super::expr::{AffineExpr, VarId};
use crate::errors::ConfigError;
use crate::pools::{Pool, build_incidence};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decision variables owned by one pool: tendered (`delta`) and received (`lambda`) amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolVariables {
    pub delta: Vec<VarId>,
    pub lambda: Vec<VarId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramKind {
    /// Maximize the external value of the net flow.
    Arbitrage,
    /// Liquidate every holding into `target`.
    Rebalance { target: usize },
}

/// An assembled convex program: maximize `objective` subject to `constraints`.
///
/// Built by a pure function and never mutated afterwards, so independent
/// programs can be solved concurrently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    kind: ProgramKind,
    num_tokens: usize,
    num_vars: usize,
    pool_vars: Vec<PoolVariables>,
    psi: Vec<AffineExpr>,
    objective: AffineExpr,
    constraints: Vec<Constraint>,
}

impl Program {
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    pub fn num_tokens(&self) -> usize {
        self.num_tokens
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn pool_variables(&self) -> &[PoolVariables] {
        &self.pool_vars
    }

    /// Net flow per token, `Σ A_i (λ_i - Δ_i)`.
    pub fn psi(&self) -> &[AffineExpr] {
        &self.psi
    }

    /// Maximized.
    pub fn objective(&self) -> &AffineExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective.evaluate(x)
    }

    pub fn psi_values(&self, x: &[f64]) -> Vec<f64> {
        self.psi.iter().map(|expr| expr.evaluate(x)).collect()
    }

    pub fn deltas(&self, x: &[f64]) -> Vec<Vec<f64>> {
        self.pool_vars.iter().map(|vars| vars.delta.iter().map(|var| x[var.0]).collect()).collect()
    }

    pub fn lambdas(&self, x: &[f64]) -> Vec<Vec<f64>> {
        self.pool_vars.iter().map(|vars| vars.lambda.iter().map(|var| x[var.0]).collect()).collect()
    }

    pub fn max_violation(&self, x: &[f64]) -> f64 {
        self.constraints.iter().map(|constraint| constraint.violation(x)).fold(0.0, f64::max)
    }

    pub fn is_feasible(&self, x: &[f64], tolerance: f64) -> bool {
        self.max_violation(x) <= tolerance
    }
}

/// Variables, net flow and per-pool constraints shared by every program mode.
pub(crate) struct FlowModel {
    pub num_vars: usize,
    pub pool_vars: Vec<PoolVariables>,
    pub psi: Vec<AffineExpr>,
    pub constraints: Vec<Constraint>,
}

pub(crate) fn assemble_flows(n: usize, pools: &[Pool]) -> Result<FlowModel, ConfigError> {
    if n == 0 {
        return Err(ConfigError::NoTokens);
    }
    if pools.is_empty() {
        return Err(ConfigError::NoPools);
    }
    let local_indices: Vec<Vec<usize>> = pools.iter().map(|pool| pool.local_indices().to_vec()).collect();
    let incidence = build_incidence(n, &local_indices)?;

    let mut num_vars = 0;
    let mut next_vars = |count: usize| {
        let vars: Vec<VarId> = (num_vars..num_vars + count).map(VarId).collect();
        num_vars += count;
        vars
    };
    let pool_vars: Vec<PoolVariables> =
        pools.iter().map(|pool| PoolVariables { delta: next_vars(pool.arity()), lambda: next_vars(pool.arity()) }).collect();

    let mut psi = vec![AffineExpr::default(); n];
    for (matrix, vars) in incidence.iter().zip(&pool_vars) {
        for ((&row, lambda), delta) in matrix.column_rows().iter().zip(&vars.lambda).zip(&vars.delta) {
            psi[row].add_term(*lambda, 1.0);
            psi[row].add_term(*delta, -1.0);
        }
    }
    let psi: Vec<AffineExpr> = psi.into_iter().map(AffineExpr::compact).collect();

    let mut constraints = Vec::new();
    for (pool, vars) in pools.iter().zip(&pool_vars) {
        let new_reserves = pool.new_reserves(&vars.delta, &vars.lambda);
        constraints.extend(pool.curve().feasibility(pool.reserves(), &new_reserves));
    }
    for vars in &pool_vars {
        constraints.extend(vars.delta.iter().chain(&vars.lambda).map(|var| Constraint::NonNegative(AffineExpr::var(*var))));
    }

    Ok(FlowModel { num_vars, pool_vars, psi, constraints })
}

pub(crate) fn check_length(name: &'static str, values: &[f64], expected: usize) -> Result<(), ConfigError> {
    if values.len() != expected {
        return Err(ConfigError::VectorLength { name, expected, actual: values.len() });
    }
    Ok(())
}

/// Build the arbitrage program: maximize `objective · psi` with `psi >= 0`.
///
/// `objective` is usually the market value vector. All configuration errors
/// are raised here, before anything reaches a solver.
pub fn build_arbitrage_program(n: usize, pools: &[Pool], objective: &[f64]) -> Result<Program, ConfigError> {
    let mut flows = assemble_flows(n, pools)?;
    check_length("objective", objective, n)?;

    let objective = AffineExpr::dot(objective, &flows.psi);
    let mut constraints = std::mem::take(&mut flows.constraints);
    // no uncompensated external capital
    constraints.extend(flows.psi.iter().map(|psi| Constraint::NonNegative(psi.clone())));

    debug!(tokens = n, pools = pools.len(), vars = flows.num_vars, constraints = constraints.len(), "built arbitrage program");

    Ok(Program::from_parts(ProgramKind::Arbitrage, n, flows, objective, constraints))
}

impl Program {
    pub(crate) fn from_parts(
        kind: ProgramKind,
        num_tokens: usize,
        flows: FlowModel,
        objective: AffineExpr,
        constraints: Vec<Constraint>,
    ) -> Self {
        Self { kind, num_tokens, num_vars: flows.num_vars, pool_vars: flows.pool_vars, psi: flows.psi, objective, constraints }
    }
}
