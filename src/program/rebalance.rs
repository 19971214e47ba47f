use super::builder::{Program, ProgramKind, assemble_flows, check_length};
use super::constraint::Constraint;
use super::expr::AffineExpr;
use crate::errors::ConfigError;
use crate::pools::Pool;
use tracing::debug;

/// Build the liquidation program: maximize `psi[target]` while every other
/// holding is sold off exactly, `psi[k] + current_assets[k] == 0` for `k != target`.
///
/// There is no global `psi >= 0` here; the equalities pin every non-target token.
pub fn build_rebalance_program(n: usize, pools: &[Pool], current_assets: &[f64], target: usize) -> Result<Program, ConfigError> {
    let mut flows = assemble_flows(n, pools)?;
    check_length("current_assets", current_assets, n)?;
    if target >= n {
        return Err(ConfigError::TargetOutOfRange { target, tokens: n });
    }

    let objective = flows.psi[target].clone();
    let mut constraints = std::mem::take(&mut flows.constraints);
    constraints.extend(
        flows
            .psi
            .iter()
            .zip(current_assets)
            .enumerate()
            .filter(|(token, _)| *token != target)
            .map(|(_, (psi, held))| Constraint::equal(psi.clone() + *held, AffineExpr::default())),
    );

    debug!(tokens = n, pools = pools.len(), target, constraints = constraints.len(), "built rebalance program");

    Ok(Program::from_parts(ProgramKind::Rebalance { target }, n, flows, objective, constraints))
}
