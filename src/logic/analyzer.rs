use crate::errors::ConfigError;
use crate::pools::{IncidenceMatrix, Pool};
use crate::program::builder::check_length;
use crate::solver::Solution;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What one pool did in an optimal trade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolActivity {
    pub pool: usize,
    /// Market value of everything tendered into the pool.
    pub value_in: f64,
    /// Market value of everything received from the pool.
    pub value_out: f64,
    /// Tendered amount lost to the fee, in token units summed across the pool.
    pub fee_paid: f64,
}

/// Market-value summary of a solved arbitrage program.
///
/// Flow components at or below the noise threshold are solver residue and
/// are ignored everywhere.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeAnalysis {
    pub total_value_traded: f64,
    pub fees_paid: f64,
    pub profit_by_token: Vec<f64>,
    pub active_pools: BTreeSet<usize>,
    pub pools: Vec<PoolActivity>,
}

impl TradeAnalysis {
    pub fn from_solution(
        pools: &[Pool],
        n: usize,
        market_value: &[f64],
        solution: &Solution,
        noise_threshold: f64,
    ) -> Result<Self, ConfigError> {
        check_length("market_value", market_value, n)?;
        if solution.deltas.len() != pools.len() || solution.lambdas.len() != pools.len() {
            return Err(ConfigError::VectorLength {
                name: "solution.deltas",
                expected: pools.len(),
                actual: solution.deltas.len().min(solution.lambdas.len()),
            });
        }

        let mut analysis = TradeAnalysis { profit_by_token: vec![0.0; n], ..Default::default() };

        for (pool_idx, pool) in pools.iter().enumerate() {
            let deltas = &solution.deltas[pool_idx];
            let lambdas = &solution.lambdas[pool_idx];

            let active = deltas.iter().chain(lambdas.iter()).any(|&v| v > noise_threshold);
            if !active {
                continue;
            }
            analysis.active_pools.insert(pool_idx);

            let mut activity = PoolActivity { pool: pool_idx, value_in: 0.0, value_out: 0.0, fee_paid: 0.0 };

            let incidence = IncidenceMatrix::new(n, pool.local_indices()).map_err(|err| err.at_pool(pool_idx))?;
            let local_value = incidence.gather(market_value)?;

            for ((&delta, &token), price) in deltas.iter().zip(incidence.column_rows()).zip(&local_value) {
                if delta > noise_threshold {
                    let value = delta * price;
                    activity.value_in += value;
                    analysis.profit_by_token[token] -= value;
                }
            }
            for ((&lambda, &token), price) in lambdas.iter().zip(incidence.column_rows()).zip(&local_value) {
                if lambda > noise_threshold {
                    let value = lambda * price;
                    activity.value_out += value;
                    analysis.profit_by_token[token] += value;
                }
            }

            activity.fee_paid = deltas.iter().sum::<f64>() * (1.0 - pool.fee());

            analysis.total_value_traded += activity.value_in;
            analysis.fees_paid += activity.fee_paid;
            analysis.pools.push(activity);
        }

        Ok(analysis)
    }

    /// Net market value gained across all tokens.
    pub fn net_value(&self) -> f64 {
        self.profit_by_token.iter().sum()
    }

    pub fn is_idle(&self) -> bool {
        self.active_pools.is_empty()
    }
}
