use super::curve::{Curve, CurveKind};
use crate::errors::ConfigError;
use crate::program::expr::{AffineExpr, VarId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Raw pool description as it comes from a config file or a caller's JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub local_indices: Vec<usize>,
    pub reserves: Vec<f64>,
    pub fee: f64,
    pub curve_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
}

/// A validated liquidity pool.
///
/// `fee` is the fraction of the tendered amount that reaches the reserves,
/// e.g. `0.997` for a 30 bps pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PoolSpec", into = "PoolSpec")]
pub struct Pool {
    local_indices: Vec<usize>,
    reserves: Vec<f64>,
    fee: f64,
    curve: Curve,
}

impl Pool {
    pub fn new(local_indices: Vec<usize>, reserves: Vec<f64>, fee: f64, curve: Curve) -> Result<Self, ConfigError> {
        if local_indices.len() != reserves.len() {
            return Err(ConfigError::ArityMismatch { pool: 0, indices: local_indices.len(), reserves: reserves.len() });
        }
        if local_indices.is_empty() {
            return Err(ConfigError::EmptyPool { pool: 0 });
        }
        if !(fee > 0.0 && fee <= 1.0) {
            return Err(ConfigError::FeeOutOfRange { pool: 0, fee });
        }
        if let Some(&reserve) = reserves.iter().find(|reserve| !(reserve.is_finite() && **reserve >= 0.0)) {
            return Err(ConfigError::InvalidReserve { pool: 0, reserve });
        }
        let mut seen = HashSet::new();
        if let Some(&index) = local_indices.iter().find(|index| !seen.insert(**index)) {
            return Err(ConfigError::DuplicateIndex { pool: 0, index });
        }
        curve.validate(reserves.len())?;

        Ok(Self { local_indices, reserves, fee, curve })
    }

    pub fn weighted(local_indices: Vec<usize>, reserves: Vec<f64>, weights: Vec<f64>, fee: f64) -> Result<Self, ConfigError> {
        Self::new(local_indices, reserves, fee, Curve::WeightedGeoMean { weights })
    }

    pub fn constant_product(local_indices: Vec<usize>, reserves: Vec<f64>, fee: f64) -> Result<Self, ConfigError> {
        Self::new(local_indices, reserves, fee, Curve::ConstantProduct)
    }

    pub fn constant_sum(local_indices: Vec<usize>, reserves: Vec<f64>, fee: f64) -> Result<Self, ConfigError> {
        Self::new(local_indices, reserves, fee, Curve::ConstantSum)
    }

    pub fn local_indices(&self) -> &[usize] {
        &self.local_indices
    }

    pub fn reserves(&self) -> &[f64] {
        &self.reserves
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn arity(&self) -> usize {
        self.reserves.len()
    }

    /// Post-trade reserves `R + fee·Δ - Λ` as affine expressions of the pool's decision variables.
    pub fn new_reserves(&self, delta: &[VarId], lambda: &[VarId]) -> Vec<AffineExpr> {
        self.reserves
            .iter()
            .zip(delta.iter().zip(lambda))
            .map(|(reserve, (d, l))| {
                let mut expr = AffineExpr::constant(*reserve);
                expr.add_term(*d, self.fee);
                expr.add_term(*l, -1.0);
                expr
            })
            .collect()
    }

    /// Numeric counterpart of `new_reserves` for a solved trade.
    pub fn reserves_after(&self, delta: &[f64], lambda: &[f64]) -> Vec<f64> {
        self.reserves.iter().zip(delta.iter().zip(lambda)).map(|(reserve, (d, l))| reserve + self.fee * d - l).collect()
    }
}

impl TryFrom<PoolSpec> for Pool {
    type Error = ConfigError;

    fn try_from(spec: PoolSpec) -> Result<Self, Self::Error> {
        let kind = CurveKind::from_str(spec.curve_type.trim()).map_err(|_| ConfigError::UnrecognizedCurve(spec.curve_type.clone()))?;
        let curve = Curve::from_kind(kind, spec.weights)?;
        Pool::new(spec.local_indices, spec.reserves, spec.fee, curve)
    }
}

impl From<Pool> for PoolSpec {
    fn from(pool: Pool) -> Self {
        PoolSpec {
            local_indices: pool.local_indices,
            reserves: pool.reserves,
            fee: pool.fee,
            curve_type: pool.curve.kind().to_string(),
            weights: pool.curve.weights().map(<[f64]>::to_vec),
        }
    }
}

impl Display for Pool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(fee={})@{:?}", self.curve.kind(), self.fee, self.local_indices)
    }
}

/// Convert raw specs into pools, tagging any error with the offending pool's position.
pub fn pools_from_specs(specs: Vec<PoolSpec>) -> Result<Vec<Pool>, ConfigError> {
    specs.into_iter().enumerate().map(|(position, spec)| Pool::try_from(spec).map_err(|err| err.at_pool(position))).collect()
}
