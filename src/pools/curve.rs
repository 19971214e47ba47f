use crate::errors::ConfigError;
use crate::program::constraint::{Constraint, normalize_weights, weighted_geo_mean};
use crate::program::expr::AffineExpr;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Fieldless curve tag, used when parsing pool descriptions and for logging.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    #[strum(to_string = "weighted_geo_mean", serialize = "balancer", serialize = "weighted")]
    WeightedGeoMean,
    #[strum(to_string = "constant_product", serialize = "uniswap_v2")]
    ConstantProduct,
    #[strum(to_string = "constant_sum")]
    ConstantSum,
}

/// Trading invariant of a pool.
///
/// Every variant turns the pool's current reserves and its (affine) post-trade
/// reserves into the constraints that keep the invariant from decreasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Curve {
    /// `Π R_i^{w_i}`, Balancer style. Weights are exponents and need not sum to one.
    WeightedGeoMean { weights: Vec<f64> },
    /// `Π R_i`, Uniswap v2 style.
    ConstantProduct,
    /// `Σ R_i`
    ConstantSum,
}

impl Curve {
    /// Build a curve from its tag, checking that weights are present iff the tag needs them.
    pub fn from_kind(kind: CurveKind, weights: Option<Vec<f64>>) -> Result<Self, ConfigError> {
        match (kind, weights) {
            (CurveKind::WeightedGeoMean, Some(weights)) => Ok(Curve::WeightedGeoMean { weights }),
            (CurveKind::WeightedGeoMean, None) => Err(ConfigError::MissingWeights { pool: 0 }),
            (CurveKind::ConstantProduct, None) => Ok(Curve::ConstantProduct),
            (CurveKind::ConstantSum, None) => Ok(Curve::ConstantSum),
            (kind, Some(_)) => Err(ConfigError::UnexpectedWeights { pool: 0, curve: kind.to_string() }),
        }
    }

    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::WeightedGeoMean { .. } => CurveKind::WeightedGeoMean,
            Curve::ConstantProduct => CurveKind::ConstantProduct,
            Curve::ConstantSum => CurveKind::ConstantSum,
        }
    }

    pub fn weights(&self) -> Option<&[f64]> {
        match self {
            Curve::WeightedGeoMean { weights } => Some(weights),
            _ => None,
        }
    }

    pub(crate) fn validate(&self, arity: usize) -> Result<(), ConfigError> {
        if let Curve::WeightedGeoMean { weights } = self {
            if weights.len() != arity {
                return Err(ConfigError::WeightsLength { pool: 0, weights: weights.len(), reserves: arity });
            }
            if let Some(&weight) = weights.iter().find(|weight| !(weight.is_finite() && **weight > 0.0)) {
                return Err(ConfigError::InvalidWeight { pool: 0, weight });
            }
        }
        Ok(())
    }

    /// Constraints asserting that `new_reserves` keep the invariant at or above its value at `old_reserves`.
    pub fn feasibility(&self, old_reserves: &[f64], new_reserves: &[AffineExpr]) -> Vec<Constraint> {
        match self {
            Curve::WeightedGeoMean { weights } => {
                let weights = normalize_weights(weights);
                let bound = weighted_geo_mean(old_reserves, &weights);
                vec![Constraint::GeoMeanAtLeast { args: new_reserves.to_vec(), weights, bound }]
            }
            Curve::ConstantProduct => {
                let weights = vec![1.0 / new_reserves.len() as f64; new_reserves.len()];
                let bound = weighted_geo_mean(old_reserves, &weights);
                vec![Constraint::GeoMeanAtLeast { args: new_reserves.to_vec(), weights, bound }]
            }
            Curve::ConstantSum => {
                // the sum alone lets one reserve go negative if another makes up for it
                let mut constraints = vec![Constraint::at_least(AffineExpr::sum(new_reserves), AffineExpr::constant(old_reserves.iter().sum()))];
                constraints.extend(new_reserves.iter().map(|reserve| Constraint::NonNegative(reserve.clone().compact())));
                constraints
            }
        }
    }

    /// Numeric value of the invariant used by `feasibility` (normalized geometric mean or sum).
    pub fn invariant(&self, reserves: &[f64]) -> f64 {
        match self {
            Curve::WeightedGeoMean { weights } => weighted_geo_mean(reserves, &normalize_weights(weights)),
            Curve::ConstantProduct => weighted_geo_mean(reserves, &vec![1.0 / reserves.len() as f64; reserves.len()]),
            Curve::ConstantSum => reserves.iter().sum(),
        }
    }
}
