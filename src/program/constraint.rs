use super::expr::AffineExpr;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A convex constraint over the program's decision variables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// `expr >= 0`
    NonNegative(AffineExpr),
    /// `expr == 0`
    Zero(AffineExpr),
    /// `Π args[i]^weights[i] >= bound` with `args >= 0`.
    /// Weights are positive and sum to one.
    GeoMeanAtLeast { args: Vec<AffineExpr>, weights: Vec<f64>, bound: f64 },
}

impl Constraint {
    /// `lhs >= rhs`
    pub fn at_least(lhs: AffineExpr, rhs: AffineExpr) -> Self {
        Constraint::NonNegative((lhs - rhs).compact())
    }

    /// `lhs == rhs`
    pub fn equal(lhs: AffineExpr, rhs: AffineExpr) -> Self {
        Constraint::Zero((lhs - rhs).compact())
    }

    /// Amount by which `x` violates the constraint, zero when satisfied.
    pub fn violation(&self, x: &[f64]) -> f64 {
        match self {
            Constraint::NonNegative(expr) => (-expr.evaluate(x)).max(0.0),
            Constraint::Zero(expr) => expr.evaluate(x).abs(),
            Constraint::GeoMeanAtLeast { args, weights, bound } => {
                let values: Vec<f64> = args.iter().map(|arg| arg.evaluate(x)).collect();
                let negative = values.iter().fold(0.0_f64, |acc, value| acc.max(-value));
                if negative > 0.0 {
                    return negative;
                }
                (bound - weighted_geo_mean(&values, weights)).max(0.0)
            }
        }
    }

    pub fn is_satisfied(&self, x: &[f64], tolerance: f64) -> bool {
        self.violation(x) <= tolerance
    }
}

/// `Π values[i]^weights[i]` for non-negative values and normalized weights.
pub fn weighted_geo_mean(values: &[f64], weights: &[f64]) -> f64 {
    values.iter().zip(weights).map(|(value, weight)| value.powf(*weight)).product()
}

/// Scale positive weights so they sum to one.
pub fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    weights.iter().map(|weight| weight / total).collect()
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::NonNegative(expr) => write!(f, "{expr} >= 0"),
            Constraint::Zero(expr) => write!(f, "{expr} == 0"),
            Constraint::GeoMeanAtLeast { args, weights, bound } => {
                write!(f, "geo_mean(")?;
                for (arg, weight) in args.iter().zip(weights) {
                    write!(f, "[{arg}]^{weight:.4} ")?;
                }
                write!(f, ") >= {bound}")
            }
        }
    }
}
