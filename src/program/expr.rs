use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Index of a scalar decision variable inside one program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl Display for VarId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// `Σ coef · x[var] + constant`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AffineExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl AffineExpr {
    pub fn constant(value: f64) -> Self {
        Self { terms: Vec::new(), constant: value }
    }

    pub fn var(var: VarId) -> Self {
        Self { terms: vec![(var, 1.0)], constant: 0.0 }
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) {
        self.terms.push((var, coef));
    }

    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.terms.iter().fold(self.constant, |acc, (var, coef)| acc + coef * x[var.0])
    }

    /// Merge repeated variables and drop zero coefficients. Terms come out ordered by variable.
    pub fn compact(self) -> Self {
        let mut merged: BTreeMap<VarId, f64> = BTreeMap::new();
        for (var, coef) in self.terms {
            *merged.entry(var).or_insert(0.0) += coef;
        }
        Self { terms: merged.into_iter().filter(|(_, coef)| *coef != 0.0).collect(), constant: self.constant }
    }

    /// Linear combination `Σ coefs[i] · exprs[i]`.
    pub fn dot(coefs: &[f64], exprs: &[AffineExpr]) -> Self {
        coefs.iter().zip(exprs).fold(AffineExpr::default(), |acc, (coef, expr)| acc + expr.clone() * *coef).compact()
    }

    pub fn sum(exprs: &[AffineExpr]) -> Self {
        exprs.iter().cloned().fold(AffineExpr::default(), |acc, expr| acc + expr).compact()
    }
}

impl From<f64> for AffineExpr {
    fn from(value: f64) -> Self {
        AffineExpr::constant(value)
    }
}

impl From<VarId> for AffineExpr {
    fn from(var: VarId) -> Self {
        AffineExpr::var(var)
    }
}

impl AddAssign for AffineExpr {
    fn add_assign(&mut self, rhs: Self) {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl Add for AffineExpr {
    type Output = AffineExpr;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Add<f64> for AffineExpr {
    type Output = AffineExpr;

    fn add(mut self, rhs: f64) -> Self::Output {
        self.constant += rhs;
        self
    }
}

impl Neg for AffineExpr {
    type Output = AffineExpr;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl Sub for AffineExpr {
    type Output = AffineExpr;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Mul<f64> for AffineExpr {
    type Output = AffineExpr;

    fn mul(self, rhs: f64) -> Self::Output {
        Self { terms: self.terms.into_iter().map(|(var, coef)| (var, coef * rhs)).collect(), constant: self.constant * rhs }
    }
}

impl Display for AffineExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (var, coef) in &self.terms {
            write!(f, "{coef:+}*{var} ")?;
        }
        write!(f, "{:+}", self.constant)
    }
}
