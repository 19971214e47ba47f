use super::{ConicSolver, Solution};
use crate::errors::{SolveError, SolveStatus};
use crate::program::{AffineExpr, Constraint, Program, VarId};
use crate::utils::config::SolverConfig;
use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use tracing::{debug, warn};

/// Interior-point backend.
///
/// Linear inequalities go to the nonnegative cone, equalities to the zero cone,
/// and each geometric-mean constraint becomes a chain of 3-d power cones
/// over auxiliary variables.
#[derive(Debug, Clone, Default)]
pub struct ClarabelSolver {
    config: SolverConfig,
}

impl ClarabelSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn settings(&self) -> Result<DefaultSettings<f64>, SolveError> {
        DefaultSettingsBuilder::default()
            .verbose(self.config.verbose)
            .max_iter(self.config.max_iter)
            .time_limit(self.config.time_limit_secs.unwrap_or(f64::INFINITY))
            .tol_gap_abs(self.config.tol_gap_abs)
            .tol_gap_rel(self.config.tol_gap_rel)
            .tol_feas(self.config.tol_feas)
            .build()
            .map_err(|err| {
                warn!("Invalid solver settings: {}", err);
                SolveError::new(SolveStatus::SolverError)
            })
    }
}

impl ConicSolver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve(&self, program: &Program) -> Result<Solution, SolveError> {
        let cone_program = ConeProgram::lower(program);
        let settings = self.settings()?;

        debug!(
            vars = cone_program.num_vars,
            rows = cone_program.b.len(),
            cones = cone_program.cones.len(),
            "solving with clarabel"
        );

        let (p, a) = cone_program.matrices();
        let mut solver = DefaultSolver::new(&p, &cone_program.q, &a, &cone_program.b, &cone_program.cones, settings);
        solver.solve();

        let status = map_status(&solver.solution.status, self.config.accept_inaccurate);
        if status != SolveStatus::Optimal {
            warn!("Clarabel finished with {:?}, reporting {}", solver.solution.status, status);
            return Err(SolveError::new(status));
        }

        let x = &solver.solution.x[..program.num_vars()];
        Ok(Solution::from_point(program, x))
    }
}

/// Map a clarabel terminal status onto the crate's status contract.
pub(crate) fn map_status(status: &SolverStatus, accept_inaccurate: bool) -> SolveStatus {
    match status {
        SolverStatus::Solved => SolveStatus::Optimal,
        SolverStatus::AlmostSolved if accept_inaccurate => SolveStatus::Optimal,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => SolveStatus::Infeasible,
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => SolveStatus::Unbounded,
        _ => SolveStatus::SolverError,
    }
}

/// `min qᵀx  s.t.  b - Ax ∈ K`, the standard form clarabel consumes.
struct ConeProgram {
    num_vars: usize,
    q: Vec<f64>,
    entries: Vec<(usize, usize, f64)>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl ConeProgram {
    fn lower(program: &Program) -> Self {
        let mut cone_program = Self { num_vars: program.num_vars(), q: Vec::new(), entries: Vec::new(), b: Vec::new(), cones: Vec::new() };

        for constraint in program.constraints() {
            match constraint {
                Constraint::NonNegative(expr) => cone_program.push_nonnegative(expr),
                Constraint::Zero(expr) => cone_program.push_zero(expr),
                Constraint::GeoMeanAtLeast { args, weights, bound } => cone_program.push_geo_mean(args, weights, *bound),
            }
        }

        // maximize objective == minimize its negation; the constant does not move the optimum
        cone_program.q = vec![0.0; cone_program.num_vars];
        for (var, coef) in &program.objective().terms {
            cone_program.q[var.0] -= coef;
        }
        cone_program
    }

    fn add_aux(&mut self) -> VarId {
        self.num_vars += 1;
        VarId(self.num_vars - 1)
    }

    /// Append a slack row equal to `expr(x)`.
    fn push_row(&mut self, expr: &AffineExpr) {
        let row = self.b.len();
        for (var, coef) in &expr.terms {
            if *coef != 0.0 {
                self.entries.push((row, var.0, -coef));
            }
        }
        self.b.push(expr.constant);
    }

    fn push_nonnegative(&mut self, expr: &AffineExpr) {
        self.push_row(expr);
        match self.cones.last_mut() {
            Some(SupportedConeT::NonnegativeConeT(dim)) => *dim += 1,
            _ => self.cones.push(SupportedConeT::NonnegativeConeT(1)),
        }
    }

    fn push_zero(&mut self, expr: &AffineExpr) {
        self.push_row(expr);
        match self.cones.last_mut() {
            Some(SupportedConeT::ZeroConeT(dim)) => *dim += 1,
            _ => self.cones.push(SupportedConeT::ZeroConeT(1)),
        }
    }

    /// `x^alpha · y^(1-alpha) >= |z|`, `x, y >= 0`
    fn push_power(&mut self, alpha: f64, x: &AffineExpr, y: &AffineExpr, z: &AffineExpr) {
        self.push_row(x);
        self.push_row(y);
        self.push_row(z);
        self.cones.push(SupportedConeT::PowerConeT(alpha));
    }

    /// `Π args^weights >= bound`, chaining two-argument power cones:
    /// `t_j <= t_{j-1}^{S_{j-1}/S_j} · args_j^{w_j/S_j}` with `S_j` the running weight sum,
    /// so the last `t` bounds the full weighted geometric mean from below.
    fn push_geo_mean(&mut self, args: &[AffineExpr], weights: &[f64], bound: f64) {
        let Some((first, rest)) = args.split_first() else {
            return;
        };
        let mut running = first.clone();
        let mut weight_sum = weights[0];
        for (arg, weight) in rest.iter().zip(&weights[1..]) {
            let next_sum = weight_sum + weight;
            let t = self.add_aux();
            self.push_power(weight_sum / next_sum, &running, arg, &AffineExpr::var(t));
            running = AffineExpr::var(t);
            weight_sum = next_sum;
        }
        if rest.is_empty() {
            // a lone argument still has to stay non-negative
            self.push_nonnegative(first);
        }
        self.push_nonnegative(&(running + -bound));
    }

    fn matrices(&self) -> (CscMatrix<f64>, CscMatrix<f64>) {
        let p = CscMatrix::new(self.num_vars, self.num_vars, vec![0; self.num_vars + 1], Vec::new(), Vec::new());
        let a = csc_from_entries(self.b.len(), self.num_vars, self.entries.clone());
        (p, a)
    }
}

fn csc_from_entries(nrows: usize, ncols: usize, mut entries: Vec<(usize, usize, f64)>) -> CscMatrix<f64> {
    entries.sort_by(|lhs, rhs| (lhs.1, lhs.0).cmp(&(rhs.1, rhs.0)));

    let mut colptr = vec![0; ncols + 1];
    let mut rowval = Vec::with_capacity(entries.len());
    let mut nzval: Vec<f64> = Vec::with_capacity(entries.len());
    let mut last = None;
    for (row, col, value) in entries {
        if last == Some((row, col)) {
            if let Some(previous) = nzval.last_mut() {
                *previous += value;
            }
            continue;
        }
        rowval.push(row);
        nzval.push(value);
        colptr[col + 1] += 1;
        last = Some((row, col));
    }
    for col in 0..ncols {
        colptr[col + 1] += colptr[col];
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}
