/// Flows at or below this size are treated as solver noise when analyzing a trade.
pub const DEFAULT_NOISE_THRESHOLD: f64 = 1e-6;

/// A cycle must multiply out to strictly more than this to count as an opportunity.
pub const DEFAULT_BREAKEVEN: f64 = 1.0;

pub const DEFAULT_MAX_CYCLE_LENGTH: usize = 10;

/// Tolerance used when checking a solved point against the program's constraints.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;
