use super::config_loader::{ConfigLoaderSync, LoadConfigError, load_from_file_sync};
use crate::constants::{DEFAULT_BREAKEVEN, DEFAULT_MAX_CYCLE_LENGTH, DEFAULT_NOISE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Settings handed to the conic solver backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum interior-point iterations
    pub max_iter: u32,
    /// Wall clock limit in seconds, unbounded when absent
    pub time_limit_secs: Option<f64>,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
    /// Print the backend's iteration log
    pub verbose: bool,
    /// Treat a reduced-accuracy solve as optimal
    pub accept_inaccurate: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            time_limit_secs: None,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
            verbose: false,
            accept_inaccurate: false,
        }
    }
}

/// Settings for post-solve trade analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Flows at or below this are ignored
    pub noise_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { noise_threshold: DEFAULT_NOISE_THRESHOLD }
    }
}

/// Settings for the cycle arbitrage detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Longest cycle (in hops) that is enumerated
    pub max_cycle_length: usize,
    /// A cycle must multiply out to strictly more than this
    pub breakeven: f64,
    /// Stop enumerating after this many search steps, unbounded when absent
    pub max_search_steps: Option<usize>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { max_cycle_length: DEFAULT_MAX_CYCLE_LENGTH, breakeven: DEFAULT_BREAKEVEN, max_search_steps: None }
    }
}

impl DetectorConfig {
    pub fn with_max_cycle_length(mut self, max_cycle_length: usize) -> Self {
        self.max_cycle_length = max_cycle_length;
        self
    }

    pub fn with_breakeven(mut self, breakeven: f64) -> Self {
        self.breakeven = breakeven;
        self
    }
}

/// Whole-crate configuration, one TOML table per section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverConfig,
    pub analyzer: AnalyzerConfig,
    pub detector: DetectorConfig,
}

impl EngineConfig {
    /// Defaults overridden by environment variables, then validated
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let mut config = Self::default();
        config.apply_env_with(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Override individual settings from `SOLVER_*`, `ANALYZER_*` and `DETECTOR_*` variables.
    pub fn apply_env(&mut self) -> eyre::Result<()> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<()> {
        env_override(&lookup, "SOLVER_MAX_ITER", &mut self.solver.max_iter)?;
        env_override(&lookup, "SOLVER_VERBOSE", &mut self.solver.verbose)?;
        env_override(&lookup, "SOLVER_ACCEPT_INACCURATE", &mut self.solver.accept_inaccurate)?;
        env_override(&lookup, "ANALYZER_NOISE_THRESHOLD", &mut self.analyzer.noise_threshold)?;
        env_override(&lookup, "DETECTOR_MAX_CYCLE_LENGTH", &mut self.detector.max_cycle_length)?;
        env_override(&lookup, "DETECTOR_BREAKEVEN", &mut self.detector.breakeven)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), LoadConfigError> {
        if self.detector.max_cycle_length == 0 {
            return Err(LoadConfigError::ConfigError("detector.max_cycle_length must be at least 1".to_string()));
        }
        if !(self.detector.breakeven.is_finite() && self.detector.breakeven > 0.0) {
            return Err(LoadConfigError::ConfigError(format!("detector.breakeven must be positive, got {}", self.detector.breakeven)));
        }
        if !(self.analyzer.noise_threshold.is_finite() && self.analyzer.noise_threshold >= 0.0) {
            return Err(LoadConfigError::ConfigError(format!(
                "analyzer.noise_threshold must be non-negative, got {}",
                self.analyzer.noise_threshold
            )));
        }
        Ok(())
    }
}

impl ConfigLoaderSync for EngineConfig {
    type SectionType = EngineConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let config: EngineConfig = load_from_file_sync(file_name)?;
        config.validate()?;
        Ok(config)
    }
}

fn env_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, target: &mut T) -> eyre::Result<()>
where
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(name) {
        *target = raw.parse().map_err(|e| eyre::eyre!("Invalid {}: {}", name, e))?;
    }
    Ok(())
}
