pub mod config;
pub mod config_loader;

pub use config::{AnalyzerConfig, DetectorConfig, EngineConfig, SolverConfig};
pub use config_loader::*;
