/// Trade pipelines on top of the program builders
///
/// - `router`: build, solve and summarize in one call
/// - `analyzer`: market-value breakdown of an optimal trade
pub mod analyzer;
pub mod router;

#[cfg(test)]
mod tests;

pub use analyzer::{PoolActivity, TradeAnalysis};
pub use router::{ArbitrageRouter, ArbitrageRouterBuilder, Liquidation, RouteOutcome};
