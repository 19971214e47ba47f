//! Cycle arbitrage over quoted exchange rates.

mod cycle_finder;
mod rate_graph;
mod ticker;

pub use cycle_finder::{Opportunity, find_best_cycle};
pub use rate_graph::{FastHashMap, FastHasher, RateEdge, RateGraph};
pub use ticker::{Symbol, Ticker};

use crate::utils::config::DetectorConfig;

/// Build the rate graph from `tickers` and return the most profitable cycle.
///
/// Never fails: unusable tickers are skipped and "nothing found" is an
/// [`Opportunity`] with no legs at the breakeven profit.
pub fn find_best_opportunity(tickers: &[Ticker], config: &DetectorConfig) -> Opportunity {
    let rate_graph = RateGraph::from_tickers(tickers);
    find_best_cycle(&rate_graph, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> Vec<Ticker> {
        vec![
            Ticker::new("BTC", "USDT", 30000.0),
            Ticker::new("ETH", "BTC", 0.3),
            Ticker::new("ETH", "USDT", 2000.0),
            Ticker::new("ETH", "USDC", 1900.0),
            Ticker::new("BTC", "USDC", 35000.0),
            Ticker::new("USDC", "USDT", 1.1),
            Ticker::new("USDC", "TUSD", 0.95),
            Ticker::new("ETH", "TUSD", 1950.0),
            Ticker::new("BTC", "TUSD", 32500.0),
        ]
    }

    #[test]
    fn test_profit_matches_traversed_legs() {
        let opportunity = find_best_opportunity(&market(), &DetectorConfig::default());

        assert!(opportunity.is_found());
        assert!(opportunity.profit > 1.0);
        let product: f64 = opportunity.cycle.iter().map(Ticker::effective_rate).product();
        assert!((product - opportunity.profit).abs() < 1e-9 * opportunity.profit);

        let path = opportunity.path();
        assert_eq!(path.first(), path.last());
        assert_eq!(path.len(), opportunity.hops() + 1);
    }

    #[test]
    fn test_idempotent() {
        let config = DetectorConfig::default();
        let first = find_best_opportunity(&market(), &config);
        let second = find_best_opportunity(&market(), &config);

        assert_eq!(first.profit, second.profit);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_tickers_do_not_change_result() {
        let clean = find_best_opportunity(&market(), &DetectorConfig::default());

        let mut noisy = market();
        noisy.push(Ticker::new("DOGE", "USDT", 0.0));
        noisy.push(Ticker::new("ETH", "ETH", 2.0));
        noisy.push(Ticker::new("BTC", "EUR", f64::NAN));

        assert_eq!(find_best_opportunity(&noisy, &DetectorConfig::default()), clean);
    }

    #[test]
    fn test_reversed_legs_keep_caller_quotes() {
        let tickers = market();
        let opportunity = find_best_opportunity(&tickers, &DetectorConfig::default());

        for leg in &opportunity.cycle {
            let original = Ticker { reversed: false, ..leg.clone() };
            assert!(tickers.contains(&original), "{leg} is not a caller quote");
        }
    }

    #[test]
    fn test_later_quote_wins() {
        let tickers = vec![
            Ticker::new("BTC", "USDT", 30000.0),
            Ticker::new("ETH", "BTC", 0.3),
            Ticker::new("ETH", "USDT", 2000.0),
            Ticker::new("BTC", "USDT", 20000.0),
        ];
        let opportunity = find_best_opportunity(&tickers, &DetectorConfig::default());

        assert!((opportunity.profit - 3.0).abs() < 1e-9);
        assert!(opportunity.cycle.contains(&Ticker::new("BTC", "USDT", 20000.0)));
    }

    #[test]
    fn test_empty_input() {
        let opportunity = find_best_opportunity(&[], &DetectorConfig::default());
        assert_eq!(opportunity, Opportunity::none(1.0));
    }
}
