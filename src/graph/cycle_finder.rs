use super::rate_graph::RateGraph;
use super::ticker::Ticker;
use crate::utils::config::DetectorConfig;
use petgraph::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;
use tracing::{debug, error, info};

/// Best closed trading cycle found, or none at the breakeven profit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Legs in traversal order, each expressed against the caller's original quote.
    pub cycle: Vec<Ticker>,
    /// Product of the legs' effective rates.
    pub profit: f64,
}

impl Opportunity {
    pub fn none(breakeven: f64) -> Self {
        Self { cycle: Vec::new(), profit: breakeven }
    }

    pub fn is_found(&self) -> bool {
        !self.cycle.is_empty()
    }

    pub fn hops(&self) -> usize {
        self.cycle.len()
    }

    /// Currencies visited, closing back on the first one. Empty when nothing was found.
    pub fn path(&self) -> Vec<String> {
        let mut path: Vec<String> = self.cycle.iter().map(|leg| leg.from_currency().to_string()).collect();
        if let Some(first) = path.first().cloned() {
            path.push(first);
        }
        path
    }
}

/// State of the depth-first cycle search from one start node.
#[derive(Debug)]
struct CycleState {
    node: NodeIndex<usize>,
    path: Vec<NodeIndex<usize>>,
    profit: f64,
}

#[derive(Debug)]
struct Candidate {
    // rotated to start at the smallest currency code
    nodes: Vec<NodeIndex<usize>>,
    profit: f64,
}

/// Enumerate every simple cycle of at most `max_cycle_length` hops and keep
/// the most profitable one above `breakeven`.
///
/// Each cycle is visited once, from its lowest-index node, by only walking to
/// nodes with a higher index. Ties on profit go to the shorter cycle, then to
/// the lexicographically smaller currency sequence.
pub fn find_best_cycle(rate_graph: &RateGraph, config: &DetectorConfig) -> Opportunity {
    let mut best: Option<Candidate> = None;
    let mut searched_counter = 0usize;
    let mut cycles_seen = 0usize;

    'starts: for start in rate_graph.graph.node_indices() {
        let mut stack = VecDeque::new();
        stack.push_back(CycleState { node: start, path: vec![start], profit: 1.0 });

        while let Some(CycleState { node, path, profit }) = stack.pop_back() {
            if let Some(limit) = config.max_search_steps {
                if searched_counter >= limit {
                    error!(
                        "Cycle search step limit {} reached at start={}, cycles_seen={}, stopping early",
                        limit,
                        rate_graph.currency(start),
                        cycles_seen
                    );
                    break 'starts;
                }
            }
            searched_counter += 1;

            for edge in rate_graph.graph.edges(node) {
                let next = edge.target();
                let next_profit = edge.weight().apply(profit);

                if next == start {
                    if path.len() >= 2 {
                        cycles_seen += 1;
                        consider(rate_graph, &mut best, &path, next_profit, config.breakeven);
                    }
                    continue;
                }

                // lower indices belong to cycles already enumerated from another start
                if next.index() < start.index() || path.contains(&next) || path.len() >= config.max_cycle_length {
                    continue;
                }

                let mut next_path = path.clone();
                next_path.push(next);
                stack.push_back(CycleState { node: next, path: next_path, profit: next_profit });
            }
        }
    }

    debug!(
        currencies = rate_graph.currency_count(),
        edges = rate_graph.edge_count(),
        steps = searched_counter,
        cycles = cycles_seen,
        "cycle search finished"
    );

    let Some(best) = best else {
        return Opportunity::none(config.breakeven);
    };

    let cycle: Vec<Ticker> = best
        .nodes
        .iter()
        .zip(best.nodes.iter().cycle().skip(1))
        .filter_map(|(&from, &to)| rate_graph.edge(from, to).map(|edge| edge.leg()))
        .collect();

    let opportunity = Opportunity { cycle, profit: best.profit };
    info!("Found cycle opportunity profit={:.6} path={}", opportunity.profit, opportunity.path().join(" -> "));
    opportunity
}

fn consider(rate_graph: &RateGraph, best: &mut Option<Candidate>, path: &[NodeIndex<usize>], profit: f64, breakeven: f64) {
    // NaN on either side never clears the threshold
    if profit.partial_cmp(&breakeven) != Some(Ordering::Greater) {
        return;
    }
    if let Some(current) = best.as_ref() {
        if profit < current.profit {
            return;
        }
    }

    let nodes = canonical_rotation(rate_graph, path);
    let replace = match best.as_ref() {
        None => true,
        Some(current) => match profit.partial_cmp(&current.profit) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => prefer(rate_graph, &nodes, &current.nodes),
            _ => false,
        },
    };
    if replace {
        *best = Some(Candidate { nodes, profit });
    }
}

/// Rotate a cycle so it starts at its lexicographically smallest currency code.
fn canonical_rotation(rate_graph: &RateGraph, path: &[NodeIndex<usize>]) -> Vec<NodeIndex<usize>> {
    let start = path
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| rate_graph.currency(**a).cmp(rate_graph.currency(**b)))
        .map(|(position, _)| position)
        .unwrap_or(0);
    let mut nodes = path.to_vec();
    nodes.rotate_left(start);
    nodes
}

fn prefer(rate_graph: &RateGraph, candidate: &[NodeIndex<usize>], current: &[NodeIndex<usize>]) -> bool {
    match candidate.len().cmp(&current.len()) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => {
            let codes = |nodes: &[NodeIndex<usize>]| nodes.iter().map(|node| rate_graph.currency(*node).to_string()).collect::<Vec<_>>();
            codes(candidate) < codes(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Ticker> {
        vec![Ticker::new("BTC", "USDT", 30000.0), Ticker::new("ETH", "BTC", 0.3), Ticker::new("ETH", "USDT", 2000.0)]
    }

    fn leg_product(opportunity: &Opportunity) -> f64 {
        opportunity.cycle.iter().map(Ticker::effective_rate).product()
    }

    #[test]
    fn test_triangle_cycle() {
        let opportunity = find_best_cycle(&RateGraph::from_tickers(&triangle()), &DetectorConfig::default());

        assert!(opportunity.is_found());
        assert!(opportunity.profit > 1.0);
        assert!((opportunity.profit - 4.5).abs() < 1e-9);
        assert!((leg_product(&opportunity) - opportunity.profit).abs() < 1e-9 * opportunity.profit);

        assert_eq!(
            opportunity.cycle,
            vec![
                Ticker::new("BTC", "USDT", 30000.0),
                Ticker { reversed: true, ..Ticker::new("ETH", "USDT", 2000.0) },
                Ticker::new("ETH", "BTC", 0.3),
            ]
        );
        assert_eq!(opportunity.path(), vec!["BTC", "USDT", "ETH", "BTC"]);
    }

    #[test]
    fn test_legs_chain_together() {
        let opportunity = find_best_cycle(&RateGraph::from_tickers(&triangle()), &DetectorConfig::default());

        for (leg, next) in opportunity.cycle.iter().zip(opportunity.cycle.iter().cycle().skip(1)) {
            assert_eq!(leg.to_currency(), next.from_currency());
        }
    }

    #[test]
    fn test_consistent_prices_have_no_opportunity() {
        let tickers = vec![Ticker::new("A", "B", 4.0), Ticker::new("C", "A", 0.5), Ticker::new("C", "B", 2.0)];
        let opportunity = find_best_cycle(&RateGraph::from_tickers(&tickers), &DetectorConfig::default());

        assert!(!opportunity.is_found());
        assert_eq!(opportunity.profit, 1.0);
        assert!(opportunity.path().is_empty());
    }

    #[test]
    fn test_max_cycle_length() {
        let rate_graph = RateGraph::from_tickers(&triangle());

        let short = find_best_cycle(&rate_graph, &DetectorConfig::default().with_max_cycle_length(2));
        assert!(!short.is_found());

        let exact = find_best_cycle(&rate_graph, &DetectorConfig::default().with_max_cycle_length(3));
        assert_eq!(exact.hops(), 3);
    }

    #[test]
    fn test_breakeven_threshold() {
        let rate_graph = RateGraph::from_tickers(&triangle());

        let strict = find_best_cycle(&rate_graph, &DetectorConfig::default().with_breakeven(4.5));
        assert!(!strict.is_found());
        assert_eq!(strict.profit, 4.5);

        let loose = find_best_cycle(&rate_graph, &DetectorConfig::default().with_breakeven(4.0));
        assert!(loose.is_found());
    }

    #[test]
    fn test_nan_breakeven_finds_nothing() {
        let tickers = vec![Ticker::new("A", "B", 4.0), Ticker::new("C", "A", 0.5), Ticker::new("C", "B", 2.0)];
        let opportunity = find_best_cycle(&RateGraph::from_tickers(&tickers), &DetectorConfig::default().with_breakeven(f64::NAN));
        assert!(!opportunity.is_found());

        let opportunity = find_best_cycle(&RateGraph::from_tickers(&triangle()), &DetectorConfig::default().with_breakeven(f64::NAN));
        assert!(!opportunity.is_found());
    }

    #[test]
    fn test_tie_prefers_fewer_hops() {
        let tickers = vec![
            Ticker::new("D", "E", 2.0),
            Ticker::new("E", "F", 1.0),
            Ticker::new("F", "G", 1.0),
            Ticker::new("G", "D", 1.0),
            Ticker::new("X", "Y", 2.0),
            Ticker::new("Y", "Z", 1.0),
            Ticker::new("Z", "X", 1.0),
        ];
        let opportunity = find_best_cycle(&RateGraph::from_tickers(&tickers), &DetectorConfig::default());

        assert_eq!(opportunity.profit, 2.0);
        assert_eq!(opportunity.path(), vec!["X", "Y", "Z", "X"]);
    }

    #[test]
    fn test_tie_prefers_smaller_codes() {
        let mut tickers = vec![Ticker::new("P", "Q", 2.0), Ticker::new("Q", "R", 1.0), Ticker::new("R", "P", 1.0)];
        let other = vec![Ticker::new("B", "C", 2.0), Ticker::new("C", "A", 1.0), Ticker::new("A", "B", 1.0)];
        tickers.extend(other.clone());

        let opportunity = find_best_cycle(&RateGraph::from_tickers(&tickers), &DetectorConfig::default());
        assert_eq!(opportunity.path(), vec!["A", "B", "C", "A"]);

        // insertion order does not change the winner
        let mut reordered = other;
        reordered.extend(vec![Ticker::new("P", "Q", 2.0), Ticker::new("Q", "R", 1.0), Ticker::new("R", "P", 1.0)]);
        let again = find_best_cycle(&RateGraph::from_tickers(&reordered), &DetectorConfig::default());
        assert_eq!(again, opportunity);
    }

    #[test]
    fn test_search_step_limit() {
        let config = DetectorConfig { max_search_steps: Some(0), ..Default::default() };
        let opportunity = find_best_cycle(&RateGraph::from_tickers(&triangle()), &config);

        assert!(!opportunity.is_found());
        assert_eq!(opportunity.profit, 1.0);
    }
}
