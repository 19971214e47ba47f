use super::ticker::Ticker;
use ahash::RandomState;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::warn;

pub type FastHasher = RandomState;
/// FastHashMap using ahash
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;

/// One directed conversion between two currencies.
#[derive(Clone, Debug, PartialEq)]
pub struct RateEdge {
    /// The caller's ticker this edge came from, never inverted.
    pub ticker: Ticker,
    /// Set on the synthetic quote -> base edge.
    pub reversed: bool,
}

impl RateEdge {
    /// Rate as traversed along the edge.
    pub fn rate(&self) -> f64 {
        if self.reversed { 1.0 / self.ticker.last_price } else { self.ticker.last_price }
    }

    /// Convert `amount` along the edge. Reversed legs divide so that a leg and
    /// its own reverse cancel exactly.
    pub fn apply(&self, amount: f64) -> f64 {
        if self.reversed { amount / self.ticker.last_price } else { amount * self.ticker.last_price }
    }

    /// The leg as reported to callers: original symbol and price, flagged when traversed backwards.
    pub fn leg(&self) -> Ticker {
        Ticker { reversed: self.reversed, ..self.ticker.clone() }
    }
}

/// Directed graph over currency codes. Every caller ticker contributes a
/// forward `base -> quote` edge and a synthetic `quote -> base` edge.
#[derive(Debug, Clone, Default)]
pub struct RateGraph {
    // nodes are never removed, plain DiGraph indices stay valid
    pub graph: DiGraph<String, RateEdge, usize>,
    // currency code -> node index
    pub currency_index: FastHashMap<String, NodeIndex<usize>>,
}

impl RateGraph {
    pub fn new() -> Self {
        Self { graph: DiGraph::default(), currency_index: FastHashMap::default() }
    }

    /// Build from a ticker list, skipping tickers that cannot form a rate.
    pub fn from_tickers(tickers: &[Ticker]) -> Self {
        let mut rate_graph = Self::new();
        for ticker in tickers {
            rate_graph.add_ticker(ticker);
        }
        rate_graph
    }

    pub fn add_or_get_currency_idx(&mut self, code: &str) -> NodeIndex<usize> {
        if let Some(&idx) = self.currency_index.get(code) {
            return idx;
        }
        let idx = self.graph.add_node(code.to_string());
        self.currency_index.insert(code.to_string(), idx);
        idx
    }

    /// Add both directions of `ticker`. A later ticker on the same directed
    /// edge replaces the earlier one. Returns false if the ticker was skipped.
    pub fn add_ticker(&mut self, ticker: &Ticker) -> bool {
        if !ticker.is_valid() {
            warn!("Skipping ticker with unusable rate: {}", ticker);
            return false;
        }
        let original = Ticker { reversed: false, ..ticker.clone() };

        let base = self.add_or_get_currency_idx(&ticker.symbol.base);
        let quote = self.add_or_get_currency_idx(&ticker.symbol.quote);
        self.graph.update_edge(base, quote, RateEdge { ticker: original.clone(), reversed: false });
        self.graph.update_edge(quote, base, RateEdge { ticker: original, reversed: true });
        true
    }

    pub fn currency(&self, idx: NodeIndex<usize>) -> &str {
        self.graph.node_weight(idx).map(String::as_str).unwrap_or_default()
    }

    pub fn edge(&self, from: NodeIndex<usize>, to: NodeIndex<usize>) -> Option<&RateEdge> {
        self.graph.find_edge(from, to).and_then(|edge| self.graph.edge_weight(edge))
    }

    pub fn currency_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
