use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ordered currency pair. `BTC/USDT` quotes BTC in USDT.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    pub base: String,
    pub quote: String,
}

impl Symbol {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self { base: base.into(), quote: quote.into() }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/').map(|(base, quote)| (base.trim(), quote.trim())) {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Ok(Symbol::new(base, quote)),
            _ => Err(format!("invalid symbol `{s}`, expected BASE/QUOTE")),
        }
    }
}

/// A quoted rate: one `base` buys `last_price` of `quote`.
///
/// `reversed` is never set on caller input. The detector sets it on cycle
/// legs that are traversed from quote to base.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(flatten)]
    pub symbol: Symbol,
    pub last_price: f64,
    #[serde(default)]
    pub reversed: bool,
}

impl Ticker {
    pub fn new(base: impl Into<String>, quote: impl Into<String>, last_price: f64) -> Self {
        Self { symbol: Symbol::new(base, quote), last_price, reversed: false }
    }

    /// Rate as traversed: `last_price` forward, its reciprocal when reversed.
    pub fn effective_rate(&self) -> f64 {
        if self.reversed { 1.0 / self.last_price } else { self.last_price }
    }

    /// Currency this leg is entered from.
    pub fn from_currency(&self) -> &str {
        if self.reversed { &self.symbol.quote } else { &self.symbol.base }
    }

    /// Currency this leg ends in.
    pub fn to_currency(&self) -> &str {
        if self.reversed { &self.symbol.base } else { &self.symbol.quote }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.last_price.is_finite() && self.last_price > 0.0 && self.symbol.base != self.symbol.quote
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.symbol, self.last_price)?;
        if self.reversed {
            write!(f, " (Reversed)")?;
        }
        Ok(())
    }
}
