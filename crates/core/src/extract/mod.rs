//! Turns one free-form model answer into structured recommendations.
//!
//! Parsing is an ordered cascade of strategies of increasing tolerance. Each
//! strategy returns the records it found (possibly none); the next one runs
//! only when every earlier one came back empty. "No match" is an empty vec,
//! never an error.

mod fields;
mod labeled;
mod scan;
mod segment;
mod text;

use crate::domain::recommendation::Recommendation;
use crate::pricing::PriceTable;

/// Hard cap on records per answer; mirrors the "top 10" prompt.
pub const MAX_RECOMMENDATIONS: usize = 10;

type Tier = fn(&Extractor, &str) -> Vec<Recommendation>;

// Most strict first.
const TIERS: &[(&str, Tier)] = &[
    ("strict_labeled", labeled::extract_strict),
    ("relaxed_labeled", labeled::extract_relaxed),
    ("segments", segment::extract),
    ("ticker_scan", scan::extract),
];

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    prices: PriceTable,
}

impl Extractor {
    pub fn new(prices: PriceTable) -> Self {
        Self { prices }
    }

    /// Extracts recommendations in source-text order. Pure and infallible;
    /// repeated tickers are kept as-is.
    pub fn extract(&self, answer: &str) -> Vec<Recommendation> {
        for (tier, run) in TIERS {
            let found = run(self, answer);
            if !found.is_empty() {
                tracing::debug!(tier, count = found.len(), "extracted recommendations");
                return found;
            }
        }

        tracing::debug!("no parsing strategy matched");
        Vec::new()
    }

    pub(crate) fn default_price(&self, ticker: &str) -> f64 {
        self.prices.lookup(ticker)
    }
}
