use std::collections::HashMap;

/// Price used when a ticker is absent from the table.
pub const FALLBACK_PRICE: f64 = 100.0;

/// Approximate last-known prices for tickers the model recommends most often.
/// This is a best-effort lookup for answers that carry no usable dollar
/// figure, not a market-data feed. Injected into the extractor so the
/// snapshot can be replaced without touching parsing code.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: HashMap<String, f64>,
    fallback: f64,
}

impl PriceTable {
    pub fn new(prices: HashMap<String, f64>, fallback: f64) -> Self {
        Self { prices, fallback }
    }

    /// Never fails; unknown tickers get the generic fallback.
    pub fn lookup(&self, ticker: &str) -> f64 {
        self.prices.get(ticker).copied().unwrap_or(self.fallback)
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        let snapshot: &[(&str, f64)] = &[
            ("AAPL", 187.65),
            ("KO", 59.20),
            ("V", 266.25),
            ("MA", 405.90),
            ("JNJ", 157.40),
            ("PG", 160.55),
            ("MCO", 391.80),
            ("BKNG", 3580.40),
            ("BRK.B", 350.25),
            ("MCD", 300.50),
            ("UNH", 560.45),
            ("DIS", 95.75),
            ("MSFT", 330.0),
            ("AMZN", 140.0),
            ("GOOGL", 140.0),
            ("META", 300.0),
            ("TSLA", 250.0),
            ("BRK.A", 500000.0),
            ("HD", 330.0),
            ("BAC", 30.0),
            ("XOM", 110.0),
            ("NVDA", 400.0),
            ("PFE", 30.0),
            ("CSCO", 50.0),
            ("WMT", 60.0),
            ("MRK", 120.0),
            ("CVX", 160.0),
            ("COST", 500.0),
        ];

        Self {
            prices: snapshot.iter().map(|(t, p)| (t.to_string(), *p)).collect(),
            fallback: FALLBACK_PRICE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tickers_use_snapshot_prices() {
        let table = PriceTable::default();
        assert_eq!(table.lookup("AAPL"), 187.65);
        assert_eq!(table.lookup("BRK.B"), 350.25);
    }

    #[test]
    fn unknown_tickers_use_fallback() {
        let table = PriceTable::default();
        assert_eq!(table.lookup("ZZZZ"), FALLBACK_PRICE);
    }

    #[test]
    fn injected_table_overrides_snapshot() {
        let mut prices = HashMap::new();
        prices.insert("AAPL".to_string(), 200.0);
        let table = PriceTable::new(prices, 1.0);
        assert_eq!(table.lookup("AAPL"), 200.0);
        assert_eq!(table.lookup("KO"), 1.0);
    }
}
