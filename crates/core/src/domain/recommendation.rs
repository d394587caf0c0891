use serde::{Deserialize, Serialize};

/// Upside applied when no "Potential Upside" figure can be recovered.
pub const DEFAULT_UPSIDE_PERCENT: f64 = 10.0;

// Class-share symbols like BRK.B fit in six characters; anything longer is a
// mis-parse, not a ticker.
pub const MAX_TICKER_LEN: usize = 6;

/// One Buffett-style stock pick recovered from a model answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub ticker: String,
    pub company_name: String,
    pub price: f64,
    pub rationale: String,
    pub upside_percent: f64,
}

impl Recommendation {
    /// Builds a record from extracted fields. The ticker is the only field
    /// without a fallback: an empty or mis-shaped candidate yields `None`, so
    /// a half-parsed entry never leaves the extractor. A missing company name
    /// defaults to the ticker.
    pub fn try_new(
        ticker: &str,
        company_name: Option<String>,
        price: f64,
        rationale: String,
        upside_percent: f64,
    ) -> Option<Self> {
        let ticker = ticker.trim();
        if !is_ticker_shaped(ticker) {
            return None;
        }

        let company_name = company_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ticker.to_string());

        Some(Self {
            ticker: ticker.to_string(),
            company_name,
            price: price.max(0.0),
            rationale: rationale.trim().to_string(),
            upside_percent,
        })
    }
}

/// Uppercase letters plus a literal period, 1..=MAX_TICKER_LEN chars, at
/// least one letter.
pub fn is_ticker_shaped(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_TICKER_LEN
        && s.chars().all(|c| c.is_ascii_uppercase() || c == '.')
        && s.chars().any(|c| c.is_ascii_uppercase())
}
