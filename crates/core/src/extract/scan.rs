//! Last-resort tier: no recognizable structure survived, so scan for bare
//! ticker-shaped tokens and reconstruct records from the text around them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{text, Extractor, MAX_RECOMMENDATIONS};
use crate::domain::recommendation::{Recommendation, DEFAULT_UPSIDE_PERCENT};

static TICKER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{1,5})\b").expect("ticker token pattern"));

static DOLLAR_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*(\d+\.?\d*)").expect("dollar amount pattern"));

// Common all-caps words that are not tickers.
const TICKER_STOPLIST: &[&str] = &["I", "A", "CEO", "CFO", "AI", "PE"];

/// Bytes of context kept on each side of a candidate token.
const SNIPPET_RADIUS: usize = 100;

pub(super) fn extract(extractor: &Extractor, answer: &str) -> Vec<Recommendation> {
    let mut out = Vec::new();

    for caps in TICKER_TOKEN.captures_iter(answer) {
        if out.len() >= MAX_RECOMMENDATIONS {
            break;
        }

        let Some(ticker_match) = caps.get(1) else {
            continue;
        };
        let ticker = ticker_match.as_str();
        if TICKER_STOPLIST.contains(&ticker) {
            continue;
        }

        let snippet = text::window(answer, ticker_match.range(), SNIPPET_RADIUS, SNIPPET_RADIUS);

        let company = company_after_ticker(snippet, ticker);
        let price = match DOLLAR_AMOUNT
            .captures(snippet)
            .and_then(|c| text::parse_decimal(&c[1]))
        {
            Some(price) => price,
            None => extractor.default_price(ticker),
        };
        let rationale = text::flatten(snippet);

        let Some(rec) =
            Recommendation::try_new(ticker, company, price, rationale, DEFAULT_UPSIDE_PERCENT)
        else {
            continue;
        };
        out.push(rec);
    }

    out
}

/// "TICKER - Some Company Words" style recovery. The capture stops at digits
/// and dollar signs, so a following price figure ends the name.
fn company_after_ticker(snippet: &str, ticker: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r"{}\s*[-:)]?\s*([A-Za-z][A-Za-z\s.,]*)",
        regex::escape(ticker)
    ))
    .ok()?;
    let caps = re.captures(snippet)?;
    let name = caps[1].trim().to_string();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_recovery_stops_at_dollar_figure() {
        let name = company_after_ticker("AAPL - Apple Inc. $187.65 and more", "AAPL");
        assert_eq!(name, Some("Apple Inc.".to_string()));
    }

    #[test]
    fn company_recovery_handles_missing_separator() {
        assert_eq!(company_after_ticker("$12 only numbers 34", "KO"), None);
    }
}
