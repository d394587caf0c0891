//! The two labeled-pattern tiers: a strict match of the exact format the
//! prompt demands, and a relaxed line-oriented variant for answers that keep
//! the labels but shuffle or drop the rationale line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{fields, text, Extractor, MAX_RECOMMENDATIONS};
use crate::domain::recommendation::{Recommendation, DEFAULT_UPSIDE_PERCENT};

// Non-greedy gaps between the labeled fields, so extra prose or a company
// line in between does not break the match.
static STRICT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)(\d+)\.\s+([A-Z.]+).*?Current Price:\s*\$(\d+\.?\d*).*?Why Warren Buffett Would Like It:\s*(.+?)\s*Potential Upside:\s*(\d+\.?\d*)%",
    )
    .expect("strict entry pattern")
});

pub(super) fn extract_strict(extractor: &Extractor, answer: &str) -> Vec<Recommendation> {
    let mut out = Vec::new();

    for caps in STRICT_ENTRY.captures_iter(answer) {
        if out.len() >= MAX_RECOMMENDATIONS {
            break;
        }

        let Some(ticker_match) = caps.get(2) else {
            continue;
        };
        let ticker = ticker_match.as_str();

        let price = match text::parse_decimal(&caps[3]) {
            Some(price) => price,
            None => {
                tracing::debug!(ticker, raw = &caps[3], "unparseable price; using table price");
                extractor.default_price(ticker)
            }
        };
        let rationale = caps[4].trim().to_string();
        let upside = text::parse_decimal(&caps[5]).unwrap_or(DEFAULT_UPSIDE_PERCENT);

        // The company line is not part of the entry pattern; look it up in a
        // bounded window around the ticker, preferring text after it so a
        // tight preceding entry cannot donate its company line.
        let span = ticker_match.range();
        let company = fields::company_from_labels(text::window(answer, span.clone(), 0, 300))
            .or_else(|| fields::company_from_labels(text::window(answer, span, 100, 0)));

        let Some(rec) = Recommendation::try_new(ticker, company, price, rationale, upside) else {
            tracing::debug!(ticker, "skipping mis-shaped ticker");
            continue;
        };
        out.push(rec);
    }

    out
}

// Relaxed variant: ticker on its own line, then any block, then the price
// line; the rationale label is optional.
static RELAXED_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)(\d+)\.\s+([A-Z.]+)\s*\n(.*?)Current Price:\s*\$(\d+\.?\d*)\s*\n(.*?)Potential Upside:\s*(\d+\.?\d*)%",
    )
    .expect("relaxed entry pattern")
});

pub(super) fn extract_relaxed(extractor: &Extractor, answer: &str) -> Vec<Recommendation> {
    let mut out = Vec::new();

    for caps in RELAXED_ENTRY.captures_iter(answer) {
        if out.len() >= MAX_RECOMMENDATIONS {
            break;
        }

        let Some(ticker_match) = caps.get(2) else {
            continue;
        };
        let ticker = ticker_match.as_str();

        // The company line may sit before or after the price line.
        let company = fields::company_from_labels(&caps[3])
            .or_else(|| fields::company_from_labels(&caps[5]));

        let price = match text::parse_decimal(&caps[4]) {
            Some(price) => price,
            None => {
                tracing::debug!(ticker, raw = &caps[4], "unparseable price; using table price");
                extractor.default_price(ticker)
            }
        };
        let rationale = fields::strip_rationale_label(&caps[5]);
        let upside = text::parse_decimal(&caps[6]).unwrap_or(DEFAULT_UPSIDE_PERCENT);

        let Some(rec) = Recommendation::try_new(ticker, company, price, rationale, upside) else {
            tracing::debug!(ticker, "skipping mis-shaped ticker");
            continue;
        };
        out.push(rec);
    }

    out
}
