//! Segment tier: partition the answer at numbered-entry boundaries and fish
//! each field out of its segment independently, so one malformed field never
//! costs the whole entry.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{fields, text, Extractor, MAX_RECOMMENDATIONS};
use crate::domain::recommendation::{Recommendation, DEFAULT_UPSIDE_PERCENT};

static ENTRY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\.\s+([A-Z.]+)").expect("entry header pattern"));

pub(super) fn extract(extractor: &Extractor, answer: &str) -> Vec<Recommendation> {
    let headers: Vec<_> = ENTRY_HEADER.captures_iter(answer).collect();
    let mut out = Vec::new();

    for (i, caps) in headers.iter().enumerate() {
        if out.len() >= MAX_RECOMMENDATIONS {
            break;
        }

        let (Some(entry), Some(ticker_match)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let ticker = ticker_match.as_str().trim();

        // 1..=5 chars here; longer runs are headings or shouting, not
        // tickers. Skipping a candidate never aborts the scan.
        if !(1..=5).contains(&ticker.chars().count()) {
            tracing::debug!(ticker, "skipping candidate with out-of-range ticker length");
            continue;
        }

        // A segment runs to the next numbered entry, or end of text.
        let seg_end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(answer.len());
        let segment = &answer[entry.start()..seg_end];

        let span = ticker_match.range();
        let company = fields::company_from_labels(segment).or_else(|| {
            fields::company_from_labels(text::window(answer, span.clone(), 0, 200))
                .or_else(|| fields::company_from_labels(text::window(answer, span, 50, 0)))
        });

        let price = match fields::price_from(segment, ticker) {
            Some(price) => price,
            None => {
                tracing::debug!(ticker, "no parseable price in segment; using table price");
                extractor.default_price(ticker)
            }
        };

        let rationale = fields::rationale_from(segment).unwrap_or_else(|| text::flatten(segment));
        let upside = fields::upside_from(segment, ticker).unwrap_or(DEFAULT_UPSIDE_PERCENT);

        let Some(rec) = Recommendation::try_new(ticker, company, price, rationale, upside) else {
            tracing::debug!(ticker, "skipping mis-shaped ticker");
            continue;
        };
        out.push(rec);
    }

    out
}
