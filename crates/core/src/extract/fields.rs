//! Labeled-field finders shared by the cascade tiers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::text;

// Label spellings tried in order. Models wrap labels in markdown emphasis
// often enough that the bold variant earns its place.
static COMPANY_LABELS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"Company:\s*([^\n]+)").expect("company label"),
        Regex::new(r"\*\*Company\*\*:\s*([^*\n]+)").expect("bold company label"),
        Regex::new(r"Company Name:\s*([^\n]+)").expect("company name label"),
    ]
});

pub(super) fn company_from_labels(area: &str) -> Option<String> {
    for re in COMPANY_LABELS.iter() {
        if let Some(caps) = re.captures(area) {
            let name = caps[1].trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

static PRICE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Current Price:\s*\$?(\d+\.?\d*)").expect("price label"));

// Looser phrasings, tried only when the exact label yields nothing.
static PRICE_ALTERNATIVES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\$\s*(\d+\.?\d*)").expect("dollar amount"),
        Regex::new(r"Price:\s*\$?(\d+\.?\d*)").expect("price prefix"),
        Regex::new(r"price of \$?(\d+\.?\d*)").expect("price of"),
        Regex::new(r"trading at \$?(\d+\.?\d*)").expect("trading at"),
        Regex::new(r"around \$?(\d+\.?\d*)").expect("around"),
    ]
});

/// Price for one entry; `None` when no phrasing yields a parseable number.
pub(super) fn price_from(area: &str, ticker: &str) -> Option<f64> {
    if let Some(caps) = PRICE_LABEL.captures(area) {
        match text::parse_decimal(&caps[1]) {
            Some(price) => return Some(price),
            None => tracing::debug!(ticker, raw = &caps[1], "unparseable labeled price"),
        }
    }

    for re in PRICE_ALTERNATIVES.iter() {
        if let Some(caps) = re.captures(area) {
            if let Some(price) = text::parse_decimal(&caps[1]) {
                return Some(price);
            }
        }
    }

    None
}

static RATIONALE_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Why Warren Buffett Would Like It:\s*(.+?)\s*Potential Upside:")
        .expect("rationale span")
});

pub(super) fn rationale_from(area: &str) -> Option<String> {
    RATIONALE_SPAN
        .captures(area)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

static RATIONALE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Why Warren Buffett Would Like It:\s*").expect("rationale label"));

/// Drops a leading rationale label (and anything before it) from a free-text
/// block, leaving the reason itself.
pub(super) fn strip_rationale_label(block: &str) -> String {
    match RATIONALE_LABEL.find(block) {
        Some(m) => block[m.end()..].trim().to_string(),
        None => block.trim().to_string(),
    }
}

static UPSIDE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Potential Upside:\s*(\d+\.?\d*)%").expect("upside label"));

pub(super) fn upside_from(area: &str, ticker: &str) -> Option<f64> {
    let caps = UPSIDE_LABEL.captures(area)?;
    let parsed = text::parse_decimal(&caps[1]);
    if parsed.is_none() {
        tracing::debug!(ticker, raw = &caps[1], "unparseable upside");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_label_variants() {
        assert_eq!(
            company_from_labels("Company: Apple Inc.\n"),
            Some("Apple Inc.".to_string())
        );
        assert_eq!(
            company_from_labels("**Company**: Coca-Cola\n"),
            Some("Coca-Cola".to_string())
        );
        assert_eq!(company_from_labels("no label here"), None);
    }

    #[test]
    fn price_prefers_exact_label() {
        let area = "trading at $50 right now\nCurrent Price: $187.65\n";
        assert_eq!(price_from(area, "AAPL"), Some(187.65));
    }

    #[test]
    fn price_falls_through_phrasings() {
        assert_eq!(price_from("currently trading at $59.20", "KO"), Some(59.20));
        assert_eq!(price_from("a price of 266.25 per share", "V"), Some(266.25));
        assert_eq!(price_from("no figures at all", "V"), None);
    }

    #[test]
    fn rationale_span_stops_at_upside() {
        let area = "Why Warren Buffett Would Like It: strong moat\nPotential Upside: 12%";
        assert_eq!(rationale_from(area), Some("strong moat".to_string()));
    }

    #[test]
    fn strip_rationale_label_keeps_reason_only() {
        let block = "Company: Apple Inc.\nWhy Warren Buffett Would Like It: durable brand\n";
        assert_eq!(strip_rationale_label(block), "durable brand");
        assert_eq!(strip_rationale_label("  plain text "), "plain text");
    }

    #[test]
    fn upside_requires_percent_sign() {
        assert_eq!(upside_from("Potential Upside: 12.5%", "KO"), Some(12.5));
        assert_eq!(upside_from("Potential Upside: twelve", "KO"), None);
    }
}
