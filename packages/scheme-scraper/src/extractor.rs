//! Best-effort fact extraction from raw page text.
//!
//! The interest-rate scan is a signal, not an authority: callers must
//! treat a freeform rate as display text only.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::RateValue;

/// Maximum number of distinct percentage tokens kept.
const MAX_RATE_MATCHES: usize = 3;

/// Maximum length of the details excerpt, before the ellipsis.
const DETAILS_CAP: usize = 200;

/// Fallback rate string when no percentage token is found on the page.
pub const RATE_FALLBACK: &str = "Check details";

/// Facts derived from one page's body text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFacts {
    pub interest_rate: RateValue,
    pub details: String,
}

fn rate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?\s?%").expect("rate pattern is valid"))
}

/// Scan text for percentage-like tokens.
///
/// Returns up to [`MAX_RATE_MATCHES`] distinct matches in order of
/// first appearance, whitespace squeezed out of each token.
fn extract_rates(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in rate_pattern().find_iter(text) {
        let token: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();
        if !seen.contains(&token) {
            seen.push(token);
            if seen.len() == MAX_RATE_MATCHES {
                break;
            }
        }
    }
    seen
}

/// Whitespace-normalize text: collapse runs of whitespace to single
/// spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive an interest-rate estimate and a bounded details excerpt from
/// raw body text.
pub fn extract_facts(body_text: &str) -> ExtractedFacts {
    let normalized = normalize_whitespace(body_text);

    let rates = extract_rates(&normalized);
    let interest_rate = if rates.is_empty() {
        RateValue::Freeform(RATE_FALLBACK.to_string())
    } else {
        RateValue::Freeform(rates.join(", "))
    };

    let details = if normalized.chars().count() > DETAILS_CAP {
        let excerpt: String = normalized.chars().take(DETAILS_CAP).collect();
        format!("{}...", excerpt)
    } else {
        format!("{}...", normalized)
    };

    ExtractedFacts {
        interest_rate,
        details,
    }
}

/// Try to lift a freeform rate list into a structured min/max pair.
///
/// Only succeeds for exactly two distinct numeric rates, the shape the
/// earliest seed data used. Anything else stays freeform.
pub fn structured_rate(rate: &RateValue) -> Option<RateValue> {
    let RateValue::Freeform(text) = rate else {
        return Some(rate.clone());
    };

    let numbers: Vec<f64> = text
        .split(',')
        .filter_map(|part| part.trim().trim_end_matches('%').parse::<f64>().ok())
        .collect();

    match numbers.as_slice() {
        [a, b] => {
            let (min, max) = if a <= b { (*a, *b) } else { (*b, *a) };
            Some(RateValue::Structured {
                min,
                max,
                rate_type: "floating".to_string(),
            })
        }
        _ => None,
    }
}
