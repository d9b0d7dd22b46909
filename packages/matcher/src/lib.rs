//! Client-side scheme matching.
//!
//! Assembles the candidate list (live scrape results when present,
//! otherwise a locally filtered store read), hands it to the external
//! reasoning call for ranking, and always surfaces something readable:
//! ranked matches, a "no schemes" summary, or a safe default when the
//! reasoning call misbehaves.

pub mod reasoner;

pub use reasoner::{extract_json_object, HttpReasoner, Reasoner};

use serde::{Deserialize, Serialize};

use scheme_scraper::store::SchemeStore;
use scheme_scraper::types::SchemeRecord;

/// Summary shown when there is nothing to rank. The reasoning call is
/// skipped entirely in that case.
pub const NO_SCHEMES_SUMMARY: &str = "No schemes found matching your criteria.";

/// Summary substituted when the reasoning call fails or returns
/// something unparseable.
pub const REASONING_FAILED_SUMMARY: &str = "Could not analyze schemes at this time.";

/// One ranked scheme as returned by the reasoning call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedScheme {
    pub scheme_id: String,
    pub title: String,
    pub reason: String,
    #[serde(default)]
    pub match_score: f64,
}

/// The matcher's output: ranked matches plus a human-readable summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    #[serde(default)]
    pub matches: Vec<RankedScheme>,
    pub summary: String,
}

impl MatchOutcome {
    fn empty(summary: &str) -> Self {
        Self {
            matches: Vec::new(),
            summary: summary.to_string(),
        }
    }
}

/// Local substring filter over a full store read: category against the
/// loan type and taxonomy fields, free text against title, sub-category
/// and details. Both case-insensitive; both optional.
pub fn filter_stored(
    records: Vec<SchemeRecord>,
    category: Option<&str>,
    query: Option<&str>,
) -> Vec<SchemeRecord> {
    let category = category.map(str::to_lowercase).filter(|c| !c.is_empty());
    let query = query.map(str::to_lowercase).filter(|q| !q.is_empty());

    records
        .into_iter()
        .filter(|record| {
            let matches_category = category.as_deref().map_or(true, |c| {
                record.loan_type.as_str().contains(c)
                    || record.title.to_lowercase().contains(c)
                    || record.sub_category.to_lowercase().contains(c)
            });

            let matches_query = query.as_deref().map_or(true, |q| {
                record.title.to_lowercase().contains(q)
                    || record.sub_category.to_lowercase().contains(q)
                    || record.details.to_lowercase().contains(q)
            });

            matches_category && matches_query
        })
        .collect()
}

/// Assemble the candidate set: live results win when non-empty,
/// otherwise fall back to a filtered full read of the store snapshot.
pub async fn assemble_candidates(
    live: Vec<SchemeRecord>,
    store: &dyn SchemeStore,
    category: Option<&str>,
    query: Option<&str>,
) -> anyhow::Result<Vec<SchemeRecord>> {
    if !live.is_empty() {
        tracing::debug!(count = live.len(), "Using live scrape results as candidates");
        return Ok(live);
    }

    let stored = store.list_all().await?;
    let filtered = filter_stored(stored, category, query);
    tracing::debug!(count = filtered.len(), "Using filtered store snapshot as candidates");
    Ok(filtered)
}

fn build_prompt(
    profile: &serde_json::Value,
    candidates: &[SchemeRecord],
    language: &str,
) -> String {
    format!(
        r#"You are an expert financial advisor. Analyze the user profile and the available loan schemes to find the best matches.

User Profile:
{profile}

Available Schemes:
{schemes}

Task:
1. Filter schemes that match the user's needs.
2. Rank them by relevance (interest rate, eligibility).
3. Select the top 3 matches.
4. Explain WHY each scheme is a good fit in simple language (translated to {language}).

Output JSON format:
{{
    "matches": [
        {{
            "scheme_id": "id_from_scheme_object",
            "title": "Scheme Title",
            "reason": "Explanation in {language}",
            "match_score": 0.95
        }}
    ],
    "summary": "Overall recommendation summary in {language}"
}}"#,
        profile = profile,
        schemes = serde_json::to_string(candidates).unwrap_or_else(|_| "[]".to_string()),
        language = language,
    )
}

/// Rank candidates for a user via the reasoning call.
///
/// Empty candidates short-circuit to the static summary without
/// invoking the reasoner. A failed or malformed reasoning response is
/// replaced by a safe default outcome, never propagated.
pub async fn match_schemes(
    reasoner: &dyn Reasoner,
    profile: &serde_json::Value,
    candidates: &[SchemeRecord],
    language: &str,
) -> MatchOutcome {
    if candidates.is_empty() {
        return MatchOutcome::empty(NO_SCHEMES_SUMMARY);
    }

    let prompt = build_prompt(profile, candidates, language);

    let response = match reasoner.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Reasoning call failed");
            return MatchOutcome::empty(REASONING_FAILED_SUMMARY);
        }
    };

    let Some(json) = extract_json_object(&response) else {
        tracing::warn!("Reasoning response contained no JSON object");
        return MatchOutcome::empty(REASONING_FAILED_SUMMARY);
    };

    match serde_json::from_str::<MatchOutcome>(json) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "Reasoning response JSON did not match expected shape");
            MatchOutcome::empty(REASONING_FAILED_SUMMARY)
        }
    }
}
