//! Composes extractor and classifier outputs into a canonical
//! [`SchemeRecord`].

use chrono::Utc;

use crate::classifier::{classify_bank_type, classify_sub_category};
use crate::extractor::{structured_rate, ExtractedFacts};
use crate::taxonomy::Taxonomy;
use crate::types::{BankType, LoanType, SchemeId, SchemeRecord};

/// Build the canonical record for one scraped page.
///
/// The id is a pure function of the URL, so rebuilding for the same
/// page always targets the same store document. `last_scraped_at` is
/// stamped here, at build time, not at write time.
pub fn build_record(
    url: &str,
    loan_type: LoanType,
    page_title: Option<&str>,
    facts: ExtractedFacts,
    bank_type: BankType,
    sub_category: String,
) -> SchemeRecord {
    let provider = bank_type.provider_label();

    let title_suffix = page_title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| sub_category.clone());

    let interest_rate = structured_rate(&facts.interest_rate).unwrap_or(facts.interest_rate);

    SchemeRecord {
        id: SchemeId::from_url(url),
        title: format!("{} – {}", provider, title_suffix),
        provider,
        loan_type,
        sub_category,
        interest_rate,
        url: url.to_string(),
        details: facts.details,
        last_scraped_at: Utc::now(),
    }
}

/// Classify and build in one step, the shape the ingestion loop uses.
pub fn classify_and_build(
    taxonomy: &Taxonomy,
    url: &str,
    loan_type: LoanType,
    page_title: Option<&str>,
    body_text: &str,
    facts: ExtractedFacts,
) -> SchemeRecord {
    // Classify over page text plus URL: scheme keywords often live in
    // the path when the page body is thin.
    let classification_text = format!("{} {}", body_text, url);
    let sub_category = classify_sub_category(taxonomy, &classification_text, loan_type);

    let provider_hint = page_title.unwrap_or("");
    let bank_type = classify_bank_type(taxonomy, &format!("{} {}", provider_hint, body_text));

    build_record(url, loan_type, page_title, facts, bank_type, sub_category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_facts;
    use crate::types::RateValue;

    #[test]
    fn record_id_is_deterministic_for_url() {
        let facts = extract_facts("rate 8.0%");
        let a = build_record(
            "https://sbi.co.in/kcc",
            LoanType::Agriculture,
            Some("KCC"),
            facts.clone(),
            BankType::Public,
            "crops".to_string(),
        );
        let b = build_record(
            "https://sbi.co.in/kcc",
            LoanType::Agriculture,
            Some("KCC"),
            facts,
            BankType::Public,
            "crops".to_string(),
        );
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn provider_label_from_bank_type() {
        let facts = extract_facts("");
        let public = build_record(
            "https://sbi.co.in/x",
            LoanType::Home,
            None,
            facts.clone(),
            BankType::Public,
            "general".to_string(),
        );
        assert_eq!(public.provider, "Public Bank");

        let unknown = build_record(
            "https://example.com/x",
            LoanType::Home,
            None,
            facts,
            BankType::Other,
            "general".to_string(),
        );
        assert_eq!(unknown.provider, "Unknown Bank");
        assert_eq!(unknown.title, "Unknown Bank – general");
    }

    #[test]
    fn title_prefers_page_title_over_sub_category() {
        let facts = extract_facts("");
        let record = build_record(
            "https://sbi.co.in/kcc",
            LoanType::Agriculture,
            Some("Kisan Credit Card"),
            facts,
            BankType::Public,
            "crops".to_string(),
        );
        assert_eq!(record.title, "Public Bank – Kisan Credit Card");
    }

    #[test]
    fn two_rate_pages_get_structured_rates() {
        let facts = extract_facts("floating from 7.5% to 9.0%");
        let record = build_record(
            "https://sbi.co.in/kcc",
            LoanType::Agriculture,
            None,
            facts,
            BankType::Public,
            "crops".to_string(),
        );
        assert_eq!(
            record.interest_rate,
            RateValue::Structured {
                min: 7.5,
                max: 9.0,
                rate_type: "floating".to_string()
            }
        );
    }

    #[test]
    fn classify_and_build_kisan_scenario() {
        let taxonomy = Taxonomy::default();
        let body = "SBI Kisan Credit Card interest rate 7.5% to 9.0%";
        let facts = extract_facts(body);
        let record = classify_and_build(
            &taxonomy,
            "https://sbi.co.in/kcc",
            LoanType::Agriculture,
            Some("SBI Agri"),
            body,
            facts,
        );
        assert_eq!(record.sub_category, "crops");
        assert_eq!(record.provider, "Public Bank");
    }
}
