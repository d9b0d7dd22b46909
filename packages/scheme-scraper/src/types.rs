use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deterministic identifier for a scheme document.
///
/// Derived from the source URL alone, so re-scraping the same page
/// always addresses the same store document. URL-safe base64 keeps the
/// key legal in any document store's key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemeId(pub String);

impl SchemeId {
    pub fn from_url(url: &str) -> Self {
        Self(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(url.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level loan category (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Agriculture,
    Education,
    Home,
    Personal,
    Vehicle,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Agriculture => "agriculture",
            LoanType::Education => "education",
            LoanType::Home => "home",
            LoanType::Personal => "personal",
            LoanType::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanType {
    type Err = UnknownLoanType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agriculture" => Ok(LoanType::Agriculture),
            "education" | "educational" => Ok(LoanType::Education),
            "home" => Ok(LoanType::Home),
            "personal" => Ok(LoanType::Personal),
            "vehicle" => Ok(LoanType::Vehicle),
            other => Err(UnknownLoanType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown loan type: {0}")]
pub struct UnknownLoanType(pub String);

/// Issuing-bank type resolved from the provider name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankType {
    Public,
    Private,
    Cooperative,
    Other,
}

impl BankType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankType::Public => "public",
            BankType::Private => "private",
            BankType::Cooperative => "cooperative",
            BankType::Other => "other",
        }
    }

    /// Display name for the provider field, e.g. "Public Bank".
    pub fn provider_label(&self) -> String {
        match self {
            BankType::Other => "Unknown Bank".to_string(),
            BankType::Public => "Public Bank".to_string(),
            BankType::Private => "Private Bank".to_string(),
            BankType::Cooperative => "Cooperative Bank".to_string(),
        }
    }
}

impl fmt::Display for BankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interest rate as observed on the page.
///
/// Structured when the page yielded a parseable min/max pair, otherwise
/// the raw display string (including the "Check details" fallback).
/// Untagged so stored documents keep both historical shapes readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    Structured {
        min: f64,
        max: f64,
        #[serde(rename = "type")]
        rate_type: String,
    },
    Freeform(String),
}

impl RateValue {
    /// Display form for wire payloads and UI strings.
    pub fn display(&self) -> String {
        match self {
            RateValue::Structured { min, max, .. } => format!("{}% - {}%", min, max),
            RateValue::Freeform(s) => s.clone(),
        }
    }
}

/// The unit of persisted knowledge: one loan scheme as last observed
/// at its source URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeRecord {
    pub id: SchemeId,
    pub title: String,
    pub provider: String,
    #[serde(rename = "type")]
    pub loan_type: LoanType,
    #[serde(rename = "subCategory")]
    pub sub_category: String,
    #[serde(rename = "interestRate")]
    pub interest_rate: RateValue,
    pub url: String,
    pub details: String,
    #[serde(rename = "lastScrapedAt")]
    pub last_scraped_at: DateTime<Utc>,
}

/// Wire shape of the on-demand scrape endpoint and the external
/// scrape subprocess output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireScheme {
    #[serde(rename = "Bank")]
    pub bank: String,
    #[serde(rename = "Loan Category")]
    pub loan_category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Interest Rate")]
    pub interest_rate: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Details")]
    pub details: String,
}

impl WireScheme {
    /// Convert a wire object into a canonical record. Unknown loan
    /// categories are rejected rather than silently coerced.
    pub fn into_record(self) -> Result<SchemeRecord, UnknownLoanType> {
        let loan_type = self.loan_category.parse::<LoanType>()?;
        Ok(SchemeRecord {
            id: SchemeId::from_url(&self.source),
            title: format!("{} – {}", self.bank, self.sub_category),
            provider: self.bank,
            loan_type,
            sub_category: self.sub_category.to_lowercase(),
            interest_rate: RateValue::Freeform(self.interest_rate),
            url: self.source,
            details: self.details,
            last_scraped_at: Utc::now(),
        })
    }
}

impl From<&SchemeRecord> for WireScheme {
    fn from(record: &SchemeRecord) -> Self {
        Self {
            bank: record.provider.clone(),
            loan_category: record.loan_type.to_string(),
            sub_category: record.sub_category.clone(),
            interest_rate: record.interest_rate.display(),
            source: record.url.clone(),
            details: record.details.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_id_is_stable() {
        let a = SchemeId::from_url("https://sbi.co.in/crop-loan");
        let b = SchemeId::from_url("https://sbi.co.in/crop-loan");
        assert_eq!(a, b);
    }

    #[test]
    fn scheme_id_distinct_urls_distinct_ids() {
        let a = SchemeId::from_url("https://sbi.co.in/crop-loan");
        let b = SchemeId::from_url("https://sbi.co.in/crop-loan/");
        assert_ne!(a, b);
    }

    #[test]
    fn scheme_id_is_url_safe() {
        let id = SchemeId::from_url("https://example.com/path?a=1&b=2#frag");
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn loan_type_parses_case_insensitively() {
        assert_eq!("Agriculture".parse::<LoanType>().unwrap(), LoanType::Agriculture);
        assert_eq!("EDUCATION".parse::<LoanType>().unwrap(), LoanType::Education);
        // Legacy spelling from the earliest seed data
        assert_eq!("educational".parse::<LoanType>().unwrap(), LoanType::Education);
        assert!("gold".parse::<LoanType>().is_err());
    }

    #[test]
    fn rate_value_round_trips_both_shapes() {
        let structured: RateValue =
            serde_json::from_str(r#"{"min":8.5,"max":10.5,"type":"floating"}"#).unwrap();
        assert_eq!(
            structured,
            RateValue::Structured {
                min: 8.5,
                max: 10.5,
                rate_type: "floating".to_string()
            }
        );

        let freeform: RateValue = serde_json::from_str(r#""7.5%, 9.0%""#).unwrap();
        assert_eq!(freeform, RateValue::Freeform("7.5%, 9.0%".to_string()));
    }

    #[test]
    fn wire_scheme_maps_to_record() {
        let wire = WireScheme {
            bank: "SBI".to_string(),
            loan_category: "Agriculture".to_string(),
            sub_category: "Crops".to_string(),
            interest_rate: "7.5%, 9.0%".to_string(),
            source: "https://sbi.co.in/kcc".to_string(),
            details: "Kisan Credit Card".to_string(),
        };

        let record = wire.into_record().unwrap();
        assert_eq!(record.id, SchemeId::from_url("https://sbi.co.in/kcc"));
        assert_eq!(record.loan_type, LoanType::Agriculture);
        assert_eq!(record.sub_category, "crops");
        assert_eq!(record.interest_rate, RateValue::Freeform("7.5%, 9.0%".to_string()));
    }
}
