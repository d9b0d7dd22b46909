//! Target URL list parsing.
//!
//! Format, line by line:
//!   `agriculture:`            sets the current category
//!   `home,https://...`        explicit category and URL
//!   `https://...`             URL under the current category
//! Blank lines are skipped; lines with categories outside the closed
//! loan-type set are skipped with a warning.

use std::collections::HashSet;
use std::path::Path;

use crate::types::LoanType;

/// One URL to scrape, with the loan category it was listed under.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeTarget {
    pub loan_type: LoanType,
    pub url: String,
}

/// Parse target list text. `filter` limits output to the given
/// categories when non-empty (used by the on-demand path to scope a
/// scrape to the query's category words).
pub fn parse_targets(text: &str, filter: &HashSet<LoanType>) -> Vec<ScrapeTarget> {
    let mut targets = Vec::new();
    let mut current: Option<LoanType> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_suffix(':') {
            match header.parse::<LoanType>() {
                Ok(loan_type) => current = Some(loan_type),
                Err(_) => {
                    tracing::warn!(header = %header, "Skipping unknown category header");
                    current = None;
                }
            }
            continue;
        }

        let target = if let Some((category, url)) = line.split_once(',') {
            match category.parse::<LoanType>() {
                Ok(loan_type) => Some(ScrapeTarget {
                    loan_type,
                    url: url.trim().to_string(),
                }),
                Err(_) => {
                    tracing::warn!(line = %line, "Skipping line with unknown category");
                    None
                }
            }
        } else if line.starts_with("http") {
            current.map(|loan_type| ScrapeTarget {
                loan_type,
                url: line.to_string(),
            })
        } else {
            None
        };

        if let Some(target) = target {
            if filter.is_empty() || filter.contains(&target.loan_type) {
                targets.push(target);
            }
        }
    }

    targets
}

/// Read and parse a targets file. A missing file is an empty list, not
/// an error; the batch simply has nothing to do.
pub fn read_targets_file(
    path: &Path,
    filter: &HashSet<LoanType>,
) -> std::io::Result<Vec<ScrapeTarget>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Targets file not found");
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_targets(&text, filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_filter() -> HashSet<LoanType> {
        HashSet::new()
    }

    #[test]
    fn header_lines_set_current_category() {
        let text = "agriculture:\nhttps://sbi.co.in/kcc\nhome:\nhttps://hdfc.com/home-loan\n";
        let targets = parse_targets(text, &no_filter());
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].loan_type, LoanType::Agriculture);
        assert_eq!(targets[1].loan_type, LoanType::Home);
        assert_eq!(targets[1].url, "https://hdfc.com/home-loan");
    }

    #[test]
    fn inline_category_overrides_header() {
        let text = "agriculture:\neducation,https://vidyalakshmi.co.in/\n";
        let targets = parse_targets(text, &no_filter());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].loan_type, LoanType::Education);
    }

    #[test]
    fn urls_before_any_header_are_skipped() {
        let targets = parse_targets("https://orphan.example/\n", &no_filter());
        assert!(targets.is_empty());
    }

    #[test]
    fn unknown_categories_are_skipped() {
        let text = "gold:\nhttps://skipped.example/\ngold,https://also-skipped.example/\n";
        assert!(parse_targets(text, &no_filter()).is_empty());
    }

    #[test]
    fn filter_scopes_to_requested_categories() {
        let text = "agriculture:\nhttps://a.example/\nhome:\nhttps://h.example/\n";
        let filter: HashSet<LoanType> = [LoanType::Home].into_iter().collect();
        let targets = parse_targets(text, &filter);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].loan_type, LoanType::Home);
    }
}
