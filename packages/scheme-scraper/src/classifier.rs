//! Keyword classifiers for issuing-bank type and loan sub-category.
//!
//! Both functions are pure and total. Substring matching with
//! first-match-wins keeps them deterministic and cheap at the cost of
//! false positives on short keywords; that tradeoff is intentional for
//! a bootstrap classifier and callers should not depend on more than
//! "a member of the taxonomy or general".

use crate::taxonomy::{Taxonomy, GENERAL_SUB_CATEGORY};
use crate::types::{BankType, LoanType};

/// Resolve the issuing-bank group from a provider name.
///
/// Groups are checked in taxonomy order (public, private, cooperative);
/// the first group with any alias appearing case-insensitively in the
/// name wins. No match resolves to [`BankType::Other`].
pub fn classify_bank_type(taxonomy: &Taxonomy, provider_name: &str) -> BankType {
    let name = provider_name.to_lowercase();
    for group in &taxonomy.bank_groups {
        if group
            .aliases
            .iter()
            .any(|alias| name.contains(&alias.to_lowercase()))
        {
            return group.bank_type;
        }
    }
    BankType::Other
}

/// Resolve the sub-category for `loan_type` from free text.
///
/// Always returns a non-empty name: a member of the category's table,
/// or `"general"` when nothing matches or the loan type has no table.
pub fn classify_sub_category(taxonomy: &Taxonomy, text: &str, loan_type: LoanType) -> String {
    let text = text.to_lowercase();
    let Some(table) = taxonomy.category(loan_type) else {
        return GENERAL_SUB_CATEGORY.to_string();
    };

    for sub in &table.sub_categories {
        if sub.keywords.iter().any(|k| text.contains(k.as_str())) {
            return sub.name.clone();
        }
    }
    GENERAL_SUB_CATEGORY.to_string()
}
