use serde::{Deserialize, Serialize};

use crate::types::{BankType, LoanType};

/// Sub-category name reported when no keyword matches, and for loan
/// types with no table entry.
pub const GENERAL_SUB_CATEGORY: &str = "general";

/// One sub-category bucket: a name plus the keywords that select it.
///
/// Declaration order matters: the first bucket with a matching keyword
/// wins, so more specific buckets should come first in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Keyword table for one top-level loan category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTable {
    pub loan_type: LoanType,
    pub sub_categories: Vec<SubCategory>,
}

/// Alias list for one issuing-bank group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankGroup {
    pub bank_type: BankType,
    pub aliases: Vec<String>,
}

/// The full classification taxonomy, loaded as data so new categories
/// and keywords can be added without touching classifier code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Checked in order; earlier groups win ties.
    pub bank_groups: Vec<BankGroup>,
    pub categories: Vec<CategoryTable>,
}

impl Taxonomy {
    /// Parse a taxonomy from JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn category(&self, loan_type: LoanType) -> Option<&CategoryTable> {
        self.categories.iter().find(|c| c.loan_type == loan_type)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        fn subcat(name: &str, keywords: &[&str]) -> SubCategory {
            SubCategory {
                name: name.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            }
        }

        fn group(bank_type: BankType, aliases: &[&str]) -> BankGroup {
            BankGroup {
                bank_type,
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            }
        }

        Self {
            // Priority order is fixed: public before private before
            // cooperative. Ties between groups resolve to the earlier
            // group, not the more specific alias.
            bank_groups: vec![
                group(
                    BankType::Public,
                    &[
                        "State Bank of India",
                        "SBI",
                        "Punjab National Bank",
                        "PNB",
                        "Bank of Baroda",
                        "BoB",
                        "Canara",
                        "Union Bank",
                        "Bank of India",
                    ],
                ),
                group(BankType::Private, &["HDFC", "ICICI", "Axis", "Kotak", "IDFC"]),
                group(
                    BankType::Cooperative,
                    &["Maharashtra State Cooperative", "Saraswat"],
                ),
            ],
            categories: vec![
                CategoryTable {
                    loan_type: LoanType::Home,
                    sub_categories: vec![
                        subcat("construction", &["construction", "plot", "land", "builder"]),
                        subcat(
                            "renovation",
                            &["renovation", "improvement", "repair", "decor", "extension", "furnish"],
                        ),
                        subcat(
                            "regular",
                            &["regular", "housing loan", "home loan", "privilege", "salary"],
                        ),
                    ],
                },
                CategoryTable {
                    loan_type: LoanType::Agriculture,
                    sub_categories: vec![
                        subcat(
                            "crops",
                            &["crop", "kisan", "kcc", "cultivation", "harvest", "short term", "production"],
                        ),
                        subcat(
                            "machines",
                            &["tractor", "machinery", "equipment", "harvester", "combine", "implement"],
                        ),
                        subcat(
                            "livestock",
                            &["dairy", "poultry", "livestock", "animal", "fishery", "sheep", "goat"],
                        ),
                        subcat("land", &["land purchase", "farm land", "estate"]),
                    ],
                },
                CategoryTable {
                    loan_type: LoanType::Education,
                    sub_categories: vec![
                        subcat(
                            "medical",
                            &["medical", "mbbs", "doctor", "health", "nursing", "dental"],
                        ),
                        subcat(
                            "undergrad",
                            &["undergraduate", "bachelor", "ug", "college", "university"],
                        ),
                        subcat(
                            "postgrad",
                            &["postgraduate", "master", "mba", "pg", "higher education", "abroad", "foreign", "overseas"],
                        ),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_covers_tabled_loan_types() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.category(LoanType::Home).is_some());
        assert!(taxonomy.category(LoanType::Agriculture).is_some());
        assert!(taxonomy.category(LoanType::Education).is_some());
        // Personal and vehicle have no table; everything maps to general.
        assert!(taxonomy.category(LoanType::Personal).is_none());
        assert!(taxonomy.category(LoanType::Vehicle).is_none());
    }

    #[test]
    fn taxonomy_loads_from_json() {
        let json = r#"{
            "bank_groups": [
                { "bank_type": "public", "aliases": ["SBI"] }
            ],
            "categories": [
                {
                    "loan_type": "agriculture",
                    "sub_categories": [
                        { "name": "crops", "keywords": ["crop", "kisan"] }
                    ]
                }
            ]
        }"#;

        let taxonomy = Taxonomy::from_json(json).unwrap();
        assert_eq!(taxonomy.bank_groups.len(), 1);
        assert_eq!(
            taxonomy.category(LoanType::Agriculture).unwrap().sub_categories[0].name,
            "crops"
        );
    }
}
