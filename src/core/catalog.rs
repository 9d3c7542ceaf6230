use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::types::{Category, CostEntry, CostType, OptionalCost};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read budget catalog at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("budget catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{kind} cost \"{name}\": amount must be a non-negative number, got {amount}")]
    NegativeAmount {
        kind: &'static str,
        name: String,
        amount: f64,
    },
    #[error(
        "optional cost \"{name}\": cost_type must be \"monthly\", \"annual\" or \"one_time\", got \"{value}\""
    )]
    InvalidCostType { name: String, value: String },
    #[error("{kind} cost \"{name}\": unknown category \"{value}\"")]
    UnknownCategory {
        kind: &'static str,
        name: String,
        value: String,
    },
    #[error("{kind} cost \"{name}\" is new and must name a category")]
    MissingCategory { kind: &'static str, name: String },
}

/// The raw document shape: three maps keyed by item name. Parsed first, then
/// validated field by field so errors can name the offending item.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    fixed_costs: BTreeMap<String, RawCostEntry>,
    monthly_costs: BTreeMap<String, RawCostEntry>,
    optional_costs: BTreeMap<String, RawOptionalCost>,
}

#[derive(Debug, Deserialize)]
struct RawCostEntry {
    amount: f64,
    category: String,
}

#[derive(Debug, Deserialize)]
struct RawOptionalCost {
    cost_type: String,
    cost_value: f64,
    category: String,
}

/// A validated, immutable cost catalog.
///
/// Calculations take a `&Catalog` and never mutate it; user edits come in as a
/// [`CatalogPatch`] and produce a fresh snapshot via [`Catalog::apply`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    fixed_costs: BTreeMap<String, CostEntry>,
    monthly_costs: BTreeMap<String, CostEntry>,
    optional_costs: BTreeMap<String, OptionalCost>,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Catalog::from_json(&payload)
    }

    pub fn from_json(payload: &str) -> Result<Catalog, CatalogError> {
        let file: CatalogFile = serde_json::from_str(payload)?;

        let mut catalog = Catalog::default();
        for (name, raw) in file.fixed_costs {
            let entry = validate_entry("fixed", &name, raw.amount, &raw.category)?;
            catalog.fixed_costs.insert(name, entry);
        }
        for (name, raw) in file.monthly_costs {
            let entry = validate_entry("monthly", &name, raw.amount, &raw.category)?;
            catalog.monthly_costs.insert(name, entry);
        }
        for (name, raw) in file.optional_costs {
            let cost_type =
                CostType::parse(&raw.cost_type).ok_or_else(|| CatalogError::InvalidCostType {
                    name: name.clone(),
                    value: raw.cost_type.clone(),
                })?;
            let entry = validate_entry("optional", &name, raw.cost_value, &raw.category)?;
            catalog.optional_costs.insert(
                name,
                OptionalCost {
                    cost_type,
                    cost_value: entry.amount,
                    category: entry.category,
                },
            );
        }
        Ok(catalog)
    }

    pub fn fixed_costs(&self) -> &BTreeMap<String, CostEntry> {
        &self.fixed_costs
    }

    pub fn monthly_costs(&self) -> &BTreeMap<String, CostEntry> {
        &self.monthly_costs
    }

    pub fn optional_costs(&self) -> &BTreeMap<String, OptionalCost> {
        &self.optional_costs
    }

    /// Overlays a patch onto this catalog and returns the resulting snapshot.
    ///
    /// Existing items keep their category unless the patch names a new one; brand
    /// new items must carry a category. Items are never removed.
    pub fn apply(&self, patch: &CatalogPatch) -> Result<Catalog, CatalogError> {
        let mut next = self.clone();
        apply_edits("monthly", &mut next.monthly_costs, &patch.monthly)?;
        apply_edits("fixed", &mut next.fixed_costs, &patch.fixed)?;
        Ok(next)
    }
}

fn validate_entry(
    kind: &'static str,
    name: &str,
    amount: f64,
    category: &str,
) -> Result<CostEntry, CatalogError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(CatalogError::NegativeAmount {
            kind,
            name: name.to_string(),
            amount,
        });
    }
    let category = Category::parse(category).ok_or_else(|| CatalogError::UnknownCategory {
        kind,
        name: name.to_string(),
        value: category.to_string(),
    })?;
    Ok(CostEntry { amount, category })
}

fn apply_edits(
    kind: &'static str,
    target: &mut BTreeMap<String, CostEntry>,
    edits: &BTreeMap<String, PatchEntry>,
) -> Result<(), CatalogError> {
    for (name, edit) in edits {
        if !edit.amount.is_finite() || edit.amount < 0.0 {
            return Err(CatalogError::NegativeAmount {
                kind,
                name: name.clone(),
                amount: edit.amount,
            });
        }
        match target.get_mut(name) {
            Some(entry) => {
                entry.amount = edit.amount;
                if let Some(category) = edit.category {
                    entry.category = category;
                }
            }
            None => {
                let category = edit.category.ok_or_else(|| CatalogError::MissingCategory {
                    kind,
                    name: name.clone(),
                })?;
                target.insert(
                    name.clone(),
                    CostEntry {
                        amount: edit.amount,
                        category,
                    },
                );
            }
        }
    }
    Ok(())
}

/// One caller-driven edit: a new amount, plus a category when adding a new item.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PatchEntry {
    pub amount: f64,
    pub category: Option<Category>,
}

/// Caller edits to overlay on a catalog snapshot: amount overrides for existing
/// fixed/monthly items and appends of new ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogPatch {
    pub monthly: BTreeMap<String, PatchEntry>,
    pub fixed: BTreeMap<String, PatchEntry>,
}

impl CatalogPatch {
    pub fn is_empty(&self) -> bool {
        self.monthly.is_empty() && self.fixed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "fixed_costs": {
                "Hardware (5 Laptops)": {
                    "amount": 10000,
                    "category": "Software, Tools & Equipment (OpEx + CapEx)"
                }
            },
            "monthly_costs": {
                "Founder Salary (x3)": { "amount": 30000, "category": "Personnel Costs" },
                "Cloud Hosting (Avg)": {
                    "amount": 1500,
                    "category": "Product Dev & Tech Infrastructure"
                }
            },
            "optional_costs": {
                "D&O Insurance (Annual)": {
                    "cost_type": "annual",
                    "cost_value": 3500,
                    "category": "Professional Services & Admin"
                }
            }
        }"#
    }

    #[test]
    fn parses_and_validates_sample_catalog() {
        let catalog = Catalog::from_json(sample_json()).expect("sample must parse");
        assert_eq!(catalog.fixed_costs().len(), 1);
        assert_eq!(catalog.monthly_costs().len(), 2);

        let founder = &catalog.monthly_costs()["Founder Salary (x3)"];
        assert_eq!(founder.amount, 30_000.0);
        assert_eq!(founder.category, Category::Personnel);

        let dno = &catalog.optional_costs()["D&O Insurance (Annual)"];
        assert_eq!(dno.cost_type, CostType::Annual);
        assert_eq!(dno.category, Category::ProfessionalServices);
    }

    #[test]
    fn rejects_negative_monthly_amount_by_name() {
        let json = r#"{
            "fixed_costs": {},
            "monthly_costs": {
                "Office Supplies": { "amount": -100, "category": "Professional Services & Admin" }
            },
            "optional_costs": {}
        }"#;
        let err = Catalog::from_json(json).expect_err("negative amount must fail");
        let message = err.to_string();
        assert!(message.contains("Office Supplies"), "got: {message}");
        assert!(message.contains("non-negative"), "got: {message}");
    }

    #[test]
    fn rejects_non_finite_amount() {
        let err = validate_entry("monthly", "Rent", f64::NAN, "Personnel Costs")
            .expect_err("NaN must fail");
        assert!(matches!(err, CatalogError::NegativeAmount { .. }));
    }

    #[test]
    fn rejects_unknown_cost_type() {
        let json = r#"{
            "fixed_costs": {},
            "monthly_costs": {},
            "optional_costs": {
                "Quarterly Offsite": {
                    "cost_type": "quarterly",
                    "cost_value": 5000,
                    "category": "Personnel Costs"
                }
            }
        }"#;
        let err = Catalog::from_json(json).expect_err("bad cost_type must fail");
        let message = err.to_string();
        assert!(message.contains("Quarterly Offsite"), "got: {message}");
        assert!(message.contains("quarterly"), "got: {message}");
    }

    #[test]
    fn rejects_unknown_category_at_load() {
        let json = r#"{
            "fixed_costs": {},
            "monthly_costs": {},
            "optional_costs": {
                "Team Offsite": {
                    "cost_type": "one_time",
                    "cost_value": 5000,
                    "category": "Morale"
                }
            }
        }"#;
        let err = Catalog::from_json(json).expect_err("unknown category must fail");
        assert!(matches!(err, CatalogError::UnknownCategory { .. }));
        assert!(err.to_string().contains("Morale"));
    }

    #[test]
    fn patch_overrides_existing_amount_without_category() {
        let catalog = Catalog::from_json(sample_json()).expect("sample must parse");
        let mut patch = CatalogPatch::default();
        patch.monthly.insert(
            "Cloud Hosting (Avg)".to_string(),
            PatchEntry {
                amount: 2_000.0,
                category: None,
            },
        );

        let next = catalog.apply(&patch).expect("override must apply");
        let entry = &next.monthly_costs()["Cloud Hosting (Avg)"];
        assert_eq!(entry.amount, 2_000.0);
        assert_eq!(entry.category, Category::ProductDev);
        // The original snapshot is untouched.
        assert_eq!(catalog.monthly_costs()["Cloud Hosting (Avg)"].amount, 1_500.0);
    }

    #[test]
    fn patch_appends_new_item_with_category() {
        let catalog = Catalog::from_json(sample_json()).expect("sample must parse");
        let mut patch = CatalogPatch::default();
        patch.fixed.insert(
            "Patent Filing".to_string(),
            PatchEntry {
                amount: 8_000.0,
                category: Some(Category::ProfessionalServices),
            },
        );

        let next = catalog.apply(&patch).expect("append must apply");
        assert_eq!(next.fixed_costs()["Patent Filing"].amount, 8_000.0);
    }

    #[test]
    fn patch_rejects_new_item_without_category() {
        let catalog = Catalog::from_json(sample_json()).expect("sample must parse");
        let mut patch = CatalogPatch::default();
        patch.monthly.insert(
            "Contract Recruiter".to_string(),
            PatchEntry {
                amount: 4_000.0,
                category: None,
            },
        );

        let err = catalog.apply(&patch).expect_err("new item needs a category");
        assert!(matches!(err, CatalogError::MissingCategory { .. }));
    }

    #[test]
    fn patch_rejects_negative_amount() {
        let catalog = Catalog::from_json(sample_json()).expect("sample must parse");
        let mut patch = CatalogPatch::default();
        patch.fixed.insert(
            "Hardware (5 Laptops)".to_string(),
            PatchEntry {
                amount: -1.0,
                category: None,
            },
        );

        let err = catalog.apply(&patch).expect_err("negative override must fail");
        assert!(matches!(err, CatalogError::NegativeAmount { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Catalog::load("definitely/not/here.json").expect_err("missing file must fail");
        assert!(err.to_string().contains("definitely/not/here.json"));
    }
}
