use std::collections::BTreeMap;

use thiserror::Error;

use super::catalog::Catalog;
use super::types::{CategoryBreakdown, Contingency, CostType, LineItem, SpendSummary};

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("selection references unknown optional cost \"{0}\"")]
    UnknownOptionalCost(String),
}

/// Computes the total projected spend for a runway length and a set of selected
/// optional add-backs.
///
/// Monthly items scale linearly with the runway; fixed items never do. Optional
/// items scale by their own timing rule: monthly by the runway, annual by
/// runway/12 (fractional years, no rounding), one_time not at all. A selection
/// key that names no optional item in the catalog is a contract violation.
///
/// `core_spend` is taken from the categorized breakdown, so the sum of the five
/// category totals equals it exactly; the monthly/fixed/optional subtotals are
/// display aggregates over the same line items.
pub fn calculate_total_spend(
    catalog: &Catalog,
    runway_months: u32,
    selected_optionals: &BTreeMap<String, bool>,
) -> Result<SpendSummary, CalcError> {
    let runway = f64::from(runway_months);

    let mut monthly_lines = Vec::with_capacity(catalog.monthly_costs().len());
    let mut monthly_total = 0.0;
    for (name, entry) in catalog.monthly_costs() {
        let amount = entry.amount * runway;
        monthly_total += amount;
        monthly_lines.push(LineItem {
            name: name.clone(),
            category: entry.category,
            amount,
        });
    }

    let mut fixed_lines = Vec::with_capacity(catalog.fixed_costs().len());
    let mut fixed_total = 0.0;
    for (name, entry) in catalog.fixed_costs() {
        fixed_total += entry.amount;
        fixed_lines.push(LineItem {
            name: name.clone(),
            category: entry.category,
            amount: entry.amount,
        });
    }

    let mut optional_lines = Vec::new();
    let mut optional_contributions = BTreeMap::new();
    let mut optional_total = 0.0;
    for (name, is_selected) in selected_optionals {
        let Some(item) = catalog.optional_costs().get(name) else {
            return Err(CalcError::UnknownOptionalCost(name.clone()));
        };
        if !*is_selected {
            continue;
        }
        let contribution = match item.cost_type {
            CostType::Monthly => item.cost_value * runway,
            CostType::Annual => item.cost_value * (runway / 12.0),
            CostType::OneTime => item.cost_value,
        };
        optional_total += contribution;
        optional_contributions.insert(name.clone(), contribution);
        optional_lines.push(LineItem {
            name: name.clone(),
            category: item.category,
            amount: contribution,
        });
    }

    let breakdown = categorize(&monthly_lines, &fixed_lines, &optional_lines);
    let core_spend = breakdown.total();

    Ok(SpendSummary {
        runway_months,
        core_spend,
        monthly_total,
        fixed_total,
        optional_total,
        breakdown,
        monthly_lines,
        fixed_lines,
        optional_lines,
        optional_contributions,
    })
}

/// Distributes cost lines across the five fixed categories.
///
/// Each line lands in exactly the category its catalog entry names, so no amount
/// can leak or double-count. All five categories appear in the result, in
/// declaration order, even at zero.
pub fn categorize(
    scaled_monthly: &[LineItem],
    fixed: &[LineItem],
    selected_optionals: &[LineItem],
) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();
    for line in scaled_monthly.iter().chain(fixed).chain(selected_optionals) {
        breakdown.add(line.category, line.amount);
    }
    breakdown
}

/// Derives the contingency buffer from the target raise and the core spend.
///
/// A negative amount means overspend, which is a representable state rather than
/// an error. The percentage is defined as 0 when the raise is 0.
pub fn evaluate_contingency(target_raise: f64, core_spend: f64) -> Contingency {
    let amount = target_raise - core_spend;
    let percentage = if target_raise > 0.0 {
        amount / target_raise * 100.0
    } else {
        0.0
    };
    Contingency { amount, percentage }
}
