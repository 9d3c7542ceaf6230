use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// The five budget categories, in the order they are reported.
///
/// This is a closed set: the catalog validator and the categorizer share it, so a
/// cost item can never reference a bucket the breakdown does not know about.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Category {
    Personnel,
    ProductDev,
    SoftwareTools,
    GoToMarket,
    ProfessionalServices,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Personnel,
        Category::ProductDev,
        Category::SoftwareTools,
        Category::GoToMarket,
        Category::ProfessionalServices,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Personnel => "Personnel Costs",
            Category::ProductDev => "Product Dev & Tech Infrastructure",
            Category::SoftwareTools => "Software, Tools & Equipment (OpEx + CapEx)",
            Category::GoToMarket => "Go-to-Market (Sales & Marketing)",
            Category::ProfessionalServices => "Professional Services & Admin",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.name() == value)
    }

    fn index(self) -> usize {
        match self {
            Category::Personnel => 0,
            Category::ProductDev => 1,
            Category::SoftwareTools => 2,
            Category::GoToMarket => 3,
            Category::ProfessionalServices => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Scaling rule for an optional add-back cost.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CostType {
    Monthly,
    Annual,
    OneTime,
}

impl CostType {
    pub fn parse(value: &str) -> Option<CostType> {
        match value {
            "monthly" => Some(CostType::Monthly),
            "annual" => Some(CostType::Annual),
            "one_time" => Some(CostType::OneTime),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CostType::Monthly => "monthly",
            CostType::Annual => "annual",
            CostType::OneTime => "one_time",
        }
    }
}

impl fmt::Display for CostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed or monthly catalog entry: a non-negative amount tagged with its category.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CostEntry {
    pub amount: f64,
    pub category: Category,
}

/// An optional add-back: inert until selected for a calculation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OptionalCost {
    pub cost_type: CostType,
    pub cost_value: f64,
    pub category: Category,
}

/// One runway-scaled cost line, ready for categorization and display.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub category: Category,
    pub amount: f64,
}

/// Per-category totals in fixed declaration order.
///
/// Every category is always present, zero allowed; dropping empty rows is the
/// presentation layer's call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryBreakdown {
    totals: [f64; 5],
}

impl CategoryBreakdown {
    pub fn add(&mut self, category: Category, amount: f64) {
        self.totals[category.index()] += amount;
    }

    pub fn get(&self, category: Category) -> f64 {
        self.totals[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> f64 {
        self.totals.iter().sum()
    }
}

/// Everything one spend calculation produces: the grand total, the subtotals behind
/// it, the ordered category breakdown, and per-item lines for display.
#[derive(Clone, Debug, PartialEq)]
pub struct SpendSummary {
    pub runway_months: u32,
    pub core_spend: f64,
    pub monthly_total: f64,
    pub fixed_total: f64,
    pub optional_total: f64,
    pub breakdown: CategoryBreakdown,
    pub monthly_lines: Vec<LineItem>,
    pub fixed_lines: Vec<LineItem>,
    pub optional_lines: Vec<LineItem>,
    pub optional_contributions: BTreeMap<String, f64>,
}

/// The leftover buffer between the target raise and the core spend.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contingency {
    pub amount: f64,
    pub percentage: f64,
}
