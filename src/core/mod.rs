mod catalog;
mod engine;
mod types;

pub use catalog::{Catalog, CatalogError, CatalogPatch, PatchEntry};
pub use engine::{CalcError, calculate_total_spend, categorize, evaluate_contingency};
pub use types::{
    Category, CategoryBreakdown, Contingency, CostEntry, CostType, LineItem, OptionalCost,
    SpendSummary,
};
