use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::core::{
    Catalog, CatalogPatch, Category, LineItem, PatchEntry, SpendSummary, calculate_total_spend,
    evaluate_contingency,
};

/// Reference scenario defaults, applied when the payload leaves a field blank.
const DEFAULT_RUNWAY_MONTHS: u32 = 15;
const DEFAULT_TARGET_RAISE: f64 = 1_200_000.0;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    runway_months: Option<u32>,
    target_raise: Option<f64>,
    optionals: BTreeMap<String, bool>,
    monthly_overrides: BTreeMap<String, PatchEntryPayload>,
    fixed_overrides: BTreeMap<String, PatchEntryPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchEntryPayload {
    amount: f64,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRow {
    category: Category,
    amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    runway_months: u32,
    target_raise: f64,
    core_spend: f64,
    monthly_total: f64,
    fixed_total: f64,
    optional_total: f64,
    contingency_amount: f64,
    contingency_percentage: f64,
    categories: Vec<CategoryRow>,
    monthly_lines: Vec<LineItem>,
    fixed_lines: Vec<LineItem>,
    optional_lines: Vec<LineItem>,
    optional_contributions: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CostEntryView {
    amount: f64,
    category: Category,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionalCostView {
    cost_type: &'static str,
    cost_value: f64,
    category: Category,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogResponse {
    fixed_costs: BTreeMap<String, CostEntryView>,
    monthly_costs: BTreeMap<String, CostEntryView>,
    optional_costs: BTreeMap<String, OptionalCostView>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn patch_from_payload(
    monthly: &BTreeMap<String, PatchEntryPayload>,
    fixed: &BTreeMap<String, PatchEntryPayload>,
) -> Result<CatalogPatch, String> {
    let convert = |edits: &BTreeMap<String, PatchEntryPayload>| {
        edits
            .iter()
            .map(|(name, edit)| {
                let category = match &edit.category {
                    Some(value) => Some(Category::parse(value).ok_or_else(|| {
                        format!("cost \"{name}\": unknown category \"{value}\"")
                    })?),
                    None => None,
                };
                Ok((
                    name.clone(),
                    PatchEntry {
                        amount: edit.amount,
                        category,
                    },
                ))
            })
            .collect::<Result<BTreeMap<String, PatchEntry>, String>>()
    };
    Ok(CatalogPatch {
        monthly: convert(monthly)?,
        fixed: convert(fixed)?,
    })
}

fn build_plan_response(catalog: &Catalog, payload: &PlanPayload) -> Result<PlanResponse, String> {
    let runway_months = payload.runway_months.unwrap_or(DEFAULT_RUNWAY_MONTHS);
    let target_raise = payload.target_raise.unwrap_or(DEFAULT_TARGET_RAISE);
    if !target_raise.is_finite() || target_raise < 0.0 {
        return Err("targetRaise must be a non-negative number".to_string());
    }

    let patch = patch_from_payload(&payload.monthly_overrides, &payload.fixed_overrides)?;
    let snapshot;
    let effective = if patch.is_empty() {
        catalog
    } else {
        snapshot = catalog.apply(&patch).map_err(|e| e.to_string())?;
        &snapshot
    };

    let summary = calculate_total_spend(effective, runway_months, &payload.optionals)
        .map_err(|e| e.to_string())?;
    let contingency = evaluate_contingency(target_raise, summary.core_spend);

    Ok(plan_response(target_raise, summary, contingency.amount, contingency.percentage))
}

fn plan_response(
    target_raise: f64,
    summary: SpendSummary,
    contingency_amount: f64,
    contingency_percentage: f64,
) -> PlanResponse {
    PlanResponse {
        runway_months: summary.runway_months,
        target_raise,
        core_spend: summary.core_spend,
        monthly_total: summary.monthly_total,
        fixed_total: summary.fixed_total,
        optional_total: summary.optional_total,
        contingency_amount,
        contingency_percentage,
        categories: summary
            .breakdown
            .iter()
            .map(|(category, amount)| CategoryRow { category, amount })
            .collect(),
        monthly_lines: summary.monthly_lines,
        fixed_lines: summary.fixed_lines,
        optional_lines: summary.optional_lines,
        optional_contributions: summary.optional_contributions,
    }
}

fn catalog_response(catalog: &Catalog) -> CatalogResponse {
    CatalogResponse {
        fixed_costs: catalog
            .fixed_costs()
            .iter()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    CostEntryView {
                        amount: entry.amount,
                        category: entry.category,
                    },
                )
            })
            .collect(),
        monthly_costs: catalog
            .monthly_costs()
            .iter()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    CostEntryView {
                        amount: entry.amount,
                        category: entry.category,
                    },
                )
            })
            .collect(),
        optional_costs: catalog
            .optional_costs()
            .iter()
            .map(|(name, item)| {
                (
                    name.clone(),
                    OptionalCostView {
                        cost_type: item.cost_type.name(),
                        cost_value: item.cost_value,
                        category: item.category,
                    },
                )
            })
            .collect(),
    }
}

pub async fn run_http_server(port: u16, catalog: Catalog) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/catalog", get(catalog_handler))
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .fallback(not_found_handler)
        .with_state(Arc::new(catalog));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "use-of-funds API listening");

    axum::serve(listener, app).await
}

async fn catalog_handler(State(catalog): State<Arc<Catalog>>) -> Response {
    json_response(StatusCode::OK, catalog_response(&catalog))
}

async fn plan_get_handler(
    State(catalog): State<Arc<Catalog>>,
    Query(payload): Query<PlanPayload>,
) -> Response {
    plan_handler_impl(&catalog, payload)
}

async fn plan_post_handler(
    State(catalog): State<Arc<Catalog>>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    plan_handler_impl(&catalog, payload)
}

fn plan_handler_impl(catalog: &Catalog, payload: PlanPayload) -> Response {
    match build_plan_response(catalog, &payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
