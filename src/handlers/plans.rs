// Investment plan listing (public) and creation (admin only).

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

/// Minimal accepted shape for a plan row; anything else the client sends is
/// dropped rather than forwarded.
#[derive(Debug, Deserialize)]
pub struct PlanInput {
    pub name: String,
    pub min_amount: f64,
    pub profit_percent: f64,
    pub duration_days: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /api/plans - public listing; empty when the upstream is unconfigured.
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if !state.supabase.is_configured() {
        return Ok(Json(Value::Array(Vec::new())));
    }
    let rows = state.supabase.select("plans", &[]).await?;
    Ok(Json(Value::Array(rows)))
}

/// POST /api/admin/plans - admin only.
///
/// The body is taken as raw JSON and validated after the role gate so a
/// non-admin caller gets 403 regardless of payload validity.
pub async fn create_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let (_profile, role_name) = auth::resolve(&state, &headers).await?;
    auth::require_admin(&role_name)?;

    let plan: PlanInput = serde_json::from_value(payload)
        .map_err(|e| ApiError::unprocessable_entity(format!("invalid plan payload: {}", e)))?;

    let row = json!({
        "name": plan.name,
        "min_amount": plan.min_amount,
        "profit_percent": plan.profit_percent,
        "duration_days": plan.duration_days,
        "description": plan.description,
    });
    let created = state.supabase.insert("plans", &row).await?;
    Ok(Json(created))
}
