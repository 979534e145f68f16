// Per-user investment and transaction rows. No explicit role gate here;
// ownership is enforced by stamping the resolved profile id on writes and
// filtering reads by it.
//
// Bodies go through typed extractors, so a malformed body is rejected (422)
// before the bearer check runs. Only admin plan creation orders the auth
// gate ahead of payload validation; see handlers::plans::create_plan.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InvestmentInput {
    pub plan_id: String,
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// POST /api/user/investments - the outbound row is rebuilt from the
/// validated fields, so a client-supplied `user_id` can never survive.
pub async fn create_investment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<InvestmentInput>,
) -> Result<Json<Value>, ApiError> {
    let (profile, _role) = auth::resolve(&state, &headers).await?;

    let row = json!({
        "user_id": profile.id,
        "plan_id": input.plan_id,
        "amount": input.amount,
        "status": input.status.unwrap_or_else(|| "active".to_string()),
    });
    let created = state.supabase.insert("investments", &row).await?;
    Ok(Json(created))
}

/// GET /api/user/my-investments - rows filtered by the resolved profile id.
pub async fn my_investments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let (profile, _role) = auth::resolve(&state, &headers).await?;

    let filter = format!("eq.{}", profile.id);
    let rows = state
        .supabase
        .select("investments", &[("user_id", filter.as_str())])
        .await?;
    Ok(Json(Value::Array(rows)))
}

/// POST /api/user/transactions - owner-stamped like investments.
pub async fn create_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TransactionInput>,
) -> Result<Json<Value>, ApiError> {
    let (profile, _role) = auth::resolve(&state, &headers).await?;

    let row = json!({
        "user_id": profile.id,
        "type": input.kind,
        "amount": input.amount,
        "currency": input.currency,
        "status": input.status.unwrap_or_else(|| "pending".to_string()),
    });
    let created = state.supabase.insert("transactions", &row).await?;
    Ok(Json(created))
}

/// GET /api/user/my-transactions
pub async fn my_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let (profile, _role) = auth::resolve(&state, &headers).await?;

    let filter = format!("eq.{}", profile.id);
    let rows = state
        .supabase
        .select("transactions", &[("user_id", filter.as_str())])
        .await?;
    Ok(Json(Value::Array(rows)))
}
