// Auth surface: register, login, me. All three are passthroughs to the
// upstream auth service; register additionally provisions the client-role
// profile row.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;
use crate::roles::ROLE_CLIENT;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// POST /api/auth/register - create the upstream identity, then the local
/// profile row with the cached client role id.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let identity = state.supabase.signup(&req.email, &req.password).await?;

    let roles = state.roles.ensure_loaded(&state.supabase).await?;
    let client_role_id = roles.id_for(ROLE_CLIENT).ok_or_else(|| {
        ApiError::internal_server_error("role table is missing the client role")
    })?;

    let mut row = json!({
        "id": identity.id,
        "email": req.email,
        "role_id": client_role_id,
    });
    if let Some(full_name) = &req.full_name {
        row["full_name"] = json!(full_name);
    }
    state.supabase.insert("profiles", &row).await?;
    tracing::info!(user_id = %identity.id, "registered new client profile");

    Ok(Json(json!({
        "user_id": identity.id,
        "email": req.email,
        "status": "registered",
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - opaque passthrough of the password-grant exchange.
/// A non-2xx from the auth service is relayed with its original status.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let grant = state.supabase.password_grant(&req.email, &req.password).await?;
    Ok(Json(grant))
}

/// GET /api/me - resolved profile plus role name.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let (profile, role_name) = auth::resolve(&state, &headers).await?;

    let mut body = serde_json::to_value(&profile).map_err(|e| {
        ApiError::internal_server_error(format!("failed to encode profile: {}", e))
    })?;
    body["role"] = json!(role_name);
    Ok(Json(body))
}
