// Public diagnostics: health, role listing, clock sync, echo.

use axum::extract::State;
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::roles::{ROLE_ADMIN, ROLE_CLIENT};
use crate::state::AppState;

/// GET /api/health - always 200; dependency failures only show up in the
/// nested status fields.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let (db_connected, db_error) = match &state.db {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        },
        None => (false, Some("DATABASE_URL not configured".to_string())),
    };

    let supabase_error = if state.supabase.is_configured() {
        None
    } else {
        Some("SUPABASE_URL not configured".to_string())
    };

    Json(json!({
        "status": "ok",
        "backend_time": Utc::now(),
        "database": { "connected": db_connected, "error": db_error },
        "supabase": { "configured": state.supabase.is_configured(), "error": supabase_error },
    }))
}

/// GET /api/roles - list role rows. Serves a default client/admin pair when
/// the upstream is unconfigured or the table is empty; upstream errors are
/// relayed.
pub async fn roles(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if !state.supabase.is_configured() {
        return Ok(Json(Value::Array(default_roles())));
    }

    let rows = state.supabase.select("roles", &[]).await?;
    if rows.is_empty() {
        return Ok(Json(Value::Array(default_roles())));
    }
    Ok(Json(Value::Array(rows)))
}

fn default_roles() -> Vec<Value> {
    vec![
        json!({ "id": Uuid::new_v4(), "name": ROLE_CLIENT }),
        json!({ "id": Uuid::new_v4(), "name": ROLE_ADMIN }),
    ]
}

/// GET /api/sync/time
pub async fn sync_time() -> Json<Value> {
    Json(json!({
        "server_time": Utc::now(),
        "message": "sync ok",
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

/// POST /api/actions/echo - pure diagnostic; `received` mirrors the request
/// body and `action_id` is fresh per call.
pub async fn echo(Json(req): Json<ActionRequest>) -> Json<Value> {
    Json(json!({
        "action_id": Uuid::new_v4(),
        "received": req,
        "server_time": Utc::now(),
        "status": "processed",
    }))
}
