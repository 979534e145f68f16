//! Bearer extraction and the token resolver: bearer token -> upstream
//! identity -> local profile + role name, auto-provisioning a client-role
//! profile on first sight.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::roles::{ROLE_ADMIN, ROLE_CLIENT};
use crate::state::AppState;
use crate::supabase::SupabaseError;

/// Local profile row linking an auth identity to an application role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Matches the auth identity id.
    pub id: String,
    pub email: Option<String>,
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Extract the token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}

/// Resolve a bearer token to `(profile, role_name)`.
///
/// Two to three sequential upstream calls: identity lookup, role fetch on
/// first use, profile select (plus an insert when no profile row exists yet).
/// Nothing is cached across requests except the role table.
pub async fn resolve(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Profile, String), ApiError> {
    let token = bearer_token(headers)?;

    let identity = match state.supabase.token_identity(&token).await {
        Ok(identity) => identity,
        Err(SupabaseError::Status { status: 401 | 403, .. }) => {
            return Err(ApiError::unauthorized("Invalid or expired token"));
        }
        Err(e) => return Err(e.into()),
    };

    let roles = state.roles.ensure_loaded(&state.supabase).await?;

    let id_filter = format!("eq.{}", identity.id);
    let rows = state
        .supabase
        .select("profiles", &[("id", id_filter.as_str())])
        .await?;

    if let Some(row) = rows.into_iter().next() {
        let profile: Profile = serde_json::from_value(row).map_err(|e| {
            ApiError::internal_server_error(format!("malformed profile row: {}", e))
        })?;
        let role_name = profile
            .role_id
            .as_deref()
            .map(|id| roles.name_for(id))
            .unwrap_or(ROLE_CLIENT)
            .to_string();
        return Ok((profile, role_name));
    }

    // First authenticated request for this identity: provision a client
    // profile. Failures here fail the request, they are never swallowed.
    let client_role_id = roles.id_for(ROLE_CLIENT).ok_or_else(|| {
        ApiError::internal_server_error("role table is missing the client role")
    })?;
    let row = json!({
        "id": identity.id,
        "email": identity.email,
        "role_id": client_role_id,
    });
    let created = state.supabase.insert("profiles", &row).await?;
    tracing::info!(user_id = %identity.id, "auto-provisioned client profile");

    let profile: Profile = serde_json::from_value(created).map_err(|e| {
        ApiError::internal_server_error(format!("malformed profile row: {}", e))
    })?;
    Ok((profile, ROLE_CLIENT.to_string()))
}

/// Single role gate in the system: plan creation requires the literal
/// `admin` role name.
pub fn require_admin(role_name: &str) -> Result<(), ApiError> {
    if role_name == ROLE_ADMIN {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin role required"))
    }
}
