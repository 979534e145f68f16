// In-process double for the upstream service: GoTrue-style auth endpoints
// plus PostgREST-style tables backed by in-memory row stores, bound on a
// loopback port. Tests point the proxy's base URL at it and then inspect
// the stores directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

use cryptoboost_api::config::AppConfig;
use cryptoboost_api::state::AppState;

pub const CLIENT_TOKEN: &str = "client-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const CLIENT_USER_ID: &str = "11111111-1111-4111-8111-111111111111";
pub const ADMIN_USER_ID: &str = "22222222-2222-4222-8222-222222222222";
pub const CLIENT_ROLE_ID: &str = "aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa";
pub const ADMIN_ROLE_ID: &str = "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb";
pub const GOOD_PASSWORD: &str = "ChangeMe!123";

#[derive(Clone, Default)]
struct StubState {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
}

pub struct StubUpstream {
    pub base_url: String,
    state: StubState,
}

impl StubUpstream {
    /// Bind the double on a free loopback port. The `roles` table carries
    /// the well-known pair and an admin profile is pre-seeded; the client
    /// identity deliberately has no profile row.
    pub async fn spawn() -> Result<Self> {
        let state = StubState::default();
        {
            let mut tables = state.tables.lock().unwrap();
            tables.insert(
                "roles".to_string(),
                vec![
                    json!({ "id": CLIENT_ROLE_ID, "name": "client" }),
                    json!({ "id": ADMIN_ROLE_ID, "name": "admin" }),
                ],
            );
            tables.insert(
                "profiles".to_string(),
                vec![json!({
                    "id": ADMIN_USER_ID,
                    "email": "admin@test.local",
                    "role_id": ADMIN_ROLE_ID,
                })],
            );
        }

        let router = Router::new()
            .route("/auth/v1/user", get(auth_user))
            .route("/auth/v1/signup", post(auth_signup))
            .route("/auth/v1/token", post(auth_token))
            .route("/rest/v1/:table", get(rest_select).post(rest_insert))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}/", listener.local_addr()?);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { base_url, state })
    }

    /// Proxy app wired to this upstream, with no secondary database.
    pub fn app(&self) -> Router {
        let config = AppConfig {
            supabase_url: Some(Url::parse(&self.base_url).expect("stub url")),
            supabase_key: "stub-service-key".to_string(),
            ..AppConfig::default()
        };
        let state = AppState::from_config(config).expect("app state");
        cryptoboost_api::app(state)
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn push_row(&self, table: &str, row: Value) {
        self.state
            .tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization")?.to_str().ok()?.strip_prefix("Bearer ")
}

async fn auth_user(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(CLIENT_TOKEN) => {
            Json(json!({ "id": CLIENT_USER_ID, "email": "client@test.local" })).into_response()
        }
        Some(ADMIN_TOKEN) => {
            Json(json!({ "id": ADMIN_USER_ID, "email": "admin@test.local" })).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid JWT" })),
        )
            .into_response(),
    }
}

async fn auth_signup(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "id": Uuid::new_v4(), "email": body["email"] }))
}

async fn auth_token(Json(body): Json<Value>) -> Response {
    if body["password"] == GOOD_PASSWORD {
        Json(json!({ "access_token": CLIENT_TOKEN, "token_type": "bearer" })).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response()
    }
}

// PostgREST subset: `column=eq.value` filters on string columns; everything
// else (select=*) is ignored.
async fn rest_select(
    State(state): State<StubState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let tables = state.tables.lock().unwrap();
    let rows = tables.get(&table).cloned().unwrap_or_default();
    let filtered: Vec<Value> = rows
        .into_iter()
        .filter(|row| {
            params.iter().all(|(column, filter)| match filter.strip_prefix("eq.") {
                Some(want) => row.get(column).and_then(Value::as_str) == Some(want),
                None => true,
            })
        })
        .collect();
    Json(Value::Array(filtered))
}

async fn rest_insert(
    State(state): State<StubState>,
    Path(table): Path<String>,
    Json(row): Json<Value>,
) -> Json<Value> {
    state
        .tables
        .lock()
        .unwrap()
        .entry(table)
        .or_default()
        .push(row.clone());
    // return=representation wraps the created row in an array
    Json(json!([row]))
}
