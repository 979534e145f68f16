//! Thin client for the upstream Supabase-style service: GoTrue auth under
//! `auth/v1/` and PostgREST tables under `rest/v1/`.
//!
//! Every request carries the project API key in the `apikey` header plus a
//! bearer token (the caller's token where one exists, the API key otherwise).
//! Calls share one `reqwest::Client` with a fixed timeout; there are no
//! retries, failures propagate to the handler.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("supabase base URL is not configured")]
    Unconfigured,

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode upstream response: {0}")]
    Decode(String),
}

/// Identity record as returned by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

/// The auth service answers signup with either the identity itself or a
/// session wrapper around it, depending on email-confirmation settings.
/// Decoded explicitly; a response matching neither shape is a hard error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AuthReply {
    Bare(Identity),
    Session { user: Identity },
}

impl AuthReply {
    pub fn into_identity(self) -> Identity {
        match self {
            AuthReply::Bare(identity) => identity,
            AuthReply::Session { user } => user,
        }
    }
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base: Option<Url>,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(
        base: Option<Url>,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base, api_key })
    }

    pub fn is_configured(&self) -> bool {
        self.base.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        let base = self.base.as_ref().ok_or(SupabaseError::Unconfigured)?;
        base.join(path)
            .map_err(|e| SupabaseError::Decode(format!("invalid endpoint {}: {}", path, e)))
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(&self.api_key))
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SupabaseError::Status { status: status.as_u16(), body })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        resp.json::<T>().await.map_err(|e| SupabaseError::Decode(e.to_string()))
    }

    /// `POST auth/v1/signup` - create an identity from email + password.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Identity, SupabaseError> {
        let url = self.endpoint("auth/v1/signup")?;
        let resp = self
            .request(reqwest::Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let reply: AuthReply = Self::decode(resp).await?;
        Ok(reply.into_identity())
    }

    /// `POST auth/v1/token?grant_type=password` - exchange credentials for an
    /// access token. The response body is returned opaque; the proxy relays
    /// it without reshaping.
    pub async fn password_grant(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Value, SupabaseError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let resp = self
            .request(reqwest::Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        Self::decode(resp).await
    }

    /// `GET auth/v1/user` - resolve a bearer token to its identity.
    pub async fn token_identity(&self, token: &str) -> Result<Identity, SupabaseError> {
        let url = self.endpoint("auth/v1/user")?;
        let resp = self.request(reqwest::Method::GET, url, Some(token)).send().await?;
        let resp = Self::check(resp).await?;
        let reply: AuthReply = Self::decode(resp).await?;
        Ok(reply.into_identity())
    }

    /// `GET rest/v1/{table}` with PostgREST row filters, e.g.
    /// `("user_id", "eq.<uuid>")`.
    pub async fn select(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Value>, SupabaseError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", table))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (column, filter) in filters {
                pairs.append_pair(column, filter);
            }
        }
        let resp = self.request(reqwest::Method::GET, url, None).send().await?;
        let resp = Self::check(resp).await?;
        Self::decode(resp).await
    }

    /// `POST rest/v1/{table}` - insert one row and return the created
    /// representation.
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Value, SupabaseError> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let resp = self
            .request(reqwest::Method::POST, url, None)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let body: Value = Self::decode(resp).await?;
        // PostgREST wraps the created row in a one-element array
        match body {
            Value::Array(mut rows) if !rows.is_empty() => Ok(rows.remove(0)),
            other => Ok(other),
        }
    }
}
