use std::env;

use url::Url;

/// Runtime configuration, read once from the environment at startup.
///
/// The upstream auth/REST service is optional on purpose: without
/// `SUPABASE_URL` the process still serves `/api/health`, `/api/sync/time`,
/// `/api/actions/echo` and the default role listing, and reports the
/// missing configuration on everything else.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the auth/REST service (`SUPABASE_URL`).
    pub supabase_url: Option<Url>,
    /// API key sent as `apikey` and as the fallback bearer
    /// (`SUPABASE_SERVICE_KEY`, or `SUPABASE_KEY`).
    pub supabase_key: String,
    /// Exact CORS origin override (`FRONTEND_ORIGIN`); permissive when unset.
    pub cors_origin: Option<String>,
    /// Optional secondary Postgres URL, used only for the health ping.
    pub database_url: Option<String>,
    /// Timeout applied to every outbound call (`UPSTREAM_TIMEOUT_SECS`).
    pub upstream_timeout_secs: u64,
    /// Listen port (`PORT`).
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL").ok().and_then(|raw| {
            match Url::parse(&raw) {
                Ok(url) => Some(normalize_base(url)),
                Err(e) => {
                    tracing::warn!("ignoring invalid SUPABASE_URL: {}", e);
                    None
                }
            }
        });

        let supabase_key = env::var("SUPABASE_SERVICE_KEY")
            .or_else(|_| env::var("SUPABASE_KEY"))
            .unwrap_or_default();

        Self {
            supabase_url,
            supabase_key,
            cors_origin: env::var("FRONTEND_ORIGIN").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8001),
        }
    }
}

impl Default for AppConfig {
    /// Fully unconfigured instance: no upstream, no database, defaults
    /// everywhere. This is what the integration tests run against.
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_key: String::new(),
            cors_origin: None,
            database_url: None,
            upstream_timeout_secs: 15,
            port: 8001,
        }
    }
}

// Url::join replaces the last path segment, so a base of
// "https://x.example.com/base" would silently drop "base".
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
