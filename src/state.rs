use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::roles::RoleCache;
use crate::supabase::SupabaseClient;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub supabase: SupabaseClient,
    pub roles: Arc<RoleCache>,
    /// Secondary database, consulted only by the health ping.
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let supabase = SupabaseClient::new(
            config.supabase_url.clone(),
            config.supabase_key.clone(),
            Duration::from_secs(config.upstream_timeout_secs),
        )?;

        // connect_lazy keeps startup non-blocking; an unreachable database
        // only surfaces in the health report
        let db = match &config.database_url {
            Some(url) => match PgPoolOptions::new().max_connections(2).connect_lazy(url) {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!("ignoring invalid DATABASE_URL: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            supabase,
            roles: Arc::new(RoleCache::new()),
            db,
        })
    }
}
