use anyhow::Context;

use cryptoboost_api::config::AppConfig;
use cryptoboost_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptoboost_api=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    if config.supabase_url.is_none() {
        tracing::warn!(
            "SUPABASE_URL not set; auth and data routes will report the service as unconfigured"
        );
    }

    let port = config.port;
    let state = AppState::from_config(config)?;
    let router = cryptoboost_api::app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("cryptoboost-api listening on http://{}", bind_addr);
    axum::serve(listener, router).await.context("server")?;
    Ok(())
}
