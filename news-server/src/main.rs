use std::sync::Arc;

use news_core::{AppConfig, LocalSettingsStore, SettingsStore};
use news_server::{router, AppState};
use reqwest::{redirect, ClientBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load();
    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent(config.feeds.user_agent.clone())
        .build()?;
    let settings = load_settings_store(&config).await;

    if config.server.admin_token.is_none() {
        info!("no admin token configured; settings writes are disabled");
    }

    let state = AppState::new(&config, client, settings);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "news server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("news server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn load_settings_store(config: &AppConfig) -> Arc<dyn SettingsStore> {
    match &config.feeds.settings_path {
        Some(path) => {
            info!(path = %path.display(), "loading settings");
            Arc::new(LocalSettingsStore::load_from(path).await)
        }
        None => Arc::new(LocalSettingsStore::in_memory()),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
