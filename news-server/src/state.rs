use std::sync::Arc;
use std::time::Duration;

use news_core::settings::DEFAULT_FEED_URL;
use news_core::{AppConfig, HttpFeedFetcher, NewsService, SettingsStore};
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsService>,
    pub settings: Arc<dyn SettingsStore>,
    pub client: Client,
    pub admin_token: Option<String>,
    pub request_timeout: Duration,
    /// Upstream document forwarded verbatim by the raw XML route.
    pub raw_feed_url: String,
}

impl AppState {
    pub fn new(config: &AppConfig, client: Client, settings: Arc<dyn SettingsStore>) -> Self {
        let request_timeout = config.feeds.request_timeout();
        let fetcher = HttpFeedFetcher::new(client.clone(), request_timeout);
        let news = NewsService::new(settings.clone(), Arc::new(fetcher));
        Self {
            news: Arc::new(news),
            settings,
            client,
            admin_token: config.server.admin_token.clone(),
            request_timeout,
            raw_feed_url: DEFAULT_FEED_URL.to_string(),
        }
    }

    pub fn with_raw_feed_url(mut self, url: impl Into<String>) -> Self {
        self.raw_feed_url = url.into();
        self
    }
}
