pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod settings;
pub mod storage;

pub use cache::{CacheEntry, NewsCache, NewsService};
pub use config::{AppConfig, FeedConfig, ServerConfig};
pub use error::NewsError;
pub use feed::{NewsItem, RawItem};
pub use fetcher::{proxy_document, FeedFetcher, HttpFeedFetcher, ProxiedDocument, FEED_ACCEPT};
pub use parser::parse_document;
pub use pipeline::aggregate;
pub use settings::{NewsSettings, SettingsMap};
pub use storage::{default_settings, settings_from_json, LocalSettingsStore, SettingsStore};
