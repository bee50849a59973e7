//! Resolution of the admin-writable key/value settings into the effective
//! configuration of one aggregation cycle.
//!
//! Every value is a string at rest and parsed permissively: anything that
//! fails to parse degrades to a default and is only reported at debug level.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub type SettingsMap = BTreeMap<String, String>;

pub const RSS_URL_KEY: &str = "news_rss_url";
pub const FEED_URLS_KEY: &str = "news_feed_urls";
pub const CACHE_TTL_KEY: &str = "news_cache_ttl_sec";
pub const MAX_ITEMS_KEY: &str = "news_max_items";
pub const CATEGORY_WHITELIST_KEY: &str = "news_category_whitelist";

pub const DEFAULT_FEED_URL: &str = "http://www.trthaber.com/xml_mobile.php?tur=xml_genel&kategori=sondakika&adet=20&selectEx=yorumSay,okunmaadedi,anasayfamanset,kategorimanset";
pub const DEFAULT_CATEGORIES: [&str; 4] = ["ekonomi", "gundem", "siyaset", "politika"];

const DEFAULT_TTL_SECS: f64 = 120.0;
const MIN_TTL_SECS: f64 = 30.0;
const DEFAULT_MAX_ITEMS: f64 = 10.0;
const MIN_MAX_ITEMS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct NewsSettings {
    pub ttl: Duration,
    pub max_items: usize,
    pub sources: Vec<String>,
    pub allowed_categories: HashSet<String>,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self::resolve(&SettingsMap::new())
    }
}

impl NewsSettings {
    pub fn resolve(settings: &SettingsMap) -> Self {
        let ttl_secs = parse_positive_number(settings.get(CACHE_TTL_KEY))
            .unwrap_or(DEFAULT_TTL_SECS)
            .max(MIN_TTL_SECS);
        let max_items = parse_positive_number(settings.get(MAX_ITEMS_KEY))
            .unwrap_or(DEFAULT_MAX_ITEMS)
            .max(MIN_MAX_ITEMS);

        Self {
            ttl: Duration::try_from_secs_f64(ttl_secs).unwrap_or(Duration::MAX),
            max_items: max_items.trunc() as usize,
            sources: resolve_sources(settings),
            allowed_categories: resolve_categories(settings),
        }
    }

    /// Uncategorized items always pass; categorized ones must be whitelisted.
    pub fn allows_category(&self, category: &str) -> bool {
        category.is_empty() || self.allowed_categories.contains(&category.to_lowercase())
    }
}

fn resolve_sources(settings: &SettingsMap) -> Vec<String> {
    let listed: Vec<Value> = parse_or_default(FEED_URLS_KEY, settings.get(FEED_URLS_KEY), Vec::new());
    let sources: Vec<String> = listed
        .into_iter()
        .filter_map(|value| match value {
            Value::String(url) if !url.trim().is_empty() => Some(url.trim().to_string()),
            _ => None,
        })
        .collect();
    if !sources.is_empty() {
        return sources;
    }

    let single = settings
        .get(RSS_URL_KEY)
        .map(|url| url.trim())
        .unwrap_or_default();
    if !single.is_empty() {
        return vec![single.to_string()];
    }
    vec![DEFAULT_FEED_URL.to_string()]
}

fn resolve_categories(settings: &SettingsMap) -> HashSet<String> {
    let listed: Vec<Value> = parse_or_default(
        CATEGORY_WHITELIST_KEY,
        settings.get(CATEGORY_WHITELIST_KEY),
        Vec::new(),
    );
    if listed.is_empty() {
        return DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
    }
    listed
        .into_iter()
        .map(|value| match value {
            Value::String(s) => s.to_lowercase(),
            Value::Null | Value::Bool(false) => String::new(),
            Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
            other => other.to_string().to_lowercase(),
        })
        .collect()
}

/// Parses `raw` as JSON, returning `default` when the key is missing, blank
/// or malformed.
pub fn parse_or_default<T: DeserializeOwned>(key: &str, raw: Option<&String>, default: T) -> T {
    let Some(raw) = raw.map(|s| s.trim()).filter(|s| !s.is_empty()) else {
        return default;
    };
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(key, error = %e, "ignoring malformed setting");
            default
        }
    }
}

/// Zero, non-numeric and non-finite values count as unset.
fn parse_positive_number(raw: Option<&String>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n != 0.0 => Some(n),
        _ => {
            debug!(value = raw, "ignoring non-numeric setting");
            None
        }
    }
}
