use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::NewsError;
use crate::settings::{
    SettingsMap, CACHE_TTL_KEY, CATEGORY_WHITELIST_KEY, FEED_URLS_KEY, MAX_ITEMS_KEY, RSS_URL_KEY,
};

/// Key/value settings backing the portal. Values are always strings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn snapshot(&self) -> Result<SettingsMap, NewsError>;

    /// Merges `updates` into the stored settings and returns the new snapshot.
    async fn update(&self, updates: SettingsMap) -> Result<SettingsMap, NewsError>;
}

pub fn default_settings() -> SettingsMap {
    [
        ("app_name", "Dia"),
        ("accent_color", "#800020"),
        ("bg_color", "#ffffff"),
        ("country_label", "Türkiye"),
        (RSS_URL_KEY, ""),
        (FEED_URLS_KEY, ""),
        (CACHE_TTL_KEY, "120"),
        (MAX_ITEMS_KEY, "10"),
        (
            CATEGORY_WHITELIST_KEY,
            r#"["ekonomi","gundem","siyaset","politika"]"#,
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Converts an admin-submitted JSON object into string settings: strings are
/// kept verbatim, anything else is stored as its compact JSON text.
pub fn settings_from_json(values: serde_json::Map<String, Value>) -> SettingsMap {
    values
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct LocalSettingsStore {
    inner: Arc<RwLock<SettingsMap>>,
    path: Option<PathBuf>,
}

impl LocalSettingsStore {
    pub fn in_memory() -> Self {
        Self::with_values(default_settings())
    }

    pub fn with_values(values: SettingsMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(values)),
            path: None,
        }
    }

    /// Loads persisted settings over the defaults. A corrupt file falls back to
    /// the `.json.tmp` sibling left by an interrupted write, then to defaults.
    pub async fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut values = default_settings();
        values.extend(read_json_with_tmp_fallback(&path).await);
        Self {
            inner: Arc::new(RwLock::new(values)),
            path: Some(path),
        }
    }

    async fn persist(&self, values: &SettingsMap) -> Result<(), NewsError> {
        let Some(path) = &self.path else {
            debug!("settings store is in-memory only; skipping persist");
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(values)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for LocalSettingsStore {
    async fn snapshot(&self) -> Result<SettingsMap, NewsError> {
        Ok(self.inner.read().await.clone())
    }

    async fn update(&self, updates: SettingsMap) -> Result<SettingsMap, NewsError> {
        let mut inner = self.inner.write().await;
        inner.extend(updates);
        let snapshot = inner.clone();
        drop(inner);
        self.persist(&snapshot).await?;
        Ok(snapshot)
    }
}

async fn read_json_with_tmp_fallback(path: &Path) -> SettingsMap {
    match tokio::fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<SettingsMap>(&bytes) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to parse settings, trying tmp fallback");
                let tmp = path.with_extension("json.tmp");
                match tokio::fs::read(&tmp).await {
                    Ok(tmp_bytes) => serde_json::from_slice(&tmp_bytes).unwrap_or_default(),
                    Err(_) => SettingsMap::new(),
                }
            }
        },
        Err(_) => SettingsMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_are_stringified() {
        let values = json!({
            "news_max_items": 5,
            "news_feed_urls": ["http://a/feed"],
            "app_name": "Portal",
        });
        let Value::Object(values) = values else {
            unreachable!()
        };
        let settings = settings_from_json(values);
        assert_eq!(settings["news_max_items"], "5");
        assert_eq!(settings["news_feed_urls"], r#"["http://a/feed"]"#);
        assert_eq!(settings["app_name"], "Portal");
    }

    #[tokio::test]
    async fn in_memory_update_merges_over_defaults() {
        let store = LocalSettingsStore::in_memory();
        let mut updates = SettingsMap::new();
        updates.insert(MAX_ITEMS_KEY.to_string(), "3".to_string());
        let snapshot = store.update(updates).await.unwrap();
        assert_eq!(snapshot[MAX_ITEMS_KEY], "3");
        assert_eq!(snapshot[CACHE_TTL_KEY], "120");
    }
}
