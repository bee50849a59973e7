use std::collections::HashSet;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::error::NewsError;
use crate::feed::NewsItem;
use crate::fetcher::FeedFetcher;
use crate::parser::parse_document;
use crate::settings::NewsSettings;

/// Runs one aggregation cycle: fetch every source concurrently, normalize,
/// merge in source order, then dedup, filter, sort and cap.
///
/// A failing source contributes nothing; the cycle itself never fails.
pub async fn aggregate(fetcher: &dyn FeedFetcher, settings: &NewsSettings) -> Vec<NewsItem> {
    let fetches = settings
        .sources
        .iter()
        .map(|url| async move { (url, collect_source(fetcher, url).await) });

    let mut merged = Vec::new();
    let mut healthy_sources = 0usize;
    for (url, result) in join_all(fetches).await {
        match result {
            Ok(items) => {
                debug!(url = %url, count = items.len(), "source normalized");
                healthy_sources += 1;
                merged.extend(items);
            }
            Err(err) => {
                warn!(url = %url, error = %err, "skipping feed source");
            }
        }
    }

    let items = finalize(merged, settings);
    info!(
        sources = settings.sources.len(),
        healthy_sources,
        items = items.len(),
        "news aggregation cycle finished"
    );
    items
}

async fn collect_source(fetcher: &dyn FeedFetcher, url: &str) -> Result<Vec<NewsItem>, NewsError> {
    let text = fetcher.fetch(url).await?;
    let raw_items = parse_document(&text)?;
    Ok(raw_items
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| NewsItem::from_raw(raw, index))
        .collect())
}

/// Merge steps applied after every source has been normalized.
pub fn finalize(items: Vec<NewsItem>, settings: &NewsSettings) -> Vec<NewsItem> {
    let items = dedup(items);
    let items = filter_categories(items, settings);
    let mut items = sort_newest_first(items);
    items.truncate(settings.max_items);
    items
}

/// First occurrence of each link+title pair wins.
pub fn dedup(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.dedup_key()))
        .collect()
}

pub fn filter_categories(items: Vec<NewsItem>, settings: &NewsSettings) -> Vec<NewsItem> {
    items
        .into_iter()
        .filter(|item| settings.allows_category(&item.category))
        .collect()
}

/// Stable: equal timestamps, including unparseable ones, keep insertion order.
pub fn sort_newest_first(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut keyed: Vec<(i64, NewsItem)> = items
        .into_iter()
        .map(|item| (item.timestamp_millis(), item))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}
