use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Origin prepended to relative links.
pub const LINK_ORIGIN: &str = "https://www.trthaber.com/";
/// Headline some providers emit in place of a real title.
pub const PLACEHOLDER_TITLE: &str = "son dakika";
pub const MAX_DERIVED_TITLE_CHARS: usize = 120;

pub const ID_FIELDS: &[&str] = &["haber_id"];
pub const TITLE_FIELDS: &[&str] = &[
    "title",
    "baslik",
    "Baslik",
    "headline",
    "icerikbasligi",
    "spot",
    "haber_manset",
];
pub const BODY_FIELDS: &[&str] = &[
    "description",
    "ozet",
    "spot",
    "icerik",
    "haber_aciklama",
    "summary",
    "content",
];
pub const IMAGE_FIELDS: &[&str] = &["enclosure.url", "resim", "image", "gorsel", "haber_resim"];
pub const DATE_FIELDS: &[&str] = &["pubDate", "tarih", "date", "published", "updated"];
pub const LINK_FIELDS: &[&str] = &["link", "url", "haber_link", "link.href"];

static CATEGORY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/haber/([^/]+)/").expect("category pattern is valid"));
static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("absolute url pattern is valid"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// One item of a feed document, flattened to field name -> text.
///
/// Child elements map by local name; their attributes map as `child.attr`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    fields: HashMap<String, String>,
}

impl RawItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first value seen for a key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// First non-blank value among `aliases`, trimmed.
    pub fn first_of(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.get(alias))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawItem {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut item = RawItem::new();
        for (key, value) in iter {
            item.insert(key, value);
        }
        item
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    /// Provider id or position within its own source; not unique across sources.
    pub id: i64,
    pub title: String,
    pub body: String,
    pub image_url: String,
    pub created_at: Option<String>,
    pub link: String,
    pub category: String,
}

impl NewsItem {
    /// Normalizes a raw item found at `index` in its source document.
    /// Returns `None` for items with neither a usable headline nor a body.
    pub fn from_raw(raw: &RawItem, index: usize) -> Option<Self> {
        let body = raw.first_of(BODY_FIELDS).unwrap_or_default().to_string();
        let title = match raw.first_of(TITLE_FIELDS) {
            Some(title) => title.to_string(),
            None => derive_title(&body),
        };

        let is_headline = !title.is_empty() && title.to_lowercase() != PLACEHOLDER_TITLE;
        if !is_headline && body.is_empty() {
            return None;
        }

        let link = absolutize_link(raw.first_of(LINK_FIELDS).unwrap_or_default());
        let category = category_of(&link);
        let id = raw
            .first_of(ID_FIELDS)
            .and_then(|id| id.parse::<i64>().ok())
            .unwrap_or(index as i64);

        Some(Self {
            id,
            title,
            body,
            image_url: raw.first_of(IMAGE_FIELDS).unwrap_or_default().to_string(),
            created_at: raw.first_of(DATE_FIELDS).map(ToOwned::to_owned),
            link,
            category,
        })
    }

    /// Milliseconds since the epoch, or 0 when `created_at` is missing or unparseable.
    pub fn timestamp_millis(&self) -> i64 {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(0)
    }

    /// Key used to collapse the same story fetched from overlapping sources.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.link, self.title.trim().to_lowercase())
    }
}

fn derive_title(body: &str) -> String {
    WHITESPACE
        .replace_all(body, " ")
        .chars()
        .take(MAX_DERIVED_TITLE_CHARS)
        .collect()
}

pub fn absolutize_link(link: &str) -> String {
    let link = link.trim();
    if link.is_empty() || ABSOLUTE_URL.is_match(link) {
        return link.to_string();
    }
    format!("{LINK_ORIGIN}{}", link.trim_start_matches('/'))
}

pub fn category_of(link: &str) -> String {
    CATEGORY_PATTERN
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|segment| segment.as_str().to_lowercase())
        .unwrap_or_default()
}

/// Best-effort date parsing; naive values are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    const NAIVE_DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
    ];

    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
