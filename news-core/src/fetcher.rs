use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use crate::error::NewsError;

pub const FEED_ACCEPT: &str = "application/xml,text/xml,*/*";

/// Retrieves the raw text of one feed source.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, NewsError>;
}

#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFeedFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, NewsError> {
        let url = feed_url(url)?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, FEED_ACCEPT)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(NewsError::HttpStatus(status.as_u16()));
        }
        Ok(text)
    }
}

/// Only plain HTTP(S) sources are fetched.
pub fn feed_url(raw: &str) -> Result<Url, NewsError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(NewsError::UnsupportedScheme(other.to_string())),
    }
}

/// Raw upstream response forwarded untouched by the XML pass-through route.
#[derive(Debug, Clone)]
pub struct ProxiedDocument {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

pub async fn proxy_document(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<ProxiedDocument, NewsError> {
    let response = client
        .get(feed_url(url)?)
        .header(ACCEPT, FEED_ACCEPT)
        .timeout(timeout)
        .send()
        .await?;
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.contains("xml"))
        .unwrap_or("application/xml")
        .to_string();
    let body = response.text().await?;
    Ok(ProxiedDocument {
        status,
        content_type,
        body,
    })
}
