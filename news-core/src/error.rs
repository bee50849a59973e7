use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported feed url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("feed document parsing error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no configuration directory available on this system")]
    ConfigDirUnavailable,
}
