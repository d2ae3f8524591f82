use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("no application handles url: {0}")]
    NoHandler(String),
    #[error("failed to open url: {0}")]
    Failed(String),
}

/// The host platform's ability to hand a URL to another application.
#[async_trait]
pub trait UrlOpener {
    async fn open_url(&self, url: &str) -> Result<(), OpenError>;

    async fn can_open_url(&self, url: &str) -> bool;
}
