use crate::error::ShortenerError;
use crate::repository::ShortUrlMapping;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// The requesting user. Echoed back, not persisted.
    pub user_id: i64,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns the persisted mapping.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortUrlMapping>;
}
