use linkhop_core::ShortUrlMapping;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortenResponse {
    /// The bare short code, not a full URL.
    pub short_url: String,
    pub original_url: String,
    pub user_id: i64,
}

impl ShortenResponse {
    pub fn new(mapping: ShortUrlMapping, user_id: i64) -> Self {
        Self {
            short_url: mapping.code.to_string(),
            original_url: mapping.original_url,
            user_id,
        }
    }
}
