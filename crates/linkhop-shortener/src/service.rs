use async_trait::async_trait;
use linkhop_core::{
    Repository, ShortCode, ShortUrlMapping, ShortenParams, Shortener, ShortenerError, StorageError,
};
use linkhop_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of codes tried before giving up on a shorten request.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// A concrete implementation of the [`Shortener`] trait.
///
/// This service wraps a [`Repository`] and a [`Generator`] to handle:
/// - URL validation
/// - Short code generation
/// - Collision retry against the repository's uniqueness constraint
///
/// Nothing is written to the cache here; a new mapping enters the cache on
/// its first resolution.
#[derive(Debug, Clone)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    max_attempts: usize,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` that tries up to
    /// [`DEFAULT_MAX_ATTEMPTS`] codes per request.
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the number of codes tried per request. Values below 1 are
    /// treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        // The URL is sent back verbatim as a `Location` header, which only
        // admits tab among the control bytes.
        if url.bytes().any(|b| (b < 0x20 && b != b'\t') || b == 0x7f) {
            return Err(ShortenerError::InvalidUrl(
                "URL contains control characters".to_string(),
            ));
        }

        Ok(())
    }

    fn generate_code(&self) -> ShortCode {
        self.generator.generate().into()
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortUrlMapping, ShortenerError> {
        Self::validate_url(&params.original_url)?;

        for attempt in 1..=self.max_attempts {
            let code = self.generate_code();
            debug!(code = %code, attempt, "trying generated short code");

            match self.repository.insert(&code, &params.original_url).await {
                Ok(mapping) => {
                    info!(
                        code = %mapping.code,
                        id = mapping.id,
                        user_id = params.user_id,
                        "created short url"
                    );
                    return Ok(mapping);
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(
                        code = %code,
                        attempt,
                        max_attempts = self.max_attempts,
                        "generated short code already taken"
                    );
                }
                Err(e) => return Err(ShortenerError::Storage(e)),
            }
        }

        warn!(
            max_attempts = self.max_attempts,
            "could not persist new short url, every generated code collided"
        );
        Err(ShortenerError::ExhaustedRetries(self.max_attempts))
    }
}
