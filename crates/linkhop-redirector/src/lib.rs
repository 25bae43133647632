//! Redirector service library with cache-aside resolution.
//!
//! This crate provides a [`RedirectorService`] that resolves short codes to
//! their original URLs. Lookups consult a [`UrlCache`] first and fall back
//! to a [`ReadRepository`] on a miss, repopulating the cache afterwards.
//! Cache failures never fail a resolution; durable store failures do.
//!
//! # Example with Moka (in-memory)
//!
//! ```rust
//! use linkhop_cache::MokaUrlCache;
//! use linkhop_core::ShortCode;
//! use linkhop_redirector::{Redirector, RedirectorService};
//! use linkhop_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedirectorService::new(InMemoryRepository::new(), MokaUrlCache::new());
//!
//! let code = ShortCode::parse("abc123")?;
//! if let Some(resolution) = service.resolve(&code).await? {
//!     println!("Redirect to: {}", resolution.original_url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`UrlCache`]: linkhop_core::UrlCache
//! [`ReadRepository`]: linkhop_core::ReadRepository

pub mod redirector;
pub mod service;

pub use redirector::{Redirector, RedirectorError, Resolution, ResolutionSource};
pub use service::RedirectorService;

/// Type alias for redirector results.
pub type Result<T> = std::result::Result<T, RedirectorError>;
