//! Core types and traits for the Linkhop URL shortener.
//!
//! This crate provides the shared domain model (short codes, mappings,
//! visits) and the storage seams used by both the shortener service and
//! the redirector service.

pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::{CachedUrl, UrlCache, CACHE_TTL};
pub use error::{CacheError, CoreError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, ShortUrlMapping, Visit, VisitRepository};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, Shortener};
