//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`], which mints short codes with a
//! [`Generator`](linkhop_generator::Generator) and persists them through a
//! [`Repository`](linkhop_core::Repository). Core types are re-exported from
//! `linkhop_core`.

pub mod service;

pub use linkhop_core::{ShortenParams, Shortener, ShortenerError};
pub use service::{ShortenerService, DEFAULT_MAX_ATTEMPTS};
