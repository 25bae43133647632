//! Cache implementations shared across Linkhop services.

pub mod moka;
pub mod redis;

pub use self::moka::MokaUrlCache;
pub use self::redis::RedisUrlCache;
