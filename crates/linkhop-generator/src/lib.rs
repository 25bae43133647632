pub mod random;

use linkhop_core::ShortCode;

pub use random::RandomGenerator;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Generated codes are not guaranteed to be unique; the caller resolves
/// collisions against the store's uniqueness constraint.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Generates a candidate short code.
    fn generate(&self) -> Self::Output;
}
