//! Short code generators.
//!
//! Generators are pure: they never look at storage. A generated code that is
//! already taken surfaces as a `Conflict` from the repository, and retrying is
//! the caller's decision.

pub mod alphanumeric;
pub mod seq;

pub use alphanumeric::AlphanumericGenerator;
pub use seq::SeqGenerator;

use burrow_core::ShortCode;

/// Trait for generating candidate short codes.
pub trait Generator: Send + Sync + 'static {
    /// Produces the next candidate short code.
    fn generate(&self) -> ShortCode;
}

impl<G: Generator + ?Sized> Generator for std::sync::Arc<G> {
    fn generate(&self) -> ShortCode {
        (**self).generate()
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&self) -> ShortCode {
        (**self).generate()
    }
}
