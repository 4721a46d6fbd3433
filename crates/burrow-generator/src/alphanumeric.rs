use crate::Generator;
use burrow_core::ShortCode;
use rand::Rng;

/// The alphabet random codes are drawn from.
pub const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_LENGTH: usize = 6;

/// Generates random codes of a fixed length from [`CHARSET`].
///
/// Characters are drawn uniformly using the thread-local CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct AlphanumericGenerator {
    length: usize,
}

impl AlphanumericGenerator {
    /// # Panics
    ///
    /// Panics if `length` is zero.
    pub fn new(length: usize) -> Self {
        assert!(length > 0, "short code length must be positive");
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for AlphanumericGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH)
    }
}

impl Generator for AlphanumericGenerator {
    fn generate(&self) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();
        ShortCode::new_unchecked(code)
    }
}
