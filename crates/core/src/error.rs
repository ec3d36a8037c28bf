//! Errors raised while building a lot.

use thiserror::Error;

/// Configuration problems detected while laying out levels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LotError {
    /// Spot fractions outside `[0, 1]` or summing above 1.
    #[error("invalid spot mix: motorcycle {motorcycle}, car {car} (each must be in 0..=1 and sum to at most 1)")]
    InvalidMix {
        /// Requested motorcycle fraction.
        motorcycle: f64,
        /// Requested car fraction.
        car: f64,
    },
}
