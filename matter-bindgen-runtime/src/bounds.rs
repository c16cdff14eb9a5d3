//! Scalar argument validation at the binding boundary.
//!
//! Every scalar binding argument carries the closed numeric range its IDL
//! type declares. An out-of-range value is rejected before any encoding, so
//! a caller can never silently truncate.

use crate::error::ArgumentRangeError;

/// Closed numeric bounds of one scalar argument. `i128` covers the full
/// `u64`/`i64` value spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarBounds {
    pub min: i128,
    pub max: i128,
}

impl ScalarBounds {
    pub const fn new(min: i128, max: i128) -> Self {
        Self { min, max }
    }

    /// Validate one value. Boundary values are accepted.
    pub fn check(&self, argument: &str, value: i128) -> Result<(), ArgumentRangeError> {
        if value < self.min || value > self.max {
            return Err(ArgumentRangeError {
                argument: argument.into(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn check_unsigned(&self, argument: &str, value: u64) -> Result<(), ArgumentRangeError> {
        self.check(argument, value as i128)
    }

    pub fn check_signed(&self, argument: &str, value: i64) -> Result<(), ArgumentRangeError> {
        self.check(argument, value as i128)
    }
}
