//! Error types shared by every domain in the crate.
//!
//! Two kinds of failure exist:
//!
//! - [`Error::InvalidArgument`]: a programmer error such as mixing values of
//!   different space dimensions, passing a zero divisor, or building a
//!   direction from the origin. It is returned synchronously and never caught
//!   internally.
//! - [`Error::MalformedInput`]: only produced by the `ascii_load` family, so a
//!   caller can recover from a bad dump.
//!
//! Arithmetic is exact (`BigInt`/`BigRational`), so there is no overflow class.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A precondition on the arguments of `method` was violated.
    #[error("{method}: {reason}")]
    InvalidArgument { method: &'static str, reason: String },

    /// Text passed to an `ascii_load` function could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn invalid_argument(method: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            method,
            reason: reason.into(),
        }
    }

    /// Dimension-incompatibility flavour of [`Error::InvalidArgument`].
    pub fn dimension_incompatible(method: &'static str, what: &str, expected: usize, found: usize) -> Self {
        Error::InvalidArgument {
            method,
            reason: format!("{} has space dimension {}, expected at most {}", what, found, expected),
        }
    }

    pub fn malformed(what: impl Into<String>) -> Self {
        Error::MalformedInput(what.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }
}

/// Fails with [`Error::InvalidArgument`] when `found > expected`.
pub(crate) fn check_dimension(method: &'static str, what: &str, expected: usize, found: usize) -> Result<()> {
    if found > expected {
        return Err(Error::dimension_incompatible(method, what, expected, found));
    }
    Ok(())
}

/// Fails with [`Error::InvalidArgument`] unless both dimensions are equal.
pub(crate) fn check_same_dimension(method: &'static str, what: &str, expected: usize, found: usize) -> Result<()> {
    if found != expected {
        return Err(Error::InvalidArgument {
            method,
            reason: format!("{} has space dimension {}, expected {}", what, found, expected),
        });
    }
    Ok(())
}
