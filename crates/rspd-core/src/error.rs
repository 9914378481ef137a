//! Error types for rspd-core
//!
//! Decoding never fails: invalid or truncated images decode to degraded
//! structures (see [`crate::spd`]). Errors are reserved for the encode path,
//! where an edit can reference a profile that does not exist.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The image carries no XMP signature and the edit did not request
    /// profile creation
    XmpNotPresent,
    /// The edited profile's voltage byte marks it disabled and the edit did
    /// not request profile creation
    ProfileNotPresent,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XmpNotPresent => write!(f, "image has no XMP signature"),
            Self::ProfileNotPresent => write!(f, "XMP profile is not present"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
