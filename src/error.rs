//! Error types for chromaflow

use thiserror::Error;

/// Result type for chromaflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building or running a conversion
///
/// Every variant except [`Error::Disposed`] surfaces at construction time;
/// `convert()` itself performs no validation beyond the disposed check.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required argument was absent or empty
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Planning cannot bridge the two bound spaces
    #[error("conversion setup failed: {0}")]
    ConversionSetup(String),

    /// The profile's declared tags are inconsistent
    #[error("ICC profile invariant violated: {0}")]
    IccProfileInvariant(String),

    /// Operation invoked on a disposed converter
    #[error("converter has been disposed")]
    Disposed,
}

impl Error {
    /// Shorthand for a `ConversionSetup` error with a formatted message
    pub(crate) fn setup(msg: impl Into<String>) -> Self {
        Error::ConversionSetup(msg.into())
    }

    /// Shorthand for an `IccProfileInvariant` error with a formatted message
    pub(crate) fn profile(msg: impl Into<String>) -> Self {
        Error::IccProfileInvariant(msg.into())
    }
}
