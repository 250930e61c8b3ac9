/// Error types for license signing, verification and serving
use thiserror::Error;

/// License errors.
///
/// A signature that does not match is not an error: `verify` reports it as
/// `false` so callers can tell a tampered license from a malformed request.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Empty secret, or a record missing `id`, `valid_from` or `valid_until`.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A canonicalized field contains the newline separator.
    #[error("field `{field}` contains a newline and cannot be signed")]
    UnsafeFieldValue { field: String },

    /// The transport envelope could not be decoded into an assertion.
    #[error("malformed license assertion: {0}")]
    MalformedAssertion(String),

    /// `valid_from` or `valid_until` is not a `%Y-%m-%d` date.
    #[error("invalid date `{0}`")]
    InvalidDate(String),

    /// Server configuration is missing or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote validation could not reach the license server.
    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
