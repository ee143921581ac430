//! NeuroRF core error types
//!
//! Re-exports neurorf-error and provides domain-specific conveniences.

pub use neurorf_error::{Error, ErrorKind, ErrorStatus, Result};

// =============================================================================
// Response contract constructors
// =============================================================================

/// Create a MalformedResponse error
pub fn malformed_response(message: impl Into<String>) -> Error {
    Error::malformed_response(message)
}

/// Create a MissingField error
pub fn missing_field(field: impl Into<String>) -> Error {
    Error::missing_field(field)
}

/// Create an InvalidValue error
pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Error {
    Error::invalid_value(field, reason)
}

// =============================================================================
// Other constructors
// =============================================================================

/// Create a ConfigInvalid error for an unset environment variable
pub fn missing_env(var: &'static str) -> Error {
    Error::config_invalid(format!("{} not found. Set it in .env or environment variables.", var))
        .with_context("var", var)
}

/// Create an InvalidArgument error
pub fn invalid_argument(message: impl Into<String>) -> Error {
    Error::invalid_argument(message)
}

/// Create a non-positive frequency error for antenna construction
pub fn invalid_frequency(frequency_hz: f64) -> Error {
    Error::invalid_argument(format!("frequency must be positive and finite, got {}", frequency_hz))
        .with_context("frequency_hz", frequency_hz.to_string())
}

/// Create a CadSessionFailed error
pub fn cad_session_failed(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::CadSessionFailed, message)
}
