//! # neurorf-error
//!
//! Unified error handling for NeuroRF.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., MissingField, RateLimited)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use neurorf_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::missing_field("tasks")
//!         .with_operation("response::validate")
//!         .with_context("request_id", "req-42"))
//! }
//!
//! let err = example().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::MissingField);
//! assert_eq!(err.field(), Some("tasks"));
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, neurorf_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - A response that fails validation is never repaired or substituted

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using NeuroRF Error
pub type Result<T> = std::result::Result<T, Error>;
