//! # holevm-error
//!
//! The single error type shared by every holevm crate.
//!
//! An [`Error`] answers three questions for its caller:
//! - which failure it is ([`ErrorKind`]), so callers can branch on it
//! - whether trying again could help ([`ErrorStatus`])
//! - where it happened (`operation`, the `called` chain and context pairs)
//!
//! Lower-level errors (IO, serde, task joins) are wrapped with
//! [`Error::set_source`] rather than exposed.
//!
//! ```rust
//! use holevm_error::{Error, ErrorKind};
//!
//! fn resolve() -> holevm_error::Result<i64> {
//!     Err(Error::new(ErrorKind::UnassignedHole, "hole '?c' has no value")
//!         .with_operation("interpreter::step")
//!         .with_context("ip", "8"))
//! }
//!
//! assert!(resolve().unwrap_err().is_execution_failure());
//! ```
//!
//! A wrong answer from an agent is not an error: rejections and failed cases
//! are values in the evaluation report.

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

pub type Result<T> = std::result::Result<T, Error>;
