//! # stowage-errors
//!
//! Error types for the stowage object layer.
//!
//! ## Key Types
//!
//! - [`ObjectError`] - Closed set of object layer failures
//! - [`Wrapped`] - Context layered on top of another error
//!
//! ## Cause Chains
//!
//! Errors are frequently wrapped with context on their way up the call
//! stack. [`root_cause`] walks `source()` back down to the error that
//! started it, which is what logging and classification look at.
//!
//! ```rust,ignore
//! use stowage_errors::{root_cause, ObjectError, ResultExt};
//!
//! let res: Result<(), ObjectError> = Err(ObjectError::BucketNotFound {
//!     bucket: "photos".into(),
//! });
//! let err = res.wrap_err("listing objects").unwrap_err();
//! assert_eq!(root_cause(&err).to_string(), "Bucket not found: photos");
//! ```

mod cause;
mod object;

pub use cause::{root_cause, BoxError, ResultExt, Wrapped};
pub use object::ObjectError;
