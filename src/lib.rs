//! ferrite-gate: single-pass json conformance check that tells you where and
//! how your input breaks
//!
//! Nothing is decoded and no value tree is built; the input is walked once
//! and either accepted or rejected with the first violation found.
//!
//! ```
//! use ferrite_gate::{validate_str, validate_with, ValidatorOptions};
//!
//! assert!(validate_str(r#"{"name": "Alice", "age": 30}"#).is_ok());
//!
//! let err = validate_str(r#"{"name": "Alice",}"#).unwrap_err();
//! assert_eq!(err.help(), Some("remove the trailing comma"));
//!
//! let options = ValidatorOptions::default().with_scalar_root(true);
//! assert!(validate_with(b"-3.14", &options).is_ok());
//! ```

mod cursor;
pub mod error;
pub mod options;
pub mod validator;

pub use error::{ErrorKind, JsonError, Location};
pub use options::{ValidatorOptions, DEFAULT_MAX_DEPTH};
pub use validator::{validate, validate_str, validate_with};
