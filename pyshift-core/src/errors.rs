//! Error types for `pyshift_core`.
//!
//! All Rust-side failures are funnelled through [`PyshiftError`], which
//! uses `thiserror` for `Display` and `Error` derives.  C ABI conversion
//! is handled in the `pyshift-ffi` crate, keeping this crate FFI-free.
//!
//! Conversion itself ([`crate::convert::Converter::convert`]) is total and
//! has no error path; these variants cover the construction and boundary
//! layers only.

use thiserror::Error;

/// Top-level error type for the `pyshift_core` library.
///
/// Each variant corresponds to a distinct subsystem.
#[derive(Debug, Error)]
pub enum PyshiftError {
    /// A rewrite-rule pattern failed to compile.
    #[error("PatternError: {0}")]
    PatternError(String),

    /// File read/write failure in the batch layer.
    #[error("IoError: {0}")]
    IoError(String),

    /// Input bytes were not valid UTF-8 text.
    #[error("EncodingError: {0}")]
    EncodingError(String),

    /// Source mixes Python 2 and Python 3 constructs.
    #[error("MixedSyntaxError: {0}")]
    MixedSyntaxError(String),
}

/// Convert a `regex::Error` (pattern compilation failure) into a
/// `PyshiftError::PatternError`.
impl From<regex::Error> for PyshiftError {
    fn from(err: regex::Error) -> Self {
        PyshiftError::PatternError(format!("pattern compilation failed: {err}"))
    }
}

impl From<std::io::Error> for PyshiftError {
    fn from(err: std::io::Error) -> Self {
        PyshiftError::IoError(err.to_string())
    }
}
