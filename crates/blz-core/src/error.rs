//! # Error Hierarchy
//!
//! Structured input-validation errors, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! A checksum that does not match is *not* an error: it is reported through
//! [`ResultCode`](crate::ResultCode). The variants here only describe input
//! that could not be turned into a domain primitive at all, and every one of
//! them surfaces to callers as [`ResultCode::WrongValue`](crate::ResultCode::WrongValue).

use thiserror::Error;

use crate::ResultCode;

/// Validation errors for domain primitive newtypes.
///
/// Each variant carries the rejected input so that operators can diagnose
/// bad data files without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account number is empty, contains non-digits, or has more than
    /// ten significant digits.
    #[error("invalid account number: \"{0}\" (expected up to 10 digits)")]
    InvalidAccount(String),

    /// Bank code is not an 8-digit number with a non-zero first digit.
    #[error("invalid bank code: \"{0}\" (expected 8 digits, first digit 1-9)")]
    InvalidBankCode(String),

    /// Method identifier does not look like `00`..`99`, `A0`..`E9`, or a
    /// lettered sub-variant such as `51a`.
    #[error("invalid checksum method identifier: \"{0}\"")]
    InvalidMethodId(String),
}

impl ValidationError {
    /// The result code this error surfaces as in a validation verdict.
    pub fn result_code(&self) -> ResultCode {
        ResultCode::WrongValue
    }
}
