//! # Validation Results
//!
//! Every validation call produces exactly one [`ResultCode`]. Only `Ok` and
//! `NoChecksum` count as valid.
//!
//! | Code | Valid | Meaning |
//! |------|-------|---------|
//! | `Ok` | yes | The check digit matched (primary or a fallback variant). |
//! | `NoChecksum` | yes | The method or an exception range defines no check digit. |
//! | `NoMethod` | no | No method is registered for the identifier or bank code. |
//! | `BadAccount` | no | Every applicable variant rejected the check digit. |
//! | `WrongValue` | no | The input was not a well-formed account or bank code. |

use serde::{Deserialize, Serialize};

use crate::MethodId;

/// Classification of a single validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    /// The check digit is correct.
    Ok,
    /// No check digit is defined for this account; treated as valid.
    NoChecksum,
    /// No checksum method could be resolved.
    NoMethod,
    /// The check digit is wrong under every applicable variant.
    BadAccount,
    /// The input could not be parsed.
    WrongValue,
}

impl ResultCode {
    /// Whether the code denotes a valid account.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Ok | Self::NoChecksum)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NoChecksum => "no_checksum",
            Self::NoMethod => "no_method",
            Self::BadAccount => "bad_account",
            Self::WrongValue => "wrong_value",
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one checksum method against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the account is valid under the method.
    pub valid: bool,
    /// The result classification.
    pub code: ResultCode,
    /// The method or sub-variant that produced the verdict, if one ran.
    pub method: Option<MethodId>,
    /// 0-based index of the check digit that was compared, or `None`
    /// when no checksum applied.
    pub check_position: Option<usize>,
}

impl Verdict {
    /// The check digit matched at `position`.
    pub fn ok(method: MethodId, position: usize) -> Self {
        Self {
            valid: true,
            code: ResultCode::Ok,
            method: Some(method),
            check_position: Some(position),
        }
    }

    /// The account carries no check digit under `method`.
    pub fn no_checksum(method: MethodId) -> Self {
        Self {
            valid: true,
            code: ResultCode::NoChecksum,
            method: Some(method),
            check_position: None,
        }
    }

    /// The check digit at `position` did not match.
    pub fn bad_account(method: MethodId, position: Option<usize>) -> Self {
        Self {
            valid: false,
            code: ResultCode::BadAccount,
            method: Some(method),
            check_position: position,
        }
    }

    /// No method could be resolved.
    pub fn no_method(method: Option<MethodId>) -> Self {
        Self {
            valid: false,
            code: ResultCode::NoMethod,
            method,
            check_position: None,
        }
    }

    /// The input was malformed.
    pub fn wrong_value() -> Self {
        Self {
            valid: false,
            code: ResultCode::WrongValue,
            method: None,
            check_position: None,
        }
    }
}
