//! # Account Normalization
//!
//! Parses digit-only account strings into the fixed 10-digit representation
//! consumed by every checksum kernel.
//!
//! ## Representation
//!
//! ```text
//! "446786040"  ->  [0, 4, 4, 6, 7, 8, 6, 0, 4, 0]
//!                   ^ leading_zeros = 1, digit_count = 9
//! ```
//!
//! Positions in the German checksum rules are 1-based ("Stelle 1".."Stelle
//! 10"); the array here is 0-based, so rule position `p` is index `p - 1`.
//!
//! The value `0` is legal. Almost every method is probed with it, and most
//! reject it, but that is a checksum verdict, not a parse failure.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of digits in a normalized account number.
pub const ACCOUNT_LENGTH: usize = 10;

/// Largest account value that fits into ten digits.
pub const MAX_ACCOUNT_VALUE: u64 = 9_999_999_999;

/// A validated account number, left-zero-padded to ten digits.
///
/// # Invariants
///
/// - `digits` always holds exactly [`ACCOUNT_LENGTH`] decimal digits.
/// - `value` is the integer the digits spell.
/// - `digit_count` is the length of the decimal representation of `value`
///   (`1` for the value zero), so `leading_zeros() == 10 - digit_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountDigits {
    digits: [u8; ACCOUNT_LENGTH],
    digit_count: usize,
    value: u64,
}

impl AccountDigits {
    /// Parse a digit-only account string.
    ///
    /// Leading zeros are accepted in any number; at most ten significant
    /// digits may follow them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAccount`] for empty input, any
    /// non-digit character, or more than ten significant digits.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidAccount(raw.to_string()));
        }
        let significant = raw.trim_start_matches('0');
        if significant.len() > ACCOUNT_LENGTH {
            return Err(ValidationError::InvalidAccount(raw.to_string()));
        }
        let value = if significant.is_empty() {
            0
        } else {
            significant
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidAccount(raw.to_string()))?
        };
        Self::from_value(value)
    }

    /// Build from an integer account value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAccount`] if the value exceeds
    /// [`MAX_ACCOUNT_VALUE`].
    pub fn from_value(value: u64) -> Result<Self, ValidationError> {
        if value > MAX_ACCOUNT_VALUE {
            return Err(ValidationError::InvalidAccount(value.to_string()));
        }
        let mut digits = [0u8; ACCOUNT_LENGTH];
        let mut rest = value;
        for slot in digits.iter_mut().rev() {
            *slot = (rest % 10) as u8;
            rest /= 10;
        }
        Ok(Self::from_digit_array(digits))
    }

    /// Build from an already padded digit array.
    ///
    /// Every element is reduced modulo 10, so callers rewriting individual
    /// positions cannot break the decimal invariant.
    pub fn from_digit_array(digits: [u8; ACCOUNT_LENGTH]) -> Self {
        let mut normalized = [0u8; ACCOUNT_LENGTH];
        let mut value = 0u64;
        for (slot, d) in normalized.iter_mut().zip(digits) {
            *slot = d % 10;
            value = value * 10 + u64::from(*slot);
        }
        let leading = normalized.iter().take_while(|d| **d == 0).count();
        let digit_count = (ACCOUNT_LENGTH - leading).max(1);
        Self {
            digits: normalized,
            digit_count,
            value,
        }
    }

    /// The ten digits, most significant first.
    pub fn digits(&self) -> &[u8; ACCOUNT_LENGTH] {
        &self.digits
    }

    /// The digit at 0-based `index`. Out-of-range indices read as zero.
    pub fn digit(&self, index: usize) -> u8 {
        self.digits.get(index).copied().unwrap_or(0)
    }

    /// Digits in the decimal representation of the account value.
    pub fn digit_count(&self) -> usize {
        self.digit_count
    }

    /// Number of padding zeros in front of the significant digits.
    pub fn leading_zeros(&self) -> usize {
        ACCOUNT_LENGTH - self.digit_count
    }

    /// The integer account value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Whether the account value lies in the inclusive range `[low, high]`.
    pub fn in_range(&self, low: u64, high: u64) -> bool {
        (low..=high).contains(&self.value)
    }

    /// The leading `n` digits interpreted as an integer.
    pub fn prefix(&self, n: usize) -> u64 {
        self.digits
            .iter()
            .take(n.min(ACCOUNT_LENGTH))
            .fold(0, |acc, d| acc * 10 + u64::from(*d))
    }
}

impl std::fmt::Display for AccountDigits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in self.digits {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for AccountDigits {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountDigits {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountDigits> for String {
    fn from(account: AccountDigits) -> Self {
        account.to_string()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing the display form reproduces the same account.
        #[test]
        fn display_parse_is_stable(value in 0u64..=MAX_ACCOUNT_VALUE) {
            let acc = AccountDigits::from_value(value).unwrap();
            let back = AccountDigits::parse(&acc.to_string()).unwrap();
            prop_assert_eq!(acc, back);
            prop_assert_eq!(acc.leading_zeros() + acc.digit_count(), ACCOUNT_LENGTH);
        }
    }
}
