//! # Bank Codes
//!
//! German bank codes ("Bankleitzahl", BLZ) are eight digits. The first digit
//! is the clearing area and is never zero. Positions 5-8 matter to the
//! checksum engine: the historical-reconstruction methods (52, 53, B6, C0)
//! rebuild legacy savings-bank account numbers from them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of digits in a bank code.
pub const BANK_CODE_LENGTH: usize = 8;

/// A validated 8-digit German bank code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BankCode(u32);

impl BankCode {
    /// Parse a bank code from its digit string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidBankCode`] unless the input is
    /// exactly eight ASCII digits with a non-zero first digit.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let bytes = raw.as_bytes();
        if bytes.len() != BANK_CODE_LENGTH
            || !bytes.iter().all(|b| b.is_ascii_digit())
            || bytes[0] == b'0'
        {
            return Err(ValidationError::InvalidBankCode(raw.to_string()));
        }
        raw.parse::<u32>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidBankCode(raw.to_string()))
    }

    /// Build a bank code from its integer value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidBankCode`] if the value does not
    /// have exactly eight digits.
    pub fn from_u32(value: u32) -> Result<Self, ValidationError> {
        if (10_000_000..=99_999_999).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidBankCode(value.to_string()))
        }
    }

    /// The integer value of the bank code.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// The eight digits, most significant first.
    pub fn digits(&self) -> [u8; BANK_CODE_LENGTH] {
        let mut out = [0u8; BANK_CODE_LENGTH];
        let mut rest = self.0;
        for slot in out.iter_mut().rev() {
            *slot = (rest % 10) as u8;
            rest /= 10;
        }
        out
    }
}

impl std::fmt::Display for BankCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

impl std::str::FromStr for BankCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BankCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BankCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_eight_digits() {
        let code = BankCode::parse("13051172").unwrap();
        assert_eq!(code.as_u32(), 13_051_172);
        assert_eq!(code.digits(), [1, 3, 0, 5, 1, 1, 7, 2]);
        assert_eq!(code.to_string(), "13051172");
    }

    #[test]
    fn rejects_wrong_shapes() {
        for raw in ["", "1305117", "130511722", "0305117 ", "03051172", "1305x172"] {
            assert!(BankCode::parse(raw).is_err(), "{raw:?} must be rejected");
        }
    }

    #[test]
    fn from_u32_enforces_width() {
        assert!(BankCode::from_u32(50_010_517).is_ok());
        assert!(BankCode::from_u32(9_999_999).is_err());
        assert!(BankCode::from_u32(100_000_000).is_err());
    }

    #[test]
    fn serde_round_trip_uses_strings() {
        let code = BankCode::parse("50010517").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"50010517\"");
        let back: BankCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<BankCode>("\"00000000\"").is_err());
    }
}
