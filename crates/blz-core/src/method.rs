//! # Checksum Method Identifiers
//!
//! The Bundesbank assigns every bank code one of roughly 150 check digit
//! calculation methods ("Prüfzifferberechnungsmethoden"), named `00`..`99`
//! followed by `A0`..`E4`. Fallback stages additionally address lettered
//! sub-variants such as `51a` or `90g`; those never appear in master data.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A checksum method identifier: two characters, optionally followed by a
/// lowercase sub-variant letter.
///
/// The first character is a digit or an uppercase letter `A`-`E`; lowercase
/// input is normalized. The second character is a digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(String);

impl MethodId {
    /// Create a method identifier, validating and normalizing its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMethodId`] if the string is not a
    /// two-character base identifier with an optional sub-variant letter.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref().trim();
        let chars: Vec<char> = raw.chars().collect();
        let valid = match chars.as_slice() {
            [a, b] => Self::valid_base(*a, *b),
            [a, b, v] => Self::valid_base(*a, *b) && v.is_ascii_alphabetic(),
            _ => false,
        };
        if !valid {
            return Err(ValidationError::InvalidMethodId(raw.to_string()));
        }
        let mut normalized = String::with_capacity(3);
        normalized.push(chars[0].to_ascii_uppercase());
        normalized.push(chars[1]);
        if let Some(v) = chars.get(2) {
            normalized.push(v.to_ascii_lowercase());
        }
        Ok(Self(normalized))
    }

    fn valid_base(first: char, second: char) -> bool {
        let first_ok = first.is_ascii_digit() || ('A'..='E').contains(&first.to_ascii_uppercase());
        first_ok && second.is_ascii_digit()
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-character base identifier (`"51"` for `"51a"`).
    pub fn base(&self) -> &str {
        &self.0[..2]
    }

    /// Whether this is a lettered fallback-only sub-variant.
    pub fn is_variant(&self) -> bool {
        self.0.len() == 3
    }
}

// Hash and Eq derive from the inner `String`, which agree with `str`.
impl std::borrow::Borrow<str> for MethodId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for MethodId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for MethodId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MethodId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
