//! The [`Iban`] newtype.

use serde::{Deserialize, Serialize};

use crate::checksum;
use crate::country::{strategy_for, CountryStrategy};
use crate::error::IbanError;

/// A verified IBAN in electronic form (no spaces, uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iban(String);

impl Iban {
    /// Parse and verify an IBAN. Spaces are ignored and letters are
    /// uppercased.
    ///
    /// # Errors
    ///
    /// - [`IbanError::Malformed`] for foreign characters or a misplaced
    ///   country code or check digits.
    /// - [`IbanError::UnsupportedCountry`] when no layout is registered.
    /// - [`IbanError::Length`] when the length does not match the layout.
    /// - [`IbanError::Checksum`] when the mod-97 check fails.
    pub fn parse(raw: &str) -> Result<Self, IbanError> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let malformed = || IbanError::Malformed(raw.trim().to_string());

        if compact.len() < 5 || !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(malformed());
        }
        let bytes = compact.as_bytes();
        if !bytes[..2].iter().all(u8::is_ascii_uppercase) || !bytes[2..4].iter().all(u8::is_ascii_digit) {
            return Err(malformed());
        }

        let country = &compact[..2];
        let strategy = strategy_for(country).ok_or_else(|| IbanError::UnsupportedCountry(country.to_string()))?;
        let expected = 4 + strategy.bban_length();
        if compact.len() != expected {
            return Err(IbanError::Length {
                country: country.to_string(),
                expected,
                actual: compact.len(),
            });
        }
        if !checksum::verify(&compact) {
            return Err(IbanError::Checksum(compact));
        }
        Ok(Self(compact))
    }

    /// Build an IBAN from its parts, computing the check digits.
    ///
    /// # Errors
    ///
    /// Any error of [`CountryStrategy::build_bban`].
    pub fn from_parts(strategy: &dyn CountryStrategy, bank: &str, account: &str) -> Result<Self, IbanError> {
        let bban = strategy.build_bban(bank, account)?;
        let country = strategy.country_code();
        let digits = checksum::check_digits(country, &bban).ok_or_else(|| IbanError::Malformed(bban.clone()))?;
        Ok(Self(format!("{country}{digits:02}{bban}")))
    }

    /// The electronic form.
    pub fn electronic(&self) -> &str {
        &self.0
    }

    /// Country code.
    pub fn country_code(&self) -> &str {
        &self.0[..2]
    }

    /// The two check digits.
    pub fn check_digits(&self) -> &str {
        &self.0[2..4]
    }

    /// The BBAN.
    pub fn bban(&self) -> &str {
        &self.0[4..]
    }
}

impl std::fmt::Display for Iban {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Iban {
    type Err = IbanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Iban {
    type Error = IbanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Iban> for String {
    fn from(iban: Iban) -> Self {
        iban.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::{Austria, Germany, Netherlands};

    #[test]
    fn parses_grouped_and_lowercase_input() {
        let iban = Iban::parse("de89 3704 0044 0532 0130 00").unwrap();
        assert_eq!(iban.electronic(), "DE89370400440532013000");
        assert_eq!(iban.country_code(), "DE");
        assert_eq!(iban.check_digits(), "89");
        assert_eq!(iban.bban(), "370400440532013000");
        assert_eq!(iban.to_string(), "DE89370400440532013000");
    }

    #[test]
    fn classifies_rejections() {
        assert!(matches!(Iban::parse("DE89-3704"), Err(IbanError::Malformed(_))));
        assert!(matches!(Iban::parse("1E89370400440532013000"), Err(IbanError::Malformed(_))));
        assert!(matches!(Iban::parse("GB82WEST12345698765432"), Err(IbanError::UnsupportedCountry(c)) if c == "GB"));
        assert!(matches!(
            Iban::parse("DE8937040044053201300"),
            Err(IbanError::Length { expected: 22, actual: 21, .. })
        ));
        assert!(matches!(Iban::parse("DE88370400440532013000"), Err(IbanError::Checksum(_))));
    }

    #[test]
    fn builds_from_parts() {
        assert_eq!(
            Iban::from_parts(&Germany, "37040044", "532013000").unwrap().electronic(),
            "DE89370400440532013000"
        );
        assert_eq!(
            Iban::from_parts(&Austria, "19043", "234573201").unwrap().electronic(),
            "AT611904300234573201"
        );
        assert_eq!(
            Iban::from_parts(&Netherlands, "ABNA", "417164300").unwrap().electronic(),
            "NL91ABNA0417164300"
        );
    }

    #[test]
    fn serde_validates() {
        let iban: Iban = serde_json::from_str("\"CH9300762011623852957\"").unwrap();
        assert_eq!(serde_json::to_string(&iban).unwrap(), "\"CH9300762011623852957\"");
        assert!(serde_json::from_str::<Iban>("\"CH9400762011623852957\"").is_err());
    }
}
