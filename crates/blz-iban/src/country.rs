//! # Country Layouts
//!
//! Each supported country describes its BBAN as a bank identifier followed
//! by an account number, both left-padded with zeros to a fixed width.
//!
//! | Country | Bank | Account | BBAN |
//! |---------|------|---------|------|
//! | `DE` | 8 digits | 10 digits | 18 |
//! | `AT` | 5 digits | 11 digits | 16 |
//! | `CH` | 5 digits | 12 digits | 17 |
//! | `NL` | 4 letters | 10 digits | 14 |
//!
//! Dispatch is a fixed table: [`strategy_for`] knows every implementation
//! at compile time.

use crate::error::IbanError;

/// BBAN construction for one country.
pub trait CountryStrategy: Send + Sync {
    /// ISO 3166 alpha-2 code.
    fn country_code(&self) -> &'static str;

    /// Width of the bank identifier.
    fn bank_length(&self) -> usize;

    /// Width of the account number.
    fn account_length(&self) -> usize;

    /// Whether the bank identifier is alphabetic instead of numeric.
    fn alphabetic_bank(&self) -> bool {
        false
    }

    /// BBAN length.
    fn bban_length(&self) -> usize {
        self.bank_length() + self.account_length()
    }

    /// Assemble the BBAN from a bank identifier and account number.
    ///
    /// # Errors
    ///
    /// Returns [`IbanError::BankIdentifier`] or [`IbanError::AccountNumber`]
    /// if either part has the wrong character class or does not fit.
    fn build_bban(&self, bank: &str, account: &str) -> Result<String, IbanError> {
        let country = self.country_code();
        let bank = bank.trim();
        let bank_ok = if self.alphabetic_bank() {
            bank.len() == self.bank_length() && bank.bytes().all(|b| b.is_ascii_uppercase())
        } else {
            !bank.is_empty() && bank.len() <= self.bank_length() && bank.bytes().all(|b| b.is_ascii_digit())
        };
        if !bank_ok {
            return Err(IbanError::BankIdentifier {
                country: country.to_string(),
                value: bank.to_string(),
            });
        }

        let account = account.trim();
        let significant = account.trim_start_matches('0');
        if account.is_empty()
            || significant.len() > self.account_length()
            || !account.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(IbanError::AccountNumber {
                country: country.to_string(),
                value: account.to_string(),
            });
        }

        Ok(format!(
            "{bank:0>bw$}{significant:0>aw$}",
            bw = self.bank_length(),
            aw = self.account_length(),
        ))
    }
}

/// Germany.
#[derive(Debug, Clone, Copy, Default)]
pub struct Germany;

impl CountryStrategy for Germany {
    fn country_code(&self) -> &'static str {
        "DE"
    }
    fn bank_length(&self) -> usize {
        8
    }
    fn account_length(&self) -> usize {
        10
    }
}

/// Austria.
#[derive(Debug, Clone, Copy, Default)]
pub struct Austria;

impl CountryStrategy for Austria {
    fn country_code(&self) -> &'static str {
        "AT"
    }
    fn bank_length(&self) -> usize {
        5
    }
    fn account_length(&self) -> usize {
        11
    }
}

/// Switzerland.
#[derive(Debug, Clone, Copy, Default)]
pub struct Switzerland;

impl CountryStrategy for Switzerland {
    fn country_code(&self) -> &'static str {
        "CH"
    }
    fn bank_length(&self) -> usize {
        5
    }
    fn account_length(&self) -> usize {
        12
    }
}

/// The Netherlands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Netherlands;

impl CountryStrategy for Netherlands {
    fn country_code(&self) -> &'static str {
        "NL"
    }
    fn bank_length(&self) -> usize {
        4
    }
    fn account_length(&self) -> usize {
        10
    }
    fn alphabetic_bank(&self) -> bool {
        true
    }
}

/// The layout registered for `country`, case-insensitively.
pub fn strategy_for(country: &str) -> Option<&'static dyn CountryStrategy> {
    match country.to_ascii_uppercase().as_str() {
        "DE" => Some(&Germany),
        "AT" => Some(&Austria),
        "CH" => Some(&Switzerland),
        "NL" => Some(&Netherlands),
        _ => None,
    }
}

/// Country codes with a registered layout.
pub const SUPPORTED_COUNTRIES: [&str; 4] = ["AT", "CH", "DE", "NL"];
