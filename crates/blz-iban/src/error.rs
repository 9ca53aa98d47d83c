//! # IBAN Errors

use blz_core::ResultCode;
use thiserror::Error;

/// Error building or parsing an IBAN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IbanError {
    /// No BBAN layout is registered for the country.
    #[error("unsupported country: \"{0}\"")]
    UnsupportedCountry(String),

    /// The input contains characters an IBAN cannot hold, or the country
    /// code or check digits are not where they belong.
    #[error("malformed IBAN: \"{0}\"")]
    Malformed(String),

    /// The IBAN length does not match the country layout.
    #[error("{country} IBAN must have {expected} characters, got {actual}")]
    Length {
        /// Country code.
        country: String,
        /// Length required by the layout.
        expected: usize,
        /// Length found.
        actual: usize,
    },

    /// The mod-97 check failed.
    #[error("check digits do not match: \"{0}\"")]
    Checksum(String),

    /// The bank identifier does not fit the country layout.
    #[error("invalid bank identifier for {country}: \"{value}\"")]
    BankIdentifier {
        /// Country code.
        country: String,
        /// Rejected bank identifier.
        value: String,
    },

    /// The account number does not fit the country layout.
    #[error("invalid account number for {country}: \"{value}\"")]
    AccountNumber {
        /// Country code.
        country: String,
        /// Rejected account number.
        value: String,
    },

    /// The account failed checksum validation.
    #[error("account rejected by checksum validation: {0}")]
    InvalidAccount(ResultCode),
}
