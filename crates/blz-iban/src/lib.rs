//! # blz-iban — IBAN Construction and Verification
//!
//! - **Checksum** (`checksum.rs`): ISO 7064 mod 97-10 without big integers.
//! - **Countries** (`country.rs`): BBAN layouts behind the
//!   [`CountryStrategy`] trait, looked up with [`strategy_for`].
//! - **IBAN** (`iban.rs`): the verified [`Iban`] newtype.
//! - **Generator** (`generator.rs`): German IBANs for accounts that pass
//!   [`blz_checksum::AccountValidator`] in IBAN mode.

pub mod checksum;
pub mod country;
pub mod error;
pub mod generator;
pub mod iban;

pub use country::{strategy_for, CountryStrategy, Germany, SUPPORTED_COUNTRIES};
pub use error::IbanError;
pub use generator::IbanGenerator;
pub use iban::Iban;
