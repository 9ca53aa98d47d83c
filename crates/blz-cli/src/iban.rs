//! # IBAN CLI — Generate and verify IBANs.
//!
//! ```bash
//! blz iban 37040044 0532013000
//! blz verify-iban "DE89 3704 0044 0532 0130 00"
//! ```

use anyhow::Result;
use blz_iban::{Iban, IbanError, IbanGenerator};
use clap::Args;

use crate::build_validator;
use crate::config::Config;

/// Arguments of `blz iban`.
#[derive(Args, Debug)]
pub struct IbanArgs {
    /// Bank code (8 digits).
    pub bank_code: String,

    /// Account number (up to 10 digits).
    pub account: String,
}

/// Arguments of `blz verify-iban`.
#[derive(Args, Debug)]
pub struct VerifyIbanArgs {
    /// IBAN, with or without spaces.
    pub iban: String,
}

/// Execute `blz iban`.
pub fn run_iban(args: &IbanArgs, config: &Config) -> Result<u8> {
    let generator = IbanGenerator::new(build_validator(config)?);
    match generator.generate(&args.bank_code, &args.account) {
        Ok(iban) => {
            println!("{iban}");
            Ok(0)
        }
        Err(IbanError::InvalidAccount(code)) => {
            println!("no IBAN: account is {code}");
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}

/// Execute `blz verify-iban`.
pub fn run_verify_iban(args: &VerifyIbanArgs) -> Result<u8> {
    match Iban::parse(&args.iban) {
        Ok(iban) => {
            println!("valid: {iban}");
            println!("  country: {}", iban.country_code());
            println!("  bban:    {}", iban.bban());
            Ok(0)
        }
        Err(err) => {
            println!("invalid: {err}");
            Ok(1)
        }
    }
}
