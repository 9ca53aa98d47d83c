//! Published account/bank-code pairs, run through the full validator.
//!
//! The bank directory is a closure resolver so each scenario states exactly
//! which method its bank code carries.

use std::sync::Arc;

use blz_checksum::{AccountValidator, BankInfo, ChecksumEngine};
use blz_core::{BankCode, MethodId, ResultCode};
use blz_iban::IbanGenerator;

fn validator() -> AccountValidator {
    let resolver = |code: &BankCode| {
        let method = match code.as_u32() {
            13_051_172 => "52",
            50_010_517 => "17",
            37_040_044 => "09",
            _ => return None,
        };
        MethodId::new(method).ok().map(BankInfo::with_method)
    };
    AccountValidator::new(ChecksumEngine::standard(), Arc::new(resolver))
}

#[test]
fn legacy_number_reconstruction_accepts_sparkasse_account() {
    let v = validator().is_valid_account("43001500", "13051172", false);
    assert!(v.valid);
    assert_eq!(v.code, ResultCode::Ok);
    assert_eq!(v.method.as_ref().map(MethodId::as_str), Some("52"));
}

#[test]
fn method_17_accepts_published_account_and_rejects_zero() {
    let validator = validator();
    assert_eq!(validator.is_valid_account("0446786040", "50010517", false).code, ResultCode::Ok);
    assert_eq!(validator.is_valid_account("0", "50010517", false).code, ResultCode::BadAccount);
}

#[test]
fn explicit_methods_match_published_outcomes() {
    let validator = validator();
    assert!(validator.check_with_method("87920187", "10000000", "B9").valid);
    let rejected = validator.check_with_method("0099345678", "10000000", "51");
    assert!(!rejected.valid);
    assert_eq!(rejected.code, ResultCode::BadAccount);
}

#[test]
fn unknown_bank_code_is_no_method_not_bad_account() {
    let v = validator().is_valid_account("43001500", "87654321", false);
    assert_eq!(v.code, ResultCode::NoMethod);
}

#[test]
fn reference_iban_is_reproduced() {
    let generator = IbanGenerator::new(validator());
    let iban = generator.generate("37040044", "0532013000").unwrap();
    assert_eq!(iban.electronic(), "DE89370400440532013000");
    assert_eq!(iban.check_digits(), "89");
}
