//! # German IBAN Generation
//!
//! An IBAN is only issued for an account that passes checksum validation.
//! Validation runs in IBAN mode, so sub-account retries do not apply, and
//! the IBAN is built from the account and bank code *after* special-account
//! mapping and successor resolution.

use blz_checksum::AccountValidator;
use tracing::debug;

use crate::country::Germany;
use crate::error::IbanError;
use crate::iban::Iban;

/// Builds German IBANs from validated account/bank-code pairs.
#[derive(Debug, Clone)]
pub struct IbanGenerator {
    validator: AccountValidator,
}

impl IbanGenerator {
    /// Generator validating through `validator`.
    pub fn new(validator: AccountValidator) -> Self {
        Self { validator }
    }

    /// The validator accounts are checked with.
    pub fn validator(&self) -> &AccountValidator {
        &self.validator
    }

    /// Validate `account` at `bank_code` and build its IBAN.
    ///
    /// # Errors
    ///
    /// Returns [`IbanError::InvalidAccount`] carrying the result code when
    /// the account is not valid.
    pub fn generate(&self, bank_code: &str, account: &str) -> Result<Iban, IbanError> {
        let validation = self.validator.is_valid_account(account, bank_code, true);
        let (true, Some(bank), Some(digits)) = (validation.valid, validation.bank_code, validation.account) else {
            return Err(IbanError::InvalidAccount(validation.code));
        };
        let iban = Iban::from_parts(&Germany, &bank.to_string(), &digits.to_string())?;
        debug!(%bank, mapped = validation.mapping_applied, %iban, "IBAN generated");
        Ok(iban)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use blz_checksum::{BankInfo, ChecksumEngine, MappingTable};
    use blz_core::{BankCode, MethodId, ResultCode};

    use super::*;

    fn generator(mapping: &str) -> IbanGenerator {
        let resolver = |code: &BankCode| {
            let method = match code.to_string().as_str() {
                "37040044" | "10020040" => "09",
                "50010517" => "17",
                _ => return None,
            };
            MethodId::new(method).ok().map(BankInfo::with_method)
        };
        let mapping = MappingTable::parse(mapping).unwrap();
        IbanGenerator::new(AccountValidator::with_mapping(
            ChecksumEngine::standard(),
            Arc::new(resolver),
            Arc::new(mapping),
        ))
    }

    #[test]
    fn generates_reference_iban() {
        let iban = generator("").generate("37040044", "532013000").unwrap();
        assert_eq!(iban.electronic(), "DE89370400440532013000");
    }

    #[test]
    fn invalid_accounts_carry_result_code() {
        let g = generator("");
        assert_eq!(g.generate("50010517", "0"), Err(IbanError::InvalidAccount(ResultCode::BadAccount)));
        assert_eq!(g.generate("99999999", "1"), Err(IbanError::InvalidAccount(ResultCode::NoMethod)));
        assert_eq!(g.generate("5001051", "1"), Err(IbanError::InvalidAccount(ResultCode::WrongValue)));
    }

    #[test]
    fn uses_mapped_bank_code() {
        let g = generator("[M1 blz from to newblz]\n10020030 1000000 1999999 10020040\n");
        let iban = g.generate("10020030", "1500000").unwrap();
        assert_eq!(iban.bban(), "100200400001500000");
        assert!(Iban::parse(iban.electronic()).is_ok());
    }
}
