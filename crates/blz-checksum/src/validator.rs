//! # Account Validator
//!
//! The front door for callers holding raw strings. One call runs the whole
//! pipeline:
//!
//! 1. Parse account and bank code (`WrongValue` on failure).
//! 2. Rewrite through the [`MappingTable`].
//! 3. Resolve the checksum method of the (rewritten) bank code.
//! 4. Run the [`ChecksumEngine`].
//!
//! ## Resolution
//!
//! | Directory state | Outcome |
//! |-----------------|---------|
//! | Known, active | Its own method. |
//! | Known, deleted with successor | The successor's method and bank code. |
//! | Unknown | Recovered from the mapping rule ids, else `NoMethod`. |

use std::sync::Arc;

use blz_core::{AccountDigits, BankCode, MethodId, ResultCode, Verdict};
use serde::Serialize;
use tracing::debug;

use crate::directory::MethodResolver;
use crate::engine::{CheckOptions, ChecksumEngine};
use crate::mapping::MappingTable;

/// Outcome of a full validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Whether the account is valid.
    pub valid: bool,
    /// Result classification.
    pub code: ResultCode,
    /// Verdict of the engine, naming the deciding variant.
    pub verdict: Verdict,
    /// Account that was checked, after mapping.
    pub account: Option<AccountDigits>,
    /// Bank code that was checked, after mapping and successor resolution.
    pub bank_code: Option<BankCode>,
    /// Method assigned to the bank code.
    pub method: Option<MethodId>,
    /// Whether a mapping entry rewrote the input.
    pub mapping_applied: bool,
    /// Rule id of the applied mapping group.
    pub rule_id: Option<String>,
}

impl Validation {
    /// Outcome for input that could not be parsed.
    pub fn wrong_value() -> Self {
        Self::from_verdict(Verdict::wrong_value())
    }

    fn from_verdict(verdict: Verdict) -> Self {
        Self {
            valid: verdict.valid,
            code: verdict.code,
            verdict,
            account: None,
            bank_code: None,
            method: None,
            mapping_applied: false,
            rule_id: None,
        }
    }
}

/// Validates raw account strings against a bank directory.
#[derive(Clone)]
pub struct AccountValidator {
    engine: ChecksumEngine,
    resolver: Arc<dyn MethodResolver>,
    mapping: Arc<MappingTable>,
}

impl std::fmt::Debug for AccountValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountValidator")
            .field("methods", &self.engine.registry().len())
            .field("mapping_groups", &self.mapping.len())
            .finish_non_exhaustive()
    }
}

impl AccountValidator {
    /// Validator without special-account mapping.
    pub fn new(engine: ChecksumEngine, resolver: Arc<dyn MethodResolver>) -> Self {
        Self::with_mapping(engine, resolver, Arc::new(MappingTable::new()))
    }

    /// Validator that rewrites accounts through `mapping` first.
    pub fn with_mapping(
        engine: ChecksumEngine,
        resolver: Arc<dyn MethodResolver>,
        mapping: Arc<MappingTable>,
    ) -> Self {
        Self {
            engine,
            resolver,
            mapping,
        }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &ChecksumEngine {
        &self.engine
    }

    /// Validate `account` at `bank_code`.
    ///
    /// `for_iban` marks validation on behalf of IBAN generation, which skips
    /// sub-account retries.
    pub fn is_valid_account(&self, account: &str, bank_code: &str, for_iban: bool) -> Validation {
        let (Ok(account), Ok(bank)) = (AccountDigits::parse(account), BankCode::parse(bank_code)) else {
            return Validation::wrong_value();
        };

        let special = self.mapping.check_special_account(&account, &bank);
        let mut outcome = Validation {
            account: Some(special.account),
            bank_code: Some(special.bank_code),
            mapping_applied: special.applied,
            rule_id: special.rule_id.clone(),
            ..Validation::from_verdict(Verdict::no_method(None))
        };

        let Some((bank, method)) = self.resolve(&special.account, &special.bank_code) else {
            debug!(bank = %special.bank_code, "no checksum method for bank code");
            return outcome;
        };

        let options = if for_iban {
            CheckOptions::for_iban()
        } else {
            CheckOptions::default()
        };
        let verdict = self.engine.check(&method, &special.account, &bank, options);
        outcome.valid = verdict.valid;
        outcome.code = verdict.code;
        outcome.verdict = verdict;
        outcome.bank_code = Some(bank);
        outcome.method = Some(method);
        outcome
    }

    /// Validate `account` under an explicit method. No mapping or directory
    /// lookup takes place; the bank code is still needed by methods that
    /// rebuild legacy numbers from it.
    pub fn check_with_method(&self, account: &str, bank_code: &str, method: &str) -> Validation {
        let (Ok(account), Ok(bank), Ok(method)) = (
            AccountDigits::parse(account),
            BankCode::parse(bank_code),
            MethodId::new(method),
        ) else {
            return Validation::wrong_value();
        };
        let verdict = self.engine.check(&method, &account, &bank, CheckOptions::default());
        Validation {
            account: Some(account),
            bank_code: Some(bank),
            method: Some(method),
            ..Validation::from_verdict(verdict)
        }
    }

    /// The bank code and method to check `account` with.
    fn resolve(&self, account: &AccountDigits, bank: &BankCode) -> Option<(BankCode, MethodId)> {
        if let Some(info) = self.resolver.resolve(bank) {
            if let (true, Some(successor)) = (info.deleted, info.successor) {
                if let Some(next) = self.resolver.resolve(&successor) {
                    debug!(%bank, %successor, "deleted bank code resolved through successor");
                    return Some((successor, next.method));
                }
            }
            return Some((*bank, info.method));
        }

        let recovered = self
            .mapping
            .bank_code_from_account_cluster(account, bank)
            .or_else(|| self.mapping.bank_code_from_account(account, bank))?;
        let info = self.resolver.resolve(&recovered)?;
        Some((recovered, info.method))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::directory::BankInfo;

    fn bank(raw: &str) -> BankCode {
        BankCode::parse(raw).unwrap()
    }

    fn resolver(entries: &[(&str, &str)]) -> Arc<dyn MethodResolver> {
        let map: HashMap<BankCode, BankInfo> = entries
            .iter()
            .map(|(code, method)| (bank(code), BankInfo::with_method(MethodId::new(method).unwrap())))
            .collect();
        Arc::new(move |code: &BankCode| map.get(code).cloned())
    }

    fn validator(entries: &[(&str, &str)]) -> AccountValidator {
        AccountValidator::new(ChecksumEngine::standard(), resolver(entries))
    }

    #[test]
    fn validates_through_directory() {
        let v = validator(&[("13051172", "52"), ("50010517", "17")]);
        let ok = v.is_valid_account("43001500", "13051172", false);
        assert!(ok.valid);
        assert_eq!(ok.code, ResultCode::Ok);
        assert_eq!(ok.method.as_ref().map(MethodId::as_str), Some("52"));
        assert_eq!(ok.bank_code, Some(bank("13051172")));
        assert!(!ok.mapping_applied);

        assert!(v.is_valid_account("0446786040", "50010517", false).valid);
        let bad = v.is_valid_account("0", "50010517", false);
        assert_eq!(bad.code, ResultCode::BadAccount);
    }

    #[test]
    fn malformed_input_is_wrong_value() {
        let v = validator(&[("13051172", "52")]);
        for (account, code) in [("12a4", "13051172"), ("43001500", "0305117"), ("", "13051172")] {
            let out = v.is_valid_account(account, code, false);
            assert_eq!(out.code, ResultCode::WrongValue, "{account}/{code}");
            assert!(!out.valid);
        }
    }

    #[test]
    fn unknown_bank_has_no_method() {
        let v = validator(&[("13051172", "52")]);
        let out = v.is_valid_account("43001500", "99999999", false);
        assert_eq!(out.code, ResultCode::NoMethod);
        assert_eq!(out.method, None);
        assert_eq!(out.bank_code, Some(bank("99999999")));
    }

    #[test]
    fn deleted_bank_resolves_through_successor() {
        let mut map = HashMap::new();
        map.insert(
            bank("10000000"),
            BankInfo {
                method: MethodId::new("52").unwrap(),
                successor: Some(bank("20000000")),
                deleted: true,
                iban_rule: None,
            },
        );
        map.insert(bank("20000000"), BankInfo::with_method(MethodId::new("09").unwrap()));
        let v = AccountValidator::new(
            ChecksumEngine::standard(),
            Arc::new(move |code: &BankCode| map.get(code).cloned()),
        );
        let out = v.is_valid_account("12345", "10000000", false);
        assert_eq!(out.code, ResultCode::NoChecksum);
        assert_eq!(out.bank_code, Some(bank("20000000")));
        assert_eq!(out.method.as_ref().map(MethodId::as_str), Some("09"));
    }

    #[test]
    fn mapping_rewrites_before_lookup() {
        let mapping = MappingTable::parse("[M1 blz from to newblz]\n10020030 1000000 1999999 10020040\n").unwrap();
        let v = AccountValidator::with_mapping(
            ChecksumEngine::standard(),
            resolver(&[("10020040", "09")]),
            Arc::new(mapping),
        );
        let out = v.is_valid_account("1500000", "10020030", false);
        assert!(out.valid);
        assert!(out.mapping_applied);
        assert_eq!(out.rule_id.as_deref(), Some("M1"));
        assert_eq!(out.bank_code, Some(bank("10020040")));

        let outside = v.is_valid_account("2500000", "10020030", false);
        assert!(!outside.mapping_applied);
        assert_eq!(outside.code, ResultCode::NoMethod);
    }

    #[test]
    fn vanished_bank_recovered_from_rule_cluster() {
        let mapping = MappingTable::parse(
            "[M2 blz from to newblz]\n\
             10020030 1000000 1999999 10020040\n\
             10020031 2000000 2999999 10020050\n",
        )
        .unwrap();
        let v = AccountValidator::with_mapping(
            ChecksumEngine::standard(),
            resolver(&[("10020050", "09")]),
            Arc::new(mapping),
        );
        let out = v.is_valid_account("2500000", "10020030", false);
        assert_eq!(out.code, ResultCode::NoChecksum);
        assert_eq!(out.bank_code, Some(bank("10020050")));
        assert!(!out.mapping_applied);
    }

    #[test]
    fn explicit_method_skips_directory() {
        let v = validator(&[]);
        assert!(v.check_with_method("43001500", "13051172", "52").valid);
        assert!(v.check_with_method("87920187", "10000000", "B9").valid);
        assert!(!v.check_with_method("0099345678", "10000000", "51").valid);
        assert_eq!(v.check_with_method("1", "10000000", "E9").code, ResultCode::NoMethod);
        assert_eq!(v.check_with_method("1", "10000000", "x").code, ResultCode::WrongValue);
    }

    #[test]
    fn validation_serializes_code_as_snake_case() {
        let v = validator(&[("10020040", "09")]);
        let json = serde_json::to_value(v.is_valid_account("1", "10020040", false)).unwrap();
        assert_eq!(json["code"], "no_checksum");
        assert_eq!(json["valid"], true);
    }
}
