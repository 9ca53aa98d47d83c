//! # blz-cli — Command-Line Front End
//!
//! Provides the `blz` binary.
//!
//! ## Subcommands
//!
//! - `blz check` — Validate an account at a bank code, or under an explicit
//!   method.
//! - `blz iban` — Generate a German IBAN for a valid account.
//! - `blz verify-iban` — Verify an IBAN's layout and check digits.
//! - `blz methods` — List the registered checksum methods.
//!
//! ```bash
//! blz check 13051172 43001500
//! blz check 50010517 0446786040 --method 17 --json
//! blz --config blz.yaml iban 37040044 0532013000
//! ```
//!
//! Exit status is `0` for a valid result and `1` for an invalid one or an
//! error.

pub mod check;
pub mod config;
pub mod iban;
pub mod methods;

use std::sync::Arc;

use anyhow::{Context, Result};
use blz_checksum::{AccountValidator, BankDirectory, ChecksumEngine, MappingTable, MethodResolver};

use crate::config::Config;

/// Build a validator from the configured data files.
///
/// Without bank data every bank code resolves to `no_method`; explicit
/// `--method` checks still work.
pub fn build_validator(config: &Config) -> Result<AccountValidator> {
    let resolver: Arc<dyn MethodResolver> = match &config.bank_data {
        Some(path) => Arc::new(
            BankDirectory::load(path).with_context(|| format!("failed to load bank data: {}", path.display()))?,
        ),
        None => {
            tracing::warn!("no bank data configured; set bank_data or BLZ_BANK_DATA");
            Arc::new(BankDirectory::default())
        }
    };
    let mapping = match &config.mapping {
        Some(path) => {
            MappingTable::load(path).with_context(|| format!("failed to load mapping: {}", path.display()))?
        }
        None => MappingTable::new(),
    };
    Ok(AccountValidator::with_mapping(
        ChecksumEngine::standard(),
        resolver,
        Arc::new(mapping),
    ))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_reads_configured_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_config(dir.path(), None);
        let config = Config::from_yaml(&std::fs::read_to_string(path).unwrap()).unwrap();
        let validator = build_validator(&config).unwrap();
        assert!(validator.is_valid_account("43001500", "13051172", false).valid);
    }

    #[test]
    fn missing_bank_data_file_is_an_error() {
        let config = Config {
            bank_data: Some("/nonexistent/blz.txt".into()),
            mapping: None,
        };
        let err = build_validator(&config).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load bank data"));
    }
}
