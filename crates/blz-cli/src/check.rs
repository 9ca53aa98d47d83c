//! # Check CLI — Validate one account.
//!
//! ```bash
//! blz check 13051172 43001500
//! blz check 13051172 43001500 --method 52 --json
//! ```

use anyhow::Result;
use blz_checksum::Validation;
use clap::Args;

use crate::build_validator;
use crate::config::Config;

/// Arguments of `blz check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Bank code (8 digits).
    pub bank_code: String,

    /// Account number (up to 10 digits).
    pub account: String,

    /// Check under this method instead of the bank's assigned one.
    #[arg(long)]
    pub method: Option<String>,

    /// Validate as IBAN generation does (no sub-account retries).
    #[arg(long)]
    pub for_iban: bool,

    /// Print the full result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute `blz check`.
pub fn run_check(args: &CheckArgs, config: &Config) -> Result<u8> {
    let validator = build_validator(config)?;
    let validation = match &args.method {
        Some(method) => validator.check_with_method(&args.account, &args.bank_code, method),
        None => validator.is_valid_account(&args.account, &args.bank_code, args.for_iban),
    };
    println!("{}", render(&validation, args.json)?);
    Ok(exit_code(&validation))
}

/// Text or JSON rendering of a validation.
pub fn render(validation: &Validation, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(validation)?);
    }
    let mut out = format!(
        "{}: {}",
        if validation.valid { "valid" } else { "invalid" },
        validation.code
    );
    if let Some(method) = &validation.method {
        out.push_str(&format!("\n  method:    {method}"));
    }
    if let Some(variant) = validation.verdict.method.as_ref().filter(|v| Some(*v) != validation.method.as_ref()) {
        out.push_str(&format!("\n  variant:   {variant}"));
    }
    if let Some(account) = &validation.account {
        out.push_str(&format!("\n  account:   {account}"));
    }
    if let Some(bank) = &validation.bank_code {
        out.push_str(&format!("\n  bank code: {bank}"));
    }
    if let Some(rule) = &validation.rule_id {
        out.push_str(&format!("\n  mapping:   {rule}"));
    }
    Ok(out)
}

/// Process exit status for a validation.
pub fn exit_code(validation: &Validation) -> u8 {
    u8::from(!validation.valid)
}
