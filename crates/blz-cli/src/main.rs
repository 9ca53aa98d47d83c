//! # blz CLI entry point
//!
//! Parses command-line arguments, sets up tracing, loads configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blz_cli::check::{run_check, CheckArgs};
use blz_cli::config::Config;
use blz_cli::iban::{run_iban, run_verify_iban, IbanArgs, VerifyIbanArgs};
use blz_cli::methods::{run_methods, MethodsArgs};

/// German bank account checking.
///
/// Validates account numbers against the Bundesbank check-digit methods and
/// builds IBANs for valid accounts.
#[derive(Parser, Debug)]
#[command(name = "blz", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./blz.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an account number at a bank code.
    Check(CheckArgs),

    /// Generate the IBAN of a valid German account.
    Iban(IbanArgs),

    /// Verify an IBAN's layout and check digits.
    VerifyIban(VerifyIbanArgs),

    /// List the registered checksum methods.
    Methods(MethodsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check(args) => Config::load(cli.config.as_deref()).and_then(|c| run_check(&args, &c)),
        Commands::Iban(args) => Config::load(cli.config.as_deref()).and_then(|c| run_iban(&args, &c)),
        Commands::VerifyIban(args) => run_verify_iban(&args),
        Commands::Methods(args) => run_methods(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_check_with_flags() {
        let cli = Cli::try_parse_from([
            "blz", "-vv", "check", "13051172", "43001500", "--method", "52", "--for-iban", "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.bank_code, "13051172");
        assert_eq!(args.account, "43001500");
        assert_eq!(args.method.as_deref(), Some("52"));
        assert!(args.for_iban);
        assert!(args.json);
    }

    #[test]
    fn cli_parse_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["blz", "iban", "37040044", "532013000", "--config", "x.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        assert!(matches!(cli.command, Commands::Iban(_)));
    }

    #[test]
    fn cli_parse_verify_iban_and_methods() {
        let cli = Cli::try_parse_from(["blz", "verify-iban", "DE89370400440532013000"]).unwrap();
        assert!(matches!(cli.command, Commands::VerifyIban(_)));
        let cli = Cli::try_parse_from(["blz", "methods", "--variants"]).unwrap();
        let Commands::Methods(args) = cli.command else {
            panic!("expected methods");
        };
        assert!(args.variants);
    }

    #[test]
    fn cli_rejects_missing_account() {
        assert!(Cli::try_parse_from(["blz", "check", "13051172"]).is_err());
    }
}
