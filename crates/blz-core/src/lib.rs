#![deny(missing_docs)]

//! # blz-core — Foundational Types for BLZ Account Checking
//!
//! This crate defines the domain primitives every other crate in the
//! workspace depends on. It has no internal crate dependencies, only `serde`
//! and `thiserror` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`BankCode`] is not a
//!    string and a [`MethodId`] is not a bank code. Both validate their
//!    format at construction and at deserialization.
//!
//! 2. **[`AccountDigits`] is the sole path into the checksum kernels.** Raw
//!    account strings are parsed once into a fixed 10-digit, left-zero-padded
//!    array. Kernels never see unvalidated input.
//!
//! 3. **Exactly one [`ResultCode`] per validation.** Failures of the checksum
//!    itself are values (`BadAccount`, `NoMethod`, ...), not errors.
//!    [`ValidationError`] is reserved for malformed input and maps onto
//!    [`ResultCode::WrongValue`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `blz-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod account;
pub mod bank_code;
pub mod error;
pub mod method;
pub mod result;

// Re-export primary types at crate root for ergonomic imports.
pub use account::{AccountDigits, ACCOUNT_LENGTH, MAX_ACCOUNT_VALUE};
pub use bank_code::{BankCode, BANK_CODE_LENGTH};
pub use error::ValidationError;
pub use method::MethodId;
pub use result::{ResultCode, Verdict};
