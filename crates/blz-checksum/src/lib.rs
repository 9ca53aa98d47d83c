//! # blz-checksum — Bundesbank Check-Digit Methods
//!
//! Validates German account numbers against the check-digit method their
//! bank code is assigned to.
//!
//! ## Layers
//!
//! - **Registry** (`registry.rs`): immutable table of modulus, weights and
//!   slice bounds for every base method and lettered sub-variant.
//!
//! - **Kernels** (`kernels.rs`, `bespoke.rs`): pure functions over digit
//!   slices. Weighted sums, cross sums, factor search, the transformation
//!   table, legacy-number reconstruction and the method 87 walk.
//!
//! - **Engine** (`engine.rs`): pre-processing, kernel dispatch and fallback
//!   ladders. Pre-processing may settle a verdict, narrow the window, rewrite
//!   the account or redirect to another method.
//!
//! - **Mapping** (`mapping.rs`): special-account rewrite rules read from a
//!   line-oriented directive format.
//!
//! - **Directory** (`directory.rs`): Bundesbank master data and the
//!   [`MethodResolver`] seam.
//!
//! - **Validator** (`validator.rs`): the facade taking raw strings.
//!
//! ## Crate Policy
//!
//! - Validation never fails with an error; the outcome is a
//!   [`blz_core::ResultCode`]. Only loaders return [`DataError`].
//! - Every table is built once and shared read-only.

pub mod bespoke;
pub mod directory;
pub mod engine;
pub mod error;
pub mod kernels;
pub mod mapping;
pub mod registry;
pub mod validator;

pub use directory::{BankDirectory, BankInfo, BankRecord, ChangeFlag, MethodResolver};
pub use engine::{fallbacks, CheckOptions, ChecksumEngine, MethodState};
pub use error::DataError;
pub use mapping::{MappingEntry, MappingGroup, MappingTable, SpecialAccount};
pub use registry::{MethodParameters, MethodRegistry};
pub use validator::{AccountValidator, Validation};
