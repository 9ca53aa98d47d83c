//! # Method Registry
//!
//! Immutable table of checksum parameters for every method identifier,
//! including the lettered sub-variants reachable only as fallback stages.
//!
//! ## Parameter Semantics
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `modulus` | Divisor of the weighted sum. `0` marks a method without a check digit. |
//! | `weights` | Applied from `stop` leftwards to `start`, cycled if shorter. |
//! | `start`, `stop` | Inclusive 0-based span of the working slice. |
//! | `check` | 0-based index of the check digit in the padded account. |
//!
//! A check index strictly inside `[start, stop)` is skipped when the slice
//! is cut. A check index equal to `stop` stays in the slice (method 77
//! sums over the check digit itself).
//!
//! The registry is built once and shared read-only between threads.

use std::collections::HashMap;

use blz_core::{MethodId, ACCOUNT_LENGTH};
use serde::Serialize;

/// Parameters of one checksum method or sub-variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodParameters {
    /// Divisor of the weighted sum, `0` if the method has no check digit.
    pub modulus: u32,
    /// Weights, first entry applied to the rightmost digit of the slice.
    pub weights: &'static [u32],
    /// First index of the working slice.
    pub start: usize,
    /// Last index of the working slice.
    pub stop: usize,
    /// Index of the check digit.
    pub check: usize,
}

impl MethodParameters {
    /// Create a parameter set.
    pub const fn new(
        modulus: u32,
        weights: &'static [u32],
        start: usize,
        stop: usize,
        check: usize,
    ) -> Self {
        Self {
            modulus,
            weights,
            start,
            stop,
            check,
        }
    }

    /// Parameters of a method that never carries a check digit.
    pub const NONE: Self = Self::new(0, &[], 0, 8, 9);

    /// Whether the method defines a check digit at all.
    pub fn has_checksum(&self) -> bool {
        self.modulus != 0
    }

    /// Cut the working slice out of a padded account.
    pub fn slice(&self, digits: &[u8; ACCOUNT_LENGTH]) -> Vec<u8> {
        let stop = self.stop.min(ACCOUNT_LENGTH - 1);
        (self.start..=stop)
            .filter(|i| !(*i == self.check && self.check < stop))
            .map(|i| digits[i])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Weight sequences
// ---------------------------------------------------------------------------

const W_ALT_21: &[u32] = &[2, 1, 2, 1, 2, 1, 2, 1, 2];
const W_ALT_12: &[u32] = &[1, 2, 1, 2, 1, 2, 1, 2, 1];
const W_PAIR_21: &[u32] = &[2, 1];
const W_371: &[u32] = &[3, 7, 1, 3, 7, 1, 3, 7, 1];
const W_731: &[u32] = &[7, 3, 1, 7, 3, 1, 7, 3, 1];
const W_2_9_2: &[u32] = &[2, 3, 4, 5, 6, 7, 8, 9, 2];
const W_2_7_234: &[u32] = &[2, 3, 4, 5, 6, 7, 2, 3, 4];
const W_2_10: &[u32] = &[2, 3, 4, 5, 6, 7, 8, 9, 10];
const W_2_9_1: &[u32] = &[2, 3, 4, 5, 6, 7, 8, 9, 1];
const W_2_9_3: &[u32] = &[2, 3, 4, 5, 6, 7, 8, 9, 3];
const W_2_9: &[u32] = &[2, 3, 4, 5, 6, 7, 8, 9];
const W_2_8: &[u32] = &[2, 3, 4, 5, 6, 7, 8];
const W_2_7: &[u32] = &[2, 3, 4, 5, 6, 7];
const W_2_6: &[u32] = &[2, 3, 4, 5, 6];
const W_2_5: &[u32] = &[2, 3, 4, 5];
const W_2_7_2: &[u32] = &[2, 3, 4, 5, 6, 7, 2];
const W_POW2: &[u32] = &[2, 4, 8, 5, 10, 9, 7, 3, 6];
const W_ESER: &[u32] = &[2, 4, 8, 5, 10, 9, 7, 3, 6, 1, 2, 4];
const W_212121: &[u32] = &[2, 1, 2, 1, 2, 1];
const W_21212: &[u32] = &[2, 1, 2, 1, 2];
const W_2121212: &[u32] = &[2, 1, 2, 1, 2, 1, 2];

/// Method identifiers whose slice is rebuilt from the bank code, so their
/// weight list may be longer than the account span.
pub const RECONSTRUCTING: &[&str] = &["52", "53", "C0"];

#[rustfmt::skip]
const TABLE: &[(&str, MethodParameters)] = &[
    ("00", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("01", MethodParameters::new(10, W_371, 0, 8, 9)),
    ("02", MethodParameters::new(11, W_2_9_2, 0, 8, 9)),
    ("03", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("04", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("05", MethodParameters::new(10, W_731, 0, 8, 9)),
    ("06", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("07", MethodParameters::new(11, W_2_10, 0, 8, 9)),
    ("08", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("09", MethodParameters::NONE),
    ("10", MethodParameters::new(11, W_2_10, 0, 8, 9)),
    ("11", MethodParameters::new(11, W_2_10, 0, 8, 9)),
    ("12", MethodParameters::NONE),
    ("13", MethodParameters::new(10, W_212121, 1, 6, 7)),
    ("13b", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("14", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("15", MethodParameters::new(11, W_2_5, 5, 8, 9)),
    ("16", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("17", MethodParameters::new(11, W_212121, 1, 6, 7)),
    ("18", MethodParameters::new(10, &[3, 9, 7, 1, 3, 9, 7, 1, 3], 0, 8, 9)),
    ("19", MethodParameters::new(11, W_2_9_1, 0, 8, 9)),
    ("20", MethodParameters::new(11, W_2_9_3, 0, 8, 9)),
    ("21", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("22", MethodParameters::new(10, &[3, 1, 3, 1, 3, 1, 3, 1, 3], 0, 8, 9)),
    ("23", MethodParameters::new(11, W_2_7, 0, 5, 6)),
    ("24", MethodParameters::new(11, &[1, 2, 3], 0, 8, 9)),
    ("25", MethodParameters::new(11, W_2_9, 1, 8, 9)),
    ("26", MethodParameters::new(11, W_2_7_2, 0, 6, 7)),
    ("26b", MethodParameters::new(11, W_2_7_2, 2, 8, 9)),
    ("27", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("28", MethodParameters::new(11, W_2_8, 0, 6, 7)),
    ("29", MethodParameters::new(10, &[], 0, 8, 9)),
    ("30", MethodParameters::new(10, &[2, 1, 2, 1, 0, 0, 0, 0, 2], 0, 8, 9)),
    ("31", MethodParameters::new(11, &[9, 8, 7, 6, 5, 4, 3, 2, 1], 0, 8, 9)),
    ("32", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("33", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("34", MethodParameters::new(11, &[2, 4, 8, 5, 10, 9, 7], 0, 6, 7)),
    ("35", MethodParameters::new(11, W_2_10, 0, 8, 9)),
    ("36", MethodParameters::new(11, &[2, 4, 8, 5], 5, 8, 9)),
    ("37", MethodParameters::new(11, &[2, 4, 8, 5, 10], 4, 8, 9)),
    ("38", MethodParameters::new(11, &[2, 4, 8, 5, 10, 9], 3, 8, 9)),
    ("39", MethodParameters::new(11, &[2, 4, 8, 5, 10, 9, 7], 2, 8, 9)),
    ("40", MethodParameters::new(11, W_POW2, 0, 8, 9)),
    ("41", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("42", MethodParameters::new(11, W_2_9, 1, 8, 9)),
    ("43", MethodParameters::new(10, &[1, 2, 3, 4, 5, 6, 7, 8, 9], 0, 8, 9)),
    ("44", MethodParameters::new(11, &[2, 4, 8, 5, 10], 4, 8, 9)),
    ("45", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("46", MethodParameters::new(11, W_2_6, 2, 6, 7)),
    ("47", MethodParameters::new(11, W_2_6, 3, 7, 8)),
    ("48", MethodParameters::new(11, W_2_7, 2, 7, 8)),
    ("49", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("50", MethodParameters::new(11, W_2_7, 0, 5, 6)),
    ("50b", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("51", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("51a", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("51b", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("51c", MethodParameters::new(7, W_2_6, 4, 8, 9)),
    ("51d", MethodParameters::new(11, W_2_8, 2, 8, 9)),
    ("51e", MethodParameters::new(11, W_2_10, 0, 8, 9)),
    ("52", MethodParameters::new(11, W_ESER, 2, 9, 3)),
    ("53", MethodParameters::new(11, W_ESER, 1, 9, 3)),
    ("54", MethodParameters::new(11, W_2_7_2, 2, 8, 9)),
    ("55", MethodParameters::new(11, &[2, 3, 4, 5, 6, 7, 8, 7, 8], 0, 8, 9)),
    ("56", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("57", MethodParameters::new(10, W_ALT_12, 0, 8, 9)),
    ("57b", MethodParameters::new(10, W_ALT_12, 0, 9, 2)),
    ("58", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("59", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("60", MethodParameters::new(10, W_2121212, 2, 8, 9)),
    ("61", MethodParameters::new(10, W_2121212, 0, 6, 7)),
    ("61b", MethodParameters::new(10, W_ALT_21, 0, 9, 7)),
    ("62", MethodParameters::new(10, W_21212, 2, 6, 7)),
    ("63", MethodParameters::new(10, W_212121, 1, 6, 7)),
    ("63b", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("64", MethodParameters::new(11, &[2, 4, 8, 5, 10, 9], 0, 5, 6)),
    ("65", MethodParameters::new(10, W_2121212, 0, 6, 7)),
    ("65b", MethodParameters::new(10, W_ALT_21, 0, 9, 7)),
    ("66", MethodParameters::new(11, &[2, 3, 4, 5, 6, 0, 0, 7], 1, 8, 9)),
    ("67", MethodParameters::new(10, W_2121212, 0, 6, 7)),
    ("68", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("68b", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("68c", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("69", MethodParameters::new(11, W_2_8, 0, 6, 7)),
    ("70", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("71", MethodParameters::new(11, &[1, 2, 3, 4, 5, 6], 1, 6, 9)),
    ("72", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("73", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("73a", MethodParameters::new(10, W_21212, 4, 8, 9)),
    ("73b", MethodParameters::new(7, W_21212, 4, 8, 9)),
    ("74", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("74b", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("75", MethodParameters::new(10, W_21212, 4, 8, 9)),
    ("76", MethodParameters::new(11, W_2_7, 1, 6, 7)),
    ("76b", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("77", MethodParameters::new(11, &[1, 2, 3, 4, 5], 5, 9, 9)),
    ("77b", MethodParameters::new(11, &[5, 4, 3, 4, 5], 5, 9, 9)),
    ("78", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("79", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("79b", MethodParameters::new(10, &[2, 1, 2, 1, 2, 1, 2, 1], 0, 7, 8)),
    ("80", MethodParameters::new(10, W_21212, 4, 8, 9)),
    ("80a", MethodParameters::new(7, W_21212, 4, 8, 9)),
    ("81", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("82", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("83", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("83a", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("83b", MethodParameters::new(7, W_2_6, 4, 8, 9)),
    ("83c", MethodParameters::new(11, W_2_8, 2, 8, 9)),
    ("84", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("84a", MethodParameters::new(7, W_2_6, 4, 8, 9)),
    ("84b", MethodParameters::new(10, W_21212, 4, 8, 9)),
    ("85", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("85a", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("85b", MethodParameters::new(7, W_2_6, 4, 8, 9)),
    ("85c", MethodParameters::new(11, W_2_8, 2, 8, 9)),
    ("86", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("86a", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("86b", MethodParameters::new(11, W_2_8, 2, 8, 9)),
    ("87", MethodParameters::new(10, &[], 3, 8, 9)),
    ("87a", MethodParameters::new(10, &[], 3, 8, 9)),
    ("87b", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("87c", MethodParameters::new(7, W_2_6, 4, 8, 9)),
    ("88", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("88a", MethodParameters::new(11, W_2_8, 2, 8, 9)),
    ("89", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("90", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("90b", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("90c", MethodParameters::new(7, W_2_6, 4, 8, 9)),
    ("90d", MethodParameters::new(9, W_2_6, 4, 8, 9)),
    ("90e", MethodParameters::new(10, W_21212, 4, 8, 9)),
    ("90f", MethodParameters::new(11, W_2_8, 2, 8, 9)),
    ("90g", MethodParameters::new(7, W_212121, 3, 8, 9)),
    ("91", MethodParameters::new(11, W_2_7, 0, 5, 6)),
    ("91b", MethodParameters::new(11, &[7, 6, 5, 4, 3, 2], 0, 5, 6)),
    ("91c", MethodParameters::new(11, W_2_10, 0, 9, 6)),
    ("91d", MethodParameters::new(11, &[2, 4, 8, 5, 10, 9], 0, 5, 6)),
    ("92", MethodParameters::new(10, &[3, 7, 1, 3, 7, 1], 3, 8, 9)),
    ("93", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("93b", MethodParameters::new(7, W_2_6, 4, 8, 9)),
    ("94", MethodParameters::new(10, W_ALT_12, 0, 8, 9)),
    ("95", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("96", MethodParameters::new(11, W_2_9_1, 0, 8, 9)),
    ("96a", MethodParameters::NONE),
    ("97", MethodParameters::new(11, &[], 0, 8, 9)),
    ("98", MethodParameters::new(10, &[3, 1, 7, 3, 1, 7, 3], 2, 8, 9)),
    ("99", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("A0", MethodParameters::new(11, &[2, 4, 8, 5, 10], 4, 8, 9)),
    ("A1", MethodParameters::new(10, W_2121212, 2, 8, 9)),
    ("A2", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("A3", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("A4", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("A4a", MethodParameters::new(7, W_2_7, 3, 8, 9)),
    ("A4b", MethodParameters::new(11, W_2_6, 4, 8, 9)),
    ("A5", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("A6", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("A7", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("A8", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("A8a", MethodParameters::new(10, W_212121, 3, 8, 9)),
    ("A9", MethodParameters::new(10, W_371, 0, 8, 9)),
    ("B0", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("B1", MethodParameters::new(10, W_731, 0, 8, 9)),
    ("B2", MethodParameters::new(11, W_2_9_2, 0, 8, 9)),
    ("B3", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("B4", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("B4a", MethodParameters::new(11, W_2_10, 0, 8, 9)),
    ("B5", MethodParameters::new(10, W_731, 0, 8, 9)),
    ("B6", MethodParameters::new(11, W_2_9_3, 0, 8, 9)),
    ("B7", MethodParameters::new(10, W_371, 0, 8, 9)),
    ("B8", MethodParameters::new(11, W_2_9_3, 0, 8, 9)),
    ("B8a", MethodParameters::NONE),
    ("B9", MethodParameters::new(11, &[1, 3, 2, 1, 3, 2, 1], 2, 8, 9)),
    ("B9a", MethodParameters::new(11, &[1, 2, 3, 4, 5, 6], 3, 8, 9)),
    ("C0", MethodParameters::new(11, W_ESER, 2, 9, 3)),
    ("C1", MethodParameters::new(11, W_212121, 1, 6, 7)),
    ("C1a", MethodParameters::new(11, W_ALT_12, 0, 8, 9)),
    ("C2", MethodParameters::new(10, &[3, 1, 3, 1, 3, 1, 3, 1, 3], 0, 8, 9)),
    ("C3", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("C4", MethodParameters::new(11, W_2_5, 5, 8, 9)),
    ("C5", MethodParameters::new(10, W_21212, 4, 8, 9)),
    ("C6", MethodParameters::new(10, W_PAIR_21, 1, 8, 9)),
    ("C7", MethodParameters::new(10, W_212121, 1, 6, 7)),
    ("C8", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("C9", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("D0", MethodParameters::new(11, W_2_9_3, 0, 8, 9)),
    ("D1", MethodParameters::new(10, W_PAIR_21, 0, 8, 9)),
    ("D2", MethodParameters::new(11, W_2_7_234, 0, 8, 9)),
    ("D3", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("D4", MethodParameters::new(10, W_PAIR_21, 0, 8, 9)),
    ("D5", MethodParameters::new(11, W_2_8, 2, 8, 9)),
    ("D5a", MethodParameters::new(11, W_2_7, 3, 8, 9)),
    ("D5b", MethodParameters::new(7, W_2_7, 3, 8, 9)),
    ("D5c", MethodParameters::new(10, W_2_7, 3, 8, 9)),
    ("D6", MethodParameters::new(11, W_2_10, 0, 8, 9)),
    ("D7", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("D8", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("D9", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("E0", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("E1", MethodParameters::new(11, &[1, 2, 3, 4, 5, 6, 11, 10, 9], 0, 8, 9)),
    ("E2", MethodParameters::new(10, W_PAIR_21, 1, 8, 9)),
    ("E3", MethodParameters::new(10, W_ALT_21, 0, 8, 9)),
    ("E4", MethodParameters::new(11, W_2_9_2, 0, 8, 9)),
];

/// Lookup table from method identifier to [`MethodParameters`].
#[derive(Debug, Clone)]
pub struct MethodRegistry {
    entries: HashMap<MethodId, MethodParameters>,
}

impl MethodRegistry {
    /// The complete Bundesbank method table.
    pub fn standard() -> Self {
        let entries = TABLE
            .iter()
            .filter_map(|(raw, params)| MethodId::new(raw).ok().map(|id| (id, *params)))
            .collect();
        Self { entries }
    }

    /// Look up a method by identifier string.
    pub fn get(&self, id: &str) -> Option<&MethodParameters> {
        self.entries.get(id)
    }

    /// Look up a method, returning the registered identifier alongside.
    pub fn entry(&self, id: &str) -> Option<(&MethodId, &MethodParameters)> {
        self.entries.get_key_value(id)
    }

    /// Whether the identifier is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of registered identifiers, sub-variants included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered identifiers in sorted order.
    pub fn ids(&self) -> Vec<&MethodId> {
        let mut ids: Vec<&MethodId> = self.entries.keys().collect();
        ids.sort();
        ids
    }

    /// Identifiers that may appear in bank master data (no sub-variants).
    pub fn base_ids(&self) -> Vec<&MethodId> {
        self.ids().into_iter().filter(|id| !id.is_variant()).collect()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
