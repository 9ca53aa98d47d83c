//! # Checksum Kernels
//!
//! Reusable numeric primitives shared by the ~150 methods. A kernel never
//! looks at a method identifier: it receives a working slice of digits, a
//! weight sequence and a modulus, and returns the check value it computed.
//!
//! ## Weight Alignment
//!
//! Weights are listed in the order they apply **from the rightmost digit of
//! the working slice moving left**, which is how the Bundesbank tables are
//! written ("von rechts nach links"). [`Traversal::LeftToRight`] flips that
//! for the few methods that count from the left. A weight list shorter than
//! the slice is cycled.
//!
//! ## Unassignable Check Values
//!
//! Some remainders produce a check digit that cannot exist (the Bundesbank
//! text says "die Kontonummer ist falsch" or "kann nicht verwendet werden").
//! Kernels return `None` for those; a `None` never matches a digit.

use blz_core::BankCode;

// ---------------------------------------------------------------------------
// Weighted sums
// ---------------------------------------------------------------------------

/// Direction in which weights are applied to the working slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// First weight on the rightmost digit.
    RightToLeft,
    /// First weight on the leftmost digit.
    LeftToRight,
}

/// How each `digit × weight` product enters the sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// The product itself.
    Product,
    /// The decimal cross-sum of the product ("Quersumme").
    CrossSum,
    /// Only the last decimal digit of the product ("Einerstelle").
    LastDigit,
}

/// Treatment of a specific remainder before the default outcome applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remap {
    /// Replace the check value with a constant.
    To(u32),
    /// No check digit can be assigned; the account is invalid.
    Unassignable,
    /// Fall through to the scheme's [`Outcome`].
    Through,
}

/// Default check value derived from the sum and its remainder `r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `r` itself.
    Remainder,
    /// `modulus - r`.
    Complement,
    /// Distance from the sum up to the next multiple of five.
    NextFive,
    /// `sum div modulus`.
    Quotient,
    /// The raw sum.
    Sum,
}

/// Full parameterisation of the weighted-sum-mod kernel, minus the modulus
/// and weights which come from the method registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheme {
    /// Weight direction.
    pub traversal: Traversal,
    /// Product reduction.
    pub reduction: Reduction,
    /// Constant added to the sum before the remainder is taken.
    pub offset: u32,
    /// Treatment of remainder 0.
    pub on_zero: Remap,
    /// Treatment of remainder 1.
    pub on_one: Remap,
    /// Default outcome.
    pub outcome: Outcome,
}

impl Scheme {
    /// Modulus-10 with cross-summed products, `10 - r` (method 00 family).
    pub const LUHN: Scheme = Scheme {
        traversal: Traversal::RightToLeft,
        reduction: Reduction::CrossSum,
        offset: 0,
        on_zero: Remap::To(0),
        on_one: Remap::Through,
        outcome: Outcome::Complement,
    };

    /// Plain products, `m - r`, remainder 0 gives 0 (methods 01, mod-7 variants).
    pub const COMPLEMENT: Scheme = Scheme {
        traversal: Traversal::RightToLeft,
        reduction: Reduction::Product,
        offset: 0,
        on_zero: Remap::To(0),
        on_one: Remap::Through,
        outcome: Outcome::Complement,
    };

    /// Modulus-11 where remainders 0 and 1 both give check digit 0 (method 06).
    pub const MOD11: Scheme = Scheme {
        traversal: Traversal::RightToLeft,
        reduction: Reduction::Product,
        offset: 0,
        on_zero: Remap::To(0),
        on_one: Remap::To(0),
        outcome: Outcome::Complement,
    };

    /// Modulus-11 where remainder 1 cannot be assigned (method 02).
    pub const MOD11_STRICT: Scheme = Scheme {
        traversal: Traversal::RightToLeft,
        reduction: Reduction::Product,
        offset: 0,
        on_zero: Remap::To(0),
        on_one: Remap::Unassignable,
        outcome: Outcome::Complement,
    };

    /// The remainder is the check value (methods 31, 35, 76).
    pub const REMAINDER: Scheme = Scheme {
        traversal: Traversal::RightToLeft,
        reduction: Reduction::Product,
        offset: 0,
        on_zero: Remap::Through,
        on_one: Remap::Through,
        outcome: Outcome::Remainder,
    };

    /// Same scheme with a different product reduction.
    pub const fn reduced(mut self, reduction: Reduction) -> Scheme {
        self.reduction = reduction;
        self
    }

    /// Same scheme with a constant added to the sum.
    pub const fn offset(mut self, offset: u32) -> Scheme {
        self.offset = offset;
        self
    }

    /// Same scheme with a different default outcome.
    pub const fn outcome(mut self, outcome: Outcome) -> Scheme {
        self.outcome = outcome;
        self
    }

    /// Same scheme with different remainder 0/1 treatment.
    pub const fn remap(mut self, on_zero: Remap, on_one: Remap) -> Scheme {
        self.on_zero = on_zero;
        self.on_one = on_one;
        self
    }
}

/// Decimal cross-sum of `n`.
pub fn cross_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}

fn weight_at(weights: &[u32], i: usize) -> u32 {
    if weights.is_empty() {
        0
    } else {
        weights[i % weights.len()]
    }
}

/// Sum of reduced `digit × weight` products over the slice.
pub fn weighted_sum(
    digits: &[u8],
    weights: &[u32],
    traversal: Traversal,
    reduction: Reduction,
) -> u32 {
    let term = |d: u8, w: u32| {
        let p = u32::from(d) * w;
        match reduction {
            Reduction::Product => p,
            Reduction::CrossSum => cross_sum(p),
            Reduction::LastDigit => p % 10,
        }
    };
    match traversal {
        Traversal::RightToLeft => digits
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| term(*d, weight_at(weights, i)))
            .sum(),
        Traversal::LeftToRight => digits
            .iter()
            .enumerate()
            .map(|(i, d)| term(*d, weight_at(weights, i)))
            .sum(),
    }
}

/// The weighted-sum-mod kernel.
///
/// Returns the check value, which may exceed 9 when a method post-adjusts it
/// (e.g. `11 - 1 = 10`), or `None` when the remainder is unassignable.
pub fn weighted_sum_mod(digits: &[u8], weights: &[u32], modulus: u32, scheme: Scheme) -> Option<u32> {
    if modulus == 0 {
        return None;
    }
    let sum = weighted_sum(digits, weights, scheme.traversal, scheme.reduction) + scheme.offset;
    let r = sum % modulus;
    let remap = match r {
        0 => scheme.on_zero,
        1 => scheme.on_one,
        _ => Remap::Through,
    };
    match remap {
        Remap::To(v) => Some(v),
        Remap::Unassignable => None,
        Remap::Through => Some(match scheme.outcome {
            Outcome::Remainder => r,
            Outcome::Complement => modulus - r,
            Outcome::NextFive => (5 - sum % 5) % 5,
            Outcome::Quotient => sum / modulus,
            Outcome::Sum => sum,
        }),
    }
}

// ---------------------------------------------------------------------------
// Specialised kernels
// ---------------------------------------------------------------------------

/// Factor search (methods 17, C1): cross-summed weighted sum, then
/// `(sum - 1) mod m`, mapped `0 → 0`, otherwise `10 - f`.
///
/// A zero sum has no predecessor and is unassignable.
pub fn factor_search(digits: &[u8], weights: &[u32], modulus: u32) -> Option<u32> {
    let sum = weighted_sum(digits, weights, Traversal::RightToLeft, Reduction::CrossSum);
    if sum == 0 || modulus == 0 {
        return None;
    }
    let factor = (sum - 1) % modulus;
    Some(if factor == 0 { 0 } else { 10 - factor })
}

/// Digit collapse (method 21): cross-summed weighted sum, repeatedly replaced
/// by its own cross-sum while above 10, then `0 → 0`, otherwise `m - sum`.
pub fn digit_collapse(digits: &[u8], weights: &[u32], modulus: u32) -> Option<u32> {
    let mut sum = weighted_sum(digits, weights, Traversal::RightToLeft, Reduction::CrossSum);
    while sum > 10 {
        sum = cross_sum(sum);
    }
    match sum {
        0 => Some(0),
        s if s <= modulus => Some(modulus - s),
        _ => None,
    }
}

/// Product last-digit sum (method 22): only the units digit of every product
/// is summed; `r = sum mod m`, `0 → 0`, otherwise `10 - r`.
pub fn mod10_product(digits: &[u8], weights: &[u32], modulus: u32) -> Option<u32> {
    if modulus == 0 {
        return None;
    }
    let sum = weighted_sum(digits, weights, Traversal::RightToLeft, Reduction::LastDigit);
    let r = sum % modulus;
    Some(if r == 0 { 0 } else { 10 - r })
}

/// Custom modulus (methods 24, B9): every term is `(d·w + w) mod m`; the
/// check value is the sum of the terms modulo 10.
pub fn custom_mod(digits: &[u8], weights: &[u32], modulus: u32, traversal: Traversal) -> Option<u32> {
    if modulus == 0 {
        return None;
    }
    let term = |i: usize, d: u8| {
        let w = weight_at(weights, i);
        (u32::from(d) * w + w) % modulus
    };
    let sum: u32 = match traversal {
        Traversal::RightToLeft => digits.iter().rev().enumerate().map(|(i, d)| term(i, *d)).sum(),
        Traversal::LeftToRight => digits.iter().enumerate().map(|(i, d)| term(i, *d)).sum(),
    };
    Some(sum % 10)
}

/// Plain modulus (method 97): the slice read as one integer, modulo `m`.
pub fn plain_modulus(digits: &[u8], modulus: u32) -> Option<u32> {
    if modulus == 0 {
        return None;
    }
    let value = digits.iter().fold(0u64, |acc, d| acc * 10 + u64::from(*d));
    Some((value % u64::from(modulus)) as u32)
}

/// Transformation rows of the iterated M10H procedure. The digit nearest the
/// check digit uses row 0, the next one row 1, and so on, cycling every four.
pub const M10H_ROWS: [[u32; 10]; 4] = [
    [0, 1, 5, 9, 3, 7, 4, 8, 2, 6],
    [0, 1, 7, 6, 9, 8, 3, 2, 5, 4],
    [0, 1, 8, 4, 6, 2, 9, 5, 7, 3],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
];

/// Table transformation "M10H" (methods 29, 27 above 999 999 999, 69, B8,
/// C5): digits are read most-significant first, each mapped through its
/// position's row; the check value is `10 - (sum mod 10)`, with 10 read as 0.
pub fn table_transform(digits: &[u8]) -> u32 {
    let n = digits.len();
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| M10H_ROWS[(n - 1 - i) % 4][usize::from(*d % 10)])
        .sum();
    (10 - sum % 10) % 10
}

// ---------------------------------------------------------------------------
// Historical reconstruction (ESER)
// ---------------------------------------------------------------------------

/// Position of the check digit inside a reconstructed legacy number,
/// counted from the left.
pub const ESER_CHECK_INDEX: usize = 5;

/// Layout used to rebuild a legacy savings-bank account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EserLayout {
    /// Eight-digit accounts `XPNNNNNN` (methods 52, C0):
    /// `BLZ[5..8] X P N…` with leading zeros of `N…` removed.
    Eight,
    /// Nine-digit accounts `XTPNNNNNN` (methods 53, B6):
    /// `BLZ[5] BLZ[6] T BLZ[8] X P N…` with leading zeros of `N…` removed.
    Nine,
}

/// Rebuild the legacy number for `digits` under `layout`.
///
/// Returns `None` when the account does not have the length the layout
/// requires (exactly eight or nine significant digits).
pub fn eser_number(bank: &BankCode, digits: &[u8; 10], layout: EserLayout) -> Option<Vec<u8>> {
    let b = bank.digits();
    let mut alt = match layout {
        EserLayout::Eight => {
            if digits[0] != 0 || digits[1] != 0 || digits[2] == 0 {
                return None;
            }
            vec![b[4], b[5], b[6], b[7], digits[2], digits[3]]
        }
        EserLayout::Nine => {
            if digits[0] != 0 || digits[1] == 0 {
                return None;
            }
            vec![b[4], b[5], digits[2], b[7], digits[1], digits[3]]
        }
    };
    alt.extend(digits[4..].iter().skip_while(|d| **d == 0));
    Some(alt)
}

/// Historical-reconstruction kernel (methods 52, 53, B6, C0).
///
/// The weighted mod-11 sum is taken with the digit at `check_index` left
/// out; the result is the factor `f ∈ [0, m)` for which
/// `(r + f · w_check) mod 11 == 10`. The account is valid iff `f` equals the
/// stated check digit.
pub fn historical_reconstruction(
    alt: &[u8],
    check_index: usize,
    weights: &[u32],
    modulus: u32,
) -> Option<u32> {
    if modulus == 0 || check_index >= alt.len() {
        return None;
    }
    let n = alt.len();
    let mut sum = 0;
    let mut check_weight = 0;
    for (i, d) in alt.iter().rev().enumerate() {
        let w = weight_at(weights, i);
        if n - 1 - i == check_index {
            check_weight = w;
        } else {
            sum += u32::from(*d) * w;
        }
    }
    let r = sum % modulus;
    (0..modulus).find(|f| (r + f * check_weight) % 11 == 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W00: &[u32] = &[2, 1, 2, 1, 2, 1, 2, 1, 2];

    #[test]
    fn cross_sum_of_products() {
        assert_eq!(cross_sum(0), 0);
        assert_eq!(cross_sum(18), 9);
        assert_eq!(cross_sum(199), 19);
    }

    #[test]
    fn weights_cycle_when_short() {
        let sum = weighted_sum(&[1, 1, 1, 1], &[2, 1], Traversal::RightToLeft, Reduction::Product);
        assert_eq!(sum, 6);
    }

    #[test]
    fn traversal_direction_matters() {
        let rl = weighted_sum(&[1, 0, 0], &[1, 2, 3], Traversal::RightToLeft, Reduction::Product);
        let lr = weighted_sum(&[1, 0, 0], &[1, 2, 3], Traversal::LeftToRight, Reduction::Product);
        assert_eq!(rl, 3);
        assert_eq!(lr, 1);
    }

    #[test]
    fn luhn_style_check_value() {
        // Products from the right: 2, 0, 14→5, 0, 18→9, 2, 18→9 = 27
        let digits = [0, 0, 9, 2, 9, 0, 7, 0, 1];
        let v = weighted_sum_mod(&digits, W00, 10, Scheme::LUHN);
        assert_eq!(v, Some(3));
    }

    #[test]
    fn mod11_remaps_zero_and_one() {
        // Single digit 5 weighted 2 -> 10 mod 11 = 10 -> 11 - 10 = 1.
        assert_eq!(weighted_sum_mod(&[5], &[2], 11, Scheme::MOD11), Some(1));
        // Sum 0 -> remainder 0 -> 0.
        assert_eq!(weighted_sum_mod(&[0], &[2], 11, Scheme::MOD11), Some(0));
        // 6*2 = 12 -> remainder 1 -> 0 under MOD11, unassignable under MOD11_STRICT.
        assert_eq!(weighted_sum_mod(&[6], &[2], 11, Scheme::MOD11), Some(0));
        assert_eq!(weighted_sum_mod(&[6], &[2], 11, Scheme::MOD11_STRICT), None);
    }

    #[test]
    fn outcome_variants() {
        // sum = 23
        let digits = [2, 3];
        let w = [1, 10];
        let base = Scheme::COMPLEMENT;
        assert_eq!(weighted_sum_mod(&digits, &w, 10, base.outcome(Outcome::Remainder)), Some(3));
        assert_eq!(weighted_sum_mod(&digits, &w, 10, base.outcome(Outcome::NextFive)), Some(2));
        assert_eq!(weighted_sum_mod(&digits, &w, 10, base.outcome(Outcome::Quotient)), Some(2));
        assert_eq!(weighted_sum_mod(&digits, &w, 10, base.outcome(Outcome::Sum)), Some(23));
        // 23 + 7 = 30, remainder 0 maps to 0
        assert_eq!(weighted_sum_mod(&digits, &w, 10, base.offset(7)), Some(0));
    }

    #[test]
    fn factor_search_handles_zero_sum() {
        assert_eq!(factor_search(&[0; 6], &[2, 1], 11), None);
        // 0446786040, method 17: positions 2-7 give 34, (34-1) mod 11 = 0.
        assert_eq!(factor_search(&[4, 4, 6, 7, 8, 6], &[2, 1, 2, 1, 2, 1], 11), Some(0));
    }

    #[test]
    fn digit_collapse_reduces_to_single_digit() {
        // Cross-summed products 2,1,... ; 99 -> 18 -> 9 -> 10 - 9 = 1
        let digits = [9, 9, 9, 9, 9, 9, 9, 9, 9];
        // products: 18→9,9,18→9,... all nine terms are 9 -> 81 -> 9 -> 1
        assert_eq!(digit_collapse(&digits, W00, 10), Some(1));
        assert_eq!(digit_collapse(&[0; 9], W00, 10), Some(0));
    }

    #[test]
    fn mod10_product_keeps_units_digit() {
        // 9*3 = 27 -> 7 ; 10 - 7 = 3
        assert_eq!(mod10_product(&[9], &[3], 10), Some(3));
    }

    #[test]
    fn custom_mod_adds_weight_to_each_product() {
        // B9 example 87920187: slice 8792018, check digit 7 after +5 retry.
        let v = custom_mod(&[8, 7, 9, 2, 0, 1, 8], &[1, 3, 2, 1, 3, 2, 1], 11, Traversal::RightToLeft);
        assert_eq!(v, Some(2));
    }

    #[test]
    fn plain_modulus_reads_integer() {
        assert_eq!(plain_modulus(&[1, 2, 3], 11), Some(2));
        assert_eq!(plain_modulus(&[1, 2, 3], 0), None);
    }

    #[test]
    fn m10h_reference_account() {
        // 3145863029 is the published method 29 example.
        assert_eq!(table_transform(&[3, 1, 4, 5, 8, 6, 3, 0, 2]), 9);
        assert_eq!(table_transform(&[0; 9]), 0);
    }

    #[test]
    fn eser8_layout_and_factor() {
        let bank = BankCode::parse("13051172").unwrap();
        let alt = eser_number(&bank, &[0, 0, 4, 3, 0, 0, 1, 5, 0, 0], EserLayout::Eight).unwrap();
        assert_eq!(alt, vec![1, 1, 7, 2, 4, 3, 1, 5, 0, 0]);
        let w = [2, 4, 8, 5, 10, 9, 7, 3, 6, 1, 2, 4];
        assert_eq!(historical_reconstruction(&alt, ESER_CHECK_INDEX, &w, 11), Some(3));
    }

    #[test]
    fn eser_rejects_wrong_lengths() {
        let bank = BankCode::parse("13051172").unwrap();
        assert!(eser_number(&bank, &[0, 4, 3, 0, 0, 1, 5, 0, 0, 1], EserLayout::Eight).is_none());
        assert!(eser_number(&bank, &[0, 0, 4, 3, 0, 0, 1, 5, 0, 0], EserLayout::Nine).is_none());
    }
}
