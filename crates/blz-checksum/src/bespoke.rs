//! Account-shape rules and multi-step procedures that do not reduce to a
//! weighted sum over a fixed slice.

use blz_core::ACCOUNT_LENGTH;

// ---------------------------------------------------------------------------
// Method 57: classification by the first two digits
// ---------------------------------------------------------------------------

/// How method 57 treats an account, chosen by its first two digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method57Class {
    /// Prefix `00`: never valid.
    Rejected,
    /// Modulus 10 over positions 1-9, check digit at position 10.
    Standard,
    /// Modulus 10 over all positions except the third, which is the check digit.
    InteriorCheck,
    /// No check digit.
    Unchecked,
    /// Prefixes `01`-`31`: a date-like structure instead of a check digit.
    Structured,
}

/// Classify an account for method 57.
pub fn method_57_class(prefix: u64) -> Method57Class {
    match prefix {
        0 => Method57Class::Rejected,
        1..=31 => Method57Class::Structured,
        40 | 50 | 91 | 99 => Method57Class::Unchecked,
        51 | 55 | 61 | 64..=66 | 70 | 73..=82 | 88 | 94 | 95 => Method57Class::Standard,
        _ => Method57Class::InteriorCheck,
    }
}

/// Structured 57 accounts: positions 3-4 form a month (`01`-`12`) and
/// positions 7-9 stay below 500. One published account is exempt.
pub fn method_57_structured_valid(digits: &[u8; ACCOUNT_LENGTH]) -> bool {
    let month = digits[2] * 10 + digits[3];
    let serial = u32::from(digits[6]) * 100 + u32::from(digits[7]) * 10 + u32::from(digits[8]);
    ((1..=12).contains(&month) && serial < 500) || *digits == [0, 1, 8, 5, 1, 2, 5, 4, 3, 4]
}

/// Standard 57 accounts with these six-digit prefixes carry no check digit.
pub const METHOD_57_EXEMPT_PREFIXES: [u64; 2] = [777_777, 888_888];

// ---------------------------------------------------------------------------
// Constant-prefix methods
// ---------------------------------------------------------------------------

/// Seven-digit constants placed in front of the account for method C6,
/// selected by the first account digit.
pub const C6_PREFIXES: [[u8; 7]; 10] = [
    [4, 4, 5, 1, 9, 7, 0],
    [4, 4, 5, 1, 9, 8, 1],
    [4, 4, 5, 1, 9, 9, 2],
    [4, 4, 5, 1, 9, 9, 3],
    [4, 3, 4, 4, 9, 9, 2],
    [4, 3, 4, 4, 9, 9, 0],
    [4, 3, 4, 4, 9, 9, 1],
    [5, 4, 9, 9, 5, 7, 0],
    [4, 4, 5, 1, 9, 9, 4],
    [5, 4, 9, 9, 5, 7, 9],
];

/// Constant placed in front of positions 1-9 for methods D1 and D4.
pub const SAVINGS_PREFIX: [u8; 6] = [4, 2, 8, 2, 5, 9];

/// Constant placed in front of the first digit for method E2.
pub const E2_PREFIX: [u8; 6] = [4, 3, 8, 3, 2, 0];

/// Working slice for method C6: the constant for the first digit, then
/// positions 2-9.
pub fn c6_slice(digits: &[u8; ACCOUNT_LENGTH]) -> Vec<u8> {
    let mut slice = C6_PREFIXES[usize::from(digits[0] % 10)].to_vec();
    slice.extend_from_slice(&digits[1..9]);
    slice
}

/// Working slice for methods D1 and D4: the savings constant, then
/// positions 1-9.
pub fn savings_slice(digits: &[u8; ACCOUNT_LENGTH]) -> Vec<u8> {
    let mut slice = SAVINGS_PREFIX.to_vec();
    slice.extend_from_slice(&digits[..9]);
    slice
}

/// Working slice for method E2: the constant with the first digit
/// appended, then positions 2-9.
pub fn e2_slice(digits: &[u8; ACCOUNT_LENGTH]) -> Vec<u8> {
    let mut slice = E2_PREFIX.to_vec();
    slice.extend_from_slice(&digits[..9]);
    slice
}

// ---------------------------------------------------------------------------
// Method 87a: alternating accumulator walk
// ---------------------------------------------------------------------------

const WALK_TABLE_EVEN: [i32; 5] = [0, 4, 3, 2, 6];
const WALK_TABLE_ODD: [i32; 5] = [7, 1, 5, 9, 8];

/// The accumulator walk of method 87, variant A.
///
/// Digits from position 4 (first non-zero) through position 9 are remapped
/// (`0→5`, `1→6`, `5→10`, `6→1`) and folded into an accumulator whose sign
/// and carry flip with each step. The accumulator, brought into `0..=4`,
/// selects the expected check digit from one of two tables. When position 4
/// is zero the check digit may also differ from the table value by five.
pub fn walk_87a(digits: &[u8; ACCOUNT_LENGTH]) -> bool {
    // 1-based copy so positions read like the published rule.
    let mut kto = [0i32; ACCOUNT_LENGTH + 1];
    for (slot, d) in kto[1..].iter_mut().zip(digits.iter()) {
        *slot = i32::from(*d);
    }

    let mut i = 4;
    while i < 10 && kto[i] == 0 {
        i += 1;
    }
    let mut carry = (i % 2) as i32;
    let mut odd = 0;
    let mut acc = 0i32;

    while i < 10 {
        kto[i] = match kto[i] {
            0 => 5,
            1 => 6,
            5 => 10,
            6 => 1,
            other => other,
        };
        let d = kto[i];
        if carry == odd {
            if d > 5 {
                if carry == 0 && odd == 0 {
                    carry = 1;
                    odd = 1;
                    acc += 6 - (d - 6);
                } else {
                    carry = 0;
                    odd = 0;
                    acc += d;
                }
            } else {
                carry = if carry == 0 && odd == 0 { 1 } else { 0 };
                acc += d;
            }
        } else if d > 5 {
            if carry == 0 {
                carry = 1;
                odd = 0;
                acc += -6 + (d - 6);
            } else {
                carry = 0;
                odd = 1;
                acc -= d;
            }
        } else {
            carry = if carry == 0 { 1 } else { 0 };
            acc -= d;
        }
        i += 1;
    }

    acc = acc.rem_euclid(5);
    let table = if odd == 0 { WALK_TABLE_EVEN } else { WALK_TABLE_ODD };
    let mut expected = table[acc as usize];
    if expected == kto[10] {
        return true;
    }
    if kto[4] == 0 {
        expected = if expected > 4 { expected - 5 } else { expected + 5 };
        return expected == kto[10];
    }
    false
}
