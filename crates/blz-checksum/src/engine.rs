//! # Checksum Engine
//!
//! Runs one method against one account in three stages:
//!
//! 1. **Pre-processing** dispatches on the active identifier. It may settle
//!    the verdict outright (exception ranges, malformed shapes), rewrite
//!    digits, cut a different working slice, or redirect to another
//!    identifier, whose own pre-processing then runs.
//! 2. **Primary kernel** dispatches on the identifier the state ended up
//!    with and compares the computed value to the expected digit.
//! 3. **Fallback ladder**, keyed by the identifier the caller asked for,
//!    is tried in order after a failure and stops at the first success. A
//!    stage with a ladder of its own runs that ladder in place.
//!
//! ## Sub-account retries
//!
//! Methods 13, 26, 50, 63, 76 and C7 accept accounts entered without their
//! two-digit sub-account by re-reading them two places further left. IBAN
//! generation must embed the account exactly as entered, so
//! [`CheckOptions::for_iban`] disables those stages.

use std::sync::Arc;

use blz_core::{AccountDigits, BankCode, MethodId, ResultCode, Verdict, ACCOUNT_LENGTH};
use tracing::debug;

use crate::bespoke::{
    c6_slice, e2_slice, method_57_class, method_57_structured_valid, savings_slice, walk_87a,
    Method57Class, METHOD_57_EXEMPT_PREFIXES,
};
use crate::kernels::{
    custom_mod, digit_collapse, eser_number, factor_search, historical_reconstruction,
    mod10_product, plain_modulus, table_transform, weighted_sum_mod, EserLayout, Outcome,
    Reduction, Remap, Scheme, Traversal, ESER_CHECK_INDEX,
};
use crate::registry::{MethodParameters, MethodRegistry};

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Validation on behalf of IBAN generation; disables sub-account retries.
    pub for_iban: bool,
    /// Whether fallback ladders run after a failed primary check.
    pub alternatives: bool,
}

impl CheckOptions {
    /// Options used by IBAN generation.
    pub fn for_iban() -> Self {
        Self {
            for_iban: true,
            alternatives: true,
        }
    }
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            for_iban: false,
            alternatives: true,
        }
    }
}

/// Working state threaded from pre-processing into a kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodState {
    /// Active identifier; changes when pre-processing redirects.
    pub id: MethodId,
    /// Parameters of the active identifier, with any dynamic window applied.
    pub params: MethodParameters,
    /// The padded account, possibly with rewritten positions.
    pub digits: [u8; ACCOUNT_LENGTH],
    /// Digits the kernel consumes.
    pub slice: Vec<u8>,
    /// The stated check digit.
    pub expected: u8,
}

impl MethodState {
    fn new(id: MethodId, params: MethodParameters, digits: [u8; ACCOUNT_LENGTH]) -> Self {
        Self {
            slice: params.slice(&digits),
            expected: digits[params.check],
            id,
            params,
            digits,
        }
    }

    fn window(mut self, start: usize, stop: usize, check: usize) -> Self {
        self.params.start = start;
        self.params.stop = stop;
        self.params.check = check;
        self.slice = self.params.slice(&self.digits);
        self.expected = self.digits[check];
        self
    }

    fn with_slice(mut self, slice: Vec<u8>) -> Self {
        self.slice = slice;
        self
    }

    fn zeroed(mut self, positions: &[usize]) -> Self {
        for p in positions {
            self.digits[*p] = 0;
        }
        self.slice = self.params.slice(&self.digits);
        self.expected = self.digits[self.params.check];
        self
    }
}

/// Result of pre-processing.
enum Step {
    Settled(Verdict),
    Run(MethodState),
}

fn unchecked(state: MethodState) -> Step {
    Step::Settled(Verdict::no_checksum(state.id))
}

fn rejected(state: MethodState) -> Step {
    Step::Settled(Verdict::bad_account(state.id, None))
}

struct Call<'a> {
    account: &'a AccountDigits,
    bank: &'a BankCode,
}

/// Stateless checksum evaluator over a shared [`MethodRegistry`].
#[derive(Debug, Clone)]
pub struct ChecksumEngine {
    registry: Arc<MethodRegistry>,
}

impl ChecksumEngine {
    /// Create an engine over the given registry.
    pub fn new(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    /// Create an engine over the standard method table.
    pub fn standard() -> Self {
        Self::new(Arc::new(MethodRegistry::standard()))
    }

    /// The registry this engine reads.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Validate `account` under `method`.
    ///
    /// Never fails: the outcome, including unknown identifiers, is encoded
    /// in the returned [`Verdict`].
    pub fn check(
        &self,
        method: &MethodId,
        account: &AccountDigits,
        bank: &BankCode,
        options: CheckOptions,
    ) -> Verdict {
        self.resolve(method.as_str(), &Call { account, bank }, options)
    }

    /// Runs `id`, then its fallback ladder. A stage that has a ladder of its
    /// own is resolved the same way before the next stage is tried.
    fn resolve(&self, id: &str, call: &Call<'_>, options: CheckOptions) -> Verdict {
        let primary = self.attempt(id, call);
        if primary.valid || primary.code == ResultCode::NoMethod || !options.alternatives {
            return primary;
        }
        for variant in fallbacks(id, call.account, options) {
            let verdict = self.resolve(variant, call, options);
            if verdict.valid {
                debug!(method = id, variant, "fallback stage accepted account");
                return verdict;
            }
        }
        primary
    }

    /// The state the primary kernel would run with, or the verdict that
    /// pre-processing settled on.
    pub fn prepare_state(
        &self,
        method: &MethodId,
        account: &AccountDigits,
        bank: &BankCode,
    ) -> Result<MethodState, Verdict> {
        match self.prepare(method.as_str(), &Call { account, bank }) {
            Step::Run(state) => Ok(state),
            Step::Settled(verdict) => Err(verdict),
        }
    }

    fn attempt(&self, id: &str, call: &Call<'_>) -> Verdict {
        match self.prepare(id, call) {
            Step::Settled(verdict) => verdict,
            Step::Run(state) => {
                let position = state.params.check;
                if self.primary(&state, call) {
                    Verdict::ok(state.id, position)
                } else {
                    Verdict::bad_account(state.id, Some(position))
                }
            }
        }
    }

    fn prepare(&self, id: &str, call: &Call<'_>) -> Step {
        let Some((id, params)) = self.registry.entry(id) else {
            return Step::Settled(Verdict::no_method(MethodId::new(id).ok()));
        };
        let state = MethodState::new(id.clone(), *params, *call.account.digits());
        self.preprocess(state, call)
    }

    // -----------------------------------------------------------------------
    // Pre-processing
    // -----------------------------------------------------------------------

    fn preprocess(&self, state: MethodState, call: &Call<'_>) -> Step {
        let a = call.account;
        let d = *a.digits();
        let n = a.digit_count();
        let twin_nines = d[2] == 9 && d[3] == 9;
        let id = state.id.clone();

        match id.as_str() {
            "08" if a.value() < 60_000 => unchecked(state),
            "13b" | "26b" | "76b" if d[0] != 0 || d[1] != 0 => rejected(state),
            "76b" if matches!(d[2], 1 | 2 | 3 | 5) => rejected(state),
            "50b" | "63b" if d[..3] != [0, 0, 0] => rejected(state),
            "24" => {
                let mut digits = d;
                match digits[0] {
                    3..=6 => digits[0] = 0,
                    9 => digits[..3].fill(0),
                    _ => {}
                }
                let first = digits[..9].iter().position(|x| *x != 0).unwrap_or(9);
                Step::Run(state.with_slice(digits[first..9].to_vec()))
            }
            "27" if a.value() > 999_999_999 => self.prepare("29", call),
            "41" if d[3] == 9 => Step::Run(state.window(3, 8, 9)),
            "45" if d[0] == 0 || d[4] == 1 => unchecked(state),
            "51" | "73" | "80" | "81" | "84" | "87" | "A8" if d[2] == 9 => {
                self.prepare("51d", call)
            }
            "52" | "53" if n == 10 && d[0] == 9 => self.prepare("20", call),
            "54" if a.prefix(2) != 49 => rejected(state),
            "57" => match method_57_class(a.prefix(2)) {
                Method57Class::Rejected => rejected(state),
                Method57Class::Unchecked => unchecked(state),
                Method57Class::Structured if method_57_structured_valid(&d) => unchecked(state),
                Method57Class::Structured => rejected(state),
                Method57Class::Standard if METHOD_57_EXEMPT_PREFIXES.contains(&a.prefix(6)) => {
                    unchecked(state)
                }
                Method57Class::Standard => Step::Run(state),
                Method57Class::InteriorCheck => self.prepare("57b", call),
            },
            "59" if n < 9 => unchecked(state),
            "61" if d[8] == 8 => self.prepare("61b", call),
            "63" if d[0] != 0 => rejected(state),
            "65" if d[8] == 9 => self.prepare("65b", call),
            "66" if d[1] == 9 => unchecked(state),
            "66" if d[0] != 0 => rejected(state),
            "68" if n == 10 && d[3] == 9 => self.prepare("68c", call),
            "68" if n == 10 || n < 6 => rejected(state),
            "68" if a.in_range(400_000_000, 499_999_999) => unchecked(state),
            "68b" => Step::Run(state.zeroed(&[2, 3])),
            "69" if n == 10 && a.prefix(2) == 93 => unchecked(state),
            "69" if n == 10 && a.prefix(2) == 97 => self.prepare("29", call),
            "70" if d[3] == 5 || (d[3] == 6 && d[4] == 9) => Step::Run(state.window(3, 8, 9)),
            "75" => match n {
                6 | 7 => Step::Run(state),
                9 if d[1] == 9 => Step::Run(state.window(2, 6, 7)),
                9 => Step::Run(state.window(1, 5, 6)),
                _ => rejected(state),
            },
            "76" if matches!(d[0], 1 | 2 | 3 | 5) => rejected(state),
            "78" if n == 8 => unchecked(state),
            "79" if d[0] == 0 => rejected(state),
            "79" if matches!(d[0], 1 | 2 | 9) => self.prepare("79b", call),
            "82" if twin_nines => self.prepare("10", call),
            "83" if twin_nines => self.prepare("83c", call),
            "85" if twin_nines => self.prepare("85c", call),
            "86" if d[2] == 9 => self.prepare("86b", call),
            "87" => self.prepare("87a", call),
            "88" if d[2] == 9 => self.prepare("88a", call),
            "89" if n == 10 => self.prepare("10", call),
            "89" if n < 8 => unchecked(state),
            "90" if d[2] == 9 => self.prepare("90f", call),
            "93" | "93b" if d[..4] != [0, 0, 0, 0] => Step::Run(state.window(0, 4, 5)),
            "95" if [
                (1, 1_999_999),
                (9_000_000, 25_999_999),
                (396_000_000, 499_999_999),
                (700_000_000, 799_999_999),
                (910_000_000, 989_999_999),
            ]
            .iter()
            .any(|(lo, hi)| a.in_range(*lo, *hi)) =>
            {
                unchecked(state)
            }
            "96a" if a.in_range(1_300_000, 99_399_999) => unchecked(state),
            "96a" => rejected(state),
            "99" if a.in_range(396_000_000, 499_999_999) => unchecked(state),
            "A0" if a.value() < 1_000 => unchecked(state),
            "A1" if n != 8 && n != 10 => rejected(state),
            "A4" if twin_nines => self.prepare("A4b", call),
            "A6" if d[1] != 8 => self.prepare("01", call),
            "B0" if n != 10 || d[0] == 8 => rejected(state),
            "B0" if matches!(d[7], 1 | 2 | 3 | 6) => unchecked(state),
            "B2" if d[0] >= 8 => self.prepare("00", call),
            "B3" if d[0] == 9 => self.prepare("06", call),
            "B4" if d[0] != 9 => self.prepare("B4a", call),
            "B6" if d[0] == 0 && !(2_691..=2_699).contains(&a.prefix(5)) => {
                self.prepare("53", call)
            }
            "B7" if !(a.in_range(1_000_000, 5_999_999) || a.in_range(700_000_000, 899_999_999)) => {
                unchecked(state)
            }
            "B8a" if a.in_range(5_100_000_000, 5_999_999_999)
                || a.in_range(9_010_000_000, 9_109_999_999) =>
            {
                unchecked(state)
            }
            "B8a" => rejected(state),
            "B9" if n == 7 => self.prepare("B9a", call),
            "B9" if n != 8 => rejected(state),
            "B9a" if n != 7 => rejected(state),
            "C0" if n != 8 => self.prepare("20", call),
            "C1" if d[0] == 5 => self.prepare("C1a", call),
            "C3" | "C4" if d[0] == 9 => self.prepare("58", call),
            "C5" => {
                let first = d[a.leading_zeros()];
                match n {
                    6 | 9 if (1..=8).contains(&first) => self.prepare("75", call),
                    10 if matches!(first, 1 | 4 | 5 | 6 | 9) => self.prepare("29", call),
                    10 if first == 3 => self.prepare("00", call),
                    10 if matches!(a.prefix(2), 70 | 85) => unchecked(state),
                    8 if (3..=5).contains(&first) => unchecked(state),
                    _ => rejected(state),
                }
            }
            "C6" => Step::Run(state.with_slice(c6_slice(&d))),
            "C7" => self.prepare("63", call),
            "D0" if n == 10 && a.prefix(2) == 57 => unchecked(state),
            "D1" if matches!(d[0], 0 | 3 | 9) => rejected(state),
            "D4" if d[0] == 0 => rejected(state),
            "D1" | "D4" => Step::Run(state.with_slice(savings_slice(&d))),
            "D2" => self.prepare("95", call),
            "D5" if !twin_nines => self.prepare("D5a", call),
            "D8" if d[0] == 0 && a.in_range(10_000_000, 99_999_999) => unchecked(state),
            "D8" if d[0] == 0 => rejected(state),
            "E2" if d[0] >= 6 => rejected(state),
            "E2" => Step::Run(state.with_slice(e2_slice(&d))),
            _ if !state.params.has_checksum() => unchecked(state),
            _ => Step::Run(state),
        }
    }

    // -----------------------------------------------------------------------
    // Primary kernels
    // -----------------------------------------------------------------------

    fn primary(&self, state: &MethodState, call: &Call<'_>) -> bool {
        let p = &state.params;
        let w = p.weights;
        let m = p.modulus;
        let s = state.slice.as_slice();
        let d = &state.digits;
        let e = u32::from(state.expected);
        let hit = |value: Option<u32>| value == Some(e);

        match state.id.as_str() {
            "00" | "08" | "13" | "13b" | "27" | "41" | "45" | "49" | "51b" | "57" | "57b" | "59"
            | "60" | "61" | "61b" | "62" | "63" | "63b" | "65" | "65b" | "67" | "68" | "68b"
            | "68c" | "72" | "73" | "73a" | "73b" | "74" | "75" | "78" | "79" | "79b" | "80"
            | "80a" | "84b" | "86" | "94" | "A1" | "A2" | "A3" | "A5" | "A6" | "A7" | "A8a"
            | "B4" | "C3" | "C6" | "C8" | "C9" | "D1" | "D3" | "D4" | "D8" | "D9" | "E2" | "E3" => {
                hit(weighted_sum_mod(s, w, m, Scheme::LUHN))
            }

            "01" | "03" | "05" | "18" | "30" | "43" | "51c" | "83b" | "84a" | "85b" | "87c"
            | "90c" | "90d" | "90e" | "90g" | "92" | "93b" | "98" | "A4a" | "A9" | "B1" | "B5"
            | "B7" | "D5b" | "D5c" => hit(weighted_sum_mod(s, w, m, Scheme::COMPLEMENT)),

            "06" | "10" | "15" | "19" | "20" | "26" | "26b" | "28" | "32" | "33" | "34" | "36"
            | "37" | "38" | "39" | "40" | "42" | "44" | "46" | "47" | "48" | "50" | "50b" | "51"
            | "51a" | "51d" | "51e" | "55" | "64" | "69" | "70" | "81" | "82" | "83" | "83a"
            | "83c" | "84" | "85" | "85a" | "86a" | "86b" | "87b" | "88" | "88a" | "90" | "90b"
            | "90f" | "91" | "91b" | "91c" | "91d" | "93" | "95" | "96" | "99" | "A0" | "A4"
            | "A4b" | "A8" | "B0" | "B3" | "B6" | "B8" | "C4" | "D0" | "D5" | "D5a" => {
                hit(weighted_sum_mod(s, w, m, Scheme::MOD11))
            }

            "02" | "04" | "07" | "14" | "58" | "85c" | "B2" | "B4a" | "D6" | "E4" => {
                hit(weighted_sum_mod(s, w, m, Scheme::MOD11_STRICT))
            }

            "11" => hit(weighted_sum_mod(s, w, m, Scheme::MOD11.remap(Remap::To(0), Remap::To(9)))),
            "54" => hit(weighted_sum_mod(
                s,
                w,
                m,
                Scheme::MOD11.remap(Remap::Unassignable, Remap::Unassignable),
            )),
            "66" => hit(weighted_sum_mod(s, w, m, Scheme::MOD11.remap(Remap::To(1), Remap::To(0)))),
            "71" => hit(weighted_sum_mod(s, w, m, Scheme::MOD11.remap(Remap::To(0), Remap::To(1)))),
            "89" => hit(weighted_sum_mod(s, w, m, Scheme::MOD11.reduced(Reduction::CrossSum))),

            "16" | "23" | "25" => {
                match weighted_sum_mod(s, w, m, Scheme::REMAINDER) {
                    Some(1) => match state.id.as_str() {
                        "16" => d[8] == d[9],
                        "23" => d[5] == d[6],
                        _ => e == 0 && matches!(d[1], 8 | 9),
                    },
                    _ => hit(weighted_sum_mod(s, w, m, Scheme::MOD11)),
                }
            }
            "56" => match weighted_sum_mod(s, w, m, Scheme::REMAINDER) {
                Some(0) => d[0] == 9 && e == 8,
                Some(1) => d[0] == 9 && e == 7,
                Some(r) => e == m - r,
                None => false,
            },
            "31" | "76" | "76b" => hit(weighted_sum_mod(s, w, m, Scheme::REMAINDER)),
            "35" => match weighted_sum_mod(s, w, m, Scheme::REMAINDER) {
                Some(10) => d[8] == d[9],
                r => hit(r),
            },
            "77" | "77b" => weighted_sum_mod(s, w, m, Scheme::REMAINDER) == Some(0),
            "97" => hit(plain_modulus(s, m).map(|r| if r == 10 { 0 } else { r })),
            "D7" => hit(weighted_sum_mod(s, w, m, Scheme::LUHN.outcome(Outcome::Remainder))),
            "E0" => hit(weighted_sum_mod(s, w, m, Scheme::LUHN.offset(7))),
            "74b" => hit(weighted_sum_mod(s, w, m, Scheme::LUHN.outcome(Outcome::NextFive))),
            "E1" => {
                let ascii: Vec<u8> = s.iter().map(|x| x + b'0').collect();
                hit(weighted_sum_mod(&ascii, w, m, Scheme::REMAINDER))
            }

            "17" | "C1" | "C1a" => hit(factor_search(s, w, m)),
            "21" => hit(digit_collapse(s, w, m)),
            "22" | "C2" => hit(mod10_product(s, w, m)),
            "24" => hit(custom_mod(s, w, m, Traversal::LeftToRight)),
            "B9" => {
                let r = custom_mod(s, w, m, Traversal::RightToLeft);
                hit(r) || hit(r.map(|r| (r + 5) % 10))
            }
            "B9a" => {
                let r = weighted_sum_mod(s, w, m, Scheme::REMAINDER);
                hit(r) || hit(r.map(|r| (r + 5) % 10))
            }
            "29" => e == table_transform(s),
            "52" | "53" | "C0" => {
                let layout = if state.id.as_str() == "53" {
                    EserLayout::Nine
                } else {
                    EserLayout::Eight
                };
                eser_number(call.bank, d, layout)
                    .map(|alt| hit(historical_reconstruction(&alt, ESER_CHECK_INDEX, w, m)))
                    .unwrap_or(false)
            }
            "87a" => walk_87a(d),

            _ => false,
        }
    }
}

impl Default for ChecksumEngine {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Fallback ladders
// ---------------------------------------------------------------------------

/// Ordered fallback stages for `id`, given the account and options.
///
/// Only the direct stages are listed. [`ChecksumEngine::check`] expands a
/// stage's own ladder when it reaches it, so `A4` tries `93b` through `93`
/// and `D2` tries `68b` through `68`.
pub fn fallbacks(id: &str, a: &AccountDigits, options: CheckOptions) -> &'static [&'static str] {
    let d = a.digits();
    let n = a.digit_count();
    let exception = d[2] == 9;
    let twin_nines = d[2] == 9 && d[3] == 9;
    let shifts = !options.for_iban;

    match id {
        "13" if shifts => &["13b"],
        "26" if shifts => &["26b"],
        "50" if shifts => &["50b"],
        "63" if shifts => &["63b"],
        "76" if shifts => &["76b"],
        "77" => &["77b"],
        "C7" if shifts => &["63b", "06"],
        "C7" => &["06"],
        "49" => &["01"],
        "51" | "73" | "80" | "81" | "84" | "87" | "A8" if exception => &["51e"],
        "51" => &["51a", "51b", "51c"],
        "68" if (6..=9).contains(&n) => &["68b"],
        "69" => &["29"],
        "73" => &["73a", "73b"],
        "74" if n == 6 => &["74b"],
        "80" => &["80a"],
        "83" if !twin_nines => &["83a", "83b"],
        "84" => &["84a", "84b"],
        "85" if !twin_nines => &["85a", "85b"],
        "86" if !exception => &["86a"],
        "87" => &["87b", "87c"],
        "90" if !exception => &["90b", "90c", "90d", "90e", "90g"],
        "91" => &["91b", "91c", "91d"],
        "93" => &["93b"],
        "96" => &["00", "96a"],
        "98" => &["32"],
        "A2" => &["04"],
        "A3" => &["10"],
        "A4" if twin_nines => &["93"],
        "A4" => &["A4a", "93"],
        "A5" if d[0] != 9 => &["10"],
        "A7" => &["03"],
        "A8" => &["A8a"],
        "A9" => &["06"],
        "B1" => &["01", "00"],
        "B5" if !matches!(d[0], 8 | 9) => &["00"],
        "B8" => &["29", "B8a"],
        "C0" if n == 8 => &["20"],
        "C2" => &["00"],
        "C8" => &["04", "07"],
        "C9" => &["07"],
        "D2" => &["00", "68"],
        "D3" => &["27"],
        "D5" if !twin_nines => &["D5b", "D5c"],
        "D6" => &["03", "00"],
        "D9" => &["10", "18"],
        "E3" => &["21"],
        "E4" => &["00"],
        _ => &[],
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any account is judged identically on repeated calls, for every
        /// registered identifier.
        #[test]
        fn verdicts_are_deterministic(value in 0u64..=9_999_999_999, idx in 0usize..200) {
            let engine = ChecksumEngine::standard();
            let ids = engine.registry().ids();
            let method: MethodId = (*ids[idx % ids.len()]).clone();
            let account = AccountDigits::from_value(value).unwrap();
            let bank = BankCode::parse("13051172").unwrap();
            let first = engine.check(&method, &account, &bank, CheckOptions::default());
            let second = engine.check(&method, &account, &bank, CheckOptions::default());
            prop_assert_eq!(first.clone(), second);
            prop_assert_ne!(first.code, ResultCode::WrongValue);
            prop_assert_ne!(first.code, ResultCode::NoMethod);
        }
    }
}
