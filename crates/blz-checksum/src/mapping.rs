//! # Special Account Mapping
//!
//! Banks that merge or reorganise publish rewrite rules: accounts of an old
//! bank code (optionally restricted to an account range) move to a new bank
//! code and sometimes to a new account number. Every account is run through
//! the table before method lookup.
//!
//! ## Matching
//!
//! Entries of a bank code are scanned in load order and the **first** match
//! wins. An entry without a range matches every account. A matching entry
//! replaces the account only if it names one, and the bank code only if it
//! names one.
//!
//! ## Rule Ids
//!
//! Every group carries the id of the reorganisation it belongs to. Bank codes
//! that disappeared entirely can be recovered by scanning the other groups of
//! the same rule id, see [`MappingTable::bank_code_from_account_cluster`] and
//! [`MappingTable::bank_code_from_account`].
//!
//! ## File Format
//!
//! ```text
//! # comment
//! [R1 blz from to newblz]
//! 10020030 1000000 1999999 10020040
//! [R2 blz=20030040 kto newkto]
//! 1234 5678
//! ```
//!
//! A directive `[ruleId tag...]` assigns a meaning to each data column. Tags:
//! `blz` (comma-separated source bank codes), `kto` (single source account),
//! `from`/`to` (source range), `newblz`, `newkto`, `_` (ignored column).
//! `tag=value` supplies a literal for every line and consumes no column.

use std::collections::HashMap;
use std::path::Path;

use blz_core::{AccountDigits, BankCode, MAX_ACCOUNT_VALUE};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::DataError;

/// One rewrite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    /// Inclusive account range the rule is restricted to, `None` for all accounts.
    pub range: Option<(u64, u64)>,
    /// Replacement account.
    pub account: Option<AccountDigits>,
    /// Replacement bank code.
    pub bank_code: Option<BankCode>,
}

impl MappingEntry {
    /// Whether the entry applies to `account`.
    pub fn matches(&self, account: &AccountDigits) -> bool {
        match self.range {
            None => true,
            Some((low, high)) => account.in_range(low, high),
        }
    }

    /// Whether the entry is limited to an account range.
    pub fn is_restricted(&self) -> bool {
        self.range.is_some()
    }
}

/// The ordered rules of one source bank code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingGroup {
    /// Source bank code.
    pub bank_code: BankCode,
    /// Reorganisation the group belongs to.
    pub rule_id: String,
    /// Entries in load order.
    pub entries: Vec<MappingEntry>,
}

/// Result of running an account through the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialAccount {
    /// Account after rewriting.
    pub account: AccountDigits,
    /// Bank code after rewriting.
    pub bank_code: BankCode,
    /// Whether an entry matched.
    pub applied: bool,
    /// Rule id of the matching group.
    pub rule_id: Option<String>,
}

/// Immutable collection of mapping groups, keyed by source bank code.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    groups: Vec<MappingGroup>,
    index: HashMap<BankCode, usize>,
}

impl MappingTable {
    /// An empty table: every account passes through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the group of `bank_code`, creating the group with
    /// `rule_id` if it does not exist yet. An existing group keeps its rule id.
    pub fn insert(&mut self, bank_code: BankCode, rule_id: &str, entry: MappingEntry) {
        match self.index.get(&bank_code) {
            Some(i) => self.groups[*i].entries.push(entry),
            None => {
                self.index.insert(bank_code, self.groups.len());
                self.groups.push(MappingGroup {
                    bank_code,
                    rule_id: rule_id.to_string(),
                    entries: vec![entry],
                });
            }
        }
    }

    /// The group of a source bank code.
    pub fn group(&self, bank_code: &BankCode) -> Option<&MappingGroup> {
        self.index.get(bank_code).map(|i| &self.groups[*i])
    }

    /// All groups in load order.
    pub fn groups(&self) -> &[MappingGroup] {
        &self.groups
    }

    /// Number of source bank codes.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the table has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Apply the first matching entry of `bank_code` to `account`.
    pub fn check_special_account(&self, account: &AccountDigits, bank_code: &BankCode) -> SpecialAccount {
        let unchanged = SpecialAccount {
            account: *account,
            bank_code: *bank_code,
            applied: false,
            rule_id: None,
        };
        let Some(group) = self.group(bank_code) else {
            return unchanged;
        };
        let Some(entry) = group.entries.iter().find(|e| e.matches(account)) else {
            return unchanged;
        };
        let rewritten = SpecialAccount {
            account: entry.account.unwrap_or(*account),
            bank_code: entry.bank_code.unwrap_or(*bank_code),
            applied: true,
            rule_id: Some(group.rule_id.clone()),
        };
        debug!(
            rule = %group.rule_id,
            from_bank = %bank_code,
            to_bank = %rewritten.bank_code,
            "special account mapping applied"
        );
        rewritten
    }

    /// Recover a bank code for `account` after `obsolete` vanished, from a
    /// range-restricted entry of any group sharing its rule id.
    ///
    /// Returns the entry's target bank code, or the group's own code when the
    /// entry sets none.
    pub fn bank_code_from_account_cluster(
        &self,
        account: &AccountDigits,
        obsolete: &BankCode,
    ) -> Option<BankCode> {
        let rule_id = &self.group(obsolete)?.rule_id;
        let found = self
            .groups
            .iter()
            .filter(|g| &g.rule_id == rule_id)
            .find_map(|g| {
                g.entries
                    .iter()
                    .find(|e| e.is_restricted() && e.matches(account))
                    .map(|e| e.bank_code.unwrap_or(g.bank_code))
            });
        if let Some(code) = found {
            debug!(rule = %rule_id, %obsolete, recovered = %code, "bank code recovered from account range");
        }
        found
    }

    /// Recover the source bank code of another group with the same rule id
    /// whose entries accept `account`, unrestricted entries included.
    pub fn bank_code_from_account(&self, account: &AccountDigits, obsolete: &BankCode) -> Option<BankCode> {
        let rule_id = &self.group(obsolete)?.rule_id;
        let found = self
            .groups
            .iter()
            .filter(|g| &g.rule_id == rule_id && g.bank_code != *obsolete)
            .find(|g| g.entries.iter().any(|e| e.matches(account)))
            .map(|g| g.bank_code);
        if let Some(code) = found {
            debug!(rule = %rule_id, %obsolete, recovered = %code, "bank code recovered from sibling group");
        }
        found
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Read a mapping file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Io`] if the file cannot be read, or any error of
    /// [`MappingTable::parse`].
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse mapping data.
    ///
    /// Malformed data lines are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidDirective`] for a directive with an
    /// unknown tag or a malformed literal, since none of its data lines could
    /// be interpreted.
    pub fn parse(text: &str) -> Result<Self, DataError> {
        let mut table = Self::new();
        let mut directive: Option<Directive> = None;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            if let Some(body) = line.strip_prefix('[') {
                let body = body.strip_suffix(']').ok_or_else(|| DataError::InvalidDirective {
                    line: line_no,
                    reason: "missing closing bracket".into(),
                })?;
                directive = Some(Directive::parse(body, line_no)?);
                continue;
            }
            let Some(active) = directive.as_ref() else {
                warn!(line = line_no, "mapping data before any directive, skipped");
                continue;
            };
            match active.read_line(line) {
                Ok(row) => {
                    for source in &row.sources {
                        table.insert(*source, &active.rule_id, row.entry);
                    }
                }
                Err(reason) => warn!(line = line_no, %reason, "malformed mapping line skipped"),
            }
        }
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Directive parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Blz,
    Kto,
    From,
    To,
    NewBlz,
    NewKto,
    Skip,
}

impl Tag {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "blz" => Some(Self::Blz),
            "kto" => Some(Self::Kto),
            "from" => Some(Self::From),
            "to" => Some(Self::To),
            "newblz" => Some(Self::NewBlz),
            "newkto" => Some(Self::NewKto),
            "_" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Values collected for one data line.
#[derive(Debug, Default, Clone)]
struct Fields {
    sources: Vec<BankCode>,
    kto: Option<u64>,
    from: Option<u64>,
    to: Option<u64>,
    new_blz: Option<BankCode>,
    new_kto: Option<AccountDigits>,
}

impl Fields {
    fn set(&mut self, tag: Tag, value: &str) -> Result<(), String> {
        match tag {
            Tag::Blz => {
                for code in value.split(',').filter(|c| !c.is_empty()) {
                    self.sources.push(BankCode::parse(code).map_err(|e| e.to_string())?);
                }
            }
            Tag::Kto => self.kto = Some(parse_account_value(value)?),
            Tag::From => self.from = Some(parse_account_value(value)?),
            Tag::To => self.to = Some(parse_account_value(value)?),
            Tag::NewBlz => self.new_blz = Some(BankCode::parse(value).map_err(|e| e.to_string())?),
            Tag::NewKto => {
                let account = AccountDigits::parse(value).map_err(|e| e.to_string())?;
                self.new_kto = (account.value() > 0).then_some(account);
            }
            Tag::Skip => {}
        }
        Ok(())
    }
}

fn parse_account_value(raw: &str) -> Result<u64, String> {
    AccountDigits::parse(raw)
        .map(|a| a.value())
        .map_err(|e| e.to_string())
}

#[derive(Debug)]
struct Row {
    sources: Vec<BankCode>,
    entry: MappingEntry,
}

#[derive(Debug)]
struct Directive {
    rule_id: String,
    columns: Vec<Tag>,
    literals: Fields,
}

impl Directive {
    fn parse(body: &str, line: usize) -> Result<Self, DataError> {
        let invalid = |reason: String| DataError::InvalidDirective { line, reason };
        let mut parts = body.split_whitespace();
        let rule_id = parts
            .next()
            .ok_or_else(|| invalid("missing rule id".into()))?
            .to_string();
        let mut columns = Vec::new();
        let mut literals = Fields::default();
        for part in parts {
            match part.split_once('=') {
                Some((name, value)) => {
                    let tag = Tag::parse(name).ok_or_else(|| invalid(format!("unknown tag {name:?}")))?;
                    literals.set(tag, value).map_err(invalid)?;
                }
                None => {
                    let tag = Tag::parse(part).ok_or_else(|| invalid(format!("unknown tag {part:?}")))?;
                    columns.push(tag);
                }
            }
        }
        Ok(Self {
            rule_id,
            columns,
            literals,
        })
    }

    fn read_line(&self, line: &str) -> Result<Row, String> {
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() < self.columns.len() {
            return Err(format!(
                "expected {} columns, found {}",
                self.columns.len(),
                values.len()
            ));
        }
        let mut fields = self.literals.clone();
        for (tag, value) in self.columns.iter().zip(values) {
            fields.set(*tag, value)?;
        }
        if fields.sources.is_empty() {
            return Err("no source bank code".into());
        }

        let range = match (fields.kto, fields.from, fields.to) {
            (Some(0), _, _) => None,
            (Some(kto), _, _) => Some((kto, kto)),
            (None, None | Some(0), _) => None,
            (None, Some(from), to) => {
                let to = to.unwrap_or(from).min(MAX_ACCOUNT_VALUE);
                if to < from {
                    return Err(format!("empty range {from}..{to}"));
                }
                Some((from, to))
            }
        };
        Ok(Row {
            sources: fields.sources,
            entry: MappingEntry {
                range,
                account: fields.new_kto,
                bank_code: fields.new_blz,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(raw: &str) -> BankCode {
        BankCode::parse(raw).unwrap()
    }

    fn acc(raw: &str) -> AccountDigits {
        AccountDigits::parse(raw).unwrap()
    }

    const SAMPLE: &str = "\
# merger of 10020030 into 10020040
[R1 blz from to newblz]
10020030 1000000 1999999 10020040
10020030 2000000 2999999 10020050

// rename of a single account
[R2 blz=20030040 kto newkto]
1234 5678

[R3 blz _ newblz=30040050]
30040060 ignored
30040070 ignored
";

    #[test]
    fn parses_groups_in_load_order() {
        let table = MappingTable::parse(SAMPLE).unwrap();
        assert_eq!(table.len(), 4);
        let g = table.group(&bank("10020030")).unwrap();
        assert_eq!(g.rule_id, "R1");
        assert_eq!(g.entries.len(), 2);
        assert_eq!(g.entries[0].range, Some((1_000_000, 1_999_999)));
        assert_eq!(table.groups()[0].bank_code, bank("10020030"));
        assert_eq!(table.group(&bank("30040060")).unwrap().entries[0].range, None);
    }

    #[test]
    fn range_entries_rewrite_bank_only() {
        let table = MappingTable::parse(SAMPLE).unwrap();
        let hit = table.check_special_account(&acc("2500000"), &bank("10020030"));
        assert!(hit.applied);
        assert_eq!(hit.bank_code, bank("10020050"));
        assert_eq!(hit.account, acc("2500000"));
        assert_eq!(hit.rule_id.as_deref(), Some("R1"));

        let miss = table.check_special_account(&acc("3500000"), &bank("10020030"));
        assert!(!miss.applied);
        assert_eq!(miss.bank_code, bank("10020030"));
    }

    #[test]
    fn single_account_rewrite_keeps_bank() {
        let table = MappingTable::parse(SAMPLE).unwrap();
        let hit = table.check_special_account(&acc("1234"), &bank("20030040"));
        assert!(hit.applied);
        assert_eq!(hit.account, acc("5678"));
        assert_eq!(hit.bank_code, bank("20030040"));
        assert!(!table.check_special_account(&acc("1235"), &bank("20030040")).applied);
    }

    #[test]
    fn unrestricted_entries_match_everything() {
        let table = MappingTable::parse(SAMPLE).unwrap();
        let hit = table.check_special_account(&acc("0"), &bank("30040060"));
        assert!(hit.applied);
        assert_eq!(hit.bank_code, bank("30040050"));
    }

    #[test]
    fn first_matching_entry_wins() {
        let mut table = MappingTable::new();
        let source = bank("10000000");
        table.insert(
            source,
            "R",
            MappingEntry {
                range: Some((1, 100)),
                account: None,
                bank_code: Some(bank("20000000")),
            },
        );
        table.insert(
            source,
            "R",
            MappingEntry {
                range: None,
                account: None,
                bank_code: Some(bank("30000000")),
            },
        );
        assert_eq!(table.check_special_account(&acc("50"), &source).bank_code, bank("20000000"));
        assert_eq!(table.check_special_account(&acc("500"), &source).bank_code, bank("30000000"));
    }

    #[test]
    fn cluster_recovery_uses_restricted_entries() {
        let table = MappingTable::parse(SAMPLE).unwrap();
        let found = table.bank_code_from_account_cluster(&acc("1500000"), &bank("10020030"));
        assert_eq!(found, Some(bank("10020040")));
        assert_eq!(table.bank_code_from_account_cluster(&acc("9"), &bank("10020030")), None);
        // R3 only has unrestricted entries.
        assert_eq!(table.bank_code_from_account_cluster(&acc("9"), &bank("30040060")), None);
        assert_eq!(table.bank_code_from_account_cluster(&acc("9"), &bank("99999999")), None);
    }

    #[test]
    fn sibling_recovery_returns_other_source() {
        let table = MappingTable::parse(SAMPLE).unwrap();
        let found = table.bank_code_from_account(&acc("9"), &bank("30040060"));
        assert_eq!(found, Some(bank("30040070")));
        assert_eq!(table.bank_code_from_account(&acc("9"), &bank("10020030")), None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let text = "\
orphan line
[R blz kto newblz]
10020030 12 10020040
1002003 12 10020040
10020030 x 10020040
10020030
";
        let table = MappingTable::parse(text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.group(&bank("10020030")).unwrap().entries.len(), 1);
    }

    #[test]
    fn unknown_tags_reject_the_directive() {
        let err = MappingTable::parse("[R blz iban]\n").unwrap_err();
        assert!(matches!(err, DataError::InvalidDirective { line: 1, .. }));
        assert!(MappingTable::parse("[R blz\n").is_err());
        assert!(MappingTable::parse("[]\n").is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        let table = MappingTable::load(&path).unwrap();
        assert_eq!(table.len(), 4);
        assert!(matches!(
            MappingTable::load(&dir.path().join("missing.txt")),
            Err(DataError::Io { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// With overlapping entries only the first matching one is applied.
        #[test]
        fn earlier_entries_shadow_later_ones(value in 0u64..=9_999_999_999, split in 1u64..9_999_999_999) {
            let mut table = MappingTable::new();
            let source = BankCode::parse("10000000").unwrap();
            let first = BankCode::parse("20000000").unwrap();
            let second = BankCode::parse("30000000").unwrap();
            table.insert(source, "R", MappingEntry { range: Some((1, split)), account: None, bank_code: Some(first) });
            table.insert(source, "R", MappingEntry { range: None, account: None, bank_code: Some(second) });
            let account = AccountDigits::from_value(value).unwrap();
            let result = table.check_special_account(&account, &source);
            prop_assert!(result.applied);
            let expected = if (1..=split).contains(&value) { first } else { second };
            prop_assert_eq!(result.bank_code, expected);
            prop_assert_eq!(result.account, account);
        }
    }
}
