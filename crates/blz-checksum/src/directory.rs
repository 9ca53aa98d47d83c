//! # Bank Directory
//!
//! Resolves a bank code to its checksum method from Bundesbank master data
//! ("Bankleitzahlendatei").
//!
//! ## Record Layout
//!
//! Fixed width, 174 characters per line:
//!
//! | Field | Width | Notes |
//! |-------|-------|-------|
//! | Bank code | 8 | |
//! | Feature | 1 | `1` main office, `2` branch |
//! | Name | 58 | |
//! | Postal code | 5 | |
//! | City | 35 | |
//! | Short name | 27 | |
//! | PAN | 5 | card issuer number |
//! | BIC | 11 | may be blank for branches |
//! | Method | 2 | checksum method id |
//! | Record number | 6 | |
//! | Change flag | 1 | `A` added, `D` deleted, `U` unchanged, `M` modified |
//! | Deletion flag | 1 | `1` when the code is scheduled for removal |
//! | Successor | 8 | `00000000` when none |
//! | IBAN rule | 6 | |
//!
//! Only main-office records define a bank. Branch records repeat the bank
//! code and are skipped.

use std::collections::BTreeMap;
use std::path::Path;

use blz_core::{BankCode, MethodId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DataError;

/// Length of one master-data record in characters.
pub const RECORD_LENGTH: usize = 174;

/// Lifecycle marker of a master-data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeFlag {
    /// New in this release.
    Added,
    /// Removed in this release.
    Deleted,
    /// Unchanged since the previous release.
    Unchanged,
    /// Modified since the previous release.
    Modified,
}

impl ChangeFlag {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::Added),
            'D' => Some(Self::Deleted),
            'U' => Some(Self::Unchanged),
            'M' => Some(Self::Modified),
            _ => None,
        }
    }
}

/// One bank of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    /// The bank code.
    pub bank_code: BankCode,
    /// Whether this is the main-office record.
    pub main_office: bool,
    /// Full name.
    pub name: String,
    /// Postal code.
    pub postal_code: String,
    /// City.
    pub city: String,
    /// Short name.
    pub short_name: String,
    /// Card issuer number, if any.
    pub pan: Option<String>,
    /// BIC, if any.
    pub bic: Option<String>,
    /// Assigned checksum method.
    pub method: MethodId,
    /// Running record number.
    pub record_number: u32,
    /// Lifecycle marker.
    pub change: ChangeFlag,
    /// Whether the code is scheduled for removal.
    pub deleted: bool,
    /// Bank code that takes over after removal.
    pub successor: Option<BankCode>,
    /// IBAN rule identifier.
    pub iban_rule: Option<String>,
}

impl BankRecord {
    /// A minimal main-office record.
    pub fn new(bank_code: BankCode, name: impl Into<String>, method: MethodId) -> Self {
        Self {
            bank_code,
            main_office: true,
            name: name.into(),
            postal_code: String::new(),
            city: String::new(),
            short_name: String::new(),
            pan: None,
            bic: None,
            method,
            record_number: 0,
            change: ChangeFlag::Unchanged,
            deleted: false,
            successor: None,
            iban_rule: None,
        }
    }

    /// Parse one fixed-width record.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let chars: Vec<char> = line.trim_end_matches(&['\r', '\n'][..]).chars().collect();
        if chars.len() < RECORD_LENGTH {
            return Err(format!("record has {} characters, expected {RECORD_LENGTH}", chars.len()));
        }
        let field = |start: usize, len: usize| -> String {
            chars[start..start + len].iter().collect::<String>().trim().to_string()
        };
        let optional = |value: String| (!value.is_empty() && value.chars().any(|c| c != '0')).then_some(value);

        let bank_code = BankCode::parse(&field(0, 8)).map_err(|e| e.to_string())?;
        let method = MethodId::new(field(150, 2)).map_err(|e| e.to_string())?;
        let record_number = field(152, 6)
            .parse::<u32>()
            .map_err(|e| format!("record number: {e}"))?;
        let change = ChangeFlag::from_char(chars[158])
            .ok_or_else(|| format!("unknown change flag {:?}", chars[158]))?;
        let successor = match field(160, 8).as_str() {
            "" | "00000000" => None,
            raw => Some(BankCode::parse(raw).map_err(|e| e.to_string())?),
        };

        Ok(Self {
            bank_code,
            main_office: chars[8] == '1',
            name: field(9, 58),
            postal_code: field(67, 5),
            city: field(72, 35),
            short_name: field(107, 27),
            pan: optional(field(134, 5)),
            bic: Some(field(139, 11)).filter(|b| !b.is_empty()),
            method,
            record_number,
            change,
            deleted: chars[159] == '1',
            successor,
            iban_rule: optional(field(168, 6)),
        })
    }
}

/// What the validator needs to know about a bank code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankInfo {
    /// Assigned checksum method.
    pub method: MethodId,
    /// Bank code that takes over after removal.
    pub successor: Option<BankCode>,
    /// Whether the code is scheduled for removal.
    pub deleted: bool,
    /// IBAN rule identifier.
    pub iban_rule: Option<String>,
}

impl BankInfo {
    /// Info carrying only a method.
    pub fn with_method(method: MethodId) -> Self {
        Self {
            method,
            successor: None,
            deleted: false,
            iban_rule: None,
        }
    }
}

impl From<&BankRecord> for BankInfo {
    fn from(record: &BankRecord) -> Self {
        Self {
            method: record.method.clone(),
            successor: record.successor,
            deleted: record.deleted,
            iban_rule: record.iban_rule.clone(),
        }
    }
}

/// Source of bank-code-to-method assignments.
pub trait MethodResolver: Send + Sync {
    /// Look up a bank code.
    fn resolve(&self, bank_code: &BankCode) -> Option<BankInfo>;
}

impl<F> MethodResolver for F
where
    F: Fn(&BankCode) -> Option<BankInfo> + Send + Sync,
{
    fn resolve(&self, bank_code: &BankCode) -> Option<BankInfo> {
        self(bank_code)
    }
}

/// Immutable bank directory keyed by bank code.
#[derive(Debug, Clone, Default)]
pub struct BankDirectory {
    banks: BTreeMap<BankCode, BankRecord>,
}

impl BankDirectory {
    /// Build from records. Branch records are ignored; a later main-office
    /// record for the same code replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = BankRecord>) -> Self {
        let banks = records
            .into_iter()
            .filter(|r| r.main_office)
            .map(|r| (r.bank_code, r))
            .collect();
        Self { banks }
    }

    /// Parse Bundesbank master data. Malformed lines are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Empty`] if no main-office record could be read.
    pub fn parse_bundesbank(text: &str) -> Result<Self, DataError> {
        let mut records = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match BankRecord::parse_line(line) {
                Ok(record) => records.push(record),
                Err(reason) => warn!(line = i + 1, %reason, "malformed bank record skipped"),
            }
        }
        let directory = Self::from_records(records);
        if directory.is_empty() {
            return Err(DataError::Empty("bank master data".into()));
        }
        debug!(banks = directory.len(), "bank directory loaded");
        Ok(directory)
    }

    /// Read a master-data file. The Bundesbank publishes ISO 8859-1; input
    /// that is not valid UTF-8 is decoded as such.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Io`] if the file cannot be read, or any error of
    /// [`BankDirectory::parse_bundesbank`].
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let bytes = std::fs::read(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => err.into_bytes().iter().map(|b| char::from(*b)).collect(),
        };
        Self::parse_bundesbank(&text)
    }

    /// The record of a bank code.
    pub fn get(&self, bank_code: &BankCode) -> Option<&BankRecord> {
        self.banks.get(bank_code)
    }

    /// Records in bank-code order.
    pub fn iter(&self) -> impl Iterator<Item = &BankRecord> {
        self.banks.values()
    }

    /// Number of banks.
    pub fn len(&self) -> usize {
        self.banks.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

impl MethodResolver for BankDirectory {
    fn resolve(&self, bank_code: &BankCode) -> Option<BankInfo> {
        self.get(bank_code).map(BankInfo::from)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Render one fixed-width record.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        blz: &str,
        feature: char,
        name: &str,
        bic: &str,
        method: &str,
        change: char,
        deleted: char,
        successor: &str,
    ) -> String {
        format!(
            "{blz:<8}{feature}{name:<58}{plz:<5}{city:<35}{short:<27}{pan:<5}{bic:<11}{method:<2}{nr:06}{change}{deleted}{successor:<8}{rule:<6}",
            plz = "10117",
            city = "Berlin",
            short = name,
            pan = "",
            nr = 1,
            rule = "000000",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    fn sample() -> String {
        [
            record("10000000", '1', "Bundesbank", "MARKDEF1100", "09", 'U', '0', "00000000"),
            record("10000000", '2', "Bundesbank Filiale", "", "09", 'U', '0', "00000000"),
            record("13051172", '1', "Sparkasse Vorpommern", "NOLADE21GRW", "52", 'U', '0', "00000000"),
            record("50010517", '1', "ING-DiBa", "INGDDEFFXXX", "17", 'M', '1', "50010518"),
            "garbage".to_string(),
        ]
        .join("\n")
    }

    #[test]
    fn fixture_has_record_length() {
        let line = record("10000000", '1', "X", "", "00", 'U', '0', "00000000");
        assert_eq!(line.chars().count(), RECORD_LENGTH);
    }

    #[test]
    fn parses_main_offices() {
        let dir = BankDirectory::parse_bundesbank(&sample()).unwrap();
        assert_eq!(dir.len(), 3);
        let ing = dir.get(&BankCode::parse("50010517").unwrap()).unwrap();
        assert_eq!(ing.name, "ING-DiBa");
        assert_eq!(ing.method.as_str(), "17");
        assert_eq!(ing.bic.as_deref(), Some("INGDDEFFXXX"));
        assert_eq!(ing.change, ChangeFlag::Modified);
        assert!(ing.deleted);
        assert_eq!(ing.successor, Some(BankCode::parse("50010518").unwrap()));
        assert_eq!(ing.city, "Berlin");
        assert_eq!(ing.iban_rule, None);
    }

    #[test]
    fn resolver_reports_method_and_successor() {
        let dir = BankDirectory::parse_bundesbank(&sample()).unwrap();
        let info = dir.resolve(&BankCode::parse("13051172").unwrap()).unwrap();
        assert_eq!(info.method.as_str(), "52");
        assert!(!info.deleted);
        assert!(dir.resolve(&BankCode::parse("99999999").unwrap()).is_none());
    }

    #[test]
    fn umlauts_do_not_shift_columns() {
        let line = record("76050101", '1', "Sparkasse Nürnberg", "SSKNDE77XXX", "00", 'U', '0', "00000000");
        let rec = BankRecord::parse_line(&line).unwrap();
        assert_eq!(rec.name, "Sparkasse Nürnberg");
        assert_eq!(rec.method.as_str(), "00");
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            BankDirectory::parse_bundesbank("short\n"),
            Err(DataError::Empty(_))
        ));
    }

    #[test]
    fn closures_and_maps_resolve() {
        let mut map = std::collections::HashMap::new();
        map.insert(BankCode::parse("10000000").unwrap(), MethodId::new("09").unwrap());
        let by_map = move |code: &BankCode| map.get(code).cloned().map(BankInfo::with_method);
        assert_eq!(
            by_map.resolve(&BankCode::parse("10000000").unwrap()).unwrap().method.as_str(),
            "09"
        );
        let closure = |_: &BankCode| Some(BankInfo::with_method(MethodId::new("00").unwrap()));
        assert!(closure.resolve(&BankCode::parse("20000000").unwrap()).is_some());
    }

    #[test]
    fn load_decodes_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blz.txt");
        let line = record("76050101", '1', "Sparkasse N\u{fc}rnberg", "", "00", 'U', '0', "00000000");
        let latin1: Vec<u8> = line.chars().map(|c| c as u8).collect();
        std::fs::write(&path, latin1).unwrap();
        let loaded = BankDirectory::load(&path).unwrap();
        let rec = loaded.get(&BankCode::parse("76050101").unwrap()).unwrap();
        assert_eq!(rec.name, "Sparkasse Nürnberg");
    }
}
