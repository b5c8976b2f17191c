//! civicAddress (RFC 5139) field codes and their friendly names.
//!
//! Location data may use either the official code (`A1`, `RD`, ...) or a
//! synonym (`state_province`, `road`, ...). Several synonyms may share a
//! code; a code lookup then yields the first of them in table order.

use std::sync::LazyLock;

use geoloc_types::VariableList;

use crate::error::{Result, ValidationError};

/// One code/name pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SynonymEntry {
    pub code: &'static str,
    pub name: &'static str,
}

const fn entry(code: &'static str, name: &'static str) -> SynonymEntry {
    SynonymEntry { code, name }
}

const ENTRIES: &[SynonymEntry] = &[
    entry("A1", "state_province"),
    entry("A2", "county_district"),
    entry("A3", "city"),
    entry("A4", "city_district"),
    entry("A5", "neighborhood"),
    entry("A6", "street_group"),
    entry("ADDCODE", "additional_code"),
    entry("BLD", "building"),
    entry("country", "country"),
    entry("FLR", "floor"),
    entry("HNO", "house_number"),
    entry("HNS", "house_number_suffix"),
    entry("LMK", "landmark"),
    entry("LOC", "additional_location"),
    entry("NAM", "location_name"),
    entry("PC", "postal_code"),
    entry("PCN", "postal_community"),
    entry("PLC", "place_type"),
    entry("POBOX", "po_box"),
    entry("POD", "trailing_street_suffix"),
    entry("POM", "road_post_modifier"),
    entry("PRD", "leading_road_direction"),
    entry("PRM", "road_pre_modifier"),
    entry("RD", "road"),
    entry("RD", "street"),
    entry("RDBR", "road_branch"),
    entry("RDSEC", "road_section"),
    entry("RDSUBBR", "road_sub_branch"),
    entry("ROOM", "room"),
    entry("SEAT", "seat"),
    entry("STS", "street_suffix"),
    entry("UNIT", "unit"),
];

static TABLE: LazyLock<SynonymTable> = LazyLock::new(|| SynonymTable::build(ENTRIES));

/// The code/name table with a code-sorted and a name-sorted view.
#[derive(Debug)]
pub struct SynonymTable {
    entries: &'static [SynonymEntry],
    by_code: Vec<SynonymEntry>,
    by_name: Vec<SynonymEntry>,
}

impl SynonymTable {
    /// The built-in civicAddress table, sorted on first use.
    pub fn global() -> &'static SynonymTable {
        &TABLE
    }

    /// Build the sorted views. Sorting is stable, so entries sharing a key
    /// keep their construction order.
    pub fn build(entries: &'static [SynonymEntry]) -> Self {
        let mut by_code = entries.to_vec();
        by_code.sort_by(|a, b| a.code.cmp(b.code));
        let mut by_name = entries.to_vec();
        by_name.sort_by(|a, b| a.name.cmp(b.name));
        Self {
            entries,
            by_code,
            by_name,
        }
    }

    /// Entries in construction order.
    pub fn entries(&self) -> &'static [SynonymEntry] {
        self.entries
    }

    /// Friendly name for an official code.
    pub fn name_for_code(&self, code: &str) -> Option<&'static str> {
        let idx = self.by_code.partition_point(|e| e.code < code);
        self.by_code
            .get(idx)
            .filter(|e| e.code == code)
            .map(|e| e.name)
    }

    /// Official code for a friendly name, without any fallback.
    pub fn lookup_code(&self, name: &str) -> Option<&'static str> {
        let idx = self.by_name.partition_point(|e| e.name < name);
        self.by_name
            .get(idx)
            .filter(|e| e.name == name)
            .map(|e| e.code)
    }

    /// Official code for a friendly name.
    ///
    /// An unknown name is returned unchanged: it is taken to already be a
    /// code.
    pub fn code_for_name<'a>(&self, name: &'a str) -> &'a str {
        self.lookup_code(name).unwrap_or(name)
    }

    /// Canonical code for a token that is either a friendly name or a code.
    pub fn resolve(&self, token: &str) -> Option<&'static str> {
        if let Some(code) = self.lookup_code(token) {
            return Some(code);
        }
        let idx = self.by_code.partition_point(|e| e.code < token);
        self.by_code
            .get(idx)
            .filter(|e| e.code == token)
            .map(|e| e.code)
    }

    /// Every variable name must be a known code or synonym.
    pub fn validate_list(&self, list: &VariableList) -> Result<()> {
        for name in list.names() {
            if self.resolve(name).is_none() {
                return Err(ValidationError::InvalidVarname(name.to_string()));
            }
        }
        Ok(())
    }
}

/// See [`SynonymTable::name_for_code`].
pub fn name_for_code(code: &str) -> Option<&'static str> {
    SynonymTable::global().name_for_code(code)
}

/// See [`SynonymTable::code_for_name`].
pub fn code_for_name(name: &str) -> &str {
    SynonymTable::global().code_for_name(name)
}

/// See [`SynonymTable::resolve`].
pub fn resolve(token: &str) -> Option<&'static str> {
    SynonymTable::global().resolve(token)
}

/// Validate a civicAddress variable list against the built-in table.
pub fn validate_civic(list: &VariableList) -> Result<()> {
    SynonymTable::global().validate_list(list)
}
