//! Reconciliation against the external (VATEUD) station registry.
//!
//! Internal stations are keyed by logon, external rows by callsign. The
//! report lists the symmetric difference; nothing is merged or mutated.

use std::collections::BTreeMap;

use crate::source::{all_stations, RecordSource};
use crate::station::Station;

/// Column header of the reconciliation report.
pub const REPORT_HEADER: [&str; 7] = [
    "Callsign (old)",
    "Name (old)",
    "Frequency (old)",
    "Callsign (new)",
    "Name (new)",
    "Frequency (new)",
    "Remark",
];

pub const REMARK_MISSING_EXTERNAL: &str = "Missing in VATEUD";
pub const REMARK_MISSING_INTERNAL: &str = "Missing in Stations";

/// One row of the external registry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalStation {
    pub country_id: String,
    pub callsign: String,
    pub name: String,
    pub frequency: String,
    pub region: String,
}

// ---------------------------------------------------------------------------
// Exclusion rules
// ---------------------------------------------------------------------------

/// Rows dropped from the external table before comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    /// Only rows of this country are compared.
    pub country_id: String,
    /// Only callsigns starting with one of these are compared.
    pub callsign_prefixes: Vec<String>,
    /// Callsigns ending with this suffix are ignored.
    pub excluded_suffix: String,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        ExclusionRules {
            country_id: "2".into(),
            callsign_prefixes: vec!["ED".into(), "ET".into()],
            excluded_suffix: "ATIS".into(),
        }
    }
}

impl ExclusionRules {
    pub fn excludes(&self, row: &ExternalStation) -> bool {
        row.country_id != self.country_id
            || !self
                .callsign_prefixes
                .iter()
                .any(|p| row.callsign.starts_with(p.as_str()))
            || (!self.excluded_suffix.is_empty() && row.callsign.ends_with(&self.excluded_suffix))
    }

    pub fn retain(&self, rows: Vec<ExternalStation>) -> Vec<ExternalStation> {
        rows.into_iter().filter(|r| !self.excludes(r)).collect()
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Result of comparing the registry with the external table.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<'a> {
    /// Internal stations with no external row, sorted by logon.
    pub missing_external: Vec<&'a Station>,
    /// External rows with no internal station, sorted by callsign.
    pub missing_internal: Vec<&'a ExternalStation>,
}

/// Compare the registry with already-filtered external rows.
///
/// Duplicate keys collapse to the last occurrence on either side.
pub fn reconcile<'a>(
    sources: &'a [RecordSource],
    external: &'a [ExternalStation],
) -> Reconciliation<'a> {
    let internal: BTreeMap<&str, &Station> = all_stations(sources)
        .map(|s| (s.logon.as_str(), s))
        .collect();
    let external: BTreeMap<&str, &ExternalStation> = external
        .iter()
        .map(|r| (r.callsign.as_str(), r))
        .collect();

    let missing_external = internal
        .iter()
        .filter(|(logon, _)| !external.contains_key(*logon))
        .map(|(_, s)| *s)
        .collect();
    let missing_internal = external
        .iter()
        .filter(|(callsign, _)| !internal.contains_key(*callsign))
        .map(|(_, r)| *r)
        .collect();

    Reconciliation {
        missing_external,
        missing_internal,
    }
}

impl Reconciliation<'_> {
    pub fn len(&self) -> usize {
        self.missing_external.len() + self.missing_internal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Report rows: stations missing externally first, then the reverse.
    pub fn rows(&self) -> Vec<[String; 7]> {
        let missing_external = self.missing_external.iter().map(|s| {
            [
                String::new(),
                String::new(),
                String::new(),
                s.logon.clone(),
                s.description.clone().unwrap_or_default(),
                s.frequency.to_string(),
                REMARK_MISSING_EXTERNAL.to_string(),
            ]
        });
        let missing_internal = self.missing_internal.iter().map(|r| {
            [
                r.callsign.clone(),
                r.name.clone(),
                r.frequency.clone(),
                String::new(),
                String::new(),
                String::new(),
                REMARK_MISSING_INTERNAL.to_string(),
            ]
        });
        missing_external.chain(missing_internal).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
