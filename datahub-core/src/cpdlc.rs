//! CPDLC logon table for the TopSky plugin.
//!
//! Stations with a `cpdlc_login` are mapped to the external callsign of their
//! logon prefix and emitted as `LOGIN:<login>:<callsign>:<abbreviation>`
//! lines, grouped by callsign with a blank line between groups.

use std::collections::HashMap;

use crate::source::{all_stations, RecordSource};
use crate::types::{DatahubError, Result};

/// Logon prefix → external CPDLC callsign.
pub type CallsignMap = HashMap<String, String>;

/// Parse the callsign lookup table (a flat JSON object).
pub fn parse_callsign_map(text: &str) -> Result<CallsignMap> {
    Ok(serde_json::from_str(text)?)
}

/// One CPDLC table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpdlcEntry {
    pub login: String,
    pub callsign: String,
    pub abbreviation: String,
}

/// Collect and sort the CPDLC rows by `(callsign, login)`.
///
/// Fails if a station's prefix has no callsign mapping or if no station has
/// a CPDLC login at all.
pub fn cpdlc_entries(sources: &[RecordSource], callsigns: &CallsignMap) -> Result<Vec<CpdlcEntry>> {
    let mut entries = Vec::new();
    for station in all_stations(sources) {
        let Some(login) = &station.cpdlc_login else {
            continue;
        };
        let prefix = station.callsign_prefix();
        let callsign = callsigns
            .get(prefix)
            .ok_or_else(|| DatahubError::MissingCallsignMapping {
                logon: station.logon.clone(),
                prefix: prefix.to_string(),
            })?;
        entries.push(CpdlcEntry {
            login: login.clone(),
            callsign: callsign.clone(),
            abbreviation: station.abbreviation.clone(),
        });
    }

    if entries.is_empty() {
        return Err(DatahubError::EmptyInput("no station has a cpdlc_login"));
    }

    entries.sort_by(|a, b| (&a.callsign, &a.login).cmp(&(&b.callsign, &b.login)));
    Ok(entries)
}

/// Render the grouped text table.
pub fn render_cpdlc(entries: &[CpdlcEntry]) -> Result<String> {
    let first = entries
        .first()
        .ok_or(DatahubError::EmptyInput("no CPDLC entries to render"))?;

    let mut out = String::new();
    let mut last_callsign = first.callsign.as_str();
    for entry in entries {
        if entry.callsign != last_callsign {
            out.push('\n');
        }
        out.push_str(&format!(
            "LOGIN:{}:{}:{}\n",
            entry.login, entry.callsign, entry.abbreviation
        ));
        last_callsign = entry.callsign.as_str();
    }
    Ok(out)
}
