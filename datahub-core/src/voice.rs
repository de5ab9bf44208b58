//! Voice-platform station mapping (TeamSpeak channel lookup).

use serde::Serialize;

use crate::source::{all_stations, RecordSource};

/// One station projected for the voice platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceMapping {
    pub id: String,
    #[serde(rename = "callsignPrefix")]
    pub callsign_prefix: String,
    pub frequency: String,
}

/// Project every station, sorted by `(callsignPrefix, id)`. Duplicates are kept.
pub fn voice_mappings(sources: &[RecordSource]) -> Vec<VoiceMapping> {
    let mut mappings: Vec<VoiceMapping> = all_stations(sources)
        .map(|s| VoiceMapping {
            id: s.abbreviation.clone(),
            callsign_prefix: s.callsign_prefix().to_string(),
            frequency: s.frequency.to_string(),
        })
        .collect();

    mappings.sort_by(|a, b| {
        (a.callsign_prefix.as_str(), a.id.as_str()).cmp(&(b.callsign_prefix.as_str(), b.id.as_str()))
    });
    mappings
}
