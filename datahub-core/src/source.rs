//! Record sources: one data file's stations plus its origin path.

use std::path::PathBuf;

use crate::station::Station;

/// The stations parsed from one file, tagged with the file's path relative
/// to the data root. The path routes exported output to a mirrored location.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSource {
    pub source: PathBuf,
    pub stations: Vec<Station>,
}

impl RecordSource {
    pub fn new(source: impl Into<PathBuf>, stations: Vec<Station>) -> Self {
        RecordSource {
            source: source.into(),
            stations,
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Iterate every station of every source, in source order.
pub fn all_stations(sources: &[RecordSource]) -> impl Iterator<Item = &Station> {
    sources.iter().flat_map(|s| s.stations.iter())
}

/// Total number of stations across all sources.
pub fn station_count(sources: &[RecordSource]) -> usize {
    sources.iter().map(RecordSource::len).sum()
}
