//! File-writing exporters.
//!
//! Each function takes the sorted registry by shared reference, renders one
//! artifact through `datahub_core`, and writes it, creating parent folders.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use datahub_core::codec::{render_stations, to_json_string, Format};
use datahub_core::cpdlc::{cpdlc_entries, render_cpdlc, CallsignMap};
use datahub_core::schedule::invert_schedule;
use datahub_core::sort::sorted;
use datahub_core::source::all_stations;
use datahub_core::voice::voice_mappings;
use datahub_core::{RecordSource, Result, SuffixOrder};

/// Write `contents` to `path`, creating its parent directories.
pub fn write_artifact(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}

// ---------------------------------------------------------------------------
// Data exporter
// ---------------------------------------------------------------------------

/// Destination of one source below `dest`, optionally re-extensioned.
pub fn source_destination(source: &RecordSource, dest: &Path, target: Option<Format>) -> PathBuf {
    let mut path = dest.join(&source.source);
    if let Some(format) = target {
        path.set_extension(format.extension());
    }
    path
}

/// Write every source to `dest/<source>`. Returns the number of files written.
pub fn export_sources(
    sources: &[RecordSource],
    dest: &Path,
    target: Option<Format>,
    indent: usize,
) -> Result<usize> {
    for source in sources {
        let path = source_destination(source, dest, target);
        let format = Format::from_path(&path)?;
        write_artifact(&path, &render_stations(&source.stations, format, indent)?)?;
    }
    Ok(sources.len())
}

/// Export every source, then write all stations re-sorted as one sequence to
/// `dest/<name>.<format>`. Returns the combined file path.
pub fn combine(
    sources: &[RecordSource],
    dest: &Path,
    target: Option<Format>,
    indent: usize,
    order: &SuffixOrder,
    name: &str,
) -> Result<PathBuf> {
    export_sources(sources, dest, target, indent)?;

    let format = target.unwrap_or(Format::Json);
    let stations = sorted(all_stations(sources).cloned().collect::<Vec<_>>(), order);
    let path = dest.join(format!("{name}.{}", format.extension()));
    write_artifact(&path, &render_stations(&stations, format, indent)?)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Derived artifacts
// ---------------------------------------------------------------------------

/// Write the schedule roster. Returns the number of groups.
pub fn export_schedule(sources: &[RecordSource], path: &Path, indent: usize) -> Result<usize> {
    let entries = invert_schedule(sources);
    write_artifact(path, &to_json_string(&entries, indent)?)?;
    Ok(entries.len())
}

/// Write the voice-platform mapping. Returns the number of mappings.
pub fn export_voice(sources: &[RecordSource], path: &Path, indent: usize) -> Result<usize> {
    let mappings = voice_mappings(sources);
    write_artifact(path, &to_json_string(&mappings, indent)?)?;
    Ok(mappings.len())
}

/// Write the CPDLC logon table. Returns the number of logins.
pub fn export_cpdlc(sources: &[RecordSource], callsigns: &CallsignMap, path: &Path) -> Result<usize> {
    let entries = cpdlc_entries(sources, callsigns)?;
    write_artifact(path, &render_cpdlc(&entries)?)?;
    Ok(entries.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use datahub_core::Station;
    use serde_json::{json, Value};

    fn station(logon: &str, abbr: &str) -> Station {
        Station::from_value(&json!({"logon": logon, "frequency": "118.500", "abbreviation": abbr}))
            .unwrap()
    }

    fn sources() -> Vec<RecordSource> {
        vec![
            RecordSource::new("edgg/eddf.json", vec![station("EDDF_TWR", "FT")]),
            RecordSource::new("edww/eddb.json", vec![station("EDDB_APP", "BA")]),
        ]
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_export_sources_mirrors_layout() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_sources(&sources(), dir.path(), None, 4).unwrap();
        assert_eq!(written, 2);
        let value = read_json(&dir.path().join("edgg/eddf.json"));
        assert_eq!(value[0]["logon"], "EDDF_TWR");
        assert_eq!(value[0]["frequency"], "118.500");
    }

    #[test]
    fn test_export_sources_indent_and_no_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        export_sources(&sources(), dir.path(), None, 2).unwrap();
        let text = fs::read_to_string(dir.path().join("edgg/eddf.json")).unwrap();
        assert!(text.starts_with("[\n  {\n    \"logon\": \"EDDF_TWR\""));
        assert!(text.ends_with(']'));
    }

    #[test]
    fn test_export_sources_target_format() {
        let dir = tempfile::tempdir().unwrap();
        export_sources(&sources(), dir.path(), Some(Format::Toml), 4).unwrap();
        let text = fs::read_to_string(dir.path().join("edgg/eddf.toml")).unwrap();
        assert!(text.contains("[[stations]]"));
        assert!(text.contains("logon = \"EDDF_TWR\""));
        assert!(!dir.path().join("edgg/eddf.json").exists());
    }

    #[test]
    fn test_export_sources_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let bad = vec![RecordSource::new("edgg/eddf.yaml", vec![station("EDDF_TWR", "FT")])];
        assert!(export_sources(&bad, dir.path(), None, 4).is_err());
    }

    #[test]
    fn test_combine_resorts_across_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = combine(&sources(), dir.path(), None, 4, &SuffixOrder::default(), "stations")
            .unwrap();
        assert_eq!(path, dir.path().join("stations.json"));
        let value = read_json(&path);
        let logons: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["logon"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(logons, vec!["EDDB_APP", "EDDF_TWR"]);
        // per-source files are written too
        assert!(dir.path().join("edww/eddb.json").exists());
    }

    #[test]
    fn test_combine_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = combine(
            &sources(),
            dir.path(),
            Some(Format::Toml),
            4,
            &SuffixOrder::default(),
            "stations",
        )
        .unwrap();
        assert_eq!(path, dir.path().join("stations.toml"));
        assert!(!dir.path().join("stations.json").exists());
        assert!(dir.path().join("edww/eddb.toml").exists());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[[stations]]"));
        let eddb = text.find("logon = \"EDDB_APP\"").unwrap();
        let eddf = text.find("logon = \"EDDF_TWR\"").unwrap();
        assert!(eddb < eddf);
    }

    #[test]
    fn test_export_voice_and_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let voice = dir.path().join("legacy/atc_station_mappings.json");
        assert_eq!(export_voice(&sources(), &voice, 4).unwrap(), 2);
        assert_eq!(read_json(&voice)[0]["callsignPrefix"], "EDDB");

        let schedule = dir.path().join("schedule.json");
        assert_eq!(export_schedule(&sources(), &schedule, 4).unwrap(), 4);
        assert_eq!(read_json(&schedule)[0]["name"], "EDGG");
    }

    #[test]
    fn test_export_cpdlc_empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topsky/TopSkyCPDLC.txt");
        assert!(export_cpdlc(&sources(), &CallsignMap::new(), &path).is_err());
        assert!(!path.exists());
    }
}
