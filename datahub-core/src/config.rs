//! Configuration file management for datahub.
//!
//! Reads `datahub.toml` from the repository root: data/API directories,
//! loader mode, sort order, JSON indent, artifact paths, and the
//! reconciliation source. Every key is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codec::DEFAULT_JSON_INDENT;
use crate::reconcile::ExclusionRules;
use crate::sort::{SuffixOrder, DEFAULT_SUFFIX_ORDER};
use crate::types::{DatahubError, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "datahub.toml";

// ---------------------------------------------------------------------------
// Load mode
// ---------------------------------------------------------------------------

/// How the loader reports per-file and per-record failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Log each failure, keep every valid record, return the failures.
    #[default]
    Skip,
    /// Attempt every file, then fail once with all failures.
    Aggregate,
}

impl std::str::FromStr for LoadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(LoadMode::Skip),
            "aggregate" => Ok(LoadMode::Aggregate),
            other => Err(format!("unknown load mode {other:?} (expected skip|aggregate)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Config structure
// ---------------------------------------------------------------------------

/// Full configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_dir: PathBuf,
    pub exclude_folders: Vec<String>,
    pub json_indent: usize,
    pub load_mode: LoadMode,
    pub suffix_order: Vec<String>,
    /// Logon prefix to CPDLC callsign lookup, relative to `data_dir`.
    pub cpdlc_map: PathBuf,
    pub outputs: OutputConfig,
    pub reconcile: ReconcileConfig,
}

/// Destination paths of the derived artifacts, relative to `api_dir`.
/// Absolute paths are used as given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub combined_name: String,
    pub schedule: PathBuf,
    pub voice_mapping: PathBuf,
    pub cpdlc: PathBuf,
    pub reconcile_report: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    pub url: String,
    pub timeout_secs: u64,
    /// Zero-based index of the HTML table holding the station rows.
    pub table_index: usize,
    pub country_id: String,
    pub callsign_prefixes: Vec<String>,
    pub excluded_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: "data".into(),
            api_dir: "api".into(),
            exclude_folders: vec!["event_schedules".into(), "topsky".into()],
            json_indent: DEFAULT_JSON_INDENT,
            load_mode: LoadMode::default(),
            suffix_order: DEFAULT_SUFFIX_ORDER.iter().map(|s| s.to_string()).collect(),
            cpdlc_map: "topsky/cpdlcMap.json".into(),
            outputs: OutputConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            combined_name: "stations".into(),
            schedule: "schedule.json".into(),
            voice_mapping: "legacy/atc_station_mappings.json".into(),
            cpdlc: "topsky/TopSkyCPDLC.txt".into(),
            reconcile_report: "vateud_diff.csv".into(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        let rules = ExclusionRules::default();
        ReconcileConfig {
            url: "https://fsmine.dhis.org/vateud8".into(),
            timeout_secs: 10,
            table_index: 1,
            country_id: rules.country_id,
            callsign_prefixes: rules.callsign_prefixes,
            excluded_suffix: rules.excluded_suffix,
        }
    }
}

impl Config {
    pub fn suffix_order(&self) -> SuffixOrder {
        SuffixOrder::new(self.suffix_order.iter().cloned())
    }

    /// Resolve an artifact path from `outputs` against `api_dir`.
    pub fn output_path(&self, relative: &Path) -> PathBuf {
        self.api_dir.join(relative)
    }

    /// Location of the CPDLC callsign lookup inside `data_dir`.
    pub fn cpdlc_map_path(&self) -> PathBuf {
        self.data_dir.join(&self.cpdlc_map)
    }
}

impl ReconcileConfig {
    pub fn exclusion_rules(&self) -> ExclusionRules {
        ExclusionRules {
            country_id: self.country_id.clone(),
            callsign_prefixes: self.callsign_prefixes.clone(),
            excluded_suffix: self.excluded_suffix.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load config from `path`.
///
/// Returns the default config if the file doesn't exist; a file that exists
/// but can't be read or parsed is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| DatahubError::Config(format!("{}: {e}", path.display())))?;
    parse_config(&text).map_err(|e| match e {
        DatahubError::Config(msg) => DatahubError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Parse config TOML text.
pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text).map_err(|e| DatahubError::Config(e.to_string()))?;
    if config.json_indent > 16 {
        return Err(DatahubError::Config(format!(
            "json_indent {} is out of range (0-16)",
            config.json_indent
        )));
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.json_indent, 4);
        assert_eq!(config.load_mode, LoadMode::Skip);
        assert_eq!(config.exclude_folders, vec!["event_schedules", "topsky"]);
        assert_eq!(config.suffix_order().rank("TWR"), 3);
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
data_dir = "registry"
json_indent = 2
load_mode = "aggregate"
suffix_order = ["CTR", "APP", "TWR"]

[outputs]
schedule = "out/schedule.json"

[reconcile]
country_id = "7"
callsign_prefixes = ["LO"]
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("registry"));
        assert_eq!(config.json_indent, 2);
        assert_eq!(config.load_mode, LoadMode::Aggregate);
        assert_eq!(config.suffix_order().rank("CTR"), 0);
        assert_eq!(config.outputs.schedule, PathBuf::from("out/schedule.json"));
        assert_eq!(
            config.output_path(&config.outputs.schedule),
            PathBuf::from("api/out/schedule.json")
        );
        // untouched keys keep their defaults
        assert_eq!(config.outputs.combined_name, "stations");
        assert_eq!(config.api_dir, PathBuf::from("api"));

        let rules = config.reconcile.exclusion_rules();
        assert_eq!(rules.country_id, "7");
        assert_eq!(rules.callsign_prefixes, vec!["LO"]);
        assert_eq!(rules.excluded_suffix, "ATIS");
    }

    #[test]
    fn test_outputs_follow_api_dir() {
        let config = parse_config("api_dir = \"public\"\ndata_dir = \"registry\"\n").unwrap();
        assert_eq!(
            config.output_path(&config.outputs.schedule),
            PathBuf::from("public/schedule.json")
        );
        assert_eq!(
            config.output_path(&config.outputs.voice_mapping),
            PathBuf::from("public/legacy/atc_station_mappings.json")
        );
        assert_eq!(
            config.output_path(&config.outputs.reconcile_report),
            PathBuf::from("public/vateud_diff.csv")
        );
        assert_eq!(
            config.cpdlc_map_path(),
            PathBuf::from("registry/topsky/cpdlcMap.json")
        );
    }

    #[test]
    fn test_default_output_paths() {
        let config = Config::default();
        assert_eq!(
            config.output_path(&config.outputs.cpdlc),
            PathBuf::from("api/topsky/TopSkyCPDLC.txt")
        );
        assert_eq!(config.cpdlc_map_path(), PathBuf::from("data/topsky/cpdlcMap.json"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        assert!(matches!(
            parse_config("datadir = \"x\"\n"),
            Err(DatahubError::Config(_))
        ));
    }

    #[test]
    fn test_parse_config_indent_range() {
        assert!(parse_config("json_indent = 64\n").is_err());
    }

    #[test]
    fn test_missing_file_gives_default() {
        let config = load_config(Path::new("/nonexistent/datahub.toml")).unwrap();
        assert_eq!(config.api_dir, PathBuf::from("api"));
    }

    #[test]
    fn test_load_mode_from_str() {
        assert_eq!("Aggregate".parse::<LoadMode>(), Ok(LoadMode::Aggregate));
        assert!("strict".parse::<LoadMode>().is_err());
    }
}
