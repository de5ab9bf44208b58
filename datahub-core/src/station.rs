//! Station record: the validated registry entity.
//!
//! Records are built from a JSON-style mapping (TOML input is converted to
//! the same shape) and serialized back with absent fields and empty lists
//! omitted. Key order on output follows the field order below.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use serde_path_to_error::Segment;

use crate::types::{FieldError, RecordError};
use crate::validate;

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// A validated radio frequency, stored in kHz. Displays as `"118.500"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Frequency(u32);

impl Frequency {
    pub fn from_mhz(mhz: f64) -> Result<Self, FieldError> {
        validate::frequency_khz(mhz).map(Frequency)
    }

    pub fn khz(&self) -> u32 {
        self.0
    }
}

impl std::str::FromStr for Frequency {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate::parse_frequency(s).map(Frequency)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Schedule groups / GCAP status
// ---------------------------------------------------------------------------

/// Duty-roster tag a station can be listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScheduleGroup {
    Edgg,
    Edmm,
    Edww,
    Mil,
}

impl ScheduleGroup {
    pub const ALL: [ScheduleGroup; 4] = [
        ScheduleGroup::Edgg,
        ScheduleGroup::Edmm,
        ScheduleGroup::Edww,
        ScheduleGroup::Mil,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleGroup::Edgg => "EDGG",
            ScheduleGroup::Edmm => "EDMM",
            ScheduleGroup::Edww => "EDWW",
            ScheduleGroup::Mil => "MIL",
        }
    }

    pub fn parse(tag: &str) -> Result<Self, FieldError> {
        ScheduleGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == tag)
            .ok_or_else(|| FieldError::InvalidScheduleGroup(tag.to_string()))
    }
}

impl fmt::Display for ScheduleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GCAP certification level of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GcapStatus {
    #[serde(rename = "AFIS")]
    Afis,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl GcapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GcapStatus::Afis => "AFIS",
            GcapStatus::One => "1",
            GcapStatus::Two => "2",
        }
    }

    pub fn parse(value: &str) -> Result<Self, FieldError> {
        match value {
            "AFIS" => Ok(GcapStatus::Afis),
            "1" => Ok(GcapStatus::One),
            "2" => Ok(GcapStatus::Two),
            other => Err(FieldError::InvalidGcapStatus(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw record
// ---------------------------------------------------------------------------

/// Record keys in output order.
const FIELDS: [&str; 11] = [
    "logon",
    "frequency",
    "abbreviation",
    "description",
    "schedule_show_always",
    "schedule_show_booked",
    "relevant_airports",
    "gcap_status",
    "s1_twr",
    "cpdlc_login",
    "s1_theory",
];

/// Frequency as written in a data file: text or a bare number.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawFrequency {
    Text(String),
    Number(f64),
}

impl RawFrequency {
    fn resolve(&self) -> Result<Frequency, FieldError> {
        match self {
            RawFrequency::Text(text) => text.parse(),
            RawFrequency::Number(mhz) => Frequency::from_mhz(*mhz),
        }
    }
}

/// A station record as stored on disk, shape-checked but not yet validated.
/// Absent and `null` keys are both `None`; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawStation {
    pub logon: Option<String>,
    pub frequency: Option<RawFrequency>,
    pub abbreviation: Option<String>,
    pub description: Option<String>,
    pub schedule_show_always: Option<Vec<String>>,
    pub schedule_show_booked: Option<Vec<String>>,
    pub relevant_airports: Option<Vec<String>>,
    pub gcap_status: Option<String>,
    pub s1_twr: Option<bool>,
    pub cpdlc_login: Option<String>,
    pub s1_theory: Option<bool>,
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// One ATC station as stored in the registry.
///
/// Serializes with absent fields and empty lists omitted, keys in field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub logon: String,
    pub frequency: Frequency,
    pub abbreviation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schedule_show_always: Vec<ScheduleGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schedule_show_booked: Vec<ScheduleGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relevant_airports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcap_status: Option<GcapStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s1_twr: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpdlc_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s1_theory: Option<bool>,
}

impl Station {
    /// Build a station from any JSON value; non-objects are rejected.
    ///
    /// A key of the wrong JSON type fails with that key as the field.
    pub fn from_value(value: &Value) -> Result<Station, RecordError> {
        if !value.is_object() {
            return Err(RecordError::new(
                "record",
                value.to_string(),
                FieldError::WrongType("invalid type: expected an object".into()),
            ));
        }
        let raw: RawStation = serde_path_to_error::deserialize(value).map_err(|e| {
            let field = e
                .path()
                .iter()
                .find_map(|segment| match segment {
                    Segment::Map { key } => FIELDS.iter().copied().find(|f| *f == key.as_str()),
                    _ => None,
                })
                .unwrap_or("record");
            let shown = match value.get(field) {
                Some(v) => v.to_string(),
                None => value.to_string(),
            };
            RecordError::new(field, shown, FieldError::WrongType(e.inner().to_string()))
        })?;
        Station::try_from(raw)
    }

    /// Build a station from a mapping, validating every field in order.
    pub fn from_mapping(map: &Map<String, Value>) -> Result<Station, RecordError> {
        Station::from_value(&Value::Object(map.clone()))
    }

    /// Serialize to a mapping. Absent fields and empty lists are omitted.
    pub fn to_mapping(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// First `_`-separated component of the logon (`EDDF` for `EDDF_N_APP`).
    pub fn callsign_prefix(&self) -> &str {
        callsign_prefix(&self.logon)
    }
}

impl TryFrom<RawStation> for Station {
    type Error = RecordError;

    /// Validate every field in order. The first invalid field fails the whole
    /// record. `schedule_show_booked` is resolved after `schedule_show_always`
    /// and loses every tag that is already shown always.
    fn try_from(raw: RawStation) -> Result<Station, RecordError> {
        let logon = required("logon", raw.logon)?;
        validate::validate_logon(&logon)
            .map_err(|e| RecordError::new("logon", json_text(&logon), e))?;

        let frequency = match &raw.frequency {
            None => Err(RecordError::new("frequency", "null", FieldError::Missing)),
            Some(f) => f
                .resolve()
                .map_err(|e| RecordError::new("frequency", json_text(f), e)),
        }?;

        let abbreviation = required("abbreviation", raw.abbreviation)?;

        let schedule_show_always = schedule_groups("schedule_show_always", raw.schedule_show_always)?;
        let mut schedule_show_booked =
            schedule_groups("schedule_show_booked", raw.schedule_show_booked)?;
        schedule_show_booked.retain(|g| !schedule_show_always.contains(g));

        let airports = raw.relevant_airports.unwrap_or_default();
        let relevant_airports = airports
            .iter()
            .map(|code| validate::validate_icao(code))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RecordError::new("relevant_airports", json_text(&airports), e))?;

        let gcap_status = raw
            .gcap_status
            .as_deref()
            .map(GcapStatus::parse)
            .transpose()
            .map_err(|e| RecordError::new("gcap_status", json_text(&raw.gcap_status), e))?;

        let cpdlc_login = match raw.cpdlc_login {
            Some(login) => {
                validate::validate_cpdlc_login(&login)
                    .map_err(|e| RecordError::new("cpdlc_login", json_text(&login), e))?;
                Some(login)
            }
            None => None,
        };

        Ok(Station {
            logon,
            frequency,
            abbreviation,
            description: raw.description,
            schedule_show_always,
            schedule_show_booked,
            relevant_airports,
            gcap_status,
            s1_twr: raw.s1_twr,
            cpdlc_login,
            s1_theory: raw.s1_theory,
        })
    }
}

/// First `_`-separated component of a logon.
pub fn callsign_prefix(logon: &str) -> &str {
    logon
        .split(validate::LOGON_SEPARATOR)
        .next()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn json_text<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn required(field: &'static str, value: Option<String>) -> Result<String, RecordError> {
    value.ok_or_else(|| RecordError::new(field, "null", FieldError::Missing))
}

fn schedule_groups(
    field: &'static str,
    tags: Option<Vec<String>>,
) -> Result<Vec<ScheduleGroup>, RecordError> {
    let tags = tags.unwrap_or_default();
    tags.iter()
        .map(|tag| ScheduleGroup::parse(tag))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RecordError::new(field, json_text(&tags), e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn station(value: Value) -> Result<Station, RecordError> {
        Station::from_value(&value)
    }

    #[test]
    fn test_minimal_station() {
        let s = station(json!({"logon": "EDDL_TWR", "frequency": "118.305", "abbreviation": "DLT"}))
            .unwrap();
        assert_eq!(s.logon, "EDDL_TWR");
        assert_eq!(s.frequency.khz(), 118_305);
        assert_eq!(s.frequency.to_string(), "118.305");
        assert!(s.description.is_none());
        assert!(s.schedule_show_always.is_empty());
    }

    #[test]
    fn test_numeric_frequency_is_normalized() {
        let s = station(json!({"logon": "EDDF_TWR", "frequency": 118.5, "abbreviation": "FT"}))
            .unwrap();
        assert_eq!(s.frequency.to_string(), "118.500");
    }

    #[test]
    fn test_booked_loses_always_tags() {
        let s = station(json!({
            "logon": "EDGG_GIN_CTR",
            "frequency": "124.725",
            "abbreviation": "GIN",
            "schedule_show_always": ["EDGG"],
            "schedule_show_booked": ["EDWW", "EDGG"],
        }))
        .unwrap();
        assert_eq!(s.schedule_show_always, vec![ScheduleGroup::Edgg]);
        assert_eq!(s.schedule_show_booked, vec![ScheduleGroup::Edww]);
    }

    #[test]
    fn test_airports_uppercased() {
        let s = station(json!({
            "logon": "EDDB_APP",
            "frequency": "119.855",
            "abbreviation": "BA",
            "relevant_airports": ["eddb", "EDAZ"],
        }))
        .unwrap();
        assert_eq!(s.relevant_airports, vec!["EDDB", "EDAZ"]);
    }

    #[test]
    fn test_invalid_field_fails_record() {
        let err = station(json!({
            "logon": "EDDB_APP",
            "frequency": "119.855",
            "abbreviation": "BA",
            "relevant_airports": ["EDDB", "ED1"],
        }))
        .unwrap_err();
        assert_eq!(err.field, "relevant_airports");
        assert_eq!(err.reason, FieldError::InvalidAirportCode("ED1".into()));
    }

    #[test]
    fn test_missing_required_field() {
        let err = station(json!({"logon": "EDDB_APP", "frequency": "119.855"})).unwrap_err();
        assert_eq!(err.field, "abbreviation");
        assert_eq!(err.reason, FieldError::Missing);
        assert_eq!(err.value, "null");
    }

    #[test]
    fn test_invalid_frequency_reports_value() {
        let err = station(json!({"logon": "EDDB_APP", "frequency": "118.020", "abbreviation": "BA"}))
            .unwrap_err();
        assert_eq!(err.field, "frequency");
        assert_eq!(err.value, "\"118.020\"");
        assert!(matches!(err.reason, FieldError::InvalidFrequency { .. }));
    }

    #[test]
    fn test_invalid_logon() {
        let err = station(json!({"logon": "eddb-app", "frequency": "118.500", "abbreviation": "BA"}))
            .unwrap_err();
        assert_eq!(err.field, "logon");
    }

    #[test]
    fn test_cpdlc_login_length() {
        let err = station(json!({
            "logon": "EDGG_CTR",
            "frequency": "136.955",
            "abbreviation": "G",
            "cpdlc_login": "EDG",
        }))
        .unwrap_err();
        assert_eq!(err.reason, FieldError::InvalidCpdlcLogin("EDG".into()));
    }

    #[test]
    fn test_unknown_schedule_group() {
        let err = station(json!({
            "logon": "EDGG_CTR",
            "frequency": "136.955",
            "abbreviation": "G",
            "schedule_show_always": ["XXXX"],
        }))
        .unwrap_err();
        assert_eq!(err.field, "schedule_show_always");
    }

    #[test]
    fn test_schedule_must_be_list() {
        let err = station(json!({
            "logon": "EDGG_CTR",
            "frequency": "136.955",
            "abbreviation": "G",
            "schedule_show_booked": "EDGG",
        }))
        .unwrap_err();
        assert_eq!(err.field, "schedule_show_booked");
        assert_eq!(err.value, "\"EDGG\"");
        assert!(matches!(err.reason, FieldError::WrongType(_)));
    }

    #[test]
    fn test_wrong_type_names_field() {
        let err = station(json!({
            "logon": "EDGG_CTR",
            "frequency": true,
            "abbreviation": "G",
        }))
        .unwrap_err();
        assert_eq!(err.field, "frequency");
        assert_eq!(err.value, "true");

        let err = station(json!({
            "logon": "EDGG_CTR",
            "frequency": "136.955",
            "abbreviation": "G",
            "s1_twr": "yes",
        }))
        .unwrap_err();
        assert_eq!(err.field, "s1_twr");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let s = station(json!({
            "logon": "EDDF_TWR",
            "frequency": "118.500",
            "abbreviation": "FT",
            "comment": "not part of the record",
        }))
        .unwrap();
        assert!(!s.to_mapping().contains_key("comment"));
    }

    #[test]
    fn test_serialize_matches_mapping() {
        let s = station(json!({
            "logon": "EDDF_TWR",
            "frequency": 118.5,
            "abbreviation": "FT",
            "schedule_show_always": ["MIL"],
            "gcap_status": "AFIS",
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "logon": "EDDF_TWR",
                "frequency": "118.500",
                "abbreviation": "FT",
                "schedule_show_always": ["MIL"],
                "gcap_status": "AFIS",
            })
        );
    }

    #[test]
    fn test_non_object_record() {
        let err = station(json!(["EDDF_TWR"])).unwrap_err();
        assert_eq!(err.field, "record");
    }

    #[test]
    fn test_to_mapping_omits_empty() {
        let s = station(json!({
            "logon": "EDDF_TWR",
            "frequency": "118.500",
            "abbreviation": "TWR",
            "description": "Frankfurt Tower",
            "schedule_show_always": [],
            "relevant_airports": [],
            "s1_twr": null,
        }))
        .unwrap();
        let keys: Vec<_> = s.to_mapping().keys().cloned().collect();
        assert_eq!(keys, vec!["logon", "frequency", "abbreviation", "description"]);
    }

    #[test]
    fn test_booked_emptied_by_dedup_is_omitted() {
        let s = station(json!({
            "logon": "EDGG_CTR",
            "frequency": "136.955",
            "abbreviation": "G",
            "schedule_show_always": ["EDGG"],
            "schedule_show_booked": ["EDGG"],
        }))
        .unwrap();
        assert!(!s.to_mapping().contains_key("schedule_show_booked"));
    }

    #[test]
    fn test_mapping_roundtrip() {
        let input = json!({
            "logon": "EDDM_N_APP",
            "frequency": "127.955",
            "abbreviation": "MN",
            "description": "München Approach North",
            "schedule_show_always": ["EDMM"],
            "schedule_show_booked": ["MIL"],
            "relevant_airports": ["EDDM"],
            "gcap_status": "1",
            "s1_twr": false,
            "cpdlc_login": "EDMM",
            "s1_theory": true,
        });
        let s = station(input.clone()).unwrap();
        let mapping = s.to_mapping();
        assert_eq!(Value::Object(mapping.clone()), input);

        let again = Station::from_mapping(&mapping).unwrap();
        assert_eq!(again, s);
        assert_eq!(again.to_mapping(), mapping);
    }

    #[test]
    fn test_callsign_prefix() {
        assert_eq!(callsign_prefix("EDDF_N_APP"), "EDDF");
        assert_eq!(callsign_prefix("EDDF"), "EDDF");
        assert_eq!(callsign_prefix(""), "");
    }

    #[test]
    fn test_gcap_status_values() {
        assert_eq!(GcapStatus::parse("AFIS"), Ok(GcapStatus::Afis));
        assert_eq!(GcapStatus::parse("2").map(|g| g.as_str()), Ok("2"));
        assert!(GcapStatus::parse("3").is_err());
    }
}
