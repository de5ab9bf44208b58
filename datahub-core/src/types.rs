//! Shared error types for datahub-core.

use thiserror::Error;

/// A single field failed its business rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("invalid frequency {value}: {reason}")]
    InvalidFrequency { value: String, reason: &'static str },
    #[error("invalid logon {0:?}: expected PREFIX[_MIDDLE]_SUFFIX in uppercase")]
    InvalidLogon(String),
    #[error("invalid airport code {0:?}: expected exactly 4 letters")]
    InvalidAirportCode(String),
    #[error("invalid CPDLC login {0:?}: must be exactly 4 characters")]
    InvalidCpdlcLogin(String),
    #[error("unknown schedule group {0:?}")]
    InvalidScheduleGroup(String),
    #[error("invalid gcap_status {0:?}: expected \"AFIS\", \"1\" or \"2\"")]
    InvalidGcapStatus(String),
    #[error("required field is missing")]
    Missing,
    #[error("{0}")]
    WrongType(String),
}

/// A station record could not be built because one of its fields is invalid.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field `{field}` ({value}): {reason}")]
pub struct RecordError {
    pub field: &'static str,
    pub value: String,
    #[source]
    pub reason: FieldError,
}

impl RecordError {
    pub fn new(field: &'static str, value: impl Into<String>, reason: FieldError) -> Self {
        RecordError {
            field,
            value: value.into(),
            reason,
        }
    }
}

/// All errors produced by datahub-core.
#[derive(Debug, Error)]
pub enum DatahubError {
    #[error("invalid record: {0}")]
    Record(#[from] RecordError),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),
    #[error("no CPDLC callsign mapping for prefix {prefix:?} (station {logon})")]
    MissingCallsignMapping { logon: String, prefix: String },
    #[error("nothing to export: {0}")]
    EmptyInput(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(String),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DatahubError>;
