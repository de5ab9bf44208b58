//! Deterministic station ordering.
//!
//! A logon `PREFIX[_MIDDLE]_SUFFIX` sorts by prefix, then by the rank of its
//! role suffix in a canonical list, then by middle part. Suffixes missing
//! from the list rank after every known one. With only two components the
//! second one serves as both suffix and middle key.
//!
//! Keys are computed once per element (`sort_by_cached_key`), so the logon is
//! extracted from each input exactly once and comparisons only see keys.

use serde_json::{Map, Value};

use crate::source::RecordSource;
use crate::station::Station;
use crate::validate::LOGON_SEPARATOR;

/// Canonical role-suffix order, from clearance delivery up to flight service.
pub const DEFAULT_SUFFIX_ORDER: &[&str] = &["DEL", "RMP", "GND", "TWR", "DEP", "APP", "CTR", "FSS"];

// ---------------------------------------------------------------------------
// Logon extraction
// ---------------------------------------------------------------------------

/// Anything that carries a station logon.
pub trait HasLogon {
    fn logon(&self) -> &str;
}

impl HasLogon for Station {
    fn logon(&self) -> &str {
        &self.logon
    }
}

impl HasLogon for str {
    fn logon(&self) -> &str {
        self
    }
}

impl HasLogon for String {
    fn logon(&self) -> &str {
        self
    }
}

/// Raw mappings use their `logon` key; a missing or non-string key sorts as `""`.
impl HasLogon for Map<String, Value> {
    fn logon(&self) -> &str {
        self.get("logon").and_then(Value::as_str).unwrap_or("")
    }
}

impl<T: HasLogon + ?Sized> HasLogon for &T {
    fn logon(&self) -> &str {
        (**self).logon()
    }
}

/// A borrowed sort input of mixed shape.
#[derive(Debug, Clone, Copy)]
pub enum SortInput<'a> {
    Station(&'a Station),
    Mapping(&'a Map<String, Value>),
    Logon(&'a str),
}

impl HasLogon for SortInput<'_> {
    fn logon(&self) -> &str {
        match self {
            SortInput::Station(s) => s.logon(),
            SortInput::Mapping(m) => m.logon(),
            SortInput::Logon(l) => l,
        }
    }
}

// ---------------------------------------------------------------------------
// Sort key
// ---------------------------------------------------------------------------

/// Canonical suffix ranking used for the secondary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixOrder {
    suffixes: Vec<String>,
}

impl SuffixOrder {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SuffixOrder {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of `suffix` in the list; unknown suffixes get `usize::MAX`.
    pub fn rank(&self, suffix: &str) -> usize {
        self.suffixes
            .iter()
            .position(|s| s == suffix)
            .unwrap_or(usize::MAX)
    }
}

impl Default for SuffixOrder {
    fn default() -> Self {
        SuffixOrder::new(DEFAULT_SUFFIX_ORDER.iter().copied())
    }
}

/// Ordering key derived from a logon.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub prefix: String,
    pub suffix_rank: usize,
    pub middle: String,
}

/// Compute the key for a logon.
pub fn sort_key(logon: &str, order: &SuffixOrder) -> SortKey {
    let mut parts = logon.split(LOGON_SEPARATOR);
    let prefix = parts.next().unwrap_or_default();
    let second = parts.next();
    let third = parts.next();

    let suffix = third.or(second).unwrap_or_default();

    SortKey {
        prefix: prefix.to_string(),
        suffix_rank: order.rank(suffix),
        middle: second.unwrap_or_default().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort in place. Stable: equal keys keep their input order.
pub fn sort_by_logon<T: HasLogon>(items: &mut [T], order: &SuffixOrder) {
    items.sort_by_cached_key(|item| sort_key(item.logon(), order));
}

/// Owned variant of [`sort_by_logon`].
pub fn sorted<T: HasLogon>(mut items: Vec<T>, order: &SuffixOrder) -> Vec<T> {
    sort_by_logon(&mut items, order);
    items
}

/// Sort the stations of one source.
pub fn sort_source(source: &mut RecordSource, order: &SuffixOrder) {
    sort_by_logon(&mut source.stations, order);
}

/// Sort the stations inside every source. The order of the sources is kept.
pub fn sort_sources(sources: &mut [RecordSource], order: &SuffixOrder) {
    for source in sources.iter_mut() {
        sort_source(source, order);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
