//! Inverted duty-schedule index.
//!
//! For each schedule group, the logons of stations shown always / when
//! booked. Military (`MIL`) membership also comes from the logon: every
//! station whose logon starts with the military prefix joins `MIL` in each
//! list it has any tag in.

use serde::Serialize;

use crate::source::{all_stations, RecordSource};
use crate::station::{ScheduleGroup, Station};

/// Logon prefix of military stations.
pub const MILITARY_PREFIX: &str = "ET";

/// One group of the inverted schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub name: String,
    pub schedule_show_always: Vec<String>,
    pub schedule_show_booked: Vec<String>,
}

/// Whether a logon belongs to a military station.
pub fn is_military(logon: &str) -> bool {
    logon.starts_with(MILITARY_PREFIX)
}

fn member_of(group: ScheduleGroup, logon: &str, tags: &[ScheduleGroup]) -> bool {
    tags.contains(&group)
        || (group == ScheduleGroup::Mil && is_military(logon) && !tags.is_empty())
}

fn collect(
    group: ScheduleGroup,
    stations: &[&Station],
    tags: fn(&Station) -> &[ScheduleGroup],
) -> Vec<String> {
    let mut logons: Vec<String> = stations
        .iter()
        .filter(|s| member_of(group, &s.logon, tags(s)))
        .map(|s| s.logon.clone())
        .collect();
    logons.sort();
    logons
}

/// Build the inverted schedule, groups sorted by name.
pub fn invert_schedule(sources: &[RecordSource]) -> Vec<ScheduleEntry> {
    let stations: Vec<&Station> = all_stations(sources).collect();

    let mut entries: Vec<ScheduleEntry> = ScheduleGroup::ALL
        .iter()
        .map(|&group| ScheduleEntry {
            name: group.as_str().to_string(),
            schedule_show_always: collect(group, &stations, |s| s.schedule_show_always.as_slice()),
            schedule_show_booked: collect(group, &stations, |s| s.schedule_show_booked.as_slice()),
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
