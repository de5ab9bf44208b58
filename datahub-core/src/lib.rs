//! datahub-core: validation, ordering and export projections for the ATC
//! station registry.
//!
//! No network and no filesystem walking. The CLI crate loads files and
//! writes artifacts; this crate turns raw records into validated stations,
//! sorts them deterministically and derives every output shape.

pub mod codec;
pub mod config;
pub mod cpdlc;
pub mod reconcile;
pub mod schedule;
pub mod sort;
pub mod source;
pub mod station;
pub mod types;
pub mod validate;
pub mod voice;

// Re-export commonly used types at crate root
pub use codec::Format;
pub use config::{Config, LoadMode};
pub use sort::{sort_sources, HasLogon, SortInput, SuffixOrder};
pub use source::RecordSource;
pub use station::{Frequency, GcapStatus, ScheduleGroup, Station};
pub use types::*;
