//! Registry loader: walks the region folders under the data root and turns
//! every `.json`/`.toml` file into a [`RecordSource`].
//!
//! Layout: `<root>/<region>/**/<file>`. Files directly in the root, files in
//! excluded top-level folders, and files with other extensions are ignored.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use datahub_core::codec::{parse_entries, Format};
use datahub_core::{DatahubError, LoadMode, RecordError, RecordSource, Station};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One failure encountered while loading a single file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{}: cannot read: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DatahubError,
    },
    #[error("{} (record {index}): {source}", .path.display())]
    Record {
        path: PathBuf,
        index: usize,
        #[source]
        source: RecordError,
    },
}

impl FileError {
    pub fn path(&self) -> &Path {
        match self {
            FileError::Read { path, .. }
            | FileError::Parse { path, .. }
            | FileError::Record { path, .. } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data root {} is not a directory", .0.display())]
    MissingRoot(PathBuf),
    #[error("cannot walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} load failure(s):\n{}", .0.len(), list_failures(.0))]
    Aggregate(Vec<FileError>),
}

fn list_failures(failures: &[FileError]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Sources that loaded, plus the failures skipped along the way.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub sources: Vec<RecordSource>,
    pub failures: Vec<FileError>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Load every data file below the non-excluded region folders of `root`.
///
/// In [`LoadMode::Skip`] each failure is logged and returned alongside the
/// valid sources. In [`LoadMode::Aggregate`] any failure turns the whole load
/// into [`LoadError::Aggregate`].
pub fn load(
    root: &Path,
    excluded: &HashSet<String>,
    mode: LoadMode,
) -> Result<LoadOutcome, LoadError> {
    let mut outcome = LoadOutcome::default();

    for region in region_dirs(root, excluded)? {
        for entry in WalkDir::new(&region).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| LoadError::Walk {
                path: e.path().unwrap_or(&region).to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Ok(format) = Format::from_path(path) else {
                debug!(path = %path.display(), "ignoring non-data file");
                continue;
            };
            let relative = path.strip_prefix(root).unwrap_or(path);
            if let Some(source) = load_file(path, relative, format, &mut outcome.failures) {
                outcome.sources.push(source);
            }
        }
    }

    match mode {
        LoadMode::Skip => {
            for failure in &outcome.failures {
                warn!("skipped: {failure}");
            }
            Ok(outcome)
        }
        LoadMode::Aggregate if !outcome.failures.is_empty() => {
            Err(LoadError::Aggregate(outcome.failures))
        }
        LoadMode::Aggregate => Ok(outcome),
    }
}

/// Top-level folders of `root`, sorted by name, minus the excluded ones.
fn region_dirs(root: &Path, excluded: &HashSet<String>) -> Result<Vec<PathBuf>, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }
    let walk_err = |source| LoadError::Walk {
        path: root.to_path_buf(),
        source,
    };

    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(walk_err)? {
        let entry = entry.map_err(walk_err)?;
        if !entry.file_type().map_err(walk_err)?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if excluded.contains(name.to_string_lossy().as_ref()) {
            debug!(folder = %name.to_string_lossy(), "excluded folder");
            continue;
        }
        dirs.push(entry.path());
    }
    dirs.sort();
    Ok(dirs)
}

/// Parse one file. Invalid records are recorded and dropped; a file with no
/// valid records yields no source.
fn load_file(
    path: &Path,
    relative: &Path,
    format: Format,
    failures: &mut Vec<FileError>,
) -> Option<RecordSource> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) => {
            failures.push(FileError::Read {
                path: relative.to_path_buf(),
                source,
            });
            return None;
        }
    };
    let entries = match parse_entries(&text, format) {
        Ok(entries) => entries,
        Err(source) => {
            failures.push(FileError::Parse {
                path: relative.to_path_buf(),
                source,
            });
            return None;
        }
    };

    let mut stations = Vec::with_capacity(entries.len());
    for (index, value) in entries.iter().enumerate() {
        match Station::from_value(value) {
            Ok(station) => stations.push(station),
            Err(source) => failures.push(FileError::Record {
                path: relative.to_path_buf(),
                index,
                source,
            }),
        }
    }

    debug!(path = %relative.display(), records = stations.len(), "loaded");
    if stations.is_empty() {
        None
    } else {
        Some(RecordSource::new(relative, stations))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
