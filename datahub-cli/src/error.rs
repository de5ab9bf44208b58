//! Command-level errors and their exit codes.

use thiserror::Error;

use datahub_core::DatahubError;

use crate::loader::LoadError;
use crate::registry::FetchError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration: {0}")]
    Config(DatahubError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{0} load failure(s); nothing exported")]
    LoadFailures(usize),
    #[error(transparent)]
    Core(#[from] DatahubError),
    #[error("external registry: {0}")]
    Fetch(#[from] FetchError),
    #[error("report: {0}")]
    Report(#[from] csv::Error),
    #[error("{}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Process exit status: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            _ => 1,
        }
    }
}
