//! Reconciliation report: `;`-delimited CSV of the registry differences.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Terminator, WriterBuilder};

use datahub_core::reconcile::{Reconciliation, REPORT_HEADER};

/// Write the report (header plus one row per difference) to `out`.
pub fn write_report<W: Write>(reconciliation: &Reconciliation<'_>, out: W) -> csv::Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .terminator(Terminator::CRLF)
        .from_writer(out);
    writer.write_record(REPORT_HEADER)?;
    for row in reconciliation.rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the report file, creating its parent directories.
pub fn write_report_file(reconciliation: &Reconciliation<'_>, path: &Path) -> csv::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_report(reconciliation, File::create(path)?)
}
