//! datahub: CLI for the ATC station registry.
//!
//! Every command loads the registry from the data directory, sorts it, and
//! then validates, rewrites, or exports it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing::{debug, info};

use datahub_core::config::{load_config, Config, CONFIG_FILE};
use datahub_core::cpdlc::parse_callsign_map;
use datahub_core::reconcile::reconcile;
use datahub_core::source::station_count;
use datahub_core::{sort_sources, Format, LoadMode, RecordSource};

mod error;
mod export;
mod loader;
mod registry;
mod report;

use error::{CliError, Result};
use loader::LoadOutcome;

#[derive(Parser)]
#[command(name = "datahub", version, about = "ATC station registry: validate, sort and export")]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log filter, e.g. "debug" or "datahub=trace" (overrides RUST_LOG)
    #[arg(long, global = true, env = "DATAHUB_LOG")]
    log_level: Option<String>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Loader failure handling: skip | aggregate
    #[arg(long, global = true)]
    mode: Option<LoadMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate every data file, print a per-file summary
    Check,

    /// Sort every data file in place
    Sort,

    /// Export sorted sources, the combined station list, voice mapping and schedule
    Combine {
        /// Write every file in this format instead of its own
        #[arg(long)]
        format: Option<Format>,
    },

    /// Write the duty-schedule roster
    Schedule {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the voice-platform station mapping
    Voice {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the TopSky CPDLC logon table
    Cpdlc {
        /// Logon prefix to CPDLC callsign lookup (JSON object)
        #[arg(long)]
        map: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the registry with the external station list, write a CSV report
    Reconcile {
        /// External registry page
        #[arg(long)]
        url: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", CliError::Config(e));
            std::process::exit(2);
        }
    };
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(mode) = cli.mode {
        config.load_mode = mode;
    }
    debug!(?config, "configuration");

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn init_logging(level: Option<&str>) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,datahub=info,datahub_core=info")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Check => cmd_check(config),
        Commands::Sort => {
            let sources = load_sorted(config)?;
            let written = export::export_sources(&sources, &config.data_dir, None, config.json_indent)?;
            println!("Sorted {written} files ({} stations)", station_count(&sources));
            Ok(())
        }
        Commands::Combine { format } => cmd_combine(config, format),
        Commands::Schedule { output } => {
            let sources = load_sorted(config)?;
            let path = output.unwrap_or_else(|| config.output_path(&config.outputs.schedule));
            let groups = export::export_schedule(&sources, &path, config.json_indent)?;
            println!("Wrote {groups} schedule groups to {}", path.display());
            Ok(())
        }
        Commands::Voice { output } => {
            let sources = load_sorted(config)?;
            let path = output.unwrap_or_else(|| config.output_path(&config.outputs.voice_mapping));
            let count = export::export_voice(&sources, &path, config.json_indent)?;
            println!("Wrote {count} voice mappings to {}", path.display());
            Ok(())
        }
        Commands::Cpdlc { map, output } => {
            let sources = load_sorted(config)?;
            let map_path = map.unwrap_or_else(|| config.cpdlc_map_path());
            let callsigns = parse_callsign_map(&read_text(&map_path)?)?;
            let path = output.unwrap_or_else(|| config.output_path(&config.outputs.cpdlc));
            let count = export::export_cpdlc(&sources, &callsigns, &path)?;
            println!("Wrote {count} CPDLC logins to {}", path.display());
            Ok(())
        }
        Commands::Reconcile { url, output } => cmd_reconcile(config, url, output),
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_outcome(config: &Config) -> Result<LoadOutcome> {
    let excluded: HashSet<String> = config.exclude_folders.iter().cloned().collect();
    Ok(loader::load(&config.data_dir, &excluded, config.load_mode)?)
}

/// Load the registry and sort it. Any load failure aborts the command.
fn load_sorted(config: &Config) -> Result<Vec<RecordSource>> {
    let outcome = load_outcome(config)?;
    if !outcome.is_clean() {
        return Err(CliError::LoadFailures(outcome.failures.len()));
    }
    let mut sources = outcome.sources;
    sort_sources(&mut sources, &config.suffix_order());
    info!(
        files = sources.len(),
        stations = station_count(&sources),
        "registry loaded"
    );
    Ok(sources)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_check(config: &Config) -> Result<()> {
    let outcome = load_outcome(config)?;

    let mut table = Table::new();
    table.set_header(vec!["Source", "Stations"]);
    for source in &outcome.sources {
        table.add_row(vec![
            Cell::new(source.source.display()),
            Cell::new(source.len()),
        ]);
    }
    println!("{table}");
    println!(
        "  {} files, {} stations, {} failures",
        outcome.sources.len(),
        station_count(&outcome.sources),
        outcome.failures.len()
    );

    if outcome.is_clean() {
        println!("All data files are valid");
        Ok(())
    } else {
        for failure in &outcome.failures {
            eprintln!("  {failure}");
        }
        Err(CliError::LoadFailures(outcome.failures.len()))
    }
}

fn cmd_combine(config: &Config, format: Option<Format>) -> Result<()> {
    let sources = load_sorted(config)?;
    let indent = config.json_indent;

    let combined = export::combine(
        &sources,
        &config.api_dir,
        format,
        indent,
        &config.suffix_order(),
        &config.outputs.combined_name,
    )?;
    println!(
        "Exported {} files and {} stations to {}",
        sources.len(),
        station_count(&sources),
        combined.display()
    );

    let voice_path = config.output_path(&config.outputs.voice_mapping);
    let count = export::export_voice(&sources, &voice_path, indent)?;
    println!("Wrote {count} voice mappings to {}", voice_path.display());

    let schedule_path = config.output_path(&config.outputs.schedule);
    let groups = export::export_schedule(&sources, &schedule_path, indent)?;
    println!("Wrote {groups} schedule groups to {}", schedule_path.display());
    Ok(())
}

fn cmd_reconcile(config: &Config, url: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let sources = load_sorted(config)?;
    let settings = &config.reconcile;
    let url = url.unwrap_or_else(|| settings.url.clone());

    let rows = registry::fetch_stations(
        &url,
        Duration::from_secs(settings.timeout_secs),
        settings.table_index,
    )?;
    let external = settings.exclusion_rules().retain(rows);
    println!("Fetched {} external stations", external.len());

    let reconciliation = reconcile(&sources, &external);
    let path = output.unwrap_or_else(|| config.output_path(&config.outputs.reconcile_report));
    report::write_report_file(&reconciliation, &path)?;
    println!(
        "Wrote {} differences ({} missing externally, {} missing locally) to {}",
        reconciliation.len(),
        reconciliation.missing_external.len(),
        reconciliation.missing_internal.len(),
        path.display()
    );
    Ok(())
}
