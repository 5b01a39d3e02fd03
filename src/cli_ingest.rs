use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use track_catalog::catalog::{LoadStatus, SystemClock, TrackStore};
use track_catalog::cli_style::{
    get_styles, print_error, print_key_value, print_section_footer, print_section_header,
    print_success, print_warning,
};
use track_catalog::config::{AppConfig, CliConfig};
use track_catalog::harvest::{CandidateAssembler, RawCandidate};
use track_catalog::logging::init_logging;
use track_catalog::{ingest, IngestOutcome, IngestSummary};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path))
}

/// Reads harvested candidates, one JSON object per line, and adds the new
/// ones to the catalog.
#[derive(Parser, Debug)]
#[command(name = "cli-ingest", version, styles = get_styles())]
struct CliArgs {
    /// JSON lines file to read. Reads stdin when omitted or `-`.
    pub input: Option<String>,

    /// Path to the tracks database JSON file.
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Genre used when none can be parsed.
    #[clap(long)]
    pub default_genre: Option<String>,

    /// Artist used when none can be parsed.
    #[clap(long)]
    pub unknown_artist: Option<String>,

    /// Log level (trace, debug, info, warn, error). LOG_LEVEL takes precedence.
    #[clap(long)]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[clap(long, value_parser = parse_path)]
    pub log_file: Option<PathBuf>,

    /// Process the input without saving the catalog.
    #[clap(long)]
    pub dry_run: bool,
}

fn open_input(input: Option<&str>) -> Result<Box<dyn BufRead>> {
    match input {
        None | Some("-") => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input {:?}", path))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let cli_config = CliConfig {
        db_path: cli_args.db.clone(),
        default_genre: cli_args.default_genre.clone(),
        unknown_artist: cli_args.unknown_artist.clone(),
        log_level: cli_args.log_level.clone(),
        log_file: cli_args.log_file.clone(),
        ..Default::default()
    };
    let config = AppConfig::load(&cli_config, cli_args.config.as_deref())?;
    let _logging = init_logging(&config.log_level, config.log_file.as_deref())?;

    let (store, status) = TrackStore::open(&config.db_path, Arc::new(SystemClock));
    if let LoadStatus::Recovered(err) = &status {
        print_warning(&format!("Starting from an empty catalog: {}", err));
    }
    let mut store = store.with_defaults(config.defaults.clone());
    let assembler = CandidateAssembler::new(config.assembler_settings());

    let reader = open_input(cli_args.input.as_deref())?;
    let mut summary = IngestSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawCandidate = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Line {}: not a candidate: {}", index + 1, err);
                print_error(&format!("Line {} rejected: {}", index + 1, err));
                summary.record_rejected();
                continue;
            }
        };

        let outcome = ingest(&mut store, &assembler, &raw);
        if let IngestOutcome::Created { id, degraded } = &outcome {
            for field in degraded {
                info!("{}: no {} found, used fallback", id, field.field);
            }
        }
        summary.record(&outcome);
    }

    print_section_header("Ingest");
    print_key_value("Processed", &summary.processed.to_string());
    print_key_value("Created", &summary.created.to_string());
    print_key_value("Already present", &summary.existing.to_string());
    print_key_value("Created with fallbacks", &summary.degraded.to_string());
    print_key_value("Rejected", &summary.rejected.to_string());
    print_section_footer();

    if cli_args.dry_run {
        print_warning("Dry run, catalog not saved");
    } else if store.is_dirty() {
        store.save().context("Failed to save catalog")?;
        print_success(&format!(
            "Saved {} tracks to {}",
            store.len(),
            store.path().display()
        ));
    }

    Ok(())
}
