use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use track_catalog::catalog::{Clock, LoadStatus, SystemClock, TrackRecord, TrackStore};
use track_catalog::cli_style::{
    get_styles, print_empty_list, print_key_value, print_list_item,
    print_section_footer, print_section_header, print_success, print_warning, TableBuilder,
};
use track_catalog::config::{AppConfig, CliConfig};
use track_catalog::logging::init_logging;
use track_catalog::maintenance::{
    attach_file, cleanup, export_catalog, export_playlist, generate_report, suggested_file_name,
    CleanupMode, ExportFormat, PlaylistFormat,
};
use track_catalog::query::{aggregate, search, select, SearchField, TrackFilter, TrackHit};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path))
}

#[derive(Parser, Debug)]
#[command(name = "catalog-cli", version, styles = get_styles())]
struct CliArgs {
    /// Path to the tracks database JSON file.
    #[clap(long, global = true, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory for exports and playlists. Defaults to the database directory.
    #[clap(long, global = true, value_parser = parse_path)]
    pub export_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). LOG_LEVEL takes precedence.
    #[clap(long, global = true)]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[clap(long, global = true, value_parser = parse_path)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db.clone(),
            export_dir: self.export_dir.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Case-insensitive substring search over titles, artists and genres.
    Search {
        query: String,

        /// Field to search: all, title, artist or genre.
        #[clap(long, default_value = "all")]
        field: SearchField,

        /// Maximum number of rows to print.
        #[clap(long, default_value_t = 20)]
        limit: usize,
    },

    /// Prints catalog statistics.
    Stats {
        /// Print the statistics as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Exports the whole catalog to a timestamped file.
    Export {
        /// Output format: json or csv.
        #[clap(long, default_value = "json")]
        format: ExportFormat,
    },

    /// Writes a playlist of the tracks matching all given filters.
    Playlist {
        #[clap(long)]
        genre: Option<String>,

        #[clap(long)]
        artist: Option<String>,

        #[clap(long)]
        year: Option<String>,

        /// Output format: m3u or json.
        #[clap(long, default_value = "m3u")]
        format: PlaylistFormat,
    },

    /// Removes tracks whose downloaded file no longer exists.
    Cleanup {
        /// Only report what would be removed.
        #[clap(long)]
        dry_run: bool,
    },

    /// Prints a plain-text catalog report.
    Report {
        /// Also write the report to this file.
        #[clap(long, value_parser = parse_path)]
        output: Option<PathBuf>,
    },

    /// Records a downloaded file against a track.
    Attach {
        id: String,
        #[clap(value_parser = parse_path)]
        path: PathBuf,
    },

    /// Shows every field of one track.
    Show { id: String },
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let config = AppConfig::load(&cli_args.to_cli_config(), cli_args.config.as_deref())?;
    let _logging = init_logging(&config.log_level, config.log_file.as_deref())?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut store = open_store(&config, clock.clone());

    match cli_args.command {
        Command::Search {
            query,
            field,
            limit,
        } => {
            let hits = search(&store, &query, field);
            print_section_header(&format!("Search: {} ({})", query, field));
            print_hits(&hits, limit);
            print_section_footer();
        }
        Command::Stats { json } => {
            let stats = aggregate(&store);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
        Command::Export { format } => {
            let path = export_catalog(&store, format, &config.export_dir, clock.now())?;
            print_success(&format!("Exported {} tracks to {}", store.len(), path.display()));
        }
        Command::Playlist {
            genre,
            artist,
            year,
            format,
        } => {
            let filter = TrackFilter {
                genre,
                artist,
                year,
            };
            let hits = select(&store, &filter);
            if hits.is_empty() {
                print_warning("No tracks match the given filters");
                return Ok(());
            }
            let (path, summary) = export_playlist(&hits, format, &config.export_dir, clock.now())?;
            print_success(&format!(
                "Playlist {}: {} tracks written",
                path.display(),
                summary.written
            ));
            if summary.skipped > 0 {
                print_warning(&format!("{} tracks skipped, file missing", summary.skipped));
            }
        }
        Command::Cleanup { dry_run } => {
            let mode = if dry_run {
                CleanupMode::DryRun
            } else {
                CleanupMode::Actual
            };
            let report = cleanup(&mut store, mode).context("Cleanup failed")?;
            print_section_header("Cleanup");
            print_key_value("Total tracks", &report.total.to_string());
            print_key_value("Missing files", &report.missing_files.to_string());
            print_key_value("Removed", &report.removed.to_string());
            for missing in &report.missing {
                print_list_item(&format!("{} ({})", missing.title, missing.file_path.display()));
            }
            print_section_footer();
        }
        Command::Report { output } => {
            let report = generate_report(&aggregate(&store), clock.now(), output.as_deref())?;
            println!("{}", report);
        }
        Command::Attach { id, path } => {
            let record = attach_file(&mut store, &id, &path)
                .with_context(|| format!("Failed to attach {:?} to {}", path, id))?;
            let expected = suggested_file_name(record);
            if path.file_name().and_then(|name| name.to_str()) != Some(expected.as_str()) {
                info!("Conventional file name for {} would be {}", id, expected);
            }
            store.save().context("Failed to save catalog")?;
            print_success(&format!("Attached {} to {}", path.display(), id));
        }
        Command::Show { id } => {
            let record = store
                .get(&id)
                .with_context(|| format!("No track with id {}", id))?;
            print_record(&id, record);
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig, clock: Arc<dyn Clock>) -> TrackStore {
    let (store, status) = TrackStore::open(&config.db_path, clock);
    if let LoadStatus::Recovered(err) = &status {
        warn!("Catalog at {:?} was unreadable: {}", config.db_path, err);
        print_warning(&format!(
            "Could not read {}, starting from an empty catalog",
            config.db_path.display()
        ));
    }
    store.with_defaults(config.defaults.clone())
}

fn print_hits(hits: &[TrackHit], limit: usize) {
    if hits.is_empty() {
        print_empty_list("No matching tracks");
        return;
    }
    let mut table = TableBuilder::new(&["ID", "Title", "Artists", "Genres", "Year"]);
    for hit in hits.iter().take(limit) {
        let record = hit.record;
        table.add_row([
            hit.id.to_string(),
            record.title.clone(),
            record.artists.join(", "),
            record.genres.join(", "),
            record.publish_year().unwrap_or("-").to_string(),
        ]);
    }
    table.print();
    if hits.len() > limit {
        print_empty_list(&format!("... and {} more", hits.len() - limit));
    }
}

fn print_stats(stats: &track_catalog::query::CatalogStats) {
    let Some(summary) = stats.summary() else {
        print_empty_list(track_catalog::maintenance::EMPTY_CATALOG_MESSAGE);
        return;
    };
    print_section_header("Catalog");
    print_key_value("Total tracks", &summary.total_tracks.to_string());
    print_key_value(
        "Total size",
        &format!("{:#}", byte_unit::Byte::from(summary.total_file_size_bytes)),
    );
    print_key_value("Average size", &format!("{} MB", summary.average_file_size_mb));
    print_key_value("Unique genres", &summary.genres.unique().to_string());
    print_key_value("Unique artists", &summary.artists.unique().to_string());
    print_key_value(
        "Most recent",
        &summary.most_recent.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    print_section_footer();

    print_section_header("Top genres");
    for (genre, count) in summary.genres.top(5) {
        print_list_item(&format!("{}: {}", genre, count));
    }
    print_section_footer();
}

fn print_record(id: &str, record: &TrackRecord) {
    print_section_header(id);
    print_key_value("Title", &record.title);
    print_key_value("Artists", &record.artists.join(", "));
    print_key_value("Genres", &record.genres.join(", "));
    print_key_value("Published", record.publish_date.as_deref().unwrap_or("-"));
    print_key_value("Source", &record.source_url);
    print_key_value("URL", record.resolved_url.as_deref().unwrap_or("-"));
    print_key_value("Credit", record.attribution_text.as_deref().unwrap_or("-"));
    print_key_value("File", &display_path(record.file_path.as_deref()));
    if let Some(size) = record.file_size {
        print_key_value("Size", &format!("{:#}", byte_unit::Byte::from(size)));
    }
    print_key_value("Added", &record.created_at.to_rfc3339());
    print_key_value("Updated", &record.updated_at.to_rfc3339());
    print_section_footer();
}

fn display_path(path: Option<&Path>) -> String {
    match path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (missing)", path.display()),
        None => "-".to_string(),
    }
}
