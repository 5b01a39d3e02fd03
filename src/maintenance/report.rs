use crate::query::{CatalogStats, CatalogSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

const TOP_ENTRIES: usize = 10;
const TIMELINE_DAYS: usize = 10;

pub const EMPTY_CATALOG_MESSAGE: &str = "No tracks in database";

/// Plain-text report: overview, top genres and artists, years and the most
/// recent days of the creation timeline.
pub fn render_report(stats: &CatalogStats, generated_at: DateTime<Utc>) -> String {
    match stats {
        CatalogStats::Empty => EMPTY_CATALOG_MESSAGE.to_string(),
        CatalogStats::Summary(summary) => render_summary(summary, generated_at),
    }
}

fn render_summary(summary: &CatalogSummary, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Track Catalog Report");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));

    section(&mut out, "OVERVIEW");
    let _ = writeln!(out, "Total tracks: {}", summary.total_tracks);
    let _ = writeln!(
        out,
        "Total file size: {} GB ({} MB, {:#})",
        summary.total_file_size_gb,
        summary.total_file_size_mb,
        byte_unit::Byte::from(summary.total_file_size_bytes)
    );
    let _ = writeln!(out, "Average file size: {} MB", summary.average_file_size_mb);

    section(&mut out, "GENRES");
    let _ = writeln!(out, "Unique genres: {}", summary.genres.unique());
    counts(&mut out, summary.genres.top(TOP_ENTRIES));

    section(&mut out, "ARTISTS");
    let _ = writeln!(out, "Unique artists: {}", summary.artists.unique());
    counts(&mut out, summary.artists.top(TOP_ENTRIES));

    section(&mut out, "YEARS");
    counts(&mut out, &summary.years.counts);

    section(&mut out, "TIMELINE");
    let skip = summary.timeline.len().saturating_sub(TIMELINE_DAYS);
    for (day, count) in summary.timeline.iter().skip(skip) {
        let _ = writeln!(out, "  {}: {} tracks", day, count);
    }
    let _ = write!(
        out,
        "Most recent addition: {}",
        summary.most_recent.format("%Y-%m-%d %H:%M:%S")
    );
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(20));
}

fn counts(out: &mut String, entries: &[(String, usize)]) {
    for (name, count) in entries {
        let _ = writeln!(out, "  {}: {} tracks", name, count);
    }
}

/// Renders the report and, when `output` is given, writes it there too.
pub fn generate_report(
    stats: &CatalogStats,
    generated_at: DateTime<Utc>,
    output: Option<&Path>,
) -> Result<String> {
    let report = render_report(stats, generated_at);
    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        fs::write(path, &report).with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report saved to {:?}", path);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FixedClock, TrackCandidate, TrackStore};
    use crate::query::aggregate;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn empty_catalog_report() {
        assert_eq!(render_report(&CatalogStats::Empty, now()), EMPTY_CATALOG_MESSAGE);
    }

    #[test]
    fn report_lists_sections_and_recent_days() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
        let mut store = TrackStore::new("unused.json", clock.clone());
        for day in 0..12 {
            store.create(
                TrackCandidate::new(format!("Track {}", day), format!("u{}", day))
                    .with_artists(["Tobu"])
                    .with_genres(["Electronic"])
                    .with_publish_date("2016-01-01")
                    .with_file(format!("/m/{}.mp3", day), 1024 * 1024),
            );
            clock.advance(Duration::days(1));
        }

        let report = render_report(&aggregate(&store), now());
        assert!(report.starts_with("Track Catalog Report\n"));
        assert!(report.contains("Generated: 2024-02-01 10:00:00"));
        assert!(report.contains("Total tracks: 12"));
        assert!(report.contains("Average file size: 1 MB"));
        assert!(report.contains("  Tobu: 12 tracks"));
        assert!(report.contains("  2016: 12 tracks"));
        assert!(!report.contains("2024-01-02: 1 tracks"));
        assert!(report.contains("2024-01-03: 1 tracks"));
        assert!(report.contains("2024-01-12: 1 tracks"));
        assert!(report.ends_with("Most recent addition: 2024-01-12 12:00:00"));
    }

    #[test]
    fn report_is_written_when_requested() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("reports").join("report.txt");
        let report = generate_report(&CatalogStats::Empty, now(), Some(&output)).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), report);
    }
}
