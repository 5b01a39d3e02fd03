//! Playlist and catalog exports.

use crate::catalog::{TrackRecord, TrackStore};
use crate::query::{round_to, TrackHit};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

const CSV_HEADER: [&str; 8] = [
    "Track ID",
    "Title",
    "Artists",
    "Genres",
    "URL",
    "Publish Date",
    "File Path",
    "File Size (MB)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    M3u,
    Json,
}

impl PlaylistFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PlaylistFormat::M3u => "m3u",
            PlaylistFormat::Json => "json",
        }
    }
}

impl FromStr for PlaylistFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m3u" | "m3u8" => Ok(PlaylistFormat::M3u),
            "json" => Ok(PlaylistFormat::Json),
            other => Err(format!("Unknown playlist format: {}", other)),
        }
    }
}

impl fmt::Display for PlaylistFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// The full database in its on-disk layout.
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Counts for one playlist write. Entries without a file on disk are
/// skipped but still part of `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
struct JsonPlaylist<'a> {
    name: String,
    created: String,
    tracks: Vec<TrackHit<'a>>,
}

/// `<prefix>_<YYYYmmdd_HHMMSS>.<extension>`
pub fn timestamped_file_name(prefix: &str, now: DateTime<Utc>, extension: &str) -> String {
    format!("{}_{}.{}", prefix, now.format("%Y%m%d_%H%M%S"), extension)
}

fn playable_file(record: &TrackRecord) -> Option<&Path> {
    record
        .file_path
        .as_deref()
        .filter(|path| path.exists())
}

/// Extended M3U: `#EXTINF:-1,<artists> - <title>` followed by the file path.
pub fn write_m3u<W: Write>(hits: &[TrackHit], mut out: W) -> std::io::Result<PlaylistSummary> {
    let mut summary = PlaylistSummary {
        total: hits.len(),
        ..Default::default()
    };

    writeln!(out, "#EXTM3U")?;
    for hit in hits {
        match playable_file(hit.record) {
            Some(path) => {
                writeln!(out, "#EXTINF:-1,{}", hit.record.display_line())?;
                writeln!(out, "{}", path.display())?;
                summary.written += 1;
            }
            None => summary.skipped += 1,
        }
    }
    out.flush()?;
    Ok(summary)
}

pub fn write_json_playlist<W: Write>(
    hits: &[TrackHit],
    name: &str,
    created: DateTime<Utc>,
    out: W,
) -> serde_json::Result<PlaylistSummary> {
    let playable: Vec<TrackHit> = hits
        .iter()
        .filter(|hit| playable_file(hit.record).is_some())
        .copied()
        .collect();
    let summary = PlaylistSummary {
        total: hits.len(),
        written: playable.len(),
        skipped: hits.len() - playable.len(),
    };

    let playlist = JsonPlaylist {
        name: name.to_string(),
        created: created.to_rfc3339_opts(SecondsFormat::Secs, true),
        tracks: playable,
    };
    serde_json::to_writer_pretty(out, &playlist)?;
    Ok(summary)
}

/// One row per hit. Multi-value fields are joined with `"; "`; the URL column
/// falls back to the source URL when no payload link was resolved.
pub fn write_csv<W: Write>(hits: &[TrackHit], out: W) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for hit in hits {
        let record = hit.record;
        let size_mb = round_to(record.file_size.unwrap_or(0) as f64 / (1024.0 * 1024.0), 2);
        writer.write_record([
            hit.id.to_string(),
            record.title.clone(),
            record.artists.join("; "),
            record.genres.join("; "),
            record
                .resolved_url
                .clone()
                .unwrap_or_else(|| record.source_url.clone()),
            record.publish_date.clone().unwrap_or_default(),
            record
                .file_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            size_mb.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(hits.len())
}

fn create_file(dir: &Path, file_name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let path = dir.join(file_name);
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    Ok((path, BufWriter::new(file)))
}

/// Writes a timestamped playlist file into `dir`.
pub fn export_playlist(
    hits: &[TrackHit],
    format: PlaylistFormat,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<(PathBuf, PlaylistSummary)> {
    let file_name = timestamped_file_name("playlist", now, format.extension());
    let (path, mut out) = create_file(dir, &file_name)?;

    let summary = match format {
        PlaylistFormat::M3u => write_m3u(hits, &mut out)?,
        PlaylistFormat::Json => {
            let name = format!("Playlist {}", now.format("%Y%m%d_%H%M%S"));
            write_json_playlist(hits, &name, now, &mut out)?
        }
    };
    out.flush()
        .with_context(|| format!("Failed to write {:?}", path))?;

    info!(
        "Wrote playlist {:?}: {} written, {} skipped",
        path, summary.written, summary.skipped
    );
    Ok((path, summary))
}

/// Writes a timestamped export of the whole store into `dir`.
pub fn export_catalog(
    store: &TrackStore,
    format: ExportFormat,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let file_name = timestamped_file_name("catalog_export", now, format.extension());
    let (path, mut out) = create_file(dir, &file_name)?;

    match format {
        ExportFormat::Json => store.write_json(&mut out)?,
        ExportFormat::Csv => {
            let hits = crate::query::all_tracks(store);
            write_csv(&hits, &mut out)?;
        }
    }
    out.flush()
        .with_context(|| format!("Failed to write {:?}", path))?;

    info!("Exported {} tracks to {:?}", store.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FixedClock, TrackCandidate};
    use crate::query::all_tracks;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 14, 18, 5, 9).unwrap()
    }

    fn store(dir: &TempDir) -> TrackStore {
        let mut store = TrackStore::new(
            dir.path().join("tracks_database.json"),
            Arc::new(FixedClock::new(now())),
        );
        let fade = dir.path().join("fade.mp3");
        fs::write(&fade, b"ID3").unwrap();
        store.create(
            TrackCandidate::new("Fade", "https://example.com/fade")
                .with_artists(["Alan Walker"])
                .with_genres(["Progressive House", "EDM"])
                .with_publish_date("2014-11-19")
                .with_file(&fade, 3 * 1024 * 1024),
        );
        store.create(
            TrackCandidate::new("Spectre", "https://example.com/spectre")
                .with_artists(["Alan Walker", "K-391"])
                .with_resolved_url("https://cdn.example.com/spectre.mp3")
                .with_file(dir.path().join("missing.mp3"), 10),
        );
        store.create(TrackCandidate::new("Blank", "https://example.com/blank"));
        store
    }

    #[test]
    fn file_names_are_timestamped() {
        assert_eq!(
            timestamped_file_name("playlist", now(), "m3u"),
            "playlist_20240714_180509.m3u"
        );
    }

    #[test]
    fn m3u_skips_missing_files_but_counts_them() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut out = Vec::new();

        let summary = write_m3u(&all_tracks(&store), &mut out).unwrap();
        assert_eq!(
            summary,
            PlaylistSummary {
                total: 3,
                written: 1,
                skipped: 2,
            }
        );

        let text = String::from_utf8(out).unwrap();
        let expected = format!(
            "#EXTM3U\n#EXTINF:-1,Alan Walker - Fade\n{}\n",
            dir.path().join("fade.mp3").display()
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn json_playlist_lists_playable_tracks() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut out = Vec::new();

        let summary =
            write_json_playlist(&all_tracks(&store), "Playlist test", now(), &mut out).unwrap();
        assert_eq!(summary.skipped, 2);

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["name"], "Playlist test");
        assert_eq!(value["created"], "2024-07-14T18:05:09Z");
        assert_eq!(value["tracks"].as_array().unwrap().len(), 1);
        assert_eq!(value["tracks"][0]["id"], "track_fade");
    }

    #[test]
    fn csv_has_one_row_per_record() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut out = Vec::new();

        assert_eq!(write_csv(&all_tracks(&store), &mut out).unwrap(), 3);

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][3], "Progressive House; EDM");
        assert_eq!(&rows[0][4], "https://example.com/fade");
        assert_eq!(&rows[0][7], "3");
        assert_eq!(&rows[1][2], "Alan Walker; K-391");
        assert_eq!(&rows[1][4], "https://cdn.example.com/spectre.mp3");
        assert_eq!(&rows[2][5], "");
    }

    #[test]
    fn export_files_land_in_dir() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let out_dir = dir.path().join("exports");

        let json = export_catalog(&store, ExportFormat::Json, &out_dir, now()).unwrap();
        assert_eq!(
            json.file_name().unwrap(),
            "catalog_export_20240714_180509.json"
        );
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["tracks"].as_object().unwrap().len(), 3);

        let (m3u, summary) =
            export_playlist(&all_tracks(&store), PlaylistFormat::M3u, &out_dir, now()).unwrap();
        assert!(m3u.exists());
        assert_eq!(summary.written, 1);
    }

    #[test]
    fn formats_parse() {
        assert_eq!("M3U".parse::<PlaylistFormat>(), Ok(PlaylistFormat::M3u));
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
