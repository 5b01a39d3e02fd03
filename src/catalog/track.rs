use crate::parsing::{parse_date, MAX_GENRES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown";
pub const DEFAULT_GENRE: &str = "Electronic";

/// A catalog entry as persisted in the tracks database.
///
/// Field names on disk follow the historical layout (`url`, `original_url`,
/// `credit_info`, `download_timestamp`, `last_updated`).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TrackRecord {
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(rename = "url", default)]
    pub resolved_url: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(rename = "original_url", default)]
    pub source_url: String,
    #[serde(rename = "credit_info", default)]
    pub attribution_text: Option<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(rename = "download_timestamp", default, with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "last_updated", default, with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl TrackRecord {
    pub(crate) fn from_candidate(candidate: TrackCandidate, now: DateTime<Utc>) -> Self {
        Self {
            title: candidate.title,
            genres: candidate.genres,
            artists: candidate.artists,
            resolved_url: candidate.resolved_url,
            publish_date: candidate.publish_date,
            source_url: candidate.source_url,
            attribution_text: candidate.attribution_text,
            file_path: candidate.file_path,
            file_size: candidate.file_size,
            created_at: now,
            updated_at: now,
        }
    }

    /// `"Artist A, Artist B - Title"`, the line shown in playlists and listings.
    pub fn display_line(&self) -> String {
        let artists = if self.artists.is_empty() {
            UNKNOWN_ARTIST.to_string()
        } else {
            self.artists.join(", ")
        };
        format!("{} - {}", artists, self.title)
    }

    pub fn publish_year(&self) -> Option<&str> {
        self.publish_date.as_deref().and_then(|date| date.get(..4))
    }
}

/// A normalized record that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackCandidate {
    pub title: String,
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    pub source_url: String,
    pub resolved_url: Option<String>,
    pub publish_date: Option<String>,
    pub attribution_text: Option<String>,
    pub file_path: Option<PathBuf>,
    pub file_size: Option<u64>,
}

impl TrackCandidate {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artists: Vec::new(),
            genres: Vec::new(),
            source_url: source_url.into(),
            resolved_url: None,
            publish_date: None,
            attribution_text: None,
            file_path: None,
            file_size: None,
        }
    }

    pub fn with_artists<S: Into<String>>(mut self, artists: impl IntoIterator<Item = S>) -> Self {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genres<S: Into<String>>(mut self, genres: impl IntoIterator<Item = S>) -> Self {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resolved_url(mut self, url: impl Into<String>) -> Self {
        self.resolved_url = Some(url.into());
        self
    }

    pub fn with_publish_date(mut self, date: impl Into<String>) -> Self {
        self.publish_date = Some(date.into());
        self
    }

    pub fn with_attribution(mut self, text: impl Into<String>) -> Self {
        self.attribution_text = Some(text.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, size: u64) -> Self {
        self.file_path = Some(path.into());
        self.file_size = Some(size);
        self
    }
}

/// Fields to merge into an existing record. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackUpdate {
    pub title: Option<String>,
    pub artists: Option<Vec<String>>,
    pub genres: Option<Vec<String>>,
    pub resolved_url: Option<String>,
    pub publish_date: Option<String>,
    pub attribution_text: Option<String>,
    pub file_path: Option<PathBuf>,
    pub file_size: Option<u64>,
}

impl TrackUpdate {
    /// The update the materialization side sends once a payload is on disk.
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            file_path: Some(path.into()),
            file_size: Some(size),
            ..Default::default()
        }
    }

    /// Merges into `record`. Empty titles and empty artist/genre lists are
    /// ignored so the record invariants keep holding. A date that does not
    /// parse clears `publish_date`.
    pub(crate) fn apply_to(self, record: &mut TrackRecord) {
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            record.title = title.trim().to_string();
        }
        if let Some(artists) = self.artists.map(dedup).filter(|a| !a.is_empty()) {
            record.artists = artists;
        }
        if let Some(mut genres) = self.genres.map(dedup).filter(|g| !g.is_empty()) {
            genres.truncate(MAX_GENRES);
            record.genres = genres;
        }
        if let Some(url) = self.resolved_url {
            record.resolved_url = Some(url);
        }
        if let Some(date) = self.publish_date {
            record.publish_date = parse_date(&date);
        }
        if let Some(text) = self.attribution_text {
            record.attribution_text = Some(text);
        }
        if let Some(path) = self.file_path {
            record.file_path = Some(path);
        }
        if let Some(size) = self.file_size {
            record.file_size = Some(size);
        }
    }
}

/// Fallback values used whenever extraction or a caller leaves a required
/// field empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDefaults {
    pub unknown_title: String,
    pub unknown_artist: String,
    pub default_genre: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            unknown_title: UNKNOWN_TITLE.to_string(),
            unknown_artist: UNKNOWN_ARTIST.to_string(),
            default_genre: DEFAULT_GENRE.to_string(),
        }
    }
}

impl RecordDefaults {
    /// Enforces the record invariants on a candidate: non-empty title, at
    /// least one artist, one to [`MAX_GENRES`] genres, no duplicates, and a
    /// `YYYY-MM-DD` publish date or none.
    pub fn normalize(&self, mut candidate: TrackCandidate) -> TrackCandidate {
        candidate.title = candidate.title.trim().to_string();
        if candidate.title.is_empty() {
            candidate.title = self.unknown_title.clone();
        }

        candidate.artists = dedup(candidate.artists);
        if candidate.artists.is_empty() {
            candidate.artists = vec![self.unknown_artist.clone()];
        }

        candidate.genres = dedup(candidate.genres);
        candidate.genres.truncate(MAX_GENRES);
        if candidate.genres.is_empty() {
            candidate.genres = vec![self.default_genre.clone()];
        }

        candidate.publish_date = candidate.publish_date.as_deref().and_then(parse_date);
        candidate
    }
}

/// Trims, drops empty entries and removes duplicates keeping first occurrence.
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// RFC 3339 on write; on read also accepts the naive ISO timestamps older
/// tools wrote, taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| de::Error::custom(format!("invalid timestamp \"{}\"", raw)))
    }
}
