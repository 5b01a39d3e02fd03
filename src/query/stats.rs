use crate::catalog::{TrackRecord, TrackStore};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Occurrence counts, most frequent first. Ties keep the order in which the
/// names were first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub counts: Vec<(String, usize)>,
}

impl FrequencyTable {
    fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();
        for value in values {
            match positions.get(value) {
                Some(&position) => counts[position].1 += 1,
                None => {
                    positions.insert(value, counts.len());
                    counts.push((value.to_string(), 1));
                }
            }
        }
        // Stable, so equal counts stay in first-seen order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Self { counts }
    }

    pub fn unique(&self) -> usize {
        self.counts.len()
    }

    pub fn top(&self, n: usize) -> &[(String, usize)] {
        &self.counts[..n.min(self.counts.len())]
    }

    pub fn count_of(&self, name: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, count)| *count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub total_tracks: usize,
    pub total_file_size_bytes: u64,
    pub total_file_size_mb: f64,
    pub total_file_size_gb: f64,
    pub average_file_size_mb: f64,
    pub genres: FrequencyTable,
    pub artists: FrequencyTable,
    pub years: FrequencyTable,
    /// Records created per calendar day (UTC), oldest first.
    pub timeline: BTreeMap<NaiveDate, usize>,
    pub most_recent: DateTime<Utc>,
}

/// Result of [`aggregate`]. An empty store has no meaningful averages, so it
/// gets its own variant instead of zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CatalogStats {
    Empty,
    Summary(CatalogSummary),
}

impl CatalogStats {
    pub fn summary(&self) -> Option<&CatalogSummary> {
        match self {
            CatalogStats::Empty => None,
            CatalogStats::Summary(summary) => Some(summary),
        }
    }
}

/// Descriptive statistics over the whole store.
pub fn aggregate(store: &TrackStore) -> CatalogStats {
    let records: Vec<&TrackRecord> = store.iter().map(|(_, record)| record).collect();
    let most_recent = match records.iter().map(|record| record.created_at).max() {
        Some(most_recent) => most_recent,
        None => return CatalogStats::Empty,
    };

    let total_tracks = records.len();
    let total_bytes: u64 = records.iter().map(|record| record.file_size.unwrap_or(0)).sum();
    let average_bytes = total_bytes as f64 / total_tracks as f64;

    let mut timeline: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in &records {
        *timeline.entry(record.created_at.date_naive()).or_insert(0) += 1;
    }

    CatalogStats::Summary(CatalogSummary {
        total_tracks,
        total_file_size_bytes: total_bytes,
        total_file_size_mb: round_to(total_bytes as f64 / BYTES_PER_MB, 2),
        total_file_size_gb: round_to(total_bytes as f64 / BYTES_PER_GB, 3),
        average_file_size_mb: round_to(average_bytes / BYTES_PER_MB, 2),
        genres: FrequencyTable::from_values(
            records
                .iter()
                .flat_map(|record| record.genres.iter().map(String::as_str)),
        ),
        artists: FrequencyTable::from_values(
            records
                .iter()
                .flat_map(|record| record.artists.iter().map(String::as_str)),
        ),
        years: FrequencyTable::from_values(records.iter().filter_map(|record| record.publish_year())),
        timeline,
        most_recent,
    })
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
