//! Record identity: how ids are derived and when two records are the same item.
//!
//! Ids come from the title alone while identity is title plus source URL, so
//! two distinct items sharing a title get `track_x` and `track_x_1`, and which
//! one gets the bare id depends on insertion order.

use super::store::TrackStore;
use super::track::{TrackCandidate, TrackRecord};
use lazy_static::lazy_static;
use regex::Regex;

pub const ID_PREFIX: &str = "track_";

const EMPTY_SLUG: &str = "untitled";

lazy_static! {
    static ref NON_ALPHANUMERIC_RUN: Regex =
        Regex::new(r"[^a-z0-9]+").expect("Invalid slug regex");
}

/// Lower-cases `title`, turns every run of characters outside `[a-z0-9]`
/// into one `_` and trims `_` from both ends.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_ALPHANUMERIC_RUN.replace_all(&lowered, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// First free id among `track_<slug>`, `track_<slug>_1`, `track_<slug>_2`...
///
/// Ids removed earlier in this session count as taken, so a removed id is
/// never handed to a different record.
pub fn generate_id(store: &TrackStore, title: &str) -> String {
    let base = format!("{}{}", ID_PREFIX, slugify(title));
    if !store.is_id_taken(&base) {
        return base;
    }
    let mut counter = 1;
    loop {
        let id = format!("{}_{}", base, counter);
        if !store.is_id_taken(&id) {
            return id;
        }
        counter += 1;
    }
}

/// Same item iff titles are equal ignoring case and source URLs are equal.
pub fn is_same_item(record: &TrackRecord, title: &str, source_url: &str) -> bool {
    record.source_url == source_url && casefold(&record.title) == casefold(title)
}

/// Id of the stored record that is the same item as `candidate`, if any.
pub fn find_existing<'a>(store: &'a TrackStore, candidate: &TrackCandidate) -> Option<&'a str> {
    store
        .iter()
        .find(|(_, record)| is_same_item(record, &candidate.title, &candidate.source_url))
        .map(|(id, _)| id)
}

fn casefold(title: &str) -> String {
    title.trim().to_lowercase()
}
