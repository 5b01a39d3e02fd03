use crate::catalog::{TrackRecord, TrackStore};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which record fields a search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    /// Title, artists or genres: any of them matching is enough.
    #[default]
    All,
    Title,
    Artist,
    Genre,
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SearchField::All),
            "title" => Ok(SearchField::Title),
            "artist" | "artists" => Ok(SearchField::Artist),
            "genre" | "genres" => Ok(SearchField::Genre),
            other => Err(format!("Unknown search field: {}", other)),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchField::All => "all",
            SearchField::Title => "title",
            SearchField::Artist => "artist",
            SearchField::Genre => "genre",
        };
        write!(f, "{}", name)
    }
}

/// A record together with its id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackHit<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub record: &'a TrackRecord,
}

/// Case-insensitive substring search, results in store order.
pub fn search<'a>(store: &'a TrackStore, query: &str, field: SearchField) -> Vec<TrackHit<'a>> {
    let needle = query.to_lowercase();
    filter(store, |record| matches_field(record, &needle, field))
}

/// Records whose `publish_date` starts with `year`. Undated records never match.
pub fn by_year<'a>(store: &'a TrackStore, year: &str) -> Vec<TrackHit<'a>> {
    let year = year.trim();
    filter(store, |record| record.publish_year() == Some(year))
}

pub fn by_genre<'a>(store: &'a TrackStore, genre: &str) -> Vec<TrackHit<'a>> {
    search(store, genre, SearchField::Genre)
}

pub fn by_artist<'a>(store: &'a TrackStore, artist: &str) -> Vec<TrackHit<'a>> {
    search(store, artist, SearchField::Artist)
}

pub fn all_tracks(store: &TrackStore) -> Vec<TrackHit<'_>> {
    filter(store, |_| true)
}

/// Conjunction of optional criteria; an empty filter selects every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackFilter {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub year: Option<String>,
}

impl TrackFilter {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.artist.is_none() && self.year.is_none()
    }

    fn matches(&self, record: &TrackRecord) -> bool {
        let genre = self.genre.as_ref().map_or(true, |genre| {
            matches_field(record, &genre.to_lowercase(), SearchField::Genre)
        });
        let artist = self.artist.as_ref().map_or(true, |artist| {
            matches_field(record, &artist.to_lowercase(), SearchField::Artist)
        });
        let year = self
            .year
            .as_ref()
            .map_or(true, |year| record.publish_year() == Some(year.trim()));
        genre && artist && year
    }
}

pub fn select<'a>(store: &'a TrackStore, criteria: &TrackFilter) -> Vec<TrackHit<'a>> {
    filter(store, |record| criteria.matches(record))
}

fn filter<'a>(store: &'a TrackStore, predicate: impl Fn(&TrackRecord) -> bool) -> Vec<TrackHit<'a>> {
    store
        .iter()
        .filter(|(_, record)| predicate(*record))
        .map(|(id, record)| TrackHit { id, record })
        .collect()
}

fn matches_field(record: &TrackRecord, needle: &str, field: SearchField) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);
    match field {
        SearchField::Title => contains(record.title.as_str()),
        SearchField::Artist => record.artists.iter().any(|artist| contains(artist.as_str())),
        SearchField::Genre => record.genres.iter().any(|genre| contains(genre.as_str())),
        SearchField::All => {
            matches_field(record, needle, SearchField::Title)
                || matches_field(record, needle, SearchField::Artist)
                || matches_field(record, needle, SearchField::Genre)
        }
    }
}
