//! Default extraction strategies, one per page source a field is known to
//! show up in.

use super::chain::FieldExtractor;
use super::raw::{values_from, FragmentOrigin, RawCandidate};
use crate::parsing::{parse_artists, parse_date, parse_genres_with, MAX_GENRES};
use lazy_static::lazy_static;
use regex::Regex;

/// Titles this short are navigation noise, not track names.
const MIN_TITLE_CHARS: usize = 4;

/// Markup text with more words than this is prose unless it says "by".
const MAX_ARTIST_WORDS: usize = 4;

lazy_static! {
    static ref BRACKETED: Regex = Regex::new(r"\[.*?\]").expect("Invalid bracket regex");
}

pub fn markup_title(raw: &RawCandidate) -> Option<String> {
    values_from(&raw.title, FragmentOrigin::Markup)
        .map(|text| BRACKETED.replace_all(text, "").trim().to_string())
        .find(|title| title.chars().count() >= MIN_TITLE_CHARS)
}

pub fn meta_title(raw: &RawCandidate) -> Option<String> {
    values_from(&raw.title, FragmentOrigin::Meta)
        .next()
        .map(str::to_string)
}

pub fn meta_artists(raw: &RawCandidate) -> Option<Vec<String>> {
    values_from(&raw.artists, FragmentOrigin::Meta)
        .map(parse_artists)
        .find(|artists| !artists.is_empty())
}

/// Accumulates every markup fragment that reads like a credit line.
pub fn markup_artists(raw: &RawCandidate) -> Option<Vec<String>> {
    let mut artists: Vec<String> = Vec::new();
    for text in values_from(&raw.artists, FragmentOrigin::Markup) {
        let looks_like_credit = text.to_lowercase().contains("by")
            || text.split_whitespace().count() <= MAX_ARTIST_WORDS;
        if !looks_like_credit {
            continue;
        }
        for artist in parse_artists(text) {
            if !artists.contains(&artist) {
                artists.push(artist);
            }
        }
    }
    Some(artists)
}

pub fn attribute_date(raw: &RawCandidate) -> Option<String> {
    first_date(raw, FragmentOrigin::Attribute)
}

pub fn markup_date(raw: &RawCandidate) -> Option<String> {
    first_date(raw, FragmentOrigin::Markup)
}

pub fn meta_date(raw: &RawCandidate) -> Option<String> {
    first_date(raw, FragmentOrigin::Meta)
}

fn first_date(raw: &RawCandidate, origin: FragmentOrigin) -> Option<String> {
    values_from(&raw.dates, origin).find_map(parse_date)
}

pub fn explicit_credit(raw: &RawCandidate) -> Option<String> {
    raw.credits
        .iter()
        .find_map(|fragment| fragment.value())
        .map(str::to_string)
}

pub fn mp3_link(raw: &RawCandidate) -> Option<String> {
    find_link(raw, |link| link.contains(".mp3"))
}

pub fn download_link(raw: &RawCandidate) -> Option<String> {
    find_link(raw, |link| link.to_lowercase().contains("download"))
}

fn find_link(raw: &RawCandidate, accept: impl Fn(&str) -> bool) -> Option<String> {
    raw.links
        .iter()
        .map(|link| link.trim())
        .find(|link| !link.is_empty() && accept(*link))
        .map(str::to_string)
}

/// Genres from one fragment origin, matched against a configurable
/// vocabulary.
pub struct GenreTags {
    name: &'static str,
    origin: FragmentOrigin,
    vocabulary: Vec<String>,
}

impl GenreTags {
    /// All markup fragments (genre, tag and category labels) accumulated.
    pub fn markup(vocabulary: Vec<String>) -> Self {
        Self {
            name: "markup genre tags",
            origin: FragmentOrigin::Markup,
            vocabulary,
        }
    }

    /// The page's meta keywords.
    pub fn meta(vocabulary: Vec<String>) -> Self {
        Self {
            name: "meta keywords",
            origin: FragmentOrigin::Meta,
            vocabulary,
        }
    }
}

impl FieldExtractor<Vec<String>> for GenreTags {
    fn name(&self) -> &str {
        self.name
    }

    fn extract(&self, raw: &RawCandidate) -> Option<Vec<String>> {
        let mut genres: Vec<String> = Vec::new();
        for text in values_from(&raw.genres, self.origin) {
            for genre in parse_genres_with(text, &self.vocabulary) {
                if !genres.contains(&genre) {
                    genres.push(genre);
                }
            }
        }
        genres.truncate(MAX_GENRES);
        Some(genres)
    }
}

/// First paragraph mentioning one of the credit markers.
pub struct CreditMarkerScan {
    markers: Vec<String>,
}

impl CreditMarkerScan {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }
}

impl FieldExtractor<String> for CreditMarkerScan {
    fn name(&self) -> &str {
        "credit marker scan"
    }

    fn extract(&self, raw: &RawCandidate) -> Option<String> {
        let markers: Vec<&str> = self
            .markers
            .iter()
            .map(|marker| marker.trim())
            .filter(|marker| !marker.is_empty())
            .collect();
        raw.paragraphs
            .iter()
            .map(|paragraph| paragraph.trim())
            .find(|paragraph| markers.iter().any(|marker| paragraph.contains(marker)))
            .map(str::to_string)
    }
}
