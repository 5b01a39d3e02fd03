use lazy_static::lazy_static;
use regex::Regex;

/// Maximum number of genres kept for a record.
pub const MAX_GENRES: usize = 3;

/// Default genre vocabulary, in precedence order.
pub const KNOWN_GENRES: &[&str] = &[
    "House",
    "Progressive House",
    "Deep House",
    "Tech House",
    "Dubstep",
    "Drum & Bass",
    "DnB",
    "Trap",
    "Future Bass",
    "Electro",
    "Electronic",
    "EDM",
    "Ambient",
    "Chill",
    "Synthwave",
    "Melodic Dubstep",
    "Hardstyle",
    "Trance",
];

lazy_static! {
    static ref TAG_SEPARATORS: Regex = Regex::new(r"[,;&|]").expect("Invalid tag separator regex");
}

/// Parses genres using [`KNOWN_GENRES`] as the vocabulary.
pub fn parse_genres(text: &str) -> Vec<String> {
    parse_genres_with(text, KNOWN_GENRES)
}

/// Parses genres from free text or a tag list.
///
/// Vocabulary matches always win over the tag splitter: the splitter only
/// runs when no vocabulary entry occurs in the text. A vocabulary entry that
/// only occurs inside a longer matched entry ("House" in "Progressive House")
/// is not reported on its own.
pub fn parse_genres_with<S: AsRef<str>>(text: &str, vocabulary: &[S]) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let matched = match_vocabulary(text, vocabulary);
    let genres = if matched.is_empty() {
        split_tags(text)
    } else {
        matched
    };

    genres.into_iter().take(MAX_GENRES).collect()
}

fn match_vocabulary<S: AsRef<str>>(text: &str, vocabulary: &[S]) -> Vec<String> {
    // Longest entries claim their text first so shorter entries nested in
    // them cannot match the same occurrence.
    let mut by_length: Vec<(usize, &str)> = vocabulary
        .iter()
        .map(AsRef::as_ref)
        .filter(|genre| !genre.trim().is_empty())
        .enumerate()
        .collect();
    by_length.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let mut remaining = text.to_lowercase();
    let mut hits: Vec<(usize, &str)> = Vec::new();
    for (position, genre) in by_length {
        let needle = genre.to_lowercase();
        if remaining.contains(&needle) {
            remaining = remaining.replace(&needle, "|");
            hits.push((position, genre));
        }
    }

    hits.sort_by_key(|(position, _)| *position);
    let mut genres: Vec<String> = Vec::new();
    for (_, genre) in hits {
        if !genres.iter().any(|g| g == genre) {
            genres.push(genre.to_owned());
        }
    }
    genres
}

fn split_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in TAG_SEPARATORS.split(text) {
        let tag = title_case(tag.trim());
        if tag.chars().count() > 2 && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Upper-cases the first letter of every word and lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
