use lazy_static::lazy_static;
use regex::Regex;

/// Maximum number of artists kept from a single fragment.
pub const MAX_ARTISTS: usize = 5;

/// Applied in order; each separator splits every fragment produced so far.
const SEPARATORS: &[&str] = &[" feat. ", " ft. ", " & ", " and ", ",", " x ", " X "];

const STOP_WORDS: &[&str] = &["the", "a", "an"];

lazy_static! {
    static ref CREDIT_PREFIX: Regex =
        Regex::new(r"(?i)^\s*(?:by\s+|artist\s*:\s*|artist\s+)").expect("Invalid credit prefix regex");
}

/// Splits a credit line such as `"by Alan Walker feat. Noah Cyrus"` into
/// individual artist names.
///
/// Duplicates are dropped keeping the first occurrence, and anything past
/// [`MAX_ARTISTS`] is silently discarded.
pub fn parse_artists(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let stripped = CREDIT_PREFIX.replace(text, "");
    let mut fragments = vec![stripped.into_owned()];
    for separator in SEPARATORS {
        fragments = fragments
            .iter()
            .flat_map(|fragment| fragment.split(separator))
            .map(|fragment| fragment.trim().to_owned())
            .collect();
    }

    let mut artists: Vec<String> = Vec::new();
    for fragment in fragments {
        if !is_artist_name(&fragment) || artists.contains(&fragment) {
            continue;
        }
        artists.push(fragment);
        if artists.len() == MAX_ARTISTS {
            break;
        }
    }
    artists
}

fn is_artist_name(fragment: &str) -> bool {
    fragment.chars().count() > 1 && !STOP_WORDS.contains(&fragment.to_lowercase().as_str())
}
