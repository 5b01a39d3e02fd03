//! Text heuristics turning raw page fragments into normalized fields.
//!
//! Every parser here is total: malformed input degrades to an empty result
//! (or `None`) instead of an error, so a harvested item is never rejected
//! because its metadata was incomplete.

mod artists;
mod dates;
mod genres;

pub use artists::{parse_artists, MAX_ARTISTS};
pub use dates::parse_date;
pub use genres::{parse_genres, parse_genres_with, KNOWN_GENRES, MAX_GENRES};
