//! Read-only queries over a [`crate::catalog::TrackStore`]. All of them are
//! total: they work on the in-memory snapshot and cannot fail.

mod search;
mod stats;

pub use search::{
    all_tracks, by_artist, by_genre, by_year, search, select, SearchField, TrackFilter,
    TrackHit,
};
pub use stats::{aggregate, round_to, CatalogStats, CatalogSummary, FrequencyTable};
