//! The track catalog: records, identity and the persistent store.

mod clock;
mod dump;
mod error;
pub mod identity;
mod store;
mod track;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::StoreError;
pub use store::{LoadStatus, TrackStore};
pub use track::{
    RecordDefaults, TrackCandidate, TrackRecord, TrackUpdate, DEFAULT_GENRE, UNKNOWN_ARTIST,
    UNKNOWN_TITLE,
};
