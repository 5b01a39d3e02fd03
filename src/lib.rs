//! Track catalog library
//!
//! Parses harvested page fragments into track records, keeps them in a JSON
//! store and answers queries, statistics and exports over it.

pub mod catalog;
pub mod cli_style;
pub mod config;
pub mod harvest;
pub mod ingest;
pub mod logging;
pub mod maintenance;
pub mod parsing;
pub mod query;

// Re-export commonly used types for convenience
pub use catalog::{StoreError, SystemClock, TrackRecord, TrackStore};
pub use harvest::{CandidateAssembler, RawCandidate};
pub use ingest::{ingest, IngestOutcome, IngestSummary};
