//! Feeding harvested candidates into the store.

use crate::catalog::TrackStore;
use crate::harvest::{CandidateAssembler, DegradedField, RawCandidate};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The store already holds this item; nothing was written.
    Existing { id: String },
    Created {
        id: String,
        degraded: Vec<DegradedField>,
    },
}

impl IngestOutcome {
    pub fn id(&self) -> &str {
        match self {
            IngestOutcome::Existing { id } => id,
            IngestOutcome::Created { id, .. } => id,
        }
    }
}

/// Assembles `raw`, resolves its identity and creates a record when it is new.
///
/// The store is left dirty; saving is up to the caller.
pub fn ingest(
    store: &mut TrackStore,
    assembler: &CandidateAssembler,
    raw: &RawCandidate,
) -> IngestOutcome {
    let assembled = assembler.assemble(raw);

    if let Some(id) = store.exists(&assembled.candidate) {
        debug!("Skipping {}, already stored as {}", raw.source_url, id);
        return IngestOutcome::Existing { id: id.to_string() };
    }

    let title = assembled.candidate.title.clone();
    let id = store.create(assembled.candidate);
    info!("Added \"{}\" as {}", title, id);
    IngestOutcome::Created {
        id,
        degraded: assembled.degraded,
    }
}

/// Running totals for a batch of ingested candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub processed: usize,
    pub created: usize,
    pub existing: usize,
    /// Created records that needed at least one fallback value.
    pub degraded: usize,
    /// Input lines that could not be decoded at all.
    pub rejected: usize,
}

impl IngestSummary {
    pub fn record(&mut self, outcome: &IngestOutcome) {
        self.processed += 1;
        match outcome {
            IngestOutcome::Existing { .. } => self.existing += 1,
            IngestOutcome::Created { degraded, .. } => {
                self.created += 1;
                if !degraded.is_empty() {
                    self.degraded += 1;
                }
            }
        }
    }

    pub fn record_rejected(&mut self) {
        self.processed += 1;
        self.rejected += 1;
    }
}
