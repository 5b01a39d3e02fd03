//! Turning scraped page fragments into catalog candidates.
//!
//! Each field is pulled by an [`ExtractorChain`]: ordered strategies, the
//! first non-empty result wins. Fields nothing could extract fall back to
//! defaults and are reported as [`DegradedField`]s.

mod assembler;
mod chain;
pub mod extractors;
mod raw;

pub use assembler::{
    AssembledCandidate, AssemblerSettings, CandidateAssembler, CandidateField, DegradedField,
    DEFAULT_CREDIT_MARKERS,
};
pub use chain::{Blank, ExtractorChain, FieldExtractor, FnExtractor};
pub use raw::{Fragment, FragmentOrigin, RawCandidate};
