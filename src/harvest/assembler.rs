use super::chain::{ExtractorChain, FnExtractor};
use super::extractors::{self, CreditMarkerScan, GenreTags};
use super::raw::RawCandidate;
use crate::catalog::{RecordDefaults, TrackCandidate};
use crate::parsing::KNOWN_GENRES;
use std::fmt;
use tracing::debug;

pub const DEFAULT_CREDIT_MARKERS: &[&str] = &["Music provided by"];

/// Candidate fields the assembler fills from a raw candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateField {
    Title,
    Artists,
    Genres,
    PublishDate,
    Attribution,
    ResolvedUrl,
}

impl fmt::Display for CandidateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateField::Title => "title",
            CandidateField::Artists => "artists",
            CandidateField::Genres => "genres",
            CandidateField::PublishDate => "publish_date",
            CandidateField::Attribution => "attribution",
            CandidateField::ResolvedUrl => "resolved_url",
        };
        write!(f, "{}", name)
    }
}

/// A field no strategy could extract. The candidate carries `fallback`
/// instead (or nothing, for nullable fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedField {
    pub field: CandidateField,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AssembledCandidate {
    pub candidate: TrackCandidate,
    pub degraded: Vec<DegradedField>,
}

impl AssembledCandidate {
    pub fn is_degraded(&self, field: CandidateField) -> bool {
        self.degraded.iter().any(|degraded| degraded.field == field)
    }
}

/// Knobs for the default extraction chains.
#[derive(Debug, Clone)]
pub struct AssemblerSettings {
    pub defaults: RecordDefaults,
    pub genre_vocabulary: Vec<String>,
    pub credit_markers: Vec<String>,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self {
            defaults: RecordDefaults::default(),
            genre_vocabulary: KNOWN_GENRES.iter().map(|genre| genre.to_string()).collect(),
            credit_markers: DEFAULT_CREDIT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }
}

/// Turns a [`RawCandidate`] into a normalized [`TrackCandidate`].
///
/// Never fails: every missing field falls back to a default and is reported
/// in [`AssembledCandidate::degraded`].
pub struct CandidateAssembler {
    title: ExtractorChain<String>,
    artists: ExtractorChain<Vec<String>>,
    genres: ExtractorChain<Vec<String>>,
    publish_date: ExtractorChain<String>,
    attribution: ExtractorChain<String>,
    resolved_url: ExtractorChain<String>,
    defaults: RecordDefaults,
}

impl CandidateAssembler {
    pub fn new(settings: AssemblerSettings) -> Self {
        Self {
            title: ExtractorChain::new("title")
                .then(FnExtractor::new("markup title", extractors::markup_title))
                .then(FnExtractor::new("meta title", extractors::meta_title)),
            artists: ExtractorChain::new("artists")
                .then(FnExtractor::new("meta author", extractors::meta_artists))
                .then(FnExtractor::new("markup credits", extractors::markup_artists)),
            genres: ExtractorChain::new("genres")
                .then(GenreTags::markup(settings.genre_vocabulary.clone()))
                .then(GenreTags::meta(settings.genre_vocabulary)),
            publish_date: ExtractorChain::new("publish_date")
                .then(FnExtractor::new("datetime attribute", extractors::attribute_date))
                .then(FnExtractor::new("markup date", extractors::markup_date))
                .then(FnExtractor::new("meta published time", extractors::meta_date)),
            attribution: ExtractorChain::new("attribution")
                .then(FnExtractor::new("credit element", extractors::explicit_credit))
                .then(CreditMarkerScan::new(settings.credit_markers)),
            resolved_url: ExtractorChain::new("resolved_url")
                .then(FnExtractor::new("mp3 link", extractors::mp3_link))
                .then(FnExtractor::new("download link", extractors::download_link)),
            defaults: settings.defaults,
        }
    }

    pub fn assemble(&self, raw: &RawCandidate) -> AssembledCandidate {
        let mut degraded: Vec<DegradedField> = Vec::new();
        let mut degrade = |field: CandidateField, fallback: Option<&str>| {
            debug!(
                "No {} found for {}, falling back to {:?}",
                field, raw.source_url, fallback
            );
            degraded.push(DegradedField {
                field,
                fallback: fallback.map(str::to_string),
            });
        };

        let title = self.title.extract(raw).unwrap_or_else(|| {
            degrade(CandidateField::Title, Some(self.defaults.unknown_title.as_str()));
            self.defaults.unknown_title.clone()
        });
        let artists = self.artists.extract(raw).unwrap_or_else(|| {
            degrade(CandidateField::Artists, Some(self.defaults.unknown_artist.as_str()));
            vec![self.defaults.unknown_artist.clone()]
        });
        let genres = self.genres.extract(raw).unwrap_or_else(|| {
            degrade(CandidateField::Genres, Some(self.defaults.default_genre.as_str()));
            vec![self.defaults.default_genre.clone()]
        });

        let publish_date = self.publish_date.extract(raw);
        if publish_date.is_none() {
            degrade(CandidateField::PublishDate, None);
        }
        let attribution_text = self.attribution.extract(raw);
        if attribution_text.is_none() {
            degrade(CandidateField::Attribution, None);
        }
        let resolved_url = self.resolved_url.extract(raw);
        if resolved_url.is_none() {
            degrade(CandidateField::ResolvedUrl, None);
        }

        let candidate = TrackCandidate {
            title,
            artists,
            genres,
            source_url: raw.source_url.trim().to_string(),
            resolved_url,
            publish_date,
            attribution_text,
            file_path: None,
            file_size: None,
        };

        AssembledCandidate {
            candidate: self.defaults.normalize(candidate),
            degraded,
        }
    }
}

impl Default for CandidateAssembler {
    fn default() -> Self {
        Self::new(AssemblerSettings::default())
    }
}
