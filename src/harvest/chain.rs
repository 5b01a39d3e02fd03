use super::raw::RawCandidate;
use tracing::debug;

/// One strategy for pulling a field out of a raw candidate.
///
/// Returning `None` (or an empty value) hands over to the next strategy in
/// the chain.
pub trait FieldExtractor<T>: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn extract(&self, raw: &RawCandidate) -> Option<T>;
}

/// Wraps a plain function as a [`FieldExtractor`].
pub struct FnExtractor<T> {
    name: &'static str,
    extract: fn(&RawCandidate) -> Option<T>,
}

impl<T> FnExtractor<T> {
    pub fn new(name: &'static str, extract: fn(&RawCandidate) -> Option<T>) -> Self {
        Self { name, extract }
    }
}

impl<T> FieldExtractor<T> for FnExtractor<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn extract(&self, raw: &RawCandidate) -> Option<T> {
        (self.extract)(raw)
    }
}

/// Values a chain treats as "nothing found".
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// Ordered strategies, tried until one yields a non-blank value.
pub struct ExtractorChain<T> {
    field: &'static str,
    extractors: Vec<Box<dyn FieldExtractor<T>>>,
}

impl<T: Blank> ExtractorChain<T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            extractors: Vec::new(),
        }
    }

    /// Appends a strategy with lower priority than the ones already added.
    pub fn then(mut self, extractor: impl FieldExtractor<T> + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    pub fn extract(&self, raw: &RawCandidate) -> Option<T> {
        for extractor in &self.extractors {
            match extractor.extract(raw) {
                Some(value) if !value.is_blank() => {
                    debug!("{}: matched by {}", self.field, extractor.name());
                    return Some(value);
                }
                _ => continue,
            }
        }
        None
    }
}
