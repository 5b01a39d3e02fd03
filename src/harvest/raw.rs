use serde::{Deserialize, Serialize};

/// Where on the source page a fragment was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentOrigin {
    /// Visible element text.
    Markup,
    /// An element attribute such as `datetime`.
    Attribute,
    /// A `<meta>` tag's `content`.
    Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub origin: FragmentOrigin,
    pub text: String,
}

impl Fragment {
    pub fn markup(text: impl Into<String>) -> Self {
        Self {
            origin: FragmentOrigin::Markup,
            text: text.into(),
        }
    }

    pub fn attribute(text: impl Into<String>) -> Self {
        Self {
            origin: FragmentOrigin::Attribute,
            text: text.into(),
        }
    }

    pub fn meta(text: impl Into<String>) -> Self {
        Self {
            origin: FragmentOrigin::Meta,
            text: text.into(),
        }
    }

    /// Trimmed text, `None` when blank.
    pub fn value(&self) -> Option<&str> {
        let text = self.text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Everything the harvesting side scraped for one page, unparsed.
///
/// Any field may be empty or hold garbage; nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub source_url: String,
    #[serde(default)]
    pub title: Vec<Fragment>,
    #[serde(default)]
    pub artists: Vec<Fragment>,
    #[serde(default)]
    pub genres: Vec<Fragment>,
    #[serde(default)]
    pub dates: Vec<Fragment>,
    /// Fragments from elements explicitly marked as credits.
    #[serde(default)]
    pub credits: Vec<Fragment>,
    /// Free paragraphs, scanned for credit markers when no explicit credit exists.
    #[serde(default)]
    pub paragraphs: Vec<String>,
    /// Candidate payload links, in page order.
    #[serde(default)]
    pub links: Vec<String>,
}

impl RawCandidate {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }
}

/// Fragments of `fragments` coming from `origin`, with their trimmed text.
pub(crate) fn values_from(fragments: &[Fragment], origin: FragmentOrigin) -> impl Iterator<Item = &str> {
    fragments
        .iter()
        .filter(move |fragment| fragment.origin == origin)
        .filter_map(Fragment::value)
}
