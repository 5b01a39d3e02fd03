//! Recording downloaded payloads against their records.

use crate::catalog::{StoreError, TrackRecord, TrackStore, TrackUpdate, UNKNOWN_ARTIST};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const MAX_FILE_NAME_CHARS: usize = 200;
const FILE_NAME_ARTISTS: usize = 2;
const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

lazy_static! {
    static ref SEPARATOR_RUN: Regex = Regex::new(r"[_\s]+").expect("Invalid separator regex");
}

#[derive(Debug, Error)]
pub enum AttachError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {0:?}")]
    NotAFile(PathBuf),

    #[error("File is empty: {0:?}")]
    EmptyFile(PathBuf),
}

/// Stats the payload at `path` and records its location and size on `id`.
///
/// The store is left dirty; saving is up to the caller.
pub fn attach_file<'a>(
    store: &'a mut TrackStore,
    id: &str,
    path: &Path,
) -> Result<&'a TrackRecord, AttachError> {
    if !store.contains_id(id) {
        return Err(StoreError::NotFound(id.to_string()).into());
    }

    let metadata = fs::metadata(path).map_err(|source| AttachError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(AttachError::NotAFile(path.to_path_buf()));
    }
    if metadata.len() == 0 {
        return Err(AttachError::EmptyFile(path.to_path_buf()));
    }

    info!("Attaching {:?} ({} bytes) to {}", path, metadata.len(), id);
    Ok(store.update(id, TrackUpdate::file(path, metadata.len()))?)
}

/// `"<artist>_<artist> - <title>.mp3"` made safe for any filesystem: reserved
/// characters become `_`, whitespace and `_` runs collapse to one `_`, and
/// the name is capped at 200 characters keeping the extension.
pub fn suggested_file_name(record: &TrackRecord) -> String {
    let artists = if record.artists.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        record
            .artists
            .iter()
            .take(FILE_NAME_ARTISTS)
            .cloned()
            .collect::<Vec<_>>()
            .join("_")
    };
    sanitize_file_name(&format!("{} - {}.mp3", artists, record.title))
}

pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if INVALID_FILE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let collapsed = SEPARATOR_RUN.replace_all(&replaced, "_").into_owned();

    if collapsed.chars().count() <= MAX_FILE_NAME_CHARS {
        return collapsed;
    }
    let (stem, extension) = match collapsed.rfind('.') {
        Some(dot) if dot > 0 => collapsed.split_at(dot),
        _ => (collapsed.as_str(), ""),
    };
    let keep = MAX_FILE_NAME_CHARS.saturating_sub(extension.chars().count());
    let mut truncated: String = stem.chars().take(keep).collect();
    truncated.push_str(extension);
    truncated
}
