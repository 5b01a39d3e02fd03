//! On-disk layout of the tracks database: `{ "tracks": { <id>: <record> } }`.

use super::error::StoreError;
use super::track::TrackRecord;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Deserialize, Default)]
struct Dump {
    #[serde(default, deserialize_with = "ordered_tracks::deserialize")]
    tracks: Vec<(String, TrackRecord)>,
}

/// Borrowed counterpart of [`Dump`], used on save to avoid cloning records.
#[derive(Serialize)]
struct DumpRef<'a> {
    #[serde(serialize_with = "ordered_tracks::serialize_refs")]
    tracks: Vec<(&'a str, &'a TrackRecord)>,
}

/// Sibling that receives the previous save: `tracks_database.json` becomes
/// `tracks_database.backup.json`.
pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("backup.json")
}

/// Reads the dump at `path`. `Ok(None)` when the file does not exist.
pub fn read(path: &Path) -> Result<Option<Vec<(String, TrackRecord)>>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::io(path)(err)),
    };

    let dump: Dump = serde_json::from_str(&content).map_err(|err| StoreError::CorruptStore {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(Some(dump.tracks))
}

/// Writes `tracks` to `path`, copying any existing file to [`backup_path`]
/// first. The new content goes through a temp file in the same directory and
/// is renamed over `path`, so a database file exists at every point.
pub fn write_with_backup<'a>(
    path: &Path,
    tracks: impl IntoIterator<Item = (&'a str, &'a TrackRecord)>,
) -> Result<(), StoreError> {
    let dump = DumpRef {
        tracks: tracks.into_iter().collect(),
    };
    let content = to_pretty_json(&dump)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(StoreError::io(&dir))?;

    let mut temp = NamedTempFile::new_in(&dir).map_err(StoreError::io(&dir))?;
    temp.write_all(&content).map_err(StoreError::io(temp.path()))?;
    temp.as_file().sync_all().map_err(StoreError::io(temp.path()))?;

    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(StoreError::io(&backup))?;
    }

    temp.persist(path)
        .map_err(|err| StoreError::io(path)(err.error))?;
    Ok(())
}

/// Writes `tracks` in the on-disk layout to any writer.
pub fn write_to<'a, W: Write>(
    writer: W,
    tracks: impl IntoIterator<Item = (&'a str, &'a TrackRecord)>,
) -> Result<(), StoreError> {
    let dump = DumpRef {
        tracks: tracks.into_iter().collect(),
    };
    write_pretty(writer, &dump)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buffer = Vec::new();
    write_pretty(&mut buffer, value)?;
    Ok(buffer)
}

/// Four-space indented JSON, the layout older tools wrote.
fn write_pretty<W: Write, T: Serialize>(writer: W, value: &T) -> Result<(), StoreError> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

/// A JSON object whose key order is kept both ways.
mod ordered_tracks {
    use super::*;

    pub fn serialize_refs<S: Serializer>(
        tracks: &[(&str, &TrackRecord)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(tracks.len()))?;
        for (id, record) in tracks {
            map.serialize_entry(id, record)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, TrackRecord)>, D::Error> {
        deserializer.deserialize_map(TracksVisitor)
    }

    struct TracksVisitor;

    impl<'de> Visitor<'de> for TracksVisitor {
        type Value = Vec<(String, TrackRecord)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of track id to track record")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let capacity = access.size_hint().unwrap_or(0);
            let mut tracks: Vec<(String, TrackRecord)> = Vec::with_capacity(capacity);
            let mut positions: HashMap<String, usize> = HashMap::with_capacity(capacity);
            while let Some((id, record)) = access.next_entry::<String, TrackRecord>()? {
                // Later duplicates win, like a plain map would do.
                match positions.get(&id) {
                    Some(&index) => tracks[index].1 = record,
                    None => {
                        positions.insert(id.clone(), tracks.len());
                        tracks.push((id, record));
                    }
                }
            }
            Ok(tracks)
        }
    }
}
