use super::clock::Clock;
use super::dump;
use super::error::StoreError;
use super::identity;
use super::track::{RecordDefaults, TrackCandidate, TrackRecord, TrackUpdate};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What [`TrackStore::load`] found on disk.
#[derive(Debug)]
pub enum LoadStatus {
    /// No database file yet, the store starts empty.
    Initialized,
    Loaded { tracks: usize },
    /// The file could not be read or parsed. The store starts empty and the
    /// file is left untouched until the next save backs it up.
    Recovered(StoreError),
}

/// Keyed collection of track records backed by a single JSON file.
///
/// Mutations take `&mut self` and reads take `&self`, so callers get the
/// single-writer guarantee from the borrow checker. Nothing is written to
/// disk until [`TrackStore::save`] is called.
pub struct TrackStore {
    path: PathBuf,
    ids: Vec<String>,
    tracks: HashMap<String, TrackRecord>,
    retired_ids: HashSet<String>,
    dirty: bool,
    clock: Arc<dyn Clock>,
    defaults: RecordDefaults,
}

impl TrackStore {
    /// An empty store for `path`. Does not touch the filesystem.
    pub fn new<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ids: Vec::new(),
            tracks: HashMap::new(),
            retired_ids: HashSet::new(),
            dirty: false,
            clock,
            defaults: RecordDefaults::default(),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> (Self, LoadStatus) {
        let mut store = Self::new(path, clock);
        let status = store.load();
        (store, status)
    }

    pub fn with_defaults(mut self, defaults: RecordDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replaces the in-memory content with what is on disk. Never fails: a
    /// missing file yields an empty store and a malformed one is logged and
    /// recovered as empty.
    pub fn load(&mut self) -> LoadStatus {
        self.ids.clear();
        self.tracks.clear();
        self.retired_ids.clear();
        self.dirty = false;

        match dump::read(&self.path) {
            Ok(None) => {
                info!("No catalog at {:?}, starting empty", self.path);
                LoadStatus::Initialized
            }
            Ok(Some(entries)) => {
                for (id, record) in entries {
                    self.insert(id, record);
                }
                info!("Loaded {} tracks from {:?}", self.ids.len(), self.path);
                LoadStatus::Loaded {
                    tracks: self.ids.len(),
                }
            }
            Err(err) => {
                error!("Failed to load catalog, starting empty: {}", err);
                LoadStatus::Recovered(err)
            }
        }
    }

    /// Inserts a new record and returns its id. Missing title, artists or
    /// genres are filled from the store's [`RecordDefaults`].
    ///
    /// Does not check identity; call [`TrackStore::exists`] first.
    pub fn create(&mut self, candidate: TrackCandidate) -> String {
        let candidate = self.defaults.normalize(candidate);
        let id = identity::generate_id(self, &candidate.title);
        let record = TrackRecord::from_candidate(candidate, self.clock.now());
        debug!("Created track {} ({})", id, record.display_line());
        self.insert(id.clone(), record);
        self.dirty = true;
        id
    }

    pub fn update(&mut self, id: &str, update: TrackUpdate) -> Result<&TrackRecord, StoreError> {
        let now = self.clock.now();
        let record = self
            .tracks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        update.apply_to(record);
        record.updated_at = now;
        self.dirty = true;
        debug!("Updated track {}", id);
        Ok(record)
    }

    /// Id of the stored record that is the same item as `candidate`.
    pub fn exists(&self, candidate: &TrackCandidate) -> Option<&str> {
        identity::find_existing(self, candidate)
    }

    /// Removes `id`, returning the record if it was present. Removing an
    /// absent id is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<TrackRecord> {
        let record = self.tracks.remove(id)?;
        self.ids.retain(|existing| existing != id);
        self.retired_ids.insert(id.to_string());
        self.dirty = true;
        debug!("Removed track {}", id);
        Some(record)
    }

    /// Writes the store to disk, keeping the previous file as the backup
    /// sibling.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let entries = self
            .ids
            .iter()
            .filter_map(|id| self.tracks.get(id).map(|record| (id.as_str(), record)));

        if let Err(err) = dump::write_with_backup(&self.path, entries) {
            error!("Failed to save catalog: {}", err);
            return Err(err);
        }

        self.dirty = false;
        info!("Saved {} tracks to {:?}", self.ids.len(), self.path);
        Ok(())
    }

    /// Writes the store in its on-disk layout to `writer`, for exports.
    pub fn write_json<W: std::io::Write>(&self, writer: W) -> Result<(), StoreError> {
        dump::write_to(writer, self.iter())
    }

    pub fn get(&self, id: &str) -> Option<&TrackRecord> {
        self.tracks.get(id)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackRecord)> {
        self.ids
            .iter()
            .filter_map(move |id| self.tracks.get(id).map(|record| (id.as_str(), record)))
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    /// True for live ids and ids removed during this session.
    pub(crate) fn is_id_taken(&self, id: &str) -> bool {
        self.tracks.contains_key(id) || self.retired_ids.contains(id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        dump::backup_path(&self.path)
    }

    fn insert(&mut self, id: String, record: TrackRecord) {
        if self.tracks.insert(id.clone(), record).is_some() {
            warn!("Duplicate track id {}, keeping the last one", id);
        } else {
            self.ids.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::clock::FixedClock;
    use chrono::{Duration, TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn fixture() -> (TempDir, Arc<FixedClock>, TrackStore) {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(FixedClock::new(start()));
        let store = TrackStore::new(dir.path().join("tracks_database.json"), clock.clone());
        (dir, clock, store)
    }

    fn fade() -> TrackCandidate {
        TrackCandidate::new("Fade", "https://example.com/fade")
            .with_artists(["Alan Walker"])
            .with_genres(["Progressive House"])
            .with_publish_date("2014-11-19")
    }

    #[test]
    fn open_missing_file_initializes() {
        let dir = TempDir::new().unwrap();
        let (store, status) = TrackStore::open(
            dir.path().join("missing.json"),
            Arc::new(FixedClock::new(start())),
        );
        assert!(matches!(status, LoadStatus::Initialized));
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn open_corrupt_file_recovers_and_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracks_database.json");
        fs::write(&path, "not json at all").unwrap();

        let (store, status) = TrackStore::open(&path, Arc::new(FixedClock::new(start())));
        assert!(matches!(
            status,
            LoadStatus::Recovered(StoreError::CorruptStore { .. })
        ));
        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json at all");
    }

    #[test]
    fn create_stamps_clock_time_and_marks_dirty() {
        let (_dir, _clock, mut store) = fixture();
        let id = store.create(fade());
        let record = store.get(&id).unwrap();
        assert_eq!(record.created_at, start());
        assert_eq!(record.updated_at, start());
        assert!(store.is_dirty());
        assert!(!store.path().exists());
    }

    #[test]
    fn create_fills_defaults() {
        let (_dir, _clock, store) = fixture();
        let mut store = store.with_defaults(RecordDefaults {
            default_genre: "Podcast".to_string(),
            ..Default::default()
        });
        let id = store.create(TrackCandidate::new("", "https://example.com/x"));
        let record = store.get(&id).unwrap();
        assert_eq!(id, "track_unknown_title");
        assert_eq!(record.artists, vec!["Unknown"]);
        assert_eq!(record.genres, vec!["Podcast"]);
    }

    #[test]
    fn update_refreshes_updated_at_only() {
        let (_dir, clock, mut store) = fixture();
        let id = store.create(fade());
        clock.advance(Duration::hours(2));

        let record = store
            .update(&id, TrackUpdate::file("/music/fade.mp3", 4_200_000))
            .unwrap();
        assert_eq!(record.created_at, start());
        assert_eq!(record.updated_at, start() + Duration::hours(2));
        assert_eq!(record.file_size, Some(4_200_000));
    }

    #[test]
    fn publish_dates_are_stored_as_iso() {
        let (_dir, _clock, mut store) = fixture();
        let id = store.create(
            TrackCandidate::new("Fade", "https://example.com/fade")
                .with_publish_date("15 October 2021"),
        );
        assert_eq!(store.get(&id).unwrap().publish_date.as_deref(), Some("2021-10-15"));
        assert_eq!(crate::query::by_year(&store, "2021").len(), 1);

        let update = TrackUpdate {
            publish_date: Some("03/04/2023".to_string()),
            ..Default::default()
        };
        let record = store.update(&id, update).unwrap();
        assert_eq!(record.publish_date.as_deref(), Some("2023-04-03"));

        let update = TrackUpdate {
            publish_date: Some("someday".to_string()),
            ..Default::default()
        };
        assert_eq!(store.update(&id, update).unwrap().publish_date, None);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let (_dir, _clock, mut store) = fixture();
        let err = store.update("track_nope", TrackUpdate::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "track_nope"));
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, _clock, mut store) = fixture();
        let id = store.create(fade());
        assert!(store.remove(&id).is_some());
        assert!(store.remove(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn exists_follows_identity() {
        let (_dir, _clock, mut store) = fixture();
        let id = store.create(fade());
        assert_eq!(
            store.exists(&TrackCandidate::new("fade", "https://example.com/fade")),
            Some(id.as_str())
        );
        assert_eq!(
            store.exists(&TrackCandidate::new("Fade", "https://example.com/other")),
            None
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, clock, mut store) = fixture();
        let first = store.create(fade());
        clock.advance(Duration::minutes(1));
        let second = store.create(
            TrackCandidate::new("Spectre", "https://example.com/spectre")
                .with_artists(["Alan Walker"])
                .with_resolved_url("https://cdn.example.com/spectre.mp3")
                .with_attribution("Music provided by NoCopyrightSounds")
                .with_file("/music/spectre.mp3", 1234),
        );
        store.save().unwrap();
        assert!(!store.is_dirty());

        let (reloaded, status) = TrackStore::open(store.path(), clock.clone());
        assert!(matches!(status, LoadStatus::Loaded { tracks: 2 }));
        assert_eq!(reloaded.ids(), &[first.clone(), second.clone()]);
        assert_eq!(reloaded.get(&first), store.get(&first));
        assert_eq!(reloaded.get(&second), store.get(&second));
    }

    #[test]
    fn second_save_writes_backup() {
        let (_dir, _clock, mut store) = fixture();
        store.create(fade());
        store.save().unwrap();
        assert!(!store.backup_path().exists());

        store.create(TrackCandidate::new("Spectre", "https://example.com/spectre"));
        store.save().unwrap();

        let (backup, _) = TrackStore::open(store.backup_path(), Arc::new(FixedClock::new(start())));
        assert_eq!(backup.len(), 1);
        assert_eq!(store.backup_path().file_name().unwrap(), "tracks_database.backup.json");
    }

    #[test]
    fn load_discards_unsaved_changes() {
        let (_dir, _clock, mut store) = fixture();
        store.create(fade());
        store.save().unwrap();
        store.create(TrackCandidate::new("Spectre", "https://example.com/spectre"));

        assert!(matches!(store.load(), LoadStatus::Loaded { tracks: 1 }));
        assert!(!store.is_dirty());
    }
}
