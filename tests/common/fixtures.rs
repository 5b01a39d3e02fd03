//! Test fixture creation for catalogs on disk

#![allow(dead_code)]

use super::constants::*;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use track_catalog::catalog::{FixedClock, TrackCandidate, TrackStore};
use track_catalog::harvest::{Fragment, RawCandidate};

/// A catalog living in its own temporary directory, driven by a fixed clock.
pub struct TestCatalog {
    pub dir: TempDir,
    pub clock: Arc<FixedClock>,
}

impl TestCatalog {
    pub fn empty() -> Self {
        let now: DateTime<Utc> = FIXED_NOW.parse().unwrap();
        Self {
            dir: TempDir::new().unwrap(),
            clock: Arc::new(FixedClock::new(now)),
        }
    }

    /// Four tracks, one day apart:
    /// - Fade and Spectre have their media file on disk
    /// - Sky High has a file attached that has since been deleted
    /// - Walking on Clouds was never downloaded
    pub fn seeded() -> Self {
        let catalog = Self::empty();
        let mut store = catalog.store();

        let fade = catalog.write_media("fade.mp3");
        store.create(
            TrackCandidate::new(FADE_TITLE, FADE_URL)
                .with_artists(["Alan Walker"])
                .with_genres(["Progressive House"])
                .with_publish_date("2014-11-19")
                .with_resolved_url("https://cdn.example.com/fade.mp3")
                .with_file(&fade, MEDIA_SIZE as u64),
        );
        catalog.clock.advance(Duration::days(1));

        let spectre = catalog.write_media("spectre.mp3");
        store.create(
            TrackCandidate::new(SPECTRE_TITLE, SPECTRE_URL)
                .with_artists(["Alan Walker"])
                .with_genres(["Electro House"])
                .with_publish_date("2015-02-10")
                .with_file(&spectre, MEDIA_SIZE as u64),
        );
        catalog.clock.advance(Duration::days(1));

        let sky_high = catalog.write_media("sky_high.mp3");
        store.create(
            TrackCandidate::new(SKY_HIGH_TITLE, SKY_HIGH_URL)
                .with_artists(["Elektronomia"])
                .with_genres(["Electronic"])
                .with_publish_date("2015-06-01")
                .with_file(&sky_high, MEDIA_SIZE as u64),
        );
        fs::remove_file(&sky_high).unwrap();
        catalog.clock.advance(Duration::days(1));

        store.create(
            TrackCandidate::new(CLOUDS_TITLE, CLOUDS_URL)
                .with_artists(["Tobu"])
                .with_genres(["Electronic"]),
        );

        store.save().unwrap();
        catalog
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("tracks_database.json")
    }

    pub fn media_dir(&self) -> PathBuf {
        self.dir.path().join("media")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.dir.path().join("exports")
    }

    /// Opens the on-disk catalog, loading whatever is there.
    pub fn store(&self) -> TrackStore {
        let (store, _) = TrackStore::open(self.db_path(), self.clock.clone());
        store
    }

    pub fn write_media(&self, name: &str) -> PathBuf {
        fs::create_dir_all(self.media_dir()).unwrap();
        let path = self.media_dir().join(name);
        fs::write(&path, vec![0u8; MEDIA_SIZE]).unwrap();
        path
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}

/// A harvested page with everything the assembler looks for.
pub fn raw_candidate(title: &str, source_url: &str) -> RawCandidate {
    RawCandidate {
        source_url: source_url.to_string(),
        title: vec![Fragment::markup(format!("{} [NCS Release]", title))],
        artists: vec![Fragment::markup("Alan Walker & Tobu")],
        genres: vec![Fragment::markup("Genre: Progressive House")],
        dates: vec![Fragment::attribute("2014-11-19T15:00:00+00:00")],
        credits: vec![Fragment::markup("Music provided by NoCopyrightSounds")],
        paragraphs: vec![],
        links: vec![format!("{}/download.mp3", source_url)],
    }
}
