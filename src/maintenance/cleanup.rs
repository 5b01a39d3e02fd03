//! Orphan cleanup.
//!
//! Drops records whose attached file no longer exists on disk. Records that
//! never had a file attached are left alone.

use crate::catalog::{StoreError, TrackStore};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    /// Report what would be removed without touching the store.
    DryRun,
    Actual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingFile {
    pub id: String,
    pub title: String,
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub total: usize,
    pub missing_files: usize,
    pub removed: usize,
    pub missing: Vec<MissingFile>,
}

/// Scans every record with a `file_path` and, in [`CleanupMode::Actual`],
/// removes the ones whose file is gone. The store is saved only when at
/// least one record was removed.
pub fn cleanup(store: &mut TrackStore, mode: CleanupMode) -> Result<CleanupReport, StoreError> {
    let mut report = CleanupReport {
        total: store.len(),
        ..Default::default()
    };

    for (id, record) in store.iter() {
        let Some(path) = record.file_path.as_ref() else {
            continue;
        };
        if path.exists() {
            continue;
        }
        debug!("File for {} is missing: {:?}", id, path);
        report.missing.push(MissingFile {
            id: id.to_string(),
            title: record.title.clone(),
            file_path: path.clone(),
        });
    }
    report.missing_files = report.missing.len();

    if mode == CleanupMode::DryRun {
        info!(
            "Dry run: {} of {} tracks have missing files",
            report.missing_files, report.total
        );
        return Ok(report);
    }

    for missing in &report.missing {
        if store.remove(&missing.id).is_some() {
            report.removed += 1;
        }
    }

    if report.removed > 0 {
        store.save()?;
        warn!("Removed {} tracks with missing files", report.removed);
    } else {
        info!("All {} tracks have their files", report.total);
    }
    Ok(report)
}
