//! Write-side upkeep of the catalog: orphan cleanup, file attachment,
//! playlists, exports and the text report.

mod attach;
mod cleanup;
mod export;
mod report;

pub use attach::{attach_file, sanitize_file_name, suggested_file_name, AttachError};
pub use cleanup::{cleanup, CleanupMode, CleanupReport, MissingFile};
pub use export::{
    export_catalog, export_playlist, timestamped_file_name, write_csv, write_json_playlist,
    write_m3u, ExportFormat, PlaylistFormat, PlaylistSummary,
};
pub use report::{generate_report, render_report, EMPTY_CATALOG_MESSAGE};
