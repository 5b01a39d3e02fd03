//! Shared constants for integration tests

#![allow(dead_code)]

// ============================================================================
// Clock
// ============================================================================

/// Fixed "now" used by every test catalog, RFC 3339.
pub const FIXED_NOW: &str = "2024-03-01T12:00:00Z";

// ============================================================================
// Seeded catalog
// ============================================================================

pub const FADE_ID: &str = "track_fade";
pub const FADE_TITLE: &str = "Fade";
pub const FADE_URL: &str = "https://example.com/fade";

pub const SPECTRE_ID: &str = "track_spectre";
pub const SPECTRE_TITLE: &str = "Spectre";
pub const SPECTRE_URL: &str = "https://example.com/spectre";

/// Track whose file is attached but deleted from disk by the fixture.
pub const SKY_HIGH_ID: &str = "track_sky_high";
pub const SKY_HIGH_TITLE: &str = "Sky High";
pub const SKY_HIGH_URL: &str = "https://example.com/sky-high";

/// Track that was never downloaded.
pub const CLOUDS_ID: &str = "track_walking_on_clouds";
pub const CLOUDS_TITLE: &str = "Walking on Clouds";
pub const CLOUDS_URL: &str = "https://example.com/clouds";

/// Bytes written for every downloaded media file.
pub const MEDIA_SIZE: usize = 4096;
