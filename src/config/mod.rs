mod file_config;

pub use file_config::{FileConfig, HarvestConfig};

use crate::catalog::{RecordDefaults, UNKNOWN_TITLE};
use crate::harvest::AssemblerSettings;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "catalog_downloads/tracks_database.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub default_genre: Option<String>,
    pub unknown_artist: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub defaults: RecordDefaults,
    pub credit_markers: Vec<String>,
    pub genre_vocabulary: Vec<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let harvest = file.harvest.unwrap_or_default();
        let builtin = AssemblerSettings::default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        if db_path.is_dir() {
            bail!("db_path points to a directory: {:?}", db_path);
        }

        // Exports land next to the database unless told otherwise
        let export_dir = file
            .export_dir
            .map(PathBuf::from)
            .or_else(|| cli.export_dir.clone())
            .unwrap_or_else(|| parent_dir(&db_path));
        if export_dir.exists() && !export_dir.is_dir() {
            bail!("export_dir is not a directory: {:?}", export_dir);
        }

        let default_genre = non_blank(
            "default_genre",
            file.default_genre.or_else(|| cli.default_genre.clone()),
        )?
        .unwrap_or(builtin.defaults.default_genre);
        let unknown_artist = non_blank(
            "unknown_artist",
            file.unknown_artist.or_else(|| cli.unknown_artist.clone()),
        )?
        .unwrap_or(builtin.defaults.unknown_artist);

        let log_level = file
            .log_level
            .or_else(|| cli.log_level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_file = file
            .log_file
            .map(PathBuf::from)
            .or_else(|| cli.log_file.clone());

        let credit_markers = harvest
            .credit_markers
            .unwrap_or(builtin.credit_markers);
        let genre_vocabulary = harvest.genres.unwrap_or(builtin.genre_vocabulary);

        Ok(Self {
            db_path,
            export_dir,
            log_level,
            log_file,
            defaults: RecordDefaults {
                unknown_title: UNKNOWN_TITLE.to_string(),
                unknown_artist,
                default_genre,
            },
            credit_markers,
            genre_vocabulary,
        })
    }

    /// Reads the TOML file at `config_path`, when given, and resolves it
    /// against the CLI values.
    pub fn load(cli: &CliConfig, config_path: Option<&Path>) -> Result<Self> {
        let file_config = config_path.map(FileConfig::load).transpose()?;
        Self::resolve(cli, file_config)
    }

    pub fn assembler_settings(&self) -> AssemblerSettings {
        AssemblerSettings {
            defaults: self.defaults.clone(),
            genre_vocabulary: self.genre_vocabulary.clone(),
            credit_markers: self.credit_markers.clone(),
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn non_blank(name: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(value) if value.trim().is_empty() => bail!("{} must not be empty", name),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DEFAULT_GENRE, UNKNOWN_ARTIST};
    use crate::harvest::DEFAULT_CREDIT_MARKERS;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();

        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.export_dir, PathBuf::from("catalog_downloads"));
        assert_eq!(config.log_level, "info");
        assert!(config.log_file.is_none());
        assert_eq!(config.defaults.default_genre, DEFAULT_GENRE);
        assert_eq!(config.defaults.unknown_artist, UNKNOWN_ARTIST);
        assert_eq!(config.credit_markers, DEFAULT_CREDIT_MARKERS);
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(temp_dir.path().join("tracks.json")),
            default_genre: Some("Chill".to_string()),
            log_level: Some("debug".to_string()),
            log_file: Some(temp_dir.path().join("catalog.log")),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_path, temp_dir.path().join("tracks.json"));
        assert_eq!(config.export_dir, temp_dir.path());
        assert_eq!(config.defaults.default_genre, "Chill");
        assert_eq!(config.defaults.unknown_artist, UNKNOWN_ARTIST);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, Some(temp_dir.path().join("catalog.log")));
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(PathBuf::from("/should/be/overridden.json")),
            export_dir: Some(PathBuf::from("/cli/exports")),
            unknown_artist: Some("Anonymous".to_string()),
            ..Default::default()
        };

        let file_config = FileConfig {
            db_path: Some(temp_dir.path().join("db.json").to_string_lossy().to_string()),
            default_genre: Some("Trap".to_string()),
            harvest: Some(HarvestConfig {
                credit_markers: Some(vec!["Song:".to_string()]),
                genres: None,
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_path, temp_dir.path().join("db.json"));
        assert_eq!(config.defaults.default_genre, "Trap");
        assert_eq!(config.credit_markers, vec!["Song:".to_string()]);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.export_dir, PathBuf::from("/cli/exports"));
        assert_eq!(config.defaults.unknown_artist, "Anonymous");

        let settings = config.assembler_settings();
        assert_eq!(settings.defaults.default_genre, "Trap");
        assert_eq!(settings.genre_vocabulary, AssemblerSettings::default().genre_vocabulary);
    }

    #[test]
    fn test_resolve_db_path_is_directory_error() {
        let temp_dir = TempDir::new().unwrap();
        let cli = CliConfig {
            db_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("directory"));
    }

    #[test]
    fn test_resolve_export_dir_not_directory_error() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let cli = CliConfig {
            export_dir: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("export_dir is not a directory"));
    }

    #[test]
    fn test_resolve_blank_default_genre_error() {
        let file_config = FileConfig {
            default_genre: Some("  ".to_string()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&CliConfig::default(), Some(file_config));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("default_genre must not be empty"));
    }

    #[test]
    fn test_load_reads_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("catalog.toml");
        std::fs::write(&config_path, "unknown_artist = \"Various\"\n").unwrap();

        let config = AppConfig::load(&CliConfig::default(), Some(&config_path)).unwrap();
        assert_eq!(config.defaults.unknown_artist, "Various");

        let missing = temp_dir.path().join("missing.toml");
        assert!(AppConfig::load(&CliConfig::default(), Some(&missing)).is_err());
    }

    #[test]
    fn test_bare_file_name_exports_to_current_dir() {
        let cli = CliConfig {
            db_path: Some(PathBuf::from("tracks.json")),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, None).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("."));
    }
}
