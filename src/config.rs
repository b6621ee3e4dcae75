//! Configuration management for the timetable service.
//!
//! `Config` is the file shape (every field optional); `Settings` holds the
//! resolved values the rest of the crate uses.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default directory holding the schedule snapshot.
pub const DEFAULT_DATA_DIR: &str = "uploaded_schedules";

/// Default snapshot filename.
pub const DEFAULT_SCHEDULE_FILE: &str = "raspisanie.json";

/// Default front-end origin allowed by CORS.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Default server bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the schedule snapshot.
    pub data_dir: PathBuf,
    /// Snapshot filename inside `data_dir`.
    pub schedule_file: String,
    /// The single origin allowed to call the API from a browser.
    pub allowed_origin: String,
    /// Server bind address.
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            schedule_file: DEFAULT_SCHEDULE_FILE.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Full path of the schedule snapshot.
    pub fn schedule_path(&self) -> PathBuf {
        self.data_dir.join(&self.schedule_file)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Snapshot filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_file: Option<String>,
    /// CORS origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origin: Option<String>,
    /// Server bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    pub async fn load() -> Self {
        match prefer::load("timetable").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    tracing::debug!("Discovered config file: {}", path.display());
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Format follows the extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref schedule_file) = self.schedule_file {
            settings.schedule_file = schedule_file.clone();
        }
        if let Some(ref origin) = self.allowed_origin {
            settings.allowed_origin = origin.clone();
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    /// Explicit config file path (--config).
    pub config_path: Option<PathBuf>,
    /// Data directory override (--data-dir / TIMETABLE_DATA_DIR).
    pub data_dir: Option<PathBuf>,
    /// CORS origin override (TIMETABLE_ALLOWED_ORIGIN).
    pub allowed_origin: Option<String>,
}

/// Load settings: defaults, then the config file, then explicit overrides.
pub async fn load_settings(options: LoadOptions) -> Settings {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await.unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            Config::default()
        }),
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(data_dir) = options.data_dir {
        settings.data_dir = config.resolve_path(&data_dir.to_string_lossy(), &base_dir);
    }
    if let Some(origin) = options.allowed_origin {
        settings.allowed_origin = origin;
    }

    settings
}
