//! Configuration System
//!
//! Layered configuration: merge-policy defaults, then the global file, then
//! the workspace file, then environment overrides. Validation reports every
//! problem at once.

use crate::error::WorldError;
use crate::layout::ScatterParams;
use crate::logging::LoggingConfig;
use crate::scanner::{ScannerConfig, METADATA_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::environment::DB_ENV_VAR;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::workspace_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RogueConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scatter tuning
    #[serde(default)]
    pub layout: ScatterParams,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Index location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Primary index directory; `~/.roguefs/index` when unset.
    #[serde(default)]
    pub index_path: Option<PathBuf>,

    /// Used when the primary cannot be opened; `<workspace>/.roguefs/index`
    /// when unset.
    #[serde(default)]
    pub fallback_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Primary and fallback index locations.
    pub fn resolve(&self, workspace_root: &Path) -> (PathBuf, PathBuf) {
        let primary = self.index_path.clone().unwrap_or_else(default_index_path);
        let fallback = self
            .fallback_path
            .clone()
            .unwrap_or_else(|| workspace_root.join(".roguefs").join("index"));
        (primary, fallback)
    }
}

fn default_index_path() -> PathBuf {
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".roguefs").join("index"),
        None => std::env::temp_dir().join("roguefs").join("index"),
    }
}

/// Scanner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_ignore_names")]
    pub ignore_names: Vec<String>,
}

fn default_ignore_names() -> Vec<String> {
    vec![METADATA_FILE_NAME.to_string()]
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_names: default_ignore_names(),
        }
    }
}

impl ScanConfig {
    /// Scanner configuration; the metadata file is always ignored.
    pub fn scanner_config(&self) -> ScannerConfig {
        let mut ignore_names = self.ignore_names.clone();
        if !ignore_names.iter().any(|n| n == METADATA_FILE_NAME) {
            ignore_names.push(METADATA_FILE_NAME.to_string());
        }
        ScannerConfig { ignore_names }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Storage(String),
    Layout(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Layout(msg) => write!(f, "Layout: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RogueConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (label, path) in [
            ("index_path", &self.storage.index_path),
            ("fallback_path", &self.storage.fallback_path),
        ] {
            if matches!(path, Some(p) if p.as_os_str().is_empty()) {
                errors.push(ValidationError::Storage(format!("{} cannot be empty", label)));
            }
        }

        let layout = &self.layout;
        if !(layout.radius_divisor.is_finite() && layout.radius_divisor > 0.0) {
            errors.push(ValidationError::Layout(
                "radius_divisor must be a positive number".to_string(),
            ));
        }
        if !(layout.fill_ratio > 0.0 && layout.fill_ratio <= 1.0) {
            errors.push(ValidationError::Layout(
                "fill_ratio must be in (0, 1]".to_string(),
            ));
        }
        if !(layout.min_dist.is_finite() && layout.min_dist >= 0.0) {
            errors.push(ValidationError::Layout(
                "min_dist must be non-negative".to_string(),
            ));
        }

        if let Err(e) = crate::logging::validate(&self.logging) {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`RogueConfig`] from its layered sources
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    workspace_root: PathBuf,
    global_file: Option<PathBuf>,
    explicit_file: Option<PathBuf>,
    environment: bool,
}

impl ConfigLoader {
    /// Loader for `workspace_root` with the standard global file and
    /// environment overrides.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            global_file: global_config_path(),
            explicit_file: None,
            environment: true,
        }
    }

    pub fn with_global_file(mut self, path: Option<PathBuf>) -> Self {
        self.global_file = path;
        self
    }

    /// Extra file applied after the workspace file (the `--config` flag).
    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_file = path;
        self
    }

    pub fn with_environment(mut self, enabled: bool) -> Self {
        self.environment = enabled;
        self
    }

    pub fn load(&self) -> Result<RogueConfig, WorldError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder, self.global_file.as_deref())?;
        builder = sources::workspace_file::add_to_builder(builder, &self.workspace_root)?;
        if let Some(path) = &self.explicit_file {
            if !path.exists() {
                return Err(WorldError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        if self.environment {
            builder = sources::environment::add_to_builder(builder)?;
        }
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load and validate, folding validation failures into one error.
    pub fn load_validated(&self) -> Result<RogueConfig, WorldError> {
        let config = self.load()?;
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            WorldError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(config)
    }
}
