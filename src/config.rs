//! Volume configuration.
//!
//! One TOML document describes one mounted volume:
//!
//! ```toml
//! driver = "s3"
//! root = "/"
//! bucket = "my-files"
//! region = "eu-west-1"
//! access_key = "AKIA..."
//! secret_key = "..."
//!
//! [plugins.thumbnails]
//! enable = true
//! thumb_path = ""
//! thumb = "100|200"
//! ```
//!
//! Every field has a default, and [`VolumeConfig::validate`] runs once when a
//! volume is constructed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolumeError};
use crate::store::S3Settings;

/// Driver identifier of the S3 backend.
pub const S3_DRIVER: &str = "s3";

/// Driver identifier of the in-process backend.
pub const MEMORY_DRIVER: &str = "memory";

/// How `stat` chooses the mime type of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MimeDetect {
    /// Use the static extension table
    #[default]
    Internal,
    /// Use the content type the backend reports
    Backend,
}

/// Configuration of one mounted volume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeConfig {
    /// Driver identifier (`s3`, `memory`)
    pub driver: String,
    /// Tree path this volume is mounted at
    pub root: String,
    /// Name shown for the root in user-facing paths
    pub root_name: String,
    /// Path separator
    pub separator: char,
    /// Bucket holding the objects
    pub bucket: String,
    /// Access key id
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Backend region
    pub region: String,
    /// Custom endpoint for S3-compatible services
    pub endpoint: Option<String>,
    /// Use path-style addressing instead of virtual hosts
    pub path_style: bool,
    /// Mime detection mode
    pub mime_detect: MimeDetect,
    /// Directory for spooled temporary files (system temp dir when unset)
    pub tmp_dir: Option<PathBuf>,
    /// Per-volume plugin options
    pub plugins: PluginsConfig,
}

/// Plugin options attached to a volume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PluginsConfig {
    /// Thumbnail generation after save
    pub thumbnails: Option<ThumbnailOptions>,
}

/// Options of the thumbnail plugin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThumbnailOptions {
    /// Whether thumbnails are generated at all
    pub enable: bool,
    /// Sub-path under each file's directory where `.thumb<i>` folders go
    pub thumb_path: String,
    /// `|`-separated maximum dimensions; empty entries disable that slot
    pub thumb: String,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            driver: S3_DRIVER.to_string(),
            root: "/".to_string(),
            root_name: "s3".to_string(),
            separator: '/',
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            region: String::new(),
            endpoint: None,
            path_style: false,
            mime_detect: MimeDetect::Internal,
            tmp_dir: None,
            plugins: PluginsConfig::default(),
        }
    }
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            enable: true,
            thumb_path: String::new(),
            thumb: String::new(),
        }
    }
}

impl ThumbnailOptions {
    /// Parse the size list, keeping disabled slots so indexes stay stable.
    ///
    /// # Example
    /// ```
    /// use bucketvol::config::ThumbnailOptions;
    ///
    /// let opts = ThumbnailOptions { thumb: "100||300".into(), ..Default::default() };
    /// assert_eq!(opts.sizes().unwrap(), vec![Some(100), None, Some(300)]);
    /// ```
    pub fn sizes(&self) -> Result<Vec<Option<u32>>> {
        if self.thumb.trim().is_empty() {
            return Ok(Vec::new());
        }

        self.thumb
            .split('|')
            .map(|entry| {
                let entry = entry.trim();
                if entry.is_empty() {
                    return Ok(None);
                }
                match entry.parse::<u32>() {
                    Ok(0) | Err(_) => Err(VolumeError::Config(format!(
                        "thumbnail size must be a positive integer, got '{}'",
                        entry
                    ))),
                    Ok(size) => Ok(Some(size)),
                }
            })
            .collect()
    }
}

impl VolumeConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            VolumeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded volume configuration from {:?}", path);
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| VolumeError::Config(format!("Invalid TOML configuration: {}", e)))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| VolumeError::Config(format!("Failed to serialize configuration: {}", e)))
    }

    /// Apply environment variable overrides.
    ///
    /// Supported variables: `BUCKETVOL_ACCESS_KEY`, `BUCKETVOL_SECRET_KEY`,
    /// `BUCKETVOL_BUCKET`, `BUCKETVOL_REGION`, `BUCKETVOL_ENDPOINT`.
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 4] = [
            ("BUCKETVOL_ACCESS_KEY", &mut self.access_key),
            ("BUCKETVOL_SECRET_KEY", &mut self.secret_key),
            ("BUCKETVOL_BUCKET", &mut self.bucket),
            ("BUCKETVOL_REGION", &mut self.region),
        ];
        for (var, field) in overrides {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    tracing::info!("Overriding {} from environment", var);
                    *field = value;
                }
            }
        }

        if let Ok(endpoint) = std::env::var("BUCKETVOL_ENDPOINT") {
            if !endpoint.is_empty() {
                tracing::info!("Overriding endpoint from environment: {}", endpoint);
                self.endpoint = Some(endpoint);
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.driver.is_empty() {
            return Err(VolumeError::Config("driver must not be empty".to_string()));
        }

        if self.separator.is_alphanumeric() || self.separator.is_whitespace() {
            return Err(VolumeError::Config(format!(
                "separator must be a punctuation character, got {:?}",
                self.separator
            )));
        }

        if self.driver == S3_DRIVER {
            let missing: Vec<&str> = [
                ("bucket", &self.bucket),
                ("region", &self.region),
                ("access_key", &self.access_key),
                ("secret_key", &self.secret_key),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();

            if !missing.is_empty() {
                return Err(VolumeError::Config(format!(
                    "Required options undefined: {}",
                    missing.join(", ")
                )));
            }
        }

        if let Some(thumbnails) = &self.plugins.thumbnails {
            thumbnails.sizes()?;
        }

        Ok(())
    }

    /// Connection settings for the S3 backend.
    pub fn s3_settings(&self) -> S3Settings {
        S3Settings {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            path_style: self.path_style,
        }
    }
}
