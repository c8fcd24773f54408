//! Stat resolution.

use chrono::Utc;

use crate::config::MimeDetect;
use crate::error::{Result, VolumeError};
use crate::fs::mime::{self, TEXT_PLAIN};
use crate::fs::node::FileStat;
use crate::volume::Volume;

impl Volume {
    /// Get information about a file or folder.
    ///
    /// Resolution order: the volume root, an object at the exact key, a folder
    /// marker at `key/`, and finally any object under `key/`. Each call costs
    /// two to three store round trips; nothing is cached.
    ///
    /// # Returns
    /// `Ok(None)` when nothing exists at `path`. Backend failures are
    /// returned as errors, never as `None`.
    pub async fn stat(&self, path: &str) -> Result<Option<FileStat>> {
        let path = self.codec().normalize(path);
        if path == self.root() {
            return Ok(Some(FileStat::directory(Utc::now())));
        }

        let key = self.key(&path)?;
        let marker = format!("{}{}", key, self.separator());

        let meta = match self.store().head(&key).await {
            Ok(meta) => Some(meta),
            Err(VolumeError::NotFound(_)) => match self.store().head(&marker).await {
                Ok(meta) => Some(meta),
                Err(e) => {
                    tracing::debug!(key = %marker, error = %e, "no folder marker");
                    None
                }
            },
            Err(e) => return Err(e),
        };

        let Some(meta) = meta else {
            // No object and no marker: a folder only if something lives below it.
            return if self.list(&path).await?.is_empty() {
                Ok(None)
            } else {
                Ok(Some(FileStat::directory(Utc::now())))
            };
        };

        // Head responses don't carry a reliable length on every backend.
        let listing = self.store().list(&meta.key, Some(self.separator())).await?;
        let size = listing
            .objects
            .iter()
            .find(|o| o.key == meta.key)
            .map(|o| o.size)
            .or(meta.size)
            .unwrap_or(0);
        let modified = meta.last_modified.unwrap_or_else(Utc::now);

        if meta.key.ends_with(self.separator()) {
            return Ok(Some(FileStat {
                size,
                ..FileStat::directory(modified)
            }));
        }

        let mime = self.detect_mime(&path, meta.content_type.as_deref());
        Ok(Some(FileStat::file(size, modified, mime)))
    }

    /// Check whether `path` is a folder with at least one sub-folder.
    pub async fn has_subdirs(&self, path: &str) -> Result<bool> {
        match self.stat(path).await? {
            Some(stat) if stat.is_dir() => Ok(!self.children(path).await?.folders.is_empty()),
            _ => Ok(false),
        }
    }

    fn detect_mime(&self, path: &str, reported: Option<&str>) -> String {
        let from_table = mime::from_path(path);
        let reported = reported.filter(|ct| !ct.is_empty());

        let chosen = match self.config().mime_detect {
            MimeDetect::Internal => from_table.or(reported),
            MimeDetect::Backend => reported.or(from_table),
        };
        chosen.unwrap_or(TEXT_PLAIN).to_string()
    }
}
