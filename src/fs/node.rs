//! File metadata as reported to the file manager.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::mime::DIRECTORY_MIME;

/// Metadata for a file or folder.
///
/// Produced fresh by every [`Volume::stat`](crate::Volume::stat) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
    /// Content length in bytes (0 for folders)
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Mime type, `"directory"` for folders
    pub mime: String,
    /// Readable by the current user
    pub readable: bool,
    /// Writable by the current user
    pub writable: bool,
    /// Locked against modification
    pub locked: bool,
    /// Hidden from listings
    pub hidden: bool,
    /// Link target for aliases
    pub alias: Option<String>,
}

impl FileStat {
    /// Stat for a folder.
    pub fn directory(modified: DateTime<Utc>) -> Self {
        Self {
            size: 0,
            modified,
            mime: DIRECTORY_MIME.to_string(),
            readable: true,
            writable: true,
            locked: false,
            hidden: false,
            alias: None,
        }
    }

    /// Stat for a regular file.
    pub fn file(size: u64, modified: DateTime<Utc>, mime: impl Into<String>) -> Self {
        Self {
            size,
            mime: mime.into(),
            ..Self::directory(modified)
        }
    }

    /// Check if this stat describes a folder.
    pub fn is_dir(&self) -> bool {
        self.mime == DIRECTORY_MIME
    }

    /// Check if this stat describes a regular file.
    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Modification time as Unix seconds.
    pub fn timestamp(&self) -> i64 {
        self.modified.timestamp()
    }
}
