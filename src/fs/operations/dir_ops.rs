//! Mutations: create, copy, move and delete.
//!
//! The store has no rename and no real folders, so a folder is a zero-length
//! marker object at `key/` and a move is a copy followed by a delete.

use bytes::Bytes;

use crate::error::{Result, VolumeError};
use crate::fs::mime::{content_type_for, DIRECTORY_CONTENT_TYPE};
use crate::store::Acl;
use crate::volume::Volume;

impl Volume {
    /// Create a folder named `name` inside `parent`.
    ///
    /// Writes the folder marker only. Returns the new folder's tree path.
    pub async fn create_directory(&self, parent: &str, name: &str) -> Result<String> {
        let path = self.child_path(parent, name)?;
        let marker = format!("{}{}", self.key(&path)?, self.separator());

        self.store()
            .put(&marker, Bytes::new(), DIRECTORY_CONTENT_TYPE, Acl::Private)
            .await?;

        tracing::info!(path = %path, "created folder");
        Ok(path)
    }

    /// Create an empty file named `name` inside `parent`.
    pub async fn create_file(&self, parent: &str, name: &str) -> Result<String> {
        let path = self.child_path(parent, name)?;
        let key = self.key(&path)?;

        self.store()
            .put(&key, Bytes::new(), content_type_for(&path), Acl::PublicRead)
            .await?;

        tracing::info!(path = %path, "created file");
        Ok(path)
    }

    /// Server-side copy of `source` to `target_dir/name`.
    pub async fn copy(&self, source: &str, target_dir: &str, name: &str) -> Result<String> {
        let from = self.non_root_key(source, "copy")?;
        let target = self.child_path(target_dir, name)?;
        let to = self.key(&target)?;

        self.store().copy(&from, &to, Acl::PublicRead).await?;

        tracing::info!(source = %source, target = %target, "copied");
        Ok(target)
    }

    /// Move `source` to `target_dir/name`.
    ///
    /// Not atomic. If the copy fails nothing has changed and that error is
    /// returned. If the copy succeeds but the source cannot be removed, the
    /// result is [`VolumeError::PartialMove`] and both objects exist.
    /// Moving a file onto itself changes nothing and makes no store calls.
    pub async fn move_to(&self, source: &str, target_dir: &str, name: &str) -> Result<String> {
        let from = self.non_root_key(source, "move")?;
        let target = self.child_path(target_dir, name)?;
        if self.key(&target)? == from {
            tracing::debug!(path = %target, "move onto itself, nothing to do");
            return Ok(target);
        }

        let target = self.copy(source, target_dir, name).await?;

        if let Err(e) = self.store().delete(&from).await {
            tracing::warn!(
                source = %source,
                target = %target,
                error = %e,
                "move left source behind"
            );
            return Err(VolumeError::PartialMove {
                source_path: self.codec().normalize(source),
                target_path: target,
                cause: Box::new(e),
            });
        }

        tracing::info!(source = %source, target = %target, "moved");
        Ok(target)
    }

    /// Delete the file at `path`.
    pub async fn delete_file(&self, path: &str) -> Result<()> {
        let key = self.non_root_key(path, "delete")?;
        self.store().delete(&key).await?;
        tracing::info!(path = %path, "deleted file");
        Ok(())
    }

    /// Delete the folder marker of `path`.
    ///
    /// Objects below the folder are left alone; emptying it first is up to the
    /// caller.
    pub async fn delete_directory(&self, path: &str) -> Result<()> {
        let key = self.non_root_key(path, "delete")?;
        let marker = format!("{}{}", key, self.separator());
        self.store().delete(&marker).await?;
        tracing::info!(path = %path, "deleted folder");
        Ok(())
    }

    /// Symlinks are not supported by object stores.
    pub fn symlink(&self, _source: &str, _target_dir: &str, _name: &str) -> Result<String> {
        Err(VolumeError::Unsupported("symlink"))
    }

    /// Archives cannot be extracted on this volume.
    pub fn extract(&self, _path: &str) -> Result<Vec<String>> {
        Err(VolumeError::Unsupported("extract"))
    }

    /// Archives cannot be created on this volume.
    pub fn archive(&self, _dir: &str, _files: &[&str], _name: &str) -> Result<String> {
        Err(VolumeError::Unsupported("archive"))
    }

    /// Object stores have no permission bits.
    pub fn chmod(&self, _path: &str, _mode: u32) -> Result<()> {
        Err(VolumeError::Unsupported("chmod"))
    }
}
