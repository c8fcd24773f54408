//! Directory enumeration over prefix listings.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::volume::Volume;

/// Immediate children of a folder, split by kind.
#[derive(Debug, Default)]
pub(crate) struct Children {
    pub files: BTreeSet<String>,
    pub folders: BTreeSet<String>,
}

impl Volume {
    /// List the immediate children of a folder as tree paths.
    ///
    /// Files and emulated folders are merged and sorted ascending. The folder's
    /// own marker is never included. Only the first listing page is read.
    pub async fn list(&self, path: &str) -> Result<Vec<String>> {
        let children = self.children(path).await?;
        let mut entries: Vec<String> = children
            .files
            .into_iter()
            .chain(children.folders)
            .collect();
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    pub(crate) async fn children(&self, path: &str) -> Result<Children> {
        let sep = self.separator();
        let path = self.codec().normalize(path);
        let key = self.key(&path)?;
        let prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{}{}", key, sep)
        };

        let listing = self.store().list(&prefix, Some(sep)).await?;
        if listing.truncated {
            tracing::warn!(prefix = %prefix, "listing truncated, only the first page is shown");
        }

        let mut children = Children::default();
        for entry in listing.entries() {
            let Some(rest) = entry.strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once(sep) {
                None if rest.is_empty() => {}
                None => {
                    children.files.insert(self.codec().join(&path, rest));
                }
                Some(("", _)) => {}
                Some((segment, _)) => {
                    children.folders.insert(self.codec().join(&path, segment));
                }
            }
        }

        tracing::debug!(
            path = %path,
            files = children.files.len(),
            folders = children.folders.len(),
            "listed"
        );
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::{VolumeConfig, MEMORY_DRIVER};
    use crate::store::{MemoryStore, StoreOp};
    use crate::volume::Volume;

    fn volume(root: &str) -> (Arc<MemoryStore>, Volume) {
        let store = Arc::new(MemoryStore::new());
        let config = VolumeConfig {
            driver: MEMORY_DRIVER.to_string(),
            root: root.to_string(),
            ..Default::default()
        };
        (store.clone(), Volume::new(config, store).unwrap())
    }

    #[tokio::test]
    async fn test_list_files_and_folders() {
        let (store, volume) = volume("/");
        store.insert("docs/a.txt", "a");
        store.insert("docs/sub/b.txt", "b");
        store.insert("docs/sub/deeper/c.txt", "c");
        assert_eq!(volume.list("docs").await.unwrap(), vec!["docs/a.txt", "docs/sub"]);
    }

    #[tokio::test]
    async fn test_list_excludes_own_marker() {
        let (store, volume) = volume("/");
        store.insert("docs/", "");
        store.insert("docs/empty/", "");
        store.insert("docs/a.txt", "a");
        assert_eq!(volume.list("/docs/").await.unwrap(), vec!["docs/a.txt", "docs/empty"]);
    }

    #[tokio::test]
    async fn test_list_root() {
        let (store, volume) = volume("/");
        store.insert("top.txt", "t");
        store.insert("docs/a.txt", "a");
        assert_eq!(volume.list("/").await.unwrap(), vec!["docs", "top.txt"]);
        assert_eq!(store.operations_of(StoreOp::List), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_list_under_mounted_root() {
        let (store, volume) = volume("/files");
        store.insert("docs/a.txt", "a");
        assert_eq!(volume.list("files").await.unwrap(), vec!["files/docs"]);
        assert_eq!(volume.list("files/docs").await.unwrap(), vec!["files/docs/a.txt"]);
    }

    #[tokio::test]
    async fn test_list_empty_and_truncated() {
        let (_store, volume) = volume("/");
        assert!(volume.list("nothing").await.unwrap().is_empty());

        let store = Arc::new(MemoryStore::new().with_page_size(2));
        for key in ["d/1", "d/2", "d/3"] {
            store.insert(key, "x");
        }
        let config = VolumeConfig {
            driver: MEMORY_DRIVER.to_string(),
            ..Default::default()
        };
        let volume = Volume::new(config, store).unwrap();
        assert_eq!(volume.list("d").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_backend_failure() {
        let (store, volume) = volume("/");
        store.fail_on(StoreOp::List, "docs/");
        assert!(volume.list("docs").await.is_err());
    }
}
