//! A mounted volume: configuration, path codec, store handle and hooks.
//!
//! The filesystem operations themselves live in [`crate::fs`] as `impl Volume`
//! blocks, one file per concern.

use std::sync::Arc;

use crate::config::VolumeConfig;
use crate::error::{Result, VolumeError};
use crate::fs::PathCodec;
use crate::hooks::SaveHook;
use crate::store::ObjectStore;
use crate::thumbnails::ThumbnailHook;

/// A volume backed by an object store.
pub struct Volume {
    config: VolumeConfig,
    codec: PathCodec,
    root: String,
    store: Arc<dyn ObjectStore>,
    hooks: Vec<Arc<dyn SaveHook>>,
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("driver", &self.config.driver)
            .field("root", &self.root)
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Volume {
    /// Create a volume over `store`.
    ///
    /// Validates `config` and registers the thumbnail hook when the volume
    /// has enabled `[plugins.thumbnails]` options.
    pub fn new(config: VolumeConfig, store: Arc<dyn ObjectStore>) -> Result<Self> {
        config.validate()?;

        let codec = PathCodec::new(config.separator);
        let root = codec.normalize(&config.root);

        let mut hooks: Vec<Arc<dyn SaveHook>> = Vec::new();
        if let Some(options) = config.plugins.thumbnails.as_ref().filter(|o| o.enable) {
            hooks.push(Arc::new(ThumbnailHook::new(options.clone())?));
        }

        tracing::debug!(driver = %config.driver, root = %root, "volume mounted");
        Ok(Self {
            config,
            codec,
            root,
            store,
            hooks,
        })
    }

    /// Register an additional post-save hook.
    pub fn with_hook(mut self, hook: Arc<dyn SaveHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Volume configuration.
    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    /// Path codec for this volume's separator.
    pub fn codec(&self) -> &PathCodec {
        &self.codec
    }

    /// Normalized root tree path.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Display name of the root.
    pub fn root_name(&self) -> &str {
        &self.config.root_name
    }

    /// The backing object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Registered post-save hooks.
    pub fn hooks(&self) -> &[Arc<dyn SaveHook>] {
        &self.hooks
    }

    /// Path as shown to users, e.g. `s3/docs/a.txt`.
    pub fn display_path(&self, path: &str) -> String {
        self.codec.display_path(&self.config.root_name, &self.root, path)
    }

    /// Object key of a tree path.
    pub fn key(&self, path: &str) -> Result<String> {
        self.codec.object_key(&self.root, path)
    }

    /// Tree path of an object key.
    pub fn path_for_key(&self, key: &str) -> String {
        self.codec.tree_path(&self.root, key)
    }

    pub(crate) fn separator(&self) -> char {
        self.codec.separator()
    }

    /// Normalized path of `name` inside `dir`.
    ///
    /// Rejects names that are empty, contain the separator, or are `.`/`..`.
    pub(crate) fn child_path(&self, dir: &str, name: &str) -> Result<String> {
        if name.is_empty() || name == "." || name == ".." || name.contains(self.separator()) {
            return Err(VolumeError::InvalidPath(format!("invalid name '{}'", name)));
        }
        let dir = self.codec.normalize(dir);
        let path = self.codec.join(&dir, name);
        self.key(&path)?;
        Ok(path)
    }

    /// Key of a path that must not be the volume root.
    pub(crate) fn non_root_key(&self, path: &str, operation: &str) -> Result<String> {
        let key = self.key(path)?;
        if key.is_empty() {
            return Err(VolumeError::InvalidPath(format!(
                "cannot {} the volume root",
                operation
            )));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ThumbnailOptions, MEMORY_DRIVER};
    use crate::store::MemoryStore;

    fn config(root: &str) -> VolumeConfig {
        VolumeConfig {
            driver: MEMORY_DRIVER.to_string(),
            root: root.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_keys_strip_root() {
        let volume = Volume::new(config("/files"), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(volume.root(), "files");
        assert_eq!(volume.key("/files/docs/a.txt").unwrap(), "docs/a.txt");
        assert_eq!(volume.path_for_key("docs/a.txt"), "files/docs/a.txt");
        assert_eq!(volume.display_path("files/docs"), "s3/docs");
        assert!(volume.key("elsewhere/a.txt").is_err());
    }

    #[test]
    fn test_child_path_validation() {
        let volume = Volume::new(config("/"), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(volume.child_path("/docs/", "a.txt").unwrap(), "docs/a.txt");
        assert_eq!(volume.child_path("", "a.txt").unwrap(), "a.txt");
        for bad in ["", ".", "..", "a/b"] {
            assert!(volume.child_path("docs", bad).is_err(), "{:?}", bad);
        }
        assert!(volume.non_root_key("/", "delete").is_err());
    }

    #[test]
    fn test_thumbnail_hook_registered_from_config() {
        let mut cfg = config("/");
        cfg.plugins.thumbnails = Some(ThumbnailOptions {
            thumb: "64".to_string(),
            ..Default::default()
        });
        let volume = Volume::new(cfg, Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(volume.hooks().len(), 1);
        assert_eq!(volume.hooks()[0].name(), "thumbnails");

        let plain = Volume::new(config("/"), Arc::new(MemoryStore::new())).unwrap();
        assert!(plain.hooks().is_empty());

        let mut disabled = config("/");
        disabled.plugins.thumbnails = Some(ThumbnailOptions {
            enable: false,
            ..Default::default()
        });
        let volume = Volume::new(disabled, Arc::new(MemoryStore::new())).unwrap();
        assert!(volume.hooks().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = VolumeConfig::default();
        assert!(matches!(
            Volume::new(cfg, Arc::new(MemoryStore::new())),
            Err(VolumeError::Config(_))
        ));
    }
}
