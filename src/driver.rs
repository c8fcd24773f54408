//! Driver abstraction and registry.
//!
//! A file-manager connector talks to volumes through [`VolumeDriver`] and
//! creates them by identifier through a [`DriverRegistry`]:
//!
//! ```no_run
//! use bucketvol::{DriverRegistry, VolumeConfig};
//!
//! # async fn example() -> bucketvol::Result<()> {
//! let config = VolumeConfig::load("volume.toml")?;
//! let driver = DriverRegistry::with_defaults().create(config)?;
//! for path in driver.list("/").await? {
//!     println!("{}", path);
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{VolumeConfig, MEMORY_DRIVER, S3_DRIVER};
use crate::error::{Result, VolumeError};
use crate::fs::{ContentReader, ContentWriter, FileStat};
use crate::store::{MemoryStore, S3Store};
use crate::volume::Volume;

/// Operations a connector can perform on a mounted volume.
#[async_trait]
pub trait VolumeDriver: std::fmt::Debug + Send + Sync {
    /// Identifier of the driver that created this volume.
    fn driver_id(&self) -> &str;

    async fn stat(&self, path: &str) -> Result<Option<FileStat>>;

    async fn list(&self, path: &str) -> Result<Vec<String>>;

    /// True when `path` is a folder with at least one sub-folder.
    async fn has_subdirs(&self, path: &str) -> Result<bool>;

    async fn create_directory(&self, parent: &str, name: &str) -> Result<String>;

    async fn create_file(&self, parent: &str, name: &str) -> Result<String>;

    async fn copy(&self, source: &str, target_dir: &str, name: &str) -> Result<String>;

    async fn move_to(&self, source: &str, target_dir: &str, name: &str) -> Result<String>;

    async fn delete_file(&self, path: &str) -> Result<()>;

    async fn delete_directory(&self, path: &str) -> Result<()>;

    async fn read_content(&self, path: &str) -> Result<Bytes>;

    async fn write_content(&self, path: &str, content: Bytes) -> Result<()>;

    /// Store `content` as `dir/name` and run the volume's save hooks.
    async fn save(&self, content: Bytes, dir: &str, name: &str) -> Result<String>;

    /// Download `path` into a local temporary file.
    async fn open_for_read(&self, path: &str) -> Result<ContentReader>;

    /// Spool writes for `path` locally until [`ContentWriter::commit`].
    fn open_for_write(&self, path: &str) -> Result<ContentWriter<'_>>;

    fn symlink(&self, source: &str, target_dir: &str, name: &str) -> Result<String>;

    fn extract(&self, path: &str) -> Result<Vec<String>>;

    fn archive(&self, dir: &str, files: &[&str], name: &str) -> Result<String>;

    fn chmod(&self, path: &str, mode: u32) -> Result<()>;
}

#[async_trait]
impl VolumeDriver for Volume {
    fn driver_id(&self) -> &str {
        &self.config().driver
    }

    async fn stat(&self, path: &str) -> Result<Option<FileStat>> {
        Volume::stat(self, path).await
    }

    async fn list(&self, path: &str) -> Result<Vec<String>> {
        Volume::list(self, path).await
    }

    async fn has_subdirs(&self, path: &str) -> Result<bool> {
        Volume::has_subdirs(self, path).await
    }

    async fn create_directory(&self, parent: &str, name: &str) -> Result<String> {
        Volume::create_directory(self, parent, name).await
    }

    async fn create_file(&self, parent: &str, name: &str) -> Result<String> {
        Volume::create_file(self, parent, name).await
    }

    async fn copy(&self, source: &str, target_dir: &str, name: &str) -> Result<String> {
        Volume::copy(self, source, target_dir, name).await
    }

    async fn move_to(&self, source: &str, target_dir: &str, name: &str) -> Result<String> {
        Volume::move_to(self, source, target_dir, name).await
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        Volume::delete_file(self, path).await
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        Volume::delete_directory(self, path).await
    }

    async fn read_content(&self, path: &str) -> Result<Bytes> {
        self.get_contents(path).await
    }

    async fn write_content(&self, path: &str, content: Bytes) -> Result<()> {
        Volume::write_content(self, path, content).await
    }

    async fn save(&self, content: Bytes, dir: &str, name: &str) -> Result<String> {
        Volume::save(self, &content[..], dir, name).await
    }

    async fn open_for_read(&self, path: &str) -> Result<ContentReader> {
        Volume::open_for_read(self, path).await
    }

    fn open_for_write(&self, path: &str) -> Result<ContentWriter<'_>> {
        Volume::open_for_write(self, path)
    }

    fn symlink(&self, source: &str, target_dir: &str, name: &str) -> Result<String> {
        Volume::symlink(self, source, target_dir, name)
    }

    fn extract(&self, path: &str) -> Result<Vec<String>> {
        Volume::extract(self, path)
    }

    fn archive(&self, dir: &str, files: &[&str], name: &str) -> Result<String> {
        Volume::archive(self, dir, files, name)
    }

    fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        Volume::chmod(self, path, mode)
    }
}

/// Builds volumes for one driver identifier.
pub trait DriverFactory: Send + Sync {
    /// Identifier matched against `VolumeConfig::driver`.
    fn driver_type(&self) -> &'static str;

    fn create_driver(&self, config: VolumeConfig) -> Result<Arc<dyn VolumeDriver>>;
}

/// Volumes backed by an S3-compatible bucket.
#[derive(Debug, Default)]
pub struct S3DriverFactory;

impl DriverFactory for S3DriverFactory {
    fn driver_type(&self) -> &'static str {
        S3_DRIVER
    }

    fn create_driver(&self, config: VolumeConfig) -> Result<Arc<dyn VolumeDriver>> {
        config.validate()?;
        let store = Arc::new(S3Store::new(config.s3_settings())?);
        Ok(Arc::new(Volume::new(config, store)?))
    }
}

/// Volumes held in process memory. Contents are lost when the volume drops.
#[derive(Debug, Default)]
pub struct MemoryDriverFactory;

impl DriverFactory for MemoryDriverFactory {
    fn driver_type(&self) -> &'static str {
        MEMORY_DRIVER
    }

    fn create_driver(&self, config: VolumeConfig) -> Result<Arc<dyn VolumeDriver>> {
        Ok(Arc::new(Volume::new(config, Arc::new(MemoryStore::new()))?))
    }
}

/// Maps driver identifiers to factories.
#[derive(Default)]
pub struct DriverRegistry {
    factories: BTreeMap<&'static str, Arc<dyn DriverFactory>>,
}

impl DriverRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `s3` and `memory` drivers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(S3DriverFactory));
        registry.register(Arc::new(MemoryDriverFactory));
        registry
    }

    /// Add a factory, replacing any previous one with the same identifier.
    pub fn register(&mut self, factory: Arc<dyn DriverFactory>) {
        self.factories.insert(factory.driver_type(), factory);
    }

    /// Create a volume using the factory named by `config.driver`.
    pub fn create(&self, config: VolumeConfig) -> Result<Arc<dyn VolumeDriver>> {
        let factory = self.factories.get(config.driver.as_str()).ok_or_else(|| {
            VolumeError::Config(format!(
                "unknown driver '{}', expected one of: {}",
                config.driver,
                self.driver_types().join(", ")
            ))
        })?;
        tracing::debug!(driver = %config.driver, "creating volume");
        factory.create_driver(config)
    }

    /// Registered identifiers, sorted.
    pub fn driver_types(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.driver_types())
            .finish()
    }
}
