//! # bucketvol
//!
//! File-manager volume driver for S3-compatible object stores.
//!
//! Object stores are flat: keys, no folders, no rename. This crate presents a
//! bucket as a directory tree to a file-manager connector.
//!
//! ## Features
//!
//! - **Paths**: tree paths map to object keys below a configurable volume root.
//! - **Folders**: emulated with zero-length `name/` marker objects and prefix
//!   listings, so folders that only exist implicitly still show up.
//! - **Filesystem Operations**:
//!   - Get file attributes (`stat`) and list folders (`list`).
//!   - Create folders and empty files.
//!   - Copy, move (copy + delete) and delete files and folder markers.
//! - **Content**:
//!   - Whole-object reads and writes.
//!   - File handles spooled through temporary files.
//!   - `save` with post-save hooks, e.g. thumbnail generation for images.
//! - **Drivers**: an `s3` driver and an in-process `memory` driver behind one
//!   [`VolumeDriver`] trait, created by identifier from a [`DriverRegistry`].
//!
//! Nothing is cached: every call goes to the store, so paths always reflect
//! the current bucket contents.
//!
//! ## Example: Basic Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bucketvol::{S3Store, Volume, VolumeConfig};
//!
//! # async fn example() -> bucketvol::Result<()> {
//! let config = VolumeConfig::load("volume.toml")?;
//! let store = Arc::new(S3Store::new(config.s3_settings())?);
//! let volume = Volume::new(config, store)?;
//!
//! // List the bucket root
//! for path in volume.list("/").await? {
//!     println!("{}", path);
//! }
//!
//! // Create a folder and upload into it
//! let dir = volume.create_directory("/", "docs").await?;
//! volume.save(&b"hello"[..], &dir, "hello.txt").await?;
//!
//! if let Some(stat) = volume.stat("docs/hello.txt").await? {
//!     println!("{} bytes, {}", stat.size, stat.mime);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod fs;
pub mod hooks;
pub mod store;
pub mod thumbnails;
mod volume;

// Re-export commonly used types
pub use config::{MimeDetect, ThumbnailOptions, VolumeConfig};
pub use driver::{DriverFactory, DriverRegistry, VolumeDriver};
pub use error::{Result, VolumeError};
pub use fs::{ContentReader, ContentWriter, FileStat, PathCodec};
pub use hooks::{SaveEvent, SaveHook};
pub use store::{Acl, MemoryStore, ObjectStore, S3Store};
pub use thumbnails::{ThumbnailHook, ThumbnailReport};
pub use volume::Volume;
