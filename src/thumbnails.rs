//! Thumbnail generation after save.
//!
//! When an image is saved, [`ThumbnailHook`] writes one scaled-down copy per
//! configured size. Copy `i` goes into a `.thumb<i>` folder next to the
//! original (below the optional `thumb_path`) under the original file name.
//!
//! # Supported Formats
//!
//! GIF, JPEG and PNG, detected from the content rather than the extension.
//! Thumbnails are encoded in the same format as their source.
//!
//! # Example
//!
//! ```toml
//! [plugins.thumbnails]
//! thumb_path = "/"
//! thumb = "100|200"
//! ```
//!
//! Saving `docs/cat.png` (400x100) then produces `docs/.thumb0/cat.png`
//! (100x25) and `docs/.thumb1/cat.png` (200x50).

use std::io::Cursor;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::config::ThumbnailOptions;
use crate::error::{Result, VolumeError};
use crate::hooks::{SaveEvent, SaveHook};
use crate::volume::Volume;

/// Name of the folder holding thumbnails of size slot `index`.
pub fn thumb_dir_name(index: usize) -> String {
    format!(".thumb{}", index)
}

/// Formats thumbnails are generated for.
const SUPPORTED_FORMATS: &[ImageFormat] = &[ImageFormat::Gif, ImageFormat::Jpeg, ImageFormat::Png];

/// Outcome of one thumbnail run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ThumbnailReport {
    /// Tree paths of the thumbnails written
    pub written: Vec<String>,
    /// Size slot indexes that failed
    pub failed: Vec<usize>,
}

/// Save hook producing resized copies of saved images.
#[derive(Debug, Clone)]
pub struct ThumbnailHook {
    options: ThumbnailOptions,
    sizes: Vec<Option<u32>>,
}

impl ThumbnailHook {
    /// Create the hook, parsing the size list up front.
    pub fn new(options: ThumbnailOptions) -> Result<Self> {
        let sizes = options.sizes()?;
        Ok(Self { options, sizes })
    }

    /// Configured size slots. `None` marks a disabled slot.
    pub fn sizes(&self) -> &[Option<u32>] {
        &self.sizes
    }

    /// Generate all thumbnails for a saved file.
    ///
    /// Content that is not a supported image is skipped. A failure in one
    /// size slot is logged and does not stop the others.
    pub async fn generate(&self, volume: &Volume, event: &SaveEvent) -> Result<ThumbnailReport> {
        let mut report = ThumbnailReport::default();
        if !self.options.enable || self.sizes.is_empty() {
            return Ok(report);
        }

        let format = match image::guess_format(&event.content) {
            Ok(format) if SUPPORTED_FORMATS.contains(&format) => format,
            _ => {
                tracing::debug!(path = %event.path, "not an image, no thumbnails");
                return Ok(report);
            }
        };
        let img = image::load_from_memory_with_format(&event.content, format)?;

        for (index, max) in self.sizes.iter().enumerate() {
            let Some(max) = *max else { continue };
            match self.generate_one(volume, event, &img, format, index, max).await {
                Ok(path) => report.written.push(path),
                Err(e) => {
                    tracing::warn!(
                        path = %event.path,
                        slot = index,
                        size = max,
                        error = %e,
                        "thumbnail failed"
                    );
                    report.failed.push(index);
                }
            }
        }

        tracing::debug!(
            path = %event.path,
            written = report.written.len(),
            failed = report.failed.len(),
            "thumbnails done"
        );
        Ok(report)
    }

    async fn generate_one(
        &self,
        volume: &Volume,
        event: &SaveEvent,
        img: &DynamicImage,
        format: ImageFormat,
        index: usize,
        max: u32,
    ) -> Result<String> {
        let codec = volume.codec();
        let base = codec.join(&event.dir, &self.options.thumb_path);
        let dir = codec.normalize(&codec.join(&base, &thumb_dir_name(index)));

        match volume.stat(&dir).await? {
            Some(stat) if stat.is_dir() => {}
            Some(_) => {
                let message = format!("'{}' exists and is not a folder", dir);
                return Err(VolumeError::InvalidPath(message));
            }
            None => {
                let (parent, name) = dir
                    .rsplit_once(codec.separator())
                    .unwrap_or(("", dir.as_str()));
                volume.create_directory(parent, name).await?;
            }
        }

        let data = resize_to_max(img, max, format)?;
        let path = codec.join(&dir, &event.name);
        volume.write_content(&path, data).await?;
        Ok(path)
    }
}

/// Scale `img` so its larger side is at most `max` and encode it as `format`.
///
/// Aspect ratio is kept and images are never enlarged.
pub fn resize_to_max(img: &DynamicImage, max: u32, format: ImageFormat) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let thumbnail = if width <= max && height <= max {
        img.clone()
    } else {
        img.resize(max, max, FilterType::Lanczos3)
    };

    let mut output = Vec::new();
    thumbnail.write_to(&mut Cursor::new(&mut output), format)?;
    Ok(output)
}

#[async_trait]
impl SaveHook for ThumbnailHook {
    fn name(&self) -> &str {
        "thumbnails"
    }

    async fn after_save(&self, volume: &Volume, event: &SaveEvent) -> Result<()> {
        self.generate(volume, event).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::config::{VolumeConfig, MEMORY_DRIVER};
    use crate::store::{MemoryStore, StoreOp};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    fn volume(options: ThumbnailOptions) -> (Arc<MemoryStore>, Volume) {
        let store = Arc::new(MemoryStore::new());
        let mut config = VolumeConfig {
            driver: MEMORY_DRIVER.to_string(),
            ..Default::default()
        };
        config.plugins.thumbnails = Some(options);
        (store.clone(), Volume::new(config, store).unwrap())
    }

    fn options(thumb: &str) -> ThumbnailOptions {
        ThumbnailOptions {
            thumb: thumb.to_string(),
            thumb_path: "/".to_string(),
            ..Default::default()
        }
    }

    fn dimensions(store: &MemoryStore, key: &str) -> (u32, u32) {
        let body = store.object(key).unwrap().body;
        image::load_from_memory(&body).unwrap().dimensions()
    }

    #[test]
    fn test_resize_never_enlarges() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(50, 50));
        let out = resize_to_max(&img, 100, ImageFormat::Png).unwrap();
        assert_eq!(image::load_from_memory(&out).unwrap().dimensions(), (50, 50));
    }

    #[test]
    fn test_resize_bounds_larger_side() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(100, 400));
        let out = resize_to_max(&img, 100, ImageFormat::Jpeg).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        assert_eq!(image::load_from_memory(&out).unwrap().dimensions(), (25, 100));
    }

    #[tokio::test]
    async fn test_small_image_is_copied_per_slot() {
        let (store, volume) = volume(options("100|200"));
        volume.save(&png(50, 50)[..], "docs", "p.png").await.unwrap();

        assert_eq!(dimensions(&store, "docs/.thumb0/p.png"), (50, 50));
        assert_eq!(dimensions(&store, "docs/.thumb1/p.png"), (50, 50));
        assert!(store.object("docs/.thumb0/").is_some());
        assert!(store.object("docs/.thumb1/").is_some());
    }

    #[tokio::test]
    async fn test_wide_image_is_scaled() {
        let (store, volume) = volume(options("100|200"));
        volume.save(&png(400, 100)[..], "docs", "wide.png").await.unwrap();

        assert_eq!(dimensions(&store, "docs/.thumb0/wide.png"), (100, 25));
        assert_eq!(dimensions(&store, "docs/.thumb1/wide.png"), (200, 50));
    }

    #[tokio::test]
    async fn test_disabled_slot_keeps_index() {
        let (store, volume) = volume(options("|64"));
        volume.save(&png(128, 128)[..], "", "p.png").await.unwrap();

        assert!(store.object(".thumb0/p.png").is_none());
        assert_eq!(dimensions(&store, ".thumb1/p.png"), (64, 64));
    }

    #[tokio::test]
    async fn test_existing_thumb_folder_is_reused() {
        let (store, volume) = volume(options("10"));
        store.insert("docs/.thumb0/", "");
        volume.save(&png(20, 20)[..], "docs", "p.png").await.unwrap();

        assert_eq!(
            store.operations_of(StoreOp::Put),
            vec!["docs/p.png".to_string(), "docs/.thumb0/p.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_disabled_plugin_only_stores_original() {
        let (store, volume) = volume(ThumbnailOptions {
            enable: false,
            ..options("100|200")
        });
        volume.save(&png(400, 100)[..], "docs", "p.png").await.unwrap();

        assert_eq!(store.operations().len(), 1);
        assert_eq!(store.keys(), vec!["docs/p.png".to_string()]);
    }

    #[tokio::test]
    async fn test_non_image_is_ignored() {
        let (store, volume) = volume(options("100"));
        volume.save(&b"plain text"[..], "docs", "a.png").await.unwrap();
        assert_eq!(store.keys(), vec!["docs/a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_slot() {
        let (store, volume) = volume(options("100|200"));
        store.fail_on(StoreOp::Put, "docs/.thumb0/p.png");

        let hook = ThumbnailHook::new(options("100|200")).unwrap();
        let event = SaveEvent {
            dir: "docs".to_string(),
            name: "p.png".to_string(),
            path: "docs/p.png".to_string(),
            content: Bytes::from(png(400, 100)),
        };
        let report = hook.generate(&volume, &event).await.unwrap();

        assert_eq!(report.failed, vec![0]);
        assert_eq!(report.written, vec!["docs/.thumb1/p.png".to_string()]);
    }

    #[tokio::test]
    async fn test_custom_thumb_path() {
        let (store, volume) = volume(ThumbnailOptions {
            thumb: "8".to_string(),
            thumb_path: "thumbs".to_string(),
            ..Default::default()
        });
        volume.save(&png(16, 16)[..], "docs", "p.png").await.unwrap();
        assert_eq!(dimensions(&store, "docs/thumbs/.thumb0/p.png"), (8, 8));
    }
}
