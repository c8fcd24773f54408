//! End-to-end behaviour of a volume over the in-memory store.

use std::io::Cursor;
use std::sync::Arc;

use bucketvol::store::StoreOp;
use bucketvol::{MemoryStore, PathCodec, ThumbnailOptions, Volume, VolumeConfig, VolumeError};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};

fn mount(root: &str) -> (Arc<MemoryStore>, Volume) {
    let store = Arc::new(MemoryStore::new());
    let config = VolumeConfig {
        driver: "memory".to_string(),
        root: root.to_string(),
        ..Default::default()
    };
    (store.clone(), Volume::new(config, store).unwrap())
}

fn mount_with_thumbnails(options: ThumbnailOptions) -> (Arc<MemoryStore>, Volume) {
    let store = Arc::new(MemoryStore::new());
    let mut config = VolumeConfig {
        driver: "memory".to_string(),
        ..Default::default()
    };
    config.plugins.thumbnails = Some(options);
    (store.clone(), Volume::new(config, store).unwrap())
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 128, 255])));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
    out
}

#[test]
fn test_path_normalization_laws() {
    let codec = PathCodec::default();
    for path in ["", "/", "a", "/a/b/", "a//b///c", "//x//"] {
        let once = codec.normalize(path);
        assert_eq!(codec.normalize(&once), once, "{:?}", path);
    }
    for (root, path) in [
        ("", "a/b"),
        ("files", "files/a/b"),
        ("/files/", "/files//a/"),
        ("files", "files"),
    ] {
        let relative = codec.relative_to(root, path);
        assert_eq!(codec.absolute_from(root, &relative), codec.normalize(path));
    }
}

#[tokio::test]
async fn test_root_is_always_a_folder() {
    let (store, volume) = mount("/");
    store.fail_on(StoreOp::List, "");
    let stat = volume.stat("/").await.unwrap().unwrap();
    assert!(stat.is_dir());
    assert_eq!(stat.size, 0);
    assert!(stat.readable && stat.writable);
}

#[tokio::test]
async fn test_listing_partitions_files_and_folders() {
    let (store, volume) = mount("/");
    store.insert("docs/a.txt", "a");
    store.insert("docs/sub/b.txt", "b");
    assert_eq!(volume.list("docs").await.unwrap(), vec!["docs/a.txt", "docs/sub"]);
}

#[tokio::test]
async fn test_empty_listing_means_not_found() {
    let (store, volume) = mount("/");
    store.insert("other/x.txt", "x");
    assert!(volume.list("docs").await.unwrap().is_empty());
    assert_eq!(volume.stat("docs").await.unwrap(), None);
}

#[tokio::test]
async fn test_created_file_reports_written_size() {
    let (_store, volume) = mount("/");
    let path = volume.create_file("/docs", "notes.txt").await.unwrap();
    assert_eq!(volume.stat(&path).await.unwrap().unwrap().size, 0);

    volume.write_content(&path, vec![b'x'; 1234]).await.unwrap();
    let stat = volume.stat(&path).await.unwrap().unwrap();
    assert_eq!(stat.size, 1234);
    assert_eq!(stat.mime, "text/plain");
}

#[tokio::test]
async fn test_move_relocates_content() {
    let (_store, volume) = mount("/");
    volume.write_content("docs/a.txt", "twelve bytes").await.unwrap();

    let target = volume.move_to("docs/a.txt", "archive", "a.txt").await.unwrap();
    assert_eq!(volume.stat("docs/a.txt").await.unwrap(), None);
    assert_eq!(volume.stat(&target).await.unwrap().unwrap().size, 12);
}

#[tokio::test]
async fn test_failed_source_delete_is_partial_move() {
    let (store, volume) = mount("/");
    volume.write_content("docs/a.txt", "content").await.unwrap();
    store.fail_on(StoreOp::Delete, "docs/a.txt");

    let err = volume.move_to("docs/a.txt", "archive", "a.txt").await.unwrap_err();
    assert!(matches!(err, VolumeError::PartialMove { .. }));
    assert_eq!(volume.get_contents("docs/a.txt").await.unwrap(), "content");
    assert_eq!(volume.get_contents("archive/a.txt").await.unwrap(), "content");
}

#[tokio::test]
async fn test_mounted_root_scopes_keys() {
    let (store, volume) = mount("/files");
    let dir = volume.create_directory("files", "docs").await.unwrap();
    volume.save(&b"x"[..], &dir, "a.txt").await.unwrap();

    assert_eq!(store.keys(), vec!["docs/".to_string(), "docs/a.txt".to_string()]);
    assert_eq!(volume.list("files").await.unwrap(), vec!["files/docs"]);
    assert_eq!(volume.display_path("files/docs/a.txt"), "s3/docs/a.txt");
    assert!(matches!(
        volume.stat("elsewhere/a.txt").await,
        Err(VolumeError::InvalidPath(_))
    ));
}

#[tokio::test]
async fn test_thumbnails_for_small_and_wide_images() {
    let (store, volume) = mount_with_thumbnails(ThumbnailOptions {
        thumb: "100|200".to_string(),
        thumb_path: "/".to_string(),
        ..Default::default()
    });

    volume.save(&png(50, 50)[..], "pics", "small.png").await.unwrap();
    volume.save(&png(400, 100)[..], "pics", "wide.png").await.unwrap();

    let dims = |key: &str| {
        let body = store.object(key).unwrap().body;
        image::load_from_memory(&body).unwrap().dimensions()
    };
    assert_eq!(dims("pics/.thumb0/small.png"), (50, 50));
    assert_eq!(dims("pics/.thumb1/small.png"), (50, 50));
    assert_eq!(dims("pics/.thumb0/wide.png"), (100, 25));
    assert_eq!(dims("pics/.thumb1/wide.png"), (200, 50));
}

#[tokio::test]
async fn test_disabled_thumbnails_have_no_side_effects() {
    let (store, volume) = mount_with_thumbnails(ThumbnailOptions {
        enable: false,
        thumb: "100|200".to_string(),
        ..Default::default()
    });

    volume.save(&png(400, 100)[..], "pics", "wide.png").await.unwrap();
    assert_eq!(
        store.operations(),
        vec![(StoreOp::Put, "pics/wide.png".to_string())]
    );
}
