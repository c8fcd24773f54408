//! Static extension to MIME type table.

/// Mime reported for folders.
pub const DIRECTORY_MIME: &str = "directory";

/// Content type stored on folder marker objects.
pub const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";

/// Fallback content type for uploads with an unknown extension.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Fallback mime reported by `stat` when nothing better is known.
pub const TEXT_PLAIN: &str = "text/plain";

const MIME_TYPES: &[(&str, &str)] = &[
    // text
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("log", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("yml", "text/yaml"),
    ("yaml", "text/yaml"),
    ("rtf", "text/rtf"),
    ("php", "text/x-php"),
    ("py", "text/x-python"),
    ("rs", "text/x-rust"),
    ("c", "text/x-c"),
    ("h", "text/x-c"),
    ("sh", "application/x-sh"),
    ("sql", "text/x-sql"),
    // images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/x-ms-bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("psd", "image/vnd.adobe.photoshop"),
    // documents
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    // archives
    ("zip", "application/zip"),
    ("gz", "application/x-gzip"),
    ("tgz", "application/x-gzip"),
    ("bz", "application/x-bzip2"),
    ("bz2", "application/x-bzip2"),
    ("tar", "application/x-tar"),
    ("rar", "application/x-rar"),
    ("7z", "application/x-7z-compressed"),
    // audio / video
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
];

/// Lowercased extension of the last path segment, if any.
pub fn extension(path: &str) -> Option<String> {
    let name = path
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Look up the mime type for a path by its extension.
///
/// Case-insensitive.
///
/// # Example
/// ```
/// use bucketvol::fs::mime::from_path;
///
/// assert_eq!(from_path("notes/TODO.TXT"), Some("text/plain"));
/// assert_eq!(from_path("photo.jpeg"), Some("image/jpeg"));
/// assert_eq!(from_path("Makefile"), None);
/// ```
pub fn from_path(path: &str) -> Option<&'static str> {
    let ext = extension(path)?;
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Content type used when storing an object at `path`.
pub fn content_type_for(path: &str) -> &'static str {
    from_path(path).unwrap_or(OCTET_STREAM)
}
