//! Tree path algebra.
//!
//! Tree paths are separator-delimited strings in the file manager's namespace.
//! The normalized form has no leading, trailing or doubled separators, so the
//! bucket-level root normalizes to the empty string. Object keys are tree
//! paths with the volume root stripped.

use crate::error::{Result, VolumeError};

/// Pure string operations over tree paths for one separator character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCodec {
    separator: char,
}

impl Default for PathCodec {
    fn default() -> Self {
        Self::new('/')
    }
}

impl PathCodec {
    /// Create a codec for the given separator.
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// The separator character.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Collapse doubled separators and strip one leading and one trailing
    /// separator.
    ///
    /// # Example
    /// ```
    /// use bucketvol::fs::PathCodec;
    ///
    /// let codec = PathCodec::default();
    /// assert_eq!(codec.normalize("/docs//a.txt/"), "docs/a.txt");
    /// assert_eq!(codec.normalize("/"), "");
    /// ```
    pub fn normalize(&self, path: &str) -> String {
        let sep = self.separator;
        let mut collapsed = String::with_capacity(path.len());
        let mut prev_sep = false;
        for c in path.chars() {
            if c == sep {
                if prev_sep {
                    continue;
                }
                prev_sep = true;
            } else {
                prev_sep = false;
            }
            collapsed.push(c);
        }

        let trimmed = collapsed.strip_prefix(sep).unwrap_or(&collapsed);
        let trimmed = trimmed.strip_suffix(sep).unwrap_or(trimmed);
        trimmed.to_string()
    }

    /// Parent directory of `path`, always with a leading separator.
    ///
    /// Fails with [`VolumeError::InvalidPath`] when the path has no separator
    /// once a trailing one is removed.
    pub fn dirname(&self, path: &str) -> Result<String> {
        let sep = self.separator;
        let trimmed = path.strip_suffix(sep).unwrap_or(path);
        let idx = trimmed
            .rfind(sep)
            .ok_or_else(|| VolumeError::InvalidPath(format!("no parent in '{}'", path)))?;

        let parent = &trimmed[..idx];
        if parent.starts_with(sep) {
            Ok(parent.to_string())
        } else {
            Ok(format!("{}{}", sep, parent))
        }
    }

    /// Substring after the last separator.
    pub fn basename<'a>(&self, path: &'a str) -> &'a str {
        path.rsplit(self.separator).next().unwrap_or(path)
    }

    /// Join a directory and a name with exactly one separator.
    ///
    /// No normalization is applied; an empty directory yields the name.
    pub fn join(&self, dir: &str, name: &str) -> String {
        let sep = self.separator;
        let name = name.strip_prefix(sep).unwrap_or(name);
        if dir.is_empty() {
            name.to_string()
        } else if dir.ends_with(sep) {
            format!("{}{}", dir, name)
        } else {
            format!("{}{}{}", dir, sep, name)
        }
    }

    /// Path relative to `root`.
    ///
    /// Empty when `path` is the root itself. The caller must guarantee that
    /// `path` lies under `root`; otherwise the result is empty.
    pub fn relative_to(&self, root: &str, path: &str) -> String {
        let root = self.normalize(root);
        let path = self.normalize(path);

        if path == root {
            return String::new();
        }
        if root.is_empty() {
            return path;
        }

        let prefix = format!("{}{}", root, self.separator);
        path.strip_prefix(&prefix).unwrap_or_default().to_string()
    }

    /// Inverse of [`relative_to`](Self::relative_to).
    pub fn absolute_from(&self, root: &str, relative: &str) -> String {
        let root = self.normalize(root);
        let relative = self.normalize(relative);

        if relative.is_empty() {
            root
        } else if root.is_empty() {
            relative
        } else {
            format!("{}{}{}", root, self.separator, relative)
        }
    }

    /// True when `path` equals `ancestor` or lies below it.
    pub fn is_descendant_or_self(&self, path: &str, ancestor: &str) -> bool {
        let path = self.normalize(path);
        let ancestor = self.normalize(ancestor);

        if ancestor.is_empty() || path == ancestor {
            return true;
        }
        path.starts_with(&format!("{}{}", ancestor, self.separator))
    }

    /// Object key for a tree path under `root`.
    ///
    /// Unlike [`relative_to`](Self::relative_to) this checks containment, since
    /// an empty key would address the whole bucket.
    pub fn object_key(&self, root: &str, path: &str) -> Result<String> {
        if !self.is_descendant_or_self(path, root) {
            return Err(VolumeError::InvalidPath(format!(
                "'{}' is outside volume root '{}'",
                path, root
            )));
        }
        Ok(self.relative_to(root, path))
    }

    /// Tree path for an object key under `root`.
    pub fn tree_path(&self, root: &str, key: &str) -> String {
        self.absolute_from(root, key)
    }

    /// User-facing path: the root display name followed by the relative path.
    pub fn display_path(&self, root_name: &str, root: &str, path: &str) -> String {
        let relative = self.relative_to(root, path);
        if relative.is_empty() {
            root_name.to_string()
        } else {
            format!("{}{}{}", root_name, self.separator, relative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let codec = PathCodec::default();
        assert_eq!(codec.normalize("/"), "");
        assert_eq!(codec.normalize(""), "");
        assert_eq!(codec.normalize("/foo"), "foo");
        assert_eq!(codec.normalize("/foo/"), "foo");
        assert_eq!(codec.normalize("/foo//bar"), "foo/bar");
        assert_eq!(codec.normalize("foo///bar//"), "foo/bar");
        assert_eq!(codec.normalize("foo"), "foo");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let codec = PathCodec::default();
        for p in ["", "/", "//", "a", "/a/", "a//b///c/", "///x//y", "docs/sub/"] {
            let once = codec.normalize(p);
            assert_eq!(codec.normalize(&once), once, "input {:?}", p);
        }
    }

    #[test]
    fn test_custom_separator() {
        let codec = PathCodec::new('\\');
        assert_eq!(codec.normalize("\\a\\\\b\\"), "a\\b");
        assert_eq!(codec.join("a", "b"), "a\\b");
        assert_eq!(codec.basename("a\\b\\c.txt"), "c.txt");
    }

    #[test]
    fn test_dirname() {
        let codec = PathCodec::default();
        assert_eq!(codec.dirname("docs/a.txt").unwrap(), "/docs");
        assert_eq!(codec.dirname("/docs/sub/").unwrap(), "/docs");
        assert_eq!(codec.dirname("/docs").unwrap(), "/");
        assert!(matches!(
            codec.dirname("docs"),
            Err(VolumeError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_basename_and_join() {
        let codec = PathCodec::default();
        assert_eq!(codec.basename("docs/a.txt"), "a.txt");
        assert_eq!(codec.basename("a.txt"), "a.txt");
        assert_eq!(codec.join("docs", "a.txt"), "docs/a.txt");
        assert_eq!(codec.join("docs/", "a.txt"), "docs/a.txt");
        assert_eq!(codec.join("", "a.txt"), "a.txt");
    }

    #[test]
    fn test_relative_absolute_round_trip() {
        let codec = PathCodec::default();
        for root in ["", "/", "files", "/files/"] {
            for p in ["docs/a.txt", "/docs//sub/", "x"] {
                let full = codec.absolute_from(root, p);
                let rel = codec.relative_to(root, &full);
                assert_eq!(codec.absolute_from(root, &rel), codec.normalize(&full));
            }
        }
        assert_eq!(codec.relative_to("/files", "/files"), "");
        assert_eq!(codec.relative_to("/files", "/files/a/b"), "a/b");
        assert_eq!(codec.absolute_from("/files", ""), "files");
        assert_eq!(codec.absolute_from("/files/", "//a//b"), "files/a/b");
    }

    #[test]
    fn test_is_descendant_or_self() {
        let codec = PathCodec::default();
        assert!(codec.is_descendant_or_self("docs", "docs"));
        assert!(codec.is_descendant_or_self("docs/a", "docs"));
        assert!(!codec.is_descendant_or_self("docs2/a", "docs"));
        assert!(codec.is_descendant_or_self("anything", "/"));
    }

    #[test]
    fn test_object_key_requires_containment() {
        let codec = PathCodec::default();
        assert_eq!(codec.object_key("/files", "/files/docs/a.txt").unwrap(), "docs/a.txt");
        assert_eq!(codec.object_key("/", "/docs/").unwrap(), "docs");
        assert!(codec.object_key("/files", "/other/a.txt").is_err());
        assert_eq!(codec.tree_path("/files", "docs/a.txt"), "files/docs/a.txt");
    }

    #[test]
    fn test_display_path() {
        let codec = PathCodec::default();
        assert_eq!(codec.display_path("s3", "/", "/"), "s3");
        assert_eq!(codec.display_path("s3", "/", "docs/a.txt"), "s3/docs/a.txt");
    }
}
