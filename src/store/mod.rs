//! Object store capability consumed by the volume driver.
//!
//! The driver only needs a handful of flat-namespace calls: metadata lookup,
//! single-page prefix listing grouped at a delimiter, whole-body put,
//! server-side copy, delete and whole-body get. Missing keys are reported as
//! [`VolumeError::NotFound`](crate::VolumeError::NotFound); every other failure
//! is a [`VolumeError::Backend`](crate::VolumeError::Backend).

mod memory;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::Result;

pub use memory::{MemoryStore, StoreOp, StoredObject};
pub use s3::{S3Settings, S3Store};

/// Canned access policy applied to written objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Acl {
    /// Bucket default (owner only).
    #[default]
    Private,
    /// Anyone may read the object.
    PublicRead,
}

impl Acl {
    /// Value of the `x-amz-acl` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Acl::Private => "private",
            Acl::PublicRead => "public-read",
        }
    }
}

/// Result of a metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Key that was looked up
    pub key: String,
    /// Content length, when the backend reports it
    pub size: Option<u64>,
    /// Declared content type
    pub content_type: Option<String>,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
}

/// One object in a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Full object key
    pub key: String,
    /// Content length in bytes
    pub size: u64,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
}

/// A single page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Objects whose key has no delimiter past the prefix
    pub objects: Vec<ObjectSummary>,
    /// Keys grouped at the next delimiter, each ending in the delimiter
    pub common_prefixes: Vec<String>,
    /// More results exist beyond this page
    pub truncated: bool,
}

impl Listing {
    /// True when the page has neither objects nor common prefixes.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.common_prefixes.is_empty()
    }

    /// Every key-like entry of the page: object keys, then common prefixes.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.objects
            .iter()
            .map(|o| o.key.as_str())
            .chain(self.common_prefixes.iter().map(|p| p.as_str()))
    }
}

/// Flat, key-addressed object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Metadata lookup for exactly `key`.
    async fn head(&self, key: &str) -> Result<ObjectMeta>;

    /// First page of keys starting with `prefix`, grouped at `delimiter`.
    async fn list(&self, prefix: &str, delimiter: Option<char>) -> Result<Listing>;

    /// Store `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, body: Bytes, content_type: &str, acl: Acl) -> Result<()>;

    /// Server-side copy of `from` to `to`.
    async fn copy(&self, from: &str, to: &str, acl: Acl) -> Result<()>;

    /// Delete `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Whole-body read of `key`.
    async fn get(&self, key: &str) -> Result<Bytes>;
}

/// Parse the timestamp formats object stores emit (RFC 2822 in headers,
/// RFC 3339 in listings).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let a = parse_timestamp("2015-10-21T07:28:00.000Z").unwrap();
        let b = parse_timestamp("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_listing_entries() {
        let listing = Listing {
            objects: vec![ObjectSummary {
                key: "docs/a.txt".to_string(),
                size: 3,
                last_modified: None,
            }],
            common_prefixes: vec!["docs/sub/".to_string()],
            truncated: false,
        };
        assert!(!listing.is_empty());
        let entries: Vec<&str> = listing.entries().collect();
        assert_eq!(entries, vec!["docs/a.txt", "docs/sub/"]);
        assert!(Listing::default().is_empty());
    }

    #[test]
    fn test_acl_header_values() {
        assert_eq!(Acl::PublicRead.as_str(), "public-read");
        assert_eq!(Acl::default().as_str(), "private");
    }
}
