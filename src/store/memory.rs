//! In-process object store.
//!
//! Mirrors the S3 listing rules (prefix match, grouping at the delimiter,
//! lexicographic key order) so the driver behaves the same against it as
//! against a real bucket. Operations are logged and individual calls can be
//! made to fail, which lets tests observe side effects and simulate outages.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{Acl, Listing, ObjectMeta, ObjectStore, ObjectSummary};
use crate::error::{Result, VolumeError};

/// Kind of store call, used for the operation log and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Head,
    List,
    Put,
    Copy,
    Delete,
    Get,
}

impl StoreOp {
    fn name(&self) -> &'static str {
        match self {
            StoreOp::Head => "head",
            StoreOp::List => "list",
            StoreOp::Put => "put",
            StoreOp::Copy => "copy",
            StoreOp::Delete => "delete",
            StoreOp::Get => "get",
        }
    }
}

/// An object held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub acl: Acl,
    pub last_modified: DateTime<Utc>,
}

/// Ordered in-memory object store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failures: Mutex<HashSet<(StoreOp, String)>>,
    log: Mutex<Vec<(StoreOp, String)>>,
    page_size: Option<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit listings to `page_size` entries per page, like a real bucket's
    /// `max-keys`.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Seed an object directly, bypassing the log.
    pub fn insert(&self, key: &str, body: impl Into<Bytes>) {
        let body = body.into();
        lock(&self.objects).insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: crate::fs::mime::content_type_for(key).to_string(),
                acl: Acl::Private,
                last_modified: Utc::now(),
            },
        );
    }

    /// Make every `op` call on exactly `key` fail with a backend error.
    pub fn fail_on(&self, op: StoreOp, key: &str) {
        lock(&self.failures).insert((op, key.to_string()));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    /// Stored object for `key`, if any.
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        lock(&self.objects).get(key).cloned()
    }

    /// All keys in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }

    /// Calls made so far, in order.
    pub fn operations(&self) -> Vec<(StoreOp, String)> {
        lock(&self.log).clone()
    }

    /// Calls of one kind made so far.
    pub fn operations_of(&self, op: StoreOp) -> Vec<String> {
        lock(&self.log)
            .iter()
            .filter(|(o, _)| *o == op)
            .map(|(_, key)| key.clone())
            .collect()
    }

    /// Forget the operation log.
    pub fn clear_log(&self) {
        lock(&self.log).clear();
    }

    fn record(&self, op: StoreOp, key: &str) -> Result<()> {
        lock(&self.log).push((op, key.to_string()));
        if lock(&self.failures).contains(&(op, key.to_string())) {
            return Err(VolumeError::backend(op.name(), key, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn head(&self, key: &str) -> Result<ObjectMeta> {
        self.record(StoreOp::Head, key)?;
        let objects = lock(&self.objects);
        let object = objects
            .get(key)
            .ok_or_else(|| VolumeError::NotFound(key.to_string()))?;

        Ok(ObjectMeta {
            key: key.to_string(),
            size: Some(object.body.len() as u64),
            content_type: Some(object.content_type.clone()),
            last_modified: Some(object.last_modified),
        })
    }

    async fn list(&self, prefix: &str, delimiter: Option<char>) -> Result<Listing> {
        self.record(StoreOp::List, prefix)?;
        let objects = lock(&self.objects);
        let mut listing = Listing::default();
        let mut count = 0usize;

        for (key, object) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }

            let rest = &key[prefix.len()..];
            let grouped = delimiter
                .and_then(|d| rest.find(d).map(|idx| idx + d.len_utf8()))
                .map(|end| format!("{}{}", prefix, &rest[..end]));

            if let Some(common) = &grouped {
                if listing.common_prefixes.last() == Some(common) {
                    continue;
                }
            }

            if self.page_size.is_some_and(|size| count >= size) {
                listing.truncated = true;
                break;
            }
            count += 1;

            match grouped {
                Some(common) => listing.common_prefixes.push(common),
                None => listing.objects.push(ObjectSummary {
                    key: key.clone(),
                    size: object.body.len() as u64,
                    last_modified: Some(object.last_modified),
                }),
            }
        }

        Ok(listing)
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str, acl: Acl) -> Result<()> {
        self.record(StoreOp::Put, key)?;
        lock(&self.objects).insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                acl,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str, acl: Acl) -> Result<()> {
        self.record(StoreOp::Copy, from)?;
        let mut objects = lock(&self.objects);
        let source = objects
            .get(from)
            .cloned()
            .ok_or_else(|| VolumeError::NotFound(from.to_string()))?;

        objects.insert(
            to.to_string(),
            StoredObject {
                acl,
                last_modified: Utc::now(),
                ..source
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.record(StoreOp::Delete, key)?;
        lock(&self.objects).remove(key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.record(StoreOp::Get, key)?;
        lock(&self.objects)
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| VolumeError::NotFound(key.to_string()))
    }
}
