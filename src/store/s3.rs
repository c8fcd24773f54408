//! S3 object store backed by `rust-s3`.

use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;
use tokio::sync::Mutex;

use super::{parse_timestamp, Acl, Listing, ObjectMeta, ObjectStore, ObjectSummary};
use crate::error::{Result, VolumeError};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

/// Object store talking to an S3-compatible service.
///
/// The bucket handle is built on first use and reused afterwards.
pub struct S3Store {
    settings: S3Settings,
    bucket: Mutex<Option<Bucket>>,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.settings.bucket)
            .field("region", &self.settings.region)
            .field("endpoint", &self.settings.endpoint)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    /// Create a store. No network call is made until the first operation.
    pub fn new(settings: S3Settings) -> Result<Self> {
        if settings.bucket.is_empty()
            || settings.region.is_empty()
            || settings.access_key.is_empty()
            || settings.secret_key.is_empty()
        {
            return Err(VolumeError::Config(
                "bucket, region, access_key and secret_key are required".to_string(),
            ));
        }

        Ok(Self {
            settings,
            bucket: Mutex::new(None),
        })
    }

    async fn bucket(&self) -> Result<Bucket> {
        let mut guard = self.bucket.lock().await;
        if let Some(bucket) = guard.as_ref() {
            return Ok(bucket.clone());
        }

        let region = match &self.settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: self.settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => self.settings.region.parse::<Region>().map_err(|e| {
                VolumeError::Config(format!("Invalid region '{}': {}", self.settings.region, e))
            })?,
        };

        let credentials = Credentials::new(
            Some(&self.settings.access_key),
            Some(&self.settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| VolumeError::Config(format!("Invalid credentials: {}", e)))?;

        let mut bucket = Bucket::new(&self.settings.bucket, region, credentials)
            .map_err(|e| VolumeError::Config(format!("Failed to open bucket: {}", e)))?;
        if self.settings.path_style {
            bucket = bucket.with_path_style();
        }

        let bucket: Bucket = *bucket;
        tracing::debug!(bucket = %self.settings.bucket, "initialized S3 bucket handle");
        *guard = Some(bucket.clone());
        Ok(bucket)
    }

    async fn bucket_with_acl(&self, acl: Acl) -> Result<Bucket> {
        let mut bucket = self.bucket().await?;
        if acl != Acl::Private {
            bucket.add_header("x-amz-acl", acl.as_str());
        }
        Ok(bucket)
    }
}

fn map_s3_error(operation: &'static str, key: &str, err: S3Error) -> VolumeError {
    match err {
        S3Error::HttpFailWithBody(404, _) => VolumeError::NotFound(key.to_string()),
        other => VolumeError::backend(operation, key, other),
    }
}

fn check_status(operation: &'static str, key: &str, status: u16) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(VolumeError::NotFound(key.to_string())),
        code => Err(VolumeError::backend(
            operation,
            key,
            format!("unexpected HTTP status {}", code),
        )),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn head(&self, key: &str) -> Result<ObjectMeta> {
        let bucket = self.bucket().await?;
        let (head, status) = bucket
            .head_object(key)
            .await
            .map_err(|e| map_s3_error("head", key, e))?;
        check_status("head", key, status)?;

        Ok(ObjectMeta {
            key: key.to_string(),
            size: head.content_length.and_then(|len| u64::try_from(len).ok()),
            content_type: head.content_type,
            last_modified: head.last_modified.as_deref().and_then(parse_timestamp),
        })
    }

    async fn list(&self, prefix: &str, delimiter: Option<char>) -> Result<Listing> {
        let bucket = self.bucket().await?;
        let (page, status) = bucket
            .list_page(
                prefix.to_string(),
                delimiter.map(|d| d.to_string()),
                None,
                None,
                None,
            )
            .await
            .map_err(|e| map_s3_error("list", prefix, e))?;
        check_status("list", prefix, status)?;

        Ok(Listing {
            objects: page
                .contents
                .into_iter()
                .map(|object| ObjectSummary {
                    last_modified: parse_timestamp(&object.last_modified),
                    key: object.key,
                    size: object.size,
                })
                .collect(),
            common_prefixes: page
                .common_prefixes
                .unwrap_or_default()
                .into_iter()
                .map(|p| p.prefix)
                .collect(),
            truncated: page.is_truncated,
        })
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str, acl: Acl) -> Result<()> {
        let bucket = self.bucket_with_acl(acl).await?;
        let response = bucket
            .put_object_with_content_type(key, &body, content_type)
            .await
            .map_err(|e| map_s3_error("put", key, e))?;
        check_status("put", key, response.status_code())
    }

    async fn copy(&self, from: &str, to: &str, acl: Acl) -> Result<()> {
        let bucket = self.bucket_with_acl(acl).await?;
        let status = bucket
            .copy_object_internal(from, to)
            .await
            .map_err(|e| map_s3_error("copy", from, e))?;
        check_status("copy", from, status)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let bucket = self.bucket().await?;
        let response = bucket
            .delete_object(key)
            .await
            .map_err(|e| map_s3_error("delete", key, e))?;
        match check_status("delete", key, response.status_code()) {
            Err(VolumeError::NotFound(_)) => Ok(()),
            other => other,
        }
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let bucket = self.bucket().await?;
        let response = bucket
            .get_object(key)
            .await
            .map_err(|e| map_s3_error("get", key, e))?;
        check_status("get", key, response.status_code())?;
        Ok(response.bytes().clone())
    }
}
