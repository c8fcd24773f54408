//! Object content access.
//!
//! Objects are read and written whole. Callers that need a file handle get one
//! backed by a temporary file, which is removed when the handle is dropped.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::fs::mime::content_type_for;
use crate::hooks::SaveEvent;
use crate::store::Acl;
use crate::volume::Volume;

const SPOOL_PREFIX: &str = "bucketvol-";

/// Read handle over a downloaded object.
#[derive(Debug)]
pub struct ContentReader {
    path: String,
    len: u64,
    file: NamedTempFile,
}

impl ContentReader {
    /// Tree path of the object.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Location of the local copy.
    pub fn local_path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the object in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True for a zero-length object.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Read for ContentReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for ContentReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Write handle that uploads on [`commit`](ContentWriter::commit).
///
/// Dropping the writer without committing discards everything written.
#[derive(Debug)]
pub struct ContentWriter<'a> {
    volume: &'a Volume,
    path: String,
    file: NamedTempFile,
}

impl ContentWriter<'_> {
    /// Tree path the content will be stored at.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Location of the local spool file.
    pub fn local_path(&self) -> &Path {
        self.file.path()
    }

    /// Upload the spooled content and remove the spool file.
    pub async fn commit(mut self) -> Result<()> {
        self.file.flush()?;
        self.file.seek(SeekFrom::Start(0))?;
        let mut content = Vec::new();
        self.file.read_to_end(&mut content)?;
        self.volume.write_content(&self.path, content).await
    }
}

impl Write for ContentWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Volume {
    /// Read the whole content of the file at `path`.
    pub async fn get_contents(&self, path: &str) -> Result<Bytes> {
        let key = self.key(path)?;
        let content = self.store().get(&key).await?;
        tracing::debug!(path = %path, size = content.len(), "read content");
        Ok(content)
    }

    /// Replace the content of the file at `path`.
    ///
    /// Stored public-read with a content type from the extension table.
    pub async fn write_content(&self, path: &str, content: impl Into<Bytes>) -> Result<()> {
        let path = self.codec().normalize(path);
        let key = self.non_root_key(&path, "write")?;
        let content = content.into();
        let size = content.len();

        self.store()
            .put(&key, content, content_type_for(&path), Acl::PublicRead)
            .await?;

        tracing::info!(path = %path, size, "wrote content");
        Ok(())
    }

    /// Download the file at `path` into a temporary file and open it.
    pub async fn open_for_read(&self, path: &str) -> Result<ContentReader> {
        let content = self.get_contents(path).await?;
        let mut file = self.spool_file()?;
        file.write_all(&content)?;
        file.seek(SeekFrom::Start(0))?;

        Ok(ContentReader {
            path: self.codec().normalize(path),
            len: content.len() as u64,
            file,
        })
    }

    /// Open a write handle for `path`. Nothing is uploaded until
    /// [`ContentWriter::commit`].
    pub fn open_for_write(&self, path: &str) -> Result<ContentWriter<'_>> {
        let path = self.codec().normalize(path);
        self.non_root_key(&path, "write")?;

        Ok(ContentWriter {
            volume: self,
            path,
            file: self.spool_file()?,
        })
    }

    /// Store everything from `reader` as `dir/name` and notify save hooks.
    ///
    /// Hook failures are logged, never returned. Returns the stored tree path.
    pub async fn save<R>(&self, mut reader: R, dir: &str, name: &str) -> Result<String>
    where
        R: AsyncRead + Unpin + Send,
    {
        let path = self.child_path(dir, name)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        let content = Bytes::from(buf);

        self.write_content(&path, content.clone()).await?;

        let event = SaveEvent {
            dir: self.codec().normalize(dir),
            name: name.to_string(),
            path: path.clone(),
            content,
        };
        self.dispatch_save(&event).await;
        Ok(path)
    }

    fn spool_file(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SPOOL_PREFIX);
        let file = match &self.config().tmp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }
}
