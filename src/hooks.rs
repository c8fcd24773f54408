//! Post-save notifications.
//!
//! After [`Volume::save`](crate::Volume::save) stores new content it hands a
//! [`SaveEvent`] to every registered [`SaveHook`], in registration order. A
//! failing hook is logged and skipped; it never fails the save.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::volume::Volume;

/// Payload describing a completed save.
#[derive(Debug, Clone)]
pub struct SaveEvent {
    /// Directory the file was saved into (normalized tree path)
    pub dir: String,
    /// File name as given by the caller
    pub name: String,
    /// Resulting tree path of the stored file
    pub path: String,
    /// The stored content
    pub content: Bytes,
}

/// Receiver of [`SaveEvent`]s.
#[async_trait]
pub trait SaveHook: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Called once per successful save.
    async fn after_save(&self, volume: &Volume, event: &SaveEvent) -> Result<()>;
}

impl Volume {
    pub(crate) async fn dispatch_save(&self, event: &SaveEvent) {
        for hook in self.hooks() {
            match hook.after_save(self, event).await {
                Ok(()) => tracing::debug!(hook = hook.name(), path = %event.path, "save hook done"),
                Err(e) => tracing::warn!(
                    hook = hook.name(),
                    path = %event.path,
                    error = %e,
                    "save hook failed"
                ),
            }
        }
    }
}
