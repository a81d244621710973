//! Request-scoped upload spool.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// An uploaded file spooled to disk for the duration of one conversion.
///
/// The spool lives under a generated key, never under the client-supplied
/// name. Call [`SpooledUpload::remove`] once the conversion attempt is
/// over; if the owning future is dropped first, `Drop` removes the file
/// synchronously.
#[derive(Debug)]
pub struct SpooledUpload {
    /// Absolute spool path.
    path: PathBuf,
    /// Client-supplied filename (untrusted).
    original_name: String,
    /// Bytes written to the spool.
    size: u64,
    /// Set once the spool file has been removed.
    removed: bool,
}

impl SpooledUpload {
    pub(crate) fn new(path: PathBuf, original_name: String) -> Self {
        Self {
            path,
            original_name,
            size: 0,
            removed: false,
        }
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    /// Spool file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Client-supplied filename.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Number of bytes spooled.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Delete the spool file.
    ///
    /// A missing file counts as removed. Other failures are logged and
    /// returned; `Drop` will not retry them.
    pub async fn remove(mut self) -> std::io::Result<()> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed upload spool");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove upload spool"
                );
                Err(e)
            }
        }
    }
}

impl Drop for SpooledUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed abandoned upload spool"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove abandoned upload spool"
            ),
        }
    }
}
