//! Local filesystem store for upload spools and converted files.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use convgate_core::config::StorageConfig;
use convgate_core::error::{AppError, ErrorKind};
use convgate_core::result::AppResult;

use crate::ByteStream;
use crate::naming::{content_type_for, validate_download_name};
use crate::spool::SpooledUpload;

/// A converted file opened for streaming.
pub struct StoredFile {
    /// File name within the converted directory.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type derived from the extension.
    pub content_type: &'static str,
    /// File contents.
    pub stream: ByteStream,
}

impl std::fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Listing entry for a converted file.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFileMeta {
    /// File name within the converted directory.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// Local filesystem store.
///
/// Layout under the data root:
/// - `uploads/` holds `<uuid>.upload` spools, one per in-flight request;
/// - `converted/` holds converted files, named by sanitized stem;
/// - `viewers/` holds generated `model-<uuid>.html` viewer pages.
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Directory holding upload spools.
    uploads_dir: PathBuf,
    /// Directory holding converted files.
    converted_dir: PathBuf,
    /// Directory holding viewer pages.
    viewers_dir: PathBuf,
}

impl LocalStore {
    /// Create the store, creating its directories if needed.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let store = Self {
            uploads_dir: config.uploads_dir(),
            converted_dir: config.converted_dir(),
            viewers_dir: config.viewers_dir(),
        };
        for dir in [&store.uploads_dir, &store.converted_dir, &store.viewers_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create storage directory: {}", dir.display()),
                    e,
                )
            })?;
        }
        Ok(store)
    }

    /// Directory holding upload spools.
    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Directory holding converted files.
    pub fn converted_dir(&self) -> &Path {
        &self.converted_dir
    }

    /// Directory holding viewer pages.
    pub fn viewers_dir(&self) -> &Path {
        &self.viewers_dir
    }

    /// Whether the spool and converted directories exist.
    pub async fn health_check(&self) -> bool {
        let uploads = fs::metadata(&self.uploads_dir).await;
        let converted = fs::metadata(&self.converted_dir).await;
        matches!((uploads, converted), (Ok(u), Ok(c)) if u.is_dir() && c.is_dir())
    }

    /// Write an upload stream to a fresh spool file.
    ///
    /// Fails with `PayloadTooLarge` once more than `limit` bytes arrive;
    /// the partial spool is removed on every error path.
    pub async fn spool_upload<S, E>(
        &self,
        original_name: &str,
        mut stream: S,
        limit: Option<u64>,
    ) -> AppResult<SpooledUpload>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Into<AppError>,
    {
        let path = self
            .uploads_dir
            .join(format!("{}.upload", Uuid::new_v4().simple()));
        let mut spool = SpooledUpload::new(path, original_name.to_string());

        let mut file = fs::File::create(spool.path()).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create upload spool", e)
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Into::<AppError>::into)?;
            total_bytes += chunk.len() as u64;
            if let Some(max) = limit {
                if total_bytes > max {
                    return Err(AppError::payload_too_large(format!(
                        "Upload exceeds the {max} byte limit"
                    )));
                }
            }
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write upload chunk", e)
            })?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush spool", e))?;

        spool.set_size(total_bytes);
        debug!(
            path = %spool.path().display(),
            bytes = total_bytes,
            "Spooled upload"
        );
        Ok(spool)
    }

    /// Spool a copy of a local file, leaving the original untouched.
    pub async fn spool_local_file(&self, source: &Path) -> AppResult<SpooledUpload> {
        let original_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = fs::File::open(source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {}", source.display()))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open file: {}", source.display()),
                    e,
                )
            }
        })?;
        self.spool_upload(&original_name, ReaderStream::new(file), None)
            .await
    }

    /// Write a converted file atomically under `name`.
    ///
    /// Bytes go to a hidden temp file that is renamed into place once
    /// complete, so readers never observe a partial file. An existing file
    /// with the same name is replaced.
    pub async fn write_converted<S, E>(&self, name: &str, mut stream: S) -> AppResult<u64>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Into<AppError>,
    {
        validate_download_name(name)?;
        let final_path = self.converted_dir.join(name);
        // Fixed-length temp name: `name` may already be at the length limit
        let temp_path = self
            .converted_dir
            .join(format!(".{}.part", Uuid::new_v4().simple()));

        let result = async {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create file: {name}"),
                    e,
                )
            })?;

            let mut total_bytes = 0u64;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(Into::<AppError>::into)?;
                total_bytes += chunk.len() as u64;
                file.write_all(&chunk).await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to write chunk", e)
                })?;
            }

            file.flush().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to flush file", e)
            })?;
            drop(file);

            fs::rename(&temp_path, &final_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to move converted file into place: {name}"),
                    e,
                )
            })?;
            Ok::<u64, AppError>(total_bytes)
        }
        .await;

        match result {
            Ok(total_bytes) => {
                debug!(name, bytes = total_bytes, "Wrote converted file");
                Ok(total_bytes)
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                Err(e)
            }
        }
    }

    /// Open a converted file for streaming.
    pub async fn open_converted(&self, name: &str) -> AppResult<StoredFile> {
        validate_download_name(name)?;
        let full_path = self.converted_dir.join(name);

        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {name}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open file: {name}"),
                    e,
                )
            }
        })?;

        let meta = file.metadata().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to get metadata: {name}"),
                e,
            )
        })?;
        if !meta.is_file() {
            return Err(AppError::not_found(format!("File not found: {name}")));
        }

        Ok(StoredFile {
            name: name.to_string(),
            size: meta.len(),
            content_type: content_type_for(name),
            stream: Box::pin(ReaderStream::new(file)),
        })
    }

    /// Whether a converted file with this name exists.
    pub async fn converted_exists(&self, name: &str) -> bool {
        if validate_download_name(name).is_err() {
            return false;
        }
        fs::metadata(self.converted_dir.join(name))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Save a rendered viewer page under a fresh name and return that name.
    pub async fn write_viewer_page(&self, html: &str) -> AppResult<String> {
        let name = format!("model-{}.html", Uuid::now_v7().simple());
        fs::write(self.viewers_dir.join(&name), html)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write viewer page: {name}"),
                    e,
                )
            })?;
        debug!(name = %name, bytes = html.len(), "Wrote viewer page");
        Ok(name)
    }

    /// Read a viewer page previously written by [`Self::write_viewer_page`].
    pub async fn read_viewer_page(&self, name: &str) -> AppResult<String> {
        validate_download_name(name)?;
        fs::read_to_string(self.viewers_dir.join(name))
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::not_found(format!("Viewer page not found: {name}"))
                } else {
                    AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to read viewer page: {name}"),
                        e,
                    )
                }
            })
    }

    /// List converted files, skipping in-progress temp files.
    pub async fn list_converted(&self) -> AppResult<Vec<StoredFileMeta>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.converted_dir).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list converted files", e)
        })?;

        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
            })?;
            if !meta.is_file() {
                continue;
            }

            entries.push(StoredFileMeta {
                name,
                size_bytes: meta.len(),
                modified: meta.modified().ok().map(chrono::DateTime::<chrono::Utc>::from),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
