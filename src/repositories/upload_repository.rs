use axum::extract::Multipart;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid multipart request: {0}")]
    Rejected(#[from] MultipartRejection),
    #[error("Failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Missing `{0}` field")]
    MissingField(&'static str),
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written for the duration of one request. Removed from disk when dropped.
#[derive(Debug)]
pub struct UploadedImage {
    path: PathBuf,
}

impl UploadedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadedImage {
    // A single unlink, done synchronously so the file is gone before the response is sent.
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Upload {} was never written", self.path.display())
            }
            Err(e) => warn!("Failed to remove upload {}: {}", self.path.display(), e),
        }
    }
}

/// Stores multipart uploads as uniquely named files in one directory.
#[derive(Clone)]
pub struct UploadRepository {
    dir: PathBuf,
}

impl UploadRepository {
    pub async fn new<P: Into<PathBuf>>(dir: P) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Streams the `image` field to disk. Other fields are skipped.
    pub async fn receive(&self, mut multipart: Multipart) -> Result<UploadedImage, UploadError> {
        while let Some(mut field) = multipart.next_field().await? {
            if field.name() != Some(IMAGE_FIELD) {
                continue;
            }

            // The guard is declared before the handle, so on an early return the
            // handle is closed before the file is removed.
            let image = UploadedImage {
                path: self.dir.join(format!("{}.upload", Uuid::new_v4())),
            };
            let mut file = File::create(image.path()).await?;

            while let Some(chunk) = field.chunk().await? {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;

            debug!(
                "Stored upload {:?} as {}",
                field.file_name(),
                image.path.display()
            );
            return Ok(image);
        }
        Err(UploadError::MissingField(IMAGE_FIELD))
    }
}
