use std::{
    fs::remove_file,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::error::Error;

static SPOOL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// An uploaded file written to the work directory for the lifetime of one
/// request. The file is removed when the guard drops, on every exit path.
#[derive(Debug)]
pub struct SpooledUpload {
    path: PathBuf,
}

impl SpooledUpload {
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub async fn write(dir: &Path, bytes: &[u8]) -> Result<Self, Error> {
        tokio::fs::create_dir_all(dir).await?;

        let name = format!(
            "upload-{}-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_millis(),
            SPOOL_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let path = dir.join(name);

        // guard first so a failed write still cleans up a partial file
        let guard = SpooledUpload { path };
        tokio::fs::write(&guard.path, bytes)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, path = ?guard.path, "Failed to spool upload"))?;

        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Vec<u8>, Error> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

impl Drop for SpooledUpload {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }

        if let Err(e) = remove_file(&self.path) {
            tracing::warn!(error = ?e, path = ?self.path, "Failed to clean up spooled upload");
        } else {
            tracing::debug!(path = ?self.path, "Cleaned up spooled upload");
        }
    }
}
