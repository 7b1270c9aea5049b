//! Upload collaborator.
//!
//! The pipeline consumes this interface and never defines the transport.
//! Capability is expressed through `authenticate`: returning `Ok(None)`
//! means "upload unavailable for this run" — a degraded condition the
//! orchestrator handles by retaining local artifacts, never a crash.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::config::UploaderConfig;

/// Opaque authenticated session handle.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub token: String,
}

/// Remote archive delivery.
#[async_trait]
pub trait ArchiveUploader: Send + Sync {
    /// Authenticate, reusing cached credentials when possible. `Ok(None)`
    /// means upload is unavailable (e.g. missing credential material).
    async fn authenticate(&self) -> Result<Option<UploadSession>>;

    /// Resolve the destination folder by name, creating it on first use.
    /// Idempotent: resolving the same name twice returns the same id.
    async fn resolve_or_create_folder(
        &self,
        session: &UploadSession,
        name: &str,
    ) -> Result<String>;

    /// Upload the file into the folder. `Ok(None)` means the remote side
    /// did not confirm the upload.
    async fn upload(
        &self,
        session: &UploadSession,
        file_path: &Path,
        folder_id: &str,
    ) -> Result<Option<String>>;
}

/// Uploader stub for runs without credential material. Authenticates to
/// `None`, so the pipeline retains all local artifacts.
pub struct UnavailableUploader;

impl UnavailableUploader {
    /// Build the stub, logging why upload is off for this run.
    pub fn from_config(config: &UploaderConfig) -> Self {
        info!(
            credentials = %config.credentials_path.display(),
            "no upload client configured; archives will be retained locally"
        );
        Self
    }
}

#[async_trait]
impl ArchiveUploader for UnavailableUploader {
    async fn authenticate(&self) -> Result<Option<UploadSession>> {
        Ok(None)
    }

    async fn resolve_or_create_folder(
        &self,
        _session: &UploadSession,
        _name: &str,
    ) -> Result<String> {
        anyhow::bail!("upload unavailable: no authenticated session")
    }

    async fn upload(
        &self,
        _session: &UploadSession,
        _file_path: &Path,
        _folder_id: &str,
    ) -> Result<Option<String>> {
        anyhow::bail!("upload unavailable: no authenticated session")
    }
}
