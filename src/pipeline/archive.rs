//! Archive and upload stage.
//!
//! Bundles the staged record files into one deflate-compressed zip with flat
//! member names, hands it to the upload collaborator, and deletes local
//! artifacts only after the remote side confirms delivery with a non-empty
//! identifier. On any upload failure the archive is moved to the retain
//! directory so the run finalizer cannot destroy it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::infrastructure::ArchiveUploader;
use crate::pipeline::naming;
use crate::pipeline::staging::StagingArea;

/// Build `indiamart_{sanitized-category}_{timestamp}.zip` inside the
/// staging root from the staged record files.
pub fn build_archive(staged: &[PathBuf], category: &str, staging_root: &Path) -> Result<PathBuf> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let name = format!("indiamart_{}_{timestamp}.zip", naming::sanitize(category));
    let archive_path = staging_root.join(&name);

    let file = std::fs::File::create(&archive_path)
        .with_context(|| format!("failed to create archive {}", archive_path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in staged {
        let Some(member) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(file = %path.display(), "skipping staged file without a usable name");
            continue;
        };
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read staged file {}", path.display()))?;
        writer
            .start_file(member, options)
            .with_context(|| format!("failed to start archive member {member}"))?;
        writer
            .write_all(&bytes)
            .with_context(|| format!("failed to write archive member {member}"))?;
    }

    writer.finish().context("failed to finish archive")?;
    info!(archive = %name, files = staged.len(), "archive created");
    Ok(archive_path)
}

/// Drives archive build, upload, and the post-upload local cleanup.
pub struct ArchiveStage {
    uploader: Arc<dyn ArchiveUploader>,
    folder_name: String,
    retain_dir: PathBuf,
}

impl ArchiveStage {
    pub fn new(uploader: Arc<dyn ArchiveUploader>, folder_name: String, retain_dir: PathBuf) -> Self {
        Self {
            uploader,
            folder_name,
            retain_dir,
        }
    }

    /// Archive the staged files and attempt delivery.
    ///
    /// Returns `(archive_path, remote_id)`. Local staged files and the
    /// archive are deleted only on a confirmed remote identifier; otherwise
    /// the archive is moved to the retain directory and reported there.
    /// Never fails: archive or retention trouble degrades to `(None, None)`
    /// so the extracted records still reach the caller.
    pub async fn archive_and_upload(
        &self,
        staged: &[PathBuf],
        category: &str,
        staging: &StagingArea,
    ) -> Result<(Option<PathBuf>, Option<String>)> {
        let archive_path = match build_archive(staged, category, staging.root()) {
            Ok(path) => path,
            Err(e) => {
                warn!("archive creation failed: {e:#}");
                return Ok((None, None));
            }
        };

        match self.try_upload(&archive_path).await {
            Some(remote_id) => {
                info!(remote_id = %remote_id, "upload confirmed, removing local artifacts");
                self.cleanup_local(staged, &archive_path, staging);
                Ok((Some(archive_path), Some(remote_id)))
            }
            None => match self.retain_archive(&archive_path) {
                Ok(retained) => Ok((Some(retained), None)),
                Err(e) => {
                    warn!("could not retain archive: {e:#}");
                    Ok((None, None))
                }
            },
        }
    }

    /// Authenticate, resolve the destination folder, upload. Every failure
    /// degrades to `None`; the cause is logged, never propagated.
    async fn try_upload(&self, archive: &Path) -> Option<String> {
        let session = match self.uploader.authenticate().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("upload unavailable for this run; retaining archive locally");
                return None;
            }
            Err(e) => {
                warn!("upload authentication failed: {e:#}");
                return None;
            }
        };

        let folder_id = match self
            .uploader
            .resolve_or_create_folder(&session, &self.folder_name)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                warn!(folder = %self.folder_name, "folder resolution failed: {e:#}");
                return None;
            }
        };

        match self.uploader.upload(&session, archive, &folder_id).await {
            Ok(Some(id)) if !id.is_empty() => Some(id),
            Ok(_) => {
                warn!("remote side did not confirm the upload");
                None
            }
            Err(e) => {
                warn!("upload failed: {e:#}");
                None
            }
        }
    }

    /// Remove staged files and the archive after a confirmed upload. The
    /// staging directory itself is removed only if this leaves it empty.
    fn cleanup_local(&self, staged: &[PathBuf], archive: &Path, staging: &StagingArea) {
        for path in staged {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(file = %path.display(), "could not remove staged file: {e}");
            }
        }
        if let Err(e) = std::fs::remove_file(archive) {
            warn!(file = %archive.display(), "could not remove archive: {e}");
        }
        staging.remove_if_empty();
    }

    /// Move the archive out of the staging root so the finalizer's removal
    /// of that root cannot take the retained copy with it.
    fn retain_archive(&self, archive: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.retain_dir).with_context(|| {
            format!("failed to create retain dir {}", self.retain_dir.display())
        })?;

        let file_name = archive
            .file_name()
            .context("archive path has no file name")?;
        let destination = self.retain_dir.join(file_name);

        if std::fs::rename(archive, &destination).is_err() {
            // Rename fails across filesystems; fall back to copy + remove.
            std::fs::copy(archive, &destination).with_context(|| {
                format!("failed to copy archive to {}", destination.display())
            })?;
            if let Err(e) = std::fs::remove_file(archive) {
                warn!(file = %archive.display(), "could not remove staged archive copy: {e}");
            }
        }

        info!(archive = %destination.display(), "archive retained locally");
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductRecord;
    use crate::infrastructure::{UnavailableUploader, UploadSession};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedUploader {
        confirm: bool,
        folder_calls: AtomicU32,
    }

    impl FixedUploader {
        fn new(confirm: bool) -> Self {
            Self {
                confirm,
                folder_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ArchiveUploader for FixedUploader {
        async fn authenticate(&self) -> Result<Option<UploadSession>> {
            Ok(Some(UploadSession {
                token: "test-token".to_string(),
            }))
        }

        async fn resolve_or_create_folder(
            &self,
            _session: &UploadSession,
            _name: &str,
        ) -> Result<String> {
            self.folder_calls.fetch_add(1, Ordering::SeqCst);
            Ok("folder-1".to_string())
        }

        async fn upload(
            &self,
            _session: &UploadSession,
            _file_path: &Path,
            _folder_id: &str,
        ) -> Result<Option<String>> {
            Ok(self.confirm.then(|| "remote-42".to_string()))
        }
    }

    fn stage_two_records(staging: &StagingArea) -> Vec<PathBuf> {
        let mut record = ProductRecord::skeleton(
            "https://www.indiamart.com/proddetail/a.html",
            "Product Detail".to_string(),
            "2026-08-23".to_string(),
        );
        record.product_name = "Elbow".to_string();
        let first = staging.persist(&record).unwrap().unwrap();

        record.url = "https://www.indiamart.com/proddetail/b.html".to_string();
        record.product_name = "Tee".to_string();
        let second = staging.persist(&record).unwrap().unwrap();
        vec![first, second]
    }

    #[test]
    fn archive_contains_flat_member_names() {
        let staging = StagingArea::create("indiamart_test_zip_").unwrap();
        let staged = stage_two_records(&staging);

        let archive = build_archive(&staged, "Pipe Fittings", staging.root()).unwrap();
        assert!(archive
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("indiamart_Pipe_Fittings_"));

        let file = std::fs::File::open(&archive).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();
        assert_eq!(zip.len(), 2);
        for i in 0..zip.len() {
            let member = zip.by_index(i).unwrap();
            assert!(!member.name().contains('/'));
            assert!(member.name().ends_with(".json"));
        }

        staging.cleanup();
    }

    #[tokio::test]
    async fn confirmed_upload_deletes_local_artifacts() {
        let staging = StagingArea::create("indiamart_test_up_").unwrap();
        let staged = stage_two_records(&staging);
        let retain = tempfile::tempdir().unwrap();

        let uploader = Arc::new(FixedUploader::new(true));
        let stage = ArchiveStage::new(
            uploader.clone(),
            "scraped_files".to_string(),
            retain.path().to_path_buf(),
        );
        let (archive_path, remote_id) = stage
            .archive_and_upload(&staged, "Pipe Fittings", &staging)
            .await
            .unwrap();

        assert_eq!(remote_id.as_deref(), Some("remote-42"));
        assert!(archive_path.is_some());
        assert!(staged.iter().all(|p| !p.exists()));
        assert!(!staging.root().exists());
        assert_eq!(uploader.folder_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn folder_resolution_is_idempotent() {
        let uploader = FixedUploader::new(true);
        let session = uploader.authenticate().await.unwrap().unwrap();

        let first = uploader
            .resolve_or_create_folder(&session, "scraped_files")
            .await
            .unwrap();
        let second = uploader
            .resolve_or_create_folder(&session, "scraped_files")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(uploader.folder_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unwritable_retain_dir_degrades_without_failing() {
        let staging = StagingArea::create("indiamart_test_badretain_").unwrap();
        let staged = stage_two_records(&staging);

        // retain_dir nested under a plain file cannot be created
        let scratch = tempfile::tempdir().unwrap();
        let blocker = scratch.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let stage = ArchiveStage::new(
            Arc::new(FixedUploader::new(false)),
            "scraped_files".to_string(),
            blocker.join("nested"),
        );
        let (archive_path, remote_id) = stage
            .archive_and_upload(&staged, "General", &staging)
            .await
            .unwrap();

        assert!(remote_id.is_none());
        assert!(archive_path.is_none());
        // Staged records are untouched until the finalizer runs.
        assert!(staged.iter().all(|p| p.exists()));

        staging.cleanup();
    }

    #[tokio::test]
    async fn unconfirmed_upload_retains_the_archive() {
        let staging = StagingArea::create("indiamart_test_keep_").unwrap();
        let staged = stage_two_records(&staging);
        let retain = tempfile::tempdir().unwrap();

        let stage = ArchiveStage::new(
            Arc::new(FixedUploader::new(false)),
            "scraped_files".to_string(),
            retain.path().to_path_buf(),
        );
        let (archive_path, remote_id) = stage
            .archive_and_upload(&staged, "Pipe Fittings", &staging)
            .await
            .unwrap();

        assert!(remote_id.is_none());
        let retained = archive_path.unwrap();
        assert!(retained.exists());
        assert!(retained.starts_with(retain.path()));
        // Staged records are untouched until the finalizer runs.
        assert!(staged.iter().all(|p| p.exists()));

        staging.cleanup();
    }

    #[tokio::test]
    async fn unavailable_uploader_skips_straight_to_retention() {
        let staging = StagingArea::create("indiamart_test_noup_").unwrap();
        let staged = stage_two_records(&staging);
        let retain = tempfile::tempdir().unwrap();

        let stage = ArchiveStage::new(
            Arc::new(UnavailableUploader),
            "scraped_files".to_string(),
            retain.path().to_path_buf(),
        );
        let (archive_path, remote_id) = stage
            .archive_and_upload(&staged, "General", &staging)
            .await
            .unwrap();

        assert!(remote_id.is_none());
        assert!(archive_path.unwrap().exists());

        staging.cleanup();
    }
}
