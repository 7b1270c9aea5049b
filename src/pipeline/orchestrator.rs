//! Pipeline orchestration.
//!
//! Drives one run through its stages: create the staging area, collect
//! product URLs from the category page, extract and persist each product,
//! archive and upload, then clean up. The finalizer — renderer release and
//! staging removal — runs on every exit path. Local artifacts are deleted
//! only after the upload collaborator confirms delivery.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{debug, error, info, warn};

use crate::domain::{ProductRecord, RunResult, RunStage, RunStats};
use crate::infrastructure::{AppConfig, ArchiveUploader, PageRenderer};
use crate::parsing::{
    category_from_url, DetailParseContext, ListParseContext, ProductRecordParser,
    ProductUrlCollector,
};
use crate::pipeline::archive::ArchiveStage;
use crate::pipeline::staging::StagingArea;

/// How one product URL fared inside the extraction loop.
enum UrlOutcome {
    Persisted(Box<ProductRecord>, PathBuf),
    Duplicate,
    Rejected,
}

/// Sequential scraping pipeline over one category URL.
///
/// Owns its renderer session exclusively for the duration of a run; callers
/// wanting concurrent category runs must build one pipeline (and staging
/// area) per run.
pub struct ScrapePipeline {
    renderer: Arc<dyn PageRenderer>,
    collector: ProductUrlCollector,
    parser: ProductRecordParser,
    archive_stage: ArchiveStage,
    config: AppConfig,
}

impl ScrapePipeline {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        uploader: Arc<dyn ArchiveUploader>,
        config: AppConfig,
    ) -> Result<Self> {
        let collector = ProductUrlCollector::with_config(&config.parsing.list_page)?;
        let parser = ProductRecordParser::with_config(&config.parsing.product_page)?;
        let archive_stage = ArchiveStage::new(
            uploader,
            config.uploader.folder_name.clone(),
            config.pipeline.retain_dir.clone(),
        );
        Ok(Self {
            renderer,
            collector,
            parser,
            archive_stage,
            config,
        })
    }

    /// Run the full pipeline for one category URL.
    ///
    /// Always releases the renderer and removes the staging root before
    /// returning, whether the stages succeeded or not.
    pub async fn run(&self, category_url: &str, products_per_category: usize) -> Result<RunResult> {
        info!(stage = ?RunStage::Init, url = category_url, "starting scrape run");

        let staging = match StagingArea::create(&self.config.pipeline.staging_prefix) {
            Ok(staging) => staging,
            Err(e) => {
                error!(stage = ?RunStage::Failed, "could not create staging area: {e:#}");
                self.release_renderer().await;
                return Err(e);
            }
        };

        let result = self
            .run_stages(category_url, products_per_category, &staging)
            .await;

        debug!(stage = ?RunStage::Cleanup, "running finalizer");
        self.release_renderer().await;
        staging.cleanup();

        match &result {
            Ok(run) => info!(
                stage = ?RunStage::Done,
                extracted = run.stats.extracted,
                duplicates = run.stats.duplicates_skipped,
                failures = run.stats.failures,
                uploaded = run.remote_id.is_some(),
                "run complete"
            ),
            Err(e) => error!(stage = ?RunStage::Failed, "run failed: {e:#}"),
        }

        result
    }

    async fn run_stages(
        &self,
        category_url: &str,
        products_per_category: usize,
        staging: &StagingArea,
    ) -> Result<RunResult> {
        let mut stats = RunStats::default();

        info!(stage = ?RunStage::Collecting, url = category_url, "loading category page");
        let page = self
            .renderer
            .render(category_url)
            .await
            .context("failed to render category page")?;

        // Html is not Send; parse inside a block so it drops before awaits.
        let urls = {
            let html = Html::parse_document(&page);
            self.collector
                .collect(&html, &ListParseContext::new(category_url, products_per_category))
        };
        stats.urls_found = urls.len() as u32;

        if urls.is_empty() {
            warn!("no product URLs found; completing run with an empty record set");
            return Ok(RunResult {
                stats,
                ..RunResult::default()
            });
        }
        info!(count = urls.len(), "collected product URLs");

        let mut records = Vec::new();
        let mut staged_files = Vec::new();
        for (index, url) in urls.iter().enumerate() {
            info!(
                stage = ?RunStage::Extracting,
                "[{}/{}] processing {url}",
                index + 1,
                urls.len()
            );

            match self.process_url(url, staging).await {
                Ok(UrlOutcome::Persisted(record, path)) => {
                    stats.extracted += 1;
                    records.push(*record);
                    staged_files.push(path);
                }
                Ok(UrlOutcome::Duplicate) => {
                    stats.duplicates_skipped += 1;
                    info!(url, "skipping duplicate content");
                }
                Ok(UrlOutcome::Rejected) => {
                    stats.failures += 1;
                    warn!(url, "record rejected: product name extraction failed");
                }
                Err(e) => {
                    stats.failures += 1;
                    warn!(url, "skipping URL after error: {e:#}");
                }
            }

            self.politeness_pause().await;
        }

        let (archive_path, remote_id) = if staged_files.is_empty() {
            info!(stage = ?RunStage::Archiving, "nothing staged; skipping archive and upload");
            (None, None)
        } else {
            info!(
                stage = ?RunStage::Archiving,
                files = staged_files.len(),
                "building archive"
            );
            let category = category_from_url(category_url);
            self.archive_stage
                .archive_and_upload(&staged_files, &category, staging)
                .await?
        };

        Ok(RunResult {
            records,
            archive_path,
            remote_id,
            stats,
        })
    }

    /// Render one product page, extract its record, and persist it unless
    /// it is rejected or a content duplicate.
    async fn process_url(&self, url: &str, staging: &StagingArea) -> Result<UrlOutcome> {
        let page = self.renderer.render(url).await?;

        let (record, report) = {
            let html = Html::parse_document(&page);
            self.parser.parse(&html, &DetailParseContext::new(url))
        };
        debug!(
            url,
            defaulted = report.defaulted_fields().count(),
            "record extracted"
        );

        if record.is_rejected() {
            return Ok(UrlOutcome::Rejected);
        }

        match staging.persist(&record)? {
            Some(path) => Ok(UrlOutcome::Persisted(Box::new(record), path)),
            None => Ok(UrlOutcome::Duplicate),
        }
    }

    /// Randomized pause between page visits. Politeness only; no state.
    async fn politeness_pause(&self) {
        let min = self.config.pipeline.min_visit_delay_ms;
        let max = self.config.pipeline.max_visit_delay_ms.max(min);
        let pause = fastrand::u64(min..=max);
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }

    async fn release_renderer(&self) {
        if let Err(e) = self.renderer.close().await {
            warn!("failed to release renderer session: {e:#}");
        }
    }
}
