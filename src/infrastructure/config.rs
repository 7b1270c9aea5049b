//! Application configuration.
//!
//! Everything the pipeline needs is supplied here at construction time —
//! credential paths included — so there is no ambient filesystem state and
//! no module-level flags to mutate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::parsing::ParsingConfig;

/// HTTP fetch settings for the page renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Bounded wait for a page to become available. A timeout is a per-URL
    /// failure, never fatal to the run.
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            timeout_seconds: 20,
            max_requests_per_second: 2,
            follow_redirects: true,
        }
    }
}

/// Upload collaborator settings. Missing credential material makes upload
/// unavailable for the run; it never crashes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderConfig {
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
    /// Well-known destination folder, resolved or created idempotently.
    pub folder_name: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            folder_name: "scraped_files".to_string(),
        }
    }
}

/// Pipeline run behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Prefix of the per-run staging directory under the system temp root.
    pub staging_prefix: String,
    /// Where the archive is moved when upload fails or is unavailable.
    pub retain_dir: PathBuf,
    /// Politeness pause between product page visits, in milliseconds.
    pub min_visit_delay_ms: u64,
    pub max_visit_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            staging_prefix: "indiamart_scrape_".to_string(),
            retain_dir: PathBuf::from("."),
            min_visit_delay_ms: 1_000,
            max_visit_delay_ms: 3_000,
        }
    }
}

/// Top-level configuration injected into the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub uploader: UploaderConfig,
    pub pipeline: PipelineConfig,
    pub parsing: ParsingConfig,
}
