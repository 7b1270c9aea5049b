//! IndiaMART product listing scraper.
//!
//! Turns a category page into a bounded set of product URLs, extracts one
//! structured record per product with per-field fallback, deduplicates by
//! content hash, archives the staged records, and uploads the archive —
//! deleting local artifacts only on confirmed remote delivery.
//!
//! The browser/HTTP session and the upload transport are collaborators
//! behind traits ([`infrastructure::PageRenderer`],
//! [`infrastructure::ArchiveUploader`]); the pipeline itself is strictly
//! sequential and owns its staging directory for the duration of a run.

pub mod domain;
pub mod infrastructure;
pub mod parsing;
pub mod pipeline;

pub use domain::{ProductRecord, RunResult, RunStats};
pub use infrastructure::{AppConfig, HttpPageRenderer, UnavailableUploader};
pub use pipeline::ScrapePipeline;
