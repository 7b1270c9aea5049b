use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sentinel stored in `product_name` when both the primary heading and the
/// generic fallback fail. The orchestrator rejects records carrying it.
pub const PRODUCT_NAME_MISSING: &str = "Product name not found";

/// Sentinel for any field whose selector lookup came back empty.
pub const NOT_FOUND: &str = "Not found";

/// Sentinel price unit when no price element exists on the page.
pub const UNIT_NA: &str = "N/A";

/// One scraped IndiaMART listing.
///
/// Every field is always populated: either with extracted text or with the
/// sentinel for its slot. A missing DOM fragment never prevents construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "URL")]
    pub url: String,
    pub product_name: String,
    pub price: String,
    pub price_unit: String,
    pub supplier_name: String,
    pub supplier_location: String,
    pub gst_number: String,
    pub gst_registration_date: String,
    pub supplier_rating: String,
    pub response_rate: String,
    pub trustseal_verified: String,
    pub member_since: String,
    pub years_experience: String,
    pub legal_status: String,
    pub annual_turnover: String,
    pub specifications: BTreeMap<String, String>,
    pub last_updated: String,
    pub category: String,
}

impl ProductRecord {
    /// Skeleton record for a product URL: sentinels everywhere, category
    /// derived from the URL, `last_updated` stamped with today's date.
    pub fn skeleton(url: &str, category: String, last_updated: String) -> Self {
        Self {
            url: url.to_string(),
            product_name: PRODUCT_NAME_MISSING.to_string(),
            price: NOT_FOUND.to_string(),
            price_unit: UNIT_NA.to_string(),
            supplier_name: NOT_FOUND.to_string(),
            supplier_location: NOT_FOUND.to_string(),
            gst_number: NOT_FOUND.to_string(),
            gst_registration_date: NOT_FOUND.to_string(),
            supplier_rating: NOT_FOUND.to_string(),
            response_rate: NOT_FOUND.to_string(),
            trustseal_verified: NOT_FOUND.to_string(),
            member_since: NOT_FOUND.to_string(),
            years_experience: NOT_FOUND.to_string(),
            legal_status: NOT_FOUND.to_string(),
            annual_turnover: NOT_FOUND.to_string(),
            specifications: BTreeMap::new(),
            last_updated,
            category,
        }
    }

    /// True when product name extraction failed entirely and the record
    /// should be discarded by the pipeline.
    pub fn is_rejected(&self) -> bool {
        self.product_name == PRODUCT_NAME_MISSING
    }
}

/// Aggregate counters for one pipeline invocation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Distinct product URLs collected from the category page.
    pub urls_found: u32,
    /// Records extracted, unique, and persisted to staging.
    pub extracted: u32,
    /// Records dropped because an identical content hash was already staged.
    pub duplicates_skipped: u32,
    /// URLs that failed to render, extract, or persist.
    pub failures: u32,
}

impl RunStats {
    /// Extraction success rate against the requested product count.
    pub fn success_rate(&self, requested: u32) -> f64 {
        if requested == 0 {
            return 0.0;
        }
        f64::from(self.extracted) / f64::from(requested)
    }
}

/// Outcome of one `ScrapePipeline::run` invocation.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Records actually persisted, in extraction order.
    pub records: Vec<ProductRecord>,
    /// Archive location: the retained local copy when upload failed, or the
    /// pre-deletion staging path after a confirmed upload. `None` when there
    /// was nothing to archive.
    pub archive_path: Option<PathBuf>,
    /// Remote identifier returned by the upload collaborator, when delivery
    /// was confirmed.
    pub remote_id: Option<String>,
    pub stats: RunStats,
}

/// Pipeline stages, used for structured progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStage {
    Init,
    Collecting,
    Extracting,
    Archiving,
    Cleanup,
    Done,
    Failed,
}
