//! Content-level duplicate detection over the staging directory.
//!
//! Before a record is persisted its content hash is compared against every
//! record file already staged for this run. The scan is linear per call,
//! which is acceptable because the staged set is bounded by the requested
//! `products_per_category`.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, trace};

use crate::domain::ProductRecord;
use crate::pipeline::naming::{content_hash, content_hash_json};

/// Check whether `record`'s content already exists in `staging_dir`.
///
/// A missing directory means nothing is staged yet. Non-record files are
/// ignored; unreadable or corrupt record files are skipped, never fatal.
pub fn is_duplicate(record: &ProductRecord, staging_dir: &Path) -> Result<bool> {
    let new_hash = content_hash(record)?;

    if !staging_dir.exists() {
        return Ok(false);
    }

    let entries = match std::fs::read_dir(staging_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("staging dir unreadable, treating as empty: {e}");
            return Ok(false);
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match staged_hash(&path) {
            Some(existing_hash) if existing_hash == new_hash => {
                debug!(file = %path.display(), hash = %new_hash, "duplicate content found");
                return Ok(true);
            }
            Some(_) => {}
            None => trace!(file = %path.display(), "skipping unreadable staged file"),
        }
    }

    Ok(false)
}

/// Recompute the content hash of one staged record file, or `None` if the
/// file cannot be read or parsed.
fn staged_hash(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    Some(content_hash_json(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(name: &str) -> ProductRecord {
        let mut record = ProductRecord::skeleton(
            "https://www.indiamart.com/proddetail/x.html",
            "Product Detail".to_string(),
            "2026-08-23".to_string(),
        );
        record.product_name = name.to_string();
        record
    }

    #[test]
    fn missing_directory_is_never_a_duplicate() {
        let record = sample_record("Ball Valve");
        let dir = std::env::temp_dir().join("indiamart_dedup_does_not_exist");
        assert!(!is_duplicate(&record, &dir).unwrap());
    }

    #[test]
    fn empty_directory_is_never_a_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let record = sample_record("Ball Valve");
        assert!(!is_duplicate(&record, dir.path()).unwrap());
    }

    #[test]
    fn detects_staged_record_with_matching_hash() {
        let dir = tempfile::tempdir().unwrap();
        let record = sample_record("Ball Valve");

        let staged = dir.path().join("existing.json");
        std::fs::write(&staged, serde_json::to_string_pretty(&record).unwrap()).unwrap();

        assert!(is_duplicate(&record, dir.path()).unwrap());

        let different = sample_record("Gate Valve");
        assert!(!is_duplicate(&different, dir.path()).unwrap());
    }

    #[test]
    fn corrupt_and_foreign_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let record = sample_record("Ball Valve");
        assert!(!is_duplicate(&record, dir.path()).unwrap());
    }
}
