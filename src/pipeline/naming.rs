//! Filename and content-hash utilities.
//!
//! Record filenames are built from sanitized page text, so everything here is
//! defensive about hostile input: filesystem-unsafe characters, whitespace
//! runs, and over-long supplier names all collapse to a bounded safe fragment.

use anyhow::{Context, Result};

use crate::domain::ProductRecord;

/// Maximum length of one sanitized filename fragment.
const MAX_FRAGMENT_LEN: usize = 50;

/// Hex characters kept from the content digest.
const CONTENT_HASH_LEN: usize = 8;

/// Hex characters kept from the URL digest used in filenames.
const URL_HASH_LEN: usize = 6;

/// Convert arbitrary page text into a safe filename fragment.
///
/// Characters illegal in filenames become `_`, whitespace runs collapse to a
/// single `_`, leading/trailing `_` and `.` are trimmed, and the result is
/// truncated to 50 characters. Empty input yields `"unknown"`.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return "unknown".to_string();
    }

    let mut out = String::with_capacity(text.len().min(MAX_FRAGMENT_LEN));
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push('_');
            }
            last_was_space = true;
            continue;
        }
        last_was_space = false;
        match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => out.push('_'),
            other => out.push(other),
        }
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    let fragment: String = trimmed.chars().take(MAX_FRAGMENT_LEN).collect();

    if fragment.is_empty() {
        "unknown".to_string()
    } else {
        fragment
    }
}

/// Deterministic 8-hex-char digest of a record's sorted-key JSON form.
///
/// Two records are considered duplicates iff their digests match. The
/// serialization goes through `serde_json::Value`, whose object map keeps
/// keys sorted, so field declaration order never affects the digest.
pub fn content_hash(record: &ProductRecord) -> Result<String> {
    let value = serde_json::to_value(record).context("failed to serialize record for hashing")?;
    Ok(content_hash_json(&value))
}

/// Digest of an already-parsed JSON value, shared with the duplicate
/// detector which compares staged files in their on-disk form.
pub fn content_hash_json(value: &serde_json::Value) -> String {
    let digest = blake3::hash(value.to_string().as_bytes());
    digest.to_hex()[..CONTENT_HASH_LEN].to_string()
}

/// Unique filename for one record:
/// `{sanitized product}_{sanitized supplier}_{6-hex url hash}.json`.
pub fn unique_filename(record: &ProductRecord) -> String {
    let product = sanitize(&record.product_name);
    let supplier = sanitize(&record.supplier_name);
    let url_digest = blake3::hash(record.url.as_bytes());
    format!(
        "{}_{}_{}.json",
        product,
        supplier,
        &url_digest.to_hex()[..URL_HASH_LEN]
    )
}
