//! Product URL collection from category listing pages.

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::config::ListPageSelectors;
use super::context::ListParseContext;
use super::error::{ExtractError, ExtractResult};

/// Collects bounded, deduplicated product detail URLs from a rendered
/// category page.
pub struct ProductUrlCollector {
    anchor_selector: Selector,
    detail_marker: String,
}

impl ProductUrlCollector {
    pub fn new() -> ExtractResult<Self> {
        Self::with_config(&ListPageSelectors::default())
    }

    pub fn with_config(selectors: &ListPageSelectors) -> ExtractResult<Self> {
        Ok(Self {
            anchor_selector: Selector::parse(&selectors.anchor)
                .map_err(|e| ExtractError::invalid_selector(&selectors.anchor, e))?,
            detail_marker: selectors.detail_marker.clone(),
        })
    }

    /// Scan every hyperlink, keep product-detail targets, resolve them
    /// against the base URL, and deduplicate preserving first-seen order.
    /// Stops once `limit` distinct URLs are collected. An empty result is
    /// not an error — the caller decides how to react.
    pub fn collect(&self, html: &Html, context: &ListParseContext) -> Vec<String> {
        let base = match Url::parse(&context.base_url) {
            Ok(base) => base,
            Err(e) => {
                warn!(base_url = %context.base_url, "invalid base URL: {e}");
                return Vec::new();
            }
        };

        let mut urls = Vec::new();
        let mut seen = HashSet::new();
        for anchor in html.select(&self.anchor_selector) {
            if urls.len() >= context.limit {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.contains(&self.detail_marker) {
                continue;
            }
            match base.join(href) {
                Ok(resolved) => {
                    let resolved = resolved.to_string();
                    if seen.insert(resolved.clone()) {
                        urls.push(resolved);
                    }
                }
                Err(e) => debug!(href, "skipping unresolvable link: {e}"),
            }
        }
        urls.truncate(context.limit);

        debug!(count = urls.len(), limit = context.limit, "collected product URLs");
        urls
    }
}
