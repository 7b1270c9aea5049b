//! Context objects carried through parsing operations.

/// Context for parsing one product detail page.
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Source URL of the page being parsed. Drives category derivation.
    pub url: String,
}

impl DetailParseContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Context for collecting product URLs from a category page.
#[derive(Debug, Clone)]
pub struct ListParseContext {
    /// Base URL relative hrefs are resolved against.
    pub base_url: String,
    /// Maximum number of distinct product URLs to collect.
    pub limit: usize,
}

impl ListParseContext {
    pub fn new(base_url: impl Into<String>, limit: usize) -> Self {
        Self {
            base_url: base_url.into(),
            limit,
        }
    }
}
