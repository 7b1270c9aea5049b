//! Page render collaborator.
//!
//! The pipeline only needs "give me this page's DOM text". The trait keeps
//! the driving machinery — a real browser session or a plain HTTP fetch —
//! behind one seam, so tests can substitute canned pages. The session is
//! exclusively owned by one pipeline run and released by its finalizer.

use anyhow::Result;
use async_trait::async_trait;

use super::config::HttpConfig;
use super::http_client::HttpClient;

/// Renders URLs into page HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate to `url` and return the rendered page source once the page
    /// body is present, or fail after a bounded wait.
    async fn render(&self, url: &str) -> Result<String>;

    /// Release the underlying session. Called exactly once by the pipeline
    /// finalizer, on every exit path.
    async fn close(&self) -> Result<()>;
}

/// HTTP-backed renderer for pages that do not require script execution.
pub struct HttpPageRenderer {
    client: HttpClient,
}

impl HttpPageRenderer {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl PageRenderer for HttpPageRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let body = self.client.get_text(url).await?;
        if body.trim().is_empty() {
            anyhow::bail!("empty page body from {url}");
        }
        Ok(body)
    }

    async fn close(&self) -> Result<()> {
        // Nothing to release for a plain HTTP session.
        Ok(())
    }
}
