//! Per-session browser state
//!
//! Holds the launched browser and the currently selected page, and owns the
//! cancellation token that session teardown fires.
//!
//! # Async Lock Requirements
//!
//! Uses `tokio::sync::Mutex`: page handles are used across `.await` points.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::page_source::{capture_ax_tree, sample_page_text};
use super::wrapper::{BrowserWrapper, launch_browser};
use crate::BrowserConfig;
use crate::snapshot::{SnapshotError, SnapshotNode, SnapshotSource};
use crate::wait::TextSampler;

pub struct PageSession {
    browser: Mutex<Option<BrowserWrapper>>,
    current_page: Mutex<Option<Page>>,
    snapshot_id: AtomicU64,
    cancel: CancellationToken,
}

impl Default for PageSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSession {
    /// Create an empty session; the browser is launched by `launch()`
    pub fn new() -> Self {
        Self {
            browser: Mutex::new(None),
            current_page: Mutex::new(None),
            snapshot_id: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    /// Launch the browser if not already running
    pub async fn launch(&self, config: &BrowserConfig) -> Result<()> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(launch_browser(config).await?);
        }
        Ok(())
    }

    /// Open `url` in a fresh page and make it the selected page
    ///
    /// Pages left over from earlier navigations are closed first, so the
    /// session never holds more than one tab.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("URL must start with http:// or https://");
        }

        let guard = self.browser.lock().await;
        let wrapper = guard
            .as_ref()
            .context("Browser not launched. Call PageSession::launch first.")?;

        self.current_page.lock().await.take();
        if let Ok(existing_pages) = wrapper.browser().pages().await {
            for page in existing_pages {
                // Already-closed or unresponsive pages are skipped
                let _ = page.close().await;
            }
        }

        let page = wrapper
            .browser()
            .new_page("about:blank")
            .await
            .context("Failed to create blank page")?;

        tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Navigation timeout after {}ms for URL: {}",
                    timeout.as_millis(),
                    url
                )
            })?
            .with_context(|| format!("Navigation failed for URL: {url}"))?;

        page.wait_for_navigation()
            .await
            .context("Failed to wait for page load completion")?;

        info!("Navigated to {}", url);
        self.set_current_page(page).await;
        Ok(())
    }

    /// Replace the selected page
    pub async fn set_current_page(&self, page: Page) {
        *self.current_page.lock().await = Some(page);
    }

    pub async fn current_page(&self) -> Result<Page, SnapshotError> {
        self.current_page
            .lock()
            .await
            .clone()
            .ok_or(SnapshotError::NoPage)
    }

    /// Session-wide token; tools derive a child token per request
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel in-flight waits, then close the browser
    ///
    /// Safe to call multiple times (subsequent calls are no-ops).
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.current_page.lock().await.take();

        if let Some(mut wrapper) = self.browser.lock().await.take() {
            info!("Shutting down browser");
            wrapper.close().await;
        }
    }
}

#[async_trait]
impl SnapshotSource for PageSession {
    async fn raw_tree(&self, verbose: bool) -> Result<SnapshotNode, SnapshotError> {
        let page = self.current_page().await?;
        let snapshot_id = self.snapshot_id.fetch_add(1, Ordering::Relaxed) + 1;
        capture_ax_tree(&page, snapshot_id, verbose).await
    }
}

#[async_trait]
impl TextSampler for PageSession {
    async fn sample_text(&self) -> Result<String, SnapshotError> {
        let page = self.current_page().await?;
        sample_page_text(&page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves the same small HTML page to every connection
    async fn serve_page() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = [0u8; 1024];
                    let _ = stream.read(&mut request).await;
                    let body = "<html><body><button>Save</button></body></html>";
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });

        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn navigate_rejects_non_http_urls() {
        let session = PageSession::new();
        let err = session
            .navigate("file:///etc/passwd", Duration::from_secs(1))
            .await
            .expect_err("scheme rejected");
        assert!(err.to_string().contains("http://"));
    }

    #[tokio::test]
    async fn navigate_requires_launched_browser() {
        let session = PageSession::new();
        let err = session
            .navigate("http://127.0.0.1/", Duration::from_secs(1))
            .await
            .expect_err("no browser");
        assert!(err.to_string().contains("Browser not launched"));
        assert!(matches!(session.current_page().await, Err(SnapshotError::NoPage)));
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome installation"]
    async fn repeated_navigation_keeps_a_single_page() {
        let url = serve_page().await;
        let session = PageSession::new();
        session.launch(&BrowserConfig::default()).await.expect("launch");

        for _ in 0..3 {
            session.navigate(&url, Duration::from_secs(10)).await.expect("navigate");
        }

        let open_pages = {
            let guard = session.browser.lock().await;
            let wrapper = guard.as_ref().expect("browser running");
            wrapper.browser().pages().await.expect("pages").len()
        };
        let text = session.sample_text().await.expect("page text");
        session.shutdown().await;

        assert_eq!(open_pages, 1);
        assert!(text.contains("Save"));
    }
}
