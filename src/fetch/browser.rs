//! Headless Chromium session for listings that only materialize after
//! client-side script execution.

use crate::config::BrowserConfig;
use crate::error::{Result, ScraperError};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Find a Chromium binary, or None if the environment has none.
fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("MUSEUM_SCRAPER_CHROME") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    None
}

/// A scripted browsing session. One session per crawler invocation; the
/// owning crawler must call [`RenderedSession::close`] on every exit path.
pub struct RenderedSession {
    browser: Browser,
    ready_timeout: Duration,
}

impl RenderedSession {
    /// Start a headless session. Returns `None` when the environment cannot
    /// provide one (no Chromium binary, sandbox restriction); the owning
    /// crawler then yields an empty result set instead of failing the run.
    pub async fn open(config: &BrowserConfig) -> Option<Self> {
        let chrome_path = match find_chromium() {
            Some(path) => path,
            None => {
                warn!("No Chromium binary found; script-rendered sources will be skipped");
                return None;
            }
        };

        let chromium_config = match ChromiumConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--window-size=1920,1080")
            .arg("--lang=zh-TW")
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to build browser config: {}", e);
                return None;
            }
        };

        let (browser, mut handler) = match Browser::launch(chromium_config).await {
            Ok(launched) => launched,
            Err(e) => {
                warn!("Failed to launch Chromium, skipping rendered sources: {}", e);
                return None;
            }
        };

        // Drain CDP events for the lifetime of the browser
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Some(Self {
            browser,
            ready_timeout: config.ready_timeout(),
        })
    }

    /// Navigate to `url`, wait for `marker_css` to appear (bounded by the
    /// configured ready timeout), and return the rendered DOM.
    pub async fn load(&self, url: &str, marker_css: &str) -> Result<String> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScraperError::Browser {
                message: format!("failed to open {url}: {e}"),
            })?;
        let _ = page.wait_for_navigation().await;

        let deadline = Instant::now() + self.ready_timeout;
        loop {
            if page.find_element(marker_css).await.is_ok() {
                break;
            }
            if Instant::now() >= deadline {
                let _ = page.close().await;
                return Err(ScraperError::Browser {
                    message: format!("timed out waiting for '{marker_css}' on {url}"),
                });
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        let html = match page.evaluate("document.documentElement.outerHTML").await {
            Ok(result) => result
                .into_value::<String>()
                .map_err(|e| ScraperError::Browser {
                    message: format!("unexpected DOM payload from {url}: {e:?}"),
                }),
            Err(e) => Err(ScraperError::Browser {
                message: format!("failed to read DOM of {url}: {e}"),
            }),
        };
        let _ = page.close().await;

        let html = html?;
        debug!("Rendered {} ({} bytes)", url, html.len());
        Ok(html)
    }

    /// Tear the session down. Best-effort; errors during shutdown are logged
    /// and swallowed.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = self.browser.wait().await;
    }
}
