pub mod browser;

use crate::config::FetchConfig;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Typed failure from a single fetch unit. Callers inspect the result and
/// skip the unit of work; fetch failures never abort a harvest.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Network(String),

    #[error("unexpected HTTP status: {0}")]
    Status(u16),
}

/// GET a single URL with bounded retries and a fixed backoff between
/// attempts. Only timeout-class failures are retried; anything else is
/// treated as non-transient and abandoned on the first attempt.
///
/// Museum sites are fragile, so the backoff stays a constant delay rather
/// than exponential.
pub struct RetryingFetcher {
    client: reqwest::Client,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        // Several of the museum sites present incomplete certificate chains.
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_default();

        Self {
            client,
            max_retries: config.max_retries,
            backoff: config.backoff(),
        }
    }

    /// Fetch the response body for `url`. Performs at most `max_retries`
    /// attempts in total, sleeping the fixed backoff between timed-out
    /// attempts.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if url.is_empty() {
            return Err(FetchError::Network("empty URL".into()));
        }

        let mut last_error = FetchError::Network("no attempts made".into());

        for attempt in 1..=self.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !(status.is_success() || status.is_redirection()) {
                        warn!("HTTP {} from {}", status.as_u16(), url);
                        return Err(FetchError::Status(status.as_u16()));
                    }
                    match response.text().await {
                        Ok(body) => {
                            debug!("Fetched {} ({} bytes)", url, body.len());
                            return Ok(body);
                        }
                        Err(e) if e.is_timeout() => {
                            warn!("Read timeout on attempt {}: {}", attempt, url);
                            last_error = FetchError::Timeout;
                        }
                        Err(e) => {
                            warn!("Failed to read body from {}: {}", url, e);
                            return Err(FetchError::Network(e.to_string()));
                        }
                    }
                }
                Err(e) if e.is_timeout() => {
                    warn!("Timeout on attempt {}: {}", attempt, url);
                    last_error = FetchError::Timeout;
                }
                Err(e) => {
                    // Connection refused, DNS failure, malformed URL: retrying
                    // is unlikely to help, give up on this unit immediately.
                    warn!("Request failed on attempt {}: {}: {}", attempt, url, e);
                    return Err(FetchError::Network(e.to_string()));
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.backoff).await;
            }
        }

        warn!("Giving up on {} after {} attempts", url, self.max_retries);
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const OK_RESPONSE: &[u8] =
        b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok";
    const ERROR_RESPONSE: &[u8] =
        b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

    fn quick_config(max_retries: u32) -> FetchConfig {
        FetchConfig {
            max_retries,
            timeout_seconds: 1,
            backoff_seconds: 0,
        }
    }

    /// Serve each connection according to `respond_from`: connections before
    /// that index stall past the client timeout, the rest answer 200.
    async fn spawn_server(respond_from: usize, response: &'static [u8]) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    if n < respond_from {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    } else {
                        let _ = socket.write_all(response).await;
                    }
                });
            }
        });

        (url, hits)
    }

    #[tokio::test]
    async fn exhausts_retries_when_every_attempt_times_out() {
        let (url, hits) = spawn_server(usize::MAX, OK_RESPONSE).await;
        let fetcher = RetryingFetcher::new(&quick_config(3));

        let result = fetcher.fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Timeout)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_retrying_after_first_success() {
        let (url, hits) = spawn_server(1, OK_RESPONSE).await;
        let fetcher = RetryingFetcher::new(&quick_config(3));

        let body = fetcher.fetch(&url).await.unwrap();

        assert_eq!(body, "ok");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn connection_refused_is_not_retried() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let fetcher = RetryingFetcher::new(&quick_config(3));
        let result = fetcher.fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn http_error_status_is_not_retried() {
        let (url, hits) = spawn_server(0, ERROR_RESPONSE).await;
        let fetcher = RetryingFetcher::new(&quick_config(3));

        let result = fetcher.fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Status(500))));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let fetcher = RetryingFetcher::new(&quick_config(3));
        assert!(matches!(fetcher.fetch("").await, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn zero_retries_never_touches_the_network() {
        let (url, hits) = spawn_server(0, OK_RESPONSE).await;
        let fetcher = RetryingFetcher::new(&quick_config(0));

        let result = fetcher.fetch(&url).await;

        assert!(result.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
