use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, PRAGMA};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::merge::Merger;
use crate::parser::{self, Extraction};
use crate::report::{Aggregation, SourceError};
use crate::sources::Source;

/// Why a source contributed nothing. The `Display` text is what callers see.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("failed to read body: {0}")]
    Body(String),
}

/// One GET, one attempt, body as text.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Fetch every source (at most `concurrency` at a time), extract, and merge.
///
/// Results come back in source-list order whatever the completion order, so
/// the first-wins merge rules see the same sequence on every run. A failed
/// source becomes one `SourceError` and the run carries on.
pub async fn aggregate(fetcher: &dyn Fetch, sources: &[Source], concurrency: usize) -> Aggregation {
    let t0 = Instant::now();

    let jobs: Vec<_> = sources
        .iter()
        .map(|source| scrape_one(fetcher, source))
        .collect();
    let results: Vec<Result<Extraction, FetchError>> = stream::iter(jobs)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut merger = Merger::new();
    let mut errors = Vec::new();
    let mut candidates = 0usize;

    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(extraction) => {
                candidates += extraction.candidates.len();
                merger.extend(extraction.candidates);
            }
            Err(e) => errors.push(SourceError {
                source: source.id.clone(),
                error: e.to_string(),
            }),
        }
    }

    info!(
        "Aggregated {} sources ({} failed): {} candidates -> {} entries in {:.1}s",
        sources.len(),
        errors.len(),
        candidates,
        merger.len(),
        t0.elapsed().as_secs_f64()
    );

    Aggregation::assemble(merger, errors)
}

async fn scrape_one(fetcher: &dyn Fetch, source: &Source) -> Result<Extraction, FetchError> {
    let start = Instant::now();
    let body = match fetcher.fetch(&source.url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Source {} failed ({}): {}", source.id, source.url, e);
            return Err(e);
        }
    };

    let extraction = parser::extract(&body, &source.locator, &source.origin);
    debug!(
        "Source {}: {} bytes, {} rows, {} skipped in {}ms",
        source.id,
        body.len(),
        extraction.candidates.len(),
        extraction.skipped,
        start.elapsed().as_millis()
    );
    Ok(extraction)
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{Fetch, FetchError};

    pub enum Reply {
        Body(String),
        Status(u16),
        Down(&'static str),
    }

    /// In-memory pages keyed by URL, with optional per-URL delay.
    #[derive(Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, (Reply, Duration)>,
        pub calls: AtomicUsize,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, reply: Reply) -> Self {
            self.pages.insert(url.to_string(), (reply, Duration::ZERO));
            self
        }

        pub fn delayed(mut self, url: &str, reply: Reply, delay: Duration) -> Self {
            self.pages.insert(url.to_string(), (reply, delay));
            self
        }
    }

    #[async_trait]
    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some((reply, delay)) = self.pages.get(url) else {
                return Err(FetchError::Status(404));
            };
            if !delay.is_zero() {
                tokio::time::sleep(*delay).await;
            }
            match reply {
                Reply::Body(b) => Ok(b.clone()),
                Reply::Status(s) => Err(FetchError::Status(*s)),
                Reply::Down(msg) => Err(FetchError::Transport(msg.to_string())),
            }
        }
    }
}
