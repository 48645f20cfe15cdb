//! Content sources: where pages and their block trees come from.
//!
//! The platform returns children one cursor page at a time and never nests
//! grandchildren, so [`PagedSource`] walks every cursor and recurses into
//! blocks flagged `has_children`. Each request is retried a bounded number
//! of times; a cursor that stops advancing aborts the walk instead of
//! looping forever.

use std::{future::Future, num::NonZeroU32, path::PathBuf, time::Duration};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::block::Block;
use crate::domain::id::{IdError, normalize_id};
use crate::domain::page::Page;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Paginated<T> {
    /// A final page holding `results`.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            results,
            next_cursor: None,
            has_more: false,
        }
    }

    pub fn more(results: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            results,
            next_cursor: Some(next_cursor.into()),
            has_more: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },
    #[error("{endpoint} responded with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("giving up on {id} after {attempts} attempts: {last}")]
    Exhausted {
        id: String,
        attempts: u32,
        #[source]
        last: Box<SourceError>,
    },
    #[error("pagination cursor for {id} did not advance (cursor {cursor:?})")]
    StalledCursor { id: String, cursor: Option<String> },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content id: {0}")]
    InvalidId(#[from] IdError),
}

impl SourceError {
    pub fn request(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Transport failures, throttling and server errors are worth retrying;
    /// everything else fails the same way twice.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Raw paginated access to the platform.
#[async_trait]
pub trait BlockPager: Send + Sync {
    /// One page of the direct children of `block_id`.
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<Block>, SourceError>;

    /// One page of the pages stored in a database.
    async fn query_database(
        &self,
        database_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<Page>, SourceError>;

    /// Page metadata, without its block tree.
    async fn retrieve_page(&self, page_id: &str) -> Result<Page, SourceError>;
}

/// Produces a complete page: metadata plus its full block tree.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Page, SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: NonZeroU32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    pub fn new(max_attempts: NonZeroU32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(NonZeroU32::MIN, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// [`ContentSource`] that assembles pages from a [`BlockPager`].
#[derive(Debug, Clone)]
pub struct PagedSource<P> {
    pager: P,
    retry: RetryPolicy,
}

impl<P: BlockPager> PagedSource<P> {
    pub fn new(pager: P, retry: RetryPolicy) -> Self {
        Self { pager, retry }
    }

    pub fn pager(&self) -> &P {
        &self.pager
    }

    /// Every descendant of `block_id`, depth first, in platform order.
    pub fn collect_children<'a>(
        &'a self,
        block_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Block>, SourceError>> {
        async move {
            let mut blocks = self
                .paginate(block_id, move |cursor| async move {
                    self.pager.list_children(block_id, cursor.as_deref()).await
                })
                .await?;

            for block in &mut blocks {
                if block.has_children {
                    let children = self.collect_children(&block.id).await?;
                    block.children = children;
                }
            }
            debug!(block_id, count = blocks.len(), "collected children");
            Ok(blocks)
        }
        .boxed()
    }

    /// Every page of a database, each with its block tree.
    pub async fn collect_database(&self, database_id: &str) -> Result<Vec<Page>, SourceError> {
        let database_id = normalize_id(database_id)?;
        let database_id = database_id.as_str();
        let mut pages = self
            .paginate(database_id, move |cursor| async move {
                self.pager
                    .query_database(database_id, cursor.as_deref())
                    .await
            })
            .await?;

        for page in &mut pages {
            let children = self.collect_children(&page.id).await?;
            page.children = children;
        }
        debug!(database_id, pages = pages.len(), "collected database");
        Ok(pages)
    }

    async fn paginate<T, F, Fut>(&self, id: &str, mut fetch: F) -> Result<Vec<T>, SourceError>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<Paginated<T>, SourceError>>,
    {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.with_retry(id, || fetch(cursor.clone())).await?;
            results.extend(page.results);
            if !page.has_more {
                return Ok(results);
            }

            match page.next_cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                stalled => {
                    return Err(SourceError::StalledCursor {
                        id: id.to_string(),
                        cursor: stalled,
                    });
                }
            }
        }
    }

    async fn with_retry<T, F, Fut>(&self, id: &str, mut operation: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let max_attempts = self.retry.max_attempts.get();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    return Err(SourceError::Exhausted {
                        id: id.to_string(),
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    warn!(
                        id,
                        attempt,
                        max_attempts,
                        error = %err,
                        "content request failed; retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl<P: BlockPager> ContentSource for PagedSource<P> {
    async fn fetch(&self, id: &str) -> Result<Page, SourceError> {
        let id = normalize_id(id)?;
        let mut page = self
            .with_retry(&id, || self.pager.retrieve_page(&id))
            .await?;
        let children = self.collect_children(&page.id).await?;
        page.children = children;
        Ok(page)
    }
}
