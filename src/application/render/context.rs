use std::future::Future;

use futures::future::BoxFuture;
use futures::{StreamExt, stream};

use crate::domain::block::Block;

use super::blocks;
use super::registry::Registry;
use super::rich_text::{self, RichTextContainer};
use super::types::DEFAULT_CONCURRENCY;

/// Explicit handle passed to every render function so composite renderers
/// can re-enter the engine (compose cell text, render nested blocks) with
/// the same registry.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'r> {
    registry: &'r Registry,
    concurrency: usize,
}

impl<'r> RenderContext<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Clamp to at least one in-flight unit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Drive `pending` with at most [`Self::concurrency`] in flight, yielding
    /// outputs in input order regardless of completion order.
    pub async fn join_ordered<F>(self, pending: Vec<F>) -> Vec<F::Output>
    where
        F: Future,
    {
        stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Compose the rich text carried by `container`; `None` when it has none.
    pub async fn compose_rich_text<C>(self, container: &C) -> Option<String>
    where
        C: RichTextContainer + ?Sized,
    {
        rich_text::compose(self, container).await
    }

    /// Render a sibling sequence, one string per render unit.
    pub fn render_blocks(self, blocks: &'r [Block]) -> BoxFuture<'r, Vec<String>> {
        blocks::render_tree(self, blocks)
    }
}
