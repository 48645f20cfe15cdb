//! Block tree rendering engine.
//!
//! The engine is a pure function of a document tree and a [`Registry`]:
//! renderers are resolved by type name, rich text is composed span by span,
//! and contiguous list items are grouped into one container. No state is
//! kept between calls, and unknown input degrades to placeholder output
//! rather than failing.

mod blocks;
mod casing;
mod context;
mod list;
mod properties;
mod registry;
mod rich_text;
mod standard;
mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::block::Block;
use crate::domain::page::Page;

pub use casing::{candidate_keys, to_lower_camel, to_snake};
pub use context::RenderContext;
pub use list::{LIST_FAMILY, RenderUnit, container_for, group_units};
pub use registry::{
    BlockRenderFn, ColorFn, DEFAULT_KEY, LinkFn, ListRenderFn, Markup, MarkupFn, MentionRenderFn,
    PropertyRenderFn, Registry, RenderFunction, RendererTable, SpanRenderFn, UNSUPPORTED_KEY,
};
pub use rich_text::{RichTextContainer, apply_annotations, color_span};
pub use standard::{plain_value, standard_markup, standard_registry};
pub use types::{
    BlockCall, DEFAULT_CONCURRENCY, ListCall, MentionCall, PropertyCall, RenderError,
    RenderOptions, RenderedPage, SpanCall,
};

/// Render a sibling sequence of blocks, one string per render unit.
pub async fn render_blocks(blocks: &[Block], registry: &Registry) -> Vec<String> {
    RenderContext::new(registry).render_blocks(blocks).await
}

/// Render page metadata into a lowerCamelCase-keyed mapping.
pub async fn render_properties(page: &Page, registry: &Registry) -> BTreeMap<String, String> {
    properties::render_page_properties(RenderContext::new(registry), page).await
}

/// Render properties and block tree of `page` together.
pub async fn render_page(page: &Page, registry: &Registry, options: &RenderOptions) -> RenderedPage {
    let cx = RenderContext::new(registry).with_concurrency(options.concurrency);
    let (properties, blocks) = futures::join!(
        properties::render_page_properties(cx, page),
        cx.render_blocks(&page.children)
    );
    debug!(
        page_id = %page.id,
        properties = properties.len(),
        units = blocks.len(),
        "page rendered"
    );

    RenderedPage {
        id: page.id.clone(),
        properties,
        blocks,
    }
}

/// Shared page rendering service bound to one registry.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    registry: Arc<Registry>,
    options: RenderOptions,
}

impl PageRenderer {
    pub fn new(registry: Arc<Registry>, options: RenderOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub async fn render(&self, page: &Page) -> RenderedPage {
        render_page(page, &self.registry, &self.options).await
    }

    /// Render `page` straight to a document string.
    pub async fn render_document(
        &self,
        page: &Page,
        front_matter: bool,
    ) -> Result<String, RenderError> {
        self.render(page).await.to_markdown(front_matter)
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(standard_registry(), RenderOptions::default())
    }
}
