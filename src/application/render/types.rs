use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::block::BlockPayload;
use crate::domain::page::PropertyValue;
use crate::domain::rich_text::{Mention, RichTextSpan};

pub const DEFAULT_CONCURRENCY: usize = 8;

/// Arguments handed to a block renderer.
#[derive(Debug, Clone)]
pub struct BlockCall<'a> {
    pub block_type: &'a str,
    pub block_id: &'a str,
    pub payload: &'a BlockPayload,
    /// Composed inline content, empty when the block has none.
    pub content: String,
    /// Rendered children in order, empty unless the block has children.
    pub children: Vec<String>,
}

/// Arguments handed to a list container renderer.
#[derive(Debug, Clone)]
pub struct ListCall<'a> {
    /// Container name (`bulleted_list`, `numbered_list`, `to_do_list`).
    pub list_type: &'a str,
    /// Type shared by every item of the run.
    pub item_type: &'a str,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SpanCall<'a> {
    pub span: &'a RichTextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct MentionCall<'a> {
    pub mention: &'a Mention,
    /// The span carrying the mention, for its `plain_text` and `href`.
    pub span: &'a RichTextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyCall<'a> {
    /// Property name as it appears on the page.
    pub name: &'a str,
    pub value: &'a PropertyValue,
    pub page_id: &'a str,
}

/// Tunables for a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Upper bound on sibling units or spans rendered at once.
    pub concurrency: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Rendered page: property mapping plus one string per top-level render unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub id: String,
    pub properties: BTreeMap<String, String>,
    pub blocks: Vec<String>,
}

impl RenderedPage {
    /// Markup body: rendered units separated by blank lines.
    pub fn body(&self) -> String {
        self.blocks.join("\n")
    }

    /// The whole document, optionally preceded by TOML front matter built
    /// from the rendered properties.
    pub fn to_markdown(&self, front_matter: bool) -> Result<String, RenderError> {
        let body = self.body();
        if !front_matter || self.properties.is_empty() {
            return Ok(body);
        }

        let header = toml::to_string(&self.properties)?;
        Ok(format!("+++\n{header}+++\n\n{body}"))
    }
}

/// Errors surfaced while assembling a rendered document. Rendering itself
/// never fails; unknown input degrades to placeholder output instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("front matter serialisation failed: {0}")]
    FrontMatter(#[from] toml::ser::Error),
}
