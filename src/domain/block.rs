//! Block tree nodes.
//!
//! The platform tags every block with an open `type` string and stores the
//! type-specific body under a key of the same name. Known bodies decode into
//! typed variants; anything else (new block types, bodies that fail to decode)
//! is preserved as [`BlockPayload::Unknown`] so rendering can degrade instead
//! of failing.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::decode;
use super::page::{FileRef, Icon};
use super::rich_text::RichTextSpan;

/// One node of the content tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub block_type: String,
    pub has_children: bool,
    /// Child blocks in platform order. Empty until a content source fills them in.
    pub children: Vec<Block>,
    pub payload: BlockPayload,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>, payload: BlockPayload) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            has_children: false,
            children: Vec::new(),
            payload,
        }
    }

    /// Attach children and mark the block as having them.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    block_type: String,
    #[serde(default)]
    has_children: bool,
    #[serde(default)]
    children: Vec<Block>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let RawBlock {
            id,
            block_type,
            has_children,
            children,
            mut rest,
        } = raw;
        let body = rest.remove(&block_type).unwrap_or(Value::Null);
        let payload = BlockPayload::from_parts(&block_type, body);

        Self {
            id,
            block_type,
            has_children,
            children,
            payload,
        }
    }
}

/// Type-indexed block body.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockPayload {
    Paragraph(TextBlock),
    Heading1(HeadingBlock),
    Heading2(HeadingBlock),
    Heading3(HeadingBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    ToDo(ToDoBlock),
    Toggle(TextBlock),
    Quote(TextBlock),
    Callout(CalloutBlock),
    Code(CodeBlock),
    Equation(EquationBlock),
    Divider,
    Table(TableBlock),
    TableRow(TableRowBlock),
    Image(MediaBlock),
    Video(MediaBlock),
    File(MediaBlock),
    Pdf(MediaBlock),
    Bookmark(LinkBlock),
    Embed(LinkBlock),
    LinkPreview(LinkBlock),
    LinkToPage(LinkToPageBlock),
    ChildPage(ChildPageBlock),
    ChildDatabase(ChildPageBlock),
    Unknown(Value),
}

impl BlockPayload {
    /// Decode the body stored under `block_type`, keeping it raw when the
    /// type is unrecognised or the body does not have the expected shape.
    pub fn from_parts(block_type: &str, body: Value) -> Self {
        let decoded = match block_type {
            "paragraph" => decode(&body).map(Self::Paragraph),
            "heading_1" => decode(&body).map(Self::Heading1),
            "heading_2" => decode(&body).map(Self::Heading2),
            "heading_3" => decode(&body).map(Self::Heading3),
            "bulleted_list_item" => decode(&body).map(Self::BulletedListItem),
            "numbered_list_item" => decode(&body).map(Self::NumberedListItem),
            "to_do" => decode(&body).map(Self::ToDo),
            "toggle" => decode(&body).map(Self::Toggle),
            "quote" => decode(&body).map(Self::Quote),
            "callout" => decode(&body).map(Self::Callout),
            "code" => decode(&body).map(Self::Code),
            "equation" => decode(&body).map(Self::Equation),
            "divider" => Some(Self::Divider),
            "table" => decode(&body).map(Self::Table),
            "table_row" => decode(&body).map(Self::TableRow),
            "image" => decode(&body).map(Self::Image),
            "video" => decode(&body).map(Self::Video),
            "file" => decode(&body).map(Self::File),
            "pdf" => decode(&body).map(Self::Pdf),
            "bookmark" => decode(&body).map(Self::Bookmark),
            "embed" => decode(&body).map(Self::Embed),
            "link_preview" => decode(&body).map(Self::LinkPreview),
            "link_to_page" => decode(&body).map(Self::LinkToPage),
            "child_page" => decode(&body).map(Self::ChildPage),
            "child_database" => decode(&body).map(Self::ChildDatabase),
            _ => None,
        };

        decoded.unwrap_or(Self::Unknown(body))
    }

    /// The block's own inline text, if it has any. Raw bodies are searched
    /// for a `rich_text` array.
    pub fn rich_text(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        let spans = match self {
            Self::Paragraph(block)
            | Self::BulletedListItem(block)
            | Self::NumberedListItem(block)
            | Self::Toggle(block)
            | Self::Quote(block) => &block.rich_text,
            Self::Heading1(block) | Self::Heading2(block) | Self::Heading3(block) => {
                &block.rich_text
            }
            Self::ToDo(block) => &block.rich_text,
            Self::Callout(block) => &block.rich_text,
            Self::Code(block) => &block.rich_text,
            Self::Unknown(body) => return raw_spans(body, "rich_text"),
            _ => return None,
        };
        Some(Cow::Borrowed(spans.as_slice()))
    }

    /// Caption text for media, link and code blocks, or a `caption` array in
    /// a raw body.
    pub fn caption(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        let spans = match self {
            Self::Image(block) | Self::Video(block) | Self::File(block) | Self::Pdf(block) => {
                &block.caption
            }
            Self::Bookmark(block) | Self::Embed(block) | Self::LinkPreview(block) => {
                &block.caption
            }
            Self::Code(block) => &block.caption,
            Self::Unknown(body) => return raw_spans(body, "caption"),
            _ => return None,
        };
        Some(Cow::Borrowed(spans.as_slice()))
    }
}

fn raw_spans(body: &Value, field: &str) -> Option<Cow<'static, [RichTextSpan]>> {
    body.get(field)
        .and_then(decode::<Vec<RichTextSpan>>)
        .map(Cow::Owned)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeadingBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_toggleable: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquationBlock {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableBlock {
    pub table_width: usize,
    #[serde(default)]
    pub has_column_header: bool,
    #[serde(default)]
    pub has_row_header: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichTextSpan>>,
}

/// Image, video, file and pdf bodies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaBlock {
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub source: FileRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkBlock {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichTextSpan>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkToPageBlock {
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub database_id: Option<String>,
}

impl LinkToPageBlock {
    pub fn target(&self) -> Option<&str> {
        self.page_id.as_deref().or(self.database_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChildPageBlock {
    #[serde(default)]
    pub title: String,
}
