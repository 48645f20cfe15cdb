//! Annotated inline text as delivered by the content platform.
//!
//! A *rich text run* is an ordered `Vec<RichTextSpan>`. Each span carries its
//! own annotations and a type-indexed body (`text`, `mention`, `equation`, or
//! anything the platform adds later, which is kept verbatim as
//! [`SpanKind::Unknown`]).

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::decode;

pub const DEFAULT_COLOR: &str = "default";

/// Styling flags attached to a span.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl Annotations {
    /// Colour name when it differs from the platform default.
    pub fn custom_color(&self) -> Option<&str> {
        let color = self.color.trim();
        (!color.is_empty() && color != DEFAULT_COLOR).then_some(color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Equation {
    #[serde(default)]
    pub expression: String,
}

/// Start and optional end of a date or date range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.end {
            Some(end) => write!(f, "{} - {}", self.start, end),
            None => f.write_str(&self.start),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectRef {
    pub id: String,
}

/// Body of a `mention` span.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawMention")]
pub struct Mention {
    pub mention_type: String,
    pub kind: MentionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MentionKind {
    Page(ObjectRef),
    Database(ObjectRef),
    Date(DateRange),
    User(User),
    LinkPreview(Link),
    Unknown(Value),
}

#[derive(Deserialize)]
struct RawMention {
    #[serde(rename = "type", default)]
    mention_type: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawMention> for Mention {
    fn from(raw: RawMention) -> Self {
        let RawMention {
            mention_type,
            mut rest,
        } = raw;
        let body = rest.remove(&mention_type).unwrap_or(Value::Null);
        let kind = match mention_type.as_str() {
            "page" => decode(&body).map(MentionKind::Page),
            "database" => decode(&body).map(MentionKind::Database),
            "date" => decode(&body).map(MentionKind::Date),
            "user" => decode(&body).map(MentionKind::User),
            "link_preview" => decode(&body).map(MentionKind::LinkPreview),
            _ => None,
        }
        .unwrap_or(MentionKind::Unknown(body));

        Self { mention_type, kind }
    }
}

/// One annotated piece of inline text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSpan")]
pub struct RichTextSpan {
    /// Open type tag (`text`, `mention`, `equation`, ...).
    pub span_type: String,
    pub plain_text: String,
    pub href: Option<String>,
    pub annotations: Annotations,
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpanKind {
    Text(TextContent),
    Mention(Mention),
    Equation(Equation),
    Unknown(Value),
}

impl RichTextSpan {
    /// Plain `text` span without annotations.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            span_type: "text".to_string(),
            plain_text: content.clone(),
            href: None,
            annotations: Annotations::default(),
            kind: SpanKind::Text(TextContent {
                content,
                link: None,
            }),
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Textual content for `text` spans, falling back to `plain_text`.
    pub fn content(&self) -> &str {
        match &self.kind {
            SpanKind::Text(text) => text.content.as_str(),
            _ => self.plain_text.as_str(),
        }
    }

    pub fn link_url(&self) -> Option<&str> {
        match &self.kind {
            SpanKind::Text(TextContent {
                link: Some(link), ..
            }) => Some(link.url.as_str()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawSpan {
    #[serde(rename = "type", default)]
    span_type: String,
    #[serde(default)]
    plain_text: String,
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    annotations: Annotations,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawSpan> for RichTextSpan {
    fn from(raw: RawSpan) -> Self {
        let RawSpan {
            span_type,
            plain_text,
            href,
            annotations,
            mut rest,
        } = raw;
        let body = rest.remove(&span_type).unwrap_or(Value::Null);
        let kind = match span_type.as_str() {
            "text" => decode(&body).map(SpanKind::Text),
            "mention" => decode(&body).map(SpanKind::Mention),
            "equation" => decode(&body).map(SpanKind::Equation),
            _ => None,
        }
        .unwrap_or(SpanKind::Unknown(body));

        Self {
            span_type,
            plain_text,
            href,
            annotations,
            kind,
        }
    }
}

/// Concatenated `plain_text` of a run, without any markup.
pub fn plain_text(spans: &[RichTextSpan]) -> String {
    spans.iter().map(|span| span.plain_text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_span_decodes_annotations_and_link() {
        let span: RichTextSpan = serde_json::from_value(json!({
            "type": "text",
            "text": { "content": "docs", "link": { "url": "https://example.com" } },
            "annotations": { "bold": true, "color": "red_background" },
            "plain_text": "docs",
            "href": "https://example.com"
        }))
        .expect("span decodes");

        assert_eq!(span.span_type, "text");
        assert!(span.annotations.bold);
        assert!(!span.annotations.italic);
        assert_eq!(span.annotations.custom_color(), Some("red_background"));
        assert_eq!(span.link_url(), Some("https://example.com"));
        assert_eq!(span.content(), "docs");
    }

    #[test]
    fn mention_span_decodes_date_body() {
        let span: RichTextSpan = serde_json::from_value(json!({
            "type": "mention",
            "mention": { "type": "date", "date": { "start": "2024-01-01", "end": null } },
            "plain_text": "2024-01-01"
        }))
        .expect("span decodes");

        match span.kind {
            SpanKind::Mention(Mention {
                kind: MentionKind::Date(range),
                ..
            }) => {
                assert_eq!(range.start, "2024-01-01");
                assert_eq!(range.end, None);
                assert_eq!(range.to_string(), "2024-01-01");
            }
            other => panic!("unexpected span kind: {other:?}"),
        }
    }

    #[test]
    fn unrecognised_span_type_is_kept_as_data() {
        let span: RichTextSpan = serde_json::from_value(json!({
            "type": "sparkle",
            "sparkle": { "level": 3 },
            "plain_text": "*"
        }))
        .expect("span decodes");

        assert_eq!(span.span_type, "sparkle");
        assert_eq!(span.kind, SpanKind::Unknown(json!({ "level": 3 })));
        assert_eq!(span.content(), "*");
    }

    #[test]
    fn default_color_is_not_custom() {
        assert_eq!(Annotations::default().custom_color(), None);
    }
}
