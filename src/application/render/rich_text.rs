//! Rich text composition.
//!
//! A container's spans are rendered concurrently through the span table and
//! concatenated strictly in their original order. `text` spans run the
//! annotation pipeline in [`apply_annotations`].

use std::borrow::Cow;

use tracing::debug;

use crate::domain::block::BlockPayload;
use crate::domain::rich_text::{Annotations, RichTextSpan};

use super::context::RenderContext;
use super::registry::Markup;
use super::types::SpanCall;

/// Anything that may carry inline text. Composition prefers a non-empty
/// `rich_text` field, then a non-empty `caption`, then the value itself as a
/// span sequence.
///
/// Spans are returned as [`Cow`] so containers holding raw JSON can decode
/// them on demand.
pub trait RichTextContainer: Sync {
    fn rich_text(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        None
    }

    fn caption(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        None
    }

    fn spans(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        None
    }
}

impl RichTextContainer for BlockPayload {
    fn rich_text(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        BlockPayload::rich_text(self)
    }

    fn caption(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        BlockPayload::caption(self)
    }
}

impl RichTextContainer for [RichTextSpan] {
    fn spans(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        Some(Cow::Borrowed(self))
    }
}

impl RichTextContainer for Vec<RichTextSpan> {
    fn spans(&self) -> Option<Cow<'_, [RichTextSpan]>> {
        Some(Cow::Borrowed(self.as_slice()))
    }
}

fn non_empty(spans: Option<Cow<'_, [RichTextSpan]>>) -> Option<Cow<'_, [RichTextSpan]>> {
    spans.filter(|spans| !spans.is_empty())
}

fn select_spans<C>(container: &C) -> Option<Cow<'_, [RichTextSpan]>>
where
    C: RichTextContainer + ?Sized,
{
    non_empty(container.rich_text())
        .or_else(|| non_empty(container.caption()))
        .or_else(|| non_empty(container.spans()))
}

pub(crate) async fn compose<C>(cx: RenderContext<'_>, container: &C) -> Option<String>
where
    C: RichTextContainer + ?Sized,
{
    let Some(spans) = select_spans(container) else {
        debug!("no rich text to compose");
        return None;
    };

    let pending: Vec<_> = spans
        .iter()
        .map(|span| {
            debug!(span_type = %span.span_type, "rendering span");
            let render = cx.registry().spans.resolve(&span.span_type, None);
            render.call(cx, SpanCall { span })
        })
        .collect();
    let rendered = cx.join_ordered(pending).await;

    Some(rendered.concat())
}

/// Style `content` according to `annotations`: bold, italic, strikethrough,
/// underline, inline code, colour, then link. Styling wraps the trimmed text
/// and the original surrounding whitespace is kept outside the markup.
pub fn apply_annotations(
    markup: &Markup,
    content: &str,
    annotations: &Annotations,
    link: Option<&str>,
) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }

    let mut styled = trimmed.to_string();
    let steps = [
        (annotations.bold, &markup.bold),
        (annotations.italic, &markup.italic),
        (annotations.strikethrough, &markup.strikethrough),
        (annotations.underline, &markup.underline),
        (annotations.code, &markup.inline_code),
    ];
    for (enabled, apply) in steps {
        if let (true, Some(apply)) = (enabled, apply) {
            styled = apply(&styled);
        }
    }
    if let (Some(color), Some(apply)) = (annotations.custom_color(), &markup.color) {
        styled = apply(&styled, color);
    }
    if let (Some(url), Some(apply)) = (link, &markup.link) {
        styled = apply(&styled, url);
    }

    let leading = content.len() - content.trim_start().len();
    let trailing = leading + trimmed.len();
    format!("{}{}{}", &content[..leading], styled, &content[trailing..])
}

/// `red` → foreground, `red_background` → background.
pub fn color_span(content: &str, color: &str) -> String {
    let style = match color.split_once('_') {
        Some((hue, rest)) if !rest.is_empty() => format!("background: {hue}"),
        Some((hue, _)) => format!("color: {hue}"),
        None => format!("color: {color}"),
    };
    format!(r#"<span data-color="{color}" style="{style}">{content}</span>"#)
}
