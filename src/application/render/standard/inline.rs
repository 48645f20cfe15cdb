//! Span, mention and markup renderers.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::application::render::context::RenderContext;
use crate::application::render::registry::{
    DEFAULT_KEY, Markup, MentionRenderFn, RendererTable, SpanRenderFn,
};
use crate::application::render::rich_text::{apply_annotations, color_span};
use crate::application::render::types::{MentionCall, SpanCall};
use crate::domain::rich_text::{MentionKind, SpanKind};

pub(super) fn span_table() -> RendererTable<SpanRenderFn> {
    RendererTable::new()
        .with("text", SpanRenderFn::from_sync(text))
        .with("mention", SpanRenderFn::new(mention))
        .with("equation", SpanRenderFn::from_sync(equation))
        .with(DEFAULT_KEY, SpanRenderFn::from_sync(plain))
}

pub(super) fn mention_table() -> RendererTable<MentionRenderFn> {
    RendererTable::new()
        .with("page", MentionRenderFn::from_sync(page))
        .with("database", MentionRenderFn::from_sync(database))
        .with("date", MentionRenderFn::from_sync(date))
        .with("user", MentionRenderFn::from_sync(user))
        .with("link_preview", MentionRenderFn::from_sync(link_preview))
        .with(DEFAULT_KEY, MentionRenderFn::from_sync(mention_text))
}

pub fn standard_markup() -> Markup {
    Markup {
        bold: Some(Arc::new(|content: &str| format!("**{content}**"))),
        italic: Some(Arc::new(|content: &str| format!("*{content}*"))),
        strikethrough: Some(Arc::new(|content: &str| format!("~~{content}~~"))),
        underline: Some(Arc::new(|content: &str| format!("<u>{content}</u>"))),
        inline_code: Some(Arc::new(|content: &str| format!("`{content}`"))),
        color: Some(Arc::new(color_span)),
        link: Some(Arc::new(|content: &str, url: &str| format!("[{content}]({url})"))),
    }
}

fn text(cx: RenderContext<'_>, call: &SpanCall<'_>) -> String {
    let span = call.span;
    apply_annotations(
        &cx.registry().markup,
        span.content(),
        &span.annotations,
        span.link_url(),
    )
}

fn mention<'a>(cx: RenderContext<'a>, call: SpanCall<'a>) -> BoxFuture<'a, String> {
    let span = call.span;
    let SpanKind::Mention(mention) = &span.kind else {
        return async move { span.plain_text.clone() }.boxed();
    };
    let render = cx.registry().mentions.resolve(&mention.mention_type, None);
    render.call(cx, MentionCall { mention, span })
}

fn equation(_: RenderContext<'_>, call: &SpanCall<'_>) -> String {
    match &call.span.kind {
        SpanKind::Equation(equation) => format!("${}$", equation.expression),
        _ => call.span.plain_text.clone(),
    }
}

fn plain(_: RenderContext<'_>, call: &SpanCall<'_>) -> String {
    call.span.plain_text.clone()
}

fn page(_: RenderContext<'_>, call: &MentionCall<'_>) -> String {
    match &call.mention.kind {
        MentionKind::Page(page) => format!("page - {}", page.id),
        _ => call.span.plain_text.clone(),
    }
}

fn database(_: RenderContext<'_>, call: &MentionCall<'_>) -> String {
    match &call.mention.kind {
        MentionKind::Database(database) => format!("database - {}", database.id),
        _ => call.span.plain_text.clone(),
    }
}

fn date(_: RenderContext<'_>, call: &MentionCall<'_>) -> String {
    match &call.mention.kind {
        MentionKind::Date(range) => range.to_string(),
        _ => call.span.plain_text.clone(),
    }
}

fn user(_: RenderContext<'_>, call: &MentionCall<'_>) -> String {
    match &call.mention.kind {
        MentionKind::User(user) => format!("@{}", user.name.as_deref().unwrap_or(&user.id)),
        _ => call.span.plain_text.clone(),
    }
}

fn link_preview(_: RenderContext<'_>, call: &MentionCall<'_>) -> String {
    match &call.mention.kind {
        MentionKind::LinkPreview(link) => format!("[{}]({})", call.span.plain_text, link.url),
        _ => call.span.plain_text.clone(),
    }
}

fn mention_text(_: RenderContext<'_>, call: &MentionCall<'_>) -> String {
    call.span.plain_text.clone()
}
