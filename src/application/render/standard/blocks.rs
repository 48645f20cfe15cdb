//! Markdown + HTML block and list renderers.

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;
use url::Url;

use crate::application::render::context::RenderContext;
use crate::application::render::registry::{
    BlockRenderFn, DEFAULT_KEY, ListRenderFn, RendererTable, UNSUPPORTED_KEY,
};
use crate::application::render::types::{BlockCall, ListCall};
use crate::domain::block::{BlockPayload, MediaBlock};

const YOUTUBE_EMBED: &str = "https://www.youtube.com/embed/";
const IFRAME_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

pub(super) fn block_table() -> RendererTable<BlockRenderFn> {
    RendererTable::new()
        .with("paragraph", BlockRenderFn::from_sync(paragraph))
        .with("heading_1", BlockRenderFn::from_sync(heading_1))
        .with("heading_2", BlockRenderFn::from_sync(heading_2))
        .with("heading_3", BlockRenderFn::from_sync(heading_3))
        .with("bulleted_list_item", BlockRenderFn::from_sync(bulleted_list_item))
        .with("numbered_list_item", BlockRenderFn::from_sync(numbered_list_item))
        .with("to_do", BlockRenderFn::from_sync(to_do))
        .with("toggle", BlockRenderFn::from_sync(toggle))
        .with("quote", BlockRenderFn::from_sync(quote))
        .with("divider", BlockRenderFn::from_sync(divider))
        .with("table", BlockRenderFn::from_sync(table))
        .with("table_row", BlockRenderFn::new(table_row))
        .with("callout", BlockRenderFn::from_sync(callout))
        .with("link_to_page", BlockRenderFn::from_sync(link_to_page))
        .with("image", BlockRenderFn::from_sync(image))
        .with("video", BlockRenderFn::from_sync(video))
        .with("bookmark", BlockRenderFn::from_sync(link))
        .with("embed", BlockRenderFn::from_sync(link))
        .with("link_preview", BlockRenderFn::from_sync(link))
        .with("code", BlockRenderFn::from_sync(code))
        .with("equation", BlockRenderFn::from_sync(equation))
        .with("child_page", BlockRenderFn::from_sync(child_page))
        .with("child_database", BlockRenderFn::from_sync(child_page))
        .with("file", BlockRenderFn::from_sync(file))
        .with("pdf", BlockRenderFn::from_sync(file))
        .with(DEFAULT_KEY, BlockRenderFn::from_sync(default_block))
        .with(UNSUPPORTED_KEY, BlockRenderFn::from_sync(unsupported_block))
}

pub(super) fn list_table() -> RendererTable<ListRenderFn> {
    RendererTable::new()
        .with("bulleted_list", ListRenderFn::from_sync(list))
        .with("numbered_list", ListRenderFn::from_sync(list))
        .with("to_do_list", ListRenderFn::from_sync(list))
}

/// `head` followed by the rendered children, blank-line separated.
fn with_children(head: String, children: &[String]) -> String {
    if children.is_empty() {
        return head;
    }
    format!("{head}\n{}", children.join("\n"))
}

/// Children of a list item, indented under the item's marker.
fn nested(children: &[String], width: usize) -> String {
    let indent = " ".repeat(width);
    let mut output = String::new();
    for line in children.iter().flat_map(|child| child.trim_end().lines()) {
        output.push('\n');
        if !line.is_empty() {
            output.push_str(&indent);
            output.push_str(line);
        }
    }
    output
}

fn paragraph(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    with_children(format!("{}\n", call.content), &call.children)
}

fn heading(level: usize, call: &BlockCall<'_>) -> String {
    let head = format!("{} {}\n", "#".repeat(level), call.content);
    with_children(head, &call.children)
}

fn heading_1(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    heading(1, call)
}

fn heading_2(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    heading(2, call)
}

fn heading_3(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    heading(3, call)
}

fn bulleted_list_item(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    format!("- {}{}", call.content, nested(&call.children, 2))
}

fn numbered_list_item(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    format!("1. {}{}", call.content, nested(&call.children, 3))
}

fn to_do(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let checked = matches!(call.payload, BlockPayload::ToDo(todo) if todo.checked);
    let mark = if checked { 'x' } else { ' ' };
    format!("- [{mark}] {}{}", call.content, nested(&call.children, 2))
}

fn list(_: RenderContext<'_>, call: &ListCall<'_>) -> String {
    format!("{}\n", call.items.join("\n"))
}

fn toggle(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    format!(
        "<details>\n<summary>{}</summary>\n{}</details>\n",
        call.content,
        call.children.join("\n")
    )
}

fn quote(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let body = with_children(call.content.clone(), &call.children);
    let mut output = String::new();
    for line in body.trim_end().lines() {
        if line.is_empty() {
            output.push_str(">\n");
        } else {
            output.push_str("> ");
            output.push_str(line);
            output.push('\n');
        }
    }
    if output.is_empty() {
        output.push_str(">\n");
    }
    output
}

fn divider(_: RenderContext<'_>, _: &BlockCall<'_>) -> String {
    "---\n".to_string()
}

/// First row, a separator sized by the table width, then remaining rows.
fn table(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let Some((first, rest)) = call.children.split_first() else {
        return String::new();
    };
    let width = match call.payload {
        BlockPayload::Table(table) if table.table_width > 0 => table.table_width,
        _ => first.matches(" | ").count() + 1,
    };

    let separator = format!("| {} |", vec!["---"; width].join(" | "));
    let mut rows = vec![first.as_str(), separator.as_str()];
    rows.extend(rest.iter().map(String::as_str));
    format!("{}\n", rows.join("\n"))
}

fn table_row<'a>(cx: RenderContext<'a>, call: BlockCall<'a>) -> BoxFuture<'a, String> {
    async move {
        let BlockPayload::TableRow(row) = call.payload else {
            return String::new();
        };
        let pending: Vec<_> = row
            .cells
            .iter()
            .map(|cell| cx.compose_rich_text(cell.as_slice()))
            .collect();
        let cells: Vec<String> = cx
            .join_ordered(pending)
            .await
            .into_iter()
            .map(|cell| escape_cell(&cell.unwrap_or_default()))
            .collect();
        format!("| {} |", cells.join(" | "))
    }
    .boxed()
}

fn escape_cell(cell: &str) -> String {
    cell.trim().replace('|', "\\|").replace('\n', "<br>")
}

fn callout(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let emoji = match call.payload {
        BlockPayload::Callout(callout) => callout
            .icon
            .as_ref()
            .and_then(|icon| icon.emoji())
            .unwrap_or_default(),
        _ => "",
    };
    let body = with_children(call.content.clone(), &call.children);
    format!("<div data-callout=\"{emoji}\">{body}</div>\n")
}

fn link_to_page(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    match call.payload {
        BlockPayload::LinkToPage(link) => match link.target() {
            Some(target) => format!("[{target}]({target})\n"),
            None => String::new(),
        },
        _ => String::new(),
    }
}

fn media(payload: &BlockPayload) -> Option<&MediaBlock> {
    match payload {
        BlockPayload::Image(media)
        | BlockPayload::Video(media)
        | BlockPayload::File(media)
        | BlockPayload::Pdf(media) => Some(media),
        _ => None,
    }
}

fn image(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let Some(url) = media(call.payload).and_then(|media| media.source.url()) else {
        return String::new();
    };
    let alt = call.content.replace('"', "&quot;");
    format!("<img src=\"{url}\" alt=\"{alt}\" />\n")
}

fn video(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let Some(url) = media(call.payload).and_then(|media| media.source.url()) else {
        return String::new();
    };
    match youtube_embed(url) {
        Some(embed) => format!(
            "<iframe width=\"560\" height=\"315\" src=\"{embed}\" frameborder=\"0\" allow=\"{IFRAME_ALLOW}\" allowfullscreen></iframe>\n"
        ),
        None => format!("<!-- Video - {url} -->\n"),
    }
}

/// Embed URL for `youtu.be/<id>` and `youtube.com/watch?v=<id>` links.
fn youtube_embed(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let video_id = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" if url.path() == "/watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        _ => None,
    }?;
    (!video_id.is_empty()).then(|| format!("{YOUTUBE_EMBED}{video_id}"))
}

fn link(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let url = match call.payload {
        BlockPayload::Bookmark(link) | BlockPayload::Embed(link) | BlockPayload::LinkPreview(link) => {
            link.url.as_str()
        }
        _ => return String::new(),
    };
    let text = if call.content.is_empty() { url } else { &call.content };
    format!("[{text}]({url})\n")
}

fn code(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let language = match call.payload {
        BlockPayload::Code(code) if code.language != "plain text" => code.language.as_str(),
        _ => "",
    };
    format!("```{language}\n{}\n```\n", call.content)
}

fn equation(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    match call.payload {
        BlockPayload::Equation(equation) => format!("$$\n{}\n$$\n", equation.expression),
        _ => String::new(),
    }
}

fn child_page(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let title = match call.payload {
        BlockPayload::ChildPage(page) | BlockPayload::ChildDatabase(page) => page.title.as_str(),
        _ => "",
    };
    let title = if title.is_empty() { call.block_id } else { title };
    format!("[{title}]({})\n", call.block_id)
}

fn file(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    let Some(media) = media(call.payload) else {
        return String::new();
    };
    let Some(url) = media.source.url() else {
        return String::new();
    };
    let text = match (&call.content, media.name.as_deref()) {
        (content, _) if !content.is_empty() => content.as_str(),
        (_, Some(name)) if !name.is_empty() => name,
        _ => url,
    };
    format!("[{text}]({url})\n")
}

fn default_block(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    debug!(
        block_type = call.block_type,
        block_id = call.block_id,
        "no dedicated renderer; using default block"
    );
    "<!-- Default block -->\n".to_string()
}

fn unsupported_block(_: RenderContext<'_>, call: &BlockCall<'_>) -> String {
    debug!(block_type = call.block_type, "unsupported block");
    "<!-- Unsupported block -->\n".to_string()
}
