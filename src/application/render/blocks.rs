//! Recursive block tree walk.
//!
//! Siblings are grouped into render units (see [`super::list`]); units are
//! rendered concurrently through an ordered buffered stream so output order
//! always matches input order.

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::domain::block::Block;

use super::context::RenderContext;
use super::list::{RenderUnit, group_units};
use super::types::{BlockCall, ListCall};

pub(crate) fn render_tree<'a>(
    cx: RenderContext<'a>,
    blocks: &'a [Block],
) -> BoxFuture<'a, Vec<String>> {
    async move {
        let pending: Vec<_> = group_units(blocks)
            .into_iter()
            .map(|unit| render_unit(cx, unit))
            .collect();
        cx.join_ordered(pending).await
    }
    .boxed()
}

async fn render_unit<'a>(cx: RenderContext<'a>, unit: RenderUnit<'a>) -> String {
    match unit {
        RenderUnit::Single(block) => render_block(cx, block).await,
        RenderUnit::Run {
            item_type,
            container,
            items,
        } => {
            let pending: Vec<_> = items.iter().map(|item| render_block(cx, item)).collect();
            let rendered = cx.join_ordered(pending).await;

            debug!(
                list_type = container,
                item_type,
                items = rendered.len(),
                "rendering list"
            );
            let render = cx.registry().lists.resolve(container, None);
            render
                .call(
                    cx,
                    ListCall {
                        list_type: container,
                        item_type,
                        items: rendered,
                    },
                )
                .await
        }
    }
}

async fn render_block<'a>(cx: RenderContext<'a>, block: &'a Block) -> String {
    let (content, children) = futures::join!(
        cx.compose_rich_text(&block.payload),
        render_children(cx, block)
    );

    debug!(
        block_id = %block.id,
        block_type = %block.block_type,
        children = children.len(),
        "rendering block"
    );
    let render = cx.registry().blocks.resolve(&block.block_type, None);
    render
        .call(
            cx,
            BlockCall {
                block_type: &block.block_type,
                block_id: &block.id,
                payload: &block.payload,
                content: content.unwrap_or_default(),
                children,
            },
        )
        .await
}

async fn render_children<'a>(cx: RenderContext<'a>, block: &'a Block) -> Vec<String> {
    if block.has_children {
        cx.render_blocks(&block.children).await
    } else {
        Vec::new()
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::application::render::registry::{BlockRenderFn, ListRenderFn, Registry};
    use crate::domain::block::{BlockPayload, TextBlock};
    use crate::domain::rich_text::RichTextSpan;

    fn paragraph(id: &str, text: &str) -> Block {
        Block::new(
            id,
            "paragraph",
            BlockPayload::Paragraph(TextBlock {
                rich_text: vec![RichTextSpan::text(text)],
                color: None,
            }),
        )
    }

    fn bullet(id: &str, text: &str) -> Block {
        Block::new(
            id,
            "bulleted_list_item",
            BlockPayload::BulletedListItem(TextBlock {
                rich_text: vec![RichTextSpan::text(text)],
                color: None,
            }),
        )
    }

    #[tokio::test]
    async fn singleton_order_is_preserved_under_uneven_latency() {
        let mut registry = Registry::standard();
        registry.blocks.insert(
            "paragraph",
            BlockRenderFn::new(|_, call| {
                let delay = if call.block_id == "0" { 40 } else { 5 };
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    format!("{}\n", call.content)
                }
                .boxed()
            }),
        );
        let blocks: Vec<Block> = (0..6)
            .map(|index| paragraph(&index.to_string(), &format!("p{index}")))
            .collect();

        let rendered = RenderContext::new(&registry)
            .with_concurrency(4)
            .render_blocks(&blocks)
            .await;

        assert_eq!(rendered, ["p0\n", "p1\n", "p2\n", "p3\n", "p4\n", "p5\n"]);
    }

    #[tokio::test]
    async fn list_runs_become_one_element() {
        let registry = Registry::standard();
        let blocks = vec![
            bullet("1", "one"),
            bullet("2", "two"),
            bullet("3", "three"),
            paragraph("4", "after"),
        ];

        let rendered = RenderContext::new(&registry).render_blocks(&blocks).await;

        assert_eq!(rendered, ["- one\n- two\n- three\n", "after\n"]);
    }

    #[tokio::test]
    async fn list_container_is_invoked_once_per_run() {
        let mut registry = Registry::new();
        registry.lists.insert(
            "bulleted_list",
            ListRenderFn::from_sync(|_, call| {
                format!("<{}:{}:{}>", call.list_type, call.item_type, call.items.len())
            }),
        );
        let blocks = vec![bullet("1", "a"), bullet("2", "b")];

        let rendered = RenderContext::new(&registry).render_blocks(&blocks).await;

        assert_eq!(rendered, ["<bulleted_list:bulleted_list_item:2>"]);
    }

    #[tokio::test]
    async fn children_render_only_when_flagged() {
        let registry = Registry::standard();
        let mut parent = paragraph("p", "parent").with_children(vec![paragraph("c", "child")]);

        let rendered = RenderContext::new(&registry)
            .render_blocks(std::slice::from_ref(&parent))
            .await;
        assert_eq!(rendered, ["parent\n\nchild\n"]);

        parent.has_children = false;
        let rendered = RenderContext::new(&registry)
            .render_blocks(std::slice::from_ref(&parent))
            .await;
        assert_eq!(rendered, ["parent\n"]);
    }

    #[tokio::test]
    async fn unknown_types_degrade_without_failing() {
        let hologram: Block = serde_json::from_value(json!({
            "id": "h1",
            "type": "hologram",
            "hologram": { "spin": 1 }
        }))
        .expect("block decodes");
        let unsupported: Block = serde_json::from_value(json!({
            "id": "u1",
            "type": "unsupported",
            "unsupported": {}
        }))
        .expect("block decodes");

        let standard = Registry::standard();
        let rendered = RenderContext::new(&standard)
            .render_blocks(&[hologram.clone(), unsupported])
            .await;
        assert_eq!(
            rendered,
            ["<!-- Default block -->\n", "<!-- Unsupported block -->\n"]
        );

        let empty = Registry::new();
        let rendered = RenderContext::new(&empty)
            .render_blocks(std::slice::from_ref(&hologram))
            .await;
        assert_eq!(rendered, ["<!-- Unsupported block: hologram -->\n"]);
    }

    #[tokio::test]
    async fn known_payload_without_renderer_uses_default_entry() {
        let mut registry = Registry::standard();
        registry.blocks.remove("quote");
        let quote = Block::new(
            "q1",
            "quote",
            BlockPayload::Quote(TextBlock {
                rich_text: vec![RichTextSpan::text("said")],
                color: None,
            }),
        );

        let rendered = RenderContext::new(&registry)
            .render_blocks(std::slice::from_ref(&quote))
            .await;
        assert_eq!(rendered, ["<!-- Default block -->\n"]);
    }

    #[tokio::test]
    async fn registered_renderer_for_raw_type_receives_its_inline_text() {
        let template: Block = serde_json::from_value(json!({
            "id": "t1",
            "type": "template",
            "template": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": "Add item" },
                    "plain_text": "Add item"
                }]
            }
        }))
        .expect("block decodes");
        assert!(matches!(template.payload, BlockPayload::Unknown(_)));

        let mut registry = Registry::standard();
        registry.blocks.insert(
            "template",
            BlockRenderFn::from_sync(|_, call| format!("[{}]", call.content)),
        );

        let rendered = RenderContext::new(&registry)
            .render_blocks(std::slice::from_ref(&template))
            .await;
        assert_eq!(rendered, ["[Add item]"]);
    }
}
