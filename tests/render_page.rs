use std::sync::Arc;

use blockdown::application::render::{
    BlockRenderFn, PageRenderer, PropertyRenderFn, Registry, RenderOptions, render_page,
    standard_registry,
};
use blockdown::application::source::ContentSource;
use blockdown::domain::page::Page;
use blockdown::infra::dump::JsonFileSource;

fn load_page() -> Page {
    serde_json::from_str(include_str!("fixtures/page.json")).expect("fixture decodes")
}

#[tokio::test]
async fn fixture_document_matches() {
    let renderer = PageRenderer::default();
    let document = renderer
        .render_document(&load_page(), true)
        .await
        .expect("document renders");

    let expected = include_str!("fixtures/page.md");
    assert_eq!(expected.trim_end(), document.trim_end());
}

#[tokio::test]
async fn fixture_render_units_snapshot() {
    let registry = standard_registry();
    let rendered = render_page(&load_page(), &registry, &RenderOptions::default()).await;

    insta::assert_debug_snapshot!(rendered.blocks, @r###"
    [
        "# Overview\n",
        "Ship the **renderer** today.\n",
        "- parse\n- render\n",
        "- [x] ship\n",
        "```rust\nfn main() {}\n```\n",
        "---\n",
        "<!-- Default block -->\n",
    ]
    "###);
    insta::assert_debug_snapshot!(rendered.properties, @r###"
    {
        "estimate": "3",
        "name": "Launch Notes",
        "published": "true",
        "tags": "rust, docs",
    }
    "###);
}

#[tokio::test]
async fn rendering_is_deterministic_across_concurrency_levels() {
    let page = load_page();
    let registry = standard_registry();

    let serial = render_page(&page, &registry, &RenderOptions { concurrency: 1 }).await;
    let wide = render_page(&page, &registry, &RenderOptions { concurrency: 64 }).await;

    assert_eq!(serial, wide);
}

#[tokio::test]
async fn file_source_feeds_the_renderer() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("launch.json");
    std::fs::write(&path, include_str!("fixtures/page.json")).expect("write dump");

    let source = JsonFileSource::new(&path);
    let page = source
        .fetch(&source.default_id())
        .await
        .expect("dump loads");
    let document = PageRenderer::default()
        .render_document(&page, false)
        .await
        .expect("document renders");

    assert!(document.starts_with("# Overview\n\n"));
    assert!(!document.contains("+++"));
}

#[tokio::test]
async fn custom_renderers_override_standard_ones() {
    let mut registry = Registry::standard();
    registry.blocks.insert(
        "divider",
        BlockRenderFn::from_sync(|_, _| "<hr />\n".to_string()),
    );
    registry.properties.insert(
        "Published",
        PropertyRenderFn::from_sync(|_, call| format!("published:{}", call.page_id)),
    );

    let renderer = PageRenderer::new(Arc::new(registry), RenderOptions::default());
    let rendered = renderer.render(&load_page()).await;

    assert_eq!(rendered.blocks[5], "<hr />\n");
    assert_eq!(
        rendered.properties["published"],
        "published:0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0"
    );
    assert_eq!(rendered.properties["estimate"], "3");
}
