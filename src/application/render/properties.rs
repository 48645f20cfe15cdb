//! Page property rendering.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::page::{Page, PropertyValue};

use super::casing::to_lower_camel;
use super::context::RenderContext;
use super::types::PropertyCall;

/// Render every property of `page`, plus its `cover` and `icon`, into a
/// mapping keyed by lowerCamelCase property name.
///
/// A renderer registered under the property's name wins; otherwise the
/// property's type resolves through the full fallback chain. When two names
/// collapse onto the same key the later one in name order wins.
pub(crate) async fn render_page_properties(
    cx: RenderContext<'_>,
    page: &Page,
) -> BTreeMap<String, String> {
    let entries = page.property_entries();
    let pending: Vec<_> = entries
        .iter()
        .map(|(name, value)| render_property(cx, &page.id, name, value))
        .collect();
    let rendered = cx.join_ordered(pending).await;

    let mut properties = BTreeMap::new();
    for (key, value) in rendered {
        if properties.contains_key(&key) {
            debug!(%key, "property key collision; keeping the later value");
        }
        properties.insert(key, value);
    }
    properties
}

async fn render_property<'a>(
    cx: RenderContext<'a>,
    page_id: &'a str,
    name: &'a str,
    value: &'a PropertyValue,
) -> (String, String) {
    let table = &cx.registry().properties;
    let render = match table.lookup(name) {
        Some(render) => render.clone(),
        None => table.resolve(&value.property_type, None),
    };

    debug!(
        property = name,
        property_type = %value.property_type,
        "rendering property"
    );
    let rendered = render
        .call(
            cx,
            PropertyCall {
                name,
                value,
                page_id,
            },
        )
        .await;
    (property_key(name), rendered)
}

/// Output key for a property name. Names with no alphanumeric characters
/// keep their raw form so they stay distinct.
fn property_key(name: &str) -> String {
    let key = to_lower_camel(name);
    if key.is_empty() {
        name.to_string()
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::render::registry::{PropertyRenderFn, Registry};

    fn page() -> Page {
        serde_json::from_value(json!({
            "id": "p1",
            "icon": { "type": "emoji", "emoji": "🚀" },
            "properties": {
                "Name": {
                    "type": "title",
                    "title": [{
                        "type": "text",
                        "text": { "content": "Launch" },
                        "annotations": { "bold": true },
                        "plain_text": "Launch"
                    }]
                },
                "Due Date": { "type": "date", "date": { "start": "2024-05-01", "end": "2024-05-03" } },
                "Tags": {
                    "type": "multi_select",
                    "multi_select": [{ "name": "rust" }, { "name": "docs" }]
                },
                "Votes": { "type": "number", "number": 3.0 }
            }
        }))
        .expect("page decodes")
    }

    #[tokio::test]
    async fn keys_are_lower_camel_and_values_typed() {
        let registry = Registry::standard();
        let rendered = render_page_properties(RenderContext::new(&registry), &page()).await;

        assert_eq!(rendered["name"], "**Launch**");
        assert_eq!(rendered["dueDate"], "2024-05-01 - 2024-05-03");
        assert_eq!(rendered["tags"], "rust, docs");
        assert_eq!(rendered["votes"], "3");
        assert_eq!(rendered["icon"], "🚀");
        assert!(!rendered.contains_key("cover"));
    }

    #[tokio::test]
    async fn name_renderer_takes_precedence_over_type() {
        let mut registry = Registry::standard();
        registry.properties.insert(
            "dueDate",
            PropertyRenderFn::from_sync(|_, call| format!("due:{}", call.page_id)),
        );

        let rendered = render_page_properties(RenderContext::new(&registry), &page()).await;

        assert_eq!(rendered["dueDate"], "due:p1");
        assert_eq!(rendered["tags"], "rust, docs");
    }

    #[tokio::test]
    async fn repeated_renders_are_identical() {
        let registry = Registry::standard();
        let page = page();
        let cx = RenderContext::new(&registry);

        let first = render_page_properties(cx, &page).await;
        let second = render_page_properties(cx, &page).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_property_types_render_empty() {
        let page: Page = serde_json::from_value(json!({
            "id": "p2",
            "properties": { "Press": { "type": "button", "button": {} } }
        }))
        .expect("page decodes");

        let empty = Registry::new();
        let rendered = render_page_properties(RenderContext::new(&empty), &page).await;
        assert_eq!(rendered["press"], "");

        let standard = Registry::standard();
        let rendered = render_page_properties(RenderContext::new(&standard), &page).await;
        assert_eq!(rendered["press"], "");
    }

    #[tokio::test]
    async fn symbol_only_names_keep_distinct_keys() {
        let page: Page = serde_json::from_value(json!({
            "id": "p3",
            "properties": {
                "🚀": { "type": "number", "number": 1.0 },
                "🔥": { "type": "number", "number": 2.0 }
            }
        }))
        .expect("page decodes");

        let registry = Registry::standard();
        let rendered = render_page_properties(RenderContext::new(&registry), &page).await;

        assert_eq!(rendered["🚀"], "1");
        assert_eq!(rendered["🔥"], "2");
        assert!(!rendered.contains_key(""));
    }
}
