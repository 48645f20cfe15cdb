//! Renderer tables and name resolution.
//!
//! A [`Registry`] holds one typed table per call shape plus the closed set of
//! inline markup functions. Every table resolves names through the same
//! chain: exact key, casing variants, explicit fallback, the table's own
//! `default` entry, and finally a terminal placeholder renderer. Resolution
//! never fails.

use std::{collections::HashMap, fmt, sync::Arc};

use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use super::casing::candidate_keys;
use super::context::RenderContext;
use super::types::{BlockCall, ListCall, MentionCall, PropertyCall, SpanCall};

pub const DEFAULT_KEY: &str = "default";
pub const UNSUPPORTED_KEY: &str = "unsupported";

/// Behaviour shared by every render function stored in a [`RendererTable`].
pub trait RenderFunction: Clone + Send + Sync + 'static {
    /// Table kind used in log records (`block`, `span`, ...).
    const KIND: &'static str;

    /// Terminal renderer used when nothing else resolves.
    fn unsupported(type_name: &str) -> Self;
}

macro_rules! render_fn {
    ($(#[$meta:meta])* $name:ident, $call:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(
            Arc<dyn for<'a> Fn(RenderContext<'a>, $call<'a>) -> BoxFuture<'a, String> + Send + Sync>,
        );

        impl $name {
            pub fn new<F>(render: F) -> Self
            where
                F: for<'a> Fn(RenderContext<'a>, $call<'a>) -> BoxFuture<'a, String>
                    + Send
                    + Sync
                    + 'static,
            {
                Self(Arc::new(render))
            }

            /// Wrap a renderer that needs no awaiting.
            pub fn from_sync<F>(render: F) -> Self
            where
                F: for<'a> Fn(RenderContext<'a>, &$call<'a>) -> String + Send + Sync + 'static,
            {
                Self::new(move |cx, call| {
                    let rendered = render(cx, &call);
                    async move { rendered }.boxed()
                })
            }

            pub fn call<'a>(&self, cx: RenderContext<'a>, call: $call<'a>) -> BoxFuture<'a, String> {
                (self.0)(cx, call)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(..)"))
            }
        }
    };
}

render_fn!(
    /// Renders one block from its payload, composed content and rendered children.
    BlockRenderFn,
    BlockCall
);
render_fn!(
    /// Renders a list container from its already-rendered items.
    ListRenderFn,
    ListCall
);
render_fn!(
    /// Renders one rich text span.
    SpanRenderFn,
    SpanCall
);
render_fn!(
    /// Renders the body of a `mention` span.
    MentionRenderFn,
    MentionCall
);
render_fn!(
    /// Renders one page property value.
    PropertyRenderFn,
    PropertyCall
);

impl RenderFunction for BlockRenderFn {
    const KIND: &'static str = "block";

    fn unsupported(type_name: &str) -> Self {
        let placeholder = format!("<!-- Unsupported block: {type_name} -->\n");
        Self::from_sync(move |_, _| placeholder.clone())
    }
}

impl RenderFunction for ListRenderFn {
    const KIND: &'static str = "list";

    fn unsupported(_type_name: &str) -> Self {
        Self::from_sync(|_, call| format!("{}\n", call.items.join("\n")))
    }
}

impl RenderFunction for SpanRenderFn {
    const KIND: &'static str = "span";

    fn unsupported(_type_name: &str) -> Self {
        Self::from_sync(|_, _| String::new())
    }
}

impl RenderFunction for MentionRenderFn {
    const KIND: &'static str = "mention";

    fn unsupported(_type_name: &str) -> Self {
        Self::from_sync(|_, _| String::new())
    }
}

impl RenderFunction for PropertyRenderFn {
    const KIND: &'static str = "property";

    fn unsupported(_type_name: &str) -> Self {
        Self::from_sync(|_, _| String::new())
    }
}

/// Name → render function table for one call shape.
#[derive(Clone)]
pub struct RendererTable<F> {
    entries: HashMap<String, F>,
}

impl<F> Default for RendererTable<F> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<F: RenderFunction> RendererTable<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `render` under `name`, returning the entry it replaced.
    pub fn insert(&mut self, name: impl Into<String>, render: F) -> Option<F> {
        self.entries.insert(name.into(), render)
    }

    pub fn with(mut self, name: impl Into<String>, render: F) -> Self {
        self.insert(name, render);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<F> {
        self.entries.remove(name)
    }

    /// Exact key match only.
    pub fn get(&self, name: &str) -> Option<&F> {
        self.entries.get(name)
    }

    /// Exact key, then casing variants. No fallback of any kind.
    pub fn lookup(&self, name: &str) -> Option<&F> {
        if name.is_empty() {
            return None;
        }
        candidate_keys(name)
            .iter()
            .find_map(|key| self.entries.get(key.as_str()))
    }

    /// Resolve `name` through the full chain; always yields a renderer.
    pub fn resolve(&self, name: &str, fallback: Option<&F>) -> F {
        if let Some(render) = self.lookup(name) {
            return render.clone();
        }
        if let Some(render) = fallback {
            return render.clone();
        }
        if let Some(render) = self.entries.get(DEFAULT_KEY) {
            return render.clone();
        }

        info!(
            kind = F::KIND,
            type_name = name,
            "no renderer registered; emitting placeholder"
        );
        F::unsupported(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<F: RenderFunction> fmt::Debug for RendererTable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererTable")
            .field("kind", &F::KIND)
            .field("names", &self.names())
            .finish()
    }
}

pub type MarkupFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
/// `(content, color)` → styled content.
pub type ColorFn = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;
/// `(content, url)` → linked content.
pub type LinkFn = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Inline markup applied by the `text` span pipeline. A missing function
/// skips its step.
#[derive(Clone, Default)]
pub struct Markup {
    pub bold: Option<MarkupFn>,
    pub italic: Option<MarkupFn>,
    pub strikethrough: Option<MarkupFn>,
    pub underline: Option<MarkupFn>,
    pub inline_code: Option<MarkupFn>,
    pub color: Option<ColorFn>,
    pub link: Option<LinkFn>,
}

impl fmt::Debug for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markup")
            .field("bold", &self.bold.is_some())
            .field("italic", &self.italic.is_some())
            .field("strikethrough", &self.strikethrough.is_some())
            .field("underline", &self.underline.is_some())
            .field("inline_code", &self.inline_code.is_some())
            .field("color", &self.color.is_some())
            .field("link", &self.link.is_some())
            .finish()
    }
}

/// Complete renderer configuration passed to every entry point.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub blocks: RendererTable<BlockRenderFn>,
    pub lists: RendererTable<ListRenderFn>,
    pub spans: RendererTable<SpanRenderFn>,
    pub mentions: RendererTable<MentionRenderFn>,
    pub properties: RendererTable<PropertyRenderFn>,
    pub markup: Markup,
}

impl Registry {
    /// An empty registry: every lookup falls through to the terminal renderers.
    pub fn new() -> Self {
        Self::default()
    }

    /// An owned copy of the bundled Markdown + HTML registry, ready to be
    /// customised.
    pub fn standard() -> Self {
        super::standard::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BlockPayload, RichTextSpan};

    fn block_call<'a>(block_type: &'a str, payload: &'a BlockPayload) -> BlockCall<'a> {
        BlockCall {
            block_type,
            block_id: "b1",
            payload,
            content: "body".to_string(),
            children: Vec::new(),
        }
    }

    fn constant(text: &'static str) -> BlockRenderFn {
        BlockRenderFn::from_sync(move |_, _| text.to_string())
    }

    #[tokio::test]
    async fn exact_key_wins_over_casing_variant() {
        let table = RendererTable::new()
            .with("rich_text", constant("snake"))
            .with("richText", constant("camel"));
        let registry = Registry::new();
        let cx = RenderContext::new(&registry);
        let payload = BlockPayload::Divider;

        let snake = table.resolve("rich_text", None);
        let camel = table.resolve("richText", None);

        assert_eq!(snake.call(cx, block_call("rich_text", &payload)).await, "snake");
        assert_eq!(camel.call(cx, block_call("richText", &payload)).await, "camel");
    }

    #[tokio::test]
    async fn casing_variant_is_found_when_exact_key_is_missing() {
        let table = RendererTable::new().with("bulletedListItem", constant("camel"));
        let registry = Registry::new();
        let payload = BlockPayload::Divider;

        let render = table
            .lookup("bulleted_list_item")
            .expect("camel case variant resolves");
        let rendered = render
            .call(RenderContext::new(&registry), block_call("bulleted_list_item", &payload))
            .await;
        assert_eq!(rendered, "camel");
    }

    #[tokio::test]
    async fn fallback_chain_runs_explicit_then_default_then_terminal() {
        let registry = Registry::new();
        let cx = RenderContext::new(&registry);
        let payload = BlockPayload::Divider;
        let explicit = constant("explicit");

        let with_default = RendererTable::new().with(DEFAULT_KEY, constant("default"));
        let chosen = with_default.resolve("hologram", Some(&explicit));
        assert_eq!(chosen.call(cx, block_call("hologram", &payload)).await, "explicit");

        let chosen = with_default.resolve("hologram", None);
        assert_eq!(chosen.call(cx, block_call("hologram", &payload)).await, "default");

        let empty: RendererTable<BlockRenderFn> = RendererTable::new();
        let chosen = empty.resolve("hologram", None);
        assert_eq!(
            chosen.call(cx, block_call("hologram", &payload)).await,
            "<!-- Unsupported block: hologram -->\n"
        );
    }

    #[test]
    fn lookup_of_empty_name_misses() {
        let table = RendererTable::new().with("", constant("blank"));
        assert!(table.lookup("").is_none());
    }

    #[tokio::test]
    async fn terminal_renderers_match_their_call_shape() {
        let registry = Registry::new();
        let cx = RenderContext::new(&registry);

        let list = registry.lists.resolve("bulleted_list", None);
        let rendered = list
            .call(
                cx,
                ListCall {
                    list_type: "bulleted_list",
                    item_type: "bulleted_list_item",
                    items: vec!["- a".to_string(), "- b".to_string()],
                },
            )
            .await;
        assert_eq!(rendered, "- a\n- b\n");

        let span = RichTextSpan::text("hello");
        let render = registry.spans.resolve("text", None);
        assert_eq!(render.call(cx, SpanCall { span: &span }).await, "");
    }

    #[test]
    fn names_are_sorted() {
        let table = RendererTable::new()
            .with("quote", constant("q"))
            .with("code", constant("c"))
            .with("divider", constant("d"));
        assert_eq!(table.names(), ["code", "divider", "quote"]);
        assert_eq!(table.len(), 3);
    }
}
