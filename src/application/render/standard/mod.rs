//! Bundled Markdown + HTML renderers.

mod blocks;
mod inline;
mod properties;

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::registry::Registry;

pub use inline::standard_markup;
pub use properties::plain_value;

pub(super) fn build() -> Registry {
    Registry {
        blocks: blocks::block_table(),
        lists: blocks::list_table(),
        spans: inline::span_table(),
        mentions: inline::mention_table(),
        properties: properties::property_table(),
        markup: standard_markup(),
    }
}

static STANDARD_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(build()));

/// Access the shared standard registry, built on first use.
pub fn standard_registry() -> Arc<Registry> {
    Arc::clone(&STANDARD_REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_registry_is_built_once() {
        let first = standard_registry();
        let second = standard_registry();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn every_list_container_is_registered() {
        let registry = standard_registry();
        for (_, container) in crate::application::render::list::LIST_FAMILY {
            assert!(registry.lists.get(container).is_some(), "{container} missing");
        }
        for (item, _) in crate::application::render::list::LIST_FAMILY {
            assert!(registry.blocks.get(item).is_some(), "{item} missing");
        }
    }
}
