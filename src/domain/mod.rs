//! Content model delivered by the platform: block trees, rich text, pages.

pub mod block;
pub mod id;
pub mod page;
pub mod rich_text;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use block::{Block, BlockPayload};
pub use page::{Page, PropertyKind, PropertyValue};
pub use rich_text::{Annotations, RichTextSpan, SpanKind};

/// Decode a type-specific body, or `None` when it does not have the expected shape.
pub(crate) fn decode<T: DeserializeOwned>(body: &Value) -> Option<T> {
    T::deserialize(body).ok()
}
