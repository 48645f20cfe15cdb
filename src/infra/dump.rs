use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::application::source::{ContentSource, Paginated, SourceError};
use crate::domain::block::Block;
use crate::domain::page::Page;

/// Shapes accepted in a dump file.
#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    Page(Page),
    Blocks(Vec<Block>),
    Listing(Paginated<Block>),
}

/// [`ContentSource`] reading a page previously exported as JSON: a page
/// object with nested `children`, a bare array of blocks, or a single
/// children listing.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem, used as the page id when the dump carries none.
    pub fn default_id(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContentSource for JsonFileSource {
    async fn fetch(&self, id: &str) -> Result<Page, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let dump: Dump = serde_json::from_slice(&bytes)
            .map_err(|err| SourceError::decode(self.path.display().to_string(), err.to_string()))?;

        let page = match dump {
            Dump::Page(page) => page,
            Dump::Blocks(children) => Page {
                children,
                ..Page::new(id)
            },
            Dump::Listing(listing) => Page {
                children: listing.results,
                ..Page::new(id)
            },
        };
        debug!(
            path = %self.path.display(),
            page_id = %page.id,
            blocks = page.children.len(),
            "loaded page dump"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn dump(value: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{value}").expect("write dump");
        file
    }

    #[tokio::test]
    async fn page_dump_keeps_its_own_id() {
        let file = dump(json!({
            "id": "p1",
            "properties": {},
            "children": [{ "id": "b1", "type": "divider", "divider": {} }]
        }));
        let source = JsonFileSource::new(file.path());

        let page = source.fetch("ignored").await.expect("page loads");

        assert_eq!(page.id, "p1");
        assert_eq!(page.children.len(), 1);
    }

    #[tokio::test]
    async fn block_array_and_listing_use_requested_id() {
        let array = dump(json!([{ "id": "b1", "type": "divider", "divider": {} }]));
        let page = JsonFileSource::new(array.path())
            .fetch("notes")
            .await
            .expect("array loads");
        assert_eq!(page.id, "notes");
        assert_eq!(page.children[0].id, "b1");

        let listing = dump(json!({
            "object": "list",
            "results": [{ "id": "b2", "type": "divider", "divider": {} }],
            "next_cursor": null,
            "has_more": false
        }));
        let page = JsonFileSource::new(listing.path())
            .fetch("notes")
            .await
            .expect("listing loads");
        assert_eq!(page.children[0].id, "b2");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        let err = source.fetch("x").await.expect_err("missing");
        assert!(matches!(err, SourceError::Io { .. }));
        assert_eq!(source.default_id(), "here");
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let file = dump(json!("just a string"));
        let err = JsonFileSource::new(file.path())
            .fetch("x")
            .await
            .expect_err("bad dump");
        assert!(matches!(err, SourceError::Decode { .. }));
    }
}
