//! Page and block identifier normalisation.
//!
//! Identifiers arrive hyphenated, as 32 bare hex digits, or embedded at the
//! end of a page URL (`https://host/Workspace/My-Page-<hex>?v=...`). They are
//! normalised to the hyphenated UUID form the platform API expects.

use thiserror::Error;
use url::Url;
use uuid::Uuid;

const SIMPLE_ID_LEN: usize = 32;
const HYPHENATED_ID_LEN: usize = 36;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("identifier is empty")]
    Empty,
    #[error("`{0}` does not contain a 32-digit identifier")]
    Malformed(String),
}

pub fn normalize_id(input: &str) -> Result<String, IdError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }

    if let Ok(uuid) = Uuid::parse_str(trimmed) {
        return Ok(uuid.hyphenated().to_string());
    }

    let candidate = match Url::parse(trimmed) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|segment| !segment.is_empty()).next_back())
            .map(str::to_string)
            .ok_or_else(|| IdError::Malformed(input.to_string()))?,
        Err(_) => trimmed.to_string(),
    };

    trailing_uuid(&candidate)
        .map(|uuid| uuid.hyphenated().to_string())
        .ok_or_else(|| IdError::Malformed(input.to_string()))
}

/// The whole segment as a UUID, or a hyphenated or simple UUID at its end
/// (`My-Page-<hex>`).
fn trailing_uuid(segment: &str) -> Option<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(segment) {
        return Some(uuid);
    }
    [HYPHENATED_ID_LEN, SIMPLE_ID_LEN].into_iter().find_map(|len| {
        let start = segment.len().checked_sub(len)?;
        let tail = segment.get(start..)?;
        Uuid::parse_str(tail).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYPHENATED: &str = "0f1e2d3c-4b5a-6978-8695-a4b3c2d1e0f9";

    #[test]
    fn accepts_hyphenated_and_simple_forms() {
        assert_eq!(normalize_id(HYPHENATED).unwrap(), HYPHENATED);
        assert_eq!(
            normalize_id("0f1e2d3c4b5a69788695a4b3c2d1e0f9").unwrap(),
            HYPHENATED
        );
    }

    #[test]
    fn extracts_identifier_from_page_url() {
        let url = "https://www.notion.so/acme/Roadmap-0f1e2d3c4b5a69788695a4b3c2d1e0f9?v=123";
        assert_eq!(normalize_id(url).unwrap(), HYPHENATED);
    }

    #[test]
    fn url_ending_in_hyphenated_identifier_is_accepted() {
        let url = format!("https://www.notion.so/{HYPHENATED}/");
        assert_eq!(normalize_id(&url).unwrap(), HYPHENATED);

        let titled = format!("https://www.notion.so/acme/Roadmap-{HYPHENATED}#section");
        assert_eq!(normalize_id(&titled).unwrap(), HYPHENATED);
    }

    #[test]
    fn url_without_identifier_is_malformed() {
        assert!(matches!(
            normalize_id("https://www.notion.so/"),
            Err(IdError::Malformed(_))
        ));
        assert!(matches!(
            normalize_id("https://www.notion.so/acme/Roadmap"),
            Err(IdError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalize_id("   "), Err(IdError::Empty));
        assert!(matches!(
            normalize_id("not-an-id"),
            Err(IdError::Malformed(_))
        ));
    }
}
