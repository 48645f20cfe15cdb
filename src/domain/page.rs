//! Pages and their metadata properties.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::block::Block;
use super::decode;
use super::rich_text::{DateRange, ObjectRef, RichTextSpan, User, plain_text};

pub const COVER_PROPERTY: &str = "cover";
pub const ICON_PROPERTY: &str = "icon";

/// A page: metadata properties plus its block tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub cover: Option<FileRef>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub children: Vec<Block>,
}

impl Page {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: None,
            properties: BTreeMap::new(),
            cover: None,
            icon: None,
            children: Vec::new(),
        }
    }

    /// Every renderable property: the page's own, then `cover` and `icon`
    /// when present.
    pub fn property_entries(&self) -> Vec<(&str, PropertyValue)> {
        let mut entries: Vec<(&str, PropertyValue)> = self
            .properties
            .iter()
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect();
        if let Some(cover) = &self.cover {
            entries.push((COVER_PROPERTY, PropertyValue::cover(cover.clone())));
        }
        if let Some(icon) = &self.icon {
            entries.push((ICON_PROPERTY, PropertyValue::icon(icon.clone())));
        }
        entries
    }

    /// Plain text of the page's `title` property, if it has one.
    pub fn title(&self) -> Option<String> {
        self.properties.values().find_map(|value| match &value.kind {
            PropertyKind::Title(spans) => Some(plain_text(spans)),
            _ => None,
        })
    }
}

/// One typed metadata value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawProperty")]
pub struct PropertyValue {
    pub id: Option<String>,
    /// Open type tag (`title`, `select`, `date`, ...).
    pub property_type: String,
    pub kind: PropertyKind,
}

impl PropertyValue {
    pub fn new(property_type: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            id: None,
            property_type: property_type.into(),
            kind,
        }
    }

    fn cover(cover: FileRef) -> Self {
        Self::new(cover.source_type(), PropertyKind::Cover(cover))
    }

    fn icon(icon: Icon) -> Self {
        Self::new(icon.icon_type(), PropertyKind::Icon(icon))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Title(Vec<RichTextSpan>),
    RichText(Vec<RichTextSpan>),
    Number(Option<f64>),
    Select(Option<SelectOption>),
    Status(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Date(Option<DateRange>),
    Checkbox(bool),
    Url(Option<String>),
    Email(Option<String>),
    PhoneNumber(Option<String>),
    People(Vec<User>),
    Files(Vec<NamedFile>),
    CreatedTime(String),
    LastEditedTime(String),
    Formula(FormulaValue),
    Relation(Vec<ObjectRef>),
    UniqueId(UniqueId),
    Cover(FileRef),
    Icon(Icon),
    Unknown(Value),
}

#[derive(Deserialize)]
struct RawProperty {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    property_type: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawProperty> for PropertyValue {
    fn from(raw: RawProperty) -> Self {
        let RawProperty {
            id,
            property_type,
            mut rest,
        } = raw;
        let body = rest.remove(&property_type).unwrap_or(Value::Null);
        let kind = match property_type.as_str() {
            "title" => decode(&body).map(PropertyKind::Title),
            "rich_text" => decode(&body).map(PropertyKind::RichText),
            "number" => decode(&body).map(PropertyKind::Number),
            "select" => decode(&body).map(PropertyKind::Select),
            "status" => decode(&body).map(PropertyKind::Status),
            "multi_select" => decode(&body).map(PropertyKind::MultiSelect),
            "date" => decode(&body).map(PropertyKind::Date),
            "checkbox" => decode(&body).map(PropertyKind::Checkbox),
            "url" => decode(&body).map(PropertyKind::Url),
            "email" => decode(&body).map(PropertyKind::Email),
            "phone_number" => decode(&body).map(PropertyKind::PhoneNumber),
            "people" => decode(&body).map(PropertyKind::People),
            "files" => decode(&body).map(PropertyKind::Files),
            "created_time" => decode(&body).map(PropertyKind::CreatedTime),
            "last_edited_time" => decode(&body).map(PropertyKind::LastEditedTime),
            "formula" => decode(&body).map(PropertyKind::Formula),
            "relation" => decode(&body).map(PropertyKind::Relation),
            "unique_id" => decode(&body).map(PropertyKind::UniqueId),
            _ => None,
        }
        .unwrap_or(PropertyKind::Unknown(body));

        Self {
            id,
            property_type,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateRange> },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UniqueId {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedFile {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub source: FileRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostedFile {
    pub url: String,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

/// Where a file lives: an external URL or a platform-hosted (expiring) URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileRef {
    External { external: ExternalFile },
    File { file: HostedFile },
    #[serde(other)]
    Unsupported,
}

impl FileRef {
    pub fn external(url: impl Into<String>) -> Self {
        Self::External {
            external: ExternalFile { url: url.into() },
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::External { external } => Some(external.url.as_str()),
            Self::File { file } => Some(file.url.as_str()),
            Self::Unsupported => None,
        }
    }

    pub fn source_type(&self) -> &'static str {
        match self {
            Self::External { .. } => "external",
            Self::File { .. } => "file",
            Self::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
    File { file: HostedFile },
    #[serde(other)]
    Unsupported,
}

impl Icon {
    pub fn emoji(&self) -> Option<&str> {
        match self {
            Self::Emoji { emoji } => Some(emoji.as_str()),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::External { external } => Some(external.url.as_str()),
            Self::File { file } => Some(file.url.as_str()),
            _ => None,
        }
    }

    pub fn icon_type(&self) -> &'static str {
        match self {
            Self::Emoji { .. } => "emoji",
            Self::External { .. } => "external",
            Self::File { .. } => "file",
            Self::Unsupported => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_page() -> Page {
        serde_json::from_value(json!({
            "object": "page",
            "id": "p1",
            "cover": { "type": "external", "external": { "url": "https://example.com/c.png" } },
            "icon": { "type": "emoji", "emoji": "🚀" },
            "properties": {
                "Name": {
                    "id": "title",
                    "type": "title",
                    "title": [{ "type": "text", "text": { "content": "Launch" }, "plain_text": "Launch" }]
                },
                "Score": { "id": "a", "type": "number", "number": null },
                "Stage": { "id": "b", "type": "select", "select": { "name": "Draft" } },
                "Weird": { "id": "c", "type": "button", "button": {} }
            }
        }))
        .expect("page decodes")
    }

    #[test]
    fn properties_decode_into_typed_kinds() {
        let page = sample_page();

        assert_eq!(page.title().as_deref(), Some("Launch"));
        assert_eq!(page.properties["Score"].kind, PropertyKind::Number(None));
        assert!(matches!(
            &page.properties["Stage"].kind,
            PropertyKind::Select(Some(option)) if option.name == "Draft"
        ));
        assert_eq!(page.properties["Weird"].property_type, "button");
        assert!(matches!(
            page.properties["Weird"].kind,
            PropertyKind::Unknown(_)
        ));
    }

    #[test]
    fn property_entries_append_cover_and_icon() {
        let page = sample_page();
        let entries = page.property_entries();
        let names: Vec<&str> = entries.iter().map(|(name, _)| *name).collect();

        assert_eq!(names, ["Name", "Score", "Stage", "Weird", "cover", "icon"]);
        let (_, cover) = &entries[4];
        assert_eq!(cover.property_type, "external");
        let (_, icon) = &entries[5];
        assert_eq!(icon.property_type, "emoji");
    }

    #[test]
    fn absent_cover_and_icon_are_skipped() {
        let page = Page::new("p2");
        assert!(page.property_entries().is_empty());
    }

    #[test]
    fn unknown_file_source_is_tolerated() {
        let file: FileRef = serde_json::from_value(json!({
            "type": "file_upload",
            "file_upload": { "id": "u1" }
        }))
        .expect("file ref decodes");
        assert_eq!(file, FileRef::Unsupported);
        assert_eq!(file.url(), None);
    }
}
