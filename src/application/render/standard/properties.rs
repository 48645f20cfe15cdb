//! Property value renderers.
//!
//! Every renderer tolerates any [`PropertyKind`]: a renderer reached through
//! a property *name* may be handed a value of another type, in which case it
//! falls back to [`plain_value`].

use futures::future::{BoxFuture, FutureExt};

use crate::application::render::context::RenderContext;
use crate::application::render::registry::{DEFAULT_KEY, PropertyRenderFn, RendererTable};
use crate::application::render::types::PropertyCall;
use crate::domain::page::{FormulaValue, PropertyKind, PropertyValue};
use crate::domain::rich_text::plain_text;

const SCALAR_TYPES: [&str; 15] = [
    "number",
    "select",
    "status",
    "multi_select",
    "date",
    "checkbox",
    "url",
    "email",
    "phone_number",
    "people",
    "created_time",
    "last_edited_time",
    "formula",
    "relation",
    "unique_id",
];

pub(super) fn property_table() -> RendererTable<PropertyRenderFn> {
    let mut table = RendererTable::new()
        .with("title", PropertyRenderFn::new(rich_text))
        .with("rich_text", PropertyRenderFn::new(rich_text))
        .with("files", PropertyRenderFn::from_sync(files))
        .with("cover", PropertyRenderFn::from_sync(scalar))
        .with("icon", PropertyRenderFn::from_sync(scalar))
        .with(DEFAULT_KEY, PropertyRenderFn::from_sync(scalar));
    for property_type in SCALAR_TYPES {
        table.insert(property_type, PropertyRenderFn::from_sync(scalar));
    }
    table
}

fn rich_text<'a>(cx: RenderContext<'a>, call: PropertyCall<'a>) -> BoxFuture<'a, String> {
    async move {
        match &call.value.kind {
            PropertyKind::Title(spans) | PropertyKind::RichText(spans) => cx
                .compose_rich_text(spans)
                .await
                .unwrap_or_default(),
            _ => plain_value(call.value),
        }
    }
    .boxed()
}

fn scalar(_: RenderContext<'_>, call: &PropertyCall<'_>) -> String {
    plain_value(call.value)
}

fn files(_: RenderContext<'_>, call: &PropertyCall<'_>) -> String {
    match &call.value.kind {
        PropertyKind::Files(files) => files
            .iter()
            .filter_map(|file| {
                let url = file.source.url()?;
                let name = if file.name.is_empty() { url } else { &file.name };
                Some(format!("[{name}]({url})"))
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => plain_value(call.value),
    }
}

/// Unstyled text for any property value. Unknown kinds render empty.
pub fn plain_value(value: &PropertyValue) -> String {
    match &value.kind {
        PropertyKind::Title(spans) | PropertyKind::RichText(spans) => plain_text(spans),
        PropertyKind::Number(number) => number.map(|number| number.to_string()).unwrap_or_default(),
        PropertyKind::Select(option) | PropertyKind::Status(option) => option
            .as_ref()
            .map(|option| option.name.clone())
            .unwrap_or_default(),
        PropertyKind::MultiSelect(options) => options
            .iter()
            .map(|option| option.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyKind::Date(range) => range.as_ref().map(ToString::to_string).unwrap_or_default(),
        PropertyKind::Checkbox(checked) => checked.to_string(),
        PropertyKind::Url(text) | PropertyKind::Email(text) | PropertyKind::PhoneNumber(text) => {
            text.clone().unwrap_or_default()
        }
        PropertyKind::People(people) => people
            .iter()
            .map(|user| user.name.as_deref().unwrap_or(&user.id))
            .collect::<Vec<_>>()
            .join(", "),
        PropertyKind::Files(files) => files
            .iter()
            .filter_map(|file| file.source.url())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyKind::CreatedTime(time) | PropertyKind::LastEditedTime(time) => time.clone(),
        PropertyKind::Formula(formula) => match formula {
            FormulaValue::String { string } => string.clone().unwrap_or_default(),
            FormulaValue::Number { number } => {
                number.map(|number| number.to_string()).unwrap_or_default()
            }
            FormulaValue::Boolean { boolean } => {
                boolean.map(|boolean| boolean.to_string()).unwrap_or_default()
            }
            FormulaValue::Date { date } => date.as_ref().map(ToString::to_string).unwrap_or_default(),
        },
        PropertyKind::Relation(pages) => pages
            .iter()
            .map(|page| page.id.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyKind::UniqueId(id) => match (&id.prefix, id.number) {
            (Some(prefix), Some(number)) => format!("{prefix}-{number}"),
            (None, Some(number)) => number.to_string(),
            _ => String::new(),
        },
        PropertyKind::Cover(file) => file.url().unwrap_or_default().to_string(),
        PropertyKind::Icon(icon) => icon
            .emoji()
            .or_else(|| icon.url())
            .unwrap_or_default()
            .to_string(),
        PropertyKind::Unknown(_) => String::new(),
    }
}
