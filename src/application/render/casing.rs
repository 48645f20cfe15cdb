//! Key casing used by renderer lookup and property output.
//!
//! The platform tags types in snake_case (`rich_text`, `heading_1`) while
//! registries may be keyed in lowerCamelCase (`richText`, `heading1`). Lookup
//! tries an explicit, ordered list of candidate spellings.

/// Split an identifier into lowercase words on separators, lower→upper
/// transitions and letter→digit transitions.
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous: Option<char> = None;

    for ch in input.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous = None;
            continue;
        }

        let boundary = match previous {
            Some(prev) => {
                (prev.is_lowercase() && ch.is_uppercase())
                    || (prev.is_alphabetic() && ch.is_ascii_digit())
            }
            None => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.extend(ch.to_lowercase());
        previous = Some(ch);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `rich_text` → `richText`, `Last Edited` → `lastEdited`, `heading_1` → `heading1`.
pub fn to_lower_camel(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for (index, word) in words(input).iter().enumerate() {
        if index == 0 {
            output.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            output.extend(first.to_uppercase());
            output.push_str(chars.as_str());
        }
    }
    output
}

/// `richText` → `rich_text`, `heading1` → `heading_1`.
pub fn to_snake(input: &str) -> String {
    words(input).join("_")
}

/// Keys tried, in order, when resolving `name`: the exact key, its
/// lowerCamelCase spelling, then its snake_case spelling. Duplicates are
/// dropped so each key is tried once.
pub fn candidate_keys(name: &str) -> Vec<String> {
    let mut keys = vec![name.to_string()];
    for variant in [to_lower_camel(name), to_snake(name)] {
        if !variant.is_empty() && !keys.contains(&variant) {
            keys.push(variant);
        }
    }
    keys
}
