use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::MAX_ITEM_FACTS;

/// Field names that may carry an item's display title, highest priority first
pub const TITLE_KEYS: &[&str] = &["title", "naam", "productName", "name"];

/// Field names that may carry an item's image reference, highest priority first
pub const IMAGE_KEYS: &[&str] = &[
    "_image",
    "image",
    "image_url",
    "imageUrl",
    "thumbnail",
    "foto",
    "afbeelding",
];

/// Fact fields shown under a card title, in display order
pub const FACT_KEYS: &[&str] = &[
    "prijs", "price", "jaar", "year", "land", "streek", "druif", "wijnhuis",
];

/// A loosely typed product record as the service sends it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    /// Objects are taken as-is, a bare string becomes the title, anything else is empty
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields.clone()),
            Value::String(title) => {
                let mut fields = Map::new();
                fields.insert("title".to_string(), Value::String(title.clone()));
                Self(fields)
            }
            _ => Self::default(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Display title, or `Optie <n>` for the card at `index`
    pub fn title(&self, index: usize) -> String {
        resolve_title(&self.0).unwrap_or_else(|| format!("Optie {}", index + 1))
    }

    pub fn image(&self) -> Option<String> {
        resolve_image(&self.0)
    }

    pub fn facts(&self) -> Vec<String> {
        resolve_facts(&self.0)
    }
}

/// Render a field the way a loosely typed client would print it.
/// Returns `None` for null, blank strings and nested objects.
fn display_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null | Value::Object(_) => return None,
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(values) => values
            .iter()
            .map(|v| display_value(v).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(","),
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// First populated value among `keys`, consulted in order
pub fn first_present(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find_map(display_value)
}

pub fn resolve_title(fields: &Map<String, Value>) -> Option<String> {
    first_present(fields, TITLE_KEYS)
}

pub fn resolve_image(fields: &Map<String, Value>) -> Option<String> {
    first_present(fields, IMAGE_KEYS)
}

/// `key: value` pairs for the allow-listed fact keys, capped at three
pub fn resolve_facts(fields: &Map<String, Value>) -> Vec<String> {
    FACT_KEYS
        .iter()
        .filter_map(|key| {
            let value = display_value(fields.get(*key)?)?;
            Some(format!("{}: {}", key, value))
        })
        .take(MAX_ITEM_FACTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_title_prefers_earlier_aliases() {
        let item = fields(json!({"name": "B", "naam": "A"}));
        assert_eq!(resolve_title(&item).as_deref(), Some("A"));
    }

    #[test]
    fn test_blank_aliases_are_skipped() {
        let item = fields(json!({"title": "  ", "naam": null, "productName": "Pinot"}));
        assert_eq!(resolve_title(&item).as_deref(), Some("Pinot"));
    }

    #[test]
    fn test_title_falls_back_to_position() {
        let item = Item::from_value(&json!({"prijs": 12}));
        assert_eq!(item.title(1), "Optie 2");
    }

    #[test]
    fn test_image_aliases() {
        let item = fields(json!({"foto": "f.jpg", "thumbnail": "t.jpg"}));
        assert_eq!(resolve_image(&item).as_deref(), Some("t.jpg"));
        assert_eq!(resolve_image(&fields(json!({}))), None);
    }

    #[test]
    fn test_facts_follow_priority_order_and_cap() {
        let item = fields(json!({
            "wijnhuis": "Domaine X",
            "jaar": 2021,
            "prijs": "12.50",
            "land": "Frankrijk",
            "druif": "Pinot Noir",
            "kleur": "rood"
        }));
        assert_eq!(
            resolve_facts(&item),
            vec!["prijs: 12.50", "jaar: 2021", "land: Frankrijk"]
        );
    }

    #[test]
    fn test_string_value_becomes_title() {
        let item = Item::from_value(&json!("Chablis"));
        assert_eq!(item.title(0), "Chablis");
        assert!(item.facts().is_empty());
    }
}
