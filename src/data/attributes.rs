//! Flat attribute records: one master-data element (hero, skill, buff, ...) as a
//! map of attribute name to string value, with light coercion helpers.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;

/// Separators accepted when an attribute holds a list of ids.
const LIST_SEPARATORS: &[char] = &[',', ';', '|'];

/// Upper bound for numbered attributes (`buff1`, `buff2`, ...).
const MAX_NUMBERED: usize = 99;

/// One master-data element: its tag name and attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeRecord {
    pub tag: String,
    attrs: BTreeMap<String, String>,
}

impl AttributeRecord {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Build from a JSON object. Scalars are coerced to their string form;
    /// nulls, arrays and nested objects are not attributes and are skipped.
    pub fn from_json(tag: &str, object: &serde_json::Map<String, Value>) -> Self {
        let mut record = Self::new(tag);
        for (name, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => continue,
            };
            record.attrs.insert(name.clone(), text);
        }
        record
    }

    /// Build from an XML element; every attribute is kept verbatim.
    pub fn from_xml(element: roxmltree::Node<'_, '_>) -> Self {
        let mut record = Self::new(element.tag_name().name());
        for attribute in element.attributes() {
            record
                .attrs
                .insert(attribute.name().to_string(), attribute.value().to_string());
        }
        record
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Raw attribute value. Empty strings count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Numeric (or any `FromStr`) coercion; `None` when absent or unparsable.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.trim().parse::<T>().ok())
    }

    /// Split a list-valued attribute on `,` `;` `|` or whitespace.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|v| {
                v.split(|c: char| LIST_SEPARATORS.contains(&c) || c.is_whitespace())
                    .filter(|piece| !piece.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Collect `prefix1`, `prefix2`, ... stopping at the first missing index.
    pub fn numbered(&self, prefix: &str) -> Vec<String> {
        let mut values = Vec::new();
        for i in 1..=MAX_NUMBERED {
            match self.attrs.get(&format!("{prefix}{i}")) {
                Some(value) => values.push(value.clone()),
                None => break,
            }
        }
        values
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_coerces_scalars_and_skips_nested() {
        let value = json!({"id": 100, "name": "Alice", "boss": true, "tags": ["a"], "x": null});
        let record = AttributeRecord::from_json("hero", value.as_object().unwrap());
        assert_eq!(record.id(), Some("100"));
        assert_eq!(record.get("boss"), Some("1"));
        assert_eq!(record.get("tags"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn from_xml_keeps_attributes_verbatim() {
        let doc = roxmltree::Document::parse(r#"<BGR><skill id="9001" name="Slash" atkscale=" 1.5"/></BGR>"#)
            .expect("xml");
        let element = doc.root_element().first_element_child().expect("skill");
        let record = AttributeRecord::from_xml(element);
        assert_eq!(record.tag, "skill");
        assert_eq!(record.id(), Some("9001"));
        assert_eq!(record.get("atkscale"), Some(" 1.5"));
        assert_eq!(record.parse::<f64>("atkscale"), Some(1.5));
    }

    #[test]
    fn parse_returns_none_for_garbage() {
        let record = AttributeRecord::new("hero").with("hp", " 1200 ").with("atk", "n/a");
        assert_eq!(record.parse::<i64>("hp"), Some(1200));
        assert_eq!(record.parse::<i64>("atk"), None);
        assert_eq!(record.parse::<i64>("def"), None);
    }

    #[test]
    fn list_splits_on_every_separator() {
        let record = AttributeRecord::new("hero").with("monster_skill", "10,20;30| 40  50");
        assert_eq!(record.list("monster_skill"), vec!["10", "20", "30", "40", "50"]);
        assert!(record.list("missing").is_empty());
    }

    #[test]
    fn numbered_stops_at_first_gap() {
        let record = AttributeRecord::new("skill")
            .with("buff1", "7")
            .with("buff2", "8")
            .with("buff4", "9");
        assert_eq!(record.numbered("buff"), vec!["7", "8"]);
    }

    #[test]
    fn empty_value_is_absent() {
        let record = AttributeRecord::new("hero").with("comment", "");
        assert_eq!(record.get("comment"), None);
    }
}
