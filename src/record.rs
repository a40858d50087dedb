use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One portfolio entry. Field names match the persisted JSON shape.
///
/// `index` is a display label only; a record's identity is its position in
/// the list it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub index: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(rename = "imageAlt", default, deserialize_with = "lenient_string")]
    pub image_alt: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub overview: String,
    /// Comma separated, stored unsplit.
    #[serde(default, deserialize_with = "lenient_string")]
    pub tags: String,
}

impl ProjectRecord {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }
}

/// Split a raw tag string on commas and trim each entry.
///
/// An empty string yields no tags rather than a single empty one.
pub fn parse_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|tag| tag.trim().to_string()).collect()
}

/// Decode a JSON array of records. Elements that are not objects decode as
/// empty records so one bad entry does not discard the list.
pub fn records_from_values(values: Vec<Value>) -> Vec<ProjectRecord> {
    values
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_are_split_and_trimmed() {
        assert_eq!(parse_tags("go, rust ,  wasm"), vec!["go", "rust", "wasm"]);
    }

    #[test]
    fn empty_tags_yield_no_entries() {
        assert!(parse_tags("").is_empty());
        assert!(ProjectRecord::default().tag_list().is_empty());
    }

    #[test]
    fn interior_empty_tags_are_kept() {
        assert_eq!(parse_tags("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let record: ProjectRecord = serde_json::from_value(json!({ "title": "A" })).unwrap();
        assert_eq!(record, ProjectRecord::titled("A"));
    }

    #[test]
    fn scalar_fields_are_stringified() {
        let record: ProjectRecord = serde_json::from_value(json!({
            "index": 3,
            "title": null,
            "imageAlt": "alt",
            "tags": true
        }))
        .unwrap();
        assert_eq!(record.index, "3");
        assert_eq!(record.title, "");
        assert_eq!(record.image_alt, "alt");
        assert_eq!(record.tags, "true");
    }

    #[test]
    fn serializes_with_camel_case_alt() {
        let record = ProjectRecord {
            image_alt: "screenshot".into(),
            ..ProjectRecord::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["imageAlt"], "screenshot");
        assert!(value.get("image_alt").is_none());
    }

    #[test]
    fn non_object_elements_become_empty_records() {
        let records = records_from_values(vec![json!({ "title": "A" }), json!(7)]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "A");
        assert_eq!(records[1], ProjectRecord::default());
    }
}
