//! Paper records as written to the output stream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One paper mined from the bibliography source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    /// Author names in source order
    #[serde(default)]
    pub authors: Vec<String>,
    /// Remaining source fields (venue, year, keys, links, ...), in source order
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
    /// Names of authors of citing papers, flattened across citing documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<String>>,
}

impl PaperRecord {
    /// Build a record from a metadata object.
    ///
    /// Returns `None` unless `title` is plain text; titles with inline
    /// markup or empty titles decode to non-string values and are dropped.
    pub fn from_metadata(mut fields: Map<String, Value>) -> Option<Self> {
        let title = match fields.get("title") {
            Some(Value::String(title)) => title.clone(),
            _ => return None,
        };
        fields.shift_remove("title");
        let authors = fields
            .shift_remove("author")
            .map(author_names)
            .unwrap_or_default();

        Some(Self {
            title,
            authors,
            metadata: fields,
            citations: None,
        })
    }

    /// Attach citing-author names; an empty list leaves the record unchanged.
    pub fn attach_citations(&mut self, names: Vec<String>) {
        if !names.is_empty() {
            self.citations = Some(names);
        }
    }
}

/// Author names from a single entry or a list of entries; entries with
/// attributes carry the name under `#text`.
fn author_names(value: Value) -> Vec<String> {
    let entries = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(name) => Some(name),
            Value::Object(mut fields) => match fields.remove("#text") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Keep only metadata objects whose `title` is plain text.
pub fn text_titled(objects: Vec<Map<String, Value>>) -> Vec<Map<String, Value>> {
    objects
        .into_iter()
        .filter(|fields| matches!(fields.get("title"), Some(Value::String(_))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_from_metadata() {
        let record = PaperRecord::from_metadata(object(json!({
            "@key": "conf/icse/Smith10",
            "author": ["Ann Smith", {"@orcid": "0000-0001", "#text": "Bob Jones"}],
            "title": "Static Analysis at Scale.",
            "booktitle": "ICSE",
            "year": "2010"
        })))
        .expect("text title");

        assert_eq!(record.title, "Static Analysis at Scale.");
        assert_eq!(record.authors, vec!["Ann Smith", "Bob Jones"]);
        assert_eq!(record.metadata["booktitle"], json!("ICSE"));
        assert!(record.metadata.get("title").is_none());
        assert!(record.citations.is_none());
    }

    #[test]
    fn test_single_author_string() {
        let record = PaperRecord::from_metadata(object(json!({
            "author": "Solo Writer",
            "title": "Alone"
        })))
        .expect("text title");
        assert_eq!(record.authors, vec!["Solo Writer"]);
    }

    #[test]
    fn test_non_text_titles_rejected() {
        assert!(PaperRecord::from_metadata(object(json!({"title": {"i": "k", "#text": "-means"}}))).is_none());
        assert!(PaperRecord::from_metadata(object(json!({"title": null}))).is_none());
        assert!(PaperRecord::from_metadata(object(json!({"year": "2010"}))).is_none());
    }

    #[test]
    fn test_text_title_filter_is_idempotent() {
        let objects = vec![
            object(json!({"title": "Kept"})),
            object(json!({"title": {"sub": "2", "#text": "H O"}})),
            object(json!({"title": null})),
            object(json!({"title": "Also kept"})),
        ];
        let once = text_titled(objects);
        let twice = text_titled(once.clone());
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_serialized_layout() -> Result<(), serde_json::Error> {
        let mut record = PaperRecord::from_metadata(object(json!({
            "@key": "k1",
            "author": "A",
            "title": "T",
            "year": "2001"
        })))
        .expect("text title");

        assert_eq!(
            serde_json::to_string(&record)?,
            r#"{"title":"T","authors":["A"],"@key":"k1","year":"2001"}"#
        );

        record.attach_citations(Vec::new());
        assert!(record.citations.is_none());

        record.attach_citations(vec!["C One".to_string(), "C Two".to_string()]);
        assert_eq!(
            serde_json::to_string(&record)?,
            r#"{"title":"T","authors":["A"],"@key":"k1","year":"2001","citations":["C One","C Two"]}"#
        );
        Ok(())
    }
}
