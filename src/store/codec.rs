//! Transport encoding and canonical file format.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde_json::Value;

use super::StoreError;
use crate::models::Location;

/// Decode base64 content, tolerating the line breaks the remote inserts.
pub fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::Decode(format!("content is not valid base64: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| StoreError::Decode(format!("content is not valid UTF-8: {}", e)))
}

pub fn encode_content(text: &str) -> String {
    BASE64_STANDARD.encode(text.as_bytes())
}

/// Parse stored text as a record collection.
pub fn parse_collection(text: &str) -> Result<Vec<Location>, StoreError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| StoreError::Decode(format!("stored content is not valid JSON: {}", e)))?;
    let Value::Array(items) = value else {
        return Err(StoreError::Decode(
            "stored content is not a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let unknown = unknown_fields(&item);
            if !unknown.is_empty() {
                tracing::warn!(
                    "Stored record {} has unknown field(s) {:?}; the next commit drops them",
                    index,
                    unknown
                );
            }
            serde_json::from_value(item).map_err(|e| {
                StoreError::Decode(format!("stored record {} is malformed: {}", index, e))
            })
        })
        .collect()
}

/// Keys of a stored record that [`Location`] does not carry.
fn unknown_fields(item: &Value) -> Vec<String> {
    item.as_object()
        .map(|obj| {
            obj.keys()
                .filter(|k| !Location::FIELDS.contains(&k.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Canonical file text: 2-space indented JSON with one trailing newline.
pub fn to_canonical_json(rows: &[Location]) -> Result<String, StoreError> {
    let mut text = serde_json::to_string_pretty(rows)
        .map_err(|e| StoreError::Decode(format!("failed to serialize records: {}", e)))?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_format() {
        let rows = vec![
            Location::new("Berlin", 52.5, 13.4, 30.0),
            Location::new("Oslo", 59.9, 10.75, 25.5).with_days_ahead(2),
        ];
        let text = to_canonical_json(&rows).unwrap();
        let expected = r#"[
  {
    "name": "Berlin",
    "lat": 52.5,
    "lon": 13.4,
    "threshold": 30
  },
  {
    "name": "Oslo",
    "lat": 59.9,
    "lon": 10.75,
    "threshold": 25.5,
    "daysAhead": 2
  }
]
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_collection_format() {
        assert_eq!(to_canonical_json(&[]).unwrap(), "[]\n");
    }

    #[test]
    fn test_reformat_is_stable() {
        let text = "[{\"name\":\"Berlin\",\"lat\":52.5,\"lon\":13.4,\"threshold\":30}]";
        let once = to_canonical_json(&parse_collection(text).unwrap()).unwrap();
        let twice = to_canonical_json(&parse_collection(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
        assert!(once.ends_with("}\n]\n"));
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let encoded = encode_content("[\n  {\"name\": \"Zürich\"}\n]\n");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\n{}\n", head, tail);
        assert_eq!(
            decode_content(&wrapped).unwrap(),
            "[\n  {\"name\": \"Zürich\"}\n]\n"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_content("!!not base64!!"),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_collection("{\"name\": \"Berlin\"}").unwrap_err();
        assert!(err.to_string().contains("not a JSON array"));
        assert!(matches!(parse_collection("[1,"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_parse_reports_malformed_row_index() {
        let text = r#"[{"name":"Berlin","lat":52.5,"lon":13.4,"threshold":30},{"name":"Oslo","lat":"north","lon":10.75,"threshold":1}]"#;
        let err = parse_collection(text).unwrap_err();
        assert!(err.to_string().contains("stored record 1 is malformed"), "{}", err);
    }

    #[test]
    fn test_unknown_fields_are_listed() {
        let row = serde_json::json!({
            "name": "Rome", "lat": 41.9, "lon": 12.5, "threshold": 35, "notify": "ops@example.com"
        });
        assert_eq!(unknown_fields(&row), vec!["notify".to_string()]);
        assert!(unknown_fields(&serde_json::json!({"name": "Rome", "daysAhead": 2})).is_empty());
        assert!(unknown_fields(&serde_json::json!(3)).is_empty());
    }
}
