use serde_json::Value;

use seedloom_core::RawItem;

use crate::error::{LlmError, Result};

/// Pull the JSON array of objects out of a free-form model reply.
///
/// Takes the text from the first `[` to the last `]`, so prose or code fences around the
/// array are ignored.
pub fn extract_json_array(text: &str) -> Result<Vec<RawItem>> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Err(LlmError::MissingDelimiters);
    };
    if end < start {
        return Err(LlmError::MissingDelimiters);
    }

    let parsed: Value = serde_json::from_str(&text[start..=end])
        .map_err(|err| LlmError::NotAnArray(err.to_string()))?;
    let Value::Array(elements) = parsed else {
        return Err(LlmError::NotAnArray("top-level value is not an array".to_string()));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| match element {
            Value::Object(map) => Ok(map),
            _ => Err(LlmError::NonObjectElement { index }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_is_found_inside_prose_and_fences() {
        let reply = "Sure! Here you go:\n```json\n[{\"name\": \"Acme\"}, {\"name\": \"Globex\"}]\n```\nEnjoy.";
        let items = extract_json_array(reply).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("name"), Some(&json!("Globex")));
    }

    #[test]
    fn field_order_is_preserved() {
        let items = extract_json_array(r#"[{"z": 1, "a": 2, "m": 3}]"#).unwrap();
        let keys: Vec<&str> = items[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn missing_brackets_are_reported() {
        let err = extract_json_array("{\"name\": \"Acme\"}").unwrap_err();
        assert!(matches!(err, LlmError::MissingDelimiters));
        assert_eq!(err.to_string(), "missing bracket delimiters");

        let err = extract_json_array("] backwards [").unwrap_err();
        assert!(matches!(err, LlmError::MissingDelimiters));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = extract_json_array("[{\"name\": }]").unwrap_err();
        assert!(matches!(err, LlmError::NotAnArray(_)));
    }

    #[test]
    fn non_object_elements_are_rejected() {
        let err = extract_json_array(r#"[{"name": "ok"}, "nope"]"#).unwrap_err();
        assert!(matches!(err, LlmError::NonObjectElement { index: 1 }));
    }

    #[test]
    fn empty_array_is_returned_as_is() {
        assert!(extract_json_array("[]").unwrap().is_empty());
    }
}
