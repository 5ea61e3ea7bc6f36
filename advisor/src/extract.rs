use serde_json::Value;

use crate::error::AdapterError;

/// One way of locating the model's JSON text inside a response envelope
type Extractor = fn(&Value) -> Option<&str>;

/// Tried in order, first hit wins.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("output_text", top_level_output_text),
    ("output.message.output_text", first_message_output_text),
];

/// Locate the JSON text the model produced.
///
/// Returns [`AdapterError::MissingOutput`] once every extractor has come back empty.
pub fn extract_payload(envelope: &Value) -> Result<&str, AdapterError> {
    EXTRACTORS
        .iter()
        .find_map(|(name, extract)| {
            let text = extract(envelope)?;
            tracing::debug!("Model payload found via {} ({} bytes)", name, text.len());
            Some(text)
        })
        .ok_or(AdapterError::MissingOutput)
}

/// Convenience field some clients and proxies add to the envelope
fn top_level_output_text(envelope: &Value) -> Option<&str> {
    envelope
        .get("output_text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// First `output_text` part of the first message item that has one
fn first_message_output_text(envelope: &Value) -> Option<&str> {
    envelope
        .get("output")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_top_level_text() {
        let envelope = json!({
            "output_text": "{\"from\":\"top\"}",
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": "{\"from\":\"items\"}"}]
            }]
        });
        assert_eq!(extract_payload(&envelope).unwrap(), "{\"from\":\"top\"}");
    }

    #[test]
    fn empty_top_level_text_falls_through() {
        let envelope = json!({
            "output_text": "",
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": "{}"}]
            }]
        });
        assert_eq!(extract_payload(&envelope).unwrap(), "{}");
    }

    #[test]
    fn skips_non_message_items_and_non_text_parts() {
        let envelope = json!({
            "output": [
                {"type": "reasoning", "content": [{"type": "output_text", "text": "no"}]},
                {"type": "message", "content": [
                    {"type": "refusal", "refusal": "nope"},
                    {"type": "output_text", "text": ""}
                ]},
                {"type": "message", "content": [{"type": "output_text", "text": "yes"}]}
            ]
        });
        assert_eq!(extract_payload(&envelope).unwrap(), "yes");
    }

    #[test]
    fn nothing_found_is_missing_output() {
        for envelope in [
            json!({}),
            json!({"output": []}),
            json!({"output": "text"}),
            json!({"output": [{"type": "message"}]}),
        ] {
            assert!(matches!(
                extract_payload(&envelope),
                Err(AdapterError::MissingOutput)
            ));
        }
    }
}
