// [[FLEET]]/apps/fleet-console/src/editor.rs
// Purpose: Raw-text JSON editing with validated propagation into structured state.
// Architecture: Domain Building Block (used by every draft that carries a JSON buffer)
// Dependencies: Serde, serde_json, thiserror

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Message shown when no localized one was supplied.
pub const DEFAULT_INVALID_JSON: &str = "Invalid JSON format";

const EMPTY_OBJECT: &str = "{}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("{0}")]
    InvalidJson(String),
}

/// What an empty (or whitespace-only) buffer means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyBuffer {
    /// Empty text is a parse failure.
    #[default]
    Reject,
    /// Empty text is validated as `{}`.
    SubstituteEmptyObject,
}

/// Holds the text buffer of a JSON configuration and the last structured value that parsed.
///
/// The exposed value is always either the seed or the result of the most recent successful
/// parse. Invalid text never reaches it, and the buffer keeps the user's text verbatim.
#[derive(Debug)]
pub struct JsonConfigEditor<T> {
    buffer: String,
    committed_text: String,
    value: T,
    error: Option<String>,
    empty_buffer: EmptyBuffer,
    error_message: String,
}

impl<T> JsonConfigEditor<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Seed the buffer with the pretty-printed form of `value`.
    pub fn seeded(value: T) -> Self {
        let buffer = serde_json::to_string_pretty(&value).unwrap_or_else(|e| {
            tracing::warn!("Failed to render editor seed, starting from an empty object: {}", e);
            EMPTY_OBJECT.to_string()
        });
        Self {
            committed_text: buffer.clone(),
            buffer,
            value,
            error: None,
            empty_buffer: EmptyBuffer::Reject,
            error_message: DEFAULT_INVALID_JSON.to_string(),
        }
    }

    pub fn with_empty_buffer(mut self, policy: EmptyBuffer) -> Self {
        self.empty_buffer = policy;
        self
    }

    /// Replace the fixed failure message (normally the localized `common.invalidJson`).
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Store `text` and try to parse it.
    ///
    /// On success the structured value is replaced and the error cleared. On failure the value
    /// stays as it was and the fixed error message is set.
    pub fn on_text_change(&mut self, text: &str) -> Result<&T, EditorError> {
        self.buffer = text.to_string();

        let candidate = if text.trim().is_empty() {
            match self.empty_buffer {
                EmptyBuffer::Reject => None,
                EmptyBuffer::SubstituteEmptyObject => Some(EMPTY_OBJECT),
            }
        } else {
            Some(text)
        };

        let parsed = candidate.and_then(|src| serde_json::from_str::<T>(src).ok());

        match parsed {
            Some(value) => {
                self.value = value;
                self.committed_text = text.to_string();
                self.error = None;
                Ok(&self.value)
            }
            None => {
                tracing::debug!("Rejected editor buffer ({} bytes)", text.len());
                self.error = Some(self.error_message.clone());
                Err(EditorError::InvalidJson(self.error_message.clone()))
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// The text that produced the current value (the seed text until a parse succeeds).
    pub fn committed_text(&self) -> &str {
        &self.committed_text
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        self.error.is_none()
    }

    /// Submission guard: hands out the value only while the buffer is valid.
    pub fn submit(&self) -> Result<T, EditorError> {
        match &self.error {
            Some(message) => Err(EditorError::InvalidJson(message.clone())),
            None => Ok(self.value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_seed_is_pretty_printed() {
        let editor = JsonConfigEditor::seeded(json!({"fps": 15}));
        assert_eq!(editor.text(), "{\n  \"fps\": 15\n}");
        assert!(editor.can_submit());
    }

    #[test]
    fn test_valid_text_propagates_parsed_value() {
        let mut editor = JsonConfigEditor::seeded(json!({}));

        let text = r#"{"batch_size": 100, "output": ["json", "csv"]}"#;
        let value = editor.on_text_change(text).unwrap().clone();

        let expected: Value = serde_json::from_str(text).unwrap();
        assert_eq!(value, expected);
        assert_eq!(editor.value(), &expected);
        assert_eq!(editor.committed_text(), text);
    }

    #[test]
    fn test_invalid_text_freezes_value_and_keeps_buffer() {
        let mut editor = JsonConfigEditor::seeded(json!({"a": 1}));
        editor.on_text_change(r#"{"a": 2}"#).unwrap();

        let err = editor.on_text_change(r#"{"a": 3"#).unwrap_err();
        assert_eq!(err, EditorError::InvalidJson(DEFAULT_INVALID_JSON.to_string()));
        assert_eq!(editor.value(), &json!({"a": 2}));
        assert_eq!(editor.text(), r#"{"a": 3"#);
        assert_eq!(editor.committed_text(), r#"{"a": 2}"#);
        assert_eq!(editor.error(), Some(DEFAULT_INVALID_JSON));
        assert!(editor.submit().is_err());

        // fixing the text re-enables submission
        editor.on_text_change(r#"{"a": 3}"#).unwrap();
        assert_eq!(editor.submit().unwrap(), json!({"a": 3}));
    }

    #[test]
    fn test_empty_buffer_policy() {
        let mut strict = JsonConfigEditor::seeded(json!({"loop": true}));
        assert!(strict.on_text_change("   ").is_err());
        assert_eq!(strict.value(), &json!({"loop": true}));

        let mut lenient = JsonConfigEditor::seeded(json!({"loop": true}))
            .with_empty_buffer(EmptyBuffer::SubstituteEmptyObject);
        assert_eq!(lenient.on_text_change("").unwrap(), &json!({}));
        assert_eq!(lenient.text(), "");
    }

    #[test]
    fn test_localized_message_and_typed_target() {
        #[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
        struct Limits {
            max_tokens: u32,
        }

        let mut editor = JsonConfigEditor::seeded(Limits { max_tokens: 1024 })
            .with_error_message("Format JSON invalide");
        // well-formed JSON with the wrong shape is rejected too
        let err = editor.on_text_change(r#"{"max_tokens": "many"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Format JSON invalide");
        assert_eq!(editor.value().max_tokens, 1024);
    }

    #[test]
    fn test_buffers_under_both_empty_policies() {
        let seed = json!({"seed": true});
        let cases: &[(&str, Option<Value>, Option<Value>)] = &[
            (
                r#"{"a": {"b": {"c": [1, 2, {"d": null}]}}}"#,
                Some(json!({"a": {"b": {"c": [1, 2, {"d": null}]}}})),
                None,
            ),
            ("[1, \"two\", [3.5, false]]", Some(json!([1, "two", [3.5, false]])), None),
            ("  \"text\"  ", Some(json!("text")), None),
            ("{}", Some(json!({})), None),
            ("", None, Some(json!({}))),
            (" \n\t ", None, Some(json!({}))),
            (r#"{"a": [1, 2}"#, None, None),
            (r#"{"a": 1,}"#, None, None),
            ("{'a': 1}", None, None),
            ("[1, 2", None, None),
        ];

        for (text, strict_expected, lenient_only) in cases {
            let mut strict = JsonConfigEditor::seeded(seed.clone());
            let mut lenient = JsonConfigEditor::seeded(seed.clone())
                .with_empty_buffer(EmptyBuffer::SubstituteEmptyObject);
            let strict_result = strict.on_text_change(text).ok().cloned();
            let lenient_result = lenient.on_text_change(text).ok().cloned();

            assert_eq!(&strict_result, strict_expected, "strict: {:?}", text);
            let lenient_expected = strict_expected.clone().or_else(|| lenient_only.clone());
            assert_eq!(lenient_result, lenient_expected, "lenient: {:?}", text);

            let outcomes = [
                (&strict, strict_result.is_some()),
                (&lenient, lenient_result.is_some()),
            ];
            for (editor, accepted) in outcomes {
                assert_eq!(editor.text(), *text);
                assert_eq!(editor.can_submit(), accepted, "{:?}", text);
                if !accepted {
                    assert_eq!(editor.value(), &seed);
                }
            }
        }
    }
}
