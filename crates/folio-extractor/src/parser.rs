//! Parse service replies into item records
//!
//! Generative services do not reliably emit bare JSON, so parsing runs an
//! ordered list of recovery stages and takes the first one that yields a
//! list. Element shape is not checked here; see
//! [`ParsedElement`](crate::types::ParsedElement).

use crate::error::ParseError;
use folio_domain::row::truncate_chars;
use serde_json::Value;
use tracing::debug;

/// Characters of the reply kept in a [`ParseError`]
pub const PARSE_ERROR_EXCERPT_CHARS: usize = 500;

/// One attempt at recovering a JSON list from reply text
pub trait RecoveryStage: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// The recovered elements, or `None` if this stage does not apply
    fn recover(&self, raw: &str) -> Option<Vec<Value>>;
}

/// Parses the whole reply as JSON.
///
/// Accepts a bare list, or an object whose `items` field is a list.
pub struct StrictJson;

impl RecoveryStage for StrictJson {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn recover(&self, raw: &str) -> Option<Vec<Value>> {
        match serde_json::from_str::<Value>(raw).ok()? {
            Value::Array(elements) => Some(elements),
            Value::Object(mut fields) => match fields.remove("items") {
                Some(Value::Array(elements)) => Some(elements),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Parses the span from the first `[` to the last `]`, inclusive.
///
/// Recovers payloads wrapped in prose or markdown fences.
pub struct BracketScoped;

impl RecoveryStage for BracketScoped {
    fn name(&self) -> &'static str {
        "bracket-scoped"
    }

    fn recover(&self, raw: &str) -> Option<Vec<Value>> {
        let start = raw.find('[')?;
        let end = raw.rfind(']')?;
        if end <= start {
            return None;
        }

        match serde_json::from_str::<Value>(&raw[start..=end]).ok()? {
            Value::Array(elements) => Some(elements),
            _ => None,
        }
    }
}

/// Runs recovery stages in order over a reply
pub struct ResponseParser {
    stages: Vec<Box<dyn RecoveryStage>>,
}

impl ResponseParser {
    /// Parser with the strict and bracket-scoped stages
    pub fn new() -> Self {
        Self::with_stages(vec![Box::new(StrictJson), Box::new(BracketScoped)])
    }

    /// Parser with a custom stage list
    pub fn with_stages(stages: Vec<Box<dyn RecoveryStage>>) -> Self {
        Self { stages }
    }

    /// Parse a reply into its list elements
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_extractor::ResponseParser;
    ///
    /// let reply = "Here you go:\n[{\"key\":\"Name\",\"value\":\"Alice\",\"comments\":\"\"}]\nThanks";
    /// let items = ResponseParser::new().parse(reply).unwrap();
    /// assert_eq!(items.len(), 1);
    /// assert_eq!(items[0]["value"], "Alice");
    /// ```
    pub fn parse(&self, raw: &str) -> Result<Vec<Value>, ParseError> {
        for stage in &self.stages {
            if let Some(elements) = stage.recover(raw) {
                debug!("Reply parsed by {} stage: {} elements", stage.name(), elements.len());
                return Ok(elements);
            }
        }

        Err(ParseError {
            excerpt: truncate_chars(raw, PARSE_ERROR_EXCERPT_CHARS).to_string(),
        })
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_list() {
        let items = ResponseParser::new()
            .parse(r#"[{"key":"a","value":"1","comments":""}]"#)
            .unwrap();
        assert_eq!(items, vec![json!({"key":"a","value":"1","comments":""})]);
    }

    #[test]
    fn test_parse_items_object() {
        let items = ResponseParser::new()
            .parse(r#"{"items": [{"key":"a"}, {"key":"b"}]}"#)
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["key"], "b");
    }

    #[test]
    fn test_parse_prose_wrapped_list() {
        let reply = "Here you go:\n[{\"key\":\"Name\",\"value\":\"Alice\",\"comments\":\"\"}]\nThanks";
        let items = ResponseParser::new().parse(reply).unwrap();
        assert_eq!(
            items,
            vec![json!({"key":"Name","value":"Alice","comments":""})]
        );
    }

    #[test]
    fn test_parse_markdown_fenced_list() {
        let reply = "```json\n[{\"key\":\"k\",\"value\":\"v\",\"comments\":\"c\"}]\n```";
        let items = ResponseParser::new().parse(reply).unwrap();
        assert_eq!(items[0]["comments"], "c");
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(ResponseParser::new().parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_plain_text_fails() {
        let err = ResponseParser::new().parse("This is not JSON").unwrap_err();
        assert_eq!(err.excerpt, "This is not JSON");
    }

    #[test]
    fn test_parse_object_without_items_fails() {
        let result = ResponseParser::new().parse(r#"{"key": "a", "value": "b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_items_not_a_list_fails() {
        let result = ResponseParser::new().parse(r#"{"items": "none"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_object_with_nested_list_uses_brackets() {
        // Not an `items` object, but the bracket span is still a valid list
        let items = ResponseParser::new()
            .parse(r#"{"data": [1, 2]}"#)
            .unwrap();
        assert_eq!(items, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_parse_reversed_brackets_fails() {
        assert!(ResponseParser::new().parse("] nothing [").is_err());
    }

    #[test]
    fn test_parse_broken_bracket_span_fails() {
        assert!(ResponseParser::new().parse("see [1, 2 and 3]").is_err());
    }

    #[test]
    fn test_parse_error_excerpt_is_truncated() {
        let reply = "no json here ".repeat(100);
        let err = ResponseParser::new().parse(&reply).unwrap_err();
        assert_eq!(err.excerpt.chars().count(), PARSE_ERROR_EXCERPT_CHARS);
        assert!(reply.starts_with(&err.excerpt));
    }

    #[test]
    fn test_stages_independently() {
        let wrapped = "prefix [1] suffix";
        assert!(StrictJson.recover(wrapped).is_none());
        assert_eq!(BracketScoped.recover(wrapped), Some(vec![json!(1)]));
        assert!(BracketScoped.recover("no brackets").is_none());
    }

    #[test]
    fn test_custom_stage_list() {
        let parser = ResponseParser::with_stages(vec![Box::new(StrictJson)]);
        assert!(parser.parse("prefix [1] suffix").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Property: well-formed items survive arbitrary surrounding prose
        #[test]
        fn test_parser_round_trip(
            items in proptest::collection::vec(("[a-zA-Z0-9 ]{0,12}", "[a-zA-Z0-9 ]{0,12}", "[a-z ]{0,8}"), 0..8),
            prefix in "[a-zA-Z :\n`]{0,20}",
            suffix in "[a-zA-Z .\n`]{0,20}",
        ) {
            let values: Vec<Value> = items
                .iter()
                .map(|(k, v, c)| json!({"key": k, "value": v, "comments": c}))
                .collect();
            let reply = format!("{}{}{}", prefix, Value::Array(values.clone()), suffix);

            let parsed = ResponseParser::new().parse(&reply).unwrap();
            prop_assert_eq!(parsed, values);
        }

        /// Property: replies without a bracket span and without JSON never parse
        #[test]
        fn test_parser_failure_mode(reply in "[a-zA-Z ,.:!?\n]{0,80}") {
            prop_assert!(ResponseParser::new().parse(&reply).is_err());
        }
    }
}
