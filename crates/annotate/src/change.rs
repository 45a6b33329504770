//! Change list input
//!
//! JSON shape of one change:
//!
//! ```json
//! { "position": { "searchText": "...", "occurrence": 1, "caseSensitive": false,
//!                 "endSearchText": "...", "endOccurrence": 1 },
//!   "text": "...", "type": "Comment" }
//! ```

use crate::{AnnotateError, Result};
use edit_engine::TextSearchPosition;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with the located span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Attach a comment to the span
    Comment,
    /// Replace the span with tracked deletion and insertion
    Suggestion,
}

impl FromStr for ChangeKind {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Comment" => Ok(ChangeKind::Comment),
            "Suggestion" => Ok(ChangeKind::Suggestion),
            other => Err(AnnotateError::MalformedChange(format!(
                "unknown change type {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Comment => f.write_str("comment"),
            ChangeKind::Suggestion => f.write_str("suggestion"),
        }
    }
}

/// One requested change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub position: TextSearchPosition,
    /// Comment body, or the replacement text of a suggestion
    pub text: String,
    pub kind: ChangeKind,
}

/// A change as it appears in the JSON input, before its type is checked
#[derive(Debug, Deserialize)]
struct RawChange {
    position: TextSearchPosition,
    text: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl Change {
    pub fn comment(position: TextSearchPosition, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            kind: ChangeKind::Comment,
        }
    }

    pub fn suggestion(position: TextSearchPosition, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            kind: ChangeKind::Suggestion,
        }
    }

    /// Check required fields.
    ///
    /// A suggestion may have empty text, which proposes a plain deletion.
    pub fn validate(&self) -> Result<()> {
        let position = &self.position;
        if position.search_text.is_empty() {
            return Err(AnnotateError::InvalidInput("searchText is empty".into()));
        }
        if position.occurrence == 0 {
            return Err(AnnotateError::InvalidInput("occurrence must be at least 1".into()));
        }
        if let Some(end) = &position.end_search_text {
            if end.is_empty() {
                return Err(AnnotateError::InvalidInput("endSearchText is empty".into()));
            }
            if position.end_occurrence == 0 {
                return Err(AnnotateError::InvalidInput("endOccurrence must be at least 1".into()));
            }
        }
        if self.kind == ChangeKind::Comment && self.text.is_empty() {
            return Err(AnnotateError::InvalidInput("comment text is empty".into()));
        }
        Ok(())
    }

    fn from_raw(raw: RawChange) -> Result<Self> {
        let kind = raw
            .kind
            .ok_or_else(|| AnnotateError::MalformedChange("missing change type".into()))?
            .parse()?;
        let text = raw
            .text
            .ok_or_else(|| AnnotateError::InvalidInput("text is required".into()))?;
        let change = Self {
            position: raw.position,
            text,
            kind,
        };
        change.validate()?;
        Ok(change)
    }
}

/// Parse a change list: a JSON array of changes, or a single change object.
///
/// Every change is validated; the first bad one fails the whole list.
pub fn parse_changes(json: &str) -> Result<Vec<Change>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| AnnotateError::InvalidInput(format!("change list is not valid JSON: {}", e)))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        object @ serde_json::Value::Object(_) => vec![object],
        _ => {
            return Err(AnnotateError::InvalidInput(
                "change list must be a JSON array or object".into(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<RawChange>(item)
                .map_err(|e| AnnotateError::MalformedChange(e.to_string()))
                .and_then(Change::from_raw)
                .map_err(|e| e.in_change(i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let changes = parse_changes(
            r#"[{"position": {"searchText": "hello"}, "text": "Greeting", "type": "Comment"}]"#,
        )
        .unwrap();
        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.kind, ChangeKind::Comment);
        assert_eq!(change.text, "Greeting");
        assert_eq!(change.position, TextSearchPosition::new("hello"));
    }

    #[test]
    fn test_parse_full_position() {
        let json = r#"{
            "position": {"searchText": "From", "occurrence": 2, "caseSensitive": true,
                         "endSearchText": "here", "endOccurrence": 3},
            "text": "new words",
            "type": "Suggestion"
        }"#;
        let changes = parse_changes(json).unwrap();
        assert_eq!(
            changes[0],
            Change::suggestion(
                TextSearchPosition::new("From")
                    .occurrence(2)
                    .case_sensitive(true)
                    .ending_at("here", 3),
                "new words"
            )
        );
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let json = r#"[
            {"position": {"searchText": "a"}, "text": "x", "type": "Comment"},
            {"position": {"searchText": "b"}, "text": "y", "type": "Rewrite"}
        ]"#;
        let err = parse_changes(json).unwrap_err();
        match err {
            AnnotateError::Change { index, source } => {
                assert_eq!(index, 2);
                assert!(matches!(*source, AnnotateError::MalformedChange(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_is_malformed() {
        let err = parse_changes(r#"{"position": {"searchText": "a"}, "text": "x"}"#).unwrap_err();
        assert!(matches!(err, AnnotateError::Change { ref source, .. } if matches!(**source, AnnotateError::MalformedChange(_))));
    }

    #[test]
    fn test_empty_fields_are_invalid_input() {
        for json in [
            r#"{"position": {"searchText": ""}, "text": "x", "type": "Comment"}"#,
            r#"{"position": {"searchText": "a"}, "text": "", "type": "Comment"}"#,
            r#"{"position": {"searchText": "a", "occurrence": 0}, "text": "x", "type": "Comment"}"#,
            r#"{"position": {"searchText": "a", "endSearchText": ""}, "text": "x", "type": "Comment"}"#,
            r#"{"position": {"searchText": "a"}, "type": "Suggestion"}"#,
        ] {
            let err = parse_changes(json).unwrap_err();
            assert!(
                matches!(err, AnnotateError::Change { ref source, .. } if matches!(**source, AnnotateError::InvalidInput(_))),
                "{} gave {:?}",
                json,
                err
            );
        }
    }

    #[test]
    fn test_empty_suggestion_text_is_a_deletion() {
        let changes =
            parse_changes(r#"{"position": {"searchText": "a"}, "text": "", "type": "Suggestion"}"#).unwrap();
        assert_eq!(changes[0].kind, ChangeKind::Suggestion);
        assert!(changes[0].text.is_empty());
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(parse_changes("[{").unwrap_err(), AnnotateError::InvalidInput(_)));
        assert!(matches!(parse_changes("42").unwrap_err(), AnnotateError::InvalidInput(_)));
    }
}
