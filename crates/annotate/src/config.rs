//! Reviewer configuration
//!
//! Who is stamped on comments and tracked changes, and when. Loaded from an
//! optional JSON file; command-line values override it.

use crate::{AnnotateError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Author used when none is configured
pub const DEFAULT_AUTHOR: &str = "Reviewer";

/// Identity and timestamp stamped on every record of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewerConfig {
    pub author: String,
    pub initials: Option<String>,
    /// Fixed timestamp; the session start time when unset
    pub date: Option<DateTime<Utc>>,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            initials: None,
            date: None,
        }
    }
}

impl ReviewerConfig {
    /// Load from a JSON file.
    ///
    /// A missing file gives the defaults, and so does a file that does not
    /// parse (with a warning). A file that exists but cannot be read is an
    /// error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No reviewer config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnnotateError::InvalidInput(format!("cannot read config {}: {}", path.display(), e))
        })?;
        match serde_json::from_str::<ReviewerConfig>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse reviewer config {}, using defaults: {}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Apply explicit values on top of this configuration
    pub fn with_overrides(
        mut self,
        author: Option<String>,
        initials: Option<String>,
        date: Option<DateTime<Utc>>,
    ) -> Self {
        if let Some(author) = author {
            self.author = author;
        }
        if initials.is_some() {
            self.initials = initials;
        }
        if date.is_some() {
            self.date = date;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let config = ReviewerConfig::default();
        assert_eq!(config.author, "Reviewer");
        assert!(config.initials.is_none());
        assert!(config.date.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ReviewerConfig = serde_json::from_str(r#"{"initials": "JD"}"#).unwrap();
        assert_eq!(config.author, "Reviewer");
        assert_eq!(config.initials.as_deref(), Some("JD"));
    }

    #[test]
    fn test_date_parses_as_rfc3339() {
        let config: ReviewerConfig =
            serde_json::from_str(r#"{"author": "Jo", "date": "2024-02-01T09:30:00Z"}"#).unwrap();
        assert_eq!(config.date, Some(Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap()));
    }

    #[test]
    fn test_overrides() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let base = ReviewerConfig {
            author: "File".into(),
            initials: Some("F".into()),
            date: None,
        };
        let config = base.clone().with_overrides(Some("Flag".into()), None, Some(date));
        assert_eq!(config.author, "Flag");
        assert_eq!(config.initials.as_deref(), Some("F"));
        assert_eq!(config.date, Some(date));
        assert_eq!(base.clone().with_overrides(None, None, None), base);
    }
}
