//! Comment side table
//!
//! Comments live outside the tree. The tree only holds the range markers and
//! the reference run that point at a record by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a comment record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentOrigin {
    /// Already present in the document when it was opened
    Loaded,
    /// Created during this session
    Added,
}

/// A comment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// Decimal id, unique within the document
    pub id: String,
    pub author: String,
    pub initials: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// Plain-text body
    pub body: String,
    pub origin: CommentOrigin,
}

impl CommentRecord {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        date: Option<DateTime<Utc>>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            initials: None,
            date,
            body: body.into(),
            origin: CommentOrigin::Added,
        }
    }

    pub fn with_initials(mut self, initials: Option<String>) -> Self {
        self.initials = initials;
        self
    }

    /// Mark the record as read from the document
    pub fn loaded(mut self) -> Self {
        self.origin = CommentOrigin::Loaded;
        self
    }
}

/// Append-only collection of comment records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentStore {
    records: Vec<CommentRecord>,
}

impl CommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn push(&mut self, record: CommentRecord) {
        self.records.push(record);
    }

    /// Id the next added comment will receive
    pub fn next_id(&self) -> String {
        next_comment_id(self.ids())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&CommentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommentRecord> {
        self.records.iter()
    }

    /// Records created during this session, in creation order
    pub fn added(&self) -> impl Iterator<Item = &CommentRecord> {
        self.records
            .iter()
            .filter(|r| r.origin == CommentOrigin::Added)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One more than the largest numeric id in use, or `"1"` when there is none.
/// Ids that are not decimal numbers are ignored.
pub fn next_comment_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    existing
        .into_iter()
        .filter_map(|id| id.trim().parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_defaults_to_one() {
        assert_eq!(next_comment_id(std::iter::empty()), "1");
        assert_eq!(CommentStore::new().next_id(), "1");
    }

    #[test]
    fn test_next_id_follows_max() {
        assert_eq!(next_comment_id(["1", "3", "4"]), "5");
        assert_eq!(next_comment_id(["0"]), "1");
        assert_eq!(next_comment_id(["x", "7", "2"]), "8");
    }

    #[test]
    fn test_ids_are_sequential_when_appending() {
        let mut store = CommentStore::new();
        for expected in 1..=4 {
            let id = store.next_id();
            assert_eq!(id, expected.to_string());
            store.push(CommentRecord::new(id, "A", None, "body"));
        }
        assert_eq!(store.len(), 4);
        assert_eq!(store.added().count(), 4);
    }

    #[test]
    fn test_loaded_records_are_not_added() {
        let mut store = CommentStore::new();
        store.push(CommentRecord::new("9", "B", None, "old").loaded());
        store.push(CommentRecord::new(store.next_id(), "A", None, "new"));
        assert_eq!(store.get("10").map(|r| r.body.as_str()), Some("new"));
        assert_eq!(store.added().count(), 1);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = CommentRecord::new("2", "A", None, "text").with_initials(Some("AB".into()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["initials"], "AB");
        assert_eq!(json["origin"], "Added");
        let back: CommentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
