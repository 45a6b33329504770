//! Text locator
//!
//! Resolves a [`TextSearchPosition`] to tree coordinates. Resolution never
//! gives up on a miss: it degrades through [`MatchTier`]s until something in
//! the document can anchor the result, creating an empty run as a last
//! resort.

use crate::{IndexEntry, PositionIndex, Result};
use doc_model::{DocumentTree, LeafPoint, NodeId, Paragraph, Run};
use serde::{Deserialize, Serialize};

/// Queries shorter than this never use the prefix fallback
const PREFIX_LEN: usize = 5;
/// Width of the anchor chosen by the first-non-blank fallback
const FALLBACK_SPAN: usize = 10;

fn default_occurrence() -> usize {
    1
}

/// What text to look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchPosition {
    pub search_text: String,
    /// 1-based occurrence of `search_text`
    #[serde(default = "default_occurrence")]
    pub occurrence: usize,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Optional query whose match closes the range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_search_text: Option<String>,
    /// 1-based occurrence of `end_search_text`
    #[serde(default = "default_occurrence")]
    pub end_occurrence: usize,
}

impl TextSearchPosition {
    /// First case-insensitive occurrence of `search_text`
    pub fn new(search_text: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            occurrence: 1,
            case_sensitive: false,
            end_search_text: None,
            end_occurrence: 1,
        }
    }

    pub fn occurrence(mut self, occurrence: usize) -> Self {
        self.occurrence = occurrence;
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    /// Extend the range to the end of the given occurrence of `text`
    pub fn ending_at(mut self, text: impl Into<String>, occurrence: usize) -> Self {
        self.end_search_text = Some(text.into());
        self.end_occurrence = occurrence;
        self
    }
}

/// Which resolution strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    /// The requested occurrence(s) matched exactly
    Exact,
    /// The first few characters of the query matched
    PartialPrefix,
    /// Anchored on the first text leaf that is not blank
    FirstNonBlank,
    /// No usable text; anchored on an empty run in the first paragraph
    Structural,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchTier::Exact => "exact",
            MatchTier::PartialPrefix => "partial-prefix",
            MatchTier::FirstNonBlank => "first-non-blank",
            MatchTier::Structural => "structural",
        };
        f.write_str(name)
    }
}

/// A point inside a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCoordinate {
    pub run: NodeId,
    /// Offset among the run's visible characters
    pub run_offset: usize,
    /// The same point expressed on the run's leaves
    pub point: LeafPoint,
}

impl RunCoordinate {
    /// Point just before the character described by `entry`
    fn before(entry: &IndexEntry) -> Self {
        Self {
            run: entry.run,
            run_offset: entry.run_offset,
            point: LeafPoint::new(entry.leaf_index, entry.leaf_offset),
        }
    }

    /// Point just after the character described by `entry`
    fn after(entry: &IndexEntry) -> Self {
        Self {
            run: entry.run,
            run_offset: entry.run_offset + 1,
            point: LeafPoint::new(entry.leaf_index, entry.leaf_offset + 1),
        }
    }
}

/// Resolved range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub start_container: NodeId,
    pub start: RunCoordinate,
    pub end_container: NodeId,
    pub end: RunCoordinate,
    pub matched_text: String,
    pub tier: MatchTier,
    /// Logical offset of the first matched character
    pub start_offset: usize,
    /// Logical offset just past the last matched character
    pub end_offset: usize,
}

impl SearchResult {
    /// Whether the range covers no characters
    pub fn is_collapsed(&self) -> bool {
        self.start_offset >= self.end_offset
    }

    /// Whether an end query resolved at or before the start of the range.
    /// Only the structural anchor is legitimately empty.
    pub fn is_inverted(&self) -> bool {
        self.end_offset <= self.start_offset && self.tier != MatchTier::Structural
    }

    fn from_offsets(index: &PositionIndex, start: usize, end: usize, tier: MatchTier) -> Option<Self> {
        let first = index.entry(start)?;
        let last = index.entry(end.checked_sub(1)?)?;
        Some(Self {
            start_container: first.paragraph,
            start: RunCoordinate::before(first),
            end_container: last.paragraph,
            end: RunCoordinate::after(last),
            matched_text: index.slice(start, end),
            tier,
            start_offset: start,
            end_offset: end,
        })
    }
}

/// Resolve `position` against the current state of `tree`.
///
/// Misses never fail: the only error is a tree that rejects the empty run
/// created by the structural fallback.
pub fn locate(tree: &mut DocumentTree, position: &TextSearchPosition) -> Result<SearchResult> {
    let index = PositionIndex::build(tree);

    if let Some(result) = exact_match(&index, position) {
        tracing::debug!(
            "Matched {:?} at {}..{}",
            result.matched_text,
            result.start_offset,
            result.end_offset
        );
        return Ok(result);
    }

    if let Some(result) = prefix_match(&index, position) {
        tracing::warn!(
            "No exact match for {:?}; anchored on its prefix at offset {}",
            position.search_text,
            result.start_offset
        );
        return Ok(result);
    }

    if let Some(result) = first_non_blank(&index) {
        tracing::warn!(
            "No match for {:?}; anchored on the first non-blank text at offset {}",
            position.search_text,
            result.start_offset
        );
        return Ok(result);
    }

    tracing::warn!(
        "No usable text for {:?}; anchoring on the first paragraph",
        position.search_text
    );
    structural_anchor(tree)
}

/// Start offset of the `occurrence`-th match of `needle`.
///
/// Occurrences are counted on overlapping windows. Without `case_sensitive`
/// case is ignored. With it, the `occurrence`-th exact-case match wins; when
/// there are fewer exact-case matches than that, resolution takes the
/// `occurrence`-th match ignoring case and moves forward to the first match
/// whose case is exact.
pub fn find_occurrence(
    haystack: &[char],
    needle: &[char],
    occurrence: usize,
    case_sensitive: bool,
) -> Option<usize> {
    if needle.is_empty() || occurrence == 0 || needle.len() > haystack.len() {
        return None;
    }
    let last_start = haystack.len() - needle.len();
    let matches_at = |start: usize, exact: bool| {
        haystack[start..start + needle.len()]
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_match(a, b, exact))
    };
    if case_sensitive {
        if let Some(start) = (0..=last_start)
            .filter(|&start| matches_at(start, true))
            .nth(occurrence - 1)
        {
            return Some(start);
        }
    }
    let nth = (0..=last_start)
        .filter(|&start| matches_at(start, false))
        .nth(occurrence - 1)?;
    if !case_sensitive {
        return Some(nth);
    }
    (nth..=last_start).find(|&start| matches_at(start, true))
}

fn chars_match(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive || a == b {
        a == b
    } else {
        a.to_lowercase().eq(b.to_lowercase())
    }
}

fn exact_match(index: &PositionIndex, position: &TextSearchPosition) -> Option<SearchResult> {
    let needle: Vec<char> = position.search_text.chars().collect();
    let start = find_occurrence(index.chars(), &needle, position.occurrence, position.case_sensitive)?;
    let end = match position.end_search_text.as_deref().filter(|t| !t.is_empty()) {
        Some(end_text) => {
            let end_needle: Vec<char> = end_text.chars().collect();
            let end_start = find_occurrence(
                index.chars(),
                &end_needle,
                position.end_occurrence,
                position.case_sensitive,
            )?;
            end_start + end_needle.len()
        }
        None => start + needle.len(),
    };
    SearchResult::from_offsets(index, start, end, MatchTier::Exact)
}

fn prefix_match(index: &PositionIndex, position: &TextSearchPosition) -> Option<SearchResult> {
    let needle: Vec<char> = position.search_text.chars().collect();
    if needle.len() <= PREFIX_LEN {
        return None;
    }
    let start = find_occurrence(index.chars(), &needle[..PREFIX_LEN], 1, position.case_sensitive)?;
    let end = (start + needle.len()).min(index.len());
    SearchResult::from_offsets(index, start, end, MatchTier::PartialPrefix)
}

fn first_non_blank(index: &PositionIndex) -> Option<SearchResult> {
    let leaf = index.leaves().iter().find(|leaf| !leaf.blank)?;
    let end = leaf.start + leaf.len.min(FALLBACK_SPAN);
    SearchResult::from_offsets(index, leaf.start, end, MatchTier::FirstNonBlank)
}

/// Anchor on a fresh empty run at the start of the first paragraph,
/// creating the paragraph when the body has none.
fn structural_anchor(tree: &mut DocumentTree) -> Result<SearchResult> {
    let paragraph = match tree.first_paragraph() {
        Some(id) => id,
        None => {
            let root = tree.root_id();
            tree.insert_paragraph(Paragraph::new(), root, Some(0))?
        }
    };
    let run = tree.insert_run(Run::with_text(""), paragraph, Some(0))?;
    let coordinate = RunCoordinate {
        run,
        run_offset: 0,
        point: LeafPoint::new(0, 0),
    };
    Ok(SearchResult {
        start_container: paragraph,
        start: coordinate,
        end_container: paragraph,
        end: coordinate,
        matched_text: String::new(),
        tier: MatchTier::Structural,
        start_offset: 0,
        end_offset: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Node, OpaqueNode};

    fn tree_with(paragraphs: &[&[&str]]) -> DocumentTree {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        for runs in paragraphs {
            let para = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();
            for text in *runs {
                tree.insert_run(Run::with_text(*text), para, None).unwrap();
            }
        }
        tree
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_case_insensitive_first_occurrence() {
        let mut tree = tree_with(&[&["Hello world, hello again."]]);
        let result = locate(&mut tree, &TextSearchPosition::new("hello")).unwrap();
        assert_eq!(result.tier, MatchTier::Exact);
        assert_eq!(result.start_offset, 0);
        assert_eq!(result.matched_text, "Hello");
    }

    #[test]
    fn test_case_sensitive_second_occurrence() {
        let mut tree = tree_with(&[&["Hello world, hello again."]]);
        let position = TextSearchPosition::new("hello").occurrence(2).case_sensitive(true);
        let result = locate(&mut tree, &position).unwrap();
        assert_eq!(result.tier, MatchTier::Exact);
        assert_eq!(result.start_offset, 13);
        assert_eq!(result.matched_text, "hello");
    }

    #[test]
    fn test_missing_occurrence_falls_through() {
        // Five-character queries never use the prefix tier
        let mut tree = tree_with(&[&["Hello world, hello again."]]);
        let position = TextSearchPosition::new("hello").occurrence(3);
        let result = locate(&mut tree, &position).unwrap();
        assert_eq!(result.tier, MatchTier::FirstNonBlank);
        assert_eq!(result.start_offset, 0);
        assert_eq!(result.matched_text, "Hello worl");
    }

    #[test]
    fn test_case_sensitive_moves_to_exact_case() {
        let haystack = chars("Hello hello HELLO hello");
        let needle = chars("hello");
        assert_eq!(find_occurrence(&haystack, &needle, 1, true), Some(6));
        assert_eq!(find_occurrence(&haystack, &needle, 3, true), Some(18));
        assert_eq!(find_occurrence(&haystack, &needle, 3, false), Some(12));
        assert_eq!(find_occurrence(&chars("HELLO"), &needle, 1, true), None);
    }

    #[test]
    fn test_case_sensitive_counts_exact_matches_first() {
        let haystack = chars("Hello Hello hello hello");
        let needle = chars("hello");
        assert_eq!(find_occurrence(&haystack, &needle, 1, true), Some(12));
        assert_eq!(find_occurrence(&haystack, &needle, 2, true), Some(18));
        assert_eq!(find_occurrence(&haystack, &needle, 3, true), Some(12));
        assert_eq!(find_occurrence(&haystack, &needle, 2, false), Some(6));
    }

    #[test]
    fn test_case_sensitive_first_occurrence() {
        let mut tree = tree_with(&[&["Hello world, hello again."]]);
        let position = TextSearchPosition::new("hello").case_sensitive(true);
        let result = locate(&mut tree, &position).unwrap();
        assert_eq!(result.start_offset, 13);
        assert_eq!(result.end_offset, 18);
        assert_eq!(result.start.run_offset, 13);
    }

    #[test]
    fn test_nth_occurrence() {
        let haystack = chars("a-b-a-b-a");
        assert_eq!(find_occurrence(&haystack, &chars("a"), 1, true), Some(0));
        assert_eq!(find_occurrence(&haystack, &chars("a"), 3, true), Some(8));
        assert_eq!(find_occurrence(&haystack, &chars("a"), 4, true), None);
        assert_eq!(find_occurrence(&haystack, &chars("a"), 0, true), None);
        assert_eq!(find_occurrence(&haystack, &chars(""), 1, true), None);
    }

    #[test]
    fn test_occurrences_overlap() {
        let haystack = chars("aaaa");
        assert_eq!(find_occurrence(&haystack, &chars("aa"), 2, true), Some(1));
        assert_eq!(find_occurrence(&haystack, &chars("aa"), 3, true), Some(2));
    }

    #[test]
    fn test_case_folding_is_per_character() {
        let haystack = chars("STRASSE Ärger");
        assert_eq!(find_occurrence(&haystack, &chars("ärger"), 1, false), Some(8));
        assert_eq!(find_occurrence(&haystack, &chars("ärger"), 1, true), None);
    }

    #[test]
    fn test_prefix_fallback() {
        let mut tree = tree_with(&[&["The quick brown fox"]]);
        let result = locate(&mut tree, &TextSearchPosition::new("quick silver")).unwrap();
        assert_eq!(result.tier, MatchTier::PartialPrefix);
        assert_eq!(result.start_offset, 4);
        assert_eq!(result.end_offset, 16);
        assert_eq!(result.matched_text, "quick brown ");
    }

    #[test]
    fn test_prefix_end_is_clamped() {
        let mut tree = tree_with(&[&["see quick"]]);
        let result = locate(&mut tree, &TextSearchPosition::new("quick and dirty")).unwrap();
        assert_eq!(result.tier, MatchTier::PartialPrefix);
        assert_eq!(result.end_offset, 9);
        assert_eq!(result.matched_text, "quick");
    }

    #[test]
    fn test_first_non_blank_skips_whitespace_leaves() {
        let mut tree = tree_with(&[&["   ", ""], &["Abc"]]);
        let result = locate(&mut tree, &TextSearchPosition::new("zzz")).unwrap();
        assert_eq!(result.tier, MatchTier::FirstNonBlank);
        assert_eq!(result.start_offset, 3);
        assert_eq!(result.matched_text, "Abc");
        assert_eq!(result.start_container, tree.paragraphs_in_order()[1]);
    }

    #[test]
    fn test_structural_fallback_on_empty_body() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        tree.insert_opaque(OpaqueNode::new("<w:sectPr/>"), root, None).unwrap();
        let result = locate(&mut tree, &TextSearchPosition::new("anything")).unwrap();
        assert_eq!(result.tier, MatchTier::Structural);
        assert!(result.is_collapsed());
        let para = tree.get_paragraph(result.start_container).unwrap();
        assert_eq!(para.parent(), Some(root));
        assert_eq!(tree.child_index(result.start_container), Some(0));
        let run = tree.get_run(result.start.run).unwrap();
        assert_eq!(run.text(), "");
        assert_eq!(run.parent(), Some(result.start_container));
    }

    #[test]
    fn test_structural_fallback_uses_existing_paragraph() {
        let mut tree = tree_with(&[&[" "]]);
        let first = tree.first_paragraph().unwrap();
        let result = locate(&mut tree, &TextSearchPosition::new("x")).unwrap();
        assert_eq!(result.tier, MatchTier::Structural);
        assert_eq!(result.start_container, first);
        assert_eq!(tree.children_of(first)[0], result.start.run);
    }

    #[test]
    fn test_range_with_end_query() {
        let mut tree = tree_with(&[&["alpha beta gamma beta"]]);
        let position = TextSearchPosition::new("beta").ending_at("beta", 2);
        let result = locate(&mut tree, &position).unwrap();
        assert_eq!(result.tier, MatchTier::Exact);
        assert_eq!(result.matched_text, "beta gamma beta");
        assert_eq!(result.end.run_offset, 21);
    }

    #[test]
    fn test_end_query_miss_falls_to_prefix() {
        let mut tree = tree_with(&[&["alpha beta gamma"]]);
        let position = TextSearchPosition::new("alpha beta").ending_at("omega", 1);
        let result = locate(&mut tree, &position).unwrap();
        assert_eq!(result.tier, MatchTier::PartialPrefix);
        assert_eq!(result.matched_text, "alpha beta");
    }

    #[test]
    fn test_inverted_range_is_reported() {
        let mut tree = tree_with(&[&["one two three"]]);
        let position = TextSearchPosition::new("three").ending_at("one", 1);
        let result = locate(&mut tree, &position).unwrap();
        assert!(result.is_inverted());
        assert_eq!(result.tier, MatchTier::Exact);
    }

    #[test]
    fn test_match_spans_paragraphs() {
        let mut tree = tree_with(&[&["first par"], &["agraph end"]]);
        let result = locate(&mut tree, &TextSearchPosition::new("paragraph")).unwrap();
        assert_eq!(result.tier, MatchTier::Exact);
        assert_ne!(result.start_container, result.end_container);
        assert_eq!(result.end.point, LeafPoint::new(0, 6));
    }

    #[test]
    fn test_match_spans_runs() {
        let mut tree = tree_with(&[&["Hel", "lo wor", "ld"]]);
        let result = locate(&mut tree, &TextSearchPosition::new("lo world")).unwrap();
        let runs = tree.runs_in(result.start_container);
        assert_eq!(result.start.run, runs[1]);
        assert_eq!(result.start.point, LeafPoint::new(0, 0));
        assert_eq!(result.end.run, runs[2]);
        assert_eq!(result.end.point, LeafPoint::new(0, 2));
    }

    #[test]
    fn test_position_json_defaults() {
        let position: TextSearchPosition =
            serde_json::from_str(r#"{"searchText":"abc"}"#).unwrap();
        assert_eq!(position, TextSearchPosition::new("abc"));
        let position: TextSearchPosition = serde_json::from_str(
            r#"{"searchText":"a","occurrence":3,"caseSensitive":true,"endSearchText":"b","endOccurrence":2}"#,
        )
        .unwrap();
        assert_eq!(position.occurrence, 3);
        assert!(position.case_sensitive);
        assert_eq!(position.end_search_text.as_deref(), Some("b"));
        assert_eq!(position.end_occurrence, 2);
    }
}
