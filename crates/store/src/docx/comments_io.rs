//! Comments part (word/comments.xml) reading and appending

use crate::docx::document_writer::DATE_FORMAT;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::namespaces;
use crate::docx::reader::{escape_xml, XmlParser};
use chrono::{DateTime, Utc};
use doc_model::CommentRecord;
use quick_xml::events::Event;

// =============================================================================
// Comments Parser
// =============================================================================

/// Parse every `w:comment` into a loaded record.
///
/// The body is the comment's visible text, one line per paragraph.
pub fn parse_comments(content: &str) -> DocxResult<Vec<CommentRecord>> {
    let mut reader = XmlParser::from_string(content);
    let mut comments = Vec::new();
    let mut current: Option<(CommentRecord, Vec<String>)> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let name_ref = name.as_ref();
                if XmlParser::matches_element(name_ref, "comment") {
                    current = Some((comment_record(e), Vec::new()));
                } else if XmlParser::matches_element(name_ref, "p") {
                    if let Some((_, paragraphs)) = current.as_mut() {
                        paragraphs.push(String::new());
                    }
                } else if XmlParser::matches_element(name_ref, "t") {
                    in_text = true;
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                if XmlParser::matches_element(name.as_ref(), "comment") {
                    comments.push(comment_record(e));
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                if let Some((_, paragraphs)) = current.as_mut() {
                    let text = e.unescape().map_err(|e| DocxError::XmlParse(e.to_string()))?;
                    match paragraphs.last_mut() {
                        Some(last) => last.push_str(&text),
                        None => paragraphs.push(text.into_owned()),
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let name_ref = name.as_ref();
                if XmlParser::matches_element(name_ref, "t") {
                    in_text = false;
                } else if XmlParser::matches_element(name_ref, "comment") {
                    if let Some((mut record, paragraphs)) = current.take() {
                        record.body = paragraphs.join("\n");
                        comments.push(record);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocxError::from(e)),
            _ => {}
        }
    }

    Ok(comments)
}

fn comment_record(e: &quick_xml::events::BytesStart) -> CommentRecord {
    let id = XmlParser::get_w_attribute(e, "id").unwrap_or_default();
    let author = XmlParser::get_unescaped_attribute(e, b"w:author").unwrap_or_default();
    let date = XmlParser::get_w_attribute(e, "date").and_then(|d| parse_date(&d));
    let initials = XmlParser::get_unescaped_attribute(e, b"w:initials");
    CommentRecord::new(id, author, date, String::new())
        .with_initials(initials)
        .loaded()
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

// =============================================================================
// Comments Writer
// =============================================================================

/// Render one record as a `w:comment` element
pub fn write_comment(xml: &mut String, comment: &CommentRecord) {
    xml.push_str(&format!(
        r#"<w:comment w:id="{}" w:author="{}""#,
        escape_xml(&comment.id),
        escape_xml(&comment.author)
    ));
    if let Some(date) = &comment.date {
        xml.push_str(&format!(r#" w:date="{}""#, date.format(DATE_FORMAT)));
    }
    if let Some(initials) = &comment.initials {
        xml.push_str(&format!(r#" w:initials="{}""#, escape_xml(initials)));
    }
    xml.push('>');

    for (index, line) in comment.body.split('\n').enumerate() {
        xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="CommentText"/></w:pPr>"#);
        if index == 0 {
            xml.push_str(r#"<w:r><w:rPr><w:rStyle w:val="CommentReference"/></w:rPr><w:annotationRef/></w:r>"#);
        }
        if !line.is_empty() {
            xml.push_str(&format!(
                r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
                escape_xml(line)
            ));
        }
        xml.push_str("</w:p>");
    }

    xml.push_str("</w:comment>");
}

/// Append records to an existing comments part, or create one.
///
/// The existing part is kept byte for byte; the new elements go right before
/// the root's end tag.
pub fn append_comments<'a>(
    existing: Option<&str>,
    added: impl IntoIterator<Item = &'a CommentRecord>,
) -> DocxResult<String> {
    let mut fragment = String::new();
    for comment in added {
        write_comment(&mut fragment, comment);
    }

    let Some(existing) = existing else {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<w:comments xmlns:w="{}">"#, namespaces::W));
        xml.push_str(&fragment);
        xml.push_str("</w:comments>");
        return Ok(xml);
    };

    let mut reader = XmlParser::from_string(existing);
    let mut depth = 0usize;
    loop {
        let before = XmlParser::position(&reader);
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(format!("{}{}{}", &existing[..before], fragment, &existing[before..]));
                }
            }
            Event::Empty(ref e) if depth == 0 => {
                let after = XmlParser::position(&reader);
                let name = XmlParser::name(e);
                let tag = existing[before..after].trim_end_matches("/>").trim_end();
                return Ok(format!(
                    "{}{}>{}</{}>{}",
                    &existing[..before],
                    tag,
                    fragment,
                    name,
                    &existing[after..]
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Err(DocxError::InvalidStructure("comments part has no root element".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use doc_model::CommentOrigin;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:comments xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
    <w:comment w:id="0" w:author="Test &amp; Co" w:date="2024-01-15T10:30:00Z" w:initials="TC">
        <w:p><w:r><w:annotationRef/></w:r><w:r><w:t>This is </w:t></w:r><w:r><w:t>a comment</w:t></w:r></w:p>
        <w:p><w:r><w:t>Second line</w:t></w:r></w:p>
    </w:comment>
    <w:comment w:id="3" w:author="Other"><w:p/></w:comment>
</w:comments>"#;

    #[test]
    fn test_parse_comments() {
        let comments = parse_comments(SAMPLE).unwrap();
        assert_eq!(comments.len(), 2);
        let first = &comments[0];
        assert_eq!(first.id, "0");
        assert_eq!(first.author, "Test & Co");
        assert_eq!(first.initials.as_deref(), Some("TC"));
        assert_eq!(first.body, "This is a comment\nSecond line");
        assert_eq!(first.date, Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()));
        assert_eq!(first.origin, CommentOrigin::Loaded);
        assert_eq!(comments[1].id, "3");
        assert_eq!(comments[1].body, "");
    }

    #[test]
    fn test_append_keeps_existing_part() {
        let date = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        let record = CommentRecord::new("4", "Rev <1>", Some(date), "Fix this");
        let xml = append_comments(Some(SAMPLE), [&record]).unwrap();

        let end = SAMPLE.rfind("</w:comments>").unwrap();
        assert!(xml.starts_with(&SAMPLE[..end]));
        assert!(xml.ends_with("</w:comment></w:comments>"));
        assert!(xml.contains(r#"<w:comment w:id="4" w:author="Rev &lt;1&gt;" w:date="2024-02-03T04:05:06Z">"#));

        let parsed = parse_comments(&xml).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].author, "Rev <1>");
        assert_eq!(parsed[2].body, "Fix this");
    }

    #[test]
    fn test_append_to_empty_root() {
        let existing = r#"<?xml version="1.0"?><w:comments xmlns:w="x"/>"#;
        let record = CommentRecord::new("1", "A", None, "two\nlines");
        let xml = append_comments(Some(existing), [&record]).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0"?><w:comments xmlns:w="x"><w:comment w:id="1""#));
        assert!(xml.ends_with("</w:comments>"));
        assert_eq!(parse_comments(&xml).unwrap()[0].body, "two\nlines");
    }

    #[test]
    fn test_create_part() {
        let record = CommentRecord::new("1", "A", None, "body");
        let xml = append_comments(None, [&record]).unwrap();
        assert!(xml.contains(namespaces::W));
        assert_eq!(parse_comments(&xml).unwrap()[0].body, "body");
    }
}
