//! Integration tests for opening and saving DOCX packages on disk

use chrono::{TimeZone, Utc};
use doc_model::CommentRecord;
use std::io::Write;
use store::{DocxError, DocxPackage};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/comments.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml"/></Types>"#;
const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
const DOC_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="comments.xml"/></Relationships>"#;
const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:commentRangeStart w:id="0"/><w:r><w:t>Quarterly report</w:t></w:r><w:commentRangeEnd w:id="0"/><w:r><w:commentReference w:id="0"/></w:r></w:p><w:sectPr/></w:body></w:document>"#;
const COMMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:comments xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:comment w:id="0" w:author="Existing"><w:p><w:r><w:t>Earlier note</w:t></w:r></w:p></w:comment></w:comments>"#;

fn sample_docx() -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", DOCUMENT),
        ("word/_rels/document.xml.rels", DOC_RELS),
        ("word/comments.xml", COMMENTS),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("input.docx");
    std::fs::write(&path, sample_docx()).unwrap();
    path
}

#[test]
fn test_open_loads_existing_comments() {
    let dir = tempfile::tempdir().unwrap();
    let package = DocxPackage::open(write_sample(&dir)).unwrap();

    assert_eq!(package.tree().text_content(), "Quarterly report");
    let existing = package.tree().comments.get("0").unwrap();
    assert_eq!(existing.author, "Existing");
    assert_eq!(existing.body, "Earlier note");
    assert_eq!(package.tree().comments.added().count(), 0);
}

#[test]
fn test_save_then_open_keeps_comments() {
    let dir = tempfile::tempdir().unwrap();
    let mut package = DocxPackage::open(write_sample(&dir)).unwrap();
    let date = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    package
        .tree_mut()
        .comments
        .push(CommentRecord::new("1", "Reviewer", Some(date), "Check the figures"));

    let output = dir.path().join("output.docx");
    package.save(&output).unwrap();

    let reopened = DocxPackage::open(&output).unwrap();
    let ids: Vec<&str> = reopened.tree().comments.ids().collect();
    assert_eq!(ids, vec!["0", "1"]);
    assert_eq!(reopened.tree().comments.get("1").unwrap().body, "Check the figures");

    let rels = std::str::from_utf8(reopened.entry("word/_rels/document.xml.rels").unwrap()).unwrap();
    assert_eq!(rels, DOC_RELS);
}

#[test]
fn test_save_overwrites_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir);
    let mut package = DocxPackage::open(&path).unwrap();
    package.tree_mut().settings_mut().track_revisions = true;
    package.save(&path).unwrap();

    let reopened = DocxPackage::open(&path).unwrap();
    assert!(reopened.tree().settings().track_revisions);
    assert_eq!(reopened.tree().text_content(), "Quarterly report");
}

#[test]
fn test_open_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = DocxPackage::open(dir.path().join("absent.docx")).unwrap_err();
    assert!(matches!(err, DocxError::NotFound(_)));
}

#[test]
fn test_open_non_zip_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.docx");
    std::fs::write(&path, b"not a zip archive").unwrap();
    assert!(matches!(DocxPackage::open(&path).unwrap_err(), DocxError::Zip(_)));
}

#[test]
fn test_failed_save_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let package = DocxPackage::open(write_sample(&dir)).unwrap();
    let target = dir.path().join("missing-dir").join("out.docx");

    assert!(package.save(&target).is_err());
    assert!(!target.exists());
    let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(names.len(), 1);
}
