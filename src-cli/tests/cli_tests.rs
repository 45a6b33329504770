//! Runs the redpen binary against DOCX files on disk

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use store::DocxPackage;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Draft proposal for review.</w:t></w:r></w:p></w:body></w:document>"#;

fn write_input(dir: &Path) -> PathBuf {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", DOCUMENT),
    ] {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    let path = dir.join("draft.docx");
    std::fs::write(&path, zip.finish().unwrap().into_inner()).unwrap();
    path
}

fn redpen() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_redpen"));
    command.env_remove("RUST_LOG");
    command
}

#[test]
fn test_changes_file_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let changes = dir.path().join("changes.json");
    std::fs::write(
        &changes,
        r#"[{"position": {"searchText": "Draft"}, "text": "Final", "type": "Suggestion"},
            {"position": {"searchText": "review"}, "text": "Who reviews?", "type": "Comment"}]"#,
    )
    .unwrap();
    let output = dir.path().join("final.docx");

    let result = redpen()
        .arg(&input)
        .arg("--changes-file")
        .arg(&changes)
        .arg("--output")
        .arg(&output)
        .args(["--author", "Dana", "--date", "2024-09-10T11:12:13Z"])
        .output()
        .unwrap();
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains(r#"#1 suggestion [exact] "Draft" -> rev_1, rev_2"#));
    assert!(stdout.contains(r#"#2 comment [exact] "review" -> 1"#));

    let saved = DocxPackage::open(&output).unwrap();
    assert_eq!(saved.tree().text_content(), "Final proposal for review.");
    assert_eq!(saved.tree().comments.get("1").unwrap().author, "Dana");
}

#[test]
fn test_inline_single_change_overwrites_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let result = redpen()
        .arg(&input)
        .arg("--changes")
        .arg(r#"{"position": {"searchText": "proposal"}, "text": "Expand", "type": "Comment"}"#)
        .output()
        .unwrap();
    assert!(result.status.success());

    let saved = DocxPackage::open(&input).unwrap();
    assert_eq!(saved.tree().comments.get("1").unwrap().author, "Reviewer");
}

#[test]
fn test_bad_change_list_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let before = std::fs::read(&input).unwrap();
    let result = redpen()
        .arg(&input)
        .arg("--changes")
        .arg(r#"[{"position": {"searchText": "Draft"}, "text": "x", "type": "Rename"}]"#)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with("error: invalid change list"));
    assert!(stderr.contains("Change 1"));
    assert_eq!(std::fs::read(&input).unwrap(), before);
}

#[test]
fn test_missing_document_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = redpen()
        .arg(dir.path().join("nope.docx"))
        .args(["--changes", "[]"])
        .output()
        .unwrap();
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Not found"));
}
