//! Settings part (word/settings.xml): the track-revisions flag

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::namespaces;
use crate::docx::reader::XmlParser;
use quick_xml::events::Event;

/// Children of `w:settings` that come before `w:trackRevisions` in the schema
const BEFORE_TRACK_REVISIONS: &[&str] = &[
    "writeProtection",
    "view",
    "zoom",
    "removePersonalInformation",
    "removeDateAndTime",
    "doNotDisplayPageBoundaries",
    "displayBackgroundShape",
    "printPostScriptOverText",
    "printFractionalCharacterWidth",
    "printFormsData",
    "embedTrueTypeFonts",
    "embedSystemFonts",
    "saveSubsetFonts",
    "saveFormsData",
    "mirrorMargins",
    "alignBordersAndEdges",
    "bordersDoNotSurroundHeader",
    "bordersDoNotSurroundFooter",
    "gutterAtTop",
    "hideSpellingErrors",
    "hideGrammaticalErrors",
    "activeWritingStyle",
    "proofState",
    "formsDesign",
    "attachedTemplate",
    "linkStyles",
    "stylePaneFormatFilter",
    "stylePaneSortMethod",
    "documentType",
    "mailMerge",
    "revisionView",
];

const TRACK_REVISIONS: &str = "<w:trackRevisions/>";

/// Whether the settings part turns revision tracking on
pub fn read_track_revisions(content: &str) -> DocxResult<bool> {
    let mut reader = XmlParser::from_string(content);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"trackRevisions" => {
                return Ok(XmlParser::get_w_attribute(e, "val")
                    .map(|v| XmlParser::parse_bool(&v))
                    .unwrap_or(true));
            }
            Event::Eof => return Ok(false),
            _ => {}
        }
    }
}

/// Settings part with tracking switched on.
///
/// An existing part is edited in place: a disabled `w:trackRevisions` is
/// replaced, a missing one is inserted at its schema position. Without an
/// existing part a minimal one is created.
pub fn enable_track_revisions(existing: Option<&str>) -> DocxResult<String> {
    let Some(existing) = existing else {
        return Ok(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="{}">{}</w:settings>"#,
            namespaces::W,
            TRACK_REVISIONS
        ));
    };

    let mut reader = XmlParser::from_string(existing);
    let mut depth = 0usize;
    let splice = |from: usize, to: usize, with: &str| {
        format!("{}{}{}", &existing[..from], with, &existing[to..])
    };

    loop {
        let before = XmlParser::position(&reader);
        match reader.read_event()? {
            Event::Start(e) => {
                let is_candidate = depth == 1;
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if is_candidate && local == "trackRevisions" {
                    if read_track_revisions(&existing[before..])? {
                        return Ok(existing.to_string());
                    }
                    let end = e.to_end().into_owned();
                    reader.read_to_end(end.name())?;
                    return Ok(splice(before, XmlParser::position(&reader), TRACK_REVISIONS));
                }
                if is_candidate && !BEFORE_TRACK_REVISIONS.contains(&local.as_str()) {
                    return Ok(splice(before, before, TRACK_REVISIONS));
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let after = XmlParser::position(&reader);
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if depth == 0 {
                    let tag = existing[before..after].trim_end_matches("/>").trim_end();
                    let name = XmlParser::name(&e);
                    return Ok(splice(before, after, &format!("{}>{}</{}>", tag, TRACK_REVISIONS, name)));
                }
                if depth == 1 && local == "trackRevisions" {
                    let enabled = XmlParser::get_w_attribute(&e, "val")
                        .map(|v| XmlParser::parse_bool(&v))
                        .unwrap_or(true);
                    if enabled {
                        return Ok(existing.to_string());
                    }
                    return Ok(splice(before, after, TRACK_REVISIONS));
                }
                if depth == 1 && !BEFORE_TRACK_REVISIONS.contains(&local.as_str()) {
                    return Ok(splice(before, before, TRACK_REVISIONS));
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(splice(before, before, TRACK_REVISIONS));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Err(DocxError::InvalidStructure("settings part has no root element".into()))
}
