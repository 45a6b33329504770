//! ZIP archive reading and XML parsing utilities

use crate::docx::error::{DocxError, DocxResult};
use quick_xml::events::BytesStart;
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::{CompressionMethod, ZipArchive};

/// One archive entry, kept verbatim
#[derive(Debug, Clone)]
pub struct PackageEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub compression: CompressionMethod,
    pub is_dir: bool,
}

/// A wrapper around a ZIP archive for reading DOCX files
pub struct DocxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> DocxReader<R> {
    /// Create a new DOCX reader from a source that implements Read + Seek
    pub fn new(reader: R) -> DocxResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Read every entry in archive order
    pub fn read_entries(&mut self) -> DocxResult<Vec<PackageEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }
        Ok(entries)
    }

    /// Check if a file exists in the archive
    pub fn file_exists(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }
}

/// Decode an XML part, rejecting invalid UTF-8
pub fn part_as_str<'a>(name: &str, data: &'a [u8]) -> DocxResult<&'a str> {
    let text = std::str::from_utf8(data)
        .map_err(|e| DocxError::InvalidStructure(format!("{} is not UTF-8: {}", name, e)))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// XML reader utilities for parsing DOCX XML content
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML reader from a string.
    ///
    /// Text is not trimmed: whitespace inside `w:t` is content.
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        Reader::from_str(content)
    }

    /// Current byte offset of a reader over a string
    pub fn position(reader: &Reader<&[u8]>) -> usize {
        reader.buffer_position() as usize
    }

    /// Get an attribute value from an event, still escaped
    pub fn get_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Get an attribute value with entities resolved
    pub fn get_unescaped_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Get a w: namespaced attribute (most common in DOCX)
    pub fn get_w_attribute(event: &BytesStart, name: &str) -> Option<String> {
        let key = format!("w:{}", name);
        Self::get_attribute(event, key.as_bytes())
            .or_else(|| Self::get_attribute(event, name.as_bytes()))
    }

    /// All attributes as raw `(name, value)` pairs, in document order
    pub fn attributes(event: &BytesStart) -> Vec<(String, String)> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .map(|a| {
                (
                    String::from_utf8_lossy(a.key.as_ref()).to_string(),
                    String::from_utf8_lossy(&a.value).to_string(),
                )
            })
            .collect()
    }

    /// Qualified element name
    pub fn name(event: &BytesStart) -> String {
        String::from_utf8_lossy(event.name().as_ref()).to_string()
    }

    /// Parse a boolean value (0/1, true/false, on/off)
    pub fn parse_bool(value: &str) -> bool {
        matches!(value.to_lowercase().as_str(), "1" | "true" | "on" | "yes")
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        name_str == expected || name_str.ends_with(&format!(":{}", expected))
    }
}

/// Escape text for element content and attribute values
pub fn escape_xml(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// Render `(name, value)` pairs as ` name="value"`; values are written as given
pub fn write_attributes(xml: &mut String, attributes: &[(String, String)]) {
    for (key, value) in attributes {
        xml.push(' ');
        xml.push_str(key);
        xml.push_str("=\"");
        xml.push_str(value);
        xml.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    #[test]
    fn test_parse_bool() {
        assert!(XmlParser::parse_bool("1"));
        assert!(XmlParser::parse_bool("true"));
        assert!(XmlParser::parse_bool("on"));
        assert!(!XmlParser::parse_bool("0"));
        assert!(!XmlParser::parse_bool("false"));
    }

    #[test]
    fn test_matches_element() {
        assert!(XmlParser::matches_element(b"p", "p"));
        assert!(XmlParser::matches_element(b"w:p", "p"));
        assert!(!XmlParser::matches_element(b"w:r", "p"));
    }

    #[test]
    fn test_attributes_keep_order_and_escaping() {
        let mut reader = XmlParser::from_string(r#"<w:c w:id="2" w:author="A &amp; B"/>"#);
        let Ok(Event::Empty(e)) = reader.read_event() else {
            panic!("expected an empty element");
        };
        assert_eq!(
            XmlParser::attributes(&e),
            vec![
                ("w:id".to_string(), "2".to_string()),
                ("w:author".to_string(), "A &amp; B".to_string()),
            ]
        );
        assert_eq!(XmlParser::get_unescaped_attribute(&e, b"w:author").as_deref(), Some("A & B"));
        assert_eq!(XmlParser::get_w_attribute(&e, "id").as_deref(), Some("2"));
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let mut reader = XmlParser::from_string("<w:t>  two  </w:t>");
        let _ = reader.read_event();
        let Ok(Event::Text(text)) = reader.read_event() else {
            panic!("expected text");
        };
        assert_eq!(text.unescape().unwrap(), "  two  ");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
