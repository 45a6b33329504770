//! Run formatting descriptor
//!
//! Formatting is carried as the ordered list of `w:rPr` child elements, each
//! kept verbatim. Nothing is normalised, so a run that is split or copied
//! writes back exactly the formatting it was read with.

use serde::{Deserialize, Serialize};

/// One child element of a run's property block, e.g. `<w:b/>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyElement {
    /// Local element name without namespace prefix (`b`, `rStyle`, `sz`, ...)
    pub name: String,
    /// The element as it appeared in the source
    pub xml: String,
}

impl PropertyElement {
    pub fn new(name: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xml: xml.into(),
        }
    }

    /// Value of an attribute on this element (raw, still escaped)
    pub fn attribute(&self, key: &str) -> Option<&str> {
        attribute_value(&self.xml, key)
    }
}

/// Formatting descriptor of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProperties {
    elements: Vec<PropertyElement>,
}

impl RunProperties {
    /// Create an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a descriptor from elements in source order
    pub fn from_elements(elements: Vec<PropertyElement>) -> Self {
        Self { elements }
    }

    /// Descriptor that only references a character style
    pub fn with_style(style_id: &str) -> Self {
        let mut props = Self::new();
        props.set_style(style_id);
        props
    }

    /// Append an element
    pub fn push(&mut self, element: PropertyElement) {
        self.elements.push(element);
    }

    /// Set (or replace) the character style reference. `rStyle` always
    /// leads the property block.
    pub fn set_style(&mut self, style_id: &str) {
        self.elements.retain(|e| e.name != "rStyle");
        self.elements.insert(
            0,
            PropertyElement::new("rStyle", format!(r#"<w:rStyle w:val="{}"/>"#, style_id)),
        );
    }

    /// Elements in source order
    pub fn elements(&self) -> &[PropertyElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Find an element by local name
    pub fn get(&self, name: &str) -> Option<&PropertyElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Referenced character style, if any
    pub fn style_id(&self) -> Option<&str> {
        self.get("rStyle").and_then(|e| e.attribute("w:val"))
    }

    pub fn is_bold(&self) -> bool {
        self.toggle("b")
    }

    pub fn is_italic(&self) -> bool {
        self.toggle("i")
    }

    /// On/off properties are on when present unless `w:val` switches them off
    fn toggle(&self, name: &str) -> bool {
        match self.get(name) {
            Some(e) => !matches!(e.attribute("w:val"), Some("0") | Some("false") | Some("off")),
            None => false,
        }
    }

    /// Serialise as a `w:rPr` block; empty descriptors produce nothing
    pub fn to_xml(&self) -> String {
        if self.elements.is_empty() {
            return String::new();
        }
        let mut xml = String::from("<w:rPr>");
        for element in &self.elements {
            xml.push_str(&element.xml);
        }
        xml.push_str("</w:rPr>");
        xml
    }
}

/// Extract `key="value"` from a serialised start tag.
pub fn attribute_value<'a>(xml: &'a str, key: &str) -> Option<&'a str> {
    let tag_end = xml.find('>').unwrap_or(xml.len());
    let tag = &xml[..tag_end];
    let mut search_from = 0;
    while let Some(found) = tag[search_from..].find(key) {
        let start = search_from + found;
        let preceded_by_space = tag[..start]
            .chars()
            .last()
            .is_some_and(|c| c.is_whitespace());
        let rest = &tag[start + key.len()..];
        if preceded_by_space {
            if let Some(rest) = rest.strip_prefix("=\"") {
                return rest.find('"').map(|end| &rest[..end]);
            }
            if let Some(rest) = rest.strip_prefix("='") {
                return rest.find('\'').map(|end| &rest[..end]);
            }
        }
        search_from = start + key.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold_italic() -> RunProperties {
        RunProperties::from_elements(vec![
            PropertyElement::new("b", "<w:b/>"),
            PropertyElement::new("i", r#"<w:i w:val="0"/>"#),
            PropertyElement::new("sz", r#"<w:sz w:val="28"/>"#),
        ])
    }

    #[test]
    fn test_toggle_properties() {
        let props = bold_italic();
        assert!(props.is_bold());
        assert!(!props.is_italic());
        assert_eq!(props.get("sz").and_then(|e| e.attribute("w:val")), Some("28"));
    }

    #[test]
    fn test_set_style_leads_block() {
        let mut props = bold_italic();
        props.set_style("Emphasis");
        props.set_style("CommentReference");
        assert_eq!(props.elements()[0].name, "rStyle");
        assert_eq!(props.style_id(), Some("CommentReference"));
        assert_eq!(props.elements().len(), 4);
    }

    #[test]
    fn test_to_xml_keeps_order() {
        let props = bold_italic();
        assert_eq!(
            props.to_xml(),
            r#"<w:rPr><w:b/><w:i w:val="0"/><w:sz w:val="28"/></w:rPr>"#
        );
        assert_eq!(RunProperties::new().to_xml(), "");
    }

    #[test]
    fn test_attribute_value_requires_whole_key() {
        let xml = r#"<w:rFonts w:hAnsi="Arial" w:ascii="Calibri"/>"#;
        assert_eq!(attribute_value(xml, "w:ascii"), Some("Calibri"));
        assert_eq!(attribute_value(xml, "ascii"), None);
        assert_eq!(attribute_value(xml, "w:cs"), None);
    }
}
