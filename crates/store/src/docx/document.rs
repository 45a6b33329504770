//! Document.xml parser
//!
//! Builds a `DocumentTree` from the body of the main document part. Only the
//! structure the editor works on is modelled; every other element is kept as
//! raw XML at its position, and everything outside `w:body` is carried in a
//! [`DocumentShell`] so the part can be written back unchanged.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use doc_model::{
    CommentMarker, DocumentTree, ElementTag, GroupKind, InlineGroup, NodeId, OpaqueNode, Paragraph,
    PropertyElement, Run, RunContent, RunProperties, Table, TableCell, TableRow,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Inline wrappers whose runs stay part of the searchable text
const INLINE_WRAPPERS: &[&[u8]] = &[
    b"hyperlink",
    b"ins",
    b"del",
    b"moveFrom",
    b"moveTo",
    b"smartTag",
    b"customXml",
    b"fldSimple",
    b"dir",
    b"bdo",
];

/// Raw text of the main part before and after the body content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentShell {
    /// Everything up to and including the `w:body` start tag
    pub prolog: String,
    /// Everything from the `w:body` end tag on
    pub epilog: String,
}

/// Parse the main document part
pub fn parse_document(xml: &str) -> DocxResult<(DocumentTree, DocumentShell)> {
    let mut parser = BodyParser {
        xml,
        reader: XmlParser::from_string(xml),
        tree: DocumentTree::new(),
    };
    let shell = parser.parse()?;
    tracing::debug!(
        "Parsed document body: {} paragraphs, {} runs",
        parser.tree.nodes.paragraphs.len(),
        parser.tree.nodes.runs.len()
    );
    Ok((parser.tree, shell))
}

enum Item<'a> {
    Start(BytesStart<'a>, usize),
    Empty(BytesStart<'a>, usize),
    End(usize),
    Text(String),
    Eof,
}

struct BodyParser<'a> {
    xml: &'a str,
    reader: Reader<&'a [u8]>,
    tree: DocumentTree,
}

fn local(e: &BytesStart) -> Vec<u8> {
    e.local_name().as_ref().to_vec()
}

fn unexpected_eof() -> DocxError {
    DocxError::XmlParse("unexpected end of document part".into())
}

impl<'a> BodyParser<'a> {
    fn parse(&mut self) -> DocxResult<DocumentShell> {
        loop {
            let before = XmlParser::position(&self.reader);
            match self.reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"body" => {
                    let prolog = self.raw(0, XmlParser::position(&self.reader))?;
                    let root = self.tree.root_id();
                    let end = self.block_children(root)?;
                    let epilog = self.raw(end, self.xml.len())?;
                    return Ok(DocumentShell { prolog, epilog });
                }
                Event::Empty(e) if e.local_name().as_ref() == b"body" => {
                    let after = XmlParser::position(&self.reader);
                    let name = XmlParser::name(&e);
                    return Ok(DocumentShell {
                        prolog: format!("{}<{}>", self.raw(0, before)?, name),
                        epilog: format!("</{}>{}", name, self.raw(after, self.xml.len())?),
                    });
                }
                Event::Eof => return Err(DocxError::NotFound("w:body in main document part".into())),
                _ => {}
            }
        }
    }

    fn next(&mut self) -> DocxResult<Item<'a>> {
        loop {
            let before = XmlParser::position(&self.reader);
            match self.reader.read_event()? {
                Event::Start(e) => return Ok(Item::Start(e, before)),
                Event::Empty(e) => return Ok(Item::Empty(e, before)),
                Event::End(_) => return Ok(Item::End(before)),
                Event::Text(t) => return Ok(Item::Text(t.unescape()?.into_owned())),
                Event::CData(c) => {
                    return Ok(Item::Text(String::from_utf8_lossy(&c.into_inner()).into_owned()))
                }
                Event::Eof => return Ok(Item::Eof),
                _ => {}
            }
        }
    }

    fn raw(&self, from: usize, to: usize) -> DocxResult<String> {
        self.xml
            .get(from..to)
            .map(str::to_string)
            .ok_or_else(|| DocxError::XmlParse(format!("invalid span {}..{}", from, to)))
    }

    /// Raw text of an element whose start tag was just read
    fn capture(&mut self, start: &BytesStart<'a>, before: usize) -> DocxResult<String> {
        let end = start.to_end().into_owned();
        self.reader.read_to_end(end.name())?;
        self.raw(before, XmlParser::position(&self.reader))
    }

    /// Raw text of an empty element that was just read
    fn capture_empty(&self, before: usize) -> DocxResult<String> {
        self.raw(before, XmlParser::position(&self.reader))
    }

    fn opaque(&mut self, xml: String, parent: NodeId) -> DocxResult<()> {
        self.tree.insert_opaque(OpaqueNode::new(xml), parent, None)?;
        Ok(())
    }

    // =========================================================================
    // Block level
    // =========================================================================

    /// Paragraphs and tables of a body or cell; returns the offset of the
    /// container's end tag
    fn block_children(&mut self, parent: NodeId) -> DocxResult<usize> {
        loop {
            match self.next()? {
                Item::Start(e, before) => match local(&e).as_slice() {
                    b"p" => self.paragraph(&e, parent, false)?,
                    b"tbl" => self.table(parent)?,
                    _ => {
                        let xml = self.capture(&e, before)?;
                        self.opaque(xml, parent)?;
                    }
                },
                Item::Empty(e, before) => match local(&e).as_slice() {
                    b"p" => self.paragraph(&e, parent, true)?,
                    _ => {
                        let xml = self.capture_empty(before)?;
                        self.opaque(xml, parent)?;
                    }
                },
                Item::End(before) => return Ok(before),
                Item::Text(_) => {}
                Item::Eof => return Err(unexpected_eof()),
            }
        }
    }

    fn table(&mut self, parent: NodeId) -> DocxResult<()> {
        let table = self.tree.insert_table(Table::new(), parent, None)?;
        loop {
            match self.next()? {
                Item::Start(e, before) => match local(&e).as_slice() {
                    b"tr" => self.row(&e, table)?,
                    _ => {
                        let xml = self.capture(&e, before)?;
                        self.opaque(xml, table)?;
                    }
                },
                Item::Empty(_, before) => {
                    let xml = self.capture_empty(before)?;
                    self.opaque(xml, table)?;
                }
                Item::End(_) => return Ok(()),
                Item::Text(_) => {}
                Item::Eof => return Err(unexpected_eof()),
            }
        }
    }

    fn row(&mut self, start: &BytesStart<'a>, table: NodeId) -> DocxResult<()> {
        let mut row = TableRow::new();
        row.attributes = XmlParser::attributes(start);
        let row = self.tree.insert_table_row(row, table, None)?;
        loop {
            match self.next()? {
                Item::Start(e, before) => match local(&e).as_slice() {
                    b"tc" => {
                        let cell = self.tree.insert_table_cell(TableCell::new(), row, None)?;
                        self.block_children(cell)?;
                    }
                    _ => {
                        let xml = self.capture(&e, before)?;
                        self.opaque(xml, row)?;
                    }
                },
                Item::Empty(e, before) => match local(&e).as_slice() {
                    b"tc" => {
                        self.tree.insert_table_cell(TableCell::new(), row, None)?;
                    }
                    _ => {
                        let xml = self.capture_empty(before)?;
                        self.opaque(xml, row)?;
                    }
                },
                Item::End(_) => return Ok(()),
                Item::Text(_) => {}
                Item::Eof => return Err(unexpected_eof()),
            }
        }
    }

    // =========================================================================
    // Inline level
    // =========================================================================

    fn paragraph(&mut self, start: &BytesStart<'a>, parent: NodeId, empty: bool) -> DocxResult<()> {
        let mut para = Paragraph::new();
        para.attributes = XmlParser::attributes(start);
        let para = self.tree.insert_paragraph(para, parent, None)?;
        if !empty {
            self.inline_children(para)?;
        }
        Ok(())
    }

    fn inline_children(&mut self, container: NodeId) -> DocxResult<()> {
        loop {
            match self.next()? {
                Item::Start(e, before) => {
                    let name = local(&e);
                    if name == b"pPr" {
                        let xml = self.capture(&e, before)?;
                        match self.tree.get_paragraph_mut(container) {
                            Some(para) => para.properties_xml = Some(xml),
                            None => self.opaque(xml, container)?,
                        }
                    } else if name == b"r" {
                        let run = self.run(&e, false)?;
                        self.tree.insert_run(run, container, None)?;
                    } else if INLINE_WRAPPERS.contains(&name.as_slice()) {
                        let group = self.group(&e, container)?;
                        self.inline_children(group)?;
                    } else {
                        let xml = self.capture(&e, before)?;
                        self.opaque(xml, container)?;
                    }
                }
                Item::Empty(e, before) => {
                    let name = local(&e);
                    let marker_id = XmlParser::get_w_attribute(&e, "id");
                    match (name.as_slice(), marker_id) {
                        (b"commentRangeStart", Some(id)) => {
                            self.tree.insert_marker(CommentMarker::range_start(id), container, None)?;
                        }
                        (b"commentRangeEnd", Some(id)) => {
                            self.tree.insert_marker(CommentMarker::range_end(id), container, None)?;
                        }
                        (b"r", _) => {
                            let run = self.run(&e, true)?;
                            self.tree.insert_run(run, container, None)?;
                        }
                        (wrapper, _) if INLINE_WRAPPERS.contains(&wrapper) => {
                            self.group(&e, container)?;
                        }
                        _ => {
                            let xml = self.capture_empty(before)?;
                            self.opaque(xml, container)?;
                        }
                    }
                }
                Item::End(_) => return Ok(()),
                Item::Text(_) => {}
                Item::Eof => return Err(unexpected_eof()),
            }
        }
    }

    fn group(&mut self, start: &BytesStart<'a>, parent: NodeId) -> DocxResult<NodeId> {
        let tag = ElementTag {
            name: XmlParser::name(start),
            attributes: XmlParser::attributes(start),
        };
        Ok(self.tree.insert_group(InlineGroup::new(GroupKind::Element(tag)), parent, None)?)
    }

    fn run(&mut self, start: &BytesStart<'a>, empty: bool) -> DocxResult<Run> {
        let mut run = Run::new();
        run.attributes = XmlParser::attributes(start);
        if empty {
            return Ok(run);
        }
        loop {
            match self.next()? {
                Item::Start(e, before) => match local(&e).as_slice() {
                    b"rPr" => run.properties = self.run_properties()?,
                    b"t" => {
                        let text = self.text()?;
                        run.content.push(RunContent::Text(text));
                    }
                    b"delText" => {
                        let text = self.text()?;
                        run.content.push(RunContent::DeletedText(text));
                    }
                    _ => {
                        let xml = self.capture(&e, before)?;
                        run.content.push(RunContent::Opaque(xml));
                    }
                },
                Item::Empty(e, before) => {
                    let leaf = self.empty_leaf(&e, before)?;
                    if let Some(leaf) = leaf {
                        run.content.push(leaf);
                    }
                }
                Item::End(_) => return Ok(run),
                Item::Text(_) => {}
                Item::Eof => return Err(unexpected_eof()),
            }
        }
    }

    /// Leaf for an empty element inside a run; `None` for an empty `w:rPr`
    fn empty_leaf(&mut self, e: &BytesStart<'a>, before: usize) -> DocxResult<Option<RunContent>> {
        let attributes = XmlParser::attributes(e);
        let leaf = match local(e).as_slice() {
            b"rPr" => return Ok(None),
            b"t" => RunContent::Text(String::new()),
            b"delText" => RunContent::DeletedText(String::new()),
            b"tab" if attributes.is_empty() => RunContent::Tab,
            b"br" if attributes.iter().all(|(k, _)| k == "w:type") => {
                RunContent::Break(XmlParser::get_w_attribute(e, "type"))
            }
            b"commentReference" if attributes.len() == 1 => match XmlParser::get_w_attribute(e, "id") {
                Some(id) => RunContent::CommentReference(id),
                None => RunContent::Opaque(self.capture_empty(before)?),
            },
            _ => RunContent::Opaque(self.capture_empty(before)?),
        };
        Ok(Some(leaf))
    }

    /// Character data up to the current element's end tag
    fn text(&mut self) -> DocxResult<String> {
        let mut text = String::new();
        loop {
            match self.next()? {
                Item::Text(t) => text.push_str(&t),
                Item::End(_) => return Ok(text),
                Item::Start(e, before) => {
                    self.capture(&e, before)?;
                }
                Item::Empty(..) => {}
                Item::Eof => return Err(unexpected_eof()),
            }
        }
    }

    fn run_properties(&mut self) -> DocxResult<RunProperties> {
        let mut elements = Vec::new();
        loop {
            match self.next()? {
                Item::Start(e, before) => {
                    let name = String::from_utf8_lossy(&local(&e)).to_string();
                    let xml = self.capture(&e, before)?;
                    elements.push(PropertyElement::new(name, xml));
                }
                Item::Empty(e, before) => {
                    let name = String::from_utf8_lossy(&local(&e)).to_string();
                    elements.push(PropertyElement::new(name, self.capture_empty(before)?));
                }
                Item::End(_) => return Ok(RunProperties::from_elements(elements)),
                Item::Text(_) => {}
                Item::Eof => return Err(unexpected_eof()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{MarkerKind, NodeType};

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    #[test]
    fn test_paragraphs_and_runs() {
        let xml = wrap(
            r#"<w:p w:rsidR="00A1"><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="28"/></w:rPr><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>"#,
        );
        let (tree, shell) = parse_document(&xml).unwrap();
        assert!(shell.prolog.ends_with("<w:body>"));
        assert_eq!(shell.epilog, "</w:body></w:document>");
        assert_eq!(tree.text_content(), "Hello world");

        let para = tree.get_paragraph(tree.first_paragraph().unwrap()).unwrap();
        assert_eq!(para.properties_xml.as_deref(), Some(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#));
        assert_eq!(para.attributes, vec![("w:rsidR".to_string(), "00A1".to_string())]);

        let first = tree.get_run(tree.runs_in(tree.root_id())[0]).unwrap();
        assert!(first.properties.is_bold());
        assert_eq!(first.properties.get("sz").unwrap().xml, r#"<w:sz w:val="28"/>"#);
    }

    #[test]
    fn test_run_leaves() {
        let xml = wrap(
            r#"<w:p><w:r><w:t>a&amp;b</w:t><w:tab/><w:br w:type="page"/><w:delText>gone</w:delText><w:commentReference w:id="3"/><w:drawing><wp:inline/></w:drawing></w:r></w:p>"#,
        );
        let (tree, _) = parse_document(&xml).unwrap();
        let run = tree.get_run(tree.runs_in(tree.root_id())[0]).unwrap();
        assert_eq!(
            run.content,
            vec![
                RunContent::Text("a&b".into()),
                RunContent::Tab,
                RunContent::Break(Some("page".into())),
                RunContent::DeletedText("gone".into()),
                RunContent::CommentReference("3".into()),
                RunContent::Opaque("<w:drawing><wp:inline/></w:drawing>".into()),
            ]
        );
    }

    #[test]
    fn test_whitespace_in_text_is_preserved() {
        let xml = wrap(r#"<w:p><w:r><w:t xml:space="preserve">  spaced  </w:t></w:r></w:p>"#);
        let (tree, _) = parse_document(&xml).unwrap();
        assert_eq!(tree.text_content(), "  spaced  ");
    }

    #[test]
    fn test_tables_markers_and_wrappers() {
        let xml = wrap(concat!(
            r#"<w:tbl><w:tblPr><w:tblW w:w="0"/></w:tblPr><w:tblGrid><w:gridCol/></w:tblGrid>"#,
            r#"<w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
            r#"<w:p><w:commentRangeStart w:id="0"/><w:hyperlink r:id="rId9"><w:r><w:t>link</w:t></w:r></w:hyperlink>"#,
            r#"<w:commentRangeEnd w:id="0"/><w:bookmarkStart w:id="1" w:name="b"/></w:p>"#,
            r#"<w:sectPr><w:pgSz w:w="12240"/></w:sectPr>"#,
        ));
        let (tree, _) = parse_document(&xml).unwrap();
        assert_eq!(tree.text_content(), "celllink");

        let body = tree.children_of(tree.root_id());
        assert_eq!(tree.node_type(body[0]), Some(NodeType::Table));
        assert_eq!(tree.node_type(body[2]), Some(NodeType::Opaque));
        let table = tree.children_of(body[0]);
        assert_eq!(tree.get_opaque(table[0]).unwrap().xml, r#"<w:tblPr><w:tblW w:w="0"/></w:tblPr>"#);

        let para = tree.children_of(body[1]);
        assert_eq!(tree.get_marker(para[0]).unwrap().kind, MarkerKind::RangeStart);
        let GroupKind::Element(tag) = &tree.get_group(para[1]).unwrap().kind else {
            panic!("expected a loaded wrapper");
        };
        assert_eq!(tag.name, "w:hyperlink");
        assert_eq!(tag.attribute("r:id"), Some("rId9"));
        assert_eq!(tree.get_marker(para[2]).unwrap().comment_id, "0");
        assert_eq!(tree.get_opaque(para[3]).unwrap().xml, r#"<w:bookmarkStart w:id="1" w:name="b"/>"#);
    }

    #[test]
    fn test_existing_revisions_are_groups() {
        let xml = wrap(
            r#"<w:p><w:ins w:id="7" w:author="X"><w:r><w:t>new</w:t></w:r></w:ins><w:del w:id="8" w:author="X"><w:r><w:delText>old</w:delText></w:r></w:del></w:p>"#,
        );
        let (tree, _) = parse_document(&xml).unwrap();
        let mut ids: Vec<u64> = tree.nodes.groups.values().filter_map(|g| g.revision_id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(tree.text_content(), "new");
    }

    #[test]
    fn test_empty_body() {
        let xml = r#"<w:document xmlns:w="x"><w:body/></w:document>"#;
        let (tree, shell) = parse_document(xml).unwrap();
        assert!(tree.children_of(tree.root_id()).is_empty());
        assert_eq!(shell.prolog, r#"<w:document xmlns:w="x"><w:body>"#);
        assert_eq!(shell.epilog, "</w:body></w:document>");
    }

    #[test]
    fn test_missing_body_is_not_found() {
        let err = parse_document(r#"<w:document xmlns:w="x"/>"#).unwrap_err();
        assert!(matches!(err, DocxError::NotFound(_)));
    }
}
