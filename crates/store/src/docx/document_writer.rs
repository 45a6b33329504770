//! Document.xml writer
//!
//! Serialises the body of a `DocumentTree` back between the prolog and
//! epilog captured when the part was read.

use crate::docx::document::DocumentShell;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::{escape_xml, write_attributes};
use doc_model::{DocumentTree, GroupKind, MarkerKind, NodeId, NodeType, RevisionMark, RunContent};

/// Timestamp format used for `w:date` attributes
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Writer for document.xml
pub struct DocumentWriter<'a> {
    tree: &'a DocumentTree,
}

impl<'a> DocumentWriter<'a> {
    pub fn new(tree: &'a DocumentTree) -> Self {
        Self { tree }
    }

    /// Generate document.xml content
    pub fn write(&self, shell: &DocumentShell) -> DocxResult<String> {
        let mut xml = String::with_capacity(shell.prolog.len() + shell.epilog.len() + 4096);
        xml.push_str(&shell.prolog);
        for &child in self.tree.children_of(self.tree.root_id()) {
            self.write_node(&mut xml, child)?;
        }
        xml.push_str(&shell.epilog);
        Ok(xml)
    }

    fn write_children(&self, xml: &mut String, id: NodeId) -> DocxResult<()> {
        for &child in self.tree.children_of(id) {
            self.write_node(xml, child)?;
        }
        Ok(())
    }

    fn write_node(&self, xml: &mut String, id: NodeId) -> DocxResult<()> {
        let tree = self.tree;
        let missing = || DocxError::InvalidStructure(format!("dangling node {}", id));
        match tree.node_type(id).ok_or_else(missing)? {
            NodeType::Paragraph => {
                let para = tree.get_paragraph(id).ok_or_else(missing)?;
                xml.push_str("<w:p");
                write_attributes(xml, &para.attributes);
                xml.push('>');
                if let Some(props) = &para.properties_xml {
                    xml.push_str(props);
                }
                self.write_children(xml, id)?;
                xml.push_str("</w:p>");
            }
            NodeType::Table => {
                xml.push_str("<w:tbl>");
                self.write_children(xml, id)?;
                xml.push_str("</w:tbl>");
            }
            NodeType::TableRow => {
                let row = tree.get_table_row(id).ok_or_else(missing)?;
                xml.push_str("<w:tr");
                write_attributes(xml, &row.attributes);
                xml.push('>');
                self.write_children(xml, id)?;
                xml.push_str("</w:tr>");
            }
            NodeType::TableCell => {
                xml.push_str("<w:tc>");
                self.write_children(xml, id)?;
                xml.push_str("</w:tc>");
            }
            NodeType::Run => {
                let run = tree.get_run(id).ok_or_else(missing)?;
                xml.push_str("<w:r");
                write_attributes(xml, &run.attributes);
                xml.push('>');
                xml.push_str(&run.properties.to_xml());
                for leaf in &run.content {
                    write_leaf(xml, leaf);
                }
                xml.push_str("</w:r>");
            }
            NodeType::CommentMarker => {
                let marker = tree.get_marker(id).ok_or_else(missing)?;
                let name = match marker.kind {
                    MarkerKind::RangeStart => "w:commentRangeStart",
                    MarkerKind::RangeEnd => "w:commentRangeEnd",
                };
                xml.push_str(&format!(r#"<{} w:id="{}"/>"#, name, escape_xml(&marker.comment_id)));
            }
            NodeType::InlineGroup => {
                let group = tree.get_group(id).ok_or_else(missing)?;
                let name = match &group.kind {
                    GroupKind::Element(tag) => {
                        xml.push('<');
                        xml.push_str(&tag.name);
                        write_attributes(xml, &tag.attributes);
                        xml.push('>');
                        tag.name.as_str()
                    }
                    GroupKind::Insertion(mark) => {
                        write_revision_start(xml, "w:ins", mark);
                        "w:ins"
                    }
                    GroupKind::Deletion(mark) => {
                        write_revision_start(xml, "w:del", mark);
                        "w:del"
                    }
                };
                self.write_children(xml, id)?;
                xml.push_str("</");
                xml.push_str(name);
                xml.push('>');
            }
            NodeType::Opaque => {
                let node = tree.get_opaque(id).ok_or_else(missing)?;
                xml.push_str(&node.xml);
            }
            NodeType::Document => {
                return Err(DocxError::InvalidStructure("document root nested in body".into()));
            }
        }
        Ok(())
    }
}

fn write_revision_start(xml: &mut String, name: &str, mark: &RevisionMark) {
    xml.push_str(&format!(
        r#"<{} w:id="{}" w:author="{}" w:date="{}">"#,
        name,
        mark.id,
        escape_xml(&mark.author),
        mark.date.format(DATE_FORMAT)
    ));
}

fn write_text(xml: &mut String, name: &str, text: &str) {
    let preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
    xml.push('<');
    xml.push_str(name);
    if preserve {
        xml.push_str(r#" xml:space="preserve""#);
    }
    xml.push('>');
    xml.push_str(&escape_xml(text));
    xml.push_str("</");
    xml.push_str(name);
    xml.push('>');
}

fn write_leaf(xml: &mut String, leaf: &RunContent) {
    match leaf {
        RunContent::Text(text) => write_text(xml, "w:t", text),
        RunContent::DeletedText(text) => write_text(xml, "w:delText", text),
        RunContent::Tab => xml.push_str("<w:tab/>"),
        RunContent::Break(None) => xml.push_str("<w:br/>"),
        RunContent::Break(Some(kind)) => xml.push_str(&format!(r#"<w:br w:type="{}"/>"#, kind)),
        RunContent::CommentReference(id) => {
            xml.push_str(&format!(r#"<w:commentReference w:id="{}"/>"#, escape_xml(id)))
        }
        RunContent::Opaque(raw) => xml.push_str(raw),
    }
}
