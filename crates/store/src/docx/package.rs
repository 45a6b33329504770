//! Public API for opening and saving DOCX packages
//!
//! A package keeps every archive entry as read. On save the main document
//! part is regenerated from the tree, new comments are appended to the
//! comments part, the settings part gets the tracking flag, and everything
//! else is copied byte for byte.

use crate::docx::comments_io::{append_comments, parse_comments};
use crate::docx::content_types::ContentTypes;
use crate::docx::document::{parse_document, DocumentShell};
use crate::docx::document_writer::DocumentWriter;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::{part_as_str, DocxReader, PackageEntry};
use crate::docx::relationships::{rels_path_for, resolve_target, Relationships, TargetMode};
use crate::docx::settings_io::{enable_track_revisions, read_track_revisions};
use crate::docx::writer::DocxWriter;
use crate::docx::{content_type_values, relationship_types};
use doc_model::DocumentTree;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const ROOT_RELS: &str = "_rels/.rels";
const CONTENT_TYPES: &str = "[Content_Types].xml";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// An opened DOCX file
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
    main_part: String,
    shell: DocumentShell,
    /// Relationships of the main part, if it has any
    doc_rels: Option<Relationships>,
    comments_part: Option<String>,
    settings_part: Option<String>,
    tree: DocumentTree,
}

/// Parts regenerated for one save, in write order
#[derive(Debug, Default)]
struct PartUpdates {
    parts: Vec<(String, String)>,
}

impl PartUpdates {
    fn set(&mut self, name: &str, content: String) {
        self.parts.retain(|(n, _)| n != name);
        self.parts.push((name.to_string(), content));
    }

    fn take(&mut self, name: &str) -> Option<String> {
        let index = self.parts.iter().position(|(n, _)| n == name)?;
        Some(self.parts.remove(index).1)
    }
}

/// Package-level parts touched while saving
#[derive(Debug, Default)]
struct PackageEdits {
    doc_rels: Option<Relationships>,
    rels_changed: bool,
    content_types: Option<ContentTypes>,
    types_changed: bool,
}

/// Path of a new part next to `main_part`, plus its target relative to it
fn sibling_part(main_part: &str, file: &str) -> (String, String) {
    match main_part.rsplit_once('/') {
        Some((dir, _)) => (format!("{}/{}", dir, file), file.to_string()),
        None => (file.to_string(), file.to_string()),
    }
}

impl DocxPackage {
    /// Read a DOCX file from disk
    pub fn open(path: impl AsRef<Path>) -> DocxResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocxError::NotFound(path.display().to_string())
            } else {
                DocxError::Io(e)
            }
        })?;
        let package = Self::from_bytes(bytes)?;
        tracing::debug!("Opened {} ({} entries)", path.display(), package.entries.len());
        Ok(package)
    }

    /// Read a DOCX package from memory
    pub fn from_bytes(bytes: Vec<u8>) -> DocxResult<Self> {
        let entries = DocxReader::new(Cursor::new(bytes))?.read_entries()?;
        let find = |name: &str| entries.iter().find(|e| e.name == name && !e.is_dir);

        let main_part = match find(ROOT_RELS) {
            Some(entry) => Relationships::parse(part_as_str(ROOT_RELS, &entry.data)?)?
                .get_by_type(relationship_types::DOCUMENT)
                .map(|rel| resolve_target("", &rel.target))
                .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()),
            None => DEFAULT_MAIN_PART.to_string(),
        };
        let main = find(&main_part).ok_or_else(|| DocxError::NotFound(format!("main document part {}", main_part)))?;
        let (mut tree, shell) = parse_document(part_as_str(&main_part, &main.data)?)?;

        let rels_name = rels_path_for(&main_part);
        let doc_rels = match find(&rels_name) {
            Some(entry) => Some(Relationships::parse(part_as_str(&rels_name, &entry.data)?)?),
            None => None,
        };
        let part_of = |rel_type: &str| {
            doc_rels
                .as_ref()
                .and_then(|rels| rels.get_by_type(rel_type))
                .map(|rel| resolve_target(&main_part, &rel.target))
        };
        let comments_part = part_of(relationship_types::COMMENTS);
        let settings_part = part_of(relationship_types::SETTINGS);

        if let Some(entry) = comments_part.as_deref().and_then(find) {
            for record in parse_comments(part_as_str(&entry.name, &entry.data)?)? {
                tree.comments.push(record);
            }
        }
        if let Some(entry) = settings_part.as_deref().and_then(find) {
            tree.settings_mut().track_revisions = read_track_revisions(part_as_str(&entry.name, &entry.data)?)?;
        }

        Ok(Self {
            entries,
            main_part,
            shell,
            doc_rels,
            comments_part,
            settings_part,
            tree,
        })
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    /// Name of the main document part inside the archive
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// Raw bytes of an entry as read
    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    fn entry_str(&self, name: &str) -> DocxResult<Option<&str>> {
        self.entry(name).map(|data| part_as_str(name, data)).transpose()
    }

    /// Serialise the package with the current tree
    pub fn to_bytes(&self) -> DocxResult<Vec<u8>> {
        let mut updates = PartUpdates::default();
        let mut edits = PackageEdits {
            doc_rels: self.doc_rels.clone(),
            ..PackageEdits::default()
        };

        updates.set(&self.main_part, DocumentWriter::new(&self.tree).write(&self.shell)?);

        let added: Vec<_> = self.tree.comments.added().collect();
        if !added.is_empty() {
            let part = self.ensure_part(
                &mut edits,
                self.comments_part.as_deref(),
                "comments.xml",
                relationship_types::COMMENTS,
                content_type_values::COMMENTS,
            )?;
            let xml = append_comments(self.entry_str(&part)?, added)?;
            updates.set(&part, xml);
        }

        if self.tree.settings().track_revisions {
            let part = self.ensure_part(
                &mut edits,
                self.settings_part.as_deref(),
                "settings.xml",
                relationship_types::SETTINGS,
                content_type_values::SETTINGS,
            )?;
            let xml = enable_track_revisions(self.entry_str(&part)?)?;
            updates.set(&part, xml);
        }

        if let (true, Some(rels)) = (edits.rels_changed, &edits.doc_rels) {
            updates.set(&rels_path_for(&self.main_part), rels.to_xml());
        }
        if let (true, Some(types)) = (edits.types_changed, &edits.content_types) {
            updates.set(CONTENT_TYPES, types.to_xml());
        }

        let mut writer = DocxWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            match updates.take(&entry.name) {
                Some(content) => writer.write_file(&entry.name, &content)?,
                None => writer.write_entry(entry)?,
            }
        }
        for (name, content) in &updates.parts {
            writer.write_file(name, content)?;
        }
        Ok(writer.finish()?.into_inner())
    }

    /// Resolve (or register) a part related to the main document
    fn ensure_part(
        &self,
        edits: &mut PackageEdits,
        known: Option<&str>,
        file: &str,
        rel_type: &str,
        content_type: &str,
    ) -> DocxResult<String> {
        let part = match known {
            Some(part) => part.to_string(),
            None => {
                let (part, target) = sibling_part(&self.main_part, file);
                edits
                    .doc_rels
                    .get_or_insert_with(Relationships::new)
                    .add(rel_type, &target, TargetMode::Internal);
                edits.rels_changed = true;
                part
            }
        };

        if edits.content_types.is_none() {
            let types = match self.entry_str(CONTENT_TYPES)? {
                Some(xml) => ContentTypes::parse(xml)?,
                None => {
                    let mut types = ContentTypes::new();
                    types.add_override(&self.main_part, content_type_values::DOCUMENT);
                    edits.types_changed = true;
                    types
                }
            };
            edits.content_types = Some(types);
        }
        if let Some(types) = edits.content_types.as_mut() {
            if !types.has_override(&part) {
                types.add_override(&part, content_type);
                edits.types_changed = true;
            }
        }
        Ok(part)
    }

    /// Write the package to `path` atomically.
    ///
    /// The archive goes to a temporary file in the destination directory
    /// and replaces the target only once it is complete.
    pub fn save(&self, path: impl AsRef<Path>) -> DocxResult<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path)?;
        tracing::debug!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}
