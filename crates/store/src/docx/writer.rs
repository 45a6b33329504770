//! DOCX Writer Infrastructure
//!
//! Writes archive entries into a ZIP container.

use crate::docx::error::DocxResult;
use crate::docx::reader::PackageEntry;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Main DOCX writer
pub struct DocxWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> DocxWriter<W> {
    /// Create a new DOCX writer
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    /// Copy an entry; stored entries stay stored, everything else is deflated
    pub fn write_entry(&mut self, entry: &PackageEntry) -> DocxResult<()> {
        let method = match entry.compression {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let options = SimpleFileOptions::default().compression_method(method);
        if entry.is_dir {
            self.zip.add_directory(entry.name.as_str(), options)?;
            return Ok(());
        }
        self.zip.start_file(entry.name.as_str(), options)?;
        self.zip.write_all(&entry.data)?;
        Ok(())
    }

    /// Write a new XML part
    pub fn write_file(&mut self, path: &str, content: &str) -> DocxResult<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        self.zip.start_file(path, options)?;
        self.zip.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Finish the ZIP archive and hand back the sink
    pub fn finish(self) -> DocxResult<W> {
        Ok(self.zip.finish()?)
    }
}
