//! Package writer for OPC packages.
//!
//! Archives a [`PackageManifest`] into a zip container. The archive is built
//! in memory first, so a failure never leaves a partially written file.

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::part_name;
use crate::ooxml::opc::manifest::PackageManifest;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Package writer that serializes a manifest to a ZIP archive.
///
/// # Example
///
/// ```no_run
/// use quince::ooxml::docx::Document;
/// use quince::ooxml::opc::PackageWriter;
///
/// let mut doc = Document::new();
/// doc.add_paragraph("Hello");
/// PackageWriter::write("output.docx", &doc.to_package()?)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PackageWriter;

impl PackageWriter {
    /// Write a package to a file.
    pub fn write<P: AsRef<Path>>(path: P, manifest: &PackageManifest) -> Result<()> {
        let bytes = Self::to_bytes(manifest)?;
        std::fs::write(path.as_ref(), bytes)?;
        log::debug!(
            "wrote package with {} parts to {}",
            manifest.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Write a package to a stream.
    pub fn write_to_stream<W: Write>(mut writer: W, manifest: &PackageManifest) -> Result<()> {
        let bytes = Self::to_bytes(manifest)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Serialize a package to bytes with deflate compression.
    ///
    /// `[Content_Types].xml` is always the first entry of the archive.
    pub fn to_bytes(manifest: &PackageManifest) -> Result<Vec<u8>> {
        Self::to_bytes_with(manifest, true)
    }

    /// Serialize a package to bytes, storing entries uncompressed when
    /// `compress` is false.
    pub fn to_bytes_with(manifest: &PackageManifest, compress: bool) -> Result<Vec<u8>> {
        let method = if compress {
            zip::CompressionMethod::Deflated
        } else {
            zip::CompressionMethod::Stored
        };
        let mut zip_writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(method);

        if let Some(content_types) = manifest.get(part_name::CONTENT_TYPES) {
            zip_writer.start_file(part_name::CONTENT_TYPES, options)?;
            zip_writer.write_all(content_types)?;
        }

        for (path, content) in manifest.iter() {
            if path == part_name::CONTENT_TYPES {
                continue;
            }
            zip_writer.start_file(path, options)?;
            zip_writer.write_all(content)?;
        }

        let cursor = zip_writer.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_content_types_written_first() {
        let mut manifest = PackageManifest::new();
        manifest.insert("word/document.xml", "<w:document/>").unwrap();
        manifest.insert(part_name::CONTENT_TYPES, "<Types/>").unwrap();

        let bytes = PackageWriter::to_bytes(&manifest).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), part_name::CONTENT_TYPES);

        let mut body = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<w:document/>");
    }

    #[test]
    fn test_stored_entries() {
        let mut manifest = PackageManifest::new();
        manifest.insert(part_name::CONTENT_TYPES, "<Types/>").unwrap();

        let bytes = PackageWriter::to_bytes_with(&manifest, false).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            archive.by_index(0).unwrap().compression(),
            zip::CompressionMethod::Stored
        );
    }

    #[test]
    fn test_write_to_file() {
        let mut manifest = PackageManifest::new();
        manifest.insert(part_name::CONTENT_TYPES, "<Types/>").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        PackageWriter::write(&path, &manifest).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
