//! In-memory package manifest.
//!
//! The serializer produces a [`PackageManifest`]: every part of the package
//! as a `(path, bytes)` pair, in a fixed order, before anything touches disk.

use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use std::collections::BTreeMap;

/// Ordered map of part path to part content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    parts: Vec<(String, Vec<u8>)>,
}

impl PackageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a part. Paths are package-relative without a leading slash.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = path.into();
        if self.contains(&path) {
            return Err(OoxmlError::duplicate("part", path));
        }
        self.parts.push((path, content.into()));
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, content)| content.as_slice())
    }

    /// Part content as UTF-8 text, for XML parts.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.parts.iter().any(|(p, _)| p == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.parts.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Helper for building `[Content_Types].xml` content.
///
/// Manages Default (by extension) and Override (by part name) elements.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    /// Declare the content type of a part.
    ///
    /// Media parts whose extension maps to a well-known image type become a
    /// Default; everything else gets an Override for its exact part name.
    pub fn add(&mut self, part_name: &str, content_type: &str) {
        let ext = part_name.rsplit_once('.').map_or("", |(_, ext)| ext);

        if Self::is_default_content_type(ext, content_type) {
            self.defaults
                .insert(ext.to_ascii_lowercase(), content_type.to_string());
        } else {
            let name = if part_name.starts_with('/') {
                part_name.to_string()
            } else {
                format!("/{part_name}")
            };
            self.overrides.insert(name, content_type.to_string());
        }
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext.to_ascii_lowercase().as_str(), content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("tif", ct::TIFF)
                | ("tiff", ct::TIFF)
                | ("webp", ct::WEBP)
                | ("svg", ct::SVG)
                | ("emf", ct::X_EMF)
                | ("wmf", ct::X_WMF)
        )
    }

    pub fn has_override(&self, part_name: &str) -> bool {
        self.overrides.contains_key(part_name)
    }

    pub fn has_default(&self, ext: &str) -> bool {
        self.defaults.contains_key(ext)
    }

    /// Generate the XML for `[Content_Types].xml`, sorted for stable output.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(2048);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns=""#);
        xml.push_str(namespace::OPC_CONTENT_TYPES);
        xml.push_str(r#"">"#);

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }

        for (part_name, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part_name),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_keeps_order_and_rejects_duplicates() {
        let mut manifest = PackageManifest::new();
        manifest.insert("b.xml", "b").unwrap();
        manifest.insert("a.xml", "a").unwrap();
        assert!(manifest.insert("a.xml", "again").is_err());
        assert_eq!(manifest.paths().collect::<Vec<_>>(), ["b.xml", "a.xml"]);
        assert_eq!(manifest.get_str("a.xml"), Some("a"));
    }

    #[test]
    fn test_content_types_xml() {
        let mut cti = ContentTypes::new();
        cti.add("word/media/image1.png", ct::PNG);
        cti.add("word/document.xml", ct::WML_DOCUMENT_MAIN);

        let xml = cti.to_xml();
        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Override PartName="/word/document.xml""#));
        assert!(!xml.contains("image1.png"));
        assert!(cti.has_override("/word/document.xml"));
    }
}
