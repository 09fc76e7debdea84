/// Document to package conversion.
///
/// Everything is validated and rendered into a [`PackageManifest`] before a
/// single byte is archived, so a failed save never leaves a partial file.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{
    content_type as ct, namespace as ns, part_name, relationship_type as rt,
};
use crate::ooxml::opc::{ContentTypes, PackageManifest, PackageWriter, Relationships};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;
use std::io::Write;
use std::path::Path;

use super::comment::{comments_extended_xml, comments_xml};
use super::doc::{BodyElement, Document};
use super::note::{NoteKind, notes_xml};
use super::properties::{AppStatistics, font_table_xml};
use super::relmap::{RelationshipMapper, RenderContext};
use super::run::RunContent;

/// Options for writing a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Application name recorded in `docProps/app.xml`
    pub application: String,
    /// Deflate the archive entries; `false` stores them
    pub compress: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            application: "quince".to_string(),
            compress: true,
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl Document {
    /// Render the document into its package parts with default options.
    pub fn to_package(&self) -> Result<PackageManifest> {
        self.to_package_with(&WriterOptions::default())
    }

    /// Render the document into its package parts.
    ///
    /// # Errors
    ///
    /// `StyleCycle` when a style's `based_on` chain loops, `NotFound` when a
    /// drawing refers to an image that is not stored in the document.
    pub fn to_package_with(&self, options: &WriterOptions) -> Result<PackageManifest> {
        self.validate()?;

        let mapper = RelationshipMapper::build(self)?;
        let has_comments = !self.comments.is_empty();
        let has_footnotes = !self.footnotes.is_empty();
        let has_endnotes = !self.endnotes.is_empty();

        let mut types = ContentTypes::new();
        types.add(part_name::CORE_PROPERTIES, ct::OPC_CORE_PROPERTIES);
        types.add(part_name::EXTENDED_PROPERTIES, ct::OFC_EXTENDED_PROPERTIES);
        types.add(part_name::DOCUMENT, ct::WML_DOCUMENT_MAIN);
        types.add(part_name::STYLES, ct::WML_STYLES);
        types.add(part_name::SETTINGS, ct::WML_SETTINGS);
        types.add(part_name::FONT_TABLE, ct::WML_FONT_TABLE);
        if has_comments {
            types.add(part_name::COMMENTS, ct::WML_COMMENTS);
            types.add(part_name::COMMENTS_EXTENDED, ct::WML_COMMENTS_EXTENDED);
        }
        if has_footnotes {
            types.add(part_name::FOOTNOTES, ct::WML_FOOTNOTES);
        }
        if has_endnotes {
            types.add(part_name::ENDNOTES, ct::WML_ENDNOTES);
        }
        for image in &self.images {
            types.add(&image.part_name(), image.content_type());
        }

        let mut package_rels = Relationships::new();
        package_rels.add("rId1", rt::OFFICE_DOCUMENT, part_name::DOCUMENT, false)?;
        package_rels.add("rId2", rt::CORE_PROPERTIES, part_name::CORE_PROPERTIES, false)?;
        package_rels.add(
            "rId3",
            rt::EXTENDED_PROPERTIES,
            part_name::EXTENDED_PROPERTIES,
            false,
        )?;

        let mut manifest = PackageManifest::new();
        manifest.insert(part_name::CONTENT_TYPES, types.to_xml())?;
        manifest.insert(part_name::PACKAGE_RELS, package_rels.to_xml())?;
        manifest.insert(part_name::CORE_PROPERTIES, self.properties.to_xml()?)?;
        manifest.insert(
            part_name::EXTENDED_PROPERTIES,
            AppStatistics::collect(self).to_xml(&options.application)?,
        )?;
        manifest.insert(part_name::DOCUMENT, self.document_xml()?)?;
        manifest.insert(part_name::DOCUMENT_RELS, mapper.to_xml())?;
        manifest.insert(part_name::STYLES, self.styles.to_xml()?)?;
        manifest.insert(
            part_name::SETTINGS,
            self.settings.to_xml(self.revisions.is_enabled())?,
        )?;
        manifest.insert(part_name::FONT_TABLE, font_table_xml()?)?;
        if has_comments {
            manifest.insert(part_name::COMMENTS, comments_xml(&self.comments)?)?;
            manifest.insert(
                part_name::COMMENTS_EXTENDED,
                comments_extended_xml(&self.comments)?,
            )?;
        }
        if has_footnotes {
            manifest.insert(
                part_name::FOOTNOTES,
                notes_xml(NoteKind::Footnote, &self.footnotes)?,
            )?;
        }
        if has_endnotes {
            manifest.insert(
                part_name::ENDNOTES,
                notes_xml(NoteKind::Endnote, &self.endnotes)?,
            )?;
        }
        for image in &self.images {
            manifest.insert(image.part_name(), image.data())?;
        }

        log::trace!("rendered package with {} parts", manifest.len());
        Ok(manifest)
    }

    /// Serialize the document to the bytes of a `.docx` file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&WriterOptions::default())
    }

    pub fn to_bytes_with(&self, options: &WriterOptions) -> Result<Vec<u8>> {
        let manifest = self.to_package_with(options)?;
        PackageWriter::to_bytes_with(&manifest, options.compress)
    }

    /// Write the document to a `.docx` file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_with(path, &WriterOptions::default())
    }

    pub fn save_with<P: AsRef<Path>>(&self, path: P, options: &WriterOptions) -> Result<()> {
        let bytes = self.to_bytes_with(options)?;
        std::fs::write(path.as_ref(), bytes)?;
        log::debug!("saved document to {}", path.as_ref().display());
        Ok(())
    }

    /// Write the document as a `.docx` archive to a stream.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        PackageWriter::write_to_stream(writer, &self.to_package()?)
    }

    fn validate(&self) -> Result<()> {
        if let Some(id) = self.styles.find_cycle() {
            return Err(OoxmlError::StyleCycle(id.to_string()));
        }
        for (style, parent) in self.styles.dangling_parents() {
            log::warn!("style {style:?} is based on undefined style {parent:?}");
        }
        for paragraph in self.all_paragraphs() {
            for run in &paragraph.runs {
                match &run.content {
                    RunContent::Drawing(drawing) if self.image(drawing.image_id()).is_none() => {
                        return Err(OoxmlError::not_found("image", drawing.image_id()));
                    },
                    RunContent::FootnoteReference(id) if !self.footnotes.iter().any(|n| n.id == *id) => {
                        return Err(OoxmlError::not_found("footnote", id));
                    },
                    RunContent::EndnoteReference(id) if !self.endnotes.iter().any(|n| n.id == *id) => {
                        return Err(OoxmlError::not_found("endnote", id));
                    },
                    RunContent::CommentReference(id) if self.comment(*id).is_none() => {
                        return Err(OoxmlError::not_found("comment", id));
                    },
                    _ => {},
                }
            }
        }
        Ok(())
    }

    /// The `word/document.xml` part.
    pub(crate) fn document_xml(&self) -> Result<String> {
        let ctx = RenderContext::new(self);
        let mut xml = String::with_capacity(4096 + 256 * self.body.len());

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<w:document xmlns:w="{}" xmlns:r="{}" xmlns:wp="{}" xmlns:a="{}" xmlns:pic="{}" xmlns:m="{}" xmlns:w14="{}" xmlns:mc="{}" mc:Ignorable="w14">"#,
            ns::WML_MAIN,
            ns::OFC_RELATIONSHIPS,
            ns::DML_WORDPROCESSING_DRAWING,
            ns::DML_MAIN,
            ns::DML_PICTURE,
            ns::OFC_MATH,
            ns::W14,
            ns::MC,
        )?;
        xml.push_str("<w:body>");

        for element in &self.body {
            match element {
                BodyElement::Paragraph(paragraph) => paragraph.write_xml(&mut xml, &ctx)?,
                BodyElement::Table(table) => table.write_xml(&mut xml, &ctx)?,
                BodyElement::ContentControl(control) => control.write_xml(&mut xml, &ctx)?,
            }
        }
        self.section.write_xml(&mut xml)?;

        xml.push_str("</w:body></w:document>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Emu;
    use crate::ooxml::docx::format::RunProperties;
    use crate::ooxml::docx::writer::image::Drawing;
    use crate::ooxml::docx::writer::run::Run;
    use crate::ooxml::docx::writer::style::{Style, StyleType};
    use crate::ooxml::docx::writer::table::Table;
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use std::io::{Cursor, Read};

    fn part_names(manifest: &PackageManifest) -> Vec<&str> {
        manifest.paths().collect()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
        out
    }

    /// Paragraph texts, paragraph styles and table shapes read back from
    /// `word/document.xml`. Table cell paragraphs are left out of the texts.
    #[derive(Debug, Default, PartialEq)]
    struct Outline {
        texts: Vec<String>,
        styles: Vec<Option<String>>,
        tables: Vec<Vec<usize>>,
    }

    fn outline(xml: &str) -> Outline {
        let mut reader = Reader::from_str(xml);
        let mut out = Outline::default();
        let mut table_depth = 0;
        let mut in_text = false;
        let mut text = String::new();
        let mut style = None;

        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:tbl" => {
                        table_depth += 1;
                        out.tables.push(Vec::new());
                    },
                    b"w:tr" => {
                        if let Some(t) = out.tables.last_mut() {
                            t.push(0);
                        }
                    },
                    b"w:tc" => {
                        if let Some(row) = out.tables.last_mut().and_then(|t| t.last_mut()) {
                            *row += 1;
                        }
                    },
                    b"w:p" => {
                        text.clear();
                        style = None;
                    },
                    b"w:t" => in_text = true,
                    _ => {},
                },
                Event::Empty(e) if e.name().as_ref() == b"w:pStyle" => {
                    let val = e.try_get_attribute("w:val").unwrap().unwrap();
                    style = Some(String::from_utf8(val.value.to_vec()).unwrap());
                },
                Event::Text(t) if in_text => {
                    text.push_str(&t.decode().unwrap());
                },
                Event::GeneralRef(r) if in_text => {
                    let name = r.decode().unwrap();
                    text.push_str(match name.as_ref() {
                        "amp" => "&",
                        "lt" => "<",
                        "gt" => ">",
                        "quot" => "\"",
                        _ => "'",
                    });
                },
                Event::End(e) => match e.name().as_ref() {
                    b"w:tbl" => table_depth -= 1,
                    b"w:t" => in_text = false,
                    b"w:p" if table_depth == 0 => {
                        out.texts.push(std::mem::take(&mut text));
                        out.styles.push(style.take());
                    },
                    _ => {},
                },
                Event::Eof => break,
                _ => {},
            }
        }
        out
    }

    #[test]
    fn test_minimal_part_order() {
        let mut doc = Document::new();
        doc.add_paragraph("Hello");
        let manifest = doc.to_package().unwrap();
        assert_eq!(
            part_names(&manifest),
            [
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/core.xml",
                "docProps/app.xml",
                "word/document.xml",
                "word/_rels/document.xml.rels",
                "word/styles.xml",
                "word/settings.xml",
                "word/fontTable.xml",
            ]
        );

        let types = manifest.get_str(part_name::CONTENT_TYPES).unwrap();
        assert!(types.contains(r#"PartName="/word/document.xml""#));
        assert!(!types.contains("comments"));
        assert!(!types.contains("footnotes"));
    }

    #[test]
    fn test_optional_parts_present_iff_used() {
        let mut doc = Document::new();
        doc.add_paragraph("Body");
        doc.add_comment(0, "Ann", "check", None).unwrap();
        doc.insert_endnote(0, "late").unwrap();
        doc.add_image("pic.jpg", vec![0xFF, 0xD8]);

        let manifest = doc.to_package().unwrap();
        let names = part_names(&manifest);
        assert!(names.contains(&"word/comments.xml"));
        assert!(names.contains(&"word/commentsExtended.xml"));
        assert!(names.contains(&"word/endnotes.xml"));
        assert!(!names.contains(&"word/footnotes.xml"));
        assert_eq!(names.last(), Some(&"word/media/image1.jpg"));

        let types = manifest.get_str(part_name::CONTENT_TYPES).unwrap();
        assert!(types.contains(r#"<Default Extension="jpg" ContentType="image/jpeg"/>"#));
        assert!(types.contains(ct::WML_COMMENTS_EXTENDED));
        assert!(!types.contains(ct::WML_FOOTNOTES));
    }

    #[test]
    fn test_package_relationships() {
        let manifest = Document::new().to_package().unwrap();
        let rels = manifest.get_str(part_name::PACKAGE_RELS).unwrap();
        assert!(rels.contains(&format!(
            r#"Id="rId1" Type="{}" Target="word/document.xml""#,
            rt::OFFICE_DOCUMENT
        )));
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains(r#"Id="rId3""#));
    }

    #[test]
    fn test_escaping_in_document_xml() {
        let mut doc = Document::new();
        doc.add_paragraph("A & B < C");
        let xml = doc.document_xml().unwrap();
        assert!(xml.contains("A &amp; B &lt; C"));
        assert!(xml.ends_with("</w:sectPr></w:body></w:document>"));
    }

    #[test]
    fn test_style_cycle_rejected() {
        let mut doc = Document::new();
        doc.styles.styles.push(Style::new("A", "A", StyleType::Paragraph).based_on("B"));
        doc.styles.styles.push(Style::new("B", "B", StyleType::Paragraph).based_on("A"));
        assert!(matches!(doc.to_package(), Err(OoxmlError::StyleCycle(_))));
    }

    #[test]
    fn test_dangling_based_on_tolerated() {
        let mut doc = Document::new();
        doc.add_style(Style::new("Orphan", "Orphan", StyleType::Paragraph).based_on("Missing"))
            .unwrap();
        assert!(doc.to_package().is_ok());
    }

    #[test]
    fn test_drawing_with_missing_image() {
        let mut doc = Document::new();
        doc.add_paragraph("pic");
        doc.paragraph_mut(0)
            .unwrap()
            .add_run(Run::new(RunContent::Drawing(Drawing::new(
                "rIdImage7",
                Emu(9525),
                Emu(9525),
            ))));
        assert!(matches!(
            doc.to_package(),
            Err(OoxmlError::NotFound { .. })
        ));
    }

    #[test]
    fn test_reference_without_note_rejected() {
        let mut doc = Document::new();
        doc.add_paragraph("cited");
        doc.insert_footnote(0, "source").unwrap();
        doc.paragraph_mut(0)
            .unwrap()
            .add_run(Run::new(RunContent::EndnoteReference(4)));
        assert!(matches!(
            doc.to_package(),
            Err(OoxmlError::NotFound { kind: "endnote", .. })
        ));

        doc.paragraph_mut(0).unwrap().runs.pop();
        doc.footnotes.clear();
        assert!(matches!(
            doc.to_package(),
            Err(OoxmlError::NotFound { kind: "footnote", .. })
        ));
    }

    #[test]
    fn test_settings_follow_tracking() {
        let mut doc = Document::new();
        doc.enable_track_changes("Ann");
        let manifest = doc.to_package().unwrap();
        assert!(manifest.get_str(part_name::SETTINGS).unwrap().contains("<w:trackRevisions/>"));
    }

    #[test]
    fn test_round_trip_through_archive() {
        let mut doc = Document::new();
        doc.add_paragraph("Quarterly report");
        doc.apply_style(0, "Title").unwrap();
        doc.add_paragraph("Revenue & costs < budget");
        doc.format_paragraph(1, &RunProperties::new().bold()).unwrap();
        let data = vec![
            vec!["Region", "Q1", "Q2"],
            vec!["North", "10", "12"],
        ];
        doc.insert_table(Table::from_data(data.as_slice()), None);
        doc.merge_cells_horizontal(0, 1, 1, 2).unwrap();
        doc.add_paragraph("  trailing space kept ");

        let bytes = doc
            .to_bytes_with(&WriterOptions::new().with_application("Tests"))
            .unwrap();
        let read = outline(&read_part(&bytes, part_name::DOCUMENT));

        assert_eq!(
            read.texts,
            ["Quarterly report", "Revenue & costs < budget", "  trailing space kept "]
        );
        assert_eq!(read.styles, [Some("Title".to_string()), None, None]);
        // The continuation cell is collapsed into the span.
        assert_eq!(read.tables, [vec![3, 2]]);

        let app = read_part(&bytes, part_name::EXTENDED_PROPERTIES);
        assert!(app.contains("<Application>Tests</Application>"));
        let styles = read_part(&bytes, part_name::STYLES);
        assert!(styles.contains(r#"w:styleId="Title""#));
    }

    #[test]
    fn test_every_xml_part_is_well_formed() {
        let mut doc = Document::new();
        doc.add_paragraph("x");
        doc.add_comment(0, "O'Neil", "<b>", None).unwrap();
        doc.insert_footnote(0, "a & b").unwrap();
        doc.insert_toc(None, 3).unwrap();
        let manifest = doc.to_package().unwrap();
        for (path, content) in manifest.iter() {
            if path.ends_with(".xml") || path.ends_with(".rels") {
                let text = std::str::from_utf8(content).unwrap();
                let body = text
                    .strip_prefix(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#)
                    .unwrap_or(text);
                crate::common::xml::check_well_formed(body.trim_start())
                    .unwrap_or_else(|e| panic!("{path}: {e}"));
            }
        }
    }

    #[test]
    fn test_save_to_disk() {
        let mut doc = Document::new();
        doc.add_paragraph("saved");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        doc.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(read_part(&bytes, part_name::DOCUMENT).contains("<w:t>saved</w:t>"));
    }

    #[test]
    fn test_uncompressed_output() {
        let doc = Document::new();
        let bytes = doc.to_bytes_with(&WriterOptions::new().with_compression(false)).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            archive.by_index(0).unwrap().compression(),
            zip::CompressionMethod::Stored
        );
    }
}
