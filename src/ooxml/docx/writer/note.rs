/// Footnotes and endnotes.
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::RunProperties;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace as ns;
use std::fmt::Write as FmtWrite;

use super::doc::{Document, ParagraphId};
use super::run::{Run, RunContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    Footnote,
    Endnote,
}

impl NoteKind {
    /// Element prefix used throughout the part (`footnote`, `endnote`).
    fn tag(self) -> &'static str {
        match self {
            Self::Footnote => "footnote",
            Self::Endnote => "endnote",
        }
    }

    fn text_style(self) -> &'static str {
        match self {
            Self::Footnote => "FootnoteText",
            Self::Endnote => "EndnoteText",
        }
    }

    fn reference_style(self) -> &'static str {
        match self {
            Self::Footnote => "FootnoteReference",
            Self::Endnote => "EndnoteReference",
        }
    }

    fn reference(self, id: i32) -> RunContent {
        match self {
            Self::Footnote => RunContent::FootnoteReference(id),
            Self::Endnote => RunContent::EndnoteReference(id),
        }
    }
}

/// Footnote or endnote entry.
///
/// Ids start at 1; -1 and 0 belong to the separator notes every notes part
/// carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub(crate) id: i32,
    pub(crate) text: String,
    pub(crate) paragraph: ParagraphId,
}

impl Note {
    #[inline]
    pub fn id(&self) -> i32 {
        self.id
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn paragraph(&self) -> ParagraphId {
        self.paragraph
    }
}

/// Generate `footnotes.xml` or `endnotes.xml`, separators included.
pub(crate) fn notes_xml(kind: NoteKind, notes: &[Note]) -> Result<String> {
    let tag = kind.tag();
    let mut xml = String::with_capacity(512 + notes.len() * 256);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<w:{tag}s xmlns:w="{}" xmlns:r="{}">"#,
        ns::WML_MAIN,
        ns::OFC_RELATIONSHIPS
    )?;
    write!(
        xml,
        r#"<w:{tag} w:type="separator" w:id="-1"><w:p><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:r><w:separator/></w:r></w:p></w:{tag}>"#
    )?;
    write!(
        xml,
        r#"<w:{tag} w:type="continuationSeparator" w:id="0"><w:p><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:r><w:continuationSeparator/></w:r></w:p></w:{tag}>"#
    )?;

    for note in notes {
        write!(
            xml,
            r#"<w:{tag} w:id="{}"><w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:rPr><w:rStyle w:val="{}"/></w:rPr><w:{tag}Ref/></w:r><w:r><w:t xml:space="preserve"> {}</w:t></w:r></w:p></w:{tag}>"#,
            note.id,
            kind.text_style(),
            kind.reference_style(),
            escape_xml(&note.text)
        )?;
    }

    write!(xml, "</w:{tag}s>")?;
    Ok(xml)
}

impl Document {
    /// Add a footnote and append its reference mark to the paragraph.
    pub fn insert_footnote(&mut self, paragraph_index: usize, text: &str) -> Result<i32> {
        self.insert_note(NoteKind::Footnote, paragraph_index, text)
    }

    pub fn insert_endnote(&mut self, paragraph_index: usize, text: &str) -> Result<i32> {
        self.insert_note(NoteKind::Endnote, paragraph_index, text)
    }

    /// Remove a footnote together with its reference mark.
    pub fn delete_footnote(&mut self, id: i32) -> Result<()> {
        self.delete_note(NoteKind::Footnote, id)
    }

    pub fn delete_endnote(&mut self, id: i32) -> Result<()> {
        self.delete_note(NoteKind::Endnote, id)
    }

    pub fn footnotes(&self) -> &[Note] {
        &self.footnotes
    }

    pub fn endnotes(&self) -> &[Note] {
        &self.endnotes
    }

    /// Id the next footnote will receive; 1 for a document without notes.
    pub fn next_footnote_id(&self) -> i32 {
        self.ids.footnote.peek() as i32
    }

    pub fn next_endnote_id(&self) -> i32 {
        self.ids.endnote.peek() as i32
    }

    fn insert_note(&mut self, kind: NoteKind, paragraph_index: usize, text: &str) -> Result<i32> {
        let paragraph = self.paragraph(paragraph_index)?.id();

        let id = match kind {
            NoteKind::Footnote => self.ids.footnote.next_id(),
            NoteKind::Endnote => self.ids.endnote.next_id(),
        } as i32;
        let note = Note {
            id,
            text: text.to_string(),
            paragraph,
        };
        match kind {
            NoteKind::Footnote => self.footnotes.push(note),
            NoteKind::Endnote => self.endnotes.push(note),
        }

        self.paragraph_mut(paragraph_index)?.add_run(
            Run::new(kind.reference(id))
                .with_properties(RunProperties::new().style(kind.reference_style())),
        );
        Ok(id)
    }

    fn delete_note(&mut self, kind: NoteKind, id: i32) -> Result<()> {
        let notes = match kind {
            NoteKind::Footnote => &mut self.footnotes,
            NoteKind::Endnote => &mut self.endnotes,
        };
        let pos = notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| OoxmlError::not_found(kind.tag(), id))?;
        let note = notes.remove(pos);

        let reference = kind.reference(id);
        if let Some(paragraph) = self.paragraph_by_id_mut(note.paragraph)
            && let Some(run) = paragraph.runs.iter().position(|r| r.content == reference)
        {
            paragraph.remove_run(run);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_footnote_id_is_one() {
        let doc = Document::new();
        assert_eq!(doc.next_footnote_id(), 1);
        assert_eq!(doc.next_endnote_id(), 1);
    }

    #[test]
    fn test_footnote_lifecycle() {
        let mut doc = Document::new();
        doc.add_paragraph("Claim");
        let first = doc.insert_footnote(0, "Source A").unwrap();
        let second = doc.insert_footnote(0, "Source B").unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(doc.paragraph(0).unwrap().runs().len(), 3);

        doc.delete_footnote(second).unwrap();
        assert_eq!(doc.paragraph(0).unwrap().runs().len(), 2);
        assert_eq!(doc.next_footnote_id(), 3);
        assert!(matches!(
            doc.delete_footnote(second),
            Err(OoxmlError::NotFound { .. })
        ));
    }

    #[test]
    fn test_endnotes_are_independent() {
        let mut doc = Document::new();
        doc.add_paragraph("Claim");
        doc.insert_footnote(0, "f").unwrap();
        assert_eq!(doc.insert_endnote(0, "e").unwrap(), 1);
    }

    #[test]
    fn test_notes_xml_has_separators() {
        let mut doc = Document::new();
        doc.add_paragraph("Claim");
        doc.insert_footnote(0, "A & B").unwrap();
        let xml = notes_xml(NoteKind::Footnote, doc.footnotes()).unwrap();
        assert!(xml.contains(r#"<w:footnote w:type="separator" w:id="-1">"#));
        assert!(xml.contains(r#"<w:footnote w:type="continuationSeparator" w:id="0">"#));
        assert!(xml.contains(r#"<w:footnote w:id="1">"#));
        assert!(xml.contains("A &amp; B"));
        assert!(xml.ends_with("</w:footnotes>"));
    }
}
