/// Bookmark writer support for DOCX documents.
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use std::fmt::Write as FmtWrite;

use super::doc::{Document, ParagraphId};

/// A named location spanning one paragraph.
///
/// Bookmarks are the targets of internal hyperlinks and `REF` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    id: u32,
    name: String,
    pub(crate) paragraph: ParagraphId,
}

impl Bookmark {
    /// Get the bookmark ID.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Get the bookmark name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn paragraph(&self) -> ParagraphId {
        self.paragraph
    }

    pub(crate) fn write_start(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:bookmarkStart w:id="{}" w:name="{}"/>"#,
            self.id,
            escape_xml(&self.name)
        )?;
        Ok(())
    }

    pub(crate) fn write_end(&self, xml: &mut String) -> Result<()> {
        write!(xml, r#"<w:bookmarkEnd w:id="{}"/>"#, self.id)?;
        Ok(())
    }
}

impl Document {
    /// Bookmark a whole paragraph.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` if the name is taken, `InvalidValue` for an empty
    /// name or one containing whitespace.
    pub fn insert_bookmark(&mut self, paragraph_index: usize, name: &str) -> Result<u32> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(OoxmlError::InvalidValue(format!(
                "bookmark name {name:?} must be non-empty without whitespace"
            )));
        }
        if self.bookmark(name).is_some() {
            return Err(OoxmlError::duplicate("bookmark", name));
        }
        let paragraph = self.paragraph(paragraph_index)?.id();

        let id = self.ids.bookmark.next_id() as u32;
        self.bookmarks.push(Bookmark {
            id,
            name: name.to_string(),
            paragraph,
        });
        Ok(id)
    }

    /// Remove a bookmark; internal links to it keep their text but stop
    /// being links.
    pub fn delete_bookmark(&mut self, name: &str) -> Result<()> {
        let pos = self
            .bookmarks
            .iter()
            .position(|b| b.name == name)
            .ok_or_else(|| OoxmlError::not_found("bookmark", name))?;
        let bookmark = self.bookmarks.remove(pos);
        let links = self.unlink_bookmark(&bookmark.name);
        if links > 0 {
            log::debug!("deleted bookmark {name:?}: unwrapped {links} links");
        }
        Ok(())
    }

    pub fn bookmark(&self, name: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.name == name)
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::writer::HyperlinkTarget;

    #[test]
    fn test_bookmark_lifecycle() {
        let mut doc = Document::new();
        doc.add_paragraph("Chapter one");
        let id = doc.insert_bookmark(0, "chapter1").unwrap();
        assert_eq!(id, 1);
        assert_eq!(doc.bookmark("chapter1").unwrap().paragraph(), doc.paragraph(0).unwrap().id());

        assert!(matches!(
            doc.insert_bookmark(0, "chapter1"),
            Err(OoxmlError::DuplicateIdentifier { .. })
        ));
        assert!(doc.insert_bookmark(0, "has space").is_err());
        assert!(matches!(
            doc.insert_bookmark(5, "other"),
            Err(OoxmlError::InvalidIndex { .. })
        ));

        doc.delete_bookmark("chapter1").unwrap();
        assert!(doc.bookmarks().is_empty());
        assert_eq!(doc.insert_bookmark(0, "chapter1").unwrap(), 2);
    }

    #[test]
    fn test_links_to_a_removed_bookmark_are_unwrapped() {
        let mut doc = Document::new();
        doc.add_paragraph("Intro");
        doc.add_paragraph("Appendix");
        doc.add_paragraph("See ");
        doc.insert_bookmark(0, "intro").unwrap();
        doc.insert_bookmark(1, "appendix").unwrap();
        doc.insert_internal_link(2, "intro", "intro").unwrap();
        doc.insert_internal_link(2, "appendix", "appendix").unwrap();

        doc.delete_bookmark("intro").unwrap();
        let targets: Vec<_> = doc.hyperlinks().map(|(_, h)| h.target().clone()).collect();
        assert_eq!(targets, [HyperlinkTarget::Internal("appendix".to_string())]);

        // Deleting the bookmarked paragraph takes its links down too.
        doc.delete_paragraph(1).unwrap();
        assert_eq!(doc.hyperlinks().count(), 0);
        let see = doc.paragraph(1).unwrap();
        assert_eq!(see.text(), "See introappendix");
        assert!(see.runs().iter().all(|r| r.properties().style.is_none()));

        let xml = doc.document_xml().unwrap();
        assert!(!xml.contains("w:anchor="));
    }

    #[test]
    fn test_bookmark_xml() {
        let bookmark = Bookmark {
            id: 42,
            name: "A&B".to_string(),
            paragraph: ParagraphId(1),
        };
        let mut xml = String::new();
        bookmark.write_start(&mut xml).unwrap();
        bookmark.write_end(&mut xml).unwrap();
        assert_eq!(
            xml,
            r#"<w:bookmarkStart w:id="42" w:name="A&amp;B"/><w:bookmarkEnd w:id="42"/>"#
        );
    }
}
