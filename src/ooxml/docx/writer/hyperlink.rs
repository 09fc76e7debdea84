/// Hyperlink support for DOCX documents.
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::RunProperties;
use crate::ooxml::error::{OoxmlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use super::doc::{Document, ParagraphId};
use super::paragraph::Paragraph;
use super::run::Run;

/// Character style applied to link text.
pub(crate) const HYPERLINK_STYLE: &str = "Hyperlink";

/// Where a hyperlink points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HyperlinkTarget {
    /// URL, stored as an external relationship
    External(String),
    /// Bookmark name inside this document
    Internal(String),
}

/// A hyperlink spanning runs `run_start..run_end` of its paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub(crate) id: u32,
    pub(crate) target: HyperlinkTarget,
    pub(crate) run_start: usize,
    pub(crate) run_end: usize,
    pub(crate) tooltip: Option<String>,
}

impl Hyperlink {
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn target(&self) -> &HyperlinkTarget {
        &self.target
    }

    #[inline]
    pub fn runs(&self) -> std::ops::Range<usize> {
        self.run_start..self.run_end
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Relationship id of an external link.
    pub(crate) fn relationship_id(&self) -> Option<String> {
        match self.target {
            HyperlinkTarget::External(_) => Some(format!("rIdLink{}", self.id)),
            HyperlinkTarget::Internal(_) => None,
        }
    }

    pub(crate) fn write_start(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<w:hyperlink");
        match self.target {
            HyperlinkTarget::External(_) => {
                write!(xml, r#" r:id="rIdLink{}""#, self.id)?;
            },
            HyperlinkTarget::Internal(ref anchor) => {
                write!(xml, r#" w:anchor="{}""#, escape_xml(anchor))?;
            },
        }
        if let Some(ref tooltip) = self.tooltip {
            write!(xml, r#" w:tooltip="{}""#, escape_xml(tooltip))?;
        }
        xml.push_str(r#" w:history="1">"#);
        Ok(())
    }

    pub(crate) fn write_end(xml: &mut String) {
        xml.push_str("</w:hyperlink>");
    }
}

impl Document {
    /// Append link text pointing at an external URL.
    pub fn insert_hyperlink(
        &mut self,
        paragraph_index: usize,
        text: &str,
        url: &str,
        tooltip: Option<&str>,
    ) -> Result<u32> {
        if url.is_empty() {
            return Err(OoxmlError::InvalidValue("hyperlink URL is empty".to_string()));
        }
        self.add_link(
            paragraph_index,
            text,
            HyperlinkTarget::External(url.to_string()),
            tooltip,
        )
    }

    /// Append link text pointing at a bookmark.
    ///
    /// # Errors
    ///
    /// `NotFound` when no bookmark has that name.
    pub fn insert_internal_link(
        &mut self,
        paragraph_index: usize,
        text: &str,
        bookmark: &str,
    ) -> Result<u32> {
        if self.bookmark(bookmark).is_none() {
            return Err(OoxmlError::not_found("bookmark", bookmark));
        }
        self.add_link(
            paragraph_index,
            text,
            HyperlinkTarget::Internal(bookmark.to_string()),
            None,
        )
    }

    fn add_link(
        &mut self,
        paragraph_index: usize,
        text: &str,
        target: HyperlinkTarget,
        tooltip: Option<&str>,
    ) -> Result<u32> {
        self.paragraph(paragraph_index)?;
        let id = self.ids.hyperlink.next_id() as u32;

        let paragraph = self.paragraph_mut(paragraph_index)?;
        let start = paragraph.runs.len();
        paragraph.add_run(
            Run::text(text).with_properties(RunProperties::new().style(HYPERLINK_STYLE)),
        );
        paragraph.hyperlinks.push(Hyperlink {
            id,
            target,
            run_start: start,
            run_end: start + 1,
            tooltip: tooltip.map(str::to_string),
        });
        Ok(id)
    }

    /// Remove a hyperlink, keeping its text as plain runs.
    pub fn delete_hyperlink(&mut self, id: u32) -> Result<()> {
        let paragraph = self
            .body_paragraphs_mut()
            .find(|p| p.hyperlinks.iter().any(|h| h.id == id))
            .ok_or_else(|| OoxmlError::not_found("hyperlink", id))?;

        let pos = paragraph
            .hyperlinks
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| OoxmlError::not_found("hyperlink", id))?;
        unwrap_link(paragraph, pos);
        Ok(())
    }

    /// Unwrap every internal link to `bookmark`; returns how many went.
    pub(crate) fn unlink_bookmark(&mut self, bookmark: &str) -> usize {
        let mut removed = 0;
        for paragraph in self.all_paragraphs_mut() {
            while let Some(pos) = paragraph
                .hyperlinks
                .iter()
                .position(|h| matches!(&h.target, HyperlinkTarget::Internal(name) if name == bookmark))
            {
                unwrap_link(paragraph, pos);
                removed += 1;
            }
        }
        removed
    }

    /// All hyperlinks with the paragraph they live in.
    pub fn hyperlinks(&self) -> impl Iterator<Item = (ParagraphId, &Hyperlink)> {
        self.paragraphs()
            .flat_map(|p| p.hyperlinks.iter().map(move |h| (p.id, h)))
    }
}

fn unwrap_link(paragraph: &mut Paragraph, pos: usize) {
    let link = paragraph.hyperlinks.remove(pos);
    for run in &mut paragraph.runs[link.run_start..link.run_end] {
        if run.properties.style.as_deref() == Some(HYPERLINK_STYLE) {
            run.properties.style = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_link() {
        let mut doc = Document::new();
        doc.add_paragraph("See ");
        let id = doc
            .insert_hyperlink(0, "example", "https://example.com/?a=1&b=2", Some("Go"))
            .unwrap();
        assert_eq!(id, 1);

        let (_, link) = doc.hyperlinks().next().unwrap();
        assert_eq!(link.runs(), 1..2);
        assert_eq!(link.relationship_id().as_deref(), Some("rIdLink1"));

        let mut xml = String::new();
        link.write_start(&mut xml).unwrap();
        assert_eq!(
            xml,
            r#"<w:hyperlink r:id="rIdLink1" w:tooltip="Go" w:history="1">"#
        );
    }

    #[test]
    fn test_internal_link_requires_bookmark() {
        let mut doc = Document::new();
        doc.add_paragraph("Intro");
        assert!(doc.insert_internal_link(0, "jump", "intro").is_err());
        doc.insert_bookmark(0, "intro").unwrap();
        let id = doc.insert_internal_link(0, "jump", "intro").unwrap();
        let (_, link) = doc.hyperlinks().find(|(_, h)| h.id() == id).unwrap();
        assert_eq!(link.relationship_id(), None);
    }

    #[test]
    fn test_delete_hyperlink_keeps_text() {
        let mut doc = Document::new();
        doc.add_paragraph("");
        let id = doc.insert_hyperlink(0, "site", "https://x.test", None).unwrap();
        doc.delete_hyperlink(id).unwrap();
        assert_eq!(doc.hyperlinks().count(), 0);
        assert_eq!(doc.paragraph(0).unwrap().text(), "site");
        assert!(doc.paragraph(0).unwrap().runs()[0].properties().style.is_none());
        assert!(matches!(
            doc.delete_hyperlink(id),
            Err(OoxmlError::NotFound { .. })
        ));
        // Ids are not reused after deletion.
        assert_eq!(doc.insert_hyperlink(0, "again", "https://x.test", None).unwrap(), 2);
    }
}
