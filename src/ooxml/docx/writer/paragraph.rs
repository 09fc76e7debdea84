/// Paragraph types and implementation for DOCX documents.
use crate::ooxml::docx::format::{ParagraphProperties, RunProperties};
use crate::ooxml::error::Result;
use smallvec::SmallVec;

use super::doc::ParagraphId;
use super::hyperlink::Hyperlink;
use super::relmap::RenderContext;
use super::run::{Run, RunContent};
use super::section::SectionProperties;

/// A paragraph: an ordered run sequence plus paragraph formatting.
///
/// The id is assigned by the owning [`Document`](super::Document) on
/// insertion and never changes afterwards, unlike the paragraph's position.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub(crate) id: ParagraphId,
    pub(crate) runs: Vec<Run>,
    pub(crate) properties: ParagraphProperties,
    pub(crate) hyperlinks: SmallVec<[Hyperlink; 2]>,
    /// Section that ends with this paragraph
    pub(crate) section_break: Option<SectionProperties>,
    /// Insertion or deletion of the whole paragraph
    pub(crate) revision: Option<u32>,
    pub(crate) format_revision: Option<u32>,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Paragraph {
    pub fn new() -> Self {
        Self {
            id: ParagraphId::UNASSIGNED,
            runs: Vec::new(),
            properties: ParagraphProperties::default(),
            hyperlinks: SmallVec::new(),
            section_break: None,
            revision: None,
            format_revision: None,
        }
    }

    /// A paragraph holding one text run, or no runs for empty text.
    pub fn with_text(text: &str) -> Self {
        let mut paragraph = Self::new();
        if !text.is_empty() {
            paragraph.runs.push(Run::text(text));
        }
        paragraph
    }

    pub fn with_properties(mut self, properties: ParagraphProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_style(mut self, style_id: &str) -> Self {
        self.properties.style = Some(style_id.to_string());
        self
    }

    #[inline]
    pub fn id(&self) -> ParagraphId {
        self.id
    }

    #[inline]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    #[inline]
    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    /// Add a run to the end of the paragraph.
    pub fn add_run(&mut self, run: Run) -> &mut Run {
        self.runs.push(run);
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    /// Add a text run with the given formatting.
    pub fn add_text(&mut self, text: &str, properties: RunProperties) -> &mut Run {
        self.add_run(Run::text(text).with_properties(properties))
    }

    /// Insert a run, keeping hyperlink ranges pointing at the same runs.
    ///
    /// A run inserted strictly inside a hyperlink becomes part of it.
    pub fn insert_run(&mut self, index: usize, run: Run) {
        let index = index.min(self.runs.len());
        self.runs.insert(index, run);
        for link in &mut self.hyperlinks {
            if index <= link.run_start {
                link.run_start += 1;
                link.run_end += 1;
            } else if index < link.run_end {
                link.run_end += 1;
            }
        }
    }

    /// Remove a run; hyperlinks left without runs are dropped.
    pub fn remove_run(&mut self, index: usize) -> Run {
        let run = self.runs.remove(index);
        for link in &mut self.hyperlinks {
            if index < link.run_start {
                link.run_start -= 1;
            }
            if index < link.run_end {
                link.run_end -= 1;
            }
        }
        self.hyperlinks.retain(|link| link.run_start < link.run_end);
        run
    }

    /// Replace all runs by one text run, keeping the first run's formatting.
    pub fn set_text(&mut self, text: &str) {
        let properties = self
            .runs
            .first()
            .map(|run| run.properties.clone())
            .unwrap_or_default();
        self.runs.clear();
        self.hyperlinks.clear();
        self.runs.push(Run::text(text).with_properties(properties));
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::plain_text).collect()
    }

    #[inline]
    pub fn properties(&self) -> &ParagraphProperties {
        &self.properties
    }

    #[inline]
    pub fn properties_mut(&mut self) -> &mut ParagraphProperties {
        &mut self.properties
    }

    pub fn style(&self) -> Option<&str> {
        self.properties.style.as_deref()
    }

    pub fn hyperlinks(&self) -> &[Hyperlink] {
        &self.hyperlinks
    }

    pub fn section_break(&self) -> Option<&SectionProperties> {
        self.section_break.as_ref()
    }

    #[inline]
    pub fn revision(&self) -> Option<u32> {
        self.revision
    }

    #[inline]
    pub fn format_revision(&self) -> Option<u32> {
        self.format_revision
    }

    pub(crate) fn write_xml(&self, xml: &mut String, ctx: &RenderContext<'_>) -> Result<()> {
        xml.push_str("<w:p>");

        let mut trailer = String::new();
        if let Some(rev) = self.revision.and_then(|id| ctx.revision(id)) {
            trailer.push_str("<w:rPr>");
            rev.write_mark(&mut trailer)?;
            trailer.push_str("</w:rPr>");
        }
        if let Some(ref section) = self.section_break {
            section.write_xml(&mut trailer)?;
        }
        if let Some(rev) = self.format_revision.and_then(|id| ctx.revision(id)) {
            rev.write_property_change(&mut trailer)?;
        }
        self.properties.write_xml(xml, &trailer)?;

        let bookmarks = ctx.bookmarks_for(self.id);
        let comments = ctx.comments_for(self.id);
        for bookmark in bookmarks {
            bookmark.write_start(xml)?;
        }
        for id in comments {
            xml.push_str(&format!(r#"<w:commentRangeStart w:id="{id}"/>"#));
        }

        let mut open: Option<&Hyperlink> = None;
        for (i, run) in self.runs.iter().enumerate() {
            if open.is_none()
                && let Some(link) = self
                    .hyperlinks
                    .iter()
                    .find(|l| l.run_start == i && l.run_end > i)
            {
                link.write_start(xml)?;
                open = Some(link);
            }
            run.write_xml(xml, ctx)?;
            if open.is_some_and(|l| l.run_end == i + 1) {
                Hyperlink::write_end(xml);
                open = None;
            }
        }
        if open.is_some() {
            Hyperlink::write_end(xml);
        }

        for &id in comments {
            xml.push_str(&format!(r#"<w:commentRangeEnd w:id="{id}"/>"#));
            Run::new(RunContent::CommentReference(id))
                .with_properties(RunProperties::new().style("CommentReference"))
                .write_xml(xml, ctx)?;
        }
        for bookmark in bookmarks.iter().rev() {
            bookmark.write_end(xml)?;
        }

        xml.push_str("</w:p>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::unit::Twips;
    use crate::ooxml::docx::format::{LineSpacing, ParagraphAlignment};
    use crate::ooxml::docx::writer::hyperlink::HyperlinkTarget;

    fn render(paragraph: &Paragraph) -> String {
        let ctx = RenderContext::empty();
        let mut xml = String::new();
        paragraph.write_xml(&mut xml, &ctx).unwrap();
        xml
    }

    fn link(start: usize, end: usize) -> Hyperlink {
        Hyperlink {
            id: 1,
            target: HyperlinkTarget::Internal("x".to_string()),
            run_start: start,
            run_end: end,
            tooltip: None,
        }
    }

    #[test]
    fn test_with_text() {
        assert_eq!(Paragraph::with_text("Hello").runs().len(), 1);
        assert!(Paragraph::with_text("").runs().is_empty());
        assert_eq!(render(&Paragraph::new()), "<w:p></w:p>");
    }

    #[test]
    fn test_set_text_keeps_first_run_format() {
        let mut p = Paragraph::new();
        p.add_text("one", RunProperties::new().bold());
        p.add_text("two", RunProperties::new().italic());
        p.set_text("three");
        assert_eq!(p.runs().len(), 1);
        assert_eq!(p.text(), "three");
        assert!(p.runs()[0].properties().is_bold());
        assert!(!p.runs()[0].properties().is_italic());
    }

    #[test]
    fn test_remove_run_shifts_hyperlinks() {
        let mut p = Paragraph::new();
        for t in ["a", "b", "c"] {
            p.add_run(Run::text(t));
        }
        p.hyperlinks.push(link(2, 3));
        p.remove_run(0);
        assert_eq!(p.hyperlinks()[0].runs(), 1..2);
        p.remove_run(1);
        assert!(p.hyperlinks().is_empty());
    }

    #[test]
    fn test_insert_run_shifts_hyperlinks() {
        let mut p = Paragraph::new();
        p.add_run(Run::text("a"));
        p.add_run(Run::text("b"));
        p.hyperlinks.push(link(1, 2));
        p.insert_run(0, Run::text("z"));
        assert_eq!(p.hyperlinks()[0].runs(), 2..3);
    }

    #[test]
    fn test_paragraph_xml() {
        let p = Paragraph::with_text("Body").with_properties(
            ParagraphProperties::new()
                .style("Heading1")
                .alignment(ParagraphAlignment::Center)
                .line_spacing(LineSpacing::Exact(Twips(300))),
        );
        let xml = render(&p);
        assert!(xml.starts_with(r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains(r#"w:line="300" w:lineRule="exact""#));
        assert!(xml.contains("<w:t>Body</w:t>"));
    }

    #[test]
    fn test_hyperlink_wraps_runs() {
        let mut p = Paragraph::with_text("Go to ");
        p.add_run(Run::text("here"));
        p.hyperlinks.push(link(1, 2));
        let xml = render(&p);
        assert!(xml.contains(r#"<w:hyperlink w:anchor="x" w:history="1"><w:r><w:t>here</w:t></w:r></w:hyperlink>"#));
    }
}
