/// The editable document: body, owned collections and index-based editing.
use crate::common::IdAllocator;
use crate::ooxml::docx::format::{Color, ParagraphProperties, RunProperties};
use crate::ooxml::error::{OoxmlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bookmark::Bookmark;
use super::comment::Comment;
use super::content_control::ContentControl;
use super::field::Field;
use super::image::Image;
use super::note::Note;
use super::paragraph::Paragraph;
use super::properties::{DocumentProperties, Settings};
use super::revision::RevisionManager;
use super::run::{Run, RunContent};
use super::section::SectionProperties;
use super::style::StyleSheet;
use super::table::Table;

/// Stable identity of a paragraph.
///
/// Positions shift as paragraphs are inserted and deleted; ids do not, and
/// are never reused within a document. Comments, notes, bookmarks and
/// revisions refer to paragraphs by id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ParagraphId(pub(crate) u64);

impl ParagraphId {
    /// Id of a paragraph not yet inserted into a document.
    pub const UNASSIGNED: ParagraphId = ParagraphId(0);

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A top-level body element. Document order is reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
    ContentControl(ContentControl),
}

/// Id allocators of every keyed collection in a document.
#[derive(Debug, Clone, Default)]
pub(crate) struct DocumentIds {
    pub(crate) paragraph: IdAllocator,
    pub(crate) comment: IdAllocator,
    pub(crate) footnote: IdAllocator,
    pub(crate) endnote: IdAllocator,
    pub(crate) image: IdAllocator,
    pub(crate) hyperlink: IdAllocator,
    pub(crate) bookmark: IdAllocator,
    pub(crate) drawing: IdAllocator,
    pub(crate) content_control: IdAllocator,
}

/// A word-processing document.
///
/// The document owns everything it contains; callers hold ids, never
/// references into it. Index-based operations count paragraphs (or tables)
/// among the body elements and re-resolve the index on every call.
///
/// Every operation validates before it mutates: when one fails the document
/// is unchanged.
///
/// # Example
///
/// ```
/// use quince::ooxml::docx::Document;
///
/// let mut doc = Document::new();
/// doc.add_paragraph("Hello");
/// doc.add_paragraph("World");
/// doc.delete_paragraph(0)?;
/// assert_eq!(doc.paragraph(0)?.text(), "World");
/// # Ok::<(), quince::ooxml::error::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) body: Vec<BodyElement>,
    pub(crate) styles: StyleSheet,
    pub(crate) properties: DocumentProperties,
    /// Page setup of the last section
    pub(crate) section: SectionProperties,
    pub(crate) settings: Settings,
    pub(crate) comments: Vec<Comment>,
    pub(crate) revisions: RevisionManager,
    pub(crate) footnotes: Vec<Note>,
    pub(crate) endnotes: Vec<Note>,
    pub(crate) images: Vec<Image>,
    pub(crate) bookmarks: Vec<Bookmark>,
    pub(crate) ids: DocumentIds,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with the built-in styles.
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            styles: StyleSheet::builtin(),
            properties: DocumentProperties::default(),
            section: SectionProperties::default(),
            settings: Settings::default(),
            comments: Vec::new(),
            revisions: RevisionManager::new(),
            footnotes: Vec::new(),
            endnotes: Vec::new(),
            images: Vec::new(),
            bookmarks: Vec::new(),
            ids: DocumentIds::default(),
        }
    }

    pub fn body_elements(&self) -> &[BodyElement] {
        &self.body
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body paragraphs in order; table cells are not included.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|element| match element {
            BodyElement::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    pub(crate) fn body_paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body.iter_mut().filter_map(|element| match element {
            BodyElement::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Every paragraph in reading order, table cells included.
    pub fn all_paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().flat_map(|element| -> Box<dyn Iterator<Item = &Paragraph> + '_> {
            match element {
                BodyElement::Paragraph(p) => Box::new(std::iter::once(p)),
                BodyElement::Table(t) => Box::new(t.paragraphs()),
                BodyElement::ContentControl(_) => Box::new(std::iter::empty()),
            }
        })
    }

    pub(crate) fn all_paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.body
            .iter_mut()
            .flat_map(|element| -> Box<dyn Iterator<Item = &mut Paragraph> + '_> {
                match element {
                    BodyElement::Paragraph(p) => Box::new(std::iter::once(p)),
                    BodyElement::Table(t) => Box::new(t.paragraphs_mut()),
                    BodyElement::ContentControl(_) => Box::new(std::iter::empty()),
                }
            })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|element| match element {
            BodyElement::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Body position of the paragraph at `index`.
    fn paragraph_position(&self, index: usize) -> Result<usize> {
        self.body
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, BodyElement::Paragraph(_)))
            .nth(index)
            .map(|(pos, _)| pos)
            .ok_or_else(|| OoxmlError::invalid_index("paragraph", index, self.paragraph_count()))
    }

    fn table_position(&self, index: usize) -> Result<usize> {
        self.body
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, BodyElement::Table(_)))
            .nth(index)
            .map(|(pos, _)| pos)
            .ok_or_else(|| OoxmlError::invalid_index("table", index, self.table_count()))
    }

    pub fn paragraph(&self, index: usize) -> Result<&Paragraph> {
        self.paragraphs()
            .nth(index)
            .ok_or_else(|| OoxmlError::invalid_index("paragraph", index, self.paragraph_count()))
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Result<&mut Paragraph> {
        let pos = self.paragraph_position(index)?;
        match &mut self.body[pos] {
            BodyElement::Paragraph(p) => Ok(p),
            _ => Err(OoxmlError::invalid_index("paragraph", index, pos)),
        }
    }

    /// Look a paragraph up by id, in the body or inside a table.
    pub fn paragraph_by_id(&self, id: ParagraphId) -> Option<&Paragraph> {
        self.all_paragraphs().find(|p| p.id == id)
    }

    pub fn paragraph_by_id_mut(&mut self, id: ParagraphId) -> Option<&mut Paragraph> {
        self.all_paragraphs_mut().find(|p| p.id == id)
    }

    /// Current position of a body paragraph.
    pub fn paragraph_index(&self, id: ParagraphId) -> Option<usize> {
        self.paragraphs().position(|p| p.id == id)
    }

    fn next_paragraph_id(&mut self) -> ParagraphId {
        ParagraphId(self.ids.paragraph.next_id() as u64)
    }

    /// Give ids to paragraphs that have none, e.g. cells emptied by a merge.
    fn assign_missing_ids(&mut self) {
        let ids = &mut self.ids.paragraph;
        for element in self.body.iter_mut() {
            if let BodyElement::Table(table) = element {
                for paragraph in table.paragraphs_mut() {
                    if paragraph.id == ParagraphId::UNASSIGNED {
                        paragraph.id = ParagraphId(ids.next_id() as u64);
                    }
                }
            }
        }
    }

    pub(crate) fn insert_body_element(&mut self, index: Option<usize>, element: BodyElement) {
        let pos = index.map_or(self.body.len(), |i| i.min(self.body.len()));
        self.body.insert(pos, element);
    }

    /// Insert a paragraph at paragraph position `index` (clamped to
    /// `0..=paragraph_count`); `None` appends to the body.
    ///
    /// The paragraph gets a fresh id whatever id it carried before.
    pub fn insert_paragraph(&mut self, mut paragraph: Paragraph, index: Option<usize>) -> ParagraphId {
        let id = self.next_paragraph_id();
        paragraph.id = id;
        let pos = match index {
            Some(i) => self.paragraph_position(i).unwrap_or(self.body.len()),
            None => self.body.len(),
        };
        self.body.insert(pos, BodyElement::Paragraph(paragraph));
        id
    }

    pub fn append_paragraph(&mut self, paragraph: Paragraph) -> ParagraphId {
        self.insert_paragraph(paragraph, None)
    }

    /// Append a paragraph holding `text` as one run.
    pub fn add_paragraph(&mut self, text: &str) -> ParagraphId {
        self.append_paragraph(Paragraph::with_text(text))
    }

    /// Replace a paragraph's runs by one text run, keeping the first run's format.
    pub fn update_paragraph(&mut self, index: usize, text: &str) -> Result<()> {
        self.paragraph_mut(index)?.set_text(text);
        Ok(())
    }

    /// Remove a paragraph together with the comments, notes, bookmarks and
    /// revisions anchored to it.
    pub fn delete_paragraph(&mut self, index: usize) -> Result<Paragraph> {
        let pos = self.paragraph_position(index)?;
        match self.body.remove(pos) {
            BodyElement::Paragraph(paragraph) => {
                self.drop_anchored(paragraph.id);
                Ok(paragraph)
            },
            other => {
                self.body.insert(pos, other);
                Err(OoxmlError::invalid_index("paragraph", index, self.paragraph_count()))
            },
        }
    }

    pub(crate) fn remove_paragraph_by_id(&mut self, id: ParagraphId) -> Option<Paragraph> {
        let index = self.paragraph_index(id)?;
        self.delete_paragraph(index).ok()
    }

    fn drop_anchored(&mut self, id: ParagraphId) {
        let before = (
            self.comments.len(),
            self.footnotes.len() + self.endnotes.len(),
            self.bookmarks.len(),
        );
        self.comments.retain(|c| c.paragraph != id);
        self.footnotes.retain(|n| n.paragraph != id);
        self.endnotes.retain(|n| n.paragraph != id);
        let mut orphaned = Vec::new();
        self.bookmarks.retain(|b| {
            let keep = b.paragraph() != id;
            if !keep {
                orphaned.push(b.name().to_string());
            }
            keep
        });
        let links: usize = orphaned.iter().map(|name| self.unlink_bookmark(name)).sum();
        let revisions = self.revisions.drop_anchored(id);

        let dropped = (
            before.0 - self.comments.len(),
            before.1 - self.footnotes.len() - self.endnotes.len(),
            before.2 - self.bookmarks.len(),
        );
        if dropped != (0, 0, 0) || revisions > 0 {
            log::debug!(
                "removed {id}: dropped {} comments, {} notes, {} bookmarks, {revisions} revisions",
                dropped.0,
                dropped.1,
                dropped.2
            );
        }
        if links > 0 {
            log::debug!("removed {id}: unwrapped {links} links to its bookmarks");
        }
    }

    /// Move comments, notes and bookmarks from one paragraph to another.
    pub(crate) fn reanchor(&mut self, from: ParagraphId, to: ParagraphId) {
        let mut moved = 0;
        for anchor in self
            .comments
            .iter_mut()
            .map(|c| &mut c.paragraph)
            .chain(self.footnotes.iter_mut().map(|n| &mut n.paragraph))
            .chain(self.endnotes.iter_mut().map(|n| &mut n.paragraph))
            .chain(self.bookmarks.iter_mut().map(|b| &mut b.paragraph))
            .filter(|anchor| **anchor == from)
        {
            *anchor = to;
            moved += 1;
        }
        if moved > 0 {
            log::debug!("moved {moved} annotations from {from} to {to}");
        }
    }

    /// Replace `find` with `replace` in text runs, in reading order, tables
    /// included. Matches do not span runs.
    ///
    /// With `all == false` only the first occurrence in the document is
    /// replaced. Returns the number of replacements.
    pub fn replace_text(&mut self, find: &str, replace: &str, all: bool) -> usize {
        if find.is_empty() {
            return 0;
        }
        let mut count = 0;
        for paragraph in self.all_paragraphs_mut() {
            for run in paragraph.runs.iter_mut() {
                let RunContent::Text(ref mut text) = run.content else {
                    continue;
                };
                if !text.contains(find) {
                    continue;
                }
                if all {
                    count += text.matches(find).count();
                    *text = text.replace(find, replace);
                } else {
                    *text = text.replacen(find, replace, 1);
                    return 1;
                }
            }
        }
        count
    }

    /// Merge run formatting into every run of a paragraph.
    pub fn format_paragraph(&mut self, index: usize, properties: &RunProperties) -> Result<()> {
        for run in self.paragraph_mut(index)?.runs.iter_mut() {
            run.properties.merge(properties);
        }
        Ok(())
    }

    pub fn set_paragraph_format(&mut self, index: usize, properties: &ParagraphProperties) -> Result<()> {
        self.paragraph_mut(index)?.properties.merge(properties);
        Ok(())
    }

    pub fn apply_style(&mut self, index: usize, style_id: &str) -> Result<()> {
        self.paragraph(index)?;
        if !self.styles.contains(style_id) {
            return Err(OoxmlError::not_found("style", style_id));
        }
        self.paragraph_mut(index)?.properties.style = Some(style_id.to_string());
        Ok(())
    }

    /// Append a field run to a paragraph.
    pub fn insert_field(&mut self, paragraph_index: usize, field: Field) -> Result<()> {
        self.paragraph_mut(paragraph_index)?
            .add_run(Run::new(RunContent::Field(field)));
        Ok(())
    }

    /// Insert a table at body position `index` (clamped; `None` appends).
    /// Returns the table's index among tables.
    pub fn insert_table(&mut self, table: Table, index: Option<usize>) -> usize {
        self.insert_body_element(index, BodyElement::Table(table));
        self.assign_missing_ids();
        let pos = index.map_or(self.body.len() - 1, |i| i.min(self.body.len() - 1));
        self.body[..pos]
            .iter()
            .filter(|e| matches!(e, BodyElement::Table(_)))
            .count()
    }

    pub fn table(&self, index: usize) -> Result<&Table> {
        self.tables()
            .nth(index)
            .ok_or_else(|| OoxmlError::invalid_index("table", index, self.table_count()))
    }

    pub fn table_mut(&mut self, index: usize) -> Result<&mut Table> {
        let pos = self.table_position(index)?;
        match &mut self.body[pos] {
            BodyElement::Table(t) => Ok(t),
            _ => Err(OoxmlError::invalid_index("table", index, pos)),
        }
    }

    pub fn update_cell(&mut self, table: usize, row: usize, col: usize, text: &str) -> Result<()> {
        self.table_mut(table)?.checked_cell_mut(row, col)?.set_text(text);
        self.assign_missing_ids();
        Ok(())
    }

    pub fn merge_cells_horizontal(
        &mut self,
        table: usize,
        row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Result<()> {
        self.table_mut(table)?.merge_horizontal(row, start_col, end_col)?;
        self.assign_missing_ids();
        Ok(())
    }

    pub fn merge_cells_vertical(
        &mut self,
        table: usize,
        col: usize,
        start_row: usize,
        end_row: usize,
    ) -> Result<()> {
        self.table_mut(table)?.merge_vertical(col, start_row, end_row)?;
        self.assign_missing_ids();
        Ok(())
    }

    pub fn set_cell_shading(&mut self, table: usize, row: usize, col: usize, fill: Color) -> Result<()> {
        self.table_mut(table)?.checked_cell_mut(row, col)?.set_shading(fill);
        Ok(())
    }

    /// Remove a table and everything anchored to its cell paragraphs.
    pub fn delete_table(&mut self, index: usize) -> Result<Table> {
        let pos = self.table_position(index)?;
        match self.body.remove(pos) {
            BodyElement::Table(table) => {
                let ids: Vec<ParagraphId> = table.paragraphs().map(Paragraph::id).collect();
                for id in ids {
                    self.drop_anchored(id);
                }
                Ok(table)
            },
            other => {
                self.body.insert(pos, other);
                Err(OoxmlError::invalid_index("table", index, self.table_count()))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::format::ParagraphAlignment;
    use proptest::prelude::*;

    fn texts(doc: &Document) -> Vec<String> {
        doc.paragraphs().map(Paragraph::text).collect()
    }

    #[test]
    fn test_create_empty_document() {
        let doc = Document::new();
        assert_eq!(doc.paragraph_count(), 0);
        assert_eq!(doc.table_count(), 0);
        assert!(doc.styles().contains("Normal"));
    }

    #[test]
    fn test_insert_index_is_clamped() {
        let mut doc = Document::new();
        doc.add_paragraph("b");
        doc.insert_paragraph(Paragraph::with_text("a"), Some(0));
        doc.insert_paragraph(Paragraph::with_text("z"), Some(99));
        assert_eq!(texts(&doc), ["a", "b", "z"]);
    }

    #[test]
    fn test_paragraph_ids_are_stable_and_unique() {
        let mut doc = Document::new();
        let a = doc.add_paragraph("a");
        let b = doc.add_paragraph("b");
        doc.delete_paragraph(0).unwrap();
        let c = doc.add_paragraph("c");
        assert_ne!(a, c);
        assert!(c > b);
        assert_eq!(doc.paragraph_index(b), Some(0));
        assert_eq!(doc.paragraph_index(a), None);
    }

    #[test]
    fn test_index_errors() {
        let mut doc = Document::new();
        doc.add_paragraph("only");
        assert!(matches!(
            doc.update_paragraph(1, "x"),
            Err(OoxmlError::InvalidIndex { index: 1, len: 1, .. })
        ));
        assert!(doc.delete_paragraph(5).is_err());
        assert!(doc.table(0).is_err());
        assert_eq!(texts(&doc), ["only"]);
    }

    #[test]
    fn test_delete_paragraph_cascades() {
        let mut doc = Document::new();
        doc.add_paragraph("first");
        doc.add_paragraph("second");
        doc.add_comment(0, "Ann", "note", None).unwrap();
        doc.insert_footnote(0, "source").unwrap();
        doc.insert_bookmark(0, "start").unwrap();
        doc.add_comment(1, "Bob", "keep", None).unwrap();

        doc.delete_paragraph(0).unwrap();
        assert_eq!(doc.comments().len(), 1);
        assert_eq!(doc.comments()[0].author(), "Bob");
        assert!(doc.footnotes().is_empty());
        assert!(doc.bookmarks().is_empty());
        // Ids keep counting after the cascade.
        assert_eq!(doc.next_footnote_id(), 2);
    }

    #[test]
    fn test_replace_text_first_and_all() {
        let mut doc = Document::new();
        doc.add_paragraph("cat and cat");
        doc.add_paragraph("cat");
        let mut table = Table::new(1, 1);
        table.cell_mut(0, 0).unwrap().set_text("cat");
        doc.insert_table(table, None);

        let mut once = doc.clone();
        assert_eq!(once.replace_text("cat", "dog", false), 1);
        assert_eq!(texts(&once), ["dog and cat", "cat"]);

        assert_eq!(doc.replace_text("cat", "dog", true), 4);
        assert_eq!(doc.table(0).unwrap().cell(0, 0).unwrap().text(), "dog");
        assert_eq!(doc.replace_text("", "x", true), 0);
        assert_eq!(doc.replace_text("cat", "x", true), 0);
    }

    #[test]
    fn test_formatting_ops() {
        let mut doc = Document::new();
        doc.add_paragraph("text");
        doc.format_paragraph(0, &RunProperties::new().bold()).unwrap();
        doc.format_paragraph(0, &RunProperties::new().italic()).unwrap();
        let run = &doc.paragraph(0).unwrap().runs()[0];
        assert!(run.properties().is_bold() && run.properties().is_italic());

        doc.set_paragraph_format(0, &ParagraphProperties::new().alignment(ParagraphAlignment::Right))
            .unwrap();
        assert_eq!(
            doc.paragraph(0).unwrap().properties().alignment,
            Some(ParagraphAlignment::Right)
        );

        assert!(matches!(
            doc.apply_style(0, "NoSuchStyle"),
            Err(OoxmlError::NotFound { .. })
        ));
        doc.apply_style(0, "Heading1").unwrap();
        assert_eq!(doc.paragraph(0).unwrap().style(), Some("Heading1"));
    }

    #[test]
    fn test_tables() {
        let mut doc = Document::new();
        doc.add_paragraph("before");
        let t = doc.insert_table(Table::new(2, 3), None);
        assert_eq!(t, 0);
        doc.update_cell(0, 1, 2, "x").unwrap();
        assert!(doc.update_cell(0, 2, 0, "x").is_err());
        assert!(doc.update_cell(1, 0, 0, "x").is_err());

        doc.merge_cells_horizontal(0, 0, 0, 1).unwrap();
        let row = &doc.table(0).unwrap().rows()[0];
        assert_eq!(row.cells()[0].grid_span(), 2);
        assert!(row.cells()[1].is_h_merged());
        assert!(!row.cells()[2].is_h_merged());
        let other = &doc.table(0).unwrap().rows()[1];
        assert!(other.cells().iter().all(|c| c.grid_span() == 1 && !c.is_h_merged()));

        doc.set_cell_shading(0, 1, 1, Color::parse("FFEEDD").unwrap()).unwrap();
        assert!(doc.all_paragraphs().all(|p| p.id() != ParagraphId::UNASSIGNED));

        // Table inserted before the first one takes index 0.
        assert_eq!(doc.insert_table(Table::new(1, 1), Some(0)), 0);
        assert_eq!(doc.table(1).unwrap().column_count(), 3);
        doc.delete_table(0).unwrap();
        assert_eq!(doc.table_count(), 1);
        assert_eq!(texts(&doc), ["before"]);
    }

    #[test]
    fn test_insert_field() {
        let mut doc = Document::new();
        doc.add_paragraph("Page ");
        doc.insert_field(0, Field::page()).unwrap();
        assert!(matches!(
            doc.paragraph(0).unwrap().runs()[1].content(),
            RunContent::Field(_)
        ));
        assert!(doc.insert_field(3, Field::page()).is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut doc = Document::new();
        doc.add_paragraph("shared?");
        let copy = doc.clone();
        doc.update_paragraph(0, "changed").unwrap();
        assert_eq!(copy.paragraph(0).unwrap().text(), "shared?");
    }

    proptest! {
        #[test]
        fn prop_insert_then_delete_restores(
            initial in prop::collection::vec("[a-z ]{0,12}", 0..8),
            index in 0usize..10,
            text in "[a-z]{1,8}",
        ) {
            let mut doc = Document::new();
            for t in &initial {
                doc.add_paragraph(t);
            }
            let before: Vec<(ParagraphId, String)> =
                doc.paragraphs().map(|p| (p.id(), p.text())).collect();

            let index = index.min(initial.len());
            doc.insert_paragraph(Paragraph::with_text(&text), Some(index));
            prop_assert_eq!(doc.paragraph(index).unwrap().text(), text);
            doc.delete_paragraph(index).unwrap();

            let after: Vec<(ParagraphId, String)> =
                doc.paragraphs().map(|p| (p.id(), p.text())).collect();
            prop_assert_eq!(before, after);
        }
    }
}
