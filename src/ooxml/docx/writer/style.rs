/// Style writer support for DOCX documents.
///
/// Styles live in a [`StyleSheet`] keyed by style id. `based_on` links form
/// an inheritance graph that must stay acyclic: the sheet rejects edits that
/// would close a loop and the serializer refuses to write one.
use crate::common::unit::{HalfPoints, Twips};
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::{
    CharacterSpacing, Color, LineSpacing, ParagraphProperties, RunProperties, UnderlineType,
    VerticalAlign,
};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace as ns;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as FmtWrite;

use super::doc::Document;

/// Kind of content a style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleType {
    fn to_xml(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Character => "character",
            Self::Table => "table",
            Self::Numbering => "numbering",
        }
    }
}

/// A style definition.
///
/// # Examples
///
/// ```
/// use quince::ooxml::docx::writer::{Style, StyleType};
/// use quince::ooxml::docx::format::RunProperties;
///
/// let style = Style::new("Callout", "Callout", StyleType::Paragraph)
///     .based_on("Normal")
///     .run(RunProperties::new().bold());
/// assert_eq!(style.based_on_id(), Some("Normal"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub(crate) id: String,
    pub name: String,
    pub style_type: StyleType,
    pub based_on: Option<String>,
    /// Style of the paragraph that follows one using this style
    pub next_style: Option<String>,
    pub is_default: bool,
    pub is_custom: bool,
    pub ui_priority: Option<u32>,
    pub quick_format: bool,
    pub hidden: bool,
    pub paragraph: ParagraphProperties,
    pub run: RunProperties,
}

impl Style {
    /// Create a custom style with the given ID, name, and type.
    pub fn new(id: &str, name: &str, style_type: StyleType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            style_type,
            based_on: None,
            next_style: None,
            is_default: false,
            is_custom: true,
            ui_priority: None,
            quick_format: false,
            hidden: false,
            paragraph: ParagraphProperties::default(),
            run: RunProperties::default(),
        }
    }

    fn builtin(id: &str, name: &str, style_type: StyleType, priority: u32) -> Self {
        let mut style = Self::new(id, name, style_type);
        style.is_custom = false;
        style.ui_priority = Some(priority);
        style
    }

    pub fn based_on(mut self, parent: &str) -> Self {
        self.based_on = Some(parent.to_string());
        self
    }

    pub fn next(mut self, next: &str) -> Self {
        self.next_style = Some(next.to_string());
        self
    }

    pub fn paragraph(mut self, properties: ParagraphProperties) -> Self {
        self.paragraph = properties;
        self
    }

    pub fn run(mut self, properties: RunProperties) -> Self {
        self.run = properties;
        self
    }

    pub fn quick(mut self) -> Self {
        self.quick_format = true;
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn based_on_id(&self) -> Option<&str> {
        self.based_on.as_deref()
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:style w:type="{}" w:styleId="{}""#,
            self.style_type.to_xml(),
            escape_xml(&self.id)
        )?;
        if self.is_default {
            xml.push_str(r#" w:default="1""#);
        }
        if self.is_custom {
            xml.push_str(r#" w:customStyle="1""#);
        }
        xml.push('>');

        write!(xml, r#"<w:name w:val="{}"/>"#, escape_xml(&self.name))?;
        if let Some(ref based_on) = self.based_on {
            write!(xml, r#"<w:basedOn w:val="{}"/>"#, escape_xml(based_on))?;
        }
        if let Some(ref next) = self.next_style {
            write!(xml, r#"<w:next w:val="{}"/>"#, escape_xml(next))?;
        }
        if let Some(priority) = self.ui_priority {
            write!(xml, r#"<w:uiPriority w:val="{priority}"/>"#)?;
        }
        if self.hidden {
            xml.push_str("<w:semiHidden/><w:unhideWhenUsed/>");
        }
        if self.quick_format {
            xml.push_str("<w:qFormat/>");
        }

        // Paragraph properties only mean something on paragraph and table styles.
        if matches!(self.style_type, StyleType::Paragraph | StyleType::Table) {
            self.paragraph.write_xml(xml, "")?;
        }
        self.run.write_xml(xml, "")?;

        xml.push_str("</w:style>");
        Ok(())
    }

    /// Factory methods for common built-in styles
    ///
    /// The base paragraph style: Calibri 11pt.
    pub fn normal() -> Self {
        let mut style = Self::builtin("Normal", "Normal", StyleType::Paragraph, 0).quick();
        style.is_default = true;
        style
    }

    pub fn default_paragraph_font() -> Self {
        let mut style = Self::builtin(
            "DefaultParagraphFont",
            "Default Paragraph Font",
            StyleType::Character,
            1,
        );
        style.is_default = true;
        style.hidden = true;
        style
    }

    pub fn title() -> Self {
        Self::builtin("Title", "Title", StyleType::Paragraph, 10)
            .based_on("Normal")
            .next("Normal")
            .quick()
            .paragraph(ParagraphProperties::new().space_after(Twips(0)).line_spacing(LineSpacing::Single))
            .run(RunProperties::new().font("Calibri Light").size_pt(28).spacing(
                CharacterSpacing {
                    kern: Some(HalfPoints::from_pt(14)),
                    spacing: Some(Twips(-10)),
                    position: None,
                },
            ))
    }

    pub fn subtitle() -> Self {
        Self::builtin("Subtitle", "Subtitle", StyleType::Paragraph, 11)
            .based_on("Normal")
            .next("Normal")
            .quick()
            .run(RunProperties::new().size_pt(14).color(rgb("5A5A5A")))
    }

    /// Heading levels 1 to 3; other levels fall back to level 3 sizing.
    pub fn heading(level: u8) -> Self {
        let (size, color, before) = match level {
            1 => (16, "2F5496", 240),
            2 => (13, "2F5496", 40),
            _ => (12, "1F3763", 40),
        };
        Self::builtin(
            &format!("Heading{level}"),
            &format!("heading {level}"),
            StyleType::Paragraph,
            9,
        )
        .based_on("Normal")
        .next("Normal")
        .quick()
        .paragraph(
            ParagraphProperties::new()
                .space_before(Twips(before))
                .space_after(Twips(0))
                .keep_next(),
        )
        .run(RunProperties::new().font("Calibri Light").size_pt(size).color(rgb(color)))
    }

    pub fn quote() -> Self {
        Self::builtin("Quote", "Quote", StyleType::Paragraph, 29)
            .based_on("Normal")
            .next("Normal")
            .quick()
            .paragraph(ParagraphProperties::new().indent(Some(Twips(864)), Some(Twips(864)), None))
            .run(RunProperties::new().italic().color(rgb("404040")))
    }

    pub fn list_paragraph() -> Self {
        Self::builtin("ListParagraph", "List Paragraph", StyleType::Paragraph, 34)
            .based_on("Normal")
            .quick()
            .paragraph(ParagraphProperties::new().indent(Some(Twips(720)), None, None))
    }

    pub fn hyperlink() -> Self {
        Self::builtin("Hyperlink", "Hyperlink", StyleType::Character, 99)
            .based_on("DefaultParagraphFont")
            .run(RunProperties::new().color(rgb("0563C1")).underline(UnderlineType::Single))
    }

    pub fn footnote_text() -> Self {
        Self::note_text("FootnoteText", "footnote text")
    }

    pub fn endnote_text() -> Self {
        Self::note_text("EndnoteText", "endnote text")
    }

    fn note_text(id: &str, name: &str) -> Self {
        let mut style = Self::builtin(id, name, StyleType::Paragraph, 99)
            .based_on("Normal")
            .paragraph(ParagraphProperties::new().space_after(Twips(0)).line_spacing(LineSpacing::Single))
            .run(RunProperties::new().size_pt(10));
        style.hidden = true;
        style
    }

    pub fn footnote_reference() -> Self {
        Self::note_reference("FootnoteReference", "footnote reference")
    }

    pub fn endnote_reference() -> Self {
        Self::note_reference("EndnoteReference", "endnote reference")
    }

    fn note_reference(id: &str, name: &str) -> Self {
        let mut style = Self::builtin(id, name, StyleType::Character, 99)
            .based_on("DefaultParagraphFont")
            .run(RunProperties::new().vertical_align(VerticalAlign::Superscript));
        style.hidden = true;
        style
    }

    pub fn comment_text() -> Self {
        let mut style = Self::builtin("CommentText", "annotation text", StyleType::Paragraph, 99)
            .based_on("Normal")
            .run(RunProperties::new().size_pt(10));
        style.hidden = true;
        style
    }

    pub fn comment_reference() -> Self {
        let mut style =
            Self::builtin("CommentReference", "annotation reference", StyleType::Character, 99)
                .based_on("DefaultParagraphFont")
                .run(RunProperties::new().size(HalfPoints(16)));
        style.hidden = true;
        style
    }

    pub fn toc_heading() -> Self {
        Self::builtin("TOCHeading", "TOC Heading", StyleType::Paragraph, 39)
            .based_on("Heading1")
            .next("Normal")
            .quick()
    }

    /// TOC entry style for levels 1 to 3.
    pub fn toc(level: u8) -> Self {
        Self::builtin(
            &format!("TOC{level}"),
            &format!("toc {level}"),
            StyleType::Paragraph,
            39,
        )
        .based_on("Normal")
        .next("Normal")
        .paragraph(
            ParagraphProperties::new()
                .space_after(Twips(100))
                .indent(Some(Twips(220 * (i32::from(level) - 1))), None, None),
        )
    }

    pub fn table_grid() -> Self {
        Self::builtin("TableGrid", "Table Grid", StyleType::Table, 39)
            .paragraph(ParagraphProperties::new().space_after(Twips(0)).line_spacing(LineSpacing::Single))
    }
}

fn rgb(hex: &'static str) -> Color {
    Color::from_static(hex)
}

/// All styles of a document, in definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub(crate) styles: Vec<Style>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleSheet {
    /// A sheet with no styles at all.
    pub fn empty() -> Self {
        Self { styles: Vec::new() }
    }

    /// The built-in styles every new document starts with.
    pub fn builtin() -> Self {
        Self {
            styles: vec![
                Style::normal(),
                Style::default_paragraph_font(),
                Style::title(),
                Style::subtitle(),
                Style::heading(1),
                Style::heading(2),
                Style::heading(3),
                Style::quote(),
                Style::list_paragraph(),
                Style::hyperlink(),
                Style::footnote_text(),
                Style::footnote_reference(),
                Style::endnote_text(),
                Style::endnote_reference(),
                Style::comment_text(),
                Style::comment_reference(),
                Style::toc_heading(),
                Style::toc(1),
                Style::toc(2),
                Style::toc(3),
                Style::table_grid(),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Id of a style whose `based_on` chain loops back on itself.
    pub fn find_cycle(&self) -> Option<&str> {
        for style in &self.styles {
            let mut seen = HashSet::new();
            let mut current = Some(style);
            while let Some(s) = current {
                if !seen.insert(s.id.as_str()) {
                    return Some(s.id.as_str());
                }
                current = s.based_on.as_deref().and_then(|parent| self.get(parent));
            }
        }
        None
    }

    /// Styles whose parent is not defined, as `(style, missing parent)`.
    pub fn dangling_parents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles.iter().filter_map(|s| {
            s.based_on
                .as_deref()
                .filter(|parent| !self.contains(parent))
                .map(|parent| (s.id.as_str(), parent))
        })
    }

    pub fn add(&mut self, style: Style) -> Result<()> {
        if self.contains(&style.id) {
            return Err(OoxmlError::duplicate("style", style.id));
        }
        self.styles.push(style);
        if let Some(id) = self.find_cycle().map(str::to_string) {
            self.styles.pop();
            return Err(OoxmlError::StyleCycle(id));
        }
        Ok(())
    }

    /// Edit a style in place. The edit is rolled back if it creates a cycle.
    pub fn update<F: FnOnce(&mut Style)>(&mut self, id: &str, f: F) -> Result<()> {
        let pos = self
            .styles
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| OoxmlError::not_found("style", id))?;
        let before = self.styles[pos].clone();
        f(&mut self.styles[pos]);
        // The id is the key; edits never rename.
        self.styles[pos].id = before.id.clone();
        if let Some(cycle) = self.find_cycle().map(str::to_string) {
            self.styles[pos] = before;
            return Err(OoxmlError::StyleCycle(cycle));
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Style> {
        let pos = self
            .styles
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| OoxmlError::not_found("style", id))?;
        if self.styles[pos].is_default {
            return Err(OoxmlError::CannotDeleteDefault(id.to_string()));
        }
        Ok(self.styles.remove(pos))
    }

    /// Generate a complete styles.xml document.
    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(512 * self.styles.len() + 1024);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<w:styles xmlns:w="{}" xmlns:r="{}">"#,
            ns::WML_MAIN,
            ns::OFC_RELATIONSHIPS
        )?;

        xml.push_str("<w:docDefaults>");
        xml.push_str("<w:rPrDefault><w:rPr>");
        xml.push_str(r#"<w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/>"#);
        xml.push_str(r#"<w:sz w:val="22"/><w:szCs w:val="22"/>"#);
        xml.push_str(r#"<w:lang w:val="en-US" w:eastAsia="en-US" w:bidi="ar-SA"/>"#);
        xml.push_str("</w:rPr></w:rPrDefault>");
        xml.push_str(r#"<w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#);
        xml.push_str("</w:docDefaults>");

        for style in &self.styles {
            style.write_xml(&mut xml)?;
        }

        xml.push_str("</w:styles>");
        Ok(xml)
    }
}

impl Document {
    /// Add a style.
    ///
    /// # Errors
    ///
    /// `DuplicateIdentifier` if the id exists, `StyleCycle` if its `based_on`
    /// chain would loop.
    pub fn add_style(&mut self, style: Style) -> Result<()> {
        self.styles.add(style)
    }

    pub fn update_style<F: FnOnce(&mut Style)>(&mut self, id: &str, f: F) -> Result<()> {
        self.styles.update(id, f)
    }

    /// Delete a style. Paragraphs still referring to it keep the id.
    pub fn delete_style(&mut self, id: &str) -> Result<()> {
        self.styles.remove(id)?;
        log::debug!("deleted style {id}");
        Ok(())
    }

    pub fn style(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_styles() {
        let sheet = StyleSheet::builtin();
        for id in [
            "Normal", "Title", "Subtitle", "Heading1", "Heading2", "Heading3", "Quote",
            "ListParagraph", "Hyperlink", "FootnoteText", "FootnoteReference", "EndnoteText",
            "EndnoteReference", "TOCHeading", "TOC1", "TOC2", "TOC3", "DefaultParagraphFont",
        ] {
            assert!(sheet.contains(id), "missing {id}");
        }
        assert!(sheet.find_cycle().is_none());
        assert_eq!(sheet.dangling_parents().count(), 0);
    }

    #[test]
    fn test_add_duplicate_and_self_cycle() {
        let mut sheet = StyleSheet::builtin();
        assert!(matches!(
            sheet.add(Style::new("Normal", "Normal", StyleType::Paragraph)),
            Err(OoxmlError::DuplicateIdentifier { .. })
        ));
        assert!(matches!(
            sheet.add(Style::new("Loop", "Loop", StyleType::Paragraph).based_on("Loop")),
            Err(OoxmlError::StyleCycle(_))
        ));
        assert!(!sheet.contains("Loop"));
    }

    #[test]
    fn test_update_rejects_cycle() {
        let mut sheet = StyleSheet::builtin();
        sheet
            .add(Style::new("A", "A", StyleType::Paragraph).based_on("Normal"))
            .unwrap();
        sheet
            .add(Style::new("B", "B", StyleType::Paragraph).based_on("A"))
            .unwrap();
        let err = sheet.update("A", |s| s.based_on = Some("B".to_string()));
        assert!(matches!(err, Err(OoxmlError::StyleCycle(_))));
        assert_eq!(sheet.get("A").unwrap().based_on_id(), Some("Normal"));

        sheet.update("A", |s| s.name = "Renamed".to_string()).unwrap();
        assert_eq!(sheet.get("A").unwrap().name, "Renamed");
        assert!(sheet.update("Missing", |_| {}).is_err());
    }

    #[test]
    fn test_remove_default_rejected() {
        let mut sheet = StyleSheet::builtin();
        assert!(matches!(sheet.remove("Normal"), Err(OoxmlError::CannotDeleteDefault(_))));
        assert!(matches!(sheet.remove("Nope"), Err(OoxmlError::NotFound { .. })));
        sheet.remove("Quote").unwrap();
        assert!(!sheet.contains("Quote"));
    }

    #[test]
    fn test_style_xml() {
        let mut xml = String::new();
        Style::heading(1).write_xml(&mut xml).unwrap();
        assert!(xml.starts_with(r#"<w:style w:type="paragraph" w:styleId="Heading1">"#));
        assert!(xml.contains(r#"<w:basedOn w:val="Normal"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="32"/>"#));
        assert!(xml.contains("<w:keepNext/>"));

        let sheet = StyleSheet::builtin().to_xml().unwrap();
        assert!(sheet.contains("<w:docDefaults>"));
        assert_eq!(sheet.matches("<w:style ").count(), StyleSheet::builtin().len());
    }

    #[test]
    fn test_document_style_ops() {
        let mut doc = Document::new();
        doc.add_style(Style::new("Note", "Note", StyleType::Paragraph).based_on("Normal"))
            .unwrap();
        assert!(doc.style("Note").is_some());
        doc.delete_style("Note").unwrap();
        assert!(doc.style("Note").is_none());
    }
}
