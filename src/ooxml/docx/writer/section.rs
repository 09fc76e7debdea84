/// Page setup: page size, orientation, margins, columns and section breaks.
use crate::common::unit::Twips;
use crate::ooxml::error::{OoxmlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use super::doc::Document;
use super::run::{BreakKind, Run, RunContent};

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

impl PageOrientation {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Named paper sizes, given in portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSize {
    /// 8.5" x 11"
    Letter,
    /// 210mm x 297mm
    A4,
    /// 8.5" x 14"
    Legal,
    A3,
    A5,
    B5,
    /// 7.5" x 10"
    Executive,
    Custom { width: Twips, height: Twips },
}

impl PageSize {
    /// `(width, height)` in portrait orientation.
    pub fn dimensions(&self) -> (Twips, Twips) {
        match *self {
            Self::Letter => (Twips(12240), Twips(15840)),
            Self::A4 => (Twips(11906), Twips(16838)),
            Self::Legal => (Twips(12240), Twips(20160)),
            Self::A3 => (Twips(16838), Twips(23811)),
            Self::A5 => (Twips(8391), Twips(11906)),
            Self::B5 => (Twips(10319), Twips(14570)),
            Self::Executive => (Twips(10800), Twips(14400)),
            Self::Custom { width, height } => (width, height),
        }
    }
}

/// Page margins in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: Twips,
    pub right: Twips,
    pub bottom: Twips,
    pub left: Twips,
    /// Distance from the page edge to the header
    pub header: Twips,
    pub footer: Twips,
    pub gutter: Twips,
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::normal()
    }
}

impl PageMargins {
    fn uniform(vertical: i32, horizontal: i32) -> Self {
        Self {
            top: Twips(vertical),
            right: Twips(horizontal),
            bottom: Twips(vertical),
            left: Twips(horizontal),
            header: Twips(720),
            footer: Twips(720),
            gutter: Twips(0),
        }
    }

    /// 1" all round.
    pub fn normal() -> Self {
        Self::uniform(1440, 1440)
    }

    /// 0.5" all round.
    pub fn narrow() -> Self {
        Self::uniform(720, 720)
    }

    /// 1" top and bottom, 0.75" left and right.
    pub fn moderate() -> Self {
        Self::uniform(1440, 1080)
    }

    /// 1" top and bottom, 2" left and right.
    pub fn wide() -> Self {
        Self::uniform(1440, 2880)
    }

    /// Set margins in inches.
    pub fn inches(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top: Twips::from_inches_f64(top),
            right: Twips::from_inches_f64(right),
            bottom: Twips::from_inches_f64(bottom),
            left: Twips::from_inches_f64(left),
            ..Self::normal()
        }
    }
}

/// Newspaper-style text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Columns {
    pub count: u32,
    /// Gap between columns
    pub space: Twips,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            count: 1,
            space: Twips(720),
        }
    }
}

/// How a section starts relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionBreakType {
    NextPage,
    Continuous,
    EvenPage,
    OddPage,
}

impl SectionBreakType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::NextPage => "nextPage",
            Self::Continuous => "continuous",
            Self::EvenPage => "evenPage",
            Self::OddPage => "oddPage",
        }
    }
}

/// Section properties including page setup and margins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub page_width: Twips,
    pub page_height: Twips,
    pub orientation: PageOrientation,
    pub margins: PageMargins,
    pub columns: Columns,
    /// How this section starts; `None` means the default, a new page.
    pub start: Option<SectionBreakType>,
}

impl Default for SectionProperties {
    fn default() -> Self {
        Self::with_size(PageSize::Letter)
    }
}

impl SectionProperties {
    pub fn with_size(size: PageSize) -> Self {
        let (page_width, page_height) = size.dimensions();
        Self {
            page_width,
            page_height,
            orientation: PageOrientation::Portrait,
            margins: PageMargins::normal(),
            columns: Columns::default(),
            start: None,
        }
    }

    pub fn a4() -> Self {
        Self::with_size(PageSize::A4)
    }

    pub fn letter() -> Self {
        Self::default()
    }

    /// Set page to landscape orientation.
    pub fn landscape(mut self) -> Self {
        self.set_orientation(PageOrientation::Landscape);
        self
    }

    /// Change the paper size, keeping the current orientation.
    pub fn set_size(&mut self, size: PageSize) {
        let (w, h) = size.dimensions();
        let (short, long) = if w <= h { (w, h) } else { (h, w) };
        (self.page_width, self.page_height) = match self.orientation {
            PageOrientation::Portrait => (short, long),
            PageOrientation::Landscape => (long, short),
        };
    }

    /// Change orientation, swapping width and height when it flips.
    pub fn set_orientation(&mut self, orientation: PageOrientation) {
        if self.orientation != orientation {
            std::mem::swap(&mut self.page_width, &mut self.page_height);
            self.orientation = orientation;
        }
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<w:sectPr>");
        if let Some(start) = self.start {
            write!(xml, r#"<w:type w:val="{}"/>"#, start.as_str())?;
        }
        write!(
            xml,
            r#"<w:pgSz w:w="{}" w:h="{}""#,
            self.page_width, self.page_height
        )?;
        if self.orientation == PageOrientation::Landscape {
            write!(xml, r#" w:orient="{}""#, self.orientation.as_str())?;
        }
        xml.push_str("/>");

        let m = &self.margins;
        write!(
            xml,
            r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="{}"/>"#,
            m.top, m.right, m.bottom, m.left, m.header, m.footer, m.gutter
        )?;
        write!(
            xml,
            r#"<w:cols w:num="{}" w:space="{}"/>"#,
            self.columns.count, self.columns.space
        )?;
        xml.push_str(r#"<w:docGrid w:linePitch="360"/>"#);
        xml.push_str("</w:sectPr>");
        Ok(())
    }
}

impl Document {
    pub fn section(&self) -> &SectionProperties {
        &self.section
    }

    pub fn set_page_size(&mut self, size: PageSize) {
        self.section.set_size(size);
    }

    pub fn set_orientation(&mut self, orientation: PageOrientation) {
        self.section.set_orientation(orientation);
    }

    pub fn set_margins(&mut self, margins: PageMargins) {
        self.section.margins = margins;
    }

    /// Lay the text out in `count` columns; `space` defaults to 0.5".
    pub fn set_columns(&mut self, count: u32, space: Option<Twips>) -> Result<()> {
        if count == 0 {
            return Err(OoxmlError::InvalidValue("column count must be at least 1".to_string()));
        }
        self.section.columns = Columns {
            count,
            space: space.unwrap_or(Twips(720)),
        };
        Ok(())
    }

    /// End the current section after the paragraph at `paragraph_index`.
    ///
    /// The ended section keeps the current page setup; the section that
    /// follows starts as `kind` says.
    pub fn insert_section_break(
        &mut self,
        paragraph_index: usize,
        kind: SectionBreakType,
    ) -> Result<()> {
        let ended = self.section.clone();
        self.paragraph_mut(paragraph_index)?.section_break = Some(ended);
        self.section.start = Some(kind);
        Ok(())
    }

    pub fn insert_page_break(&mut self, paragraph_index: usize) -> Result<()> {
        self.paragraph_mut(paragraph_index)?
            .add_run(Run::new(RunContent::Break(BreakKind::Page)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(section: &SectionProperties) -> String {
        let mut xml = String::new();
        section.write_xml(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_default_letter() {
        let xml = render(&SectionProperties::default());
        assert!(xml.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
        assert!(xml.contains(r#"w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0""#));
        assert!(xml.contains(r#"<w:cols w:num="1" w:space="720"/>"#));
        assert!(xml.contains(r#"<w:docGrid w:linePitch="360"/>"#));
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let section = SectionProperties::a4().landscape();
        assert_eq!((section.page_width, section.page_height), (Twips(16838), Twips(11906)));
        assert!(render(&section).contains(r#"w:orient="landscape""#));

        let mut section = section;
        section.set_size(PageSize::Legal);
        assert_eq!((section.page_width, section.page_height), (Twips(20160), Twips(12240)));
    }

    #[test]
    fn test_margin_presets() {
        assert_eq!(PageMargins::narrow().left, Twips(720));
        assert_eq!(PageMargins::moderate().left, Twips(1080));
        assert_eq!(PageMargins::wide().right, Twips(2880));
        assert_eq!(PageMargins::inches(0.5, 1.0, 0.5, 1.0).top, Twips(720));
    }

    #[test]
    fn test_document_section_ops() {
        let mut doc = Document::new();
        doc.add_paragraph("Part one");
        doc.add_paragraph("Part two");
        doc.set_page_size(PageSize::A4);
        doc.set_orientation(PageOrientation::Landscape);
        assert!(doc.set_columns(0, None).is_err());
        doc.set_columns(2, None).unwrap();

        doc.insert_section_break(0, SectionBreakType::Continuous).unwrap();
        let ended = doc.paragraph(0).unwrap().section_break().unwrap();
        assert_eq!(ended.orientation, PageOrientation::Landscape);
        assert_eq!(doc.section().start, Some(SectionBreakType::Continuous));
        assert!(doc.insert_section_break(9, SectionBreakType::NextPage).is_err());

        doc.insert_page_break(1).unwrap();
        assert_eq!(
            doc.paragraph(1).unwrap().runs().last().unwrap().content(),
            &RunContent::Break(BreakKind::Page)
        );
    }
}
