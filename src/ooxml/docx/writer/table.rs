/// Table types and implementation for DOCX documents.
use crate::common::unit::Twips;
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::{Border, BorderStyle, Color, Shading};
use crate::ooxml::error::{OoxmlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use super::paragraph::Paragraph;
use super::relmap::RenderContext;

/// Usable text width of a Letter page with 1" margins.
const DEFAULT_TABLE_WIDTH: Twips = Twips(9360);

/// Table borders (all sides).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBorders {
    pub top: Option<Border>,
    pub left: Option<Border>,
    pub bottom: Option<Border>,
    pub right: Option<Border>,
    pub inside_h: Option<Border>,
    pub inside_v: Option<Border>,
}

impl TableBorders {
    /// The same border everywhere, inside lines included.
    pub fn all(border: Border) -> Self {
        Self {
            top: Some(border.clone()),
            left: Some(border.clone()),
            bottom: Some(border.clone()),
            right: Some(border.clone()),
            inside_h: Some(border.clone()),
            inside_v: Some(border),
        }
    }

    pub fn none() -> Self {
        Self::all(Border::new(BorderStyle::None, 0, None))
    }

    fn write_xml(&self, xml: &mut String, element: &str) -> Result<()> {
        write!(xml, "<w:{element}>")?;
        for (edge, border) in [
            ("top", &self.top),
            ("left", &self.left),
            ("bottom", &self.bottom),
            ("right", &self.right),
            ("insideH", &self.inside_h),
            ("insideV", &self.inside_v),
        ] {
            if let Some(border) = border {
                border.write_xml(xml, edge)?;
            }
        }
        write!(xml, "</w:{element}>")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableWidth {
    Auto,
    /// Whole percent of the text width
    Percent(u32),
    Fixed(Twips),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableAlignment {
    Left,
    Center,
    Right,
}

impl TableAlignment {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellVerticalAlign {
    Top,
    Center,
    Bottom,
}

impl CellVerticalAlign {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

/// Vertical merge state of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VMerge {
    /// First cell of a vertically merged block
    Restart,
    /// Covered by the cell above
    Continue,
}

/// Cell properties.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CellProperties {
    pub shading: Option<Shading>,
    pub width: Option<Twips>,
    pub vertical_align: Option<CellVerticalAlign>,
    /// Cell borders (if different from table borders)
    pub borders: Option<TableBorders>,
}

/// A table cell.
///
/// Every row keeps one `Cell` per logical column, merged or not. A span start
/// has `grid_span > 1` and the cells it covers are flagged `h_merged`; those
/// are left out of the XML.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) paragraphs: Vec<Paragraph>,
    pub(crate) properties: CellProperties,
    pub(crate) grid_span: u32,
    pub(crate) h_merged: bool,
    pub(crate) v_merge: Option<VMerge>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl Cell {
    pub fn new() -> Self {
        Self {
            paragraphs: vec![Paragraph::new()],
            properties: CellProperties::default(),
            grid_span: 1,
            h_merged: false,
            v_merge: None,
        }
    }

    pub fn with_text(text: &str) -> Self {
        let mut cell = Self::new();
        cell.set_text(text);
        cell
    }

    /// Replace the cell content by a single paragraph.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs.clear();
        self.paragraphs.push(Paragraph::with_text(text));
    }

    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut Vec<Paragraph> {
        &mut self.paragraphs
    }

    pub fn properties(&self) -> &CellProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut CellProperties {
        &mut self.properties
    }

    pub fn set_shading(&mut self, fill: Color) {
        self.properties.shading = Some(Shading::new(fill));
    }

    #[inline]
    pub fn grid_span(&self) -> u32 {
        self.grid_span
    }

    #[inline]
    pub fn is_h_merged(&self) -> bool {
        self.h_merged
    }

    #[inline]
    pub fn v_merge(&self) -> Option<VMerge> {
        self.v_merge
    }

    fn is_merged(&self) -> bool {
        self.h_merged || self.grid_span > 1 || self.v_merge.is_some()
    }

    /// Move paragraphs of a cell swallowed by a merge into this one.
    fn absorb(&mut self, other: &mut Cell) {
        let taken = std::mem::replace(&mut other.paragraphs, vec![Paragraph::new()]);
        let has_text = taken.iter().any(|p| !p.runs.is_empty());
        if has_text {
            if self.paragraphs.iter().all(|p| p.runs.is_empty()) {
                self.paragraphs = taken;
            } else {
                self.paragraphs.extend(taken);
            }
        }
    }

    fn write_xml(&self, xml: &mut String, v_merge: Option<VMerge>, ctx: &RenderContext<'_>) -> Result<()> {
        xml.push_str("<w:tc><w:tcPr>");

        if let Some(width) = self.properties.width {
            write!(xml, r#"<w:tcW w:w="{width}" w:type="dxa"/>"#)?;
        }
        if self.grid_span > 1 {
            write!(xml, r#"<w:gridSpan w:val="{}"/>"#, self.grid_span)?;
        }
        match v_merge {
            Some(VMerge::Restart) => xml.push_str(r#"<w:vMerge w:val="restart"/>"#),
            Some(VMerge::Continue) => xml.push_str("<w:vMerge/>"),
            None => {},
        }
        if let Some(ref borders) = self.properties.borders {
            borders.write_xml(xml, "tcBorders")?;
        }
        if let Some(ref shading) = self.properties.shading {
            shading.write_xml(xml)?;
        }
        if let Some(align) = self.properties.vertical_align {
            write!(xml, r#"<w:vAlign w:val="{}"/>"#, align.as_str())?;
        }
        xml.push_str("</w:tcPr>");

        if self.paragraphs.is_empty() {
            // A cell must end with a paragraph.
            xml.push_str("<w:p/>");
        }
        for paragraph in &self.paragraphs {
            paragraph.write_xml(xml, ctx)?;
        }

        xml.push_str("</w:tc>");
        Ok(())
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub(crate) cells: Vec<Cell>,
    pub(crate) height: Option<Twips>,
    /// Repeat as header row on each page
    pub(crate) header: bool,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Self {
            cells: (0..cols).map(|_| Cell::new()).collect(),
            height: None,
            header: false,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn set_height(&mut self, height: Twips) {
        self.height = Some(height);
    }

    pub fn set_header(&mut self, header: bool) {
        self.header = header;
    }
}

/// A table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub(crate) rows: Vec<Row>,
    pub(crate) width: TableWidth,
    pub(crate) borders: TableBorders,
    pub(crate) alignment: Option<TableAlignment>,
    pub(crate) style: Option<String>,
}

impl Table {
    /// An empty `rows` x `cols` grid with single-line borders.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| Row::new(cols)).collect(),
            width: TableWidth::Percent(100),
            borders: TableBorders::all(Border::new(BorderStyle::Single, 4, None)),
            alignment: None,
            style: None,
        }
    }

    /// Build a table from a text grid; short rows are padded with empty cells.
    pub fn from_data<S: AsRef<str>>(data: &[Vec<S>]) -> Self {
        let cols = data.iter().map(Vec::len).max().unwrap_or(0);
        let mut table = Self::new(data.len(), cols);
        for (row, values) in table.rows.iter_mut().zip(data) {
            for (cell, value) in row.cells.iter_mut().zip(values) {
                cell.set_text(value.as_ref());
            }
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Logical column count.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// Append an empty row matching the column count.
    pub fn add_row(&mut self) -> &mut Row {
        let cols = self.column_count();
        self.rows.push(Row::new(cols));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.get(col)
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row)?.cells.get_mut(col)
    }

    /// Resolve a cell position, reporting which coordinate is out of range.
    pub(crate) fn checked_cell_mut(&mut self, row: usize, col: usize) -> Result<&mut Cell> {
        let rows = self.rows.len();
        let r = self
            .rows
            .get_mut(row)
            .ok_or_else(|| OoxmlError::invalid_index("row", row, rows))?;
        let cols = r.cells.len();
        r.cells
            .get_mut(col)
            .ok_or_else(|| OoxmlError::invalid_index("column", col, cols))
    }

    pub fn set_width(&mut self, width: TableWidth) {
        self.width = width;
    }

    pub fn set_borders(&mut self, borders: TableBorders) {
        self.borders = borders;
    }

    pub fn set_alignment(&mut self, alignment: TableAlignment) {
        self.alignment = Some(alignment);
    }

    pub fn set_style(&mut self, style_id: &str) {
        self.style = Some(style_id.to_string());
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Merge columns `start_col..=end_col` of one row into a single span.
    ///
    /// Text of the covered cells moves into the span start.
    ///
    /// # Errors
    ///
    /// `InvalidIndex` for an out-of-range row or column, an empty range, or a
    /// range touching a cell that is already merged.
    pub fn merge_horizontal(&mut self, row: usize, start_col: usize, end_col: usize) -> Result<()> {
        let rows = self.rows.len();
        let r = self
            .rows
            .get_mut(row)
            .ok_or_else(|| OoxmlError::invalid_index("row", row, rows))?;
        let cols = r.cells.len();
        if end_col >= cols {
            return Err(OoxmlError::invalid_index("column", end_col, cols));
        }
        if start_col >= end_col {
            return Err(OoxmlError::invalid_index("merge range", start_col, end_col));
        }
        if let Some(col) = (start_col..=end_col).find(|&c| r.cells[c].is_merged()) {
            return Err(OoxmlError::invalid_index("unmerged column", col, cols));
        }

        let (head, tail) = r.cells.split_at_mut(start_col + 1);
        let first = &mut head[start_col];
        for cell in &mut tail[..end_col - start_col] {
            first.absorb(cell);
            cell.h_merged = true;
        }
        first.grid_span = (end_col - start_col + 1) as u32;
        Ok(())
    }

    /// Merge rows `start_row..=end_row` of one column.
    pub fn merge_vertical(&mut self, col: usize, start_row: usize, end_row: usize) -> Result<()> {
        let rows = self.rows.len();
        if end_row >= rows {
            return Err(OoxmlError::invalid_index("row", end_row, rows));
        }
        if start_row >= end_row {
            return Err(OoxmlError::invalid_index("merge range", start_row, end_row));
        }
        for r in start_row..=end_row {
            let cols = self.rows[r].cells.len();
            let cell = self.rows[r]
                .cells
                .get(col)
                .ok_or_else(|| OoxmlError::invalid_index("column", col, cols))?;
            if cell.is_merged() {
                return Err(OoxmlError::invalid_index("unmerged row", r, rows));
            }
        }

        let (head, tail) = self.rows.split_at_mut(start_row + 1);
        let first = &mut head[start_row].cells[col];
        first.v_merge = Some(VMerge::Restart);
        for row in &mut tail[..end_row - start_row] {
            let cell = &mut row.cells[col];
            first.absorb(cell);
            cell.v_merge = Some(VMerge::Continue);
        }
        Ok(())
    }

    /// All paragraphs in cell order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .flat_map(|c| c.paragraphs.iter())
    }

    pub(crate) fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.rows
            .iter_mut()
            .flat_map(|r| r.cells.iter_mut())
            .flat_map(|c| c.paragraphs.iter_mut())
    }

    pub(crate) fn write_xml(&self, xml: &mut String, ctx: &RenderContext<'_>) -> Result<()> {
        xml.push_str("<w:tbl><w:tblPr>");
        if let Some(ref style) = self.style {
            write!(xml, r#"<w:tblStyle w:val="{}"/>"#, escape_xml(style))?;
        }
        match self.width {
            TableWidth::Auto => xml.push_str(r#"<w:tblW w:w="0" w:type="auto"/>"#),
            TableWidth::Percent(pct) => {
                write!(xml, r#"<w:tblW w:w="{}" w:type="pct"/>"#, pct * 50)?;
            },
            TableWidth::Fixed(w) => write!(xml, r#"<w:tblW w:w="{w}" w:type="dxa"/>"#)?,
        }
        if let Some(align) = self.alignment {
            write!(xml, r#"<w:jc w:val="{}"/>"#, align.as_str())?;
        }
        self.borders.write_xml(xml, "tblBorders")?;
        xml.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/>"#);
        xml.push_str("</w:tblPr>");

        let cols = self.column_count();
        if cols > 0 {
            let total = match self.width {
                TableWidth::Fixed(w) => w.0,
                _ => DEFAULT_TABLE_WIDTH.0,
            };
            let col_width = total / cols as i32;
            xml.push_str("<w:tblGrid>");
            for _ in 0..cols {
                write!(xml, r#"<w:gridCol w:w="{col_width}"/>"#)?;
            }
            xml.push_str("</w:tblGrid>");
        }

        // Effective vertical merge state of the previous row, after repairs.
        let mut above: Vec<Option<VMerge>> = Vec::new();
        for (r, row) in self.rows.iter().enumerate() {
            xml.push_str("<w:tr>");
            if row.height.is_some() || row.header {
                xml.push_str("<w:trPr>");
                if let Some(height) = row.height {
                    write!(xml, r#"<w:trHeight w:val="{height}"/>"#)?;
                }
                if row.header {
                    xml.push_str("<w:tblHeader/>");
                }
                xml.push_str("</w:trPr>");
            }

            let mut current = Vec::with_capacity(row.cells.len());
            for (c, cell) in row.cells.iter().enumerate() {
                let v_merge = match cell.v_merge {
                    Some(VMerge::Continue) if above.get(c).copied().flatten().is_none() => {
                        log::warn!(
                            "vertical merge continuation at row {r}, column {c} has no cell above to join; writing a plain cell"
                        );
                        None
                    },
                    other => other,
                };
                current.push(v_merge);
                if cell.h_merged {
                    continue;
                }
                cell.write_xml(xml, v_merge, ctx)?;
            }
            above = current;
            xml.push_str("</w:tr>");
        }

        xml.push_str("</w:tbl>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(table: &Table) -> String {
        let ctx = RenderContext::empty();
        let mut xml = String::new();
        table.write_xml(&mut xml, &ctx).unwrap();
        xml
    }

    #[test]
    fn test_from_data_pads_rows() {
        let table = Table::from_data(&[vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1].cells().len(), 3);
        assert_eq!(table.cell(1, 0).unwrap().text(), "d");
        assert_eq!(table.cell(1, 2).unwrap().text(), "");
    }

    #[test]
    fn test_horizontal_merge_2x3() {
        let mut table = Table::new(2, 3);
        table.merge_horizontal(0, 0, 1).unwrap();

        let row0 = &table.rows()[0];
        assert_eq!(row0.cells()[0].grid_span(), 2);
        assert!(row0.cells()[1].is_h_merged());
        assert!(!row0.cells()[2].is_h_merged());
        assert!(table.rows()[1].cells().iter().all(|c| c.grid_span() == 1 && !c.is_h_merged()));
        assert_eq!(table.column_count(), 3);

        let xml = render(&table);
        let first_row = &xml[xml.find("<w:tr>").unwrap()..xml.find("</w:tr>").unwrap()];
        assert_eq!(first_row.matches("<w:tc>").count(), 2);
        assert_eq!(xml.matches(r#"<w:gridSpan w:val="2"/>"#).count(), 1);
        assert_eq!(xml.matches("<w:tc>").count(), 5);
    }

    #[test]
    fn test_merge_moves_text() {
        let mut table = Table::from_data(&[vec!["left", "right"]]);
        table.merge_horizontal(0, 0, 1).unwrap();
        assert_eq!(table.cell(0, 0).unwrap().text(), "left\nright");
        assert_eq!(table.cell(0, 1).unwrap().text(), "");
    }

    #[test]
    fn test_invalid_merges() {
        let mut table = Table::new(2, 3);
        assert!(matches!(table.merge_horizontal(2, 0, 1), Err(OoxmlError::InvalidIndex { .. })));
        assert!(matches!(table.merge_horizontal(0, 0, 3), Err(OoxmlError::InvalidIndex { .. })));
        assert!(matches!(table.merge_horizontal(0, 1, 1), Err(OoxmlError::InvalidIndex { .. })));
        table.merge_horizontal(0, 0, 1).unwrap();
        assert!(matches!(table.merge_horizontal(0, 1, 2), Err(OoxmlError::InvalidIndex { .. })));
        assert!(matches!(table.merge_vertical(0, 0, 1), Err(OoxmlError::InvalidIndex { .. })));
    }

    #[test]
    fn test_vertical_merge_xml() {
        let mut table = Table::new(3, 2);
        table.merge_vertical(1, 0, 2).unwrap();
        let xml = render(&table);
        assert_eq!(xml.matches(r#"<w:vMerge w:val="restart"/>"#).count(), 1);
        assert_eq!(xml.matches("<w:vMerge/>").count(), 2);
    }

    #[test]
    fn test_dangling_continuation_written_plain() {
        let mut table = Table::new(2, 1);
        table.rows[1].cells[0].v_merge = Some(VMerge::Continue);
        let xml = render(&table);
        assert!(!xml.contains("<w:vMerge"));
    }

    #[test]
    fn test_table_properties_xml() {
        let mut table = Table::new(1, 2);
        table.set_style("TableGrid");
        table.set_alignment(TableAlignment::Center);
        table.set_width(TableWidth::Fixed(Twips(4000)));
        table.cell_mut(0, 0).unwrap().set_shading(Color::parse("FFFF00").unwrap());
        let xml = render(&table);
        assert!(xml.contains(r#"<w:tblStyle w:val="TableGrid"/>"#));
        assert!(xml.contains(r#"<w:tblW w:w="4000" w:type="dxa"/>"#));
        assert!(xml.contains(r#"<w:gridCol w:w="2000"/>"#));
        assert!(xml.contains(r#"w:fill="FFFF00""#));
    }
}
