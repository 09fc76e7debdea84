/// Document summaries and plain-text / Markdown renderings.
use serde::{Deserialize, Serialize};

use super::doc::{BodyElement, Document};
use super::paragraph::Paragraph;
use super::properties::AppStatistics;
use super::run::Run;
use super::table::Table;

/// Counts describing a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Body paragraphs, table cells excluded
    pub paragraphs: usize,
    pub tables: usize,
    pub words: usize,
    /// Non-whitespace characters, table cells included
    pub characters: usize,
    pub images: usize,
    pub comments: usize,
    pub footnotes: usize,
    pub endnotes: usize,
    pub revisions: usize,
    pub track_changes: bool,
}

/// Options for [`Document::to_markdown_with`].
///
/// ```
/// use quince::ooxml::docx::ExportOptions;
///
/// let options = ExportOptions::new().with_tables(false);
/// assert!(options.include_styles);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Render bold, italic and strikethrough markers
    pub include_styles: bool,
    /// Render tables as pipe tables; when off they are skipped
    pub include_tables: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_styles: true,
            include_tables: true,
        }
    }
}

impl ExportOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_styles(mut self, include: bool) -> Self {
        self.include_styles = include;
        self
    }

    #[inline]
    pub fn with_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }
}

impl Document {
    pub fn info(&self) -> DocumentInfo {
        let stats = AppStatistics::collect(self);
        DocumentInfo {
            paragraphs: self.paragraph_count(),
            tables: self.table_count(),
            words: stats.words,
            characters: stats.characters,
            images: self.images.len(),
            comments: self.comments.len(),
            footnotes: self.footnotes.len(),
            endnotes: self.endnotes.len(),
            revisions: self.revisions.len(),
            track_changes: self.revisions.is_enabled(),
        }
    }

    /// Plain text: one line per paragraph, table rows as tab-separated cells.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.body.len());
        for element in &self.body {
            match element {
                BodyElement::Paragraph(p) => lines.push(p.text()),
                BodyElement::Table(table) => {
                    for row in table.rows() {
                        let cells: Vec<String> = row
                            .cells()
                            .iter()
                            .filter(|c| !c.is_h_merged())
                            .map(|c| c.text().replace('\n', " "))
                            .collect();
                        lines.push(cells.join("\t"));
                    }
                },
                BodyElement::ContentControl(control) => {
                    if let Some(text) = control.text() {
                        lines.push(text.to_string());
                    }
                },
            }
        }
        lines.join("\n")
    }

    pub fn to_markdown(&self) -> String {
        self.to_markdown_with(&ExportOptions::default())
    }

    /// Markdown rendering. `Title` and `Heading1`..`Heading6` become ATX
    /// headings; other paragraphs are separated by blank lines.
    pub fn to_markdown_with(&self, options: &ExportOptions) -> String {
        let mut writer = MarkdownWriter::new(options);
        for element in &self.body {
            match element {
                BodyElement::Paragraph(p) => writer.write_paragraph(p),
                BodyElement::Table(t) if options.include_tables => writer.write_table(t),
                BodyElement::Table(_) => {},
                BodyElement::ContentControl(control) => {
                    if let Some(text) = control.text() {
                        writer.push_block(text);
                    }
                },
            }
        }
        writer.finish()
    }
}

struct MarkdownWriter<'a> {
    buffer: String,
    options: &'a ExportOptions,
}

impl<'a> MarkdownWriter<'a> {
    fn new(options: &'a ExportOptions) -> Self {
        Self {
            buffer: String::with_capacity(4096),
            options,
        }
    }

    fn write_paragraph(&mut self, paragraph: &Paragraph) {
        let mut line = String::new();
        if let Some(level) = paragraph.style().and_then(heading_level) {
            line.push_str(&"#".repeat(level));
            line.push(' ');
            // Heading text carries no inline markers.
            line.push_str(paragraph.text().trim());
        } else if self.options.include_styles {
            for run in paragraph.runs() {
                write_run(&mut line, run);
            }
        } else {
            line.push_str(&paragraph.text());
        }
        self.push_block(&line);
    }

    fn write_table(&mut self, table: &Table) {
        let rows = table.rows();
        let Some(first) = rows.first() else {
            return;
        };
        let mut out = String::new();
        let cells = |row: &super::table::Row| -> Vec<String> {
            row.cells()
                .iter()
                .filter(|c| !c.is_h_merged())
                .map(|c| c.text().replace('|', "\\|").replace('\n', " "))
                .collect()
        };

        let header = cells(first);
        out.push('|');
        for text in &header {
            out.push_str(&format!(" {text} |"));
        }
        out.push_str("\n|");
        for _ in &header {
            out.push_str("---|");
        }
        for row in &rows[1..] {
            out.push_str("\n|");
            for text in cells(row) {
                out.push_str(&format!(" {text} |"));
            }
        }
        self.push_block(&out);
    }

    fn push_block(&mut self, block: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push_str("\n\n");
        }
        self.buffer.push_str(block);
    }

    fn finish(mut self) -> String {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer
    }
}

fn heading_level(style: &str) -> Option<usize> {
    if style == "Title" {
        return Some(1);
    }
    let level: usize = style.strip_prefix("Heading")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Wrap the run's text in emphasis markers, keeping surrounding whitespace
/// outside them so the markers stay valid.
fn write_run(out: &mut String, run: &Run) {
    let text = run.plain_text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        out.push_str(text);
        return;
    }
    let props = run.properties();
    let mut marker = String::new();
    if props.is_strike() {
        marker.push_str("~~");
    }
    match (props.is_bold(), props.is_italic()) {
        (true, true) => marker.push_str("***"),
        (true, false) => marker.push_str("**"),
        (false, true) => marker.push('*'),
        (false, false) => {},
    }

    let start = text.len() - text.trim_start().len();
    out.push_str(&text[..start]);
    out.push_str(&marker);
    out.push_str(trimmed);
    out.extend(marker.chars().rev());
    out.push_str(&text[start + trimmed.len()..]);
}
