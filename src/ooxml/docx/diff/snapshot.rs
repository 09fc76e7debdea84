//! Per-paragraph records the aligner compares.

use sha1::{Digest, Sha1};
use std::fmt::Write;

use crate::ooxml::docx::format::UnderlineType;
use crate::ooxml::docx::writer::{Document, Paragraph, Run};

/// One body paragraph reduced to what the diff looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParagraphSnapshot {
    /// Trimmed paragraph text
    pub text: String,
    /// Lowercase hex SHA-1 of `text`
    pub hash: String,
    pub style: Option<String>,
    /// Text with inline formatting tags, for the formatting-aware modes
    pub markup: String,
}

impl ParagraphSnapshot {
    pub(crate) fn new(paragraph: &Paragraph) -> Self {
        let text = paragraph.text().trim().to_string();
        Self {
            hash: sha1_hex(&text),
            style: paragraph.style().map(str::to_string),
            markup: markup(paragraph),
            text,
        }
    }

    /// Match predicate of the alignment: same hash and same text.
    #[inline]
    pub(crate) fn matches(&self, other: &Self) -> bool {
        self.hash == other.hash && self.text == other.text
    }

    pub(crate) fn is_heading(&self) -> bool {
        self.style
            .as_deref()
            .is_some_and(|s| s.contains("Heading") || s == "Title")
    }

    pub(crate) fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Body paragraphs in order; table cells are not compared.
pub(crate) fn snapshot(doc: &Document) -> Vec<ParagraphSnapshot> {
    doc.paragraphs().map(ParagraphSnapshot::new).collect()
}

fn sha1_hex(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(40);
    for byte in digest.iter() {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// Paragraph text with `**bold**`, `*italic*`, `~~strike~~`, `[u]..[/u]`,
/// `[color=RRGGBB]..[/color]` and `[highlight=name]..[/highlight]` tags.
fn markup(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for run in paragraph.runs() {
        write_run(&mut out, run);
    }
    out.trim().to_string()
}

fn write_run(out: &mut String, run: &Run) {
    let text = run.plain_text();
    if text.is_empty() {
        return;
    }
    let props = run.properties();
    let mut inner = text.to_string();
    if !matches!(props.underline, None | Some(UnderlineType::None)) {
        inner = format!("[u]{inner}[/u]");
    }
    if let Some(highlight) = props.highlight {
        inner = format!("[highlight={}]{inner}[/highlight]", highlight.as_str());
    }
    if let Some(ref color) = props.color {
        inner = format!("[color={color}]{inner}[/color]");
    }
    if props.is_strike() {
        inner = format!("~~{inner}~~");
    }
    if props.is_italic() {
        inner = format!("*{inner}*");
    }
    if props.is_bold() {
        inner = format!("**{inner}**");
    }
    out.push_str(&inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::format::{Color, HighlightColor, RunProperties};

    #[test]
    fn test_hash_is_sha1_of_trimmed_text() {
        let mut doc = Document::new();
        doc.add_paragraph("  hello world ");
        let snap = snapshot(&doc);
        assert_eq!(snap[0].text, "hello world");
        assert_eq!(snap[0].hash, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
    }

    #[test]
    fn test_markup_tags() {
        let mut p = Paragraph::new();
        p.add_text("plain ", RunProperties::new());
        p.add_text("both", RunProperties::new().bold().italic());
        p.add_text(" ", RunProperties::new());
        let mut props = RunProperties::new().strike();
        props.color = Some(Color::parse("ff0000").unwrap());
        props.highlight = Some(HighlightColor::Yellow);
        props.underline = Some(UnderlineType::Single);
        p.add_text("x", props);

        assert_eq!(
            markup(&p),
            "plain ***both*** ~~[color=FF0000][highlight=yellow][u]x[/u][/highlight][/color]~~"
        );
    }

    #[test]
    fn test_headings_and_words() {
        let title = ParagraphSnapshot::new(&Paragraph::with_text("A b c").with_style("Title"));
        assert!(title.is_heading());
        assert_eq!(title.word_count(), 3);
        let body = ParagraphSnapshot::new(&Paragraph::with_text("x"));
        assert!(!body.is_heading());
        assert!(body.matches(&ParagraphSnapshot::new(&Paragraph::with_text(" x "))));
    }
}
