/// Word (.docx) documents: an editable model, its serializer, a
/// track-changes overlay and a paragraph-level diff.
///
/// # Architecture
///
/// - `writer`: the `Document` model and everything anchored to it, plus
///   packaging and plain-text / Markdown export
/// - `format`: run and paragraph formatting shared by the model and the diff
/// - `diff`: LCS alignment of two documents into a `DiffReport`
/// - `store`: a registry of open documents with per-document locking
///
/// # Example
///
/// ```rust,no_run
/// use quince::ooxml::docx::{Document, Table};
/// use quince::ooxml::docx::format::RunProperties;
///
/// let mut doc = Document::new();
/// doc.add_paragraph("Quarterly report");
/// doc.apply_style(0, "Title")?;
/// doc.format_paragraph(0, &RunProperties::new().bold())?;
/// doc.insert_table(Table::from_data(&[vec!["Q1", "Q2"], vec!["10", "12"]]), None);
/// doc.save("report.docx")?;
/// # Ok::<(), quince::ooxml::error::OoxmlError>(())
/// ```
pub mod diff;
pub mod format;
pub mod store;
pub mod writer;

pub use diff::{DiffMode, DiffOptions, DiffReport, compare};
pub use store::DocumentStore;
pub use writer::{
    BodyElement, Cell, ContentControl, Document, DocumentInfo, ExportOptions, Field, Paragraph,
    ParagraphId, Revision, RevisionKind, Row, Run, Style, Table, WriterOptions,
};
