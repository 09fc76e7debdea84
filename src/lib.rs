//! Quince - build, track and compare Word documents in Rust
//!
//! This library keeps a Word-processing document in memory, edits it
//! through index-based operations, records tracked changes, and writes it
//! out as an Office Open XML (.docx) package. Two documents can be compared
//! paragraph by paragraph.
//!
//! # Features
//!
//! - **Document model**: paragraphs, runs, tables, styles, comments, notes,
//!   images, hyperlinks, bookmarks, fields, content controls and sections
//! - **Serializer**: an ordered part manifest zipped into a `.docx`
//! - **Track changes**: tracked insertions, deletions, moves and format
//!   changes with accept/reject
//! - **Diff**: LCS alignment with text, formatting, structure and full modes
//! - **Export**: document statistics, plain text and Markdown
//! - **Store**: open documents shared across threads with per-document locks
//!
//! # Example - Writing a DOCX file
//!
//! ```no_run
//! use quince::ooxml::docx::Document;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! doc.add_paragraph("Hello, world");
//! doc.add_comment(0, "Reviewer", "Friendlier greeting?", Some("R"))?;
//! doc.save("hello.docx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Comparing two documents
//!
//! ```
//! use quince::ooxml::docx::{Document, DiffOptions, compare};
//!
//! let mut a = Document::new();
//! a.add_paragraph("The quick brown fox jumps");
//! let mut b = a.clone();
//! b.update_paragraph(0, "The quick brown fox leaps")?;
//!
//! let report = compare(&a, &b, &DiffOptions::default());
//! assert_eq!(report.summary.modified, 1);
//! println!("{report}");
//! # Ok::<(), quince::ooxml::error::OoxmlError>(())
//! ```

pub mod common;
pub mod ooxml;

pub use ooxml::docx::{Document, DocumentStore};
pub use ooxml::{OoxmlError, Result};
