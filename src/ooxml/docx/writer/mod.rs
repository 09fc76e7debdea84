//! Editable document model for DOCX and its serializer.
//!
//! A [`Document`] owns its body and every keyed collection (comments,
//! revisions, notes, images, bookmarks). Editing methods live next to the
//! type they mostly touch, as `impl Document` blocks in each submodule;
//! [`package`] turns the whole model into package parts.

pub mod bookmark;
pub mod comment;
pub mod content_control;
pub mod doc;
pub mod export;
pub mod field;
pub mod hyperlink;
pub mod image;
pub mod note;
pub mod package;
pub mod paragraph;
pub mod properties;
pub(crate) mod relmap;
pub mod revision;
pub mod run;
pub mod section;
pub mod style;
pub mod table;

pub use bookmark::Bookmark;
pub use comment::Comment;
pub use content_control::{ContentControl, ContentControlKind, ListItem};
pub use doc::{BodyElement, Document, ParagraphId};
pub use export::{DocumentInfo, ExportOptions};
pub use field::Field;
pub use hyperlink::{Hyperlink, HyperlinkTarget};
pub use image::{Drawing, DrawingBorder, DrawingPlacement, Image, WrapType, image_content_type};
pub use note::{Note, NoteKind};
pub use package::WriterOptions;
pub use paragraph::Paragraph;
pub use properties::{DocumentProperties, Settings};
pub use relmap::RelationshipMapper;
pub use revision::{Revision, RevisionKind, RevisionManager};
pub use run::{BreakKind, RawXml, Run, RunContent};
pub use section::{
    Columns, PageMargins, PageOrientation, PageSize, SectionBreakType, SectionProperties,
};
pub use style::{Style, StyleSheet, StyleType};
pub use table::{
    Cell, CellProperties, CellVerticalAlign, Row, Table, TableAlignment, TableBorders, TableWidth,
    VMerge,
};
