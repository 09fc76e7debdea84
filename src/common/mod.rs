//! Common types and utilities shared by the document model, the serializer
//! and the diff engine.

pub mod id;
pub mod unit;
pub mod xml;

pub use id::IdAllocator;
pub use unit::{Emu, HalfPoints, Twips};
pub use xml::{escape_xml, unescape_xml};
