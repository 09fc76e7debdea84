//! Office Open XML (OOXML) word-processing support.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): part names, relationships, content types and
//!    the zip packager
//! 2. **Format Layer** (`docx`): the Word document model and everything built
//!    on it
//!
//! Errors from both layers are reported as [`OoxmlError`].
pub mod docx;
pub mod error;
pub mod opc;

pub use error::{OoxmlError, Result};
