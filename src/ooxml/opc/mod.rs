//! Open Packaging Conventions layer: part names, relationships, content
//! types and the zip packager.

pub mod constants;
pub mod manifest;
pub mod pkgwriter;
pub mod rel;

pub use manifest::{ContentTypes, PackageManifest};
pub use pkgwriter::PackageWriter;
pub use rel::{Relationship, Relationships};
