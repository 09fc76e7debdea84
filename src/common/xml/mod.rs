//! XML text helpers.

mod escape;

pub use escape::{check_well_formed, escape_xml, unescape_xml};
