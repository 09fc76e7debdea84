/// Field writer support for DOCX documents.
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

/// A complex field: an instruction plus the result Word last computed.
///
/// Fields are not evaluated here. A field created without a result is marked
/// dirty so Word refreshes it when the document is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    instruction: String,
    result: Option<String>,
    dirty: bool,
}

impl Field {
    /// Create a dirty field with no cached result.
    ///
    /// # Arguments
    ///
    /// * `instruction` - The field instruction (e.g., "PAGE", "DATE \\@ \"MMMM d, yyyy\"")
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            result: None,
            dirty: true,
        }
    }

    /// Create a field with a cached result value.
    pub fn with_result(instruction: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            result: Some(result.into()),
            dirty: false,
        }
    }

    /// Current page number.
    pub fn page() -> Self {
        Self::new("PAGE")
    }

    /// Total number of pages.
    pub fn num_pages() -> Self {
        Self::new("NUMPAGES")
    }

    /// Current date with a picture switch, e.g. `"MMMM d, yyyy"`.
    pub fn date(format: &str) -> Self {
        Self::new(format!(r#"DATE \@ "{format}""#))
    }

    pub fn time(format: &str) -> Self {
        Self::new(format!(r#"TIME \@ "{format}""#))
    }

    /// Cross-reference to the text of a bookmark.
    pub fn reference(bookmark: &str) -> Self {
        Self::new(format!(r"REF {bookmark} \h"))
    }

    /// Sequence number, as used for figure and table captions.
    pub fn seq(identifier: &str) -> Self {
        Self::new(format!(r"SEQ {identifier} \* ARABIC"))
    }

    /// Table of contents over heading levels `start..=end`.
    pub fn toc(start: u8, end: u8) -> Self {
        Self::new(format!(r#"TOC \o "{start}-{end}" \h \z \u"#))
    }

    #[inline]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
        self.dirty = true;
    }

    #[inline]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn set_result(&mut self, result: Option<String>) {
        self.result = result;
        self.dirty = false;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Write the begin / instrText / separate / result / end run sequence.
    ///
    /// `rpr` is repeated on every run. Inside a deletion the instruction and
    /// result use their deleted-text element names.
    pub(crate) fn write_runs(&self, xml: &mut String, rpr: &str, removed: bool) -> Result<()> {
        let (instr_tag, text_tag) = if removed {
            ("w:delInstrText", "w:delText")
        } else {
            ("w:instrText", "w:t")
        };

        write!(xml, r#"<w:r>{rpr}<w:fldChar w:fldCharType="begin""#)?;
        if self.dirty {
            xml.push_str(r#" w:dirty="true""#);
        }
        xml.push_str("/></w:r>");

        write!(
            xml,
            r#"<w:r>{rpr}<{instr_tag} xml:space="preserve"> {} </{instr_tag}></w:r>"#,
            escape_xml(&self.instruction)
        )?;
        write!(xml, r#"<w:r>{rpr}<w:fldChar w:fldCharType="separate"/></w:r>"#)?;
        if let Some(ref result) = self.result {
            write!(
                xml,
                r#"<w:r>{rpr}<{text_tag} xml:space="preserve">{}</{text_tag}></w:r>"#,
                escape_xml(result)
            )?;
        }
        write!(xml, r#"<w:r>{rpr}<w:fldChar w:fldCharType="end"/></w:r>"#)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories() {
        assert_eq!(Field::page().instruction(), "PAGE");
        assert_eq!(Field::num_pages().instruction(), "NUMPAGES");
        assert_eq!(Field::date("yyyy-MM-dd").instruction(), r#"DATE \@ "yyyy-MM-dd""#);
        assert_eq!(Field::reference("intro").instruction(), r"REF intro \h");
        assert_eq!(Field::toc(1, 3).instruction(), r#"TOC \o "1-3" \h \z \u"#);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut field = Field::page();
        assert!(field.is_dirty());
        field.set_result(Some("4".to_string()));
        assert!(!field.is_dirty());
        assert_eq!(field.result(), Some("4"));
        field.set_instruction("NUMPAGES");
        assert!(field.is_dirty());
    }

    #[test]
    fn test_field_runs() {
        let mut xml = String::new();
        Field::with_result("PAGE", "1")
            .write_runs(&mut xml, "<w:rPr><w:b/></w:rPr>", false)
            .unwrap();
        assert!(xml.starts_with(r#"<w:r><w:rPr><w:b/></w:rPr><w:fldChar w:fldCharType="begin"/>"#));
        assert!(xml.contains("<w:instrText xml:space=\"preserve\"> PAGE </w:instrText>"));
        assert!(xml.contains(r#"<w:fldChar w:fldCharType="separate"/>"#));
        assert!(xml.contains(">1</w:t>"));
        assert!(xml.ends_with(r#"<w:fldChar w:fldCharType="end"/></w:r>"#));
        assert_eq!(xml.matches("<w:r>").count(), 5);
    }

    #[test]
    fn test_deleted_field_uses_del_elements() {
        let mut xml = String::new();
        Field::with_result("PAGE", "1").write_runs(&mut xml, "", true).unwrap();
        assert!(xml.contains("<w:delInstrText"));
        assert!(xml.contains("<w:delText"));
    }
}
