/// Run types and implementation for DOCX documents.
use crate::common::xml::{check_well_formed, escape_xml};
use crate::ooxml::docx::format::RunProperties;
use crate::ooxml::error::{OoxmlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use super::field::Field;
use super::image::Drawing;
use super::relmap::RenderContext;

/// Kind of a `w:br` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakKind {
    Line,
    Page,
    Column,
}

/// A well-formed XML fragment emitted verbatim in place of a run.
///
/// The only way to build one is [`RawXml::parse`], so the serializer can
/// trust the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RawXml(String);

impl RawXml {
    pub fn parse(fragment: impl Into<String>) -> Result<Self> {
        let fragment = fragment.into();
        check_well_formed(&fragment).map_err(OoxmlError::Xml)?;
        Ok(Self(fragment))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RawXml {
    type Error = OoxmlError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<RawXml> for String {
    fn from(raw: RawXml) -> Self {
        raw.0
    }
}

/// Run content type.
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    /// Plain text
    Text(String),
    Tab,
    Break(BreakKind),
    /// Inline or floating picture; replaces the text payload
    Drawing(Drawing),
    /// Complex field (begin / instrText / separate / result / end)
    Field(Field),
    FootnoteReference(i32),
    EndnoteReference(i32),
    CommentReference(u32),
    /// Pre-validated XML written as-is
    Raw(RawXml),
}

/// A run of content sharing one set of character properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub(crate) content: RunContent,
    pub(crate) properties: RunProperties,
    /// Insertion, deletion or move revision this run belongs to.
    pub(crate) revision: Option<u32>,
    /// Formatting revision holding the properties before the last tracked change.
    pub(crate) format_revision: Option<u32>,
}

impl Run {
    pub fn new(content: RunContent) -> Self {
        Self {
            content,
            properties: RunProperties::default(),
            revision: None,
            format_revision: None,
        }
    }

    /// A plain text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(RunContent::Text(text.into()))
    }

    pub fn with_properties(mut self, properties: RunProperties) -> Self {
        self.properties = properties;
        self
    }

    #[inline]
    pub fn content(&self) -> &RunContent {
        &self.content
    }

    pub fn set_content(&mut self, content: RunContent) {
        self.content = content;
    }

    /// The text payload, if this is a text run.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = RunContent::Text(text.into());
    }

    #[inline]
    pub fn properties(&self) -> &RunProperties {
        &self.properties
    }

    #[inline]
    pub fn properties_mut(&mut self) -> &mut RunProperties {
        &mut self.properties
    }

    #[inline]
    pub fn revision(&self) -> Option<u32> {
        self.revision
    }

    #[inline]
    pub fn format_revision(&self) -> Option<u32> {
        self.format_revision
    }

    /// Text as a reader would see it: tabs and line breaks become characters,
    /// fields show their cached result.
    pub fn plain_text(&self) -> &str {
        match &self.content {
            RunContent::Text(s) => s,
            RunContent::Tab => "\t",
            RunContent::Break(BreakKind::Line) => "\n",
            RunContent::Field(field) => field.result().unwrap_or_default(),
            _ => "",
        }
    }

    #[inline]
    pub fn is_page_break(&self) -> bool {
        matches!(self.content, RunContent::Break(BreakKind::Page))
    }

    pub(crate) fn write_xml(&self, xml: &mut String, ctx: &RenderContext<'_>) -> Result<()> {
        let mark = self.revision.and_then(|id| ctx.revision(id));
        let removed = mark.is_some_and(|rev| rev.kind.removes_content());

        if let Some(rev) = mark {
            rev.write_open(xml)?;
        }

        let mut change = String::new();
        if let Some(rev) = self.format_revision.and_then(|id| ctx.revision(id)) {
            rev.write_property_change(&mut change)?;
        }
        let mut rpr = String::new();
        self.properties.write_xml(&mut rpr, &change)?;

        match &self.content {
            RunContent::Raw(raw) => xml.push_str(raw.as_str()),
            RunContent::Field(field) => field.write_runs(xml, &rpr, removed)?,
            content => {
                xml.push_str("<w:r>");
                xml.push_str(&rpr);
                write_content(xml, content, removed)?;
                xml.push_str("</w:r>");
            },
        }

        if let Some(rev) = mark {
            rev.write_close(xml);
        }
        Ok(())
    }
}

fn write_content(xml: &mut String, content: &RunContent, removed: bool) -> Result<()> {
    match content {
        RunContent::Text(text) => {
            let tag = if removed { "w:delText" } else { "w:t" };
            if needs_preserve(text) {
                write!(xml, r#"<{tag} xml:space="preserve">{}</{tag}>"#, escape_xml(text))?;
            } else {
                write!(xml, "<{tag}>{}</{tag}>", escape_xml(text))?;
            }
        },
        RunContent::Tab => xml.push_str("<w:tab/>"),
        RunContent::Break(BreakKind::Line) => xml.push_str("<w:br/>"),
        RunContent::Break(BreakKind::Page) => xml.push_str(r#"<w:br w:type="page"/>"#),
        RunContent::Break(BreakKind::Column) => xml.push_str(r#"<w:br w:type="column"/>"#),
        RunContent::Drawing(drawing) => drawing.write_xml(xml)?,
        RunContent::FootnoteReference(id) => {
            write!(xml, r#"<w:footnoteReference w:id="{id}"/>"#)?;
        },
        RunContent::EndnoteReference(id) => {
            write!(xml, r#"<w:endnoteReference w:id="{id}"/>"#)?;
        },
        RunContent::CommentReference(id) => {
            write!(xml, r#"<w:commentReference w:id="{id}"/>"#)?;
        },
        // Written without a run wrapper by the caller.
        RunContent::Field(_) | RunContent::Raw(_) => {},
    }
    Ok(())
}

/// Leading, trailing or doubled whitespace is dropped by Word unless preserved.
fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ")
}
