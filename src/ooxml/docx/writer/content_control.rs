/// Block-level content controls (structured document tags).
///
/// Content controls are structured document regions that can contain text,
/// dates, drop-down lists and other content types. They're commonly used in
/// templates and forms. The table of contents and display equations are
/// carried the same way.
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::RunProperties;
use crate::ooxml::error::{OoxmlError, Result};
use std::fmt::Write as FmtWrite;

use super::doc::{BodyElement, Document};
use super::field::Field;
use super::relmap::RenderContext;
use super::run::{RawXml, Run, RunContent};

/// One entry of a drop-down list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub display_text: String,
    pub value: String,
}

impl ListItem {
    pub fn new(display_text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
            value: value.into(),
        }
    }
}

/// Type of content control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentControlKind {
    /// Plain text content control (text only, no formatting)
    PlainText,
    /// Rich text content control (can contain formatted text and paragraphs)
    RichText,
    Checkbox { checked: bool },
    DropDown { items: Vec<ListItem> },
    /// Date picker with a display format such as `"MM/dd/yyyy"`
    Date { format: String },
    /// Table of contents over heading levels `1..=levels`
    TableOfContents { levels: u8 },
    /// Display equation in Office Math markup (`m:oMath`)
    Equation { omml: RawXml },
}

/// A content control in the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentControl {
    /// Unique within the document; assigned on insertion.
    pub(crate) id: u32,
    tag: Option<String>,
    alias: Option<String>,
    kind: ContentControlKind,
    /// Shown while the control has no text of its own
    placeholder: Option<String>,
    text: Option<String>,
    allow_delete: bool,
    allow_edit: bool,
}

impl ContentControl {
    pub fn new(kind: ContentControlKind) -> Self {
        Self {
            id: 0,
            tag: None,
            alias: None,
            kind,
            placeholder: None,
            text: None,
            allow_delete: true,
            allow_edit: true,
        }
    }

    pub fn plain_text() -> Self {
        Self::new(ContentControlKind::PlainText)
    }

    pub fn rich_text() -> Self {
        Self::new(ContentControlKind::RichText)
    }

    pub fn checkbox(checked: bool) -> Self {
        Self::new(ContentControlKind::Checkbox { checked })
    }

    pub fn drop_down(items: Vec<ListItem>) -> Self {
        Self::new(ContentControlKind::DropDown { items })
    }

    pub fn date(format: impl Into<String>) -> Self {
        Self::new(ContentControlKind::Date {
            format: format.into(),
        })
    }

    /// Tag for programmatic identification.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Title displayed to the user.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Lock the control against deletion and/or editing.
    pub fn locked(mut self, allow_delete: bool, allow_edit: bool) -> Self {
        self.allow_delete = allow_delete;
        self.allow_edit = allow_edit;
        self
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn kind(&self) -> &ContentControlKind {
        &self.kind
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Text the control currently holds, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    /// Text a reader sees: own text, else the first list entry for drop-downs,
    /// else the placeholder.
    pub fn display_text(&self) -> &str {
        if let Some(ref text) = self.text {
            return text;
        }
        if let ContentControlKind::DropDown { items } = &self.kind
            && let Some(first) = items.first()
        {
            return &first.display_text;
        }
        self.placeholder.as_deref().unwrap_or_default()
    }

    pub(crate) fn write_xml(&self, xml: &mut String, ctx: &RenderContext<'_>) -> Result<()> {
        xml.push_str("<w:sdt><w:sdtPr>");
        if let Some(ref alias) = self.alias {
            write!(xml, r#"<w:alias w:val="{}"/>"#, escape_xml(alias))?;
        }
        if let Some(ref tag) = self.tag {
            write!(xml, r#"<w:tag w:val="{}"/>"#, escape_xml(tag))?;
        }
        write!(xml, r#"<w:id w:val="{}"/>"#, self.id)?;
        match (self.allow_delete, self.allow_edit) {
            (true, true) => {},
            (false, true) => xml.push_str(r#"<w:lock w:val="sdtLocked"/>"#),
            (true, false) => xml.push_str(r#"<w:lock w:val="contentLocked"/>"#),
            (false, false) => xml.push_str(r#"<w:lock w:val="sdtContentLocked"/>"#),
        }
        let showing_placeholder = self.text.is_none() && self.placeholder.is_some();
        if showing_placeholder {
            xml.push_str("<w:showingPlcHdr/>");
        }
        self.write_kind_properties(xml)?;
        xml.push_str("</w:sdtPr><w:sdtContent>");
        self.write_content(xml, ctx)?;
        xml.push_str("</w:sdtContent></w:sdt>");
        Ok(())
    }

    fn write_kind_properties(&self, xml: &mut String) -> Result<()> {
        match &self.kind {
            ContentControlKind::PlainText => xml.push_str("<w:text/>"),
            ContentControlKind::RichText => xml.push_str("<w:richText/>"),
            ContentControlKind::Checkbox { checked } => {
                write!(
                    xml,
                    r#"<w14:checkbox><w14:checked w14:val="{}"/><w14:checkedState w14:val="2612" w14:font="MS Gothic"/><w14:uncheckedState w14:val="2610" w14:font="MS Gothic"/></w14:checkbox>"#,
                    u8::from(*checked)
                )?;
            },
            ContentControlKind::DropDown { items } => {
                xml.push_str("<w:dropDownList>");
                for item in items {
                    write!(
                        xml,
                        r#"<w:listItem w:displayText="{}" w:value="{}"/>"#,
                        escape_xml(&item.display_text),
                        escape_xml(&item.value)
                    )?;
                }
                xml.push_str("</w:dropDownList>");
            },
            ContentControlKind::Date { format } => {
                write!(
                    xml,
                    r#"<w:date><w:dateFormat w:val="{}"/><w:lid w:val="en-US"/><w:storeMappedDataAs w:val="dateTime"/><w:calendar w:val="gregorian"/></w:date>"#,
                    escape_xml(format)
                )?;
            },
            ContentControlKind::TableOfContents { .. } => {
                xml.push_str(r#"<w:docPartObj><w:docPartGallery w:val="Table of Contents"/><w:docPartUnique/></w:docPartObj>"#);
            },
            ContentControlKind::Equation { .. } => xml.push_str("<w:equation/>"),
        }
        Ok(())
    }

    fn write_content(&self, xml: &mut String, ctx: &RenderContext<'_>) -> Result<()> {
        match &self.kind {
            ContentControlKind::TableOfContents { levels } => {
                let heading = self.text.as_deref().unwrap_or("Contents");
                write!(
                    xml,
                    r#"<w:p><w:pPr><w:pStyle w:val="TOCHeading"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
                    escape_xml(heading)
                )?;
                // Cached text stays until Word rebuilds the dirty field.
                let mut field = Field::toc(1, *levels);
                field.set_result(Some(
                    "Right-click to update the table of contents.".to_string(),
                ));
                field.mark_dirty();
                xml.push_str("<w:p>");
                Run::new(RunContent::Field(field)).write_xml(xml, ctx)?;
                xml.push_str("</w:p>");
            },
            ContentControlKind::Equation { omml } => {
                write!(xml, "<w:p><m:oMathPara>{}</m:oMathPara></w:p>", omml.as_str())?;
            },
            ContentControlKind::Checkbox { checked } => {
                let glyph = if *checked { '\u{2612}' } else { '\u{2610}' };
                let run = Run::text(glyph.to_string())
                    .with_properties(RunProperties::new().font("MS Gothic"));
                xml.push_str("<w:p>");
                run.write_xml(xml, ctx)?;
                xml.push_str("</w:p>");
            },
            _ => {
                let text = self.display_text();
                xml.push_str("<w:p>");
                if !text.is_empty() {
                    let mut props = RunProperties::new();
                    if self.text.is_none() {
                        props = props.style("PlaceholderText");
                    }
                    Run::text(text).with_properties(props).write_xml(xml, ctx)?;
                }
                xml.push_str("</w:p>");
            },
        }
        Ok(())
    }
}

impl Document {
    /// Insert a content control at body position `index` (clamped; `None`
    /// appends) and return its id.
    pub fn insert_content_control(&mut self, index: Option<usize>, mut control: ContentControl) -> u32 {
        let id = self.ids.content_control.next_id() as u32;
        control.id = id;
        self.insert_body_element(index, BodyElement::ContentControl(control));
        id
    }

    /// Insert a table of contents over heading levels `1..=levels`.
    pub fn insert_toc(&mut self, index: Option<usize>, levels: u8) -> Result<u32> {
        if !(1..=9).contains(&levels) {
            return Err(OoxmlError::InvalidValue(format!(
                "table of contents levels must be 1-9, got {levels}"
            )));
        }
        let control = ContentControl::new(ContentControlKind::TableOfContents { levels });
        Ok(self.insert_content_control(index, control))
    }

    /// Append an inline equation (`m:oMath` markup) to a paragraph.
    pub fn insert_equation(&mut self, paragraph_index: usize, omml: &str) -> Result<()> {
        let raw = RawXml::parse(omml)?;
        self.paragraph_mut(paragraph_index)?
            .add_run(Run::new(RunContent::Raw(raw)));
        Ok(())
    }

    /// Insert a display equation as its own block; returns the control id.
    pub fn insert_display_equation(&mut self, index: Option<usize>, omml: &str) -> Result<u32> {
        let omml = RawXml::parse(omml)?;
        let control = ContentControl::new(ContentControlKind::Equation { omml });
        Ok(self.insert_content_control(index, control))
    }

    pub fn content_controls(&self) -> impl Iterator<Item = &ContentControl> {
        self.body.iter().filter_map(|element| match element {
            BodyElement::ContentControl(control) => Some(control),
            _ => None,
        })
    }

    pub fn content_control(&self, id: u32) -> Option<&ContentControl> {
        self.content_controls().find(|c| c.id == id)
    }

    pub fn content_control_mut(&mut self, id: u32) -> Option<&mut ContentControl> {
        self.body.iter_mut().find_map(|element| match element {
            BodyElement::ContentControl(control) if control.id == id => Some(control),
            _ => None,
        })
    }

    pub fn delete_content_control(&mut self, id: u32) -> Result<()> {
        let pos = self
            .body
            .iter()
            .position(|e| matches!(e, BodyElement::ContentControl(c) if c.id == id))
            .ok_or_else(|| OoxmlError::not_found("content control", id))?;
        self.body.remove(pos);
        Ok(())
    }
}
