//! Shared formatting types for runs and paragraphs.
//!
//! Each property set knows how to write its own `w:rPr` / `w:pPr` children.
//! Only fields that are set are emitted, and an empty set emits nothing.

use crate::common::unit::{HalfPoints, Twips};
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as FmtWrite};
use std::str::FromStr;

bitflags! {
    /// On/off character formatting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct RunFlags: u16 {
        const BOLD = 0x0001;
        const ITALIC = 0x0002;
        const STRIKE = 0x0004;
        const DOUBLE_STRIKE = 0x0008;
        const SMALL_CAPS = 0x0010;
        const ALL_CAPS = 0x0020;
        const HIDDEN = 0x0040;
    }
}

/// A 6-digit RGB color, stored upper-case without a leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn parse(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(hex.to_ascii_uppercase()))
        } else {
            Err(OoxmlError::InvalidValue(format!(
                "color must be 6 hex digits, got {s:?}"
            )))
        }
    }

    /// Built-in palette entries, already in canonical form.
    pub(crate) fn from_static(hex: &'static str) -> Self {
        debug_assert!(hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()));
        Self(hex.to_ascii_uppercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Color {
    type Err = OoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = OoxmlError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.0
    }
}

/// Underline styles for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnderlineType {
    Single,
    Double,
    Thick,
    Dotted,
    Dash,
    Wave,
    Words,
    None,
}

impl UnderlineType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Thick => "thick",
            Self::Dotted => "dotted",
            Self::Dash => "dash",
            Self::Wave => "wave",
            Self::Words => "words",
            Self::None => "none",
        }
    }
}

/// The sixteen highlight colors Word supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightColor {
    Yellow,
    Green,
    Cyan,
    Magenta,
    Blue,
    Red,
    DarkBlue,
    DarkCyan,
    DarkGreen,
    DarkMagenta,
    DarkRed,
    DarkYellow,
    DarkGray,
    LightGray,
    Black,
    White,
}

impl HighlightColor {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Cyan => "cyan",
            Self::Magenta => "magenta",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::DarkBlue => "darkBlue",
            Self::DarkCyan => "darkCyan",
            Self::DarkGreen => "darkGreen",
            Self::DarkMagenta => "darkMagenta",
            Self::DarkRed => "darkRed",
            Self::DarkYellow => "darkYellow",
            Self::DarkGray => "darkGray",
            Self::LightGray => "lightGray",
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

impl FromStr for HighlightColor {
    type Err = OoxmlError;

    fn from_str(s: &str) -> Result<Self> {
        const ALL: [HighlightColor; 16] = [
            HighlightColor::Yellow,
            HighlightColor::Green,
            HighlightColor::Cyan,
            HighlightColor::Magenta,
            HighlightColor::Blue,
            HighlightColor::Red,
            HighlightColor::DarkBlue,
            HighlightColor::DarkCyan,
            HighlightColor::DarkGreen,
            HighlightColor::DarkMagenta,
            HighlightColor::DarkRed,
            HighlightColor::DarkYellow,
            HighlightColor::DarkGray,
            HighlightColor::LightGray,
            HighlightColor::Black,
            HighlightColor::White,
        ];
        ALL.into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| OoxmlError::InvalidValue(format!("unknown highlight color {s:?}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    Superscript,
    Subscript,
    Baseline,
}

impl VerticalAlign {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
            Self::Baseline => "baseline",
        }
    }
}

/// Animated text effects (legacy, still honoured by the format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextEffect {
    BlinkBackground,
    Lights,
    AntsBlack,
    AntsRed,
    Shimmer,
    Sparkle,
    None,
}

impl TextEffect {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::BlinkBackground => "blinkBackground",
            Self::Lights => "lights",
            Self::AntsBlack => "antsBlack",
            Self::AntsRed => "antsRed",
            Self::Shimmer => "shimmer",
            Self::Sparkle => "sparkle",
            Self::None => "none",
        }
    }
}

/// Character spacing adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterSpacing {
    /// Extra space between characters; negative condenses.
    pub spacing: Option<Twips>,
    /// Raise (positive) or lower the baseline, in half-points.
    pub position: Option<i32>,
    /// Minimum font size for kerning.
    pub kern: Option<HalfPoints>,
}

impl CharacterSpacing {
    fn is_empty(&self) -> bool {
        self.spacing.is_none() && self.position.is_none() && self.kern.is_none()
    }
}

/// Character formatting of a run.
///
/// Built with chained setters:
///
/// ```
/// use quince::ooxml::docx::format::{HighlightColor, RunProperties};
///
/// let props = RunProperties::new()
///     .bold()
///     .size_pt(14)
///     .highlight(HighlightColor::Yellow);
/// assert!(props.is_bold());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProperties {
    pub flags: RunFlags,
    pub underline: Option<UnderlineType>,
    pub font_size: Option<HalfPoints>,
    pub font_name: Option<String>,
    pub color: Option<Color>,
    pub highlight: Option<HighlightColor>,
    pub vertical_align: Option<VerticalAlign>,
    /// Character style id.
    pub style: Option<String>,
    pub spacing: Option<CharacterSpacing>,
    pub effect: Option<TextEffect>,
}

impl RunProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self) -> Self {
        self.flags |= RunFlags::BOLD;
        self
    }

    pub fn italic(mut self) -> Self {
        self.flags |= RunFlags::ITALIC;
        self
    }

    pub fn strike(mut self) -> Self {
        self.flags |= RunFlags::STRIKE;
        self
    }

    pub fn with_flags(mut self, flags: RunFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn underline(mut self, kind: UnderlineType) -> Self {
        self.underline = Some(kind);
        self
    }

    pub fn size(mut self, size: HalfPoints) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn size_pt(self, pt: u32) -> Self {
        self.size(HalfPoints::from_pt(pt))
    }

    pub fn font(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn highlight(mut self, color: HighlightColor) -> Self {
        self.highlight = Some(color);
        self
    }

    pub fn vertical_align(mut self, align: VerticalAlign) -> Self {
        self.vertical_align = Some(align);
        self
    }

    pub fn style(mut self, style_id: impl Into<String>) -> Self {
        self.style = Some(style_id.into());
        self
    }

    pub fn spacing(mut self, spacing: CharacterSpacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn effect(mut self, effect: TextEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    #[inline]
    pub fn is_bold(&self) -> bool {
        self.flags.contains(RunFlags::BOLD)
    }

    #[inline]
    pub fn is_italic(&self) -> bool {
        self.flags.contains(RunFlags::ITALIC)
    }

    #[inline]
    pub fn is_strike(&self) -> bool {
        self.flags.contains(RunFlags::STRIKE)
    }

    /// Merge `other` into `self`.
    ///
    /// Flags are unioned: a flag set in `other` turns on, an unset flag never
    /// turns an existing one off. Every `Some` field of `other` overwrites.
    pub fn merge(&mut self, other: &RunProperties) {
        self.flags |= other.flags;
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.font_name.is_some() {
            self.font_name.clone_from(&other.font_name);
        }
        if other.color.is_some() {
            self.color.clone_from(&other.color);
        }
        if other.highlight.is_some() {
            self.highlight = other.highlight;
        }
        if other.vertical_align.is_some() {
            self.vertical_align = other.vertical_align;
        }
        if other.style.is_some() {
            self.style.clone_from(&other.style);
        }
        if other.spacing.is_some() {
            self.spacing = other.spacing;
        }
        if other.effect.is_some() {
            self.effect = other.effect;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
            && self.underline.is_none()
            && self.font_size.is_none()
            && self.font_name.is_none()
            && self.color.is_none()
            && self.highlight.is_none()
            && self.vertical_align.is_none()
            && self.style.is_none()
            && self.spacing.is_none_or(|s| s.is_empty())
            && self.effect.is_none()
    }

    /// Write `<w:rPr>` with `trailer` (e.g. a revision marker) as its last child.
    ///
    /// Nothing is written when both the properties and the trailer are empty.
    pub(crate) fn write_xml(&self, xml: &mut String, trailer: &str) -> Result<()> {
        if self.is_empty() && trailer.is_empty() {
            return Ok(());
        }
        xml.push_str("<w:rPr>");
        self.write_children(xml)?;
        xml.push_str(trailer);
        xml.push_str("</w:rPr>");
        Ok(())
    }

    /// Write the property elements alone, without the `w:rPr` wrapper.
    ///
    /// `CT_RPr` is a sequence, so children follow schema order.
    pub(crate) fn write_children(&self, xml: &mut String) -> Result<()> {
        if let Some(ref style) = self.style {
            write!(xml, r#"<w:rStyle w:val="{}"/>"#, escape_xml(style))?;
        }
        if let Some(ref font) = self.font_name {
            let font = escape_xml(font);
            write!(
                xml,
                r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#
            )?;
        }
        if self.flags.contains(RunFlags::BOLD) {
            xml.push_str("<w:b/><w:bCs/>");
        }
        if self.flags.contains(RunFlags::ITALIC) {
            xml.push_str("<w:i/><w:iCs/>");
        }
        if self.flags.contains(RunFlags::ALL_CAPS) {
            xml.push_str("<w:caps/>");
        }
        if self.flags.contains(RunFlags::SMALL_CAPS) {
            xml.push_str("<w:smallCaps/>");
        }
        if self.flags.contains(RunFlags::STRIKE) {
            xml.push_str("<w:strike/>");
        }
        if self.flags.contains(RunFlags::DOUBLE_STRIKE) {
            xml.push_str("<w:dstrike/>");
        }
        if self.flags.contains(RunFlags::HIDDEN) {
            xml.push_str("<w:vanish/>");
        }
        if let Some(ref color) = self.color {
            write!(xml, r#"<w:color w:val="{color}"/>"#)?;
        }
        if let Some(spacing) = self.spacing {
            if let Some(s) = spacing.spacing {
                write!(xml, r#"<w:spacing w:val="{s}"/>"#)?;
            }
            if let Some(k) = spacing.kern {
                write!(xml, r#"<w:kern w:val="{k}"/>"#)?;
            }
            if let Some(p) = spacing.position {
                write!(xml, r#"<w:position w:val="{p}"/>"#)?;
            }
        }
        if let Some(size) = self.font_size {
            write!(xml, r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#)?;
        }
        if let Some(highlight) = self.highlight {
            write!(xml, r#"<w:highlight w:val="{}"/>"#, highlight.as_str())?;
        }
        if let Some(underline) = self.underline {
            write!(xml, r#"<w:u w:val="{}"/>"#, underline.as_str())?;
        }
        if let Some(effect) = self.effect {
            write!(xml, r#"<w:effect w:val="{}"/>"#, effect.as_str())?;
        }
        if let Some(align) = self.vertical_align {
            write!(xml, r#"<w:vertAlign w:val="{}"/>"#, align.as_str())?;
        }
        Ok(())
    }
}

/// Paragraph alignment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParagraphAlignment {
    Left,
    Center,
    Right,
    Justify,
}

impl ParagraphAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
        }
    }
}

/// Line spacing options for paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineSpacing {
    Single,
    OneAndHalf,
    Double,
    /// Multiple of single spacing in 240ths (276 = 1.15 lines)
    Multiple(u32),
    Exact(Twips),
    AtLeast(Twips),
}

impl LineSpacing {
    /// `(w:line, w:lineRule)` attribute values.
    fn attributes(&self) -> (i64, &'static str) {
        match self {
            Self::Single => (240, "auto"),
            Self::OneAndHalf => (360, "auto"),
            Self::Double => (480, "auto"),
            Self::Multiple(v) => (*v as i64, "auto"),
            Self::Exact(t) => (t.0 as i64, "exact"),
            Self::AtLeast(t) => (t.0 as i64, "atLeast"),
        }
    }
}

/// Border line styles shared by paragraphs and tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderStyle {
    None,
    Single,
    Thick,
    Double,
    Dotted,
    Dashed,
    DotDash,
    DotDotDash,
    Wave,
}

impl BorderStyle {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Thick => "thick",
            Self::Double => "double",
            Self::Dotted => "dotted",
            Self::Dashed => "dashed",
            Self::DotDash => "dotDash",
            Self::DotDotDash => "dotDotDash",
            Self::Wave => "wave",
        }
    }
}

/// One border edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Border {
    pub style: BorderStyle,
    /// Width in eighths of a point.
    pub size: u32,
    /// `None` means automatic color.
    pub color: Option<Color>,
    /// Gap between border and text, in points.
    pub space: u32,
}

impl Border {
    pub fn single() -> Self {
        Self {
            style: BorderStyle::Single,
            size: 4,
            color: None,
            space: 1,
        }
    }

    pub fn new(style: BorderStyle, size: u32, color: Option<Color>) -> Self {
        Self {
            style,
            size,
            color,
            space: 0,
        }
    }

    pub(crate) fn write_xml(&self, xml: &mut String, edge: &str) -> Result<()> {
        let color = self.color.as_ref().map_or("auto", |c| c.as_str());
        write!(
            xml,
            r#"<w:{edge} w:val="{}" w:sz="{}" w:space="{}" w:color="{color}"/>"#,
            self.style.as_str(),
            self.size,
            self.space,
        )?;
        Ok(())
    }
}

/// Paragraph border set (`w:pBdr`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParagraphBorders {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub right: Option<Border>,
    /// Border between consecutive paragraphs sharing the same border settings.
    pub between: Option<Border>,
}

impl ParagraphBorders {
    /// The same border on all four sides.
    pub fn all(border: Border) -> Self {
        Self {
            top: Some(border.clone()),
            bottom: Some(border.clone()),
            left: Some(border.clone()),
            right: Some(border),
            between: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.top.is_none()
            && self.bottom.is_none()
            && self.left.is_none()
            && self.right.is_none()
            && self.between.is_none()
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        xml.push_str("<w:pBdr>");
        for (edge, border) in [
            ("top", &self.top),
            ("left", &self.left),
            ("bottom", &self.bottom),
            ("right", &self.right),
            ("between", &self.between),
        ] {
            if let Some(border) = border {
                border.write_xml(xml, edge)?;
            }
        }
        xml.push_str("</w:pBdr>");
        Ok(())
    }
}

/// Background fill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shading {
    pub fill: Color,
}

impl Shading {
    pub fn new(fill: Color) -> Self {
        Self { fill }
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            self.fill
        )?;
        Ok(())
    }
}

/// Reference to a numbering definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberingProperties {
    pub num_id: u32,
    /// List level, 0 based.
    pub level: u32,
}

/// Paragraph formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// Paragraph style id.
    pub style: Option<String>,
    pub alignment: Option<ParagraphAlignment>,
    pub space_before: Option<Twips>,
    pub space_after: Option<Twips>,
    pub line_spacing: Option<LineSpacing>,
    pub indent_left: Option<Twips>,
    pub indent_right: Option<Twips>,
    /// Positive values indent the first line, negative values hang it.
    pub indent_first_line: Option<Twips>,
    pub keep_next: bool,
    pub keep_lines: bool,
    pub page_break_before: bool,
    pub borders: Option<ParagraphBorders>,
    pub shading: Option<Shading>,
    pub numbering: Option<NumberingProperties>,
}

impl ParagraphProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style_id: impl Into<String>) -> Self {
        self.style = Some(style_id.into());
        self
    }

    pub fn alignment(mut self, alignment: ParagraphAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn space_before(mut self, space: Twips) -> Self {
        self.space_before = Some(space);
        self
    }

    pub fn space_after(mut self, space: Twips) -> Self {
        self.space_after = Some(space);
        self
    }

    pub fn line_spacing(mut self, spacing: LineSpacing) -> Self {
        self.line_spacing = Some(spacing);
        self
    }

    pub fn indent(mut self, left: Option<Twips>, right: Option<Twips>, first_line: Option<Twips>) -> Self {
        self.indent_left = left;
        self.indent_right = right;
        self.indent_first_line = first_line;
        self
    }

    pub fn keep_next(mut self) -> Self {
        self.keep_next = true;
        self
    }

    pub fn borders(mut self, borders: ParagraphBorders) -> Self {
        self.borders = Some(borders);
        self
    }

    pub fn shading(mut self, fill: Color) -> Self {
        self.shading = Some(Shading::new(fill));
        self
    }

    pub fn numbering(mut self, num_id: u32, level: u32) -> Self {
        self.numbering = Some(NumberingProperties { num_id, level });
        self
    }

    /// Merge `other` into `self` with the same rules as [`RunProperties::merge`].
    pub fn merge(&mut self, other: &ParagraphProperties) {
        if other.style.is_some() {
            self.style.clone_from(&other.style);
        }
        if other.alignment.is_some() {
            self.alignment = other.alignment;
        }
        if other.space_before.is_some() {
            self.space_before = other.space_before;
        }
        if other.space_after.is_some() {
            self.space_after = other.space_after;
        }
        if other.line_spacing.is_some() {
            self.line_spacing = other.line_spacing;
        }
        if other.indent_left.is_some() {
            self.indent_left = other.indent_left;
        }
        if other.indent_right.is_some() {
            self.indent_right = other.indent_right;
        }
        if other.indent_first_line.is_some() {
            self.indent_first_line = other.indent_first_line;
        }
        self.keep_next |= other.keep_next;
        self.keep_lines |= other.keep_lines;
        self.page_break_before |= other.page_break_before;
        if other.borders.is_some() {
            self.borders.clone_from(&other.borders);
        }
        if other.shading.is_some() {
            self.shading.clone_from(&other.shading);
        }
        if other.numbering.is_some() {
            self.numbering = other.numbering;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.alignment.is_none()
            && self.space_before.is_none()
            && self.space_after.is_none()
            && self.line_spacing.is_none()
            && self.indent_left.is_none()
            && self.indent_right.is_none()
            && self.indent_first_line.is_none()
            && !self.keep_next
            && !self.keep_lines
            && !self.page_break_before
            && self.borders.as_ref().is_none_or(|b| b.is_empty())
            && self.shading.is_none()
            && self.numbering.is_none()
    }

    /// Write `<w:pPr>` with `trailer` appended as its last children.
    pub(crate) fn write_xml(&self, xml: &mut String, trailer: &str) -> Result<()> {
        if self.is_empty() && trailer.is_empty() {
            return Ok(());
        }
        xml.push_str("<w:pPr>");
        self.write_children(xml)?;
        xml.push_str(trailer);
        xml.push_str("</w:pPr>");
        Ok(())
    }

    pub(crate) fn write_children(&self, xml: &mut String) -> Result<()> {
        if let Some(ref style) = self.style {
            write!(xml, r#"<w:pStyle w:val="{}"/>"#, escape_xml(style))?;
        }
        if self.keep_next {
            xml.push_str("<w:keepNext/>");
        }
        if self.keep_lines {
            xml.push_str("<w:keepLines/>");
        }
        if self.page_break_before {
            xml.push_str("<w:pageBreakBefore/>");
        }
        if let Some(ref numbering) = self.numbering {
            write!(
                xml,
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                numbering.level, numbering.num_id
            )?;
        }
        if let Some(ref borders) = self.borders {
            borders.write_xml(xml)?;
        }
        if let Some(ref shading) = self.shading {
            shading.write_xml(xml)?;
        }

        if self.space_before.is_some() || self.space_after.is_some() || self.line_spacing.is_some()
        {
            xml.push_str("<w:spacing");
            if let Some(before) = self.space_before {
                write!(xml, r#" w:before="{before}""#)?;
            }
            if let Some(after) = self.space_after {
                write!(xml, r#" w:after="{after}""#)?;
            }
            if let Some(line) = self.line_spacing {
                let (value, rule) = line.attributes();
                write!(xml, r#" w:line="{value}" w:lineRule="{rule}""#)?;
            }
            xml.push_str("/>");
        }

        if self.indent_left.is_some() || self.indent_right.is_some() || self.indent_first_line.is_some()
        {
            xml.push_str("<w:ind");
            if let Some(left) = self.indent_left {
                write!(xml, r#" w:left="{left}""#)?;
            }
            if let Some(right) = self.indent_right {
                write!(xml, r#" w:right="{right}""#)?;
            }
            if let Some(first_line) = self.indent_first_line {
                if first_line.0 >= 0 {
                    write!(xml, r#" w:firstLine="{first_line}""#)?;
                } else {
                    write!(xml, r#" w:hanging="{}""#, -first_line.0)?;
                }
            }
            xml.push_str("/>");
        }

        if let Some(alignment) = self.alignment {
            write!(xml, r#"<w:jc w:val="{}"/>"#, alignment.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_monotonic_for_flags() {
        let mut props = RunProperties::new().bold().size_pt(10);
        props.merge(&RunProperties::new().italic().size_pt(12));
        assert!(props.is_bold());
        assert!(props.is_italic());
        assert_eq!(props.font_size, Some(HalfPoints(24)));

        // An unset flag in the argument never clears an existing one.
        props.merge(&RunProperties::new());
        assert!(props.is_bold());
    }

    #[test]
    fn test_run_properties_order() {
        let props = RunProperties::new()
            .bold()
            .italic()
            .underline(UnderlineType::Single)
            .strike()
            .size_pt(12)
            .font("Arial")
            .color(Color::parse("ff0000").unwrap())
            .highlight(HighlightColor::Yellow)
            .vertical_align(VerticalAlign::Superscript)
            .spacing(CharacterSpacing {
                spacing: Some(Twips(20)),
                position: Some(4),
                kern: Some(HalfPoints(28)),
            })
            .effect(TextEffect::Shimmer)
            .style("Emphasis");

        let mut xml = String::new();
        props.write_xml(&mut xml, "<w:rPrChange/>").unwrap();

        let order = [
            "<w:rStyle ",
            "<w:rFonts ",
            "<w:b/>",
            "<w:i/>",
            "<w:strike/>",
            "<w:color w:val=\"FF0000\"/>",
            "<w:spacing ",
            "<w:kern ",
            "<w:position ",
            "<w:sz ",
            "<w:highlight ",
            "<w:u ",
            "<w:effect ",
            "<w:vertAlign ",
            "<w:rPrChange/>",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| xml.find(tag).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{xml}");
    }

    #[test]
    fn test_empty_properties_emit_nothing() {
        let mut xml = String::new();
        RunProperties::new().write_xml(&mut xml, "").unwrap();
        ParagraphProperties::new().write_xml(&mut xml, "").unwrap();
        assert!(xml.is_empty());
    }

    #[test]
    fn test_color_validation() {
        assert_eq!(Color::parse("#00ff7f").unwrap().as_str(), "00FF7F");
        assert!(Color::parse("red").is_err());
        assert!(Color::parse("12345").is_err());
    }

    #[test]
    fn test_highlight_from_str() {
        assert_eq!(
            "darkBlue".parse::<HighlightColor>().unwrap(),
            HighlightColor::DarkBlue
        );
        assert!("purple".parse::<HighlightColor>().is_err());
    }

    #[test]
    fn test_paragraph_properties_xml() {
        let props = ParagraphProperties::new()
            .style("Heading1")
            .alignment(ParagraphAlignment::Justify)
            .space_before(Twips::from_pt(12))
            .line_spacing(LineSpacing::OneAndHalf)
            .indent(Some(Twips(720)), None, Some(Twips(-360)))
            .borders(ParagraphBorders::all(Border::single()))
            .shading(Color::parse("EEEEEE").unwrap());

        let mut xml = String::new();
        props.write_xml(&mut xml, "").unwrap();
        assert!(xml.starts_with(r#"<w:pPr><w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains(r#"<w:spacing w:before="240" w:line="360" w:lineRule="auto"/>"#));
        assert!(xml.contains(r#"w:hanging="360""#));
        assert!(xml.contains(r#"<w:jc w:val="both"/>"#));
        assert!(xml.contains("<w:pBdr><w:top "));
        assert!(xml.contains(r#"w:fill="EEEEEE""#));
    }

    #[test]
    fn test_paragraph_properties_order() {
        let props = ParagraphProperties::new()
            .style("ListParagraph")
            .keep_next()
            .numbering(1, 0)
            .borders(ParagraphBorders::all(Border::single()))
            .shading(Color::parse("EEEEEE").unwrap())
            .space_before(Twips(120))
            .indent(Some(Twips(720)), None, None)
            .alignment(ParagraphAlignment::Center);

        let mut xml = String::new();
        props.write_xml(&mut xml, "<w:pPrChange/>").unwrap();

        let order = [
            "<w:pStyle ",
            "<w:keepNext/>",
            "<w:numPr>",
            "<w:pBdr>",
            "<w:shd ",
            "<w:spacing ",
            "<w:ind ",
            "<w:jc ",
            "<w:pPrChange/>",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| xml.find(tag).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{xml}");
    }
}
