/// Image support for DOCX documents.
use crate::common::unit::Emu;
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, part_name};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

use super::doc::Document;
use super::run::{Run, RunContent};

/// Image content types by lower-case file extension.
static IMAGE_CONTENT_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "png" => ct::PNG,
    "jpg" => ct::JPEG,
    "jpeg" => ct::JPEG,
    "gif" => ct::GIF,
    "bmp" => ct::BMP,
    "tif" => ct::TIFF,
    "tiff" => ct::TIFF,
    "webp" => ct::WEBP,
    "emf" => ct::X_EMF,
    "wmf" => ct::X_WMF,
    "svg" => ct::SVG,
};

/// Default border width for drawings (0.75pt).
pub const DEFAULT_BORDER_WIDTH: Emu = Emu(9525);

/// Look up the content type for a file name's extension.
///
/// # Errors
///
/// `UnsupportedFormat` when the extension is missing or not an image type.
pub fn image_content_type(file_name: &str) -> Result<&'static str> {
    let ext = extension(file_name);
    IMAGE_CONTENT_TYPES
        .get(ext.as_str())
        .copied()
        .ok_or_else(|| OoxmlError::UnsupportedFormat(format!("image extension {ext:?}")))
}

fn extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map_or("", |(_, ext)| ext)
        .to_ascii_lowercase()
}

/// Binary image data stored under `word/media/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Relationship id used by drawings (`rIdImage{n}`)
    pub(crate) id: String,
    /// Part file name (`image{n}.{ext}`)
    pub(crate) file_name: String,
    pub(crate) content_type: &'static str,
    pub(crate) data: Vec<u8>,
}

impl Image {
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        self.content_type
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Path of the media part inside the package.
    pub(crate) fn part_name(&self) -> String {
        format!("{}{}", part_name::MEDIA_DIR, self.file_name)
    }
}

/// Text wrapping around a floating drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapType {
    Square,
    TopAndBottom,
    /// In front of text
    None,
    BehindText,
}

/// How a drawing sits in the text flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawingPlacement {
    Inline,
    /// Floating, offset from the column (horizontal) and paragraph (vertical)
    Anchor {
        h_offset: Emu,
        v_offset: Emu,
        wrap: WrapType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingBorder {
    /// Outline color, `RRGGBB`
    pub color: String,
    pub width: Emu,
}

impl Default for DrawingBorder {
    fn default() -> Self {
        Self {
            color: "000000".to_string(),
            width: DEFAULT_BORDER_WIDTH,
        }
    }
}

/// A picture placed in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawing {
    pub(crate) image_id: String,
    /// `wp:docPr` id, unique within the document
    pub(crate) id: u32,
    pub(crate) placement: DrawingPlacement,
    pub(crate) width: Emu,
    pub(crate) height: Emu,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) border: Option<DrawingBorder>,
    pub(crate) shadow: bool,
}

impl Drawing {
    /// Create an inline drawing of `image_id` with an explicit size.
    pub fn new(image_id: impl Into<String>, width: Emu, height: Emu) -> Self {
        Self {
            image_id: image_id.into(),
            id: 0,
            placement: DrawingPlacement::Inline,
            width,
            height,
            name: String::new(),
            description: String::new(),
            border: None,
            shadow: false,
        }
    }

    /// Size in pixels at 96 DPI.
    pub fn from_pixels(image_id: impl Into<String>, width: i64, height: i64) -> Self {
        Self::new(image_id, Emu::from_px(width), Emu::from_px(height))
    }

    pub fn from_inches(image_id: impl Into<String>, width: f64, height: f64) -> Self {
        Self::new(image_id, Emu::from_inches_f64(width), Emu::from_inches_f64(height))
    }

    pub fn from_cm(image_id: impl Into<String>, width: f64, height: f64) -> Self {
        Self::new(image_id, Emu::from_cm_f64(width), Emu::from_cm_f64(height))
    }

    pub fn floating(mut self, h_offset: Emu, v_offset: Emu, wrap: WrapType) -> Self {
        self.placement = DrawingPlacement::Anchor {
            h_offset,
            v_offset,
            wrap,
        };
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_border(mut self, border: DrawingBorder) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_shadow(mut self) -> Self {
        self.shadow = true;
        self
    }

    #[inline]
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    #[inline]
    pub fn placement(&self) -> DrawingPlacement {
        self.placement
    }

    #[inline]
    pub fn size(&self) -> (Emu, Emu) {
        (self.width, self.height)
    }

    pub(crate) fn write_xml(&self, xml: &mut String) -> Result<()> {
        let (cx, cy) = (self.width, self.height);
        let name = if self.name.is_empty() {
            format!("Picture {}", self.id)
        } else {
            escape_xml(&self.name)
        };
        let descr = escape_xml(&self.description);

        xml.push_str("<w:drawing>");
        match self.placement {
            DrawingPlacement::Inline => {
                xml.push_str(r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#);
                write!(xml, r#"<wp:extent cx="{cx}" cy="{cy}"/>"#)?;
            },
            DrawingPlacement::Anchor {
                h_offset,
                v_offset,
                wrap,
            } => {
                let behind = u8::from(wrap == WrapType::BehindText);
                write!(
                    xml,
                    r#"<wp:anchor distT="0" distB="0" distL="114300" distR="114300" simplePos="0" relativeHeight="{}" behindDoc="{behind}" locked="0" layoutInCell="1" allowOverlap="1">"#,
                    251_658_240 + self.id
                )?;
                xml.push_str(r#"<wp:simplePos x="0" y="0"/>"#);
                write!(
                    xml,
                    r#"<wp:positionH relativeFrom="column"><wp:posOffset>{h_offset}</wp:posOffset></wp:positionH><wp:positionV relativeFrom="paragraph"><wp:posOffset>{v_offset}</wp:posOffset></wp:positionV>"#
                )?;
                write!(xml, r#"<wp:extent cx="{cx}" cy="{cy}"/>"#)?;
                xml.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
                xml.push_str(match wrap {
                    WrapType::Square => r#"<wp:wrapSquare wrapText="bothSides"/>"#,
                    WrapType::TopAndBottom => "<wp:wrapTopAndBottom/>",
                    WrapType::None | WrapType::BehindText => "<wp:wrapNone/>",
                });
            },
        }
        if self.placement == DrawingPlacement::Inline {
            xml.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
        }

        write!(
            xml,
            r#"<wp:docPr id="{}" name="{name}" descr="{descr}"/>"#,
            self.id
        )?;
        xml.push_str(
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
        );
        xml.push_str(
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic>"#,
        );
        write!(
            xml,
            r#"<pic:nvPicPr><pic:cNvPr id="0" name="{name}" descr="{descr}"/><pic:cNvPicPr/></pic:nvPicPr>"#
        )?;
        write!(
            xml,
            r#"<pic:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            escape_xml(&self.image_id)
        )?;
        write!(
            xml,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#
        )?;
        if let Some(ref border) = self.border {
            write!(
                xml,
                r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                border.width,
                escape_xml(&border.color)
            )?;
        }
        if self.shadow {
            xml.push_str(
                r#"<a:effectLst><a:outerShdw blurRad="40000" dist="23000" dir="5400000" rotWithShape="0"><a:srgbClr val="000000"><a:alpha val="35000"/></a:srgbClr></a:outerShdw></a:effectLst>"#,
            );
        }
        xml.push_str("</pic:spPr></pic:pic></a:graphicData></a:graphic>");

        xml.push_str(match self.placement {
            DrawingPlacement::Inline => "</wp:inline>",
            DrawingPlacement::Anchor { .. } => "</wp:anchor>",
        });
        xml.push_str("</w:drawing>");
        Ok(())
    }
}

impl Document {
    /// Store image bytes and return the id drawings use to reference them.
    ///
    /// The content type follows the file extension. Unknown extensions are
    /// stored as PNG with a warning.
    pub fn add_image(&mut self, name: &str, data: Vec<u8>) -> String {
        let n = self.ids.image.next_id();
        let (ext, content_type) = match image_content_type(name) {
            Ok(content_type) => (extension(name), content_type),
            Err(_) => {
                log::warn!("unknown image extension for {name:?}, storing as PNG");
                ("png".to_string(), ct::PNG)
            },
        };

        let image = Image {
            id: format!("rIdImage{n}"),
            file_name: format!("image{n}.{ext}"),
            content_type,
            data,
        };
        let id = image.id.clone();
        log::debug!("added image {id} as {}", image.file_name);
        self.images.push(image);
        id
    }

    /// Decode a base64 payload and store it as with [`add_image`](Self::add_image).
    pub fn add_image_base64(&mut self, name: &str, encoded: &str) -> Result<String> {
        let data = BASE64
            .decode(encoded.trim())
            .map_err(|e| OoxmlError::InvalidEncoding(e.to_string()))?;
        Ok(self.add_image(name, data))
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|img| img.id == id)
    }

    /// Append an inline picture of a stored image to a paragraph.
    ///
    /// # Errors
    ///
    /// `DimensionRequired` when either size is missing, `NotFound` for an
    /// unknown image, `InvalidIndex` for a bad paragraph index.
    pub fn insert_image(
        &mut self,
        paragraph_index: usize,
        image_id: &str,
        width: Option<Emu>,
        height: Option<Emu>,
    ) -> Result<u32> {
        let (Some(width), Some(height)) = (width, height) else {
            return Err(OoxmlError::DimensionRequired);
        };
        self.insert_drawing(paragraph_index, Drawing::new(image_id, width, height))
    }

    /// Append a floating picture anchored to a paragraph.
    pub fn insert_floating_image(
        &mut self,
        paragraph_index: usize,
        image_id: &str,
        width: Option<Emu>,
        height: Option<Emu>,
        offset: (Emu, Emu),
        wrap: WrapType,
    ) -> Result<u32> {
        let (Some(width), Some(height)) = (width, height) else {
            return Err(OoxmlError::DimensionRequired);
        };
        let drawing = Drawing::new(image_id, width, height).floating(offset.0, offset.1, wrap);
        self.insert_drawing(paragraph_index, drawing)
    }

    /// Append a prepared drawing to a paragraph and return its drawing id.
    pub fn insert_drawing(&mut self, paragraph_index: usize, mut drawing: Drawing) -> Result<u32> {
        if self.image(&drawing.image_id).is_none() {
            return Err(OoxmlError::not_found("image", &drawing.image_id));
        }
        self.paragraph(paragraph_index)?;

        drawing.id = self.ids.drawing.next_id() as u32;
        let id = drawing.id;
        self.paragraph_mut(paragraph_index)?
            .add_run(Run::new(RunContent::Drawing(drawing)));
        Ok(id)
    }
}
