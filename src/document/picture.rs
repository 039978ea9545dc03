//! Inline pictures (w:drawing / wp:inline) and EMU sizing helpers

use crate::document::Document;
use crate::error::{Error, Result};
use crate::opc::PartUri;
use crate::xml::write_empty;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

/// EMUs per inch
pub const EMUS_PER_INCH: i64 = 914_400;
/// EMUs per centimeter
pub const EMUS_PER_CM: i64 = 360_000;
/// EMUs per point
pub const EMUS_PER_POINT: i64 = 12_700;
/// Resolution assumed when converting pixels
pub const DEFAULT_DPI: i64 = 96;
/// EMUs per pixel at [`DEFAULT_DPI`]
pub const EMUS_PER_PIXEL: i64 = EMUS_PER_INCH / DEFAULT_DPI;

const PICTURE_GRAPHIC_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

pub fn emu_from_inches(inches: f64) -> i64 {
    (inches * EMUS_PER_INCH as f64).round() as i64
}

pub fn emu_from_cm(cm: f64) -> i64 {
    (cm * EMUS_PER_CM as f64).round() as i64
}

pub fn emu_from_points(points: f64) -> i64 {
    (points * EMUS_PER_POINT as f64).round() as i64
}

pub fn emu_from_pixels(pixels: u32) -> i64 {
    pixels as i64 * EMUS_PER_PIXEL
}

/// Scale `value` by `numerator / denominator`, rounding half up.
///
/// Non-positive inputs are returned unchanged; results beyond `i64::MAX` saturate.
pub fn scale_emu(value: i64, numerator: i64, denominator: i64) -> i64 {
    if value <= 0 || numerator <= 0 || denominator <= 0 {
        return value;
    }
    let scaled = (value as i128 * numerator as i128 + denominator as i128 / 2) / denominator as i128;
    i64::try_from(scaled).unwrap_or(i64::MAX)
}

/// Content type for an image file extension (case-insensitive, no dot)
pub fn image_content_type(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_ascii_lowercase().as_str() {
        "bmp" | "dib" => "image/bmp",
        "emf" => "image/x-emf",
        "gif" => "image/gif",
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "tif" | "tiff" => "image/tiff",
        "wmf" => "image/x-wmf",
        _ => return None,
    };
    Some(content_type)
}

/// Pixel dimensions of an encoded raster image
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let dimensions = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dimensions)
}

/// Resolve the final extent of a picture.
///
/// A non-positive dimension is derived from the image: both missing takes
/// the pixel size at 96 DPI, one missing keeps the source aspect ratio.
pub fn resolve_extent(bytes: &[u8], width_emu: i64, height_emu: i64) -> Result<(i64, i64)> {
    if width_emu > 0 && height_emu > 0 {
        return Ok((width_emu, height_emu));
    }

    let (px_width, px_height) = decode_dimensions(bytes)?;
    let natural_width = emu_from_pixels(px_width);
    let natural_height = emu_from_pixels(px_height);
    if natural_width <= 0 || natural_height <= 0 {
        return Err(Error::validation("image has no pixel dimensions"));
    }

    let (width, height) = match (width_emu > 0, height_emu > 0) {
        (false, false) => (natural_width, natural_height),
        (false, true) => (
            scale_emu(height_emu, natural_width, natural_height),
            height_emu,
        ),
        _ => (
            width_emu,
            scale_emu(width_emu, natural_height, natural_width),
        ),
    };

    if width <= 0 || height <= 0 {
        return Err(Error::validation(
            "picture width and height must be positive EMU values",
        ));
    }
    Ok((width, height))
}

/// Inline picture carried by a run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Picture {
    /// Relationship ID of the image part (`a:blip r:embed`)
    pub rel_id: String,
    /// Image part the relationship resolves to, `None` when unbound
    pub target: Option<PartUri>,
    pub width_emu: i64,
    pub height_emu: i64,
    /// Drawing ID (`wp:docPr id`), unique within the owning part
    pub id: u32,
    pub name: String,
    pub description: String,
}

impl Picture {
    /// Raw bytes of the embedded image
    pub fn image_data<'a>(&self, document: &'a Document) -> Result<&'a [u8]> {
        let target = self.target.as_ref().ok_or_else(|| {
            Error::Detached(format!(
                "picture '{}' is not bound to an image part",
                self.name
            ))
        })?;
        document
            .package()
            .part(target)
            .map(|part| part.data())
            .ok_or_else(|| Error::MissingPart(target.to_string()))
    }

    /// Width in inches
    pub fn width_inches(&self) -> f64 {
        self.width_emu as f64 / EMUS_PER_INCH as f64
    }

    /// Height in inches
    pub fn height_inches(&self) -> f64 {
        self.height_emu as f64 / EMUS_PER_INCH as f64
    }

    /// Write as `w:drawing` holding a `wp:inline` picture
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let cx = self.width_emu.to_string();
        let cy = self.height_emu.to_string();
        let id = self.id.to_string();
        let name = if self.name.is_empty() {
            format!("Picture {}", self.id)
        } else {
            self.name.clone()
        };

        writer.write_event(Event::Start(BytesStart::new("w:drawing")))?;

        let mut inline = BytesStart::new("wp:inline");
        for side in ["distT", "distB", "distL", "distR"] {
            inline.push_attribute((side, "0"));
        }
        writer.write_event(Event::Start(inline))?;

        write_empty(writer, "wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        write_empty(
            writer,
            "wp:docPr",
            &[
                ("id", id.as_str()),
                ("name", name.as_str()),
                ("descr", self.description.as_str()),
            ],
        )?;

        writer.write_event(Event::Start(BytesStart::new("wp:cNvGraphicFramePr")))?;
        write_empty(writer, "a:graphicFrameLocks", &[("noChangeAspect", "1")])?;
        writer.write_event(Event::End(BytesEnd::new("wp:cNvGraphicFramePr")))?;

        writer.write_event(Event::Start(BytesStart::new("a:graphic")))?;
        writer.write_event(Event::Start(
            BytesStart::new("a:graphicData").with_attributes([("uri", PICTURE_GRAPHIC_URI)]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("pic:pic")))?;

        writer.write_event(Event::Start(BytesStart::new("pic:nvPicPr")))?;
        write_empty(writer, "pic:cNvPr", &[("id", "0"), ("name", name.as_str())])?;
        write_empty(writer, "pic:cNvPicPr", &[])?;
        writer.write_event(Event::End(BytesEnd::new("pic:nvPicPr")))?;

        writer.write_event(Event::Start(BytesStart::new("pic:blipFill")))?;
        write_empty(writer, "a:blip", &[("r:embed", self.rel_id.as_str())])?;
        writer.write_event(Event::Start(BytesStart::new("a:stretch")))?;
        write_empty(writer, "a:fillRect", &[])?;
        writer.write_event(Event::End(BytesEnd::new("a:stretch")))?;
        writer.write_event(Event::End(BytesEnd::new("pic:blipFill")))?;

        writer.write_event(Event::Start(BytesStart::new("pic:spPr")))?;
        writer.write_event(Event::Start(BytesStart::new("a:xfrm")))?;
        write_empty(writer, "a:off", &[("x", "0"), ("y", "0")])?;
        write_empty(writer, "a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        writer.write_event(Event::End(BytesEnd::new("a:xfrm")))?;
        writer.write_event(Event::Start(
            BytesStart::new("a:prstGeom").with_attributes([("prst", "rect")]),
        ))?;
        write_empty(writer, "a:avLst", &[])?;
        writer.write_event(Event::End(BytesEnd::new("a:prstGeom")))?;
        writer.write_event(Event::End(BytesEnd::new("pic:spPr")))?;

        writer.write_event(Event::End(BytesEnd::new("pic:pic")))?;
        writer.write_event(Event::End(BytesEnd::new("a:graphicData")))?;
        writer.write_event(Event::End(BytesEnd::new("a:graphic")))?;
        writer.write_event(Event::End(BytesEnd::new("wp:inline")))?;
        writer.write_event(Event::End(BytesEnd::new("w:drawing")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(emu_from_inches(1.0), 914_400);
        assert_eq!(emu_from_cm(2.54), 914_400);
        assert_eq!(emu_from_points(72.0), 914_400);
        assert_eq!(emu_from_pixels(96), 914_400);
        assert_eq!(EMUS_PER_PIXEL, 9525);
    }

    #[test]
    fn test_scale_emu_rounds_half_up() {
        assert_eq!(scale_emu(100, 1, 3), 33);
        assert_eq!(scale_emu(100, 2, 3), 67);
        assert_eq!(scale_emu(0, 2, 3), 0);
        assert_eq!(scale_emu(-5, 2, 3), -5);
    }

    #[test]
    fn test_scale_emu_large_extents() {
        assert_eq!(scale_emu(i64::MAX, 4, 4), i64::MAX);
        assert_eq!(scale_emu(i64::MAX / 2, 3, 2), i64::MAX);
        assert_eq!(scale_emu(i64::MAX, 1, 2), i64::MAX / 2 + 1);
    }

    #[test]
    fn test_image_content_types() {
        assert_eq!(image_content_type("PNG"), Some("image/png"));
        assert_eq!(image_content_type("jfif"), Some("image/jpeg"));
        assert_eq!(image_content_type("dib"), Some("image/bmp"));
        assert_eq!(image_content_type("wmf"), Some("image/x-wmf"));
        assert_eq!(image_content_type("svg"), None);
    }

    #[test]
    fn test_explicit_extent_skips_decoding() {
        assert_eq!(resolve_extent(b"not an image", 10, 20).unwrap(), (10, 20));
        assert!(resolve_extent(b"not an image", 0, 20).is_err());
    }

    #[test]
    fn test_drawing_markup() {
        let picture = Picture {
            rel_id: "rId4".into(),
            width_emu: 19050,
            height_emu: 9525,
            id: 1,
            description: "logo".into(),
            ..Default::default()
        };
        let mut writer = Writer::new(Vec::new());
        picture.write_to(&mut writer).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();

        assert!(xml.starts_with(r#"<w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#));
        assert!(xml.contains(r#"<wp:extent cx="19050" cy="9525"/>"#));
        assert!(xml.contains(r#"<wp:docPr id="1" name="Picture 1" descr="logo"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId4"/>"#));
        assert!(xml.ends_with("</wp:inline></w:drawing>"));
    }
}
