//! Border and shading values shared by paragraphs, tables and cells

use crate::error::Result;
use crate::xml::{get_attr, get_int, write_empty};
use quick_xml::events::BytesStart;
use quick_xml::Writer;
use std::io::Write;

/// One border line (`w:top`, `w:insideH`, ...)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Border {
    /// Line style (`single`, `double`, `dashed`, ...); empty means no border
    pub style: String,
    /// Color as hex RGB or `auto`
    pub color: String,
    /// Width in eighths of a point
    pub size: i32,
    /// Spacing from the content in points
    pub space: i32,
    pub shadow: bool,
}

impl Border {
    /// A border with the given style, size in eighths of a point, and color
    pub fn new(style: impl Into<String>, size: i32, color: impl Into<String>) -> Self {
        Border {
            style: style.into(),
            size,
            color: color.into(),
            ..Default::default()
        }
    }

    /// Read the attributes of a border element
    pub(crate) fn from_element(e: &BytesStart) -> Self {
        Border {
            style: get_attr(e, "val").unwrap_or_default(),
            color: get_attr(e, "color").unwrap_or_default(),
            size: get_int(e, "sz").unwrap_or(0),
            space: get_int(e, "space").unwrap_or(0),
            shadow: get_attr(e, "shadow")
                .map(|v| matches!(v.as_str(), "1" | "true" | "on"))
                .unwrap_or(false),
        }
    }

    fn color_or_auto(&self) -> &str {
        non_empty_or(&self.color, "auto")
    }

    /// Paragraph form: size and space only when positive, shadow only when set
    pub(crate) fn write_paragraph_form<W: Write>(
        &self,
        writer: &mut Writer<W>,
        tag: &str,
    ) -> Result<()> {
        let size = self.size.to_string();
        let space = self.space.to_string();
        let mut attrs = vec![("w:val", self.style.as_str())];
        if self.size > 0 {
            attrs.push(("w:sz", size.as_str()));
        }
        if self.space > 0 {
            attrs.push(("w:space", space.as_str()));
        }
        attrs.push(("w:color", self.color_or_auto()));
        if self.shadow {
            attrs.push(("w:shadow", "1"));
        }
        write_empty(writer, tag, &attrs)
    }

    /// Table form: every attribute written, negative sizes clamped to zero
    pub(crate) fn write_table_form<W: Write>(&self, writer: &mut Writer<W>, tag: &str) -> Result<()> {
        let size = self.size.max(0).to_string();
        let space = self.space.max(0).to_string();
        write_empty(
            writer,
            tag,
            &[
                ("w:val", self.style.as_str()),
                ("w:sz", size.as_str()),
                ("w:space", space.as_str()),
                ("w:color", self.color_or_auto()),
            ],
        )
    }
}

/// Background shading (`w:shd`)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shading {
    /// Pattern (`clear`, `solid`, `pct10`, ...); empty writes `clear`
    pub pattern: String,
    /// Fill color; empty writes `auto`
    pub fill: String,
    /// Pattern color; empty writes `auto`
    pub color: String,
}

impl Shading {
    /// Create shading from pattern, fill and pattern color
    pub fn new(
        pattern: impl Into<String>,
        fill: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Shading {
            pattern: pattern.into(),
            fill: fill.into(),
            color: color.into(),
        }
    }

    pub(crate) fn from_element(e: &BytesStart) -> Self {
        Shading {
            pattern: get_attr(e, "val").unwrap_or_default(),
            fill: get_attr(e, "fill").unwrap_or_default(),
            color: get_attr(e, "color").unwrap_or_default(),
        }
    }

    pub(crate) fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        write_empty(
            writer,
            "w:shd",
            &[
                ("w:val", non_empty_or(&self.pattern, "clear")),
                ("w:color", non_empty_or(&self.color, "auto")),
                ("w:fill", non_empty_or(&self.fill, "auto")),
            ],
        )
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(f: impl FnOnce(&mut Writer<Vec<u8>>) -> Result<()>) -> String {
        let mut writer = Writer::new(Vec::new());
        f(&mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_paragraph_border_omits_zero_values() {
        let border = Border::new("single", 0, "");
        let xml = render(|w| border.write_paragraph_form(w, "w:top"));
        assert_eq!(xml, r#"<w:top w:val="single" w:color="auto"/>"#);

        let border = Border {
            space: 4,
            shadow: true,
            ..Border::new("double", 12, "FF0000")
        };
        let xml = render(|w| border.write_paragraph_form(w, "w:bottom"));
        assert_eq!(
            xml,
            r#"<w:bottom w:val="double" w:sz="12" w:space="4" w:color="FF0000" w:shadow="1"/>"#
        );
    }

    #[test]
    fn test_table_border_writes_everything() {
        let border = Border::new("single", -3, "");
        let xml = render(|w| border.write_table_form(w, "w:insideH"));
        assert_eq!(
            xml,
            r#"<w:insideH w:val="single" w:sz="0" w:space="0" w:color="auto"/>"#
        );
    }

    #[test]
    fn test_shading_defaults() {
        let xml = render(|w| Shading::default().write_to(w));
        assert_eq!(xml, r#"<w:shd w:val="clear" w:color="auto" w:fill="auto"/>"#);
    }
}
