//! Run element (w:r) - a contiguous run of text with uniform formatting

use crate::document::writer::WriteContext;
use crate::document::Picture;
use crate::error::Result;
use crate::xml::{write_empty, write_val};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Font size in half-points when none is given (11pt)
pub const DEFAULT_SIZE: i32 = 22;
/// Font family when none is given
pub const DEFAULT_FONT: &str = "Calibri";

/// Run element (w:r)
///
/// Every formatting field has a default, and only fields that differ from
/// it are serialized, so a plain run has no `w:rPr` at all.
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub double_strike: bool,
    pub small_caps: bool,
    pub all_caps: bool,
    pub shadow: bool,
    pub outline: bool,
    pub emboss: bool,
    pub imprint: bool,
    /// Underline style; `none` means no underline
    pub underline: String,
    /// Font size in half-points
    pub size: i32,
    /// Text color as hex RGB or `auto`
    pub color: String,
    pub font: String,
    /// Highlight color name or `auto`
    pub highlight: String,
    /// Character spacing adjustment in twentieths of a point
    pub char_spacing: Option<i32>,
    /// Kerning threshold in half-points
    pub kern: Option<i32>,
    /// Baseline shift in half-points
    pub position: Option<i32>,
    pub hyperlink: Option<Hyperlink>,
    /// Break written after the text
    pub break_type: Option<BreakType>,
    pub picture: Option<Picture>,
}

/// Link target of a run: an external URL or a bookmark in this document
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hyperlink {
    External(String),
    Anchor(String),
}

/// Break type (w:br)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakType {
    /// Line break
    #[default]
    TextWrapping,
    Page,
    Column,
}

impl BreakType {
    /// Parse the `w:type` attribute; anything unknown is a line break
    pub fn parse(s: &str) -> Self {
        match s {
            "page" => BreakType::Page,
            "column" => BreakType::Column,
            _ => BreakType::TextWrapping,
        }
    }
}

impl Default for Run {
    fn default() -> Self {
        Run {
            text: String::new(),
            bold: false,
            italic: false,
            strike: false,
            double_strike: false,
            small_caps: false,
            all_caps: false,
            shadow: false,
            outline: false,
            emboss: false,
            imprint: false,
            underline: "none".into(),
            size: DEFAULT_SIZE,
            color: "auto".into(),
            font: DEFAULT_FONT.into(),
            highlight: "auto".into(),
            char_spacing: None,
            kern: None,
            position: None,
            hyperlink: None,
            break_type: None,
            picture: None,
        }
    }
}

impl Run {
    /// Create a new run with text
    pub fn new(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Get font size in points
    pub fn font_size_pt(&self) -> f32 {
        self.size as f32 / 2.0
    }

    /// Set font size in points (rounded to half-points)
    pub fn set_font_size_pt(&mut self, size: f32) {
        self.size = (size * 2.0).round() as i32;
    }

    /// Link the run to an external URL, replacing any anchor
    pub fn set_hyperlink_url(&mut self, url: impl Into<String>) {
        self.hyperlink = Some(Hyperlink::External(url.into()));
    }

    /// Link the run to a bookmark, replacing any URL
    pub fn set_hyperlink_anchor(&mut self, anchor: impl Into<String>) {
        self.hyperlink = Some(Hyperlink::Anchor(anchor.into()));
    }

    pub fn clear_hyperlink(&mut self) {
        self.hyperlink = None;
    }

    /// External URL of the hyperlink, if any
    pub fn hyperlink_url(&self) -> Option<&str> {
        match &self.hyperlink {
            Some(Hyperlink::External(url)) => Some(url),
            _ => None,
        }
    }

    /// Bookmark name of the hyperlink, if any
    pub fn hyperlink_anchor(&self) -> Option<&str> {
        match &self.hyperlink {
            Some(Hyperlink::Anchor(anchor)) => Some(anchor),
            _ => None,
        }
    }

    /// Set or clear the break written after the run's text
    pub fn set_break(&mut self, break_type: Option<BreakType>) {
        self.break_type = break_type;
    }

    pub fn picture(&self) -> Option<&Picture> {
        self.picture.as_ref()
    }

    /// Whether no formatting field differs from its default
    pub fn has_default_formatting(&self) -> bool {
        let defaults = Run {
            text: self.text.clone(),
            hyperlink: self.hyperlink.clone(),
            break_type: self.break_type,
            picture: self.picture.clone(),
            ..Default::default()
        };
        *self == defaults
    }

    /// Write to XML writer, wrapped in `w:hyperlink` when linked
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>, ctx: &mut WriteContext) -> Result<()> {
        if let Some(link) = &self.hyperlink {
            let mut start = BytesStart::new("w:hyperlink");
            match link {
                Hyperlink::External(url) => {
                    let id = ctx.hyperlink_id(url);
                    start.push_attribute(("r:id", id.as_str()));
                }
                Hyperlink::Anchor(anchor) => start.push_attribute(("w:anchor", anchor.as_str())),
            }
            writer.write_event(Event::Start(start))?;
            self.write_run(writer)?;
            writer.write_event(Event::End(BytesEnd::new("w:hyperlink")))?;
            Ok(())
        } else {
            self.write_run(writer)
        }
    }

    fn write_run<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:r")))?;

        self.write_properties(writer)?;

        if !self.text.is_empty() {
            write_text(writer, &self.text)?;
        }
        if let Some(picture) = &self.picture {
            picture.write_to(writer)?;
        }
        if let Some(break_type) = self.break_type {
            match break_type {
                BreakType::Page => write_empty(writer, "w:br", &[("w:type", "page")])?,
                BreakType::Column => write_empty(writer, "w:br", &[("w:type", "column")])?,
                BreakType::TextWrapping => write_empty(writer, "w:br", &[])?,
            }
        }
        if self.text.is_empty() && self.picture.is_none() && self.break_type.is_none() {
            write_empty(writer, "w:t", &[])?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        Ok(())
    }

    /// Write `w:rPr` holding only the fields that differ from the defaults
    fn write_properties<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let toggles = [
            ("w:b", self.bold),
            ("w:i", self.italic),
            ("w:strike", self.strike),
            ("w:dstrike", self.double_strike),
            ("w:smallCaps", self.small_caps),
            ("w:caps", self.all_caps),
            ("w:shadow", self.shadow),
            ("w:outline", self.outline),
            ("w:emboss", self.emboss),
            ("w:imprint", self.imprint),
        ];
        let underline = is_set(&self.underline, "none").then_some(self.underline.as_str());
        let size = (self.size != DEFAULT_SIZE && self.size > 0).then(|| self.size.to_string());
        let color = is_set(&self.color, "auto").then_some(self.color.as_str());
        let font = is_set(&self.font, DEFAULT_FONT).then_some(self.font.as_str());
        let highlight = is_set(&self.highlight, "auto").then_some(self.highlight.as_str());

        let has_content = toggles.iter().any(|(_, on)| *on)
            || underline.is_some()
            || size.is_some()
            || color.is_some()
            || font.is_some()
            || highlight.is_some()
            || self.char_spacing.is_some()
            || self.kern.is_some()
            || self.position.is_some();

        if !has_content {
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;

        for (tag, on) in toggles {
            if on {
                write_empty(writer, tag, &[])?;
            }
        }
        if let Some(underline) = underline {
            write_val(writer, "w:u", underline)?;
        }
        if let Some(size) = &size {
            write_val(writer, "w:sz", size)?;
            write_val(writer, "w:szCs", size)?;
        }
        if let Some(color) = color {
            write_val(writer, "w:color", color)?;
        }
        if let Some(font) = font {
            write_empty(writer, "w:rFonts", &[("w:ascii", font), ("w:hAnsi", font)])?;
        }
        if let Some(highlight) = highlight {
            write_val(writer, "w:highlight", highlight)?;
        }
        if let Some(spacing) = self.char_spacing {
            write_val(writer, "w:spacing", &spacing.to_string())?;
        }
        if let Some(kern) = self.kern {
            write_val(writer, "w:kern", &kern.to_string())?;
        }
        if let Some(position) = self.position {
            write_val(writer, "w:position", &position.to_string())?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        Ok(())
    }
}

fn is_set(value: &str, default: &str) -> bool {
    !value.is_empty() && value != default
}

/// Write text as `w:t` segments, turning tab characters into `w:tab`
fn write_text<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    for (i, segment) in text.split('\t').enumerate() {
        if i > 0 {
            write_empty(writer, "w:tab", &[])?;
        }
        if segment.is_empty() {
            continue;
        }
        let mut start = BytesStart::new("w:t");
        if needs_preserve(segment) {
            start.push_attribute(("xml:space", "preserve"));
        }
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(segment)))?;
        writer.write_event(Event::End(BytesEnd::new("w:t")))?;
    }
    Ok(())
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
        || text.contains("  ")
}
