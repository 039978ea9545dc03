//! Section properties (w:sectPr)

use crate::error::Result;
use crate::opc::PartUri;
use crate::xml::{write_empty, write_val};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Write;

/// A4 portrait width in twips
pub const DEFAULT_PAGE_WIDTH: i32 = 11906;
/// A4 portrait height in twips
pub const DEFAULT_PAGE_HEIGHT: i32 = 16838;
/// One inch in twips
pub const DEFAULT_MARGIN: i32 = 1440;

/// Section break (w:sectPr), either body-level or anchored to a paragraph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub start: SectionStart,
    /// Page width in twips
    pub page_width: i32,
    /// Page height in twips
    pub page_height: i32,
    pub orientation: Option<Orientation>,
    pub margins: PageMargins,
    pub headers: BTreeMap<HeaderFooterType, HeaderFooterRef>,
    pub footers: BTreeMap<HeaderFooterType, HeaderFooterRef>,
}

/// How a section begins (w:type)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SectionStart {
    #[default]
    Continuous,
    NewPage,
    NewColumn,
    EvenPage,
    OddPage,
}

impl SectionStart {
    pub fn parse(s: &str) -> Self {
        match s {
            "nextPage" => SectionStart::NewPage,
            "nextColumn" => SectionStart::NewColumn,
            "evenPage" => SectionStart::EvenPage,
            "oddPage" => SectionStart::OddPage,
            _ => SectionStart::Continuous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionStart::Continuous => "continuous",
            SectionStart::NewPage => "nextPage",
            SectionStart::NewColumn => "nextColumn",
            SectionStart::EvenPage => "evenPage",
            SectionStart::OddPage => "oddPage",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn parse(s: &str) -> Self {
        match s {
            "landscape" => Orientation::Landscape,
            _ => Orientation::Portrait,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// Page margins (w:pgMar) in twips
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Default for PageMargins {
    fn default() -> Self {
        PageMargins {
            top: DEFAULT_MARGIN,
            right: DEFAULT_MARGIN,
            bottom: DEFAULT_MARGIN,
            left: DEFAULT_MARGIN,
        }
    }
}

/// Which pages a header or footer applies to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeaderFooterType {
    #[default]
    Default,
    First,
    Even,
}

impl HeaderFooterType {
    pub fn parse(s: &str) -> Self {
        match s {
            "first" => HeaderFooterType::First,
            "even" => HeaderFooterType::Even,
            _ => HeaderFooterType::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFooterType::Default => "default",
            HeaderFooterType::First => "first",
            HeaderFooterType::Even => "even",
        }
    }
}

/// Reference from a section to a header or footer part
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderFooterRef {
    /// Relationship ID on the owning part
    pub rel_id: String,
    /// Part the relationship resolves to
    pub part: PartUri,
}

impl Default for Section {
    fn default() -> Self {
        Section {
            start: SectionStart::Continuous,
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            orientation: None,
            margins: PageMargins::default(),
            headers: BTreeMap::new(),
            footers: BTreeMap::new(),
        }
    }
}

impl Section {
    /// Section with A4 portrait page and one-inch margins
    pub fn new(start: SectionStart) -> Self {
        Section {
            start,
            ..Default::default()
        }
    }

    pub fn set_start(&mut self, start: SectionStart) {
        self.start = start;
    }

    /// Set page size in twips
    pub fn set_page_size(&mut self, width: i32, height: i32) {
        self.page_width = width;
        self.page_height = height;
    }

    /// Set orientation, swapping width and height when they disagree with it
    pub fn set_orientation(&mut self, orientation: Orientation) {
        let landscape_shape = self.page_width > self.page_height;
        let wants_landscape = orientation == Orientation::Landscape;
        if landscape_shape != wants_landscape && self.page_width != self.page_height {
            std::mem::swap(&mut self.page_width, &mut self.page_height);
        }
        self.orientation = Some(orientation);
    }

    /// Set margins in twips
    pub fn set_margins(&mut self, top: i32, right: i32, bottom: i32, left: i32) {
        self.margins = PageMargins {
            top,
            right,
            bottom,
            left,
        };
    }

    pub fn header_ref(&self, kind: HeaderFooterType) -> Option<&HeaderFooterRef> {
        self.headers.get(&kind)
    }

    pub fn footer_ref(&self, kind: HeaderFooterType) -> Option<&HeaderFooterRef> {
        self.footers.get(&kind)
    }

    /// Write to XML writer
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:sectPr")))?;

        for (tag, refs) in [
            ("w:headerReference", &self.headers),
            ("w:footerReference", &self.footers),
        ] {
            for (kind, reference) in refs {
                write_empty(
                    writer,
                    tag,
                    &[("w:type", kind.as_str()), ("r:id", reference.rel_id.as_str())],
                )?;
            }
        }

        if self.start != SectionStart::Continuous {
            write_val(writer, "w:type", self.start.as_str())?;
        }

        let width = self.page_width.to_string();
        let height = self.page_height.to_string();
        let mut page_size = vec![("w:w", width.as_str()), ("w:h", height.as_str())];
        if let Some(orientation) = self.orientation {
            page_size.push(("w:orient", orientation.as_str()));
        }
        write_empty(writer, "w:pgSz", &page_size)?;

        let margins = [
            self.margins.top.to_string(),
            self.margins.right.to_string(),
            self.margins.bottom.to_string(),
            self.margins.left.to_string(),
        ];
        write_empty(
            writer,
            "w:pgMar",
            &[
                ("w:top", margins[0].as_str()),
                ("w:right", margins[1].as_str()),
                ("w:bottom", margins[2].as_str()),
                ("w:left", margins[3].as_str()),
            ],
        )?;

        writer.write_event(Event::End(BytesEnd::new("w:sectPr")))?;
        Ok(())
    }
}
