//! Body parser: builds the document tree from a part's XML event stream

use crate::document::formatting::{Border, Shading};
use crate::document::paragraph::{LineRule, TabAlignment, TabLeader, TabStop};
use crate::document::table::{
    CellMargins, TableAlignment, TableBorderSide, TableCell, TableLayout, TableLook, TableRow,
    TableWidth, VMerge, VerticalAlignment, DEFAULT_CELL_WIDTH, MAX_GRID_SPAN,
};
use crate::document::{
    Alignment, Body, BodyElement, BreakType, HeaderFooterRef, HeaderFooterType, Hyperlink,
    Orientation, Paragraph, ParagraphBorderSide, Picture, Run, Section, SectionStart, Table,
};
use crate::error::{Error, Result};
use crate::opc::{PartUri, Relationships, TargetMode};
use crate::xml::{get_attr, get_int, get_val, parse_on_off, skip_element, unexpected_eof};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Relationships of the part being parsed, plus the part-scoped drawing counter
pub(crate) struct ReadContext<'a> {
    owner: &'a PartUri,
    rels: &'a Relationships,
    /// Highest `wp:docPr` id seen so far
    pub max_drawing_id: u32,
}

impl<'a> ReadContext<'a> {
    pub fn new(owner: &'a PartUri, rels: &'a Relationships) -> Self {
        ReadContext {
            owner,
            rels,
            max_drawing_id: 0,
        }
    }

    /// Resolve a relationship ID; a missing ID is logged and yields `None`
    fn resolve(&self, id: &str, what: &str) -> Option<(&'a str, TargetMode)> {
        let resolved = self.rels.resolve(id);
        if resolved.is_none() {
            log::warn!(
                "{}: {} references unknown relationship '{}', ignoring it",
                self.owner,
                what,
                id
            );
        }
        resolved
    }

    /// Resolve a relationship ID to a part inside the package
    fn resolve_part(&self, id: &str, what: &str) -> Option<PartUri> {
        match self.resolve(id, what)? {
            (target, TargetMode::Internal) => match self.owner.resolve(target) {
                Ok(uri) => Some(uri),
                Err(e) => {
                    log::warn!("{}: bad {} target '{}': {}", self.owner, what, target, e);
                    None
                }
            },
            (target, TargetMode::External) => {
                log::warn!(
                    "{}: {} relationship '{}' points outside the package ({})",
                    self.owner,
                    what,
                    id,
                    target
                );
                None
            }
        }
    }
}

/// Parse a main document part (`w:document/w:body`)
pub(crate) fn parse_document(xml: &[u8], ctx: &mut ReadContext) -> Result<Body> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"document" => {}
                b"body" => return parse_blocks(&mut reader, &e, ctx),
                _ => skip_element(&mut reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"body" => return Ok(Body::default()),
            Event::Eof => return Err(Error::Format("missing w:body element".into())),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse a header (`w:hdr`) or footer (`w:ftr`) part
pub(crate) fn parse_header_footer(xml: &[u8], ctx: &mut ReadContext) -> Result<Body> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"hdr" | b"ftr" => return parse_blocks(&mut reader, &e, ctx),
                _ => skip_element(&mut reader, &e)?,
            },
            Event::Empty(e) if matches!(e.local_name().as_ref(), b"hdr" | b"ftr") => {
                return Ok(Body::default())
            }
            Event::Eof => return Err(Error::Format("missing w:hdr or w:ftr element".into())),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse block content until `start` closes.
///
/// Structured document tags are transparent so the paragraphs inside them
/// are kept.
fn parse_blocks<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    ctx: &mut ReadContext,
) -> Result<Body> {
    let mut body = Body::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    let para = parse_paragraph(reader, &e, ctx)?;
                    body.elements.push(BodyElement::Paragraph(para));
                }
                b"tbl" => {
                    let table = parse_table(reader, &e, ctx)?;
                    body.elements.push(BodyElement::Table(table));
                }
                b"sectPr" => {
                    let section = parse_section(reader, &e, ctx)?;
                    body.elements.push(BodyElement::Section(section));
                }
                b"sdt" | b"sdtContent" => {}
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => body.elements.push(BodyElement::Paragraph(Paragraph::default())),
                b"sectPr" => body.elements.push(BodyElement::Section(Section::default())),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == start.local_name().as_ref() => break,
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }

    Ok(body)
}

/// Accumulator for one `w:p` while its events stream past
struct ParagraphParser {
    paragraph: Paragraph,
    /// Run being built between `w:r` and `/w:r`
    run: Option<Run>,
    /// Inside `w:t`
    in_text: bool,
    in_ppr: bool,
    in_rpr: bool,
    /// Link applied to every run opened inside the current `w:hyperlink`
    hyperlink: Option<Hyperlink>,
}

/// Parse a paragraph (after the `w:p` start tag)
fn parse_paragraph<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    ctx: &mut ReadContext,
) -> Result<Paragraph> {
    let mut parser = ParagraphParser {
        paragraph: Paragraph::default(),
        run: None,
        in_text: false,
        in_ppr: false,
        in_rpr: false,
        hyperlink: None,
    };
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => parser.start(reader, &e, ctx)?,
            Event::Empty(e) => parser.leaf(&e),
            Event::Text(t) => {
                if parser.in_text {
                    let text = t.unescape()?;
                    parser.push_text(&text);
                }
            }
            Event::CData(c) => {
                if parser.in_text {
                    let text = std::str::from_utf8(&c)?.to_string();
                    parser.push_text(&text);
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"p" {
                    return Ok(parser.finish());
                }
                parser.end(e.local_name().as_ref());
            }
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

impl ParagraphParser {
    fn start<R: BufRead>(
        &mut self,
        reader: &mut Reader<R>,
        e: &BytesStart,
        ctx: &mut ReadContext,
    ) -> Result<()> {
        match e.local_name().as_ref() {
            b"pPr" => self.in_ppr = true,
            b"rPr" if self.run.is_some() => self.in_rpr = true,
            b"r" => {
                self.run = Some(Run {
                    hyperlink: self.hyperlink.clone(),
                    ..Default::default()
                });
            }
            b"t" if self.run.is_some() => {
                self.make_room_for_text();
                self.in_text = true;
            }
            b"hyperlink" => self.hyperlink = hyperlink_target(e, ctx),
            b"sectPr" if self.in_ppr => {
                self.paragraph.section = Some(parse_section(reader, e, ctx)?);
            }
            b"tabs" if self.in_ppr => self.paragraph.tabs = parse_tabs(reader, e)?,
            b"pBdr" if self.in_ppr => {
                self.paragraph.borders = parse_borders(reader, e, ParagraphBorderSide::from_local_name)?;
            }
            b"numPr" if self.in_ppr => self.parse_numbering(reader, e)?,
            b"drawing" => {
                let picture = parse_drawing(reader, e, ctx)?;
                if let Some(picture) = picture {
                    self.attach_picture(picture);
                }
            }
            // Wrappers whose runs belong to the paragraph
            b"ins" | b"smartTag" | b"customXml" | b"fldSimple" | b"sdt" | b"sdtContent" => {}
            _ => {
                self.leaf(e);
                skip_element(reader, e)?;
            }
        }
        Ok(())
    }

    fn end(&mut self, local: &[u8]) {
        match local {
            b"pPr" => self.in_ppr = false,
            b"rPr" => self.in_rpr = false,
            b"t" => self.in_text = false,
            b"r" => {
                if let Some(run) = self.run.take() {
                    self.paragraph.runs.push(run);
                }
                self.in_rpr = false;
                self.in_text = false;
            }
            b"hyperlink" => self.hyperlink = None,
            _ => {}
        }
    }

    /// Apply an element that carries all its data in attributes
    fn leaf(&mut self, e: &BytesStart) {
        if self.in_rpr {
            if let Some(run) = self.run.as_mut() {
                apply_run_property(run, e);
            }
            return;
        }
        if self.run.is_some() {
            self.apply_run_content(e);
            return;
        }
        if self.in_ppr {
            self.apply_paragraph_property(e);
            return;
        }
        // Content outside a run still becomes one
        if e.local_name().as_ref() == b"br" {
            let mut run = Run {
                hyperlink: self.hyperlink.clone(),
                ..Default::default()
            };
            run.break_type = Some(break_type(e));
            self.paragraph.runs.push(run);
        }
    }

    fn apply_run_content(&mut self, e: &BytesStart) {
        match e.local_name().as_ref() {
            b"tab" => {
                self.make_room_for_text();
                self.push_text("\t");
            }
            b"br" | b"cr" => {
                let kind = break_type(e);
                if self.run.as_ref().is_some_and(|r| r.break_type.is_some()) {
                    self.split_run();
                }
                if let Some(run) = self.run.as_mut() {
                    run.break_type = Some(kind);
                }
            }
            _ => {}
        }
    }

    fn apply_paragraph_property(&mut self, e: &BytesStart) {
        let para = &mut self.paragraph;
        match e.local_name().as_ref() {
            b"pStyle" => para.style = get_val(e).filter(|s| !s.is_empty()),
            b"jc" => {
                if let Some(val) = get_val(e) {
                    para.alignment = Alignment::parse(&val);
                }
            }
            b"spacing" => {
                para.spacing.before = get_int(e, "before");
                para.spacing.after = get_int(e, "after");
                para.spacing.line = get_int(e, "line");
                para.spacing.line_rule = get_attr(e, "lineRule").map(|v| LineRule::parse(&v));
            }
            b"ind" => {
                para.indent.left = get_int(e, "left").or_else(|| get_int(e, "start"));
                para.indent.right = get_int(e, "right").or_else(|| get_int(e, "end"));
                para.indent.first_line = get_int(e, "firstLine");
                para.indent.hanging = get_int(e, "hanging");
            }
            b"shd" => para.shading = Some(Shading::from_element(e)),
            b"keepNext" => para.keep_next = Some(parse_on_off(e)),
            b"keepLines" => para.keep_lines = Some(parse_on_off(e)),
            b"pageBreakBefore" => para.page_break_before = Some(parse_on_off(e)),
            b"widowControl" => para.widow_control = Some(parse_on_off(e)),
            _ => {}
        }
    }

    fn parse_numbering<R: BufRead>(&mut self, reader: &mut Reader<R>, start: &BytesStart) -> Result<()> {
        let mut level = None;
        let mut num_id = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"ilvl" => level = get_int(&e, "val"),
                    b"numId" => num_id = get_int(&e, "val"),
                    _ => {}
                },
                Event::Start(e) => skip_element(reader, &e)?,
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof(start)),
                _ => {}
            }
            buf.clear();
        }

        if let Some(num_id) = num_id {
            self.paragraph.set_numbering(num_id, level.unwrap_or(0));
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    /// Text written after a drawing or break starts a new run with the
    /// same formatting so document order survives
    fn make_room_for_text(&mut self) {
        if self
            .run
            .as_ref()
            .is_some_and(|r| r.picture.is_some() || r.break_type.is_some())
        {
            self.split_run();
        }
    }

    fn attach_picture(&mut self, picture: Picture) {
        match self.run.as_ref() {
            Some(run) if run.picture.is_some() || run.break_type.is_some() => self.split_run(),
            Some(_) => {}
            None => {
                self.paragraph.runs.push(Run {
                    hyperlink: self.hyperlink.clone(),
                    picture: Some(picture),
                    ..Default::default()
                });
                return;
            }
        }
        if let Some(run) = self.run.as_mut() {
            run.picture = Some(picture);
        }
    }

    fn split_run(&mut self) {
        if let Some(current) = self.run.take() {
            let next = Run {
                text: String::new(),
                picture: None,
                break_type: None,
                ..current.clone()
            };
            self.paragraph.runs.push(current);
            self.run = Some(next);
        }
    }

    fn finish(mut self) -> Paragraph {
        if let Some(run) = self.run.take() {
            self.paragraph.runs.push(run);
        }
        self.paragraph
    }
}

fn apply_run_property(run: &mut Run, e: &BytesStart) {
    match e.local_name().as_ref() {
        b"b" => run.bold = parse_on_off(e),
        b"i" => run.italic = parse_on_off(e),
        b"strike" => run.strike = parse_on_off(e),
        b"dstrike" => run.double_strike = parse_on_off(e),
        b"smallCaps" => run.small_caps = parse_on_off(e),
        b"caps" => run.all_caps = parse_on_off(e),
        b"shadow" => run.shadow = parse_on_off(e),
        b"outline" => run.outline = parse_on_off(e),
        b"emboss" => run.emboss = parse_on_off(e),
        b"imprint" => run.imprint = parse_on_off(e),
        b"u" => run.underline = get_val(e).unwrap_or_else(|| "single".into()),
        b"sz" => {
            if let Some(size) = get_int(e, "val") {
                run.size = size;
            }
        }
        b"color" => {
            if let Some(color) = get_val(e) {
                run.color = color;
            }
        }
        b"rFonts" => {
            if let Some(font) = get_attr(e, "ascii").or_else(|| get_attr(e, "hAnsi")) {
                run.font = font;
            }
        }
        b"highlight" => {
            if let Some(highlight) = get_val(e) {
                run.highlight = highlight;
            }
        }
        b"spacing" => run.char_spacing = get_int(e, "val"),
        b"kern" => run.kern = get_int(e, "val"),
        b"position" => run.position = get_int(e, "val"),
        _ => {}
    }
}

fn break_type(e: &BytesStart) -> BreakType {
    get_attr(e, "type")
        .map(|t| BreakType::parse(&t))
        .unwrap_or_default()
}

/// External relationship target first, then `w:anchor`, then an internal target
fn hyperlink_target(e: &BytesStart, ctx: &ReadContext) -> Option<Hyperlink> {
    let resolved = get_attr(e, "id").and_then(|id| ctx.resolve(&id, "hyperlink"));
    if let Some((target, TargetMode::External)) = resolved {
        return Some(Hyperlink::External(target.to_string()));
    }
    if let Some(anchor) = get_attr(e, "anchor") {
        return Some(Hyperlink::Anchor(anchor));
    }
    resolved.map(|(target, _)| Hyperlink::Anchor(target.to_string()))
}

fn parse_tabs<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Vec<TabStop>> {
    let mut tabs = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if e.local_name().as_ref() == b"tab" => {
                tabs.push(TabStop {
                    position: get_int(&e, "pos").unwrap_or(0),
                    alignment: get_val(&e)
                        .map(|v| TabAlignment::parse(&v))
                        .unwrap_or_default(),
                    leader: get_attr(&e, "leader")
                        .map(|v| TabLeader::parse(&v))
                        .unwrap_or_default(),
                });
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(tabs),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse a border container (`w:pBdr`, `w:tblBorders`, `w:tcBorders`)
fn parse_borders<R, S>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    side_of: impl Fn(&[u8]) -> Option<S>,
) -> Result<BTreeMap<S, Border>>
where
    R: BufRead,
    S: Ord,
{
    let mut borders = BTreeMap::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                if let Some(side) = side_of(e.local_name().as_ref()) {
                    let border = Border::from_element(&e);
                    if !border.style.is_empty() {
                        borders.insert(side, border);
                    }
                }
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(borders),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse `w:sectPr` (after its start tag)
fn parse_section<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    ctx: &ReadContext,
) -> Result<Section> {
    let mut section = Section::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => apply_section_property(&mut section, &e, ctx),
            Event::Start(e) => {
                apply_section_property(&mut section, &e, ctx);
                skip_element(reader, &e)?;
            }
            Event::End(_) => return Ok(section),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

fn apply_section_property(section: &mut Section, e: &BytesStart, ctx: &ReadContext) {
    match e.local_name().as_ref() {
        local @ (b"headerReference" | b"footerReference") => {
            let kind = get_attr(e, "type")
                .map(|t| HeaderFooterType::parse(&t))
                .unwrap_or_default();
            let Some(rel_id) = get_attr(e, "id") else {
                return;
            };
            let is_header = local == b"headerReference";
            let what = if is_header { "header reference" } else { "footer reference" };
            if let Some(part) = ctx.resolve_part(&rel_id, what) {
                let refs = if is_header {
                    &mut section.headers
                } else {
                    &mut section.footers
                };
                refs.insert(kind, HeaderFooterRef { rel_id, part });
            }
        }
        b"type" => {
            if let Some(val) = get_val(e) {
                section.start = SectionStart::parse(&val);
            }
        }
        b"pgSz" => {
            if let Some(w) = get_int(e, "w") {
                section.page_width = w;
            }
            if let Some(h) = get_int(e, "h") {
                section.page_height = h;
            }
            section.orientation = get_attr(e, "orient").map(|o| Orientation::parse(&o));
        }
        b"pgMar" => {
            let margins = &mut section.margins;
            for (attr, slot) in [
                ("top", &mut margins.top),
                ("right", &mut margins.right),
                ("bottom", &mut margins.bottom),
                ("left", &mut margins.left),
            ] {
                if let Some(value) = get_int(e, attr) {
                    *slot = value;
                }
            }
        }
        _ => {}
    }
}

/// Parse `w:drawing` into a picture; drawings without an image yield `None`
fn parse_drawing<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    ctx: &mut ReadContext,
) -> Result<Option<Picture>> {
    let mut picture = Picture::default();
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let element = match &event {
            Event::Start(e) => {
                depth += 1;
                Some(e)
            }
            Event::Empty(e) => Some(e),
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                None
            }
            Event::Eof => return Err(unexpected_eof(start)),
            _ => None,
        };

        if let Some(e) = element {
            match e.local_name().as_ref() {
                b"extent" => {
                    picture.width_emu = get_emu(e, "cx");
                    picture.height_emu = get_emu(e, "cy");
                }
                b"docPr" => {
                    picture.id = get_attr(e, "id")
                        .and_then(|v| v.trim().parse().ok())
                        .unwrap_or(0);
                    picture.name = get_attr(e, "name").unwrap_or_default();
                    picture.description = get_attr(e, "descr").unwrap_or_default();
                }
                b"blip" => picture.rel_id = get_attr(e, "embed").unwrap_or_default(),
                _ => {}
            }
        }
        buf.clear();
    }

    ctx.max_drawing_id = ctx.max_drawing_id.max(picture.id);

    if picture.rel_id.is_empty() {
        log::debug!("{}: drawing without an embedded image skipped", ctx.owner);
        return Ok(None);
    }
    picture.target = ctx.resolve_part(&picture.rel_id, "picture");
    Ok(Some(picture))
}

fn get_emu(e: &BytesStart, local: &str) -> i64 {
    get_attr(e, local)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Parse a table (after the `w:tbl` start tag).
///
/// A table without `w:tblGrid` gets its grid inferred from the cell widths.
fn parse_table<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    ctx: &mut ReadContext,
) -> Result<Table> {
    let mut table = Table::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tblPr" => parse_table_properties(reader, &e, &mut table)?,
                b"tblGrid" => table.grid = parse_grid(reader, &e)?,
                b"tr" => table.rows.push(parse_row(reader, &e, ctx)?),
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"tbl" => break,
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }

    if table.grid.is_empty() {
        table.grid = table.column_widths();
    }
    Ok(table)
}

fn parse_grid<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Vec<i32>> {
    let mut grid = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if e.local_name().as_ref() == b"gridCol" => {
                grid.push(get_int(&e, "w").unwrap_or(0));
            }
            Event::Start(e) => {
                if e.local_name().as_ref() == b"gridCol" {
                    grid.push(get_int(&e, "w").unwrap_or(0));
                }
                skip_element(reader, &e)?;
            }
            Event::End(_) => return Ok(grid),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

fn parse_table_properties<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    table: &mut Table,
) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => apply_table_property(table, &e),
            Event::Start(e) => match e.local_name().as_ref() {
                b"tblBorders" => {
                    table.borders = parse_borders(reader, &e, TableBorderSide::from_local_name)?;
                }
                b"tblCellMar" => table.cell_margins = parse_cell_margins(reader, &e)?,
                _ => {
                    apply_table_property(table, &e);
                    skip_element(reader, &e)?;
                }
            },
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

fn apply_table_property(table: &mut Table, e: &BytesStart) {
    match e.local_name().as_ref() {
        b"tblStyle" => table.style = get_val(e).filter(|s| !s.is_empty()),
        b"tblW" => table.width = read_width(e),
        b"tblInd" => table.indent = Some(read_width(e)),
        b"jc" => table.alignment = get_val(e).map(|v| TableAlignment::parse(&v)),
        b"tblLayout" => table.layout = get_attr(e, "type").map(|v| TableLayout::parse(&v)),
        b"tblLook" => table.look = Some(read_look(e)),
        b"shd" => table.shading = Some(Shading::from_element(e)),
        _ => {}
    }
}

fn read_width(e: &BytesStart) -> TableWidth {
    TableWidth::from_parts(get_int(e, "w").unwrap_or(0), get_attr(e, "type").as_deref())
}

/// Read `w:tblLook`, falling back to the bits of the hex `w:val` for flags
/// that are not spelled out
fn read_look(e: &BytesStart) -> TableLook {
    let val = get_val(e).unwrap_or_default();
    let bits = u32::from_str_radix(val.trim(), 16).unwrap_or(0);
    let flag = |attr: &str, mask: u32| match get_attr(e, attr) {
        Some(v) => matches!(v.as_str(), "1" | "true" | "on"),
        None => bits & mask != 0,
    };
    TableLook {
        first_row: flag("firstRow", 0x0020),
        last_row: flag("lastRow", 0x0040),
        first_column: flag("firstColumn", 0x0080),
        last_column: flag("lastColumn", 0x0100),
        no_h_band: flag("noHBand", 0x0200),
        no_v_band: flag("noVBand", 0x0400),
        val,
    }
}

fn parse_cell_margins<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<CellMargins> {
    let mut margins = CellMargins::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => {
                let value = get_int(&e, "w");
                match e.local_name().as_ref() {
                    b"top" => margins.top = value,
                    b"left" | b"start" => margins.left = value,
                    b"bottom" => margins.bottom = value,
                    b"right" | b"end" => margins.right = value,
                    _ => {}
                }
            }
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(_) => return Ok(margins),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

fn parse_row<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    ctx: &mut ReadContext,
) -> Result<TableRow> {
    let mut row = TableRow::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tc" => row.cells.push(parse_cell(reader, &e, ctx)?),
                b"sdt" | b"sdtContent" => {}
                _ => skip_element(reader, &e)?,
            },
            Event::End(e) if e.local_name().as_ref() == b"tr" => return Ok(row),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse a cell; a cell without paragraphs gets one empty paragraph
fn parse_cell<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    ctx: &mut ReadContext,
) -> Result<TableCell> {
    let mut cell = TableCell {
        paragraphs: Vec::new(),
        ..Default::default()
    };
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tcPr" => parse_cell_properties(reader, &e, &mut cell)?,
                b"p" => cell.paragraphs.push(parse_paragraph(reader, &e, ctx)?),
                b"sdt" | b"sdtContent" => {}
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                cell.paragraphs.push(Paragraph::default());
            }
            Event::End(e) if e.local_name().as_ref() == b"tc" => break,
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }

    if cell.paragraphs.is_empty() {
        cell.paragraphs.push(Paragraph::default());
    }
    Ok(cell)
}

fn parse_cell_properties<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    cell: &mut TableCell,
) -> Result<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) => apply_cell_property(cell, &e),
            Event::Start(e) => {
                if e.local_name().as_ref() == b"tcBorders" {
                    cell.borders = parse_borders(reader, &e, TableBorderSide::from_local_name)?;
                } else {
                    apply_cell_property(cell, &e);
                    skip_element(reader, &e)?;
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

fn apply_cell_property(cell: &mut TableCell, e: &BytesStart) {
    match e.local_name().as_ref() {
        b"tcW" => cell.width = get_int(e, "w").unwrap_or(DEFAULT_CELL_WIDTH),
        b"gridSpan" => {
            let span = get_int(e, "val").unwrap_or(1).clamp(1, MAX_GRID_SPAN as i32);
            cell.set_grid_span(span as usize);
        }
        b"vMerge" => cell.v_merge = Some(VMerge::parse(get_val(e).as_deref())),
        b"vAlign" => {
            cell.v_align = get_val(e)
                .map(|v| VerticalAlignment::parse(&v))
                .unwrap_or_default();
        }
        b"shd" => cell.shading = Some(Shading::from_element(e)),
        _ => {}
    }
}
