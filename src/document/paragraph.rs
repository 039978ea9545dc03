//! Paragraph element (w:p)

use crate::document::formatting::{Border, Shading};
use crate::document::writer::WriteContext;
use crate::document::{Run, Section};
use crate::error::Result;
use crate::xml::{write_empty, write_on_off, write_val};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Write;

/// Paragraph element (w:p)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    /// Style ID (w:pStyle)
    pub style: Option<String>,
    pub alignment: Alignment,
    pub numbering: Option<NumberingRef>,
    pub spacing: Spacing,
    pub indent: Indent,
    /// Tab stops in document order
    pub tabs: Vec<TabStop>,
    pub borders: BTreeMap<ParagraphBorderSide, Border>,
    pub shading: Option<Shading>,
    pub keep_next: Option<bool>,
    pub keep_lines: Option<bool>,
    pub page_break_before: Option<bool>,
    pub widow_control: Option<bool>,
    pub runs: Vec<Run>,
    /// Section break anchored to this paragraph (w:pPr/w:sectPr)
    pub section: Option<Section>,
}

/// Paragraph justification (w:jc)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Both,
    Distribute,
}

impl Alignment {
    /// Parse from OOXML string value
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "justify" => Alignment::Both,
            "distribute" => Alignment::Distribute,
            _ => Alignment::Left,
        }
    }

    /// Convert to OOXML string value
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Both => "both",
            Alignment::Distribute => "distribute",
        }
    }
}

/// List membership (w:numPr)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberingRef {
    /// Numbering instance ID (w:numId)
    pub num_id: i32,
    /// Indent level (w:ilvl), never negative
    pub level: i32,
}

/// Paragraph spacing (w:spacing), values in twips
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Spacing {
    pub before: Option<i32>,
    pub after: Option<i32>,
    /// Line spacing; 240ths of a line when the rule is `auto`
    pub line: Option<i32>,
    pub line_rule: Option<LineRule>,
}

impl Spacing {
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.line.is_none() && self.line_rule.is_none()
    }
}

/// How `Spacing::line` is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRule {
    Auto,
    Exact,
    AtLeast,
}

impl LineRule {
    pub fn parse(s: &str) -> Self {
        match s {
            "exact" => LineRule::Exact,
            "atLeast" => LineRule::AtLeast,
            _ => LineRule::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineRule::Auto => "auto",
            LineRule::Exact => "exact",
            LineRule::AtLeast => "atLeast",
        }
    }
}

/// Paragraph indentation (w:ind), values in twips
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Indent {
    pub left: Option<i32>,
    pub right: Option<i32>,
    pub first_line: Option<i32>,
    pub hanging: Option<i32>,
}

impl Indent {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.first_line.is_none() && self.hanging.is_none()
    }
}

/// Custom tab stop (w:tab inside w:tabs)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabStop {
    /// Position in twips
    pub position: i32,
    pub alignment: TabAlignment,
    pub leader: TabLeader,
}

impl TabStop {
    pub fn new(position: i32, alignment: TabAlignment) -> Self {
        TabStop {
            position,
            alignment,
            leader: TabLeader::None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TabAlignment {
    #[default]
    Left,
    Center,
    Right,
    Decimal,
    Bar,
    Clear,
    Num,
}

impl TabAlignment {
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => TabAlignment::Center,
            "right" | "end" => TabAlignment::Right,
            "decimal" => TabAlignment::Decimal,
            "bar" => TabAlignment::Bar,
            "clear" => TabAlignment::Clear,
            "num" => TabAlignment::Num,
            _ => TabAlignment::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabAlignment::Left => "left",
            TabAlignment::Center => "center",
            TabAlignment::Right => "right",
            TabAlignment::Decimal => "decimal",
            TabAlignment::Bar => "bar",
            TabAlignment::Clear => "clear",
            TabAlignment::Num => "num",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TabLeader {
    #[default]
    None,
    Dot,
    Hyphen,
    Underscore,
    Heavy,
    MiddleDot,
}

impl TabLeader {
    pub fn parse(s: &str) -> Self {
        match s {
            "dot" => TabLeader::Dot,
            "hyphen" => TabLeader::Hyphen,
            "underscore" => TabLeader::Underscore,
            "heavy" => TabLeader::Heavy,
            "middleDot" => TabLeader::MiddleDot,
            _ => TabLeader::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabLeader::None => "none",
            TabLeader::Dot => "dot",
            TabLeader::Hyphen => "hyphen",
            TabLeader::Underscore => "underscore",
            TabLeader::Heavy => "heavy",
            TabLeader::MiddleDot => "middleDot",
        }
    }
}

/// Paragraph border side (children of w:pBdr), in output order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParagraphBorderSide {
    Top,
    Left,
    Bottom,
    Right,
    Between,
    Bar,
}

impl ParagraphBorderSide {
    pub fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"top" => Some(ParagraphBorderSide::Top),
            b"left" | b"start" => Some(ParagraphBorderSide::Left),
            b"bottom" => Some(ParagraphBorderSide::Bottom),
            b"right" | b"end" => Some(ParagraphBorderSide::Right),
            b"between" => Some(ParagraphBorderSide::Between),
            b"bar" => Some(ParagraphBorderSide::Bar),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ParagraphBorderSide::Top => "w:top",
            ParagraphBorderSide::Left => "w:left",
            ParagraphBorderSide::Bottom => "w:bottom",
            ParagraphBorderSide::Right => "w:right",
            ParagraphBorderSide::Between => "w:between",
            ParagraphBorderSide::Bar => "w:bar",
        }
    }
}

impl Paragraph {
    /// Create a paragraph holding a single run of text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut para = Paragraph::default();
        if !text.is_empty() {
            para.runs.push(Run::new(text));
        }
        para
    }

    /// Append a run and return it for further formatting
    pub fn add_run(&mut self, run: Run) -> &mut Run {
        self.runs.push(run);
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    /// Append a plain run of text
    pub fn add_text(&mut self, text: impl Into<String>) -> &mut Run {
        self.add_run(Run::new(text))
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    pub fn clear_runs(&mut self) {
        self.runs.clear();
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Replace the runs with a single plain run
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.runs.clear();
        self.runs.push(Run::new(text));
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        let style = style.into();
        self.style = (!style.is_empty()).then_some(style);
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Put the paragraph in a list; negative levels are clamped to 0
    pub fn set_numbering(&mut self, num_id: i32, level: i32) {
        self.numbering = Some(NumberingRef {
            num_id,
            level: level.max(0),
        });
    }

    pub fn clear_numbering(&mut self) {
        self.numbering = None;
    }

    pub fn set_spacing(&mut self, before: Option<i32>, after: Option<i32>) {
        self.spacing.before = before;
        self.spacing.after = after;
    }

    pub fn set_line_spacing(&mut self, line: i32, rule: LineRule) {
        self.spacing.line = Some(line);
        self.spacing.line_rule = Some(rule);
    }

    pub fn add_tab_stop(&mut self, tab: TabStop) {
        self.tabs.push(tab);
    }

    /// Set a border side; a border with an empty style removes the side
    pub fn set_border(&mut self, side: ParagraphBorderSide, border: Border) {
        if border.style.is_empty() {
            self.borders.remove(&side);
        } else {
            self.borders.insert(side, border);
        }
    }

    pub fn set_shading(&mut self, shading: Option<Shading>) {
        self.shading = shading;
    }

    pub fn set_keep_next(&mut self, keep: Option<bool>) {
        self.keep_next = keep;
    }

    pub fn set_keep_lines(&mut self, keep: Option<bool>) {
        self.keep_lines = keep;
    }

    pub fn set_page_break_before(&mut self, page_break: Option<bool>) {
        self.page_break_before = page_break;
    }

    pub fn set_widow_control(&mut self, control: Option<bool>) {
        self.widow_control = control;
    }

    /// Pictures carried by this paragraph's runs
    pub fn pictures(&self) -> impl Iterator<Item = &crate::document::Picture> {
        self.runs.iter().filter_map(|r| r.picture.as_ref())
    }

    fn has_properties(&self) -> bool {
        self.style.is_some()
            || self.alignment != Alignment::Left
            || self.numbering.is_some()
            || !self.spacing.is_empty()
            || !self.indent.is_empty()
            || !self.tabs.is_empty()
            || !self.borders.is_empty()
            || self.shading.is_some()
            || self.keep_next.is_some()
            || self.keep_lines.is_some()
            || self.page_break_before.is_some()
            || self.widow_control.is_some()
            || self.section.is_some()
    }

    /// Write to XML writer
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>, ctx: &mut WriteContext) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;

        if self.has_properties() {
            self.write_properties(writer)?;
        }

        for run in &self.runs {
            run.write_to(writer, ctx)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }

    fn write_properties<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;

        if let Some(style) = &self.style {
            write_val(writer, "w:pStyle", style)?;
        }
        if self.alignment != Alignment::Left {
            write_val(writer, "w:jc", self.alignment.as_str())?;
        }
        if let Some(numbering) = &self.numbering {
            writer.write_event(Event::Start(BytesStart::new("w:numPr")))?;
            write_val(writer, "w:ilvl", &numbering.level.to_string())?;
            write_val(writer, "w:numId", &numbering.num_id.to_string())?;
            writer.write_event(Event::End(BytesEnd::new("w:numPr")))?;
        }
        if !self.spacing.is_empty() {
            let mut elem = BytesStart::new("w:spacing");
            push_measure(&mut elem, "w:before", self.spacing.before);
            push_measure(&mut elem, "w:after", self.spacing.after);
            push_measure(&mut elem, "w:line", self.spacing.line);
            if let Some(rule) = self.spacing.line_rule {
                elem.push_attribute(("w:lineRule", rule.as_str()));
            }
            writer.write_event(Event::Empty(elem))?;
        }
        if !self.indent.is_empty() {
            let mut elem = BytesStart::new("w:ind");
            push_measure(&mut elem, "w:left", self.indent.left);
            push_measure(&mut elem, "w:right", self.indent.right);
            push_measure(&mut elem, "w:firstLine", self.indent.first_line);
            push_measure(&mut elem, "w:hanging", self.indent.hanging);
            writer.write_event(Event::Empty(elem))?;
        }
        if !self.tabs.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:tabs")))?;
            for tab in &self.tabs {
                let position = tab.position.to_string();
                let mut attrs = vec![("w:val", tab.alignment.as_str()), ("w:pos", position.as_str())];
                if tab.leader != TabLeader::None {
                    attrs.push(("w:leader", tab.leader.as_str()));
                }
                write_empty(writer, "w:tab", &attrs)?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:tabs")))?;
        }
        if !self.borders.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:pBdr")))?;
            for (side, border) in &self.borders {
                border.write_paragraph_form(writer, side.tag())?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:pBdr")))?;
        }
        if let Some(shading) = &self.shading {
            shading.write_to(writer)?;
        }

        let flags = [
            ("w:keepNext", self.keep_next),
            ("w:keepLines", self.keep_lines),
            ("w:pageBreakBefore", self.page_break_before),
            ("w:widowControl", self.widow_control),
        ];
        for (tag, flag) in flags {
            if let Some(on) = flag {
                write_on_off(writer, tag, on)?;
            }
        }

        if let Some(section) = &self.section {
            section.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
        Ok(())
    }
}

fn push_measure(elem: &mut BytesStart, key: &str, value: Option<i32>) {
    if let Some(value) = value {
        elem.push_attribute((key, value.to_string().as_str()));
    }
}
