//! XML helpers shared by the package and body codecs

mod namespace;

pub use namespace::*;

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// Get an attribute value by local name, ignoring the prefix
/// (`w:val`, `val` and `x:val` all match `"val"`)
pub fn get_attr(element: &BytesStart, local: &str) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Get the `w:val` attribute
pub fn get_val(element: &BytesStart) -> Option<String> {
    get_attr(element, "val")
}

/// Parse an integer attribute, treating garbage as absent
pub fn get_int(element: &BytesStart, local: &str) -> Option<i32> {
    get_attr(element, local).and_then(|v| v.trim().parse().ok())
}

/// Interpret an on/off element such as `<w:b/>`.
///
/// No value means on; `0`, `false` and `off` mean off; anything else is on.
pub fn parse_on_off(element: &BytesStart) -> bool {
    match get_val(element) {
        None => true,
        Some(v) => !matches!(v.as_str(), "0" | "false" | "off"),
    }
}

/// Consume the rest of an element whose start tag was just read.
///
/// Counts nested starts and ends until the depth returns to zero, so any
/// vendor extension is consumed whole. Running out of input is a format error.
pub fn skip_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<()> {
    log::trace!(
        "skipping <{}>",
        String::from_utf8_lossy(start.name().as_ref())
    );
    let mut depth = 1usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => return Err(unexpected_eof(start)),
            _ => {}
        }
        buf.clear();
    }
}

/// Error for a stream that ends while `start` is still open
pub fn unexpected_eof(start: &BytesStart) -> Error {
    Error::Format(format!(
        "unexpected end of input inside <{}>",
        String::from_utf8_lossy(start.name().as_ref())
    ))
}

/// Write `<tag attr="value" .../>`
pub fn write_empty<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut elem = BytesStart::new(tag);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

/// Write `<tag w:val="value"/>`
pub fn write_val<W: Write>(writer: &mut Writer<W>, tag: &str, value: &str) -> Result<()> {
    write_empty(writer, tag, &[("w:val", value)])
}

/// Write an on/off element: `<tag/>` when on, `<tag w:val="0"/>` when off
pub fn write_on_off<W: Write>(writer: &mut Writer<W>, tag: &str, on: bool) -> Result<()> {
    if on {
        write_empty(writer, tag, &[])
    } else {
        write_val(writer, tag, "0")
    }
}
