//! XML utilities and raw element preservation for round-trip support

mod namespace;
mod raw;

pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;
use std::str::FromStr;

/// Helper to get attribute value from BytesStart
pub fn get_attr(element: &BytesStart, name: &str) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| {
            a.unescape_value()
                .map(|v| v.to_string())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).to_string())
        })
}

/// Attribute `w:{name}`, falling back to the unprefixed form
pub fn get_w_attr(element: &BytesStart, name: &str) -> Option<String> {
    get_attr(element, &format!("w:{}", name)).or_else(|| get_attr(element, name))
}

/// Helper to get w:val attribute (common in OOXML)
pub fn get_w_val(element: &BytesStart) -> Option<String> {
    get_w_attr(element, "val")
}

/// Parse attribute `w:name`, failing on a value that does not parse
pub fn parse_w_attr<T: FromStr>(element: &BytesStart, name: &str) -> Result<Option<T>> {
    let Some(value) = get_w_attr(element, name) else {
        return Ok(None);
    };
    match value.parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(Error::InvalidAttribute {
            element: String::from_utf8_lossy(element.name().as_ref()).into_owned(),
            attr: name.to_string(),
            value,
        }),
    }
}

/// The `w:val` of an element that carries no other attribute
pub fn sole_w_val(element: &BytesStart) -> Option<String> {
    if element.attributes().count() == 1 {
        get_w_val(element)
    } else {
        None
    }
}

/// Parse a boolean value from OOXML (handles "1", "true", "on", or missing val)
pub fn parse_bool(element: &BytesStart) -> bool {
    match get_w_val(element) {
        None => true,
        Some(v) => matches!(v.as_str(), "1" | "true" | "on"),
    }
}

/// Skip an element and all its children (start tag already consumed)
pub fn skip_element<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<()> {
    let mut buf = Vec::new();
    reader.read_to_end_into(start.name(), &mut buf)?;
    Ok(())
}

/// Read the text content of a simple element such as `w:t` (start tag already consumed)
pub fn read_text<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<String> {
    let end = start.name().as_ref().to_vec();
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(e) => {
                let nested = e.name().as_ref().to_vec();
                let mut skip = Vec::new();
                reader.read_to_end_into(quick_xml::name::QName(&nested), &mut skip)?;
            }
            Event::End(e) if e.name().as_ref() == end.as_slice() => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Write `<name w:val="value"/>`
pub fn write_val<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    let mut elem = BytesStart::new(name);
    elem.push_attribute(("w:val", value));
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

/// Write an empty element with the given attributes
pub fn write_empty<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut elem = BytesStart::new(name);
    for &(k, v) in attrs {
        elem.push_attribute((k, v));
    }
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

/// Write a start tag without attributes
pub fn write_start<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

/// Write an end tag
pub fn write_end<W: std::io::Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write `children` inside `<name>`, stably sorted by the position of their
/// local name in `order`; names not listed go last
pub fn write_ordered<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    children: Vec<RawXmlNode>,
    order: &[&str],
) -> Result<()> {
    write_ordered_element(writer, &RawXmlElement::new(name), children, order)
}

/// Like [`write_ordered`], taking name and attributes from `element`
pub fn write_ordered_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &RawXmlElement,
    mut children: Vec<RawXmlNode>,
    order: &[&str],
) -> Result<()> {
    children.sort_by_key(|child| {
        child
            .as_element()
            .and_then(|e| order.iter().position(|o| *o == e.local_name()))
            .unwrap_or(order.len())
    });
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    for child in &children {
        child.write_to(writer)?;
    }
    write_end(writer, &element.name)
}

/// Reader over a part's XML that keeps whitespace inside text nodes
pub fn part_reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader
}
