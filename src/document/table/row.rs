//! Table row elements (w:tr)

use crate::error::Result;
use crate::xml::{RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use super::cell::TableCell;

/// Table row (w:tr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    /// Row properties (preserved)
    pub properties: Option<RawXmlNode>,
    /// Cells
    cells: Vec<TableCell>,
    /// Attributes of w:tr (rsid etc.), preserved
    pub unknown_attrs: Vec<(String, String)>,
    /// Unknown children (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl TableRow {
    /// Create a new row with empty cells
    pub(crate) fn new(cell_count: usize) -> Self {
        TableRow {
            cells: (0..cell_count).map(|_| TableCell::new()).collect(),
            ..Default::default()
        }
    }

    /// Parse from reader (after w:tr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut row = TableRow {
            unknown_attrs: RawXmlElement::from_empty(start).attributes,
            ..Default::default()
        };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"trPr" => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        row.properties = Some(RawXmlNode::Element(raw));
                    }
                    b"tc" => row.cells.push(TableCell::from_reader(reader, &e)?),
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        row.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::Empty(e) => {
                    let raw = RawXmlElement::from_empty(&e);
                    row.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::End(e) if e.local_name().as_ref() == b"tr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(row)
    }

    /// Get cell count
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over cells
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.cells.iter()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.cells.iter_mut()
    }

    /// Get cell at index
    pub fn cell(&self, index: usize) -> Option<&TableCell> {
        self.cells.get(index)
    }

    /// Get mutable cell at index
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut TableCell> {
        self.cells.get_mut(index)
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:tr");
        for (key, value) in &self.unknown_attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(start))?;

        // tblPrEx precedes trPr; other unknown content follows the cells
        let (exceptions, rest): (Vec<_>, Vec<_>) = self.unknown_children.iter().partition(|c| {
            c.as_element()
                .map(|e| e.local_name() == "tblPrEx")
                .unwrap_or(false)
        });
        for child in exceptions {
            child.write_to(writer)?;
        }
        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }
        for cell in &self.cells {
            cell.write_to(writer)?;
        }
        for child in rest {
            child.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
        Ok(())
    }
}
