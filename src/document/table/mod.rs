//! Table elements (w:tbl, w:tr, w:tc)
//!
//! A table's row and column counts are fixed when it is created. Rows and
//! cells are reachable for reading and editing but never added or removed.

mod cell;
mod row;

pub use cell::{TableCell, TableCellProperties};
pub use row::TableRow;

use crate::document::node::NodeId;
use crate::error::{Error, Result};
use crate::xml::{self, get_w_attr, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Text width of a letter page with one inch margins, in twips
pub const DEFAULT_TABLE_WIDTH: u32 = 9360;

/// Child order of w:tblPr
const TBLPR_ORDER: &[&str] = &[
    "tblStyle", "tblpPr", "tblOverlap", "bidiVisual", "tblStyleRowBandSize",
    "tblStyleColBandSize", "tblW", "jc", "tblCellSpacing", "tblInd", "tblBorders", "shd",
    "tblLayout", "tblCellMar", "tblLook", "tblCaption", "tblDescription", "tblPrChange",
];

/// Grid column definition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridColumn {
    /// Width in twips
    pub width: Option<u32>,
}

/// Table properties (w:tblPr)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableProperties {
    /// Table style ID
    pub style: Option<String>,
    /// Unknown children (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

/// Table element (w:tbl)
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub(crate) node: Option<NodeId>,
    /// Table properties
    pub properties: TableProperties,
    /// Table grid
    grid: Vec<GridColumn>,
    /// Table rows
    rows: Vec<TableRow>,
    /// Unknown children (preserved)
    pub unknown_children: Vec<RawXmlNode>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
            && self.grid == other.grid
            && self.rows == other.rows
            && self.unknown_children == other.unknown_children
    }
}

impl Table {
    /// Create a table of `rows` x `cols` empty cells
    ///
    /// Columns share the page text width equally.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidElement(format!(
                "table must be at least 1x1, got {}x{}",
                rows, cols
            )));
        }

        let width = DEFAULT_TABLE_WIDTH / cols as u32;
        let table_rows = (0..rows).map(|_| TableRow::new(cols)).collect();
        let grid = vec![GridColumn { width: None }; cols];

        let mut table = Table {
            properties: TableProperties {
                style: None,
                unknown_children: vec![RawXmlNode::Element(
                    RawXmlElement::new("w:tblW")
                        .with_attr("w:w", "0")
                        .with_attr("w:type", "auto")
                        .empty(),
                )],
            },
            grid,
            rows: table_rows,
            ..Default::default()
        };
        table.set_column_width(width);
        Ok(table)
    }

    /// Parse from reader (after w:tbl start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, _start: &BytesStart) -> Result<Self> {
        let mut table = Table::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"tblPr" => table.properties = TableProperties::from_reader(reader)?,
                    b"tblGrid" => table.grid = parse_table_grid(reader)?,
                    b"tr" => table.rows.push(TableRow::from_reader(reader, &e)?),
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        table.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tblPr" | b"tblGrid" => {}
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        table.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"tbl" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(table)
    }

    /// Get row count
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get column count (based on first row)
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cell_count()).unwrap_or(0)
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }

    /// Get row by index
    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    /// Get mutable row
    pub fn row_mut(&mut self, index: usize) -> Option<&mut TableRow> {
        self.rows.get_mut(index)
    }

    /// Get cell at position
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cell(col)
    }

    /// Get mutable cell at position
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row)?.cell_mut(col)
    }

    /// Grid column definitions
    pub fn grid(&self) -> &[GridColumn] {
        &self.grid
    }

    /// Style ID
    pub fn style(&self) -> Option<&str> {
        self.properties.style.as_deref()
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.properties.style = Some(style.into());
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.set_style(style);
        self
    }

    /// Column width in twips, when every grid column has the same width
    pub fn column_width(&self) -> Option<u32> {
        let first = self.grid.first()?.width?;
        self.grid
            .iter()
            .all(|c| c.width == Some(first))
            .then_some(first)
    }

    /// Give every column the same width, in twips
    pub fn set_column_width(&mut self, width: u32) {
        for col in &mut self.grid {
            col.width = Some(width);
        }
        for row in &mut self.rows {
            for cell in row.cells_mut() {
                cell.set_width(width);
            }
        }
    }

    pub fn with_column_width(mut self, width: u32) -> Self {
        self.set_column_width(width);
        self
    }

    /// Text of all cells, cells separated by tabs and rows by newlines
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.cells().map(TableCell::text).collect::<Vec<_>>().join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:tbl")))?;

        self.properties.write_to(writer)?;

        writer.write_event(Event::Start(BytesStart::new("w:tblGrid")))?;
        for col in &self.grid {
            let mut elem = BytesStart::new("w:gridCol");
            if let Some(w) = col.width {
                elem.push_attribute(("w:w", w.to_string().as_str()));
            }
            writer.write_event(Event::Empty(elem))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:tblGrid")))?;

        for row in &self.rows {
            row.write_to(writer)?;
        }

        for child in &self.unknown_children {
            child.write_to(writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;
        Ok(())
    }
}

impl TableProperties {
    /// Parse from reader (after w:tblPr start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut props = TableProperties::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    props.unknown_children.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tblStyle" => props.style = xml::get_w_val(&e),
                    _ => {
                        let raw = RawXmlElement::from_empty(&e);
                        props.unknown_children.push(RawXmlNode::Element(raw));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"tblPr" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    /// Write to XML writer; w:tblPr is required, so it is written even when empty
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut children = Vec::new();
        if let Some(style) = &self.style {
            children.push(RawXmlNode::Element(RawXmlElement::val(
                "w:tblStyle",
                style.as_str(),
            )));
        }
        children.extend(self.unknown_children.iter().cloned());
        xml::write_ordered(writer, "w:tblPr", children, TBLPR_ORDER)
    }
}

/// Parse table grid
fn parse_table_grid<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<GridColumn>> {
    let mut columns = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(e) if e.local_name().as_ref() == b"gridCol" => {
                let width = get_w_attr(&e, "w").and_then(|v| v.parse().ok());
                columns.push(GridColumn { width });
            }
            Event::End(e) if e.local_name().as_ref() == b"tblGrid" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(columns)
}
