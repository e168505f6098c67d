//! Paragraph formatting values: alignment, indentation, borders and colors

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Twips per inch
pub const TWIPS_PER_INCH: f64 = 1440.0;

/// Paragraph alignment (w:jc)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Value written to `w:jc/@w:val`
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    /// Parse a `w:jc` value; `None` for values without an equivalent here
    pub fn from_jc(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" | "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Paragraph indentation in inches
///
/// The four offsets are independent. Setting one never clears another, even
/// though `first_line` and `hanging` are alternatives in the file format.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Indentation {
    pub left: f64,
    pub right: f64,
    pub first_line: f64,
    pub hanging: f64,
}

impl Indentation {
    /// Left indentation only
    pub fn left(inches: f64) -> Self {
        Self {
            left: inches,
            ..Default::default()
        }
    }

    /// Whether every offset is zero
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.first_line == 0.0 && self.hanging == 0.0
    }
}

/// Convert inches to twips, rounding to the nearest twip
pub fn inches_to_twips(inches: f64) -> i64 {
    (inches * TWIPS_PER_INCH).round() as i64
}

/// Convert twips to inches
pub fn twips_to_inches(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_INCH
}

/// Line style of a paragraph border
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BorderWidth {
    #[default]
    Single,
    Double,
    Dotted,
    Dashed,
    DotDash,
    Thick,
}

impl BorderWidth {
    /// Value written to the border's `w:val`
    pub fn as_str(&self) -> &'static str {
        match self {
            BorderWidth::Single => "single",
            BorderWidth::Double => "double",
            BorderWidth::Dotted => "dotted",
            BorderWidth::Dashed => "dashed",
            BorderWidth::DotDash => "dotDash",
            BorderWidth::Thick => "thick",
        }
    }
}

impl FromStr for BorderWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(BorderWidth::Single),
            "double" => Ok(BorderWidth::Double),
            "dotted" => Ok(BorderWidth::Dotted),
            "dashed" | "dashSmallGap" => Ok(BorderWidth::Dashed),
            "dotDash" | "dotDotDash" => Ok(BorderWidth::DotDash),
            "thick" => Ok(BorderWidth::Thick),
            other => Err(Error::UnsupportedSchema(format!("border style '{}'", other))),
        }
    }
}

/// Paragraph border, drawn on all four sides
///
/// `size` is in eighths of a point. A size of zero means no border.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Border {
    pub width: BorderWidth,
    pub color: Color,
    pub size: u32,
}

impl Border {
    pub fn new(width: BorderWidth, color: Color, size: u32) -> Self {
        Self { width, color, size }
    }

    /// Whether this border is drawn at all
    pub fn is_visible(&self) -> bool {
        self.size > 0
    }
}

/// RGB color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::new(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::new(0x00, 0x80, 0x00);
    pub const BLUE: Color = Color::new(0x00, 0x00, 0xFF);
    pub const YELLOW: Color = Color::new(0xFF, 0xFF, 0x00);
    pub const ORANGE: Color = Color::new(0xFF, 0xA5, 0x00);
    pub const PURPLE: Color = Color::new(0x80, 0x00, 0x80);
    pub const NAVY: Color = Color::new(0x00, 0x00, 0x80);
    pub const TEAL: Color = Color::new(0x00, 0x80, 0x80);
    pub const MAROON: Color = Color::new(0x80, 0x00, 0x00);
    pub const OLIVE: Color = Color::new(0x80, 0x80, 0x00);
    pub const GRAY: Color = Color::new(0x80, 0x80, 0x80);
    pub const SILVER: Color = Color::new(0xC0, 0xC0, 0xC0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` (optionally prefixed with `#`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    /// Upper-case `RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s).ok_or_else(|| Error::InvalidElement(format!("color '{}'", s)))
    }
}
