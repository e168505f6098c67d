//! Numbering-related types and enums

use crate::error::{Error, Result};

/// Number format (w:numFmt)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// 1, 2, 3
    Decimal,
    /// I, II, III
    UpperRoman,
    /// i, ii, iii
    LowerRoman,
    /// A, B, C
    UpperLetter,
    /// a, b, c
    LowerLetter,
    /// •
    Bullet,
    /// None (no number)
    None,
    /// Other format (preserved as string)
    Other(String),
}

impl std::str::FromStr for NumberFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "decimal" => NumberFormat::Decimal,
            "upperRoman" => NumberFormat::UpperRoman,
            "lowerRoman" => NumberFormat::LowerRoman,
            "upperLetter" => NumberFormat::UpperLetter,
            "lowerLetter" => NumberFormat::LowerLetter,
            "bullet" => NumberFormat::Bullet,
            "none" => NumberFormat::None,
            other => NumberFormat::Other(other.to_string()),
        })
    }
}

impl NumberFormat {
    /// Convert to string
    pub fn as_str(&self) -> &str {
        match self {
            NumberFormat::Decimal => "decimal",
            NumberFormat::UpperRoman => "upperRoman",
            NumberFormat::LowerRoman => "lowerRoman",
            NumberFormat::UpperLetter => "upperLetter",
            NumberFormat::LowerLetter => "lowerLetter",
            NumberFormat::Bullet => "bullet",
            NumberFormat::None => "none",
            NumberFormat::Other(s) => s,
        }
    }
}

/// How a list level renders its counter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NumberingKind {
    /// 1, 2, 3
    #[default]
    Numeric,
    /// a, b, c
    Alphabetic,
    /// i, ii, iii
    Roman,
    /// •
    Bullet,
}

impl NumberingKind {
    /// Format written for this kind
    pub fn format(&self) -> NumberFormat {
        match self {
            NumberingKind::Numeric => NumberFormat::Decimal,
            NumberingKind::Alphabetic => NumberFormat::LowerLetter,
            NumberingKind::Roman => NumberFormat::LowerRoman,
            NumberingKind::Bullet => NumberFormat::Bullet,
        }
    }

    /// Kind of an existing format; anything not a letter, roman or bullet
    /// format counts as numeric
    pub fn from_format(format: &NumberFormat) -> Self {
        match format {
            NumberFormat::UpperLetter | NumberFormat::LowerLetter => NumberingKind::Alphabetic,
            NumberFormat::UpperRoman | NumberFormat::LowerRoman => NumberingKind::Roman,
            NumberFormat::Bullet => NumberingKind::Bullet,
            _ => NumberingKind::Numeric,
        }
    }

    /// Level text for a 1-based level
    pub(crate) fn level_text(&self, level: u8) -> String {
        match self {
            NumberingKind::Bullet => "\u{2022}".to_string(),
            _ => format!("%{}.", level),
        }
    }
}

/// A paragraph's reference into the numbering definitions
///
/// `level` is 1-based (1..=9); it is written as `w:ilvl = level - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NumberingRef {
    pub id: u32,
    pub level: u8,
    pub kind: NumberingKind,
}

/// Deepest list level
pub const MAX_LEVEL: u8 = 9;

impl NumberingRef {
    /// Create a reference, validating the level
    pub fn new(id: u32, level: u8, kind: NumberingKind) -> Result<Self> {
        check_level(level)?;
        Ok(Self { id, level, kind })
    }

    /// Zero-based level index (w:ilvl)
    pub fn ilvl(&self) -> u8 {
        self.level.saturating_sub(1)
    }
}

pub(crate) fn check_level(level: u8) -> Result<()> {
    if (1..=MAX_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(Error::InvalidElement(format!(
            "numbering level {} outside 1..={}",
            level, MAX_LEVEL
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_format() {
        assert_eq!(
            NumberingKind::from_format(&NumberFormat::UpperLetter),
            NumberingKind::Alphabetic
        );
        assert_eq!(
            NumberingKind::from_format(&NumberFormat::UpperRoman),
            NumberingKind::Roman
        );
        assert_eq!(
            NumberingKind::from_format(&"decimalZero".parse().unwrap()),
            NumberingKind::Numeric
        );
        assert_eq!(NumberingKind::Alphabetic.format().as_str(), "lowerLetter");
    }

    #[test]
    fn test_reference_level_bounds() {
        assert!(NumberingRef::new(1, 0, NumberingKind::Numeric).is_err());
        assert!(NumberingRef::new(1, 10, NumberingKind::Numeric).is_err());
        let r = NumberingRef::new(3, 2, NumberingKind::Roman).unwrap();
        assert_eq!(r.ilvl(), 1);
    }
}
