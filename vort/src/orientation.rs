//! The Unicode vertical orientation property.
//!
//! See [UAX #50](https://www.unicode.org/reports/tr50/) for the meaning of
//! the classes. Tables are read from text, in either the compact form
//!
//! ```text
//! 3042 U
//! 3041 3041 Tu
//! ```
//!
//! or the form used by the Unicode character database:
//!
//! ```text
//! 3008..3011    ; Tr # Ps   [10] LEFT ANGLE BRACKET..RIGHT BLACK LENTICULAR BRACKET
//! ```

use std::{path::Path, str::FromStr};

use rangemap::RangeInclusiveMap;

use crate::error::Error;

const BUNDLED_TABLE: &str = include_str!("../../resources/vertical_orientation.txt");

const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Ranges of code points whose orientation defaults to something other
/// than `R` when they are not listed in the Unicode data file.
///
/// The first entry sets the overall default; later entries overwrite it.
const UNLISTED_DEFAULTS: &[(u32, u32, OrientationClass)] = &[
    (0x0, 0x10FFFF, OrientationClass::Rotated),
    (0x18B0, 0x18FF, OrientationClass::Upright),
    (0x2065, 0x2065, OrientationClass::Upright),
    (0x2150, 0x218F, OrientationClass::Upright),
    (0x2400, 0x245F, OrientationClass::Upright),
    (0x2BB8, 0x2BFF, OrientationClass::Upright),
    (0x2E80, 0xA4CF, OrientationClass::Upright),
    (0xA960, 0xA97F, OrientationClass::Upright),
    (0xAC00, 0xD7FF, OrientationClass::Upright),
    (0xE000, 0xFAFF, OrientationClass::Upright),
    (0xFE10, 0xFE1F, OrientationClass::Upright),
    (0xFE50, 0xFE6F, OrientationClass::Upright),
    (0xFFE7, 0xFFE7, OrientationClass::Upright),
    (0xFFF0, 0xFFF8, OrientationClass::Upright),
    (0x11580, 0x115FF, OrientationClass::Upright),
    (0x11A00, 0x11AAF, OrientationClass::Upright),
    (0x13000, 0x1345F, OrientationClass::Upright),
    (0x14400, 0x1467F, OrientationClass::Upright),
    (0x16FE0, 0x18AFF, OrientationClass::Upright),
    (0x18B00, 0x18D7F, OrientationClass::Upright),
    (0x1AFF0, 0x1AFFF, OrientationClass::Upright),
    (0x1B100, 0x1B16F, OrientationClass::Upright),
    (0x1B170, 0x1B2FF, OrientationClass::Upright),
    (0x1CF00, 0x1CFCF, OrientationClass::Upright),
    (0x1D000, 0x1D1FF, OrientationClass::Upright),
    (0x1D2E0, 0x1D2FF, OrientationClass::Upright),
    (0x1D300, 0x1D37F, OrientationClass::Upright),
    (0x1D800, 0x1DAAF, OrientationClass::Upright),
    (0x1F000, 0x1F0FF, OrientationClass::Upright),
    (0x1F100, 0x1F2FF, OrientationClass::Upright),
    (0x1F680, 0x1F7FF, OrientationClass::Upright),
    (0x1F900, 0x1F9FF, OrientationClass::Upright),
    (0x1FA00, 0x1FAFF, OrientationClass::Upright),
    (0x20000, 0x2FFFD, OrientationClass::Upright),
    (0x30000, 0x3FFFD, OrientationClass::Upright),
    (0xF0000, 0xFFFFD, OrientationClass::Upright),
    (0x100000, 0x10FFFD, OrientationClass::Upright),
];

/// The vertical orientation of a code point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrientationClass {
    /// Displayed upright, as in the code charts (`U`).
    Upright,
    /// Displayed sideways, rotated 90 degrees clockwise (`R`).
    Rotated,
    /// Requires a different glyph in vertical text (`T`).
    Transformed,
    /// Requires a different glyph; falls back to upright (`Tu`).
    TransformedFallbackUpright,
    /// Requires a different glyph; falls back to rotated (`Tr`).
    TransformedFallbackRotated,
    /// Not covered by the table (`None`).
    #[default]
    Unspecified,
}

/// One range of a [`OrientationTable`], inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrientationEntry {
    pub start: u32,
    pub end: u32,
    pub class: OrientationClass,
}

/// Sorted, disjoint ranges of code points and their orientation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrientationTable {
    entries: Vec<OrientationEntry>,
}

/// Builds a table by layering ranges; a later range replaces whatever part
/// of earlier ranges it covers.
#[derive(Clone, Debug, Default)]
pub struct OrientationTableBuilder {
    ranges: RangeInclusiveMap<u32, OrientationClass>,
}

/// An error encountered while reading an orientation table.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected '<codepoint> <class>', '<start> <end> <class>' or '<start>..<end> ; <class>', found '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: invalid code point '{text}'")]
    InvalidCodepoint { line: usize, text: String },

    #[error("line {line}: unknown orientation class '{text}'")]
    UnknownClass { line: usize, text: String },

    #[error("line {line}: range start {start:04X} is after its end {end:04X}")]
    InvertedRange { line: usize, start: u32, end: u32 },

    #[error("ranges {first_start:04X}..{first_end:04X} and {second_start:04X}..{second_end:04X} overlap")]
    OverlappingRanges {
        first_start: u32,
        first_end: u32,
        second_start: u32,
        second_end: u32,
    },
}

impl OrientationClass {
    /// The abbreviation used in the Unicode data files.
    pub fn token(self) -> &'static str {
        match self {
            OrientationClass::Upright => "U",
            OrientationClass::Rotated => "R",
            OrientationClass::Transformed => "T",
            OrientationClass::TransformedFallbackUpright => "Tu",
            OrientationClass::TransformedFallbackRotated => "Tr",
            OrientationClass::Unspecified => "None",
        }
    }

    /// `true` for `T`, `Tu` and `Tr`.
    pub fn is_transformed(self) -> bool {
        matches!(
            self,
            OrientationClass::Transformed
                | OrientationClass::TransformedFallbackUpright
                | OrientationClass::TransformedFallbackRotated
        )
    }

    /// `true` for the classes whose glyphs are drawn upright in vertical
    /// text, and so must be turned in a font that is laid out sideways.
    pub fn is_upright(self) -> bool {
        matches!(
            self,
            OrientationClass::Upright | OrientationClass::TransformedFallbackUpright
        )
    }
}

impl FromStr for OrientationClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(OrientationClass::Upright),
            "R" => Ok(OrientationClass::Rotated),
            "T" => Ok(OrientationClass::Transformed),
            "Tu" => Ok(OrientationClass::TransformedFallbackUpright),
            "Tr" => Ok(OrientationClass::TransformedFallbackRotated),
            "None" => Ok(OrientationClass::Unspecified),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for OrientationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl OrientationTable {
    /// Parse a table in either the compact or the Unicode data format.
    ///
    /// Ranges must not overlap.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::from_entries(parse_lines(text)?)
    }

    /// Read and parse a table file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::parse(&text)?)
    }

    /// Parse a Unicode `VerticalOrientation.txt` file, filling the code
    /// points it does not list with their documented defaults.
    pub fn from_unicode_data(text: &str) -> Result<Self, ParseError> {
        let mut builder = Self::builder();
        for &(start, end, class) in UNLISTED_DEFAULTS {
            builder.insert(start, end, class);
        }
        for entry in parse_lines(text)? {
            builder.insert(entry.start, entry.end, entry.class);
        }
        Ok(builder.build())
    }

    /// The table compiled into this crate.
    ///
    /// Built from `VerticalOrientation-15.1.0.txt`. Use `vort-table` to
    /// generate a table for another Unicode version.
    pub fn bundled() -> Result<Self, ParseError> {
        Self::from_unicode_data(BUNDLED_TABLE)
    }

    pub fn builder() -> OrientationTableBuilder {
        OrientationTableBuilder::default()
    }

    /// Create a table from entries in any order.
    pub fn from_entries(mut entries: Vec<OrientationEntry>) -> Result<Self, ParseError> {
        entries.sort_unstable_by_key(|entry| entry.start);
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].end >= pair[1].start) {
            return Err(ParseError::OverlappingRanges {
                first_start: pair[0].start,
                first_end: pair[0].end,
                second_start: pair[1].start,
                second_end: pair[1].end,
            });
        }
        Ok(OrientationTable { entries })
    }

    /// The orientation of `codepoint`.
    ///
    /// Negative values (unencoded glyphs) are [`OrientationClass::Unspecified`].
    pub fn classify(&self, codepoint: i32) -> OrientationClass {
        match u32::try_from(codepoint) {
            Ok(codepoint) => self.lookup(codepoint),
            Err(_) => OrientationClass::Unspecified,
        }
    }

    /// The orientation of a Unicode scalar value.
    pub fn lookup(&self, codepoint: u32) -> OrientationClass {
        // index of the first range starting after codepoint
        let idx = self.entries.partition_point(|entry| entry.start <= codepoint);
        match idx.checked_sub(1).map(|idx| &self.entries[idx]) {
            Some(entry) if codepoint <= entry.end => entry.class,
            _ => OrientationClass::Unspecified,
        }
    }

    pub fn entries(&self) -> &[OrientationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write this table in the compact `start end class` form.
    pub fn to_compact_string(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{:x} {:x} {}\n", entry.start, entry.end, entry.class))
            .collect()
    }
}

impl OrientationTableBuilder {
    /// Set the class of `start..=end`, replacing any previous assignment.
    pub fn insert(&mut self, start: u32, end: u32, class: OrientationClass) {
        if end < start {
            return;
        }
        self.ranges.insert(start..=end, class);
    }

    /// Finish the table. Adjacent ranges of the same class are merged.
    pub fn build(self) -> OrientationTable {
        let entries = self
            .ranges
            .iter()
            .map(|(range, class)| OrientationEntry {
                start: *range.start(),
                end: *range.end(),
                class: *class,
            })
            .collect();
        OrientationTable { entries }
    }
}

fn parse_lines(text: &str) -> Result<Vec<OrientationEntry>, ParseError> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        if let Some(entry) = parse_line(idx + 1, raw)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn parse_line(line: usize, raw: &str) -> Result<Option<OrientationEntry>, ParseError> {
    let content = raw.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return Ok(None);
    }
    let malformed = || ParseError::MalformedLine {
        line,
        text: raw.trim().to_owned(),
    };

    let (start, end, class) = if let Some((range, class)) = content.split_once(';') {
        let class = class.trim();
        if class.contains(';') || class.split_whitespace().count() != 1 {
            return Err(malformed());
        }
        match range.trim().split_once("..") {
            Some((start, end)) => (start.trim(), end.trim(), class),
            None => (range.trim(), range.trim(), class),
        }
    } else {
        let tokens: Vec<_> = content.split_whitespace().collect();
        match tokens.as_slice() {
            [codepoint, class] => (*codepoint, *codepoint, *class),
            [start, end, class] => (*start, *end, *class),
            _ => return Err(malformed()),
        }
    };

    let start = parse_codepoint(line, start)?;
    let end = parse_codepoint(line, end)?;
    if start > end {
        return Err(ParseError::InvertedRange { line, start, end });
    }
    let class = class.parse().map_err(|_| ParseError::UnknownClass {
        line,
        text: class.to_owned(),
    })?;
    Ok(Some(OrientationEntry { start, end, class }))
}

fn parse_codepoint(line: usize, text: &str) -> Result<u32, ParseError> {
    let digits = text
        .strip_prefix("U+")
        .or_else(|| text.strip_prefix("0x"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16)
        .ok()
        .filter(|codepoint| *codepoint <= MAX_CODEPOINT)
        .ok_or_else(|| ParseError::InvalidCodepoint {
            line,
            text: text.to_owned(),
        })
}
