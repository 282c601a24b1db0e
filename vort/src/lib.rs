//! Converting horizontal fonts for use in vertical text.
//!
//! A font made for horizontal CJK text can be laid out vertically by turning
//! it on its side, but then every glyph that is meant to stay upright in
//! vertical text ends up lying down. This crate turns those glyphs back a
//! quarter turn, so the whole font can be rotated as a unit by the layout
//! engine.
//!
//! A glyph is turned if its code point is drawn upright in vertical text
//! according to the Unicode [vertical orientation] property, if it is an
//! unencoded alternate of such a glyph, or if it was replaced by the font's
//! own `vert` feature. Positioning that only makes sense horizontally is
//! removed from turned glyphs.
//!
//! ```no_run
//! use vort::{convert, font::Font, orientation::OrientationTable, ConvertOptions};
//!
//! # fn main() -> Result<(), vort::error::Error> {
//! let mut font = Font::load("font.json")?;
//! let table = OrientationTable::bundled()?;
//! let report = convert(&mut font, &table, &ConvertOptions::default())?;
//! println!("rotated {} glyphs", report.rotated);
//! font.save("font-rotated.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! [vertical orientation]: https://www.unicode.org/reports/tr50/

pub mod error;
pub mod font;
pub mod layout_index;
pub mod orientation;
pub mod repair;
pub mod selection;
pub mod substitute;
pub mod transform;
pub mod width;

use kurbo::Point;

use crate::{
    error::{Diagnostics, Error, Warning},
    font::{Font, TransformScope},
    layout_index::TagIndex,
    orientation::OrientationTable,
    repair::RepairSummary,
    substitute::{AllGlyphs, TransformedOnly},
    transform::PivotMode,
};

pub use crate::{
    selection::{select_for_rotation, Selection},
    substitute::apply_vertical_substitution,
};

const POSTSCRIPT_NAME_SUFFIX: &str = "-Rotated";
const FULL_NAME_SUFFIX: &str = " Rotated";

/// Settings for [`convert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Replace printable ASCII with the fullwidth forms, so Latin text is upright.
    pub half_to_full: bool,
    /// Only apply `vert` to code points with a transformed orientation.
    pub only_sub_table: bool,
    /// Round all outlines to the integer grid when done.
    pub round: bool,
    pub rotation_center: PivotMode,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            half_to_full: false,
            only_sub_table: false,
            round: true,
            rotation_center: PivotMode::default(),
        }
    }
}

/// What [`convert`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversionReport {
    /// Glyphs changed by the `vert` feature.
    pub substituted: u64,
    /// Glyphs turned.
    pub rotated: u64,
    pub repair: RepairSummary,
    /// Halfwidth glyphs replaced by their fullwidth forms.
    pub folded: usize,
    /// The point glyphs were turned about.
    pub pivot: Point,
    pub warnings: Vec<Warning>,
}

/// Convert `font` in place for vertical text.
///
/// The passes run in a fixed order: vertical substitution, selection of the
/// glyphs to turn, removal of horizontal positioning, rotation, the optional
/// halfwidth to fullwidth replacement, and rounding. On error the font may
/// have been partially converted and should be discarded.
pub fn convert(
    font: &mut Font,
    table: &OrientationTable,
    options: &ConvertOptions,
) -> Result<ConversionReport, Error> {
    let mut diagnostics = Diagnostics::default();
    let index = TagIndex::build(font);

    let subbed = if options.only_sub_table {
        apply_vertical_substitution(font, &index, &TransformedOnly(table), &mut diagnostics)?
    } else {
        apply_vertical_substitution(font, &index, &AllGlyphs, &mut diagnostics)?
    };

    let selection = select_for_rotation(font, table, &subbed);
    let repair = repair::repair(font, &index, &selection);

    let scope = TransformScope {
        guides: true,
        simple_positions: true,
        kern_classes: true,
    };
    let pivot = transform::rotate(
        font,
        &selection,
        options.rotation_center,
        scope,
        &mut diagnostics,
    );

    let folded = if options.half_to_full {
        width::fold_half_to_full(font)?
    } else {
        0
    };

    if options.round {
        transform::round_coordinates(font);
    }

    Ok(ConversionReport {
        substituted: subbed.len(),
        rotated: selection.len(),
        repair,
        folded,
        pivot,
        warnings: diagnostics.into_warnings(),
    })
}

/// Mark the font's names as those of a rotated font.
pub fn rename_for_output(font: &mut Font) {
    if let Some(name) = font.postscript_name.as_mut() {
        name.push_str(POSTSCRIPT_NAME_SUFFIX);
    }
    if let Some(name) = font.full_name.as_mut() {
        name.push_str(FULL_NAME_SUFFIX);
    }
}
