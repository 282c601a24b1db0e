//! Replacing halfwidth ASCII with the font's fullwidth forms.

use std::ops::RangeInclusive;

use crate::{error::Error, font::Font};

/// The printable ASCII range, space excluded.
const HALFWIDTH: RangeInclusive<i32> = 0x21..=0x7E;
/// Distance from an ASCII character to its fullwidth form (U+FF01 for '!').
const FULLWIDTH_OFFSET: i32 = 0xFEE0;

/// Give each printable ASCII glyph the outline and advances of its fullwidth
/// counterpart, so that Latin text is set upright like the rest.
///
/// Characters that lack either form are skipped. Returns the number of
/// glyphs changed.
pub fn fold_half_to_full(font: &mut Font) -> Result<usize, Error> {
    let mut folded = 0;
    for codepoint in HALFWIDTH {
        let (Some(half), Some(full)) = (
            font.glyph_for_codepoint(codepoint),
            font.glyph_for_codepoint(codepoint + FULLWIDTH_OFFSET),
        ) else {
            continue;
        };
        font.copy_shape(full, half)?;
        folded += 1;
    }
    log::info!("folded {folded} halfwidth glyphs to fullwidth");
    Ok(folded)
}
