//! Turning the selected glyphs by a quarter turn.

use kurbo::{Affine, Point, Rect, Shape};

use crate::{
    error::{Diagnostics, Warning},
    font::{Font, TransformScope},
    selection::Selection,
};

/// A counter-clockwise quarter turn (in a y-up coordinate system), with no
/// rounding error in the matrix.
const QUARTER_TURN: Affine = Affine::new([0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);

/// Where the selected glyphs are turned about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PivotMode {
    /// `(em / 2, em / 2 - descent)`: the centre of the em box.
    #[default]
    HalfEmMinusDescent,
    /// `(em / 2, em / 2)`.
    HalfEm,
    /// The centre of the bounding box of all selected outlines.
    BoundingBox,
}

/// The point to rotate about.
///
/// With [`PivotMode::BoundingBox`], a selection without any outline falls
/// back to [`PivotMode::HalfEmMinusDescent`] and a warning is reported.
pub fn pivot(
    font: &Font,
    selection: &Selection,
    mode: PivotMode,
    diagnostics: &mut Diagnostics,
) -> Point {
    let half_em = font.em as f64 / 2.0;
    match mode {
        PivotMode::HalfEmMinusDescent => Point::new(half_em, half_em - font.descent as f64),
        PivotMode::HalfEm => Point::new(half_em, half_em),
        PivotMode::BoundingBox => match selection_bounds(font, selection) {
            Some(bounds) => bounds.center(),
            None => {
                diagnostics.report(Warning::EmptySelectionBounds);
                pivot(font, selection, PivotMode::HalfEmMinusDescent, diagnostics)
            }
        },
    }
}

/// The union of the bounding boxes of the selected glyphs that have an outline.
pub fn selection_bounds(font: &Font, selection: &Selection) -> Option<Rect> {
    selection
        .iter()
        .filter_map(|gid| font.glyph(gid))
        .filter(|glyph| !glyph.outline.elements().is_empty())
        .map(|glyph| glyph.outline.bounding_box())
        .reduce(|acc, bounds| acc.union(bounds))
}

/// A quarter turn about `pivot`.
pub fn rotation_about(pivot: Point) -> Affine {
    let offset = pivot.to_vec2();
    Affine::translate(offset) * QUARTER_TURN * Affine::translate(-offset)
}

/// Rotate the selected glyphs about the pivot chosen by `mode`, along with
/// the auxiliary geometry in `scope`.
///
/// Advances are left as they are. Returns the pivot that was used.
pub fn rotate(
    font: &mut Font,
    selection: &Selection,
    mode: PivotMode,
    scope: TransformScope,
    diagnostics: &mut Diagnostics,
) -> Point {
    let center = pivot(font, selection, mode, diagnostics);
    log::info!(
        "rotating {} glyphs about ({}, {})",
        selection.len(),
        center.x,
        center.y
    );
    font.transform_glyphs(selection.as_set(), rotation_about(center), scope);
    center
}

/// Round every point in the font to the integer grid.
pub fn round_coordinates(font: &mut Font) {
    font.round_to_grid();
}

#[cfg(test)]
mod tests {
    use kurbo::BezPath;
    use pretty_assertions::assert_eq;
    use write_fonts::{read::collections::IntSet, types::GlyphId};

    use super::*;
    use crate::font::{Glyph, UNENCODED};

    fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        Rect::new(x0, y0, x1, y1).to_path(0.1)
    }

    fn select(ids: &[u32]) -> Selection {
        let glyphs: IntSet<GlyphId> = ids.iter().copied().map(GlyphId::new).collect();
        Selection::builder().union_singletons(&glyphs).finish()
    }

    fn hiragana_font() -> Font {
        let mut font = Font::new(1000, 880, 120);
        font.push_glyph(
            Glyph::new("uni3042", 0x3042)
                .with_outline(rect_path(100.0, 0.0, 700.0, 800.0))
                .with_advances(1000, 1000),
        );
        font.push_glyph(
            Glyph::new("A", 0x41)
                .with_outline(rect_path(50.0, 0.0, 550.0, 700.0))
                .with_advances(600, 1000),
        );
        font
    }

    #[test]
    fn pivots() {
        let font = hiragana_font();
        let mut diagnostics = Diagnostics::default();
        let selection = select(&[0, 1]);
        assert_eq!(
            pivot(&font, &selection, PivotMode::HalfEmMinusDescent, &mut diagnostics),
            Point::new(500.0, 380.0)
        );
        assert_eq!(
            pivot(&font, &selection, PivotMode::HalfEm, &mut diagnostics),
            Point::new(500.0, 500.0)
        );
        // the union of both glyphs, not just the last one
        assert_eq!(
            pivot(&font, &selection, PivotMode::BoundingBox, &mut diagnostics),
            Point::new(375.0, 400.0)
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn bounding_box_without_ink_falls_back() {
        let mut font = hiragana_font();
        let space = font.push_glyph(Glyph::new("space", 0x3000).with_advances(1000, 1000));
        let mut diagnostics = Diagnostics::default();
        let selection = select(&[space.to_u32()]);
        assert_eq!(
            pivot(&font, &selection, PivotMode::BoundingBox, &mut diagnostics),
            Point::new(500.0, 380.0)
        );
        assert_eq!(diagnostics.warnings(), &[Warning::EmptySelectionBounds]);
    }

    #[test]
    fn rotation_swaps_bounding_box_dimensions() {
        let mut font = hiragana_font();
        let mut diagnostics = Diagnostics::default();
        let center = rotate(
            &mut font,
            &select(&[0]),
            PivotMode::default(),
            TransformScope::default(),
            &mut diagnostics,
        );
        assert_eq!(center, Point::new(500.0, 380.0));

        let bounds = font.glyphs[0].outline.bounding_box();
        assert_eq!(bounds, Rect::new(80.0, -20.0, 880.0, 580.0));
        assert_eq!((bounds.width(), bounds.height()), (800.0, 600.0));
        // advances are not swapped
        assert_eq!(
            (font.glyphs[0].advance, font.glyphs[0].vertical_advance),
            (1000, 1000)
        );
        // unselected glyphs stay put
        assert_eq!(font.glyphs[1], hiragana_font().glyphs[1]);
    }

    #[test]
    fn two_quarter_turns_are_a_half_turn() {
        let pivot = Point::new(500.0, 380.0);
        let quarter = rotation_about(pivot);
        let half = Affine::translate(pivot.to_vec2())
            * Affine::scale(-1.0)
            * Affine::translate(-pivot.to_vec2());
        assert_eq!((quarter * quarter).as_coeffs(), half.as_coeffs());

        let mut twice = hiragana_font();
        let mut diagnostics = Diagnostics::default();
        for _ in 0..2 {
            rotate(
                &mut twice,
                &select(&[0, 1]),
                PivotMode::default(),
                TransformScope::default(),
                &mut diagnostics,
            );
        }
        let mut once = hiragana_font();
        once.transform_glyphs(
            &IntSet::from([GlyphId::new(0), GlyphId::new(1)]),
            half,
            TransformScope::default(),
        );
        assert_eq!(twice, once);
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let rotation = rotation_about(Point::ORIGIN);
        assert_eq!(rotation * Point::new(1.0, 0.0), Point::new(0.0, 1.0));
        assert_eq!(rotation * Point::new(0.0, 1.0), Point::new(-1.0, 0.0));
        assert_eq!(
            rotation_about(Point::new(10.0, 0.0)) * Point::new(10.0, 0.0),
            Point::new(10.0, 0.0)
        );
    }

    #[test]
    fn rounding_snaps_rotated_outlines() {
        let mut font = Font::new(1000, 880, 120);
        font.push_glyph(
            Glyph::new("dot", UNENCODED).with_outline(rect_path(0.25, 0.25, 10.75, 10.75)),
        );
        round_coordinates(&mut font);
        assert_eq!(
            font.glyphs[0].outline.bounding_box(),
            Rect::new(0.0, 0.0, 11.0, 11.0)
        );
    }
}
