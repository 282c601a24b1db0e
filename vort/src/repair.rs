//! Dropping horizontal positioning that no longer fits rotated glyphs.

use write_fonts::types::{GlyphId, Tag};

use crate::{font::Font, layout_index::TagIndex, selection::Selection};

const PALT: Tag = Tag::new(b"palt");
const KERN: Tag = Tag::new(b"kern");
const DIST: Tag = Tag::new(b"dist");

/// Features removed from every rotated glyph.
const ROTATED_FEATURES: [Tag; 3] = [PALT, KERN, DIST];
/// Pair features removed from unrotated glyphs that pair with a rotated one.
const PAIR_FEATURES: [Tag; 2] = [KERN, DIST];

/// What [`repair`] removed, counted in per-glyph subtable rule lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Rule lists removed from selected glyphs.
    pub rotated_rules_removed: usize,
    /// Rule lists removed from unselected glyphs because they paired with a
    /// selected glyph.
    pub mismatched_pairs_removed: usize,
}

/// Remove positioning rules that are invalid once `selection` is rotated.
///
/// Selected glyphs lose everything under `palt`, `kern` and `dist`. An
/// unselected glyph loses a whole `kern` or `dist` subtable if any of its
/// pairs in that subtable has a selected second glyph; the other pairs in
/// the subtable go with it.
pub fn repair(font: &mut Font, index: &TagIndex, selection: &Selection) -> RepairSummary {
    let mut summary = RepairSummary::default();
    for (idx, glyph) in font.glyphs.iter_mut().enumerate() {
        if selection.contains(GlyphId::new(idx as u32)) {
            for tag in ROTATED_FEATURES {
                for subtable in index.subtables(tag).into_iter().flatten() {
                    if glyph.remove_rules(subtable) {
                        summary.rotated_rules_removed += 1;
                    }
                }
            }
            continue;
        }

        for tag in PAIR_FEATURES {
            for subtable in index.subtables(tag).into_iter().flatten() {
                let pairs_with_selected = glyph
                    .rules_in(subtable)
                    .iter()
                    .filter_map(|rule| rule.paired_glyph())
                    .any(|second| selection.contains(second));
                if pairs_with_selected {
                    log::debug!("removing '{subtable}' from '{}'", glyph.name);
                    glyph.remove_rules(subtable);
                    summary.mismatched_pairs_removed += 1;
                }
            }
        }
    }
    log::info!(
        "removed {} positioning subtables from rotated glyphs and {} pair subtables from others",
        summary.rotated_rules_removed,
        summary.mismatched_pairs_removed
    );
    summary
}
