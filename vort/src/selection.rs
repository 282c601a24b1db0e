//! Deciding which glyphs are turned.

use write_fonts::{read::collections::IntSet, types::GlyphId};

use crate::{font::Font, orientation::OrientationTable};

/// The glyphs to rotate. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    glyphs: IntSet<GlyphId>,
}

/// Builds a [`Selection`] in stages: a seed, then changes that follow
/// substitution rules, then glyphs added unconditionally.
#[derive(Clone, Debug, Default)]
pub struct SelectionBuilder {
    glyphs: IntSet<GlyphId>,
}

impl Selection {
    pub fn builder() -> SelectionBuilder {
        SelectionBuilder::default()
    }

    pub fn contains(&self, gid: GlyphId) -> bool {
        self.glyphs.contains(gid)
    }

    pub fn len(&self) -> u64 {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Selected glyph ids, ascending.
    pub fn iter(&self) -> impl Iterator<Item = GlyphId> + '_ {
        self.glyphs.iter()
    }

    pub fn as_set(&self) -> &IntSet<GlyphId> {
        &self.glyphs
    }
}

impl SelectionBuilder {
    /// Select every encoded glyph whose code point is drawn upright in
    /// vertical text (`U` or `Tu`).
    pub fn seed(mut self, font: &Font, table: &OrientationTable) -> Self {
        self.glyphs.extend(
            font.iter_glyphs()
                .filter(|(_, glyph)| table.classify(glyph.codepoint).is_upright())
                .map(|(gid, _)| gid),
        );
        self
    }

    /// Let unencoded substitution targets follow the glyph they replace.
    ///
    /// Glyphs are visited in id order. For each encoded glyph, every target
    /// of its single, alternate and multiple substitutions that has no code
    /// point of its own is selected if the source is `U` or `Tu`, and
    /// deselected otherwise. When two sources disagree, the later one wins.
    pub fn close_over_substitutions(mut self, font: &Font, table: &OrientationTable) -> Self {
        for (_, glyph) in font.iter_glyphs().filter(|(_, glyph)| glyph.is_encoded()) {
            let upright = table.classify(glyph.codepoint).is_upright();
            let targets = glyph
                .all_rules()
                .filter_map(|(_, rule)| rule.substitution_targets())
                .flatten()
                .copied()
                .filter(|target| font.glyph(*target).is_some_and(|g| !g.is_encoded()));
            for target in targets {
                if upright {
                    self.glyphs.insert(target);
                } else {
                    self.glyphs.remove(target);
                }
            }
        }
        self
    }

    /// Add each of `glyphs` on its own, without any closure.
    pub fn union_singletons(mut self, glyphs: &IntSet<GlyphId>) -> Self {
        self.glyphs.union(glyphs);
        self
    }

    pub fn finish(self) -> Selection {
        Selection {
            glyphs: self.glyphs,
        }
    }
}

/// The glyphs to rotate: upright code points, the unencoded glyphs they
/// substitute to, and the glyphs changed by the vertical substitution pass.
pub fn select_for_rotation(
    font: &Font,
    table: &OrientationTable,
    subbed: &IntSet<GlyphId>,
) -> Selection {
    let selection = Selection::builder()
        .seed(font, table)
        .close_over_substitutions(font, table)
        .union_singletons(subbed)
        .finish();
    log::info!("selected {} glyphs for rotation", selection.len());
    selection
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::font::{Glyph, LookupRule, UNENCODED};

    fn table() -> OrientationTable {
        OrientationTable::parse(
            "0 2f R\n\
             30 39 U\n\
             3001 3002 Tu\n\
             3008 3011 Tr\n\
             3041 3096 U\n",
        )
        .unwrap()
    }

    fn ids(selection: &Selection) -> Vec<u32> {
        selection.iter().map(GlyphId::to_u32).collect()
    }

    fn sub(target: u32) -> LookupRule {
        LookupRule::Substitution {
            target: GlyphId::new(target),
        }
    }

    #[test]
    fn seed_takes_upright_code_points() {
        let mut font = Font::new(1000, 880, 120);
        font.push_glyph(Glyph::new(".notdef", UNENCODED));
        font.push_glyph(Glyph::new("zero", 0x30));
        font.push_glyph(Glyph::new("slash", 0x2F));
        font.push_glyph(Glyph::new("uni3001", 0x3001));
        font.push_glyph(Glyph::new("uni3008", 0x3008));
        font.push_glyph(Glyph::new("uni4E00", 0x4E00));

        let selection = Selection::builder().seed(&font, &table()).finish();
        assert_eq!(ids(&selection), [1, 3]);
    }

    #[test]
    fn unencoded_targets_follow_their_source() {
        let mut font = Font::new(1000, 880, 120);
        // 0: upright, substitutes to 1 (unencoded) and 2 (encoded)
        font.push_glyph(Glyph::new("a", 0x3042).with_rule("salt", sub(1)).with_rule(
            "ccmp",
            LookupRule::MultipleSubstitution {
                targets: vec![GlyphId::new(2), GlyphId::new(3)],
            },
        ));
        font.push_glyph(Glyph::new("a.alt", UNENCODED));
        font.push_glyph(Glyph::new("uni3044", 0x3044));
        font.push_glyph(Glyph::new("a.part", UNENCODED));
        // 4: rotated, alternates to 5
        font.push_glyph(Glyph::new("bracket", 0x3008).with_rule(
            "aalt",
            LookupRule::AlternateSubstitution {
                alternates: vec![GlyphId::new(5)],
            },
        ));
        font.push_glyph(Glyph::new("bracket.alt", UNENCODED));
        // unencoded sources are ignored
        font.push_glyph(Glyph::new("orphan", UNENCODED).with_rule("salt", sub(6)));
        font.push_glyph(Glyph::new("orphan.alt", UNENCODED));

        let selection = Selection::builder()
            .seed(&font, &table())
            .close_over_substitutions(&font, &table())
            .finish();
        assert_eq!(ids(&selection), [0, 1, 2, 3]);
    }

    #[test]
    fn later_sources_win() {
        let mut font = Font::new(1000, 880, 120);
        font.push_glyph(Glyph::new("shared", UNENCODED));
        font.push_glyph(Glyph::new("uni3042", 0x3042).with_rule("salt", sub(0)));
        font.push_glyph(Glyph::new("uni3008", 0x3008).with_rule("salt", sub(0)));
        let selection = select_for_rotation(&font, &table(), &IntSet::empty());
        assert_eq!(ids(&selection), [1]);

        font.glyphs.swap(1, 2);
        let selection = select_for_rotation(&font, &table(), &IntSet::empty());
        assert_eq!(ids(&selection), [0, 2]);
    }

    #[test]
    fn substituted_glyphs_are_always_selected() {
        let mut font = Font::new(1000, 880, 120);
        font.push_glyph(Glyph::new("A", 0x41).with_rule("vert1", sub(1)));
        font.push_glyph(Glyph::new("A.vert", UNENCODED));
        font.push_glyph(Glyph::new("uni3042", 0x3042));
        let subbed = IntSet::from([GlyphId::new(0)]);
        let selection = select_for_rotation(&font, &table(), &subbed);
        // the rotated source deselects its target, but not itself
        assert_eq!(ids(&selection), [0, 2]);
    }
}
