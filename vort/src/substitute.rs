//! Applying the font's own vertical alternates.

use kurbo::{Affine, Vec2};
use write_fonts::{
    read::collections::IntSet,
    types::{GlyphId, Tag},
};

use crate::{
    error::{Diagnostics, Error, Warning},
    font::{Font, Glyph, LookupRule, ValueAdjust},
    layout_index::TagIndex,
    orientation::OrientationTable,
};

/// The feature holding vertical alternates.
pub const VERT: Tag = Tag::new(b"vert");

/// Decides whether a glyph that has a rule under the feature is replaced.
pub trait SubstitutionPolicy {
    fn should_substitute(&self, glyph: &Glyph) -> bool;
}

/// Every glyph with a rule is substituted.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllGlyphs;

/// Only glyphs whose code point has one of the transformed orientations
/// (`T`, `Tu` or `Tr`) are substituted.
#[derive(Clone, Copy, Debug)]
pub struct TransformedOnly<'a>(pub &'a OrientationTable);

impl SubstitutionPolicy for AllGlyphs {
    fn should_substitute(&self, _glyph: &Glyph) -> bool {
        true
    }
}

impl SubstitutionPolicy for TransformedOnly<'_> {
    fn should_substitute(&self, glyph: &Glyph) -> bool {
        self.0.classify(glyph.codepoint).is_transformed()
    }
}

impl<F: Fn(&Glyph) -> bool> SubstitutionPolicy for F {
    fn should_substitute(&self, glyph: &Glyph) -> bool {
        self(glyph)
    }
}

/// Chooses which of several rules found for a glyph is applied.
pub trait TieBreak {
    fn pick<'a>(&self, rules: &[&'a LookupRule]) -> Option<&'a LookupRule>;
}

/// The first rule in lookup order wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstRule;

impl TieBreak for FirstRule {
    fn pick<'a>(&self, rules: &[&'a LookupRule]) -> Option<&'a LookupRule> {
        rules.first().copied()
    }
}

/// The ways a chosen rule changes its glyph.
enum Edit {
    CopyFrom(GlyphId),
    Adjust(ValueAdjust),
}

/// Apply the rules registered under `tag` to every admitted glyph.
///
/// Returns the glyphs that were changed. A font without the feature is
/// reported and left alone.
pub fn apply_substitution(
    font: &mut Font,
    index: &TagIndex,
    tag: Tag,
    policy: &impl SubstitutionPolicy,
    tie_break: &impl TieBreak,
    diagnostics: &mut Diagnostics,
) -> Result<IntSet<GlyphId>, Error> {
    let mut subbed = IntSet::empty();
    if !index.contains(tag) {
        diagnostics.report(Warning::MissingFeatureTag(tag));
        return Ok(subbed);
    }

    for gid in font.glyph_ids() {
        let Some(glyph) = font.glyph(gid) else {
            continue;
        };
        let rules = index.rules_for(glyph, tag);
        if rules.is_empty() || !policy.should_substitute(glyph) {
            continue;
        }
        let Some(rule) = tie_break.pick(&rules) else {
            continue;
        };
        let edit = match rule {
            LookupRule::Substitution { target } => Edit::CopyFrom(*target),
            LookupRule::AlternateSubstitution { alternates } if !alternates.is_empty() => {
                Edit::CopyFrom(alternates[0])
            }
            LookupRule::Position(adjust) => Edit::Adjust(*adjust),
            other => {
                diagnostics.report(Warning::UnsupportedRuleKind {
                    glyph: glyph.name.clone(),
                    tag,
                    kind: other.kind_name(),
                });
                continue;
            }
        };

        match edit {
            Edit::CopyFrom(target) => {
                log::debug!("'{tag}': {gid} takes the outline of {target}");
                font.copy_shape(target, gid)?;
            }
            Edit::Adjust(adjust) => {
                log::debug!("'{tag}': {gid} adjusted by {adjust:?}");
                let glyph = font.glyph_mut(gid).ok_or(Error::MissingGlyph(gid))?;
                glyph.advance = glyph.advance.saturating_add(adjust.x_advance);
                glyph.vertical_advance = glyph.vertical_advance.saturating_add(adjust.y_advance);
                let offset = Vec2::new(adjust.x_placement as f64, adjust.y_placement as f64);
                glyph.outline.apply_affine(Affine::translate(offset));
            }
        }
        subbed.insert(gid);
    }

    log::info!("applied '{tag}' to {} glyphs", subbed.len());
    Ok(subbed)
}

/// [`apply_substitution`] for the `vert` feature with the first-rule tie break.
pub fn apply_vertical_substitution(
    font: &mut Font,
    index: &TagIndex,
    policy: &impl SubstitutionPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<IntSet<GlyphId>, Error> {
    apply_substitution(font, index, VERT, policy, &FirstRule, diagnostics)
}
