//! The in-memory font object model.
//!
//! This is the surface the conversion passes operate on: glyphs with outlines,
//! advances and the positioning/substitution rules attached to them, and the
//! lookups those rules belong to. Fonts are stored as JSON.

use std::path::Path;

use indexmap::IndexMap;
use kurbo::{Affine, BezPath, PathEl, Point};
use serde::{Deserialize, Serialize};
use write_fonts::{
    read::collections::IntSet,
    types::{GlyphId, Tag},
    OtRound,
};

use crate::error::Error;

/// The code point of a glyph that is not mapped by the character map.
pub const UNENCODED: i32 = -1;

/// A font: glyphs, the lookups that reference them and font wide metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default)]
    pub postscript_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub em: u16,
    pub ascent: i32,
    /// The descent, as a positive distance below the baseline.
    pub descent: i32,
    pub glyphs: Vec<Glyph>,
    #[serde(default)]
    pub lookups: Vec<Lookup>,
    #[serde(default)]
    pub guides: Vec<Guide>,
    #[serde(default)]
    pub kern_classes: Vec<KernClass>,
}

/// A single glyph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub name: String,
    /// The Unicode code point, or [`UNENCODED`].
    #[serde(default = "unencoded")]
    pub codepoint: i32,
    #[serde(default)]
    pub outline: BezPath,
    pub advance: i32,
    pub vertical_advance: i32,
    /// Rules attached to this glyph, grouped by subtable, in font order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub rules: IndexMap<SubtableId, Vec<LookupRule>>,
}

/// The outline and advances of a glyph, as moved by copy and paste.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphShape {
    pub outline: BezPath,
    pub advance: i32,
    pub vertical_advance: i32,
}

/// The name of a lookup subtable.
///
/// Subtable names are unique within a font.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtableId(String);

/// Which layout table a lookup belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LayoutTable {
    Gsub,
    Gpos,
}

/// A positioning or substitution lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub name: String,
    pub table: LayoutTable,
    /// The features this lookup is registered under.
    pub features: Vec<Tag>,
    pub subtables: Vec<SubtableId>,
}

/// A placement and advance adjustment, as in an OpenType value record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueAdjust {
    pub x_placement: i32,
    pub y_placement: i32,
    pub x_advance: i32,
    pub y_advance: i32,
}

/// A rule attached to a glyph under some subtable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupRule {
    /// Replace the glyph with `target`.
    Substitution { target: GlyphId },
    /// Replace the glyph with one of several alternates.
    AlternateSubstitution { alternates: Vec<GlyphId> },
    /// Replace the glyph with a sequence of glyphs.
    MultipleSubstitution { targets: Vec<GlyphId> },
    /// This glyph starts a ligature formed with `components`.
    Ligature {
        components: Vec<GlyphId>,
        ligature: GlyphId,
    },
    /// Adjust the placement and advance of the glyph.
    Position(ValueAdjust),
    /// Adjust the glyph and the glyph following it.
    PairPosition {
        second: GlyphId,
        #[serde(default)]
        first_adjust: ValueAdjust,
        #[serde(default)]
        second_adjust: ValueAdjust,
    },
}

/// A guideline: a point and an angle in degrees, counter-clockwise from the x axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}

/// Class based kerning: `values[i * second.len() + j]` applies to a glyph of
/// class `first[i]` followed by a glyph of class `second[j]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KernClass {
    pub subtable: SubtableId,
    pub first: Vec<Vec<GlyphId>>,
    pub second: Vec<Vec<GlyphId>>,
    pub values: Vec<i32>,
}

/// Selects the auxiliary geometry that follows a glyph transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformScope {
    /// Transform the font's guidelines.
    pub guides: bool,
    /// Transform the placement of single positioning rules on transformed glyphs.
    pub simple_positions: bool,
    /// Scale class kerning values; only done when the transform is a pure scale.
    pub kern_classes: bool,
}

fn unencoded() -> i32 {
    UNENCODED
}

impl Font {
    pub fn new(em: u16, ascent: i32, descent: i32) -> Self {
        Font {
            em,
            ascent,
            descent,
            ..Default::default()
        }
    }

    /// Read a font from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&data)
    }

    /// Write this font to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let data = self.to_json()?;
        std::fs::write(path, data).map_err(|e| Error::io(path, e))
    }

    pub fn from_json(data: &str) -> Result<Self, Error> {
        serde_json::from_str(data).map_err(Error::InvalidFont)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::Serialization)
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Iterate the ids of all glyphs, in ascending order.
    pub fn glyph_ids(&self) -> impl Iterator<Item = GlyphId> {
        (0..self.glyphs.len() as u32).map(GlyphId::new)
    }

    pub fn iter_glyphs(&self) -> impl Iterator<Item = (GlyphId, &Glyph)> + '_ {
        self.glyphs
            .iter()
            .enumerate()
            .map(|(idx, glyph)| (GlyphId::new(idx as u32), glyph))
    }

    pub fn glyph(&self, gid: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(gid.to_u32() as usize)
    }

    pub fn glyph_mut(&mut self, gid: GlyphId) -> Option<&mut Glyph> {
        self.glyphs.get_mut(gid.to_u32() as usize)
    }

    /// Returns the first glyph mapped to `codepoint`.
    pub fn glyph_for_codepoint(&self, codepoint: i32) -> Option<GlyphId> {
        if codepoint < 0 {
            return None;
        }
        self.iter_glyphs()
            .find(|(_, glyph)| glyph.codepoint == codepoint)
            .map(|(gid, _)| gid)
    }

    /// Returns the id of the first glyph with this name.
    pub fn glyph_by_name(&self, name: &str) -> Option<GlyphId> {
        self.iter_glyphs()
            .find(|(_, glyph)| glyph.name == name)
            .map(|(gid, _)| gid)
    }

    /// Add a glyph, returning its id.
    pub fn push_glyph(&mut self, glyph: Glyph) -> GlyphId {
        self.glyphs.push(glyph);
        GlyphId::new(self.glyphs.len() as u32 - 1)
    }

    pub fn push_lookup(&mut self, lookup: Lookup) {
        self.lookups.push(lookup);
    }

    /// Positioning lookups with their index in the lookup list.
    pub fn gpos_lookups(&self) -> impl Iterator<Item = (usize, &Lookup)> + '_ {
        self.lookups_in(LayoutTable::Gpos)
    }

    /// Substitution lookups with their index in the lookup list.
    pub fn gsub_lookups(&self) -> impl Iterator<Item = (usize, &Lookup)> + '_ {
        self.lookups_in(LayoutTable::Gsub)
    }

    fn lookups_in(&self, table: LayoutTable) -> impl Iterator<Item = (usize, &Lookup)> + '_ {
        self.lookups
            .iter()
            .enumerate()
            .filter(move |(_, lookup)| lookup.table == table)
    }

    /// Copy the outline and advances of `from` onto `to`, replacing what was there.
    pub fn copy_shape(&mut self, from: GlyphId, to: GlyphId) -> Result<(), Error> {
        let shape = self.glyph(from).ok_or(Error::MissingGlyph(from))?.shape();
        self.glyph_mut(to)
            .ok_or(Error::MissingGlyph(to))?
            .set_shape(shape);
        Ok(())
    }

    /// Apply `affine` to the outlines of `glyphs` and the auxiliary geometry in `scope`.
    pub fn transform_glyphs(
        &mut self,
        glyphs: &IntSet<GlyphId>,
        affine: Affine,
        scope: TransformScope,
    ) {
        let linear = linear_part(affine);
        for gid in glyphs.iter() {
            let Some(glyph) = self.glyph_mut(gid) else {
                continue;
            };
            glyph.outline.apply_affine(affine);
            if scope.simple_positions {
                for rule in glyph.rules.values_mut().flatten() {
                    if let LookupRule::Position(adjust) = rule {
                        let moved = linear
                            * Point::new(adjust.x_placement as f64, adjust.y_placement as f64);
                        adjust.x_placement = round_to_i32(moved.x);
                        adjust.y_placement = round_to_i32(moved.y);
                    }
                }
            }
        }
        if scope.guides {
            for guide in self.guides.iter_mut() {
                guide.transform(affine);
            }
        }
        if scope.kern_classes {
            let [xx, yx, xy, _, _, _] = affine.as_coeffs();
            // kerning values only have meaning along the x axis
            if yx == 0.0 && xy == 0.0 {
                for value in self.kern_classes.iter_mut().flat_map(|k| k.values.iter_mut()) {
                    *value = round_to_i32(*value as f64 * xx);
                }
            }
        }
    }

    /// Round every outline point and guide position to the integer grid.
    pub fn round_to_grid(&mut self) {
        for glyph in self.glyphs.iter_mut() {
            round_path(&mut glyph.outline);
        }
        for guide in self.guides.iter_mut() {
            guide.x = guide.x.ot_round();
            guide.y = guide.y.ot_round();
        }
    }
}

impl Glyph {
    pub fn new(name: impl Into<String>, codepoint: i32) -> Self {
        Glyph {
            name: name.into(),
            codepoint,
            ..Default::default()
        }
    }

    pub fn with_outline(mut self, outline: BezPath) -> Self {
        self.outline = outline;
        self
    }

    pub fn with_advances(mut self, advance: i32, vertical_advance: i32) -> Self {
        self.advance = advance;
        self.vertical_advance = vertical_advance;
        self
    }

    pub fn with_rule(mut self, subtable: impl Into<SubtableId>, rule: LookupRule) -> Self {
        self.rules.entry(subtable.into()).or_default().push(rule);
        self
    }

    /// `true` if this glyph is mapped to a code point.
    pub fn is_encoded(&self) -> bool {
        self.codepoint >= 0
    }

    /// The rules attached to this glyph under `subtable`.
    pub fn rules_in(&self, subtable: &SubtableId) -> &[LookupRule] {
        self.rules.get(subtable).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every rule on this glyph, in subtable order.
    pub fn all_rules(&self) -> impl Iterator<Item = (&SubtableId, &LookupRule)> + '_ {
        self.rules
            .iter()
            .flat_map(|(subtable, rules)| rules.iter().map(move |rule| (subtable, rule)))
    }

    /// Remove every rule attached under `subtable`.
    ///
    /// Returns `true` if there were any.
    pub fn remove_rules(&mut self, subtable: &SubtableId) -> bool {
        self.rules
            .shift_remove(subtable)
            .is_some_and(|rules| !rules.is_empty())
    }

    pub fn shape(&self) -> GlyphShape {
        GlyphShape {
            outline: self.outline.clone(),
            advance: self.advance,
            vertical_advance: self.vertical_advance,
        }
    }

    pub fn set_shape(&mut self, shape: GlyphShape) {
        self.outline = shape.outline;
        self.advance = shape.advance;
        self.vertical_advance = shape.vertical_advance;
    }
}

impl SubtableId {
    pub fn new(name: impl Into<String>) -> Self {
        SubtableId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubtableId {
    fn from(src: &str) -> Self {
        SubtableId(src.to_owned())
    }
}

impl From<String> for SubtableId {
    fn from(src: String) -> Self {
        SubtableId(src)
    }
}

impl std::fmt::Display for SubtableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Lookup {
    pub fn new<S: Into<SubtableId>>(
        name: impl Into<String>,
        table: LayoutTable,
        features: impl IntoIterator<Item = Tag>,
        subtables: impl IntoIterator<Item = S>,
    ) -> Self {
        Lookup {
            name: name.into(),
            table,
            features: features.into_iter().collect(),
            subtables: subtables.into_iter().map(Into::into).collect(),
        }
    }
}

impl LookupRule {
    /// A short name for the kind of rule, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LookupRule::Substitution { .. } => "substitution",
            LookupRule::AlternateSubstitution { .. } => "alternate substitution",
            LookupRule::MultipleSubstitution { .. } => "multiple substitution",
            LookupRule::Ligature { .. } => "ligature",
            LookupRule::Position(_) => "position",
            LookupRule::PairPosition { .. } => "pair position",
        }
    }

    /// The glyphs this rule can substitute in, if it is a single, alternate
    /// or multiple substitution.
    pub fn substitution_targets(&self) -> Option<&[GlyphId]> {
        match self {
            LookupRule::Substitution { target } => Some(std::slice::from_ref(target)),
            LookupRule::AlternateSubstitution { alternates } => Some(alternates),
            LookupRule::MultipleSubstitution { targets } => Some(targets),
            _ => None,
        }
    }

    /// The second glyph of a pair positioning rule.
    pub fn paired_glyph(&self) -> Option<GlyphId> {
        match self {
            LookupRule::PairPosition { second, .. } => Some(*second),
            _ => None,
        }
    }
}

impl Guide {
    fn transform(&mut self, affine: Affine) {
        let origin = affine * Point::new(self.x, self.y);
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let direction = linear_part(affine) * Point::new(cos, sin);
        self.x = origin.x;
        self.y = origin.y;
        self.angle = direction.y.atan2(direction.x).to_degrees();
    }
}

fn linear_part(affine: Affine) -> Affine {
    let [a, b, c, d, _, _] = affine.as_coeffs();
    Affine::new([a, b, c, d, 0.0, 0.0])
}

fn round_to_i32(value: f64) -> i32 {
    let rounded: f64 = value.ot_round();
    rounded as i32
}

fn round_point(point: &mut Point) {
    point.x = point.x.ot_round();
    point.y = point.y.ot_round();
}

fn round_path(path: &mut BezPath) {
    for el in path.elements_mut() {
        match el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => round_point(p),
            PathEl::QuadTo(p0, p1) => {
                round_point(p0);
                round_point(p1);
            }
            PathEl::CurveTo(p0, p1, p2) => {
                round_point(p0);
                round_point(p1);
                round_point(p2);
            }
            PathEl::ClosePath => (),
        }
    }
}
