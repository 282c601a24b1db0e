//! Mapping feature tags to the lookup subtables registered under them.

use indexmap::{IndexMap, IndexSet};
use write_fonts::types::Tag;

use crate::font::{Font, Glyph, LookupRule, SubtableId};

/// An index from feature tag to subtables, built once per font.
///
/// Positioning lookups are visited before substitution lookups, and
/// subtables keep the order in which they were first seen. Passes that use
/// "the first rule found" depend on this order.
#[derive(Clone, Debug, Default)]
pub struct TagIndex {
    subtables: IndexMap<Tag, IndexSet<SubtableId>>,
    lookups: IndexMap<Tag, Vec<usize>>,
}

impl TagIndex {
    pub fn build(font: &Font) -> Self {
        let mut index = TagIndex::default();
        for (lookup_idx, lookup) in font.gpos_lookups().chain(font.gsub_lookups()) {
            for tag in &lookup.features {
                let lookups = index.lookups.entry(*tag).or_default();
                if !lookups.contains(&lookup_idx) {
                    lookups.push(lookup_idx);
                }
                index
                    .subtables
                    .entry(*tag)
                    .or_default()
                    .extend(lookup.subtables.iter().cloned());
            }
        }
        log::debug!(
            "indexed {} feature tags from {} lookups",
            index.subtables.len(),
            font.lookups.len()
        );
        index
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.subtables.contains_key(&tag)
    }

    /// The subtables registered under `tag`, or `None` if the font has no such feature.
    pub fn subtables(&self, tag: Tag) -> Option<&IndexSet<SubtableId>> {
        self.subtables.get(&tag)
    }

    /// Indices (into the font's lookup list) of lookups registered under `tag`.
    pub fn lookups(&self, tag: Tag) -> &[usize] {
        self.lookups.get(&tag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.subtables.keys().copied()
    }

    /// Every rule attached to `glyph` under any subtable of `tag`, in index order.
    pub fn rules_for<'a>(&self, glyph: &'a Glyph, tag: Tag) -> Vec<&'a LookupRule> {
        self.subtables(tag)
            .into_iter()
            .flatten()
            .flat_map(|subtable| glyph.rules_in(subtable))
            .collect()
    }
}
