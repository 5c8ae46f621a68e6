//! GSUB merging
//!
//! Lookups of every font are concatenated in font order. A font's glyphs are
//! contiguous in the merged glyph order, so moving a lookup into the merged
//! font only adds the font's glyph offset to each glyph id and the number of
//! earlier lookups to each nested lookup index. Coverage and class ranges
//! stay sorted and single substitution deltas stay valid under that shift.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use read_fonts::{
    TableProvider,
    types::{GlyphId16, Tag},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        gsub::{
            AlternateSubstFormat1, ExtensionSubtable, Gsub, LigatureSubstFormat1,
            MultipleSubstFormat1, ReverseChainSingleSubstFormat1, SingleSubst,
            SubstitutionChainContext, SubstitutionLookup, SubstitutionLookupList,
            SubstitutionSequenceContext,
        },
        layout::{
            ChainedSequenceContext, ClassDef, CoverageTable, FeatureList, FeatureRecord, LangSys,
            LangSysRecord, Lookup, LookupFlag, Script, ScriptList, ScriptRecord, SequenceContext,
            SequenceLookupRecord,
        },
    },
};

use crate::{MergeError, Result, context::MergeContext};

const NO_REQUIRED_FEATURE: u16 = 0xFFFF;

/// Merge the GSUB tables of all fonts.
///
/// Returns `None` when only the base font has one; it is then copied as is.
pub fn merge_gsub(ctx: &MergeContext) -> Result<Option<Gsub>> {
    if !ctx.fonts().iter().skip(1).any(|font| font.gsub().is_ok()) {
        return Ok(None);
    }

    let mut lookups: Vec<SubstitutionLookup> = Vec::new();
    let mut features: Vec<FeatureRecord> = Vec::new();
    let mut scripts: BTreeMap<Tag, Vec<LangSystems>> = BTreeMap::new();

    for (font_idx, font) in ctx.fonts().iter().enumerate() {
        let Ok(gsub) = font.gsub() else {
            continue;
        };
        let gsub: Gsub = gsub.to_owned_table();
        if gsub.feature_variations.as_ref().is_some() {
            warn!("Dropping GSUB feature variations of font {font_idx}");
        }

        let shift = Shift {
            glyphs: ctx.glyph_offset(font_idx),
            lookups: count("lookups", lookups.len())?,
            keep_mark_filtering: font_idx == 0,
        };
        let feature_offset = count("features", features.len())?;

        let Gsub { script_list, feature_list, lookup_list, .. } = gsub;
        for lookup in lookup_list.into_inner().lookups {
            let mut lookup = lookup.into_inner();
            lookup.relocate(shift);
            lookups.push(lookup);
        }
        for mut record in feature_list.into_inner().feature_records {
            for index in &mut record.feature.lookup_list_indices {
                *index = index.saturating_add(shift.lookups);
            }
            features.push(record);
        }
        for record in &script_list.script_records {
            scripts
                .entry(record.script_tag)
                .or_default()
                .push(language_systems(&record.script, feature_offset));
        }
        debug!("Merged GSUB of font {font_idx}");
    }

    count("lookups", lookups.len())?;
    count("features", features.len())?;

    let (feature_list, new_index) = sort_features(features);
    let script_list = merge_scripts(&scripts, &new_index);
    Ok(Some(Gsub::new(script_list, feature_list, SubstitutionLookupList::new(lookups))))
}

fn count(what: &'static str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| MergeError::LayoutOverflow { what, count: len })
}

/// Feature indices of one font's language systems; `None` is the default
type LangSystems = BTreeMap<Option<Tag>, Vec<u16>>;

fn language_systems(script: &Script, feature_offset: u16) -> LangSystems {
    let mut systems = LangSystems::new();
    if let Some(default) = script.default_lang_sys.as_ref() {
        systems.insert(None, feature_indices(default, feature_offset));
    }
    for record in &script.lang_sys_records {
        let indices = feature_indices(&record.lang_sys, feature_offset);
        systems.insert(Some(record.lang_sys_tag), indices);
    }
    systems
}

/// A required feature is merged as an ordinary one.
fn feature_indices(lang_sys: &LangSys, feature_offset: u16) -> Vec<u16> {
    let required = (lang_sys.required_feature_index != NO_REQUIRED_FEATURE)
        .then_some(lang_sys.required_feature_index);
    required
        .into_iter()
        .chain(lang_sys.feature_indices.iter().copied())
        .map(|index| index.saturating_add(feature_offset))
        .collect()
}

/// Sort feature records by tag, keeping font order within a tag.
///
/// Returns the new index of every record by its old index.
fn sort_features(features: Vec<FeatureRecord>) -> (FeatureList, Vec<u16>) {
    let mut order: Vec<usize> = (0..features.len()).collect();
    order.sort_by_key(|&old| features[old].feature_tag);

    let mut new_index = vec![0u16; features.len()];
    for (new, &old) in order.iter().enumerate() {
        new_index[old] = new as u16;
    }

    let mut slots: Vec<Option<FeatureRecord>> = features.into_iter().map(Some).collect();
    let records = order.iter().filter_map(|&old| slots[old].take()).collect();
    (FeatureList::new(records), new_index)
}

/// Union of every font's scripts and language systems.
///
/// A font that has a script but not one of its languages contributes its
/// default language system to that language.
fn merge_scripts(scripts: &BTreeMap<Tag, Vec<LangSystems>>, new_index: &[u16]) -> ScriptList {
    let records = scripts
        .iter()
        .map(|(&script_tag, per_font)| {
            let languages: BTreeSet<Tag> =
                per_font.iter().flat_map(|systems| systems.keys().flatten().copied()).collect();
            let lang_sys_records = languages
                .into_iter()
                .filter_map(|tag| {
                    merge_lang_sys(per_font, Some(tag), new_index)
                        .map(|lang_sys| LangSysRecord::new(tag, lang_sys))
                })
                .collect();
            let default = merge_lang_sys(per_font, None, new_index);
            ScriptRecord::new(script_tag, Script::new(default, lang_sys_records))
        })
        .collect();
    ScriptList::new(records)
}

fn merge_lang_sys(
    per_font: &[LangSystems],
    lang: Option<Tag>,
    new_index: &[u16],
) -> Option<LangSys> {
    let mut found = false;
    let mut indices = Vec::new();
    for systems in per_font {
        if let Some(own) = systems.get(&lang).or_else(|| systems.get(&None)) {
            found = true;
            indices.extend(own.iter().filter_map(|&old| new_index.get(usize::from(old)).copied()));
        }
    }
    indices.sort_unstable();
    indices.dedup();
    found.then(|| LangSys::new(indices))
}

/// How far one font's layout data moves in the merged font
#[derive(Debug, Clone, Copy)]
struct Shift {
    glyphs: u16,
    lookups: u16,
    /// Mark filtering sets index into GDEF, which only the base font keeps.
    keep_mark_filtering: bool,
}

impl Shift {
    fn glyph(self, gid: &mut GlyphId16) {
        *gid = GlyphId16::new(gid.to_u16().saturating_add(self.glyphs));
    }

    fn glyphs(self, gids: &mut [GlyphId16]) {
        for gid in gids {
            self.glyph(gid);
        }
    }

    fn lookup_records(self, records: &mut [SequenceLookupRecord]) {
        for record in records {
            record.lookup_list_index = record.lookup_list_index.saturating_add(self.lookups);
        }
    }
}

/// Moves glyph ids and lookup indices into the merged font.
trait Relocate {
    fn relocate(&mut self, shift: Shift);
}

impl Relocate for CoverageTable {
    fn relocate(&mut self, shift: Shift) {
        match self {
            CoverageTable::Format1(table) => shift.glyphs(&mut table.glyph_array),
            CoverageTable::Format2(table) => {
                for range in &mut table.range_records {
                    shift.glyph(&mut range.start_glyph_id);
                    shift.glyph(&mut range.end_glyph_id);
                }
            }
        }
    }
}

impl Relocate for ClassDef {
    fn relocate(&mut self, shift: Shift) {
        match self {
            ClassDef::Format1(table) => shift.glyph(&mut table.start_glyph_id),
            ClassDef::Format2(table) => {
                for range in &mut table.class_range_records {
                    shift.glyph(&mut range.start_glyph_id);
                    shift.glyph(&mut range.end_glyph_id);
                }
            }
        }
    }
}

impl Relocate for SingleSubst {
    fn relocate(&mut self, shift: Shift) {
        match self {
            // The delta is relative, so only the coverage moves
            SingleSubst::Format1(table) => table.coverage.relocate(shift),
            SingleSubst::Format2(table) => {
                table.coverage.relocate(shift);
                shift.glyphs(&mut table.substitute_glyph_ids);
            }
        }
    }
}

impl Relocate for MultipleSubstFormat1 {
    fn relocate(&mut self, shift: Shift) {
        self.coverage.relocate(shift);
        for sequence in &mut self.sequences {
            shift.glyphs(&mut sequence.substitute_glyph_ids);
        }
    }
}

impl Relocate for AlternateSubstFormat1 {
    fn relocate(&mut self, shift: Shift) {
        self.coverage.relocate(shift);
        for set in &mut self.alternate_sets {
            shift.glyphs(&mut set.alternate_glyph_ids);
        }
    }
}

impl Relocate for LigatureSubstFormat1 {
    fn relocate(&mut self, shift: Shift) {
        self.coverage.relocate(shift);
        for set in &mut self.ligature_sets {
            for ligature in &mut set.ligatures {
                shift.glyph(&mut ligature.ligature_glyph);
                shift.glyphs(&mut ligature.component_glyph_ids);
            }
        }
    }
}

impl Relocate for SequenceContext {
    fn relocate(&mut self, shift: Shift) {
        match self {
            SequenceContext::Format1(table) => {
                table.coverage.relocate(shift);
                for set in table.seq_rule_sets.iter_mut().filter_map(|set| set.as_mut()) {
                    for rule in &mut set.seq_rules {
                        shift.glyphs(&mut rule.input_sequence);
                        shift.lookup_records(&mut rule.seq_lookup_records);
                    }
                }
            }
            SequenceContext::Format2(table) => {
                table.coverage.relocate(shift);
                table.class_def.relocate(shift);
                for set in table.class_seq_rule_sets.iter_mut().filter_map(|set| set.as_mut()) {
                    for rule in &mut set.class_seq_rules {
                        shift.lookup_records(&mut rule.seq_lookup_records);
                    }
                }
            }
            SequenceContext::Format3(table) => {
                for coverage in &mut table.coverages {
                    coverage.relocate(shift);
                }
                shift.lookup_records(&mut table.seq_lookup_records);
            }
        }
    }
}

impl Relocate for ChainedSequenceContext {
    fn relocate(&mut self, shift: Shift) {
        match self {
            ChainedSequenceContext::Format1(table) => {
                table.coverage.relocate(shift);
                for set in table.chained_seq_rule_sets.iter_mut().filter_map(|set| set.as_mut()) {
                    for rule in &mut set.chained_seq_rules {
                        shift.glyphs(&mut rule.backtrack_sequence);
                        shift.glyphs(&mut rule.input_sequence);
                        shift.glyphs(&mut rule.lookahead_sequence);
                        shift.lookup_records(&mut rule.seq_lookup_records);
                    }
                }
            }
            ChainedSequenceContext::Format2(table) => {
                table.coverage.relocate(shift);
                table.backtrack_class_def.relocate(shift);
                table.input_class_def.relocate(shift);
                table.lookahead_class_def.relocate(shift);
                let sets = table.chained_class_seq_rule_sets.iter_mut();
                for set in sets.filter_map(|set| set.as_mut()) {
                    for rule in &mut set.chained_class_seq_rules {
                        shift.lookup_records(&mut rule.seq_lookup_records);
                    }
                }
            }
            ChainedSequenceContext::Format3(table) => {
                for coverage in table
                    .backtrack_coverages
                    .iter_mut()
                    .chain(&mut table.input_coverages)
                    .chain(&mut table.lookahead_coverages)
                {
                    coverage.relocate(shift);
                }
                shift.lookup_records(&mut table.seq_lookup_records);
            }
        }
    }
}

impl Relocate for SubstitutionSequenceContext {
    fn relocate(&mut self, shift: Shift) {
        (**self).relocate(shift);
    }
}

impl Relocate for SubstitutionChainContext {
    fn relocate(&mut self, shift: Shift) {
        (**self).relocate(shift);
    }
}

impl Relocate for ReverseChainSingleSubstFormat1 {
    fn relocate(&mut self, shift: Shift) {
        self.coverage.relocate(shift);
        for coverage in self.backtrack_coverages.iter_mut().chain(&mut self.lookahead_coverages) {
            coverage.relocate(shift);
        }
        shift.glyphs(&mut self.substitute_glyph_ids);
    }
}

impl Relocate for ExtensionSubtable {
    fn relocate(&mut self, shift: Shift) {
        match self {
            ExtensionSubtable::Single(table) => table.extension.relocate(shift),
            ExtensionSubtable::Multiple(table) => table.extension.relocate(shift),
            ExtensionSubtable::Alternate(table) => table.extension.relocate(shift),
            ExtensionSubtable::Ligature(table) => table.extension.relocate(shift),
            ExtensionSubtable::Contextual(table) => table.extension.relocate(shift),
            ExtensionSubtable::ChainContextual(table) => table.extension.relocate(shift),
            ExtensionSubtable::Reverse(table) => table.extension.relocate(shift),
        }
    }
}

impl<T: Relocate> Relocate for Lookup<T> {
    fn relocate(&mut self, shift: Shift) {
        if !shift.keep_mark_filtering
            && self.lookup_flag.contains(LookupFlag::USE_MARK_FILTERING_SET)
        {
            self.lookup_flag = self.lookup_flag - LookupFlag::USE_MARK_FILTERING_SET;
            self.mark_filtering_set = None;
        }
        for subtable in &mut self.subtables {
            subtable.relocate(shift);
        }
    }
}

impl Relocate for SubstitutionLookup {
    fn relocate(&mut self, shift: Shift) {
        match self {
            SubstitutionLookup::Single(lookup) => lookup.relocate(shift),
            SubstitutionLookup::Multiple(lookup) => lookup.relocate(shift),
            SubstitutionLookup::Alternate(lookup) => lookup.relocate(shift),
            SubstitutionLookup::Ligature(lookup) => lookup.relocate(shift),
            SubstitutionLookup::Contextual(lookup) => lookup.relocate(shift),
            SubstitutionLookup::ChainContextual(lookup) => lookup.relocate(shift),
            SubstitutionLookup::Extension(lookup) => lookup.relocate(shift),
            SubstitutionLookup::Reverse(lookup) => lookup.relocate(shift),
        }
    }
}
