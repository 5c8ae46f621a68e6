//! Builders for small synthetic TrueType fonts.
//!
//! Only compiled for tests and for the `testing` feature.

use std::collections::{BTreeMap, HashMap};

use font_types::{FWord, Fixed, GlyphId16, LongDateTime, NameId, Tag, UfWord};
use read_fonts::{FontRef, TableProvider, tables::glyf::CurvePoint, types::GlyphId};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::{Cmap, CmapSubtable, EncodingRecord, PlatformId},
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour,
            GlyfLocaBuilder, Glyph, SimpleGlyph, Transform,
        },
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
        vhea::Vhea,
        vmtx::{LongMetric as VerticalMetric, Vmtx},
    },
};

use crate::cmap::{VariationGlyph, variation_subtable};

/// A glyph of a [`TestFont`].
#[derive(Debug, Clone)]
pub struct TestGlyph {
    pub name: String,
    pub codepoint: Option<char>,
    pub advance: u16,
    pub contours: Vec<Vec<(i16, i16, bool)>>,
    pub components: Vec<(String, i16, i16)>,
    pub instructions: Vec<u8>,
}

impl TestGlyph {
    /// A glyph without outlines.
    pub fn empty(name: &str, codepoint: Option<char>, advance: u16) -> Self {
        Self {
            name: name.to_string(),
            codepoint,
            advance,
            contours: vec![],
            components: vec![],
            instructions: vec![],
        }
    }

    /// A box from `(50, 0)` to `(advance - 50, 700)`.
    pub fn square(name: &str, codepoint: Option<char>, advance: u16) -> Self {
        let right = advance as i16 - 50;
        Self {
            contours: vec![vec![
                (50, 0, true),
                (50, 700, true),
                (right, 700, true),
                (right, 0, true),
            ]],
            ..Self::empty(name, codepoint, advance)
        }
    }

    pub fn with_instructions(mut self, instructions: Vec<u8>) -> Self {
        self.instructions = instructions;
        self
    }
}

/// Minimal TrueType font builder.
///
/// Glyph 0 is always an empty `.notdef`.
#[derive(Debug, Clone)]
pub struct TestFont {
    units_per_em: u16,
    glyphs: Vec<TestGlyph>,
    os2_version: Option<u16>,
    vertical: bool,
    family: String,
    extra_tables: Vec<(Tag, Vec<u8>)>,
    /// `(base, selector, glyph name)`; no name means the default glyph
    variants: Vec<(char, u32, Option<String>)>,
}

impl TestFont {
    pub fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            glyphs: vec![TestGlyph::empty(".notdef", None, units_per_em / 2)],
            os2_version: Some(4),
            vertical: false,
            family: "Test Family".to_string(),
            extra_tables: vec![],
            variants: vec![],
        }
    }

    pub fn glyph(mut self, glyph: TestGlyph) -> Self {
        self.glyphs.push(glyph);
        self
    }

    pub fn square(self, name: &str, codepoint: char, advance: u16) -> Self {
        self.glyph(TestGlyph::square(name, Some(codepoint), advance))
    }

    pub fn composite(
        self,
        name: &str,
        codepoint: Option<char>,
        advance: u16,
        components: &[(&str, i16, i16)],
    ) -> Self {
        let mut glyph = TestGlyph::empty(name, codepoint, advance);
        glyph.components = components
            .iter()
            .map(|(base, dx, dy)| (base.to_string(), *dx, *dy))
            .collect();
        self.glyph(glyph)
    }

    /// OS/2 version, or `None` to omit the table.
    pub fn os2_version(mut self, version: Option<u16>) -> Self {
        self.os2_version = version;
        self
    }

    /// Add `vhea` and `vmtx`.
    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }

    pub fn family(mut self, family: &str) -> Self {
        self.family = family.to_string();
        self
    }

    /// Add a variation sequence to a format 14 cmap subtable.
    pub fn variant(mut self, base: char, selector: u32, glyph: Option<&str>) -> Self {
        self.variants.push((base, selector, glyph.map(str::to_string)));
        self
    }

    /// Add a raw table.
    pub fn table(mut self, tag: Tag, data: Vec<u8>) -> Self {
        self.extra_tables.push((tag, data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let upem = self.units_per_em as i32;
        let ascender = (upem * 8 / 10) as i16;
        let descender = -((upem * 2 / 10) as i16);

        let name_to_gid: HashMap<&str, u16> = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.as_str(), i as u16))
            .collect();

        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in &self.glyphs {
            glyf_builder.add_glyph(&self.make_glyph(glyph, &name_to_gid)).expect("glyph");
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let cmap = Cmap::from_mappings(self.glyphs.iter().enumerate().filter_map(|(gid, g)| {
            g.codepoint.map(|c| (c, GlyphId::new(gid as u32)))
        }))
        .expect("cmap");
        let cmap = self.with_variants(cmap, &name_to_gid);

        let head = Head {
            font_revision: Fixed::from_f64(1.0),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: Flags::empty(),
            units_per_em: self.units_per_em,
            created: LongDateTime::new(0),
            modified: LongDateTime::new(0),
            x_min: 0,
            y_min: descender,
            x_max: self.max_advance() as i16,
            y_max: ascender,
            mac_style: MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
        };

        let num_glyphs = self.glyphs.len() as u16;

        let hhea = Hhea {
            ascender: FWord::new(ascender),
            descender: FWord::new(descender),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(self.max_advance()),
            min_left_side_bearing: FWord::new(0),
            min_right_side_bearing: FWord::new(0),
            x_max_extent: FWord::new(self.max_advance() as i16),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: num_glyphs,
        };

        let hmtx = Hmtx {
            h_metrics: self
                .glyphs
                .iter()
                .map(|g| LongMetric {
                    advance: g.advance,
                    side_bearing: if g.contours.is_empty() { 0 } else { 50 },
                })
                .collect(),
            left_side_bearings: vec![],
        };

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(4),
            max_contours: Some(1),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(1),
            max_component_depth: Some(1),
        };

        let mut post = Post::new_v2(self.glyphs.iter().map(|g| g.name.as_str()));
        post.underline_position = FWord::new(-(upem / 10) as i16);
        post.underline_thickness = FWord::new((upem / 20) as i16);

        let mut builder = FontBuilder::new();
        builder.add_table(&head).expect("head");
        builder.add_table(&hhea).expect("hhea");
        builder.add_table(&hmtx).expect("hmtx");
        builder.add_table(&maxp).expect("maxp");
        builder.add_table(&cmap).expect("cmap");
        builder.add_table(&post).expect("post");
        builder.add_table(&glyf).expect("glyf");
        builder.add_table(&loca).expect("loca");
        builder.add_table(&self.make_name()).expect("name");

        if let Some(version) = self.os2_version {
            builder.add_table(&make_os2(version, ascender, descender)).expect("OS/2");
        }

        if self.vertical {
            let vhea = Vhea {
                ascender: FWord::new((upem / 2) as i16),
                descender: FWord::new(-(upem / 2) as i16),
                line_gap: FWord::new(0),
                advance_height_max: UfWord::new(self.units_per_em),
                min_top_side_bearing: FWord::new(0),
                min_bottom_side_bearing: FWord::new(0),
                y_max_extent: FWord::new(upem as i16),
                caret_slope_rise: 0,
                caret_slope_run: 1,
                caret_offset: 0,
                number_of_long_ver_metrics: num_glyphs,
            };
            let vmtx = Vmtx {
                v_metrics: self
                    .glyphs
                    .iter()
                    .map(|_| VerticalMetric {
                        advance: self.units_per_em,
                        side_bearing: (upem / 10) as i16,
                    })
                    .collect(),
                top_side_bearings: vec![],
            };
            builder.add_table(&vhea).expect("vhea");
            builder.add_table(&vmtx).expect("vmtx");
        }

        for (tag, data) in &self.extra_tables {
            builder.add_raw(*tag, data.clone());
        }

        builder.build()
    }

    fn max_advance(&self) -> u16 {
        self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0)
    }

    fn with_variants(&self, mut cmap: Cmap, name_to_gid: &HashMap<&str, u16>) -> Cmap {
        if self.variants.is_empty() {
            return cmap;
        }
        let sequences: BTreeMap<(u32, u32), VariationGlyph> = self
            .variants
            .iter()
            .map(|(base, selector, glyph)| {
                let glyph = match glyph {
                    Some(name) => VariationGlyph::Glyph(name_to_gid[name.as_str()]),
                    None => VariationGlyph::Default,
                };
                ((*selector, u32::from(*base)), glyph)
            })
            .collect();
        let subtable = variation_subtable(&sequences).expect("cmap14");

        let position = cmap
            .encoding_records
            .iter()
            .position(|r| r.platform_id != PlatformId::Unicode || r.encoding_id > 5)
            .unwrap_or(cmap.encoding_records.len());
        cmap.encoding_records.insert(
            position,
            EncodingRecord::new(PlatformId::Unicode, 5, CmapSubtable::Format14(subtable)),
        );
        cmap
    }

    fn make_glyph(&self, glyph: &TestGlyph, name_to_gid: &HashMap<&str, u16>) -> Glyph {
        if !glyph.components.is_empty() {
            let bbox = Bbox { x_min: 0, y_min: 0, x_max: glyph.advance as i16, y_max: 700 };
            let mut components = glyph.components.iter().map(|(base, dx, dy)| Component {
                glyph: GlyphId16::new(name_to_gid[base.as_str()]),
                anchor: Anchor::Offset { x: *dx, y: *dy },
                flags: ComponentFlags::default(),
                transform: Transform::default(),
            });
            let first = components.next().expect("component");
            let mut composite = CompositeGlyph::new(first, bbox);
            for component in components {
                composite.add_component(component, bbox);
            }
            return Glyph::Composite(composite);
        }

        if glyph.contours.is_empty() {
            return Glyph::Empty;
        }

        let contours: Vec<Contour> = glyph
            .contours
            .iter()
            .map(|points| {
                points
                    .iter()
                    .map(|(x, y, on)| CurvePoint::new(*x, *y, *on))
                    .collect::<Vec<_>>()
                    .into()
            })
            .collect();
        let points = glyph.contours.iter().flatten();
        let bbox = Bbox {
            x_min: points.clone().map(|p| p.0).min().unwrap_or(0),
            y_min: points.clone().map(|p| p.1).min().unwrap_or(0),
            x_max: points.clone().map(|p| p.0).max().unwrap_or(0),
            y_max: points.map(|p| p.1).max().unwrap_or(0),
        };

        Glyph::Simple(SimpleGlyph { bbox, contours, instructions: glyph.instructions.clone() })
    }

    fn make_name(&self) -> Name {
        let records = [
            (1, self.family.clone()),
            (2, "Regular".to_string()),
            (4, format!("{} Regular", self.family)),
            (6, format!("{}-Regular", self.family.replace(' ', ""))),
        ];
        let mut records: Vec<NameRecord> = records
            .into_iter()
            .map(|(id, value)| NameRecord::new(3, 1, 0x409, NameId::new(id), value.into()))
            .collect();
        records.sort();
        Name::new(records)
    }
}

/// OS/2 table with the fields of the given version.
pub fn make_os2(version: u16, ascender: i16, descender: i16) -> Os2 {
    Os2 {
        x_avg_char_width: 500,
        us_weight_class: 400,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: 650,
        y_subscript_y_size: 600,
        y_subscript_x_offset: 0,
        y_subscript_y_offset: 75,
        y_superscript_x_size: 650,
        y_superscript_y_size: 600,
        y_superscript_x_offset: 0,
        y_superscript_y_offset: 350,
        y_strikeout_size: 50,
        y_strikeout_position: 300,
        s_family_class: 0,
        panose_10: [0; 10],
        ul_unicode_range_1: 0,
        ul_unicode_range_2: 0,
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        ach_vend_id: Tag::new(b"NONE"),
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: 0x20,
        us_last_char_index: 0x7E,
        s_typo_ascender: ascender,
        s_typo_descender: descender,
        s_typo_line_gap: 0,
        us_win_ascent: ascender as u16,
        us_win_descent: descender.unsigned_abs(),
        ul_code_page_range_1: (version >= 1).then_some(0),
        ul_code_page_range_2: (version >= 1).then_some(0),
        sx_height: (version >= 2).then_some(500),
        s_cap_height: (version >= 2).then_some(700),
        us_default_char: (version >= 2).then_some(0),
        us_break_char: (version >= 2).then_some(0x20),
        us_max_context: (version >= 2).then_some(0),
        us_lower_optical_point_size: (version >= 5).then_some(0),
        us_upper_optical_point_size: (version >= 5).then_some(0xFFFF),
    }
}

/// Read the first decodable string for a name ID, preferring Windows English.
pub fn name_string(font: &FontRef, name_id: u16) -> Option<String> {
    let name = font.name().ok()?;
    let mut candidates: Vec<_> = name
        .name_record()
        .iter()
        .filter(|r| r.name_id().to_u16() == name_id)
        .collect();
    candidates.sort_by_key(|r| !(r.platform_id() == 3 && r.language_id() == 0x409));

    candidates
        .into_iter()
        .find_map(|r| r.string(name.string_data()).ok().map(|s| s.chars().collect()))
}
