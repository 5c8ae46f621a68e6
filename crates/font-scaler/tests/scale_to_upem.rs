use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::Glyph,
    types::{GlyphId, Tag},
};
use robotonoto_font_ops::testing::{TestFont, TestGlyph};
use robotonoto_font_scaler::{ScaleError, scale_to_upem};

fn source() -> Vec<u8> {
    TestFont::new(1000)
        .square("A", 'A', 600)
        .composite("Aacute", Some('Á'), 600, &[("A", 10, 20)])
        .vertical()
        .build()
}

#[test]
fn test_scale_outlines_and_metrics() {
    let scaled = scale_to_upem(&source(), 2048).expect("scale failed");
    let font = FontRef::new(&scaled).unwrap();

    let head = font.head().unwrap();
    assert_eq!(head.units_per_em(), 2048);
    assert_eq!(head.y_max(), 1638);

    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    let Some(Glyph::Simple(square)) = loca.get_glyf(GlyphId::new(1), &glyf).unwrap() else {
        panic!("expected simple glyph");
    };
    assert_eq!(square.x_min(), 102);
    assert_eq!(square.x_max(), 1126);
    assert_eq!(square.y_max(), 1434);

    let Some(Glyph::Composite(composite)) = loca.get_glyf(GlyphId::new(2), &glyf).unwrap() else {
        panic!("expected composite glyph");
    };
    let component = composite.components().next().unwrap();
    assert!(matches!(
        component.anchor,
        read_fonts::tables::glyf::Anchor::Offset { x: 20, y: 41 }
    ));

    let hmtx = font.hmtx().unwrap();
    assert_eq!(hmtx.advance(GlyphId::new(1)), Some(1229));
    assert_eq!(hmtx.side_bearing(GlyphId::new(1)), Some(102));

    let hhea = font.hhea().unwrap();
    assert_eq!(hhea.ascender().to_i16(), 1638);
    assert_eq!(hhea.descender().to_i16(), -410);

    let os2 = font.os2().unwrap();
    assert_eq!(os2.s_typo_ascender(), 1638);
    assert_eq!(os2.s_typo_descender(), -410);
    assert_eq!(os2.us_win_ascent(), 1638);
    assert_eq!(os2.sx_height(), Some(1024));

    let post = font.post().unwrap();
    assert_eq!(post.underline_position().to_i16(), -205);

    let vhea = font.vhea().unwrap();
    assert_eq!(vhea.ascender().to_i16(), 1024);
    let vmtx = font.vmtx().unwrap();
    assert_eq!(vmtx.v_metrics()[0].advance.get(), 2048);
}

#[test]
fn test_same_upem_is_unchanged() {
    let data = source();
    assert_eq!(scale_to_upem(&data, 1000).unwrap(), data);
}

#[test]
fn test_unscaled_tables_dropped() {
    let data = TestFont::new(1000)
        .glyph(TestGlyph::square("A", Some('A'), 600).with_instructions(vec![0xb0, 0x01]))
        .table(Tag::new(b"GPOS"), vec![0, 1, 0, 0])
        .table(Tag::new(b"fpgm"), vec![0xb0, 0x00])
        .table(Tag::new(b"GSUB"), vec![0, 1, 0, 0])
        .build();
    let scaled = scale_to_upem(&data, 2048).unwrap();
    let font = FontRef::new(&scaled).unwrap();

    assert!(font.table_data(Tag::new(b"GPOS")).is_none());
    assert!(font.table_data(Tag::new(b"fpgm")).is_none());
    assert!(font.table_data(Tag::new(b"GSUB")).is_some());
    assert!(font.cmap().unwrap().map_codepoint('A').is_some());

    let glyf = font.glyf().unwrap();
    let loca = font.loca(None).unwrap();
    let Some(Glyph::Simple(glyph)) = loca.get_glyf(GlyphId::new(1), &glyf).unwrap() else {
        panic!("expected simple glyph");
    };
    assert!(glyph.instructions().is_empty());
}

#[test]
fn test_cff_rejected() {
    let data = TestFont::new(1000).table(Tag::new(b"CFF "), vec![1, 0, 4, 4]).build();
    assert!(matches!(scale_to_upem(&data, 2048), Err(ScaleError::CffNotSupported)));
}

#[test]
fn test_zero_target_rejected() {
    assert!(matches!(scale_to_upem(&source(), 0), Err(ScaleError::ZeroTarget)));
}

#[test]
fn test_overflow_reported() {
    let data = TestFont::new(1000).square("W", 'W', 30000).build();
    assert!(matches!(
        scale_to_upem(&data, 2048),
        Err(ScaleError::Overflow { table: "head", .. })
    ));
}

#[test]
fn test_glyph_overflow_reported() {
    let data = TestFont::new(1000)
        .glyph(TestGlyph {
            contours: vec![vec![(0, 0, true), (0, 20_000, true), (500, 20_000, true)]],
            ..TestGlyph::square("tall", Some('T'), 600)
        })
        .build();
    assert!(matches!(
        scale_to_upem(&data, 2048),
        Err(ScaleError::GlyphOverflow { gid: 1, .. })
    ));
}
