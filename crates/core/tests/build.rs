use std::path::Path;

use read_fonts::{FontRef, TableProvider, types::Tag};
use robotonoto_core::{BuildSettings, Dehinter, build, io::read_font, io::write_font};
use robotonoto_font_ops::testing::{TestFont, name_string};
use tempfile::{TempDir, tempdir};

fn roboto() -> Vec<u8> {
    TestFont::new(2048)
        .family("Roboto")
        .square("A", 'A', 1200)
        .square("B", 'B', 1200)
        .table(Tag::new(b"fpgm"), vec![0xB0, 0x00])
        .build()
}

fn noto() -> Vec<u8> {
    TestFont::new(1000)
        .family("Noto Sans JP")
        .square("A", 'A', 600)
        .square("uni3042", 'あ', 1000)
        .build()
}

fn setup(weights: &[&str]) -> (TempDir, BuildSettings) {
    let dir = tempdir().unwrap();
    let source_dir = dir.path().join("source_fonts");
    for weight in weights {
        write_font(source_dir.join(format!("Roboto-{weight}.ttf")), roboto()).unwrap();
        write_font(source_dir.join(format!("NotoSansJP-{weight}.ttf")), noto()).unwrap();
    }

    let settings = BuildSettings {
        source_dir,
        build_dir: dir.path().join("build_tmp"),
        dist_dir: dir.path().join("dist"),
        weights: weights.iter().map(|w| w.to_string()).collect(),
        dehinter: Dehinter::Builtin,
        ..BuildSettings::default()
    };
    (dir, settings)
}

fn read(path: &Path) -> Vec<u8> {
    read_font(path).unwrap()
}

#[test]
fn test_build_regular() {
    let (_dir, settings) = setup(&["Regular"]);
    let outputs = build(&settings).expect("build failed");

    assert_eq!(outputs, vec![settings.dist_dir.join("RobotoNotoJP-Regular.ttf")]);
    assert!(settings.build_dir.join("gen_RobotoNotoJP-Regular.ttf").exists());

    let data = read(&outputs[0]);
    let font = FontRef::new(&data).unwrap();

    assert_eq!(font.head().unwrap().units_per_em(), 2048);
    // Roboto's three glyphs, then .notdef and あ from Noto
    assert_eq!(font.maxp().unwrap().num_glyphs(), 5);

    let cmap = font.cmap().unwrap();
    assert_eq!(cmap.map_codepoint('A').map(|g| g.to_u32()), Some(1));
    assert!(cmap.map_codepoint('あ').is_some());

    let hmtx = font.hmtx().unwrap();
    let kana = cmap.map_codepoint('あ').unwrap();
    assert_eq!(hmtx.advance(kana), Some(2048));

    assert_eq!(font.hhea().unwrap().ascender().to_i16(), 1698);
    assert_eq!(font.os2().unwrap().ach_vend_id(), Tag::new(b"TWR "));
    assert_eq!(name_string(&font, 1).as_deref(), Some("RobotoNotoJP"));
    assert_eq!(name_string(&font, 6).as_deref(), Some("RobotoNotoJP-Regular"));
    assert_eq!(name_string(&font, 5).as_deref(), Some("RobotoNotoJP v0.0.1"));
    assert!(font.table_data(Tag::new(b"fpgm")).is_none(), "hinting removed");
}

#[test]
fn test_build_keep_duplicates() {
    let (_dir, mut settings) = setup(&["Regular"]);
    settings.strip_duplicates = false;

    let outputs = build(&settings).expect("build failed");
    let data = read(&outputs[0]);
    let font = FontRef::new(&data).unwrap();

    assert_eq!(font.maxp().unwrap().num_glyphs(), 6);
    assert_eq!(font.cmap().unwrap().map_codepoint('A').map(|g| g.to_u32()), Some(1));
    assert!(!settings.build_dir.join("stripped_NotoSansJP-Regular.ttf").exists());
}

#[test]
fn test_build_parallel() {
    let (_dir, mut settings) = setup(&["Regular", "Bold"]);
    settings.parallel = true;

    let outputs = build(&settings).expect("build failed");
    assert_eq!(outputs.len(), 2);
    for output in &outputs {
        assert!(output.exists(), "{} missing", output.display());
    }

    let data = read(&settings.dist_dir.join("RobotoNotoJP-Bold.ttf"));
    let font = FontRef::new(&data).unwrap();
    assert_eq!(name_string(&font, 4).as_deref(), Some("RobotoNotoJP Bold"));
}

#[test]
fn test_missing_japanese_source() {
    let (_dir, mut settings) = setup(&["Regular"]);
    settings.weights = vec!["Thin".to_string()];
    write_font(settings.source_dir.join("Roboto-Thin.ttf"), roboto()).unwrap();

    let err = build(&settings).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("convert-cjk"), "{message}");
    assert!(message.contains("NotoSansJP-Thin.ttf"), "{message}");
}

#[test]
fn test_missing_latin_source() {
    let (_dir, mut settings) = setup(&["Regular"]);
    settings.weights = vec!["Thin".to_string()];
    write_font(settings.source_dir.join("NotoSansJP-Thin.ttf"), noto()).unwrap();

    let err = build(&settings).unwrap_err();
    assert!(format!("{err:#}").contains("Roboto-Thin.ttf"));
}
