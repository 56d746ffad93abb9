//! End-to-end tests: image in, palette files and history out.

use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lava_palette::{
    Color, Config, HistoryLog, Palette, PaletteError, PaletteExtractor, PaletteRecord,
    DEFAULT_SCALES, encode_gpl, export, export_base, extract_palette, record_history, sampler,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn two_by_two() -> DynamicImage {
    let mut img = RgbImage::new(2, 2);
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    img.put_pixel(1, 0, Rgb([255, 0, 0]));
    img.put_pixel(0, 1, Rgb([255, 0, 0]));
    img.put_pixel(1, 1, Rgb([0, 0, 255]));
    DynamicImage::ImageRgb8(img)
}

/// Deterministic pseudo-photo with smooth gradients and a few hard blocks.
fn busy_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        if x < width / 4 && y < height / 4 {
            Rgb([20, 180, 60])
        } else {
            Rgb([
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                ((x + y) % 256) as u8,
            ])
        }
    }))
}

#[test]
fn skewed_red_blue_image_yields_both_colors() {
    let palette = extract_palette(&two_by_two(), 2).unwrap();
    let mut hexes = palette.hex_strings();
    hexes.sort();
    assert_eq!(hexes, vec!["#0000ff", "#ff0000"]);
}

#[test]
fn every_allowed_k_gives_k_colors() {
    let image = busy_image(320, 240);
    for k in [2, 3, 7, 16, 24] {
        let palette = extract_palette(&image, k).unwrap();
        assert_eq!(palette.len(), k, "k = {k}");
    }
}

#[test]
fn repeated_extraction_is_identical() {
    let image = busy_image(640, 480);
    let first = extract_palette(&image, 16).unwrap();
    let second = extract_palette(&image, 16).unwrap();
    assert_eq!(first, second);
    assert_eq!(encode_gpl(&first).unwrap(), encode_gpl(&second).unwrap());
}

#[test]
fn seed_is_taken_from_config() {
    let image = busy_image(200, 200);
    let mut config = Config::default();
    config.quantizer.seed = 1234;
    let a = PaletteExtractor::new(config.clone()).unwrap().extract(&image, 12).unwrap();
    let b = PaletteExtractor::new(config).unwrap().extract(&image, 12).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        a.hex_strings(),
        vec![
            "#2ee0d5", "#dc9321", "#e02dd4", "#17b73a", "#af6ee0", "#70aee0", "#602065",
            "#b2dd3a", "#a4239d", "#23a59d", "#6867a3", "#1f6065",
        ]
    );
}

#[test]
fn exported_strips_decode_to_palette_colors() {
    let dir = TempDir::new().unwrap();
    let palette = Palette::new(vec![
        Color::new(255, 0, 0),
        Color::new(12, 34, 56),
        Color::new(0, 0, 255),
        Color::new(250, 250, 250),
    ]);

    let written = export(&palette, &dir.path().join("strip"), &DEFAULT_SCALES).unwrap();
    assert_eq!(written.swatches.len(), DEFAULT_SCALES.len());

    for (scale, path) in &written.swatches {
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("strip_x{scale}.png")
        );
        let strip = image::open(path).unwrap().to_rgb8();
        assert_eq!(strip.dimensions(), (palette.len() as u32 * scale, *scale));
        for (i, c) in palette.iter().enumerate() {
            let center = i as u32 * scale + scale / 2;
            assert_eq!(*strip.get_pixel(center, scale / 2), Rgb([c.red, c.green, c.blue]));
        }
    }
}

#[test]
fn export_writes_gpl_next_to_strips() {
    let dir = TempDir::new().unwrap();
    let palette = Palette::new(vec![Color::new(255, 0, 0)]);
    let base = export_base(&dir.path().join("nested"), Path::new("/photos/lava.jpg"));

    let written = export(&palette, &base, &[2]).unwrap();

    assert_eq!(written.gpl, dir.path().join("nested").join("lava.gpl"));
    assert_eq!(
        std::fs::read_to_string(&written.gpl).unwrap(),
        "GIMP Palette\nName: Exported Palette\nColumns: 0\n#\n255 0 0\t#ff0000\n"
    );
    let png = std::fs::read(&written.swatches[0].1).unwrap();
    assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
}

#[test]
fn export_rejects_bad_input_before_writing() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("nothing");

    let empty = Palette::new(Vec::new());
    assert!(matches!(
        export(&empty, &base, &DEFAULT_SCALES),
        Err(PaletteError::InvalidPalette(_))
    ));

    let one = Palette::new(vec![Color::new(1, 2, 3)]);
    assert!(matches!(
        export(&one, &base, &[8, 0]),
        Err(PaletteError::InvalidScale(0))
    ));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn export_into_unwritable_destination_is_io_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();

    let palette = Palette::new(vec![Color::new(1, 2, 3)]);
    let err = export(&palette, &blocker.join("out"), &[1]).unwrap_err();
    assert!(matches!(err, PaletteError::Io(_)));
}

#[test]
fn full_flow_from_file_to_history() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("input.png");
    two_by_two().save(&source).unwrap();
    let history_path = dir.path().join("history").join("palette_history.json");

    let image = sampler::open(&source).unwrap();
    let palette = extract_palette(&image, 2).unwrap();
    export(&palette, &export_base(dir.path(), &source), &DEFAULT_SCALES).unwrap();
    record_history(&history_path, &source, &palette).unwrap();
    record_history(&history_path, &source, &palette).unwrap();

    let records = HistoryLog::new(&history_path).load();
    let expected = PaletteRecord {
        file: source.display().to_string(),
        colors: palette.hex_strings(),
    };
    assert_eq!(records, vec![expected.clone(), expected]);
    assert!(dir.path().join("input.gpl").exists());
    assert!(dir.path().join("input_x32.png").exists());
}

#[test]
fn undecodable_file_is_invalid_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"\x89PNG but not really").unwrap();
    assert!(matches!(
        sampler::open(&path),
        Err(PaletteError::InvalidImage { .. })
    ));
}
