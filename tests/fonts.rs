mod common;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use common::{count, output_dir};
use report_canvas::{PageSetup, ReportCanvas, TextStyle};

/// Directories searched for a TrueType fixture.
const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

fn family_name(face: &ttf_parser::Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::FAMILY && n.is_unicode())
        .find_map(|n| n.to_string())
}

/// First upright, regular `.ttf` face with Latin glyphs under `dir`.
fn find_regular_ttf(dir: &Path) -> Option<(PathBuf, String)> {
    let mut stack = vec![dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let is_ttf = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("ttf"));
            if !is_ttf {
                continue;
            }
            let Ok(data) = std::fs::read(&path) else {
                continue;
            };
            let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
                continue;
            };
            if face.is_bold() || face.is_italic() || face.glyph_index('A').is_none() {
                continue;
            }
            if let Some(family) = family_name(&face) {
                return Some((path, family));
            }
        }
    }
    None
}

/// Copy a system TrueType face into a private directory and point
/// `REPORT_CANVAS_FONTS` at it. Returns the family name, or `None` when the
/// machine has no usable font.
fn truetype_family() -> Option<&'static str> {
    static FAMILY: OnceLock<Option<String>> = OnceLock::new();
    FAMILY
        .get_or_init(|| {
            let (source, family) = SYSTEM_FONT_DIRS
                .iter()
                .find_map(|dir| find_regular_ttf(Path::new(dir)))?;
            let dir = output_dir("fonts_truetype").join("fonts");
            std::fs::create_dir_all(&dir).expect("create font dir");
            std::fs::copy(&source, dir.join("fixture.ttf")).expect("copy font fixture");
            // Set before any canvas scans font directories
            unsafe { std::env::set_var("REPORT_CANVAS_FONTS", &dir) };
            Some(family)
        })
        .as_deref()
}

#[test]
fn truetype_family_is_subset_and_embedded() {
    let Some(family) = truetype_family() else {
        eprintln!("no TrueType font available, skipping");
        return;
    };
    let setup = PageSetup {
        font_family: Some(family.to_string()),
        ..PageSetup::default()
    };
    let mut canvas = ReportCanvas::with_setup(setup);
    canvas
        .place_text(0.1, 0.5, "Embedded text", &TextStyle::sized(12.0))
        .unwrap();
    let width = canvas
        .measure_text("Embedded text", &TextStyle::sized(12.0))
        .unwrap()
        .width;
    assert!(width > 0.0);

    let dir = output_dir("fonts_truetype");
    let bytes = std::fs::read(canvas.export(dir.join("truetype.pdf")).unwrap()).unwrap();
    assert!(count(&bytes, "/FontFile2") >= 1, "{family} not embedded");
    assert!(count(&bytes, "/Identity-H") >= 1);
    assert!(count(&bytes, "/ToUnicode") >= 1);
    assert!(count(&bytes, "/CIDFontType2") >= 1);
}

#[test]
fn unknown_family_falls_back_to_helvetica() {
    // Keep the font directory setup ordered before any scan in this binary
    let _ = truetype_family();

    let setup = PageSetup {
        font_family: Some("No Such Family 7f3a".into()),
        ..PageSetup::default()
    };
    let mut canvas = ReportCanvas::with_setup(setup);
    let style = TextStyle::sized(10.0);
    let fallback_width = canvas.measure_text("Helvetica metrics", &style).unwrap().width;
    let builtin_width = ReportCanvas::new()
        .measure_text("Helvetica metrics", &style)
        .unwrap()
        .width;
    assert_eq!(fallback_width, builtin_width);

    canvas.place_text(0.1, 0.5, "Helvetica metrics", &style).unwrap();
    let dir = output_dir("fonts_unknown_family");
    let bytes = std::fs::read(canvas.export(dir.join("fallback.pdf")).unwrap()).unwrap();
    assert_eq!(count(&bytes, "/BaseFont /Helvetica"), 2); // regular and bold
    assert_eq!(count(&bytes, "/FontFile2"), 0);
}
