#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use report_canvas::{LineItem, ReportCanvas, TextItem};

pub const EPS: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

/// Output directory: tests/output/<case>/
pub fn output_dir(case: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(case);
    fs::create_dir_all(&dir).expect("create output dir");
    dir
}

/// Write a solid PNG fixture of the given pixel size.
pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    img.save(path).expect("write PNG fixture");
}

pub fn texts(canvas: &ReportCanvas) -> Vec<TextItem> {
    canvas
        .primitives()
        .expect("canvas open")
        .iter()
        .filter_map(|p| p.as_text().cloned())
        .collect()
}

pub fn lines(canvas: &ReportCanvas) -> Vec<LineItem> {
    canvas
        .primitives()
        .expect("canvas open")
        .iter()
        .filter_map(|p| p.as_line().cloned())
        .collect()
}

pub fn text_named<'a>(items: &'a [TextItem], text: &str) -> &'a TextItem {
    items
        .iter()
        .find(|t| t.text == text)
        .unwrap_or_else(|| panic!("no text item {text:?}"))
}

/// Parse the first `/MediaBox [x0 y0 x1 y1]` of a PDF into (width, height).
pub fn media_box(pdf: &[u8]) -> Option<(f32, f32)> {
    let text = String::from_utf8_lossy(pdf);
    let start = text.find("/MediaBox [")? + "/MediaBox [".len();
    let end = start + text[start..].find(']')?;
    let nums: Vec<f32> = text[start..end]
        .split_whitespace()
        .filter_map(|s| s.parse().ok())
        .collect();
    if nums.len() == 4 {
        Some((nums[2] - nums[0], nums[3] - nums[1]))
    } else {
        None
    }
}

/// Count occurrences of `needle` in a PDF byte stream.
pub fn count(pdf: &[u8], needle: &str) -> usize {
    pdf.windows(needle.len())
        .filter(|w| *w == needle.as_bytes())
        .count()
}
