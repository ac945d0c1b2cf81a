mod images;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Result;
use crate::fonts::{FontEntry, FontFace, register_font};
use crate::model::{Color, HAlign};
use crate::surface::{ImageItem, LineItem, PageSurface, Primitive, TextItem};

use images::embed_image;

/// Page geometry in points, used to map normalized coordinates.
#[derive(Clone, Copy)]
struct PageBox {
    width: f32,
    height: f32,
}

impl PageBox {
    fn x(&self, nx: f32) -> f32 {
        nx * self.width
    }

    fn y(&self, ny: f32) -> f32 {
        ny * self.height
    }
}

fn set_fill(content: &mut Content, c: Color) {
    content.set_fill_rgb(c.r, c.g, c.b);
}

/// The fonts written for one variant (regular or bold).
struct VariantFonts<'a> {
    face: &'a FontFace,
    primary: FontEntry,
    fallback: Option<FontEntry>,
}

/// Split `line` into runs `face` draws itself (`false`) and runs it cannot
/// encode (`true`).
fn font_runs<'a>(line: &'a str, face: &FontFace) -> Vec<(&'a str, bool)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (i, ch) in line.char_indices() {
        let uncovered = !face.covers(ch);
        match current {
            Some(prev) if prev != uncovered => {
                runs.push((&line[start..i], prev));
                start = i;
                current = Some(uncovered);
            }
            Some(_) => {}
            None => current = Some(uncovered),
        }
    }
    if let Some(prev) = current {
        runs.push((&line[start..], prev));
    }
    runs
}

fn draw_text(
    content: &mut Content,
    item: &TextItem,
    surface: &PageSurface,
    fonts: &VariantFonts,
    page: PageBox,
) {
    let n_lines = item.line_count();
    let anchor_x = page.x(item.x);
    let last_baseline = page.y(item.y);

    content.begin_text();
    set_fill(content, item.color);
    for (k, line) in item.lines().enumerate() {
        let width = surface.line_width_pt(line, item.font_size, item.bold);
        let x = match item.align {
            HAlign::Left => anchor_x,
            HAlign::Center => anchor_x - width / 2.0,
            HAlign::Right => anchor_x - width,
        };
        // y anchors the last line; earlier lines stack upward
        let y = last_baseline + (n_lines - 1 - k) as f32 * item.line_pitch();
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        for (run, uncovered) in font_runs(line, fonts.face) {
            let font = match (&fonts.fallback, uncovered) {
                (Some(fallback), true) => fallback,
                _ => &fonts.primary,
            };
            content.set_font(Name(font.pdf_name.as_bytes()), item.font_size);
            content.show(Str(&font.encode(run)));
        }
    }
    content.end_text();
}

fn draw_line(content: &mut Content, line: &LineItem, page: PageBox) {
    let c = line.style.color;
    let y = page.y(line.y);
    content.save_state();
    content.set_line_width(line.style.width);
    content.set_stroke_rgb(c.r, c.g, c.b);
    content.move_to(page.x(line.x_start), y);
    content.line_to(page.x(line.x_end), y);
    content.stroke();
    content.restore_state();
}

/// Largest box with the given aspect ratio centered inside `(x, y, w, h)`.
fn fit_centered(x: f32, y: f32, w: f32, h: f32, aspect: f32) -> [f32; 4] {
    if w / h > aspect {
        let fitted_w = h * aspect;
        [x + (w - fitted_w) / 2.0, y, fitted_w, h]
    } else {
        let fitted_h = w / aspect;
        [x, y + (h - fitted_h) / 2.0, w, fitted_h]
    }
}

fn draw_image(content: &mut Content, item: &ImageItem, pdf_name: &str, page: PageBox) {
    let r = item.rect;
    let [x, y, w, h] = fit_centered(
        page.x(r.left),
        page.y(r.bottom),
        page.x(r.width),
        page.y(r.height),
        item.asset.aspect_ratio(),
    );
    content.save_state();
    content.transform([w, 0.0, 0.0, h, x, y]);
    content.x_object(Name(pdf_name.as_bytes()));
    content.restore_state();
}

/// Render the display list of `surface` as a single-page PDF.
pub(crate) fn render(surface: &PageSurface) -> Result<Vec<u8>> {
    let t0 = Instant::now();
    let setup = surface.setup();
    let page = PageBox {
        width: setup.page_width,
        height: setup.page_height,
    };

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let page_id = alloc();
    let content_id = alloc();

    // Phase 1: fonts, subset to the characters drawn with each variant
    let mut used_chars: [HashSet<char>; 2] = Default::default();
    for item in surface.items().iter().filter_map(Primitive::as_text) {
        used_chars[usize::from(item.bold)].extend(item.text.chars().filter(|&c| c != '\n'));
    }
    let fonts: [VariantFonts; 2] = [false, true].map(|bold| {
        let idx = usize::from(bold);
        let face = surface.fonts().face(bold);
        let primary = register_font(
            &mut pdf,
            face,
            format!("F{}", idx + 1),
            &mut alloc,
            &used_chars[idx],
        );
        let uncovered: HashSet<char> = used_chars[idx]
            .iter()
            .copied()
            .filter(|&c| !face.covers(c))
            .collect();
        let fallback = if uncovered.is_empty() {
            None
        } else if let Some(fallback_face) = face.fallback() {
            Some(register_font(
                &mut pdf,
                fallback_face,
                format!("F{}", idx + 3),
                &mut alloc,
                &uncovered,
            ))
        } else {
            let mut dropped: Vec<char> = uncovered.into_iter().collect();
            dropped.sort_unstable();
            log::warn!(
                "{} cannot encode {dropped:?} and no fallback face was found; these characters are dropped",
                face.name()
            );
            None
        };
        VariantFonts {
            face,
            primary,
            fallback,
        }
    });
    let t_fonts = t0.elapsed();

    // Phase 2: draw in recording order on a white page
    let mut content = Content::new();
    content.save_state();
    set_fill(&mut content, Color::WHITE);
    content.rect(0.0, 0.0, page.width, page.height);
    content.fill_nonzero();
    content.restore_state();

    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();
    let mut embedded: HashMap<&Path, String> = HashMap::new();
    let (mut n_text, mut n_lines, mut n_images) = (0usize, 0usize, 0usize);
    for item in surface.items() {
        match item {
            Primitive::Text(text) => {
                draw_text(&mut content, text, surface, &fonts[usize::from(text.bold)], page);
                n_text += 1;
            }
            Primitive::Line(line) => {
                draw_line(&mut content, line, page);
                n_lines += 1;
            }
            Primitive::Image(img) => {
                let source = img.asset.source.as_path();
                let name = match embedded.get(source) {
                    Some(name) => name.clone(),
                    None => {
                        let name =
                            embed_image(&img.asset, &mut image_xobjects, &mut pdf, &mut alloc)?;
                        embedded.insert(source, name.clone());
                        name
                    }
                };
                draw_image(&mut content, img, &name, page);
                n_images += 1;
            }
        }
    }
    let t_draw = t0.elapsed();

    // Phase 3: assemble the page tree
    let raw = content.finish();
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
    pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);

    {
        let mut pdf_page = pdf.page(page_id);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, page.width, page.height))
            .parent(pages_id)
            .contents(content_id);
        let mut resources = pdf_page.resources();
        {
            let mut font_dict = resources.fonts();
            for entry in fonts
                .iter()
                .flat_map(|variant| std::iter::once(&variant.primary).chain(&variant.fallback))
            {
                font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
            }
        }
        if !image_xobjects.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
    }

    let info_id = alloc();
    let mut info = pdf.document_info(info_id);
    info.producer(TextStr(concat!("report-canvas ", env!("CARGO_PKG_VERSION"))));
    if let Some(title) = &setup.title {
        info.title(TextStr(title));
    }
    drop(info);

    log::info!(
        "Render phases: fonts={:.1}ms, draw={:.1}ms ({} text, {} lines, {} images), assembly={:.1}ms",
        t_fonts.as_secs_f64() * 1000.0,
        (t_draw - t_fonts).as_secs_f64() * 1000.0,
        n_text,
        n_lines,
        n_images,
        (t0.elapsed() - t_draw).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_split_where_helvetica_cannot_encode() {
        let face = FontFace::builtin(false);
        assert_eq!(
            font_runs("\u{141}\u{f3}d\u{17a}", &face),
            [("\u{141}", true), ("\u{f3}d", false), ("\u{17a}", true)]
        );
        assert_eq!(font_runs("Report", &face), [("Report", false)]);
        assert!(font_runs("", &face).is_empty());
    }

    #[test]
    fn fit_centered_letterboxes_wide_frames() {
        let [x, y, w, h] = fit_centered(0.0, 0.0, 200.0, 50.0, 2.0);
        assert_eq!([w, h], [100.0, 50.0]);
        assert_eq!([x, y], [50.0, 0.0]);
    }

    #[test]
    fn fit_centered_pillarboxes_tall_frames() {
        let [x, y, w, h] = fit_centered(10.0, 10.0, 40.0, 100.0, 2.0);
        assert_eq!([w, h], [40.0, 20.0]);
        assert_eq!([x, y], [10.0, 50.0]);
    }
}
