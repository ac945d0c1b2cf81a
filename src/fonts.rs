use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

/// Helvetica advance widths (1000 units/em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths (1000 units/em) for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const HELVETICA_ASCENDER: f32 = 0.718;
const HELVETICA_DESCENDER: f32 = -0.207;

/// Advance used for characters no available face can draw.
const UNMAPPED_WIDTH_1000: f32 = 556.0;

/// System faces tried, in order, for characters WinAnsi cannot encode.
const FALLBACK_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Noto Sans",
    "Liberation Sans",
    "Arial Unicode MS",
    "Arial",
    "Helvetica",
];

enum FontSource {
    Builtin,
    TrueType {
        family: String,
        data: Vec<u8>,
        face_index: u32,
    },
}

/// One resolved font variant: the metrics used for measurement plus what is
/// needed to embed it at export time.
pub(crate) struct FontFace {
    source: FontSource,
    bold: bool,
    /// WinAnsi widths for bytes 32..=255 in 1000-units.
    widths_1000: Vec<f32>,
    ascender_ratio: f32,
    descender_ratio: f32,
    /// Resolved on first use; only built-in faces have one.
    fallback: OnceLock<Option<Box<FontFace>>>,
}

impl FontFace {
    pub(crate) fn builtin(bold: bool) -> Self {
        let table = if bold {
            &HELVETICA_BOLD_WIDTHS
        } else {
            &HELVETICA_WIDTHS
        };
        let widths_1000 = (32u8..=255u8)
            .map(|b| match b {
                32..=126 => table[(b - 32) as usize] as f32,
                // Latin-1 letters are close to the lowercase average
                _ => 556.0,
            })
            .collect();
        Self {
            source: FontSource::Builtin,
            bold,
            widths_1000,
            ascender_ratio: HELVETICA_ASCENDER,
            descender_ratio: HELVETICA_DESCENDER,
            fallback: OnceLock::new(),
        }
    }

    fn truetype(family: &str, data: Vec<u8>, face_index: u32, bold: bool) -> Option<Self> {
        let face = Face::parse(&data, face_index).ok()?;
        let units = face.units_per_em() as f32;
        let widths_1000 = (32u8..=255u8)
            .map(|byte| {
                face.glyph_index(winansi_to_char(byte))
                    .and_then(|gid| face.glyph_hor_advance(gid))
                    .map(|adv| adv as f32 / units * 1000.0)
                    .unwrap_or(0.0)
            })
            .collect();
        let ascender_ratio = face.ascender() as f32 / units;
        let descender_ratio = face.descender() as f32 / units;
        Some(Self {
            source: FontSource::TrueType {
                family: family.to_string(),
                data,
                face_index,
            },
            bold,
            widths_1000,
            ascender_ratio,
            descender_ratio,
            fallback: OnceLock::from(None),
        })
    }

    /// Whether this face draws `ch` itself. TrueType faces cover everything;
    /// missing glyphs render as `.notdef`.
    pub(crate) fn covers(&self, ch: char) -> bool {
        match self.source {
            FontSource::Builtin => char_to_winansi(ch) != 0,
            FontSource::TrueType { .. } => true,
        }
    }

    /// System face drawing the characters a built-in face cannot encode.
    pub(crate) fn fallback(&self) -> Option<&FontFace> {
        self.fallback
            .get_or_init(|| find_fallback_face(self.bold).map(Box::new))
            .as_deref()
    }

    pub(crate) fn name(&self) -> &str {
        match &self.source {
            FontSource::Builtin if self.bold => "Helvetica-Bold",
            FontSource::Builtin => "Helvetica",
            FontSource::TrueType { family, .. } => family,
        }
    }

    /// Width of a single character in 1000-units. Characters outside WinAnsi
    /// are looked up in the face directly, or in the fallback face for
    /// Helvetica.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            return self.widths_1000[(byte - 32) as usize];
        }
        match &self.source {
            FontSource::TrueType {
                data, face_index, ..
            } => Face::parse(data, *face_index)
                .ok()
                .and_then(|face| {
                    let units = face.units_per_em() as f32;
                    face.glyph_index(ch)
                        .and_then(|gid| face.glyph_hor_advance(gid))
                        .map(|adv| adv as f32 / units * 1000.0)
                })
                .unwrap_or(0.0),
            FontSource::Builtin => self
                .fallback()
                .map(|face| face.char_width_1000(ch))
                .filter(|&w| w > 0.0)
                .unwrap_or(UNMAPPED_WIDTH_1000),
        }
    }

    /// Advance width of `text` in points.
    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn ascender_ratio(&self) -> f32 {
        self.ascender_ratio
    }

    pub(crate) fn descender_ratio(&self) -> f32 {
        self.descender_ratio
    }
}

/// The regular and bold variants used by a canvas.
pub(crate) struct FontSet {
    regular: FontFace,
    bold: FontFace,
}

impl FontSet {
    pub(crate) fn builtin() -> Self {
        Self {
            regular: FontFace::builtin(false),
            bold: FontFace::builtin(true),
        }
    }

    /// Resolve `family` against the system font directories, falling back to
    /// Helvetica per variant when a face cannot be found.
    pub(crate) fn resolve(family: Option<&str>) -> Self {
        let Some(family) = family else {
            return Self::builtin();
        };
        let load = |bold: bool| {
            find_font_file(family, bold)
                .and_then(|(path, face_index)| {
                    let data = std::fs::read(&path).ok()?;
                    FontFace::truetype(family, data, face_index, bold)
                })
                .unwrap_or_else(|| {
                    log::warn!("Font not found: {family} bold={bold}, using Helvetica");
                    FontFace::builtin(bold)
                })
        };
        Self {
            regular: load(false),
            bold: load(true),
        }
    }

    pub(crate) fn face(&self, bold: bool) -> &FontFace {
        if bold { &self.bold } else { &self.regular }
    }
}

/// (lowercase family name, bold) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("REPORT_CANVAS_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &std::path::Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut files_scanned = 0u32;
    let mut visited: HashSet<PathBuf> = HashSet::new();

    let mut stack = font_directories();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            files_scanned += 1;
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
            for face_idx in 0..face_count {
                let Ok(face) = Face::parse(&data, face_idx) else {
                    continue;
                };
                // Italic faces never back a report variant
                if face.is_italic() {
                    continue;
                }
                if let Some(family) = font_family_name(&face) {
                    index
                        .entry((family.to_lowercase(), face.is_bold()))
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed → {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_scanned,
        index.len(),
    );

    index
}

fn find_font_file(family: &str, bold: bool) -> Option<(PathBuf, u32)> {
    let index = FONT_INDEX.get_or_init(scan_font_dirs);
    index.get(&(family.to_lowercase(), bold)).cloned()
}

fn find_fallback_face(bold: bool) -> Option<FontFace> {
    let face = FALLBACK_FAMILIES.iter().find_map(|family| {
        let (path, face_index) = find_font_file(family, bold)?;
        let data = std::fs::read(&path).ok()?;
        FontFace::truetype(family, data, face_index, bold)
    });
    match &face {
        Some(face) => log::debug!("fallback face for bold={bold}: {}", face.name()),
        None => log::warn!("No fallback face found for bold={bold}; non-WinAnsi text will not render"),
    }
    face
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their Unicode codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi bytes for PDF Str encoding, dropping
/// characters the encoding cannot represent.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// A font written into the PDF, keyed by its resource name.
pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    pub(crate) char_to_gid: Option<HashMap<char, u16>>,
}

impl FontEntry {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

fn identity_system_info() -> pdf_writer::types::SystemInfo<'static> {
    pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    }
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding,
/// subset to the characters drawn on the page.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font_name: &str,
    font_data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<HashMap<char, u16>> {
    let face = Face::parse(font_data, face_index).ok()?;

    let units = face.units_per_em() as f32;
    let to_1000 = |v: f32| v / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| to_1000(h as f32))
        .unwrap_or(700.0);
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        to_1000(bb.x_min as f32),
        to_1000(bb.y_min as f32),
        to_1000(bb.x_max as f32),
        to_1000(bb.y_max as f32),
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| to_1000(adv as f32))
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(font_data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {font_name}: {e}, embedding full font");
        font_data.to_vec()
    });

    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();

    let data_len = i32::try_from(subset_data.len()).ok()?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font_name.replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(to_1000(face.ascender() as f32))
        .descent(to_1000(face.descender() as f32))
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(identity_system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{}-UTF16", ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), identity_system_info());
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}

pub(crate) fn register_font(
    pdf: &mut Pdf,
    face: &FontFace,
    pdf_name: String,
    alloc: &mut impl FnMut() -> Ref,
    used_chars: &HashSet<char>,
) -> FontEntry {
    let t0 = std::time::Instant::now();
    let font_ref = alloc();

    let char_to_gid = match &face.source {
        FontSource::TrueType {
            family,
            data,
            face_index,
        } => {
            let mut chars = used_chars.clone();
            chars.insert(' ');
            let embedded = embed_truetype(pdf, font_ref, family, data, *face_index, &chars, alloc);
            if embedded.is_none() {
                log::warn!("Embedding {family} failed, writing Helvetica instead");
            }
            embedded
        }
        FontSource::Builtin => None,
    };

    if char_to_gid.is_none() {
        let base = if face.bold {
            Name(b"Helvetica-Bold")
        } else {
            Name(b"Helvetica")
        };
        pdf.type1_font(font_ref)
            .base_font(base)
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    log::debug!(
        "register_font: {} bold={} as {pdf_name} → {:.1}ms",
        face.name(),
        face.bold,
        t0.elapsed().as_secs_f64() * 1000.0,
    );

    FontEntry {
        pdf_name,
        font_ref,
        char_to_gid,
    }
}
