use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::Error;

/// A4 portrait, 8.27 x 11.69 inches.
pub const A4_WIDTH_PT: f32 = 8.27 * 72.0;
pub const A4_HEIGHT_PT: f32 = 11.69 * 72.0;

/// Points per unit for the named font sizes.
const BASE_FONT_SIZE: f32 = 10.0;

/// Absorbs float rounding in `left + width` style sums.
const BOUNDS_TOLERANCE: f32 = 1e-6;

/// A rectangle in normalized page coordinates: `[left, bottom, width, height]`,
/// origin at the bottom-left corner of the page.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f32; 4]")]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }

    /// True when the rectangle stays within the right and top page edges.
    pub fn fits_page(&self) -> bool {
        self.right() <= 1.0 + BOUNDS_TOLERANCE && self.top() <= 1.0 + BOUNDS_TOLERANCE
    }

    /// Split into `n` equal side-by-side columns.
    pub fn columns(&self, n: usize) -> Vec<Rect> {
        let n = n.max(1);
        let col_width = self.width / n as f32;
        (0..n)
            .map(|i| Rect::new(self.left + i as f32 * col_width, self.bottom, col_width, self.height))
            .collect()
    }

    /// Map a point given relative to this rectangle (0–1 on both axes) to page coordinates.
    pub fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        (self.left + x * self.width, self.bottom + y * self.height)
    }
}

impl From<[f32; 4]> for Rect {
    fn from([left, bottom, width, height]: [f32; 4]) -> Self {
        Rect::new(left, bottom, width, height)
    }
}

/// Page margins as fractions of the page dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.075,
            right: 0.075,
            bottom: 0.05,
            left: 0.075,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    /// Page width in points.
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    pub margins: Margins,
    /// Font family looked up in the system font directories; Helvetica when unset.
    pub font_family: Option<String>,
    /// Written to the PDF document info dictionary.
    pub title: Option<String>,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margins: Margins::default(),
            font_family: None,
            title: None,
        }
    }
}

/// RGB color with components in 0–1.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(from = "[f32; 3]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<[f32; 3]> for Color {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A font size in points or one of the relative size keywords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawFontSize")]
pub enum FontSize {
    Points(f32),
    XxSmall,
    XSmall,
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
    XxLarge,
    Smaller,
    Larger,
}

impl FontSize {
    pub fn points(self) -> f32 {
        let scale = match self {
            FontSize::Points(pt) => return pt,
            FontSize::XxSmall => 0.579,
            FontSize::XSmall => 0.694,
            FontSize::Small | FontSize::Smaller => 0.833,
            FontSize::Medium => 1.0,
            FontSize::Large | FontSize::Larger => 1.2,
            FontSize::XLarge => 1.44,
            FontSize::XxLarge => 1.728,
        };
        BASE_FONT_SIZE * scale
    }
}

impl From<f32> for FontSize {
    fn from(pt: f32) -> Self {
        FontSize::Points(pt)
    }
}

impl FromStr for FontSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "xx-small" => FontSize::XxSmall,
            "x-small" => FontSize::XSmall,
            "small" => FontSize::Small,
            "medium" => FontSize::Medium,
            "large" => FontSize::Large,
            "x-large" => FontSize::XLarge,
            "xx-large" => FontSize::XxLarge,
            "smaller" => FontSize::Smaller,
            "larger" => FontSize::Larger,
            other => match other.parse::<f32>() {
                Ok(pt) => FontSize::Points(pt),
                Err(_) => return Err(Error::InvalidSpec(format!("unknown font size {other:?}"))),
            },
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFontSize {
    Points(f32),
    Keyword(String),
}

impl TryFrom<RawFontSize> for FontSize {
    type Error = Error;

    fn try_from(raw: RawFontSize) -> Result<Self, Self::Error> {
        match raw {
            RawFontSize::Points(pt) => Ok(FontSize::Points(pt)),
            RawFontSize::Keyword(s) => s.parse(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    #[serde(alias = "fontsize")]
    pub size: FontSize,
    pub bold: bool,
    pub color: Color,
    #[serde(alias = "ha")]
    pub align: HAlign,
    #[serde(alias = "linespacing")]
    pub line_spacing: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: FontSize::Medium,
            bold: false,
            color: Color::BLACK,
            align: HAlign::Left,
            line_spacing: 1.2,
        }
    }
}

impl TextStyle {
    pub fn sized(size: impl Into<FontSize>) -> Self {
        Self {
            size: size.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn aligned(mut self, align: HAlign) -> Self {
        self.align = align;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f32) -> Self {
        self.line_spacing = line_spacing;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    pub color: Color,
    /// Stroke width in points.
    #[serde(alias = "linewidth")]
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

impl LineStyle {
    /// Light-gray row divider used by tables.
    pub fn divider() -> Self {
        Self {
            color: Color::gray(0.9),
            width: 1.0,
        }
    }
}

/// A label, header or cell value. Rendered the way Python's `str()` renders
/// it, so field widths count the same characters: `70.0` stays `"70.0"`,
/// `true` is `"True"` and null is `"None"`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null(()),
}

/// Python `repr(float)`: shortest round-trip digits, `.0` on whole numbers,
/// scientific notation outside `1e-4 <= |v| < 1e16`.
fn python_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{v:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::UInt(u) => write!(f, "{u}"),
            FieldValue::Float(v) => f.write_str(&python_float(*v)),
            FieldValue::Bool(true) => f.write_str("True"),
            FieldValue::Bool(false) => f.write_str("False"),
            FieldValue::Null(()) => f.write_str("None"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Str(s.clone())
    }
}

macro_rules! field_value_from {
    ($variant:ident: $($ty:ty),+) => {
        $(impl From<$ty> for FieldValue {
            fn from(v: $ty) -> Self {
                FieldValue::$variant(v.into())
            }
        })+
    };
}

field_value_from!(Int: i8, i16, i32, i64, u8, u16, u32);
field_value_from!(UInt: u64);
field_value_from!(Float: f64);
field_value_from!(Bool: bool);

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::UInt(v as u64)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        // Shortest f32 digits, so 0.1f32 reads as 0.1 rather than its f64 widening
        FieldValue::Float(v.to_string().parse().unwrap_or(f64::from(v)))
    }
}

/// Collects `key: scalar` pairs from a JSON object in document order.
struct OrderedPairs;

impl<'de> Visitor<'de> for OrderedPairs {
    type Value = Vec<(String, String)>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of label/value pairs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, FieldValue>()? {
            pairs.push((key, value.to_string()));
        }
        Ok(pairs)
    }
}

/// Ordered label/value pairs rendered left to right by the demographics strip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<(String, String)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(label, value);
        self
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((label.into(), value.into().to_string()));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (label, value) in iter {
            set.push(label, value);
        }
        set
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = deserializer.deserialize_map(OrderedPairs)?;
        Ok(FieldSet { fields })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableColumn {
    pub name: String,
    /// Row label → cell value, in row order.
    pub rows: Vec<(String, String)>,
}

/// Column-major table: each column carries its own ordered row mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableSpec {
    columns: Vec<TableColumn>,
}

impl TableSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column<L, V>(mut self, name: impl Into<String>, rows: impl IntoIterator<Item = (L, V)>) -> Self
    where
        L: Into<String>,
        V: Into<FieldValue>,
    {
        self.columns.push(TableColumn {
            name: name.into(),
            rows: rows
                .into_iter()
                .map(|(label, value)| (label.into(), value.into().to_string()))
                .collect(),
        });
        self
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

struct OrderedColumns;

impl<'de> Visitor<'de> for OrderedColumns {
    type Value = Vec<TableColumn>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping column names to row objects")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut columns = Vec::new();
        while let Some(name) = map.next_key::<String>()? {
            let FieldSet { fields } = map.next_value::<FieldSet>()?;
            columns.push(TableColumn { name, rows: fields });
        }
        Ok(columns)
    }
}

impl<'de> Deserialize<'de> for TableSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let columns = deserializer.deserialize_map(OrderedColumns)?;
        Ok(TableSpec { columns })
    }
}

/// Footer zones, ordered left to right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterPosition {
    Left,
    Center,
    Right,
}

impl FooterPosition {
    pub const ALL: [FooterPosition; 3] = [
        FooterPosition::Left,
        FooterPosition::Center,
        FooterPosition::Right,
    ];

    pub fn align(self) -> HAlign {
        match self {
            FooterPosition::Left => HAlign::Left,
            FooterPosition::Center => HAlign::Center,
            FooterPosition::Right => HAlign::Right,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FooterText {
    pub content: String,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default, alias = "fontsize")]
    pub font_size: Option<FontSize>,
    #[serde(default, alias = "linespacing")]
    pub line_spacing: Option<f32>,
}

impl FooterText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FooterImage {
    #[serde(rename = "src", alias = "source")]
    pub source: PathBuf,
    /// Target height as a fraction of the page height.
    #[serde(default)]
    pub height: Option<f32>,
}

impl FooterImage {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            height: None,
        }
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FooterEntry {
    Text(FooterText),
    #[serde(rename = "img", alias = "image")]
    Image(FooterImage),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FooterSpec {
    entries: BTreeMap<FooterPosition, FooterEntry>,
}

impl FooterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, position: FooterPosition, entry: FooterEntry) -> Self {
        self.entries.insert(position, entry);
        self
    }

    pub fn get(&self, position: FooterPosition) -> Option<&FooterEntry> {
        self.entries.get(&position)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut FooterEntry> {
        self.entries.values_mut()
    }
}
