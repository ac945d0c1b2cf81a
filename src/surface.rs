use crate::assets::ImageAsset;
use crate::error::{Error, Result};
use crate::fonts::FontSet;
use crate::model::{Color, HAlign, LineStyle, Margins, PageSetup, Rect, TextStyle};

/// Handle to a region allocated on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

impl RegionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Extent in normalized page units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Text anchored at `(x, y)`: `x` is interpreted through `align`, `y` is the
/// baseline of the last line.
#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    pub x: f32,
    pub y: f32,
    pub text: String,
    /// Resolved size in points.
    pub font_size: f32,
    pub bold: bool,
    pub color: Color,
    pub align: HAlign,
    pub line_spacing: f32,
}

impl TextItem {
    pub(crate) fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub(crate) fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// Baseline-to-baseline distance in points.
    pub(crate) fn line_pitch(&self) -> f32 {
        self.font_size * self.line_spacing
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub y: f32,
    pub x_start: f32,
    pub x_end: f32,
    pub style: LineStyle,
}

#[derive(Clone, Debug)]
pub struct ImageItem {
    pub region: RegionId,
    pub rect: Rect,
    pub asset: ImageAsset,
}

/// One recorded drawing operation, in normalized page coordinates.
#[derive(Clone, Debug)]
pub enum Primitive {
    Text(TextItem),
    Line(LineItem),
    Image(ImageItem),
}

impl Primitive {
    pub fn as_text(&self) -> Option<&TextItem> {
        match self {
            Primitive::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineItem> {
        match self {
            Primitive::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageItem> {
        match self {
            Primitive::Image(i) => Some(i),
            _ => None,
        }
    }
}

pub(crate) fn check_bounds(rect: Rect) -> Result<()> {
    if rect.fits_page() {
        Ok(())
    } else {
        Err(Error::LayoutViolation { rect })
    }
}

/// The page: setup, fonts, allocated regions and the display list drawn so far.
pub(crate) struct PageSurface {
    setup: PageSetup,
    fonts: FontSet,
    regions: Vec<Rect>,
    items: Vec<Primitive>,
}

impl PageSurface {
    pub(crate) fn new(setup: PageSetup) -> Self {
        let fonts = FontSet::resolve(setup.font_family.as_deref());
        Self {
            setup,
            fonts,
            regions: Vec::new(),
            items: Vec::new(),
        }
    }

    pub(crate) fn setup(&self) -> &PageSetup {
        &self.setup
    }

    pub(crate) fn margins(&self) -> Margins {
        self.setup.margins
    }

    pub(crate) fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub(crate) fn items(&self) -> &[Primitive] {
        &self.items
    }

    pub(crate) fn add_region(&mut self, rect: Rect) -> Result<RegionId> {
        check_bounds(rect)?;
        let id = RegionId(self.regions.len());
        log::debug!(
            "region #{}: [{:.3}, {:.3}, {:.3}, {:.3}]",
            id.0,
            rect.left,
            rect.bottom,
            rect.width,
            rect.height
        );
        self.regions.push(rect);
        Ok(id)
    }

    pub(crate) fn region(&self, id: RegionId) -> Result<Rect> {
        self.regions
            .get(id.0)
            .copied()
            .ok_or(Error::UnknownRegion(id.0))
    }

    pub(crate) fn place_text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) {
        self.items.push(Primitive::Text(TextItem {
            x,
            y,
            text: text.to_string(),
            font_size: style.size.points(),
            bold: style.bold,
            color: style.color,
            align: style.align,
            line_spacing: style.line_spacing,
        }));
    }

    pub(crate) fn place_line(&mut self, y: f32, x_start: f32, x_end: f32, style: &LineStyle) {
        self.items.push(Primitive::Line(LineItem {
            y,
            x_start,
            x_end,
            style: *style,
        }));
    }

    pub(crate) fn place_image(&mut self, region: RegionId, asset: ImageAsset) -> Result<()> {
        let rect = self.region(region)?;
        self.items.push(Primitive::Image(ImageItem {
            region,
            rect,
            asset,
        }));
        Ok(())
    }

    /// Advance width of a single line in points.
    pub(crate) fn line_width_pt(&self, line: &str, font_size: f32, bold: bool) -> f32 {
        self.fonts.face(bold).text_width(line, font_size)
    }

    /// Bounding box of `text` rendered with `style`, in normalized page units.
    /// Width is the widest line; height spans the stacked lines from the top
    /// ascender to the bottom descender.
    pub(crate) fn measure_text(&self, text: &str, style: &TextStyle) -> Size {
        let font_size = style.size.points();
        let face = self.fonts.face(style.bold);
        let width_pt = text
            .split('\n')
            .map(|line| face.text_width(line, font_size))
            .fold(0.0f32, f32::max);
        let n_lines = text.split('\n').count();
        let glyph_h = font_size * (face.ascender_ratio() - face.descender_ratio());
        let height_pt = (n_lines - 1) as f32 * font_size * style.line_spacing + glyph_h;
        Size {
            width: width_pt / self.setup.page_width,
            height: height_pt / self.setup.page_height,
        }
    }
}
