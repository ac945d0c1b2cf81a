use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::assets::ImageAsset;
use crate::error::{Error, Result};
use crate::layout;
use crate::model::{FieldSet, FooterSpec, LineStyle, PageSetup, Rect, TableSpec, TextStyle};
use crate::pdf;
use crate::surface::{PageSurface, Primitive, RegionId, Size};

/// A single report page. Content calls draw onto the page in order; `export`
/// writes the PDF and closes the canvas.
pub struct ReportCanvas {
    surface: Option<PageSurface>,
}

impl Default for ReportCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCanvas {
    /// A4 portrait with the default margins and Helvetica.
    pub fn new() -> Self {
        Self::with_setup(PageSetup::default())
    }

    pub fn with_setup(setup: PageSetup) -> Self {
        Self {
            surface: Some(PageSurface::new(setup)),
        }
    }

    fn surface(&self) -> Result<&PageSurface> {
        self.surface.as_ref().ok_or(Error::Closed)
    }

    fn surface_mut(&mut self) -> Result<&mut PageSurface> {
        self.surface.as_mut().ok_or(Error::Closed)
    }

    pub fn setup(&self) -> Result<&PageSetup> {
        Ok(self.surface()?.setup())
    }

    /// Everything drawn so far, in drawing order.
    pub fn primitives(&self) -> Result<&[Primitive]> {
        Ok(self.surface()?.items())
    }

    pub fn add_region(&mut self, rect: Rect) -> Result<RegionId> {
        self.surface_mut()?.add_region(rect)
    }

    /// Allocate `ncols` equal-width regions side by side across `rect`.
    pub fn add_regions(&mut self, rect: Rect, ncols: usize) -> Result<Vec<RegionId>> {
        let surface = self.surface_mut()?;
        crate::surface::check_bounds(rect)?;
        rect.columns(ncols)
            .into_iter()
            .map(|col| surface.add_region(col))
            .collect()
    }

    pub fn region_rect(&self, region: RegionId) -> Result<Rect> {
        self.surface()?.region(region)
    }

    pub fn place_text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) -> Result<()> {
        self.surface_mut()?.place_text(x, y, text, style);
        Ok(())
    }

    pub fn place_line(&mut self, y: f32, x_start: f32, x_end: f32, style: &LineStyle) -> Result<()> {
        self.surface_mut()?.place_line(y, x_start, x_end, style);
        Ok(())
    }

    /// Text at a position relative to `region` (0–1 across the region).
    pub fn region_text(
        &mut self,
        region: RegionId,
        x: f32,
        y: f32,
        text: &str,
        style: &TextStyle,
    ) -> Result<()> {
        let surface = self.surface_mut()?;
        let (px, py) = surface.region(region)?.to_page(x, y);
        surface.place_text(px, py, text, style);
        Ok(())
    }

    /// Horizontal line relative to `region`.
    pub fn region_line(
        &mut self,
        region: RegionId,
        y: f32,
        x_start: f32,
        x_end: f32,
        style: &LineStyle,
    ) -> Result<()> {
        let surface = self.surface_mut()?;
        let rect = surface.region(region)?;
        let (x0, py) = rect.to_page(x_start, y);
        let (x1, _) = rect.to_page(x_end, y);
        surface.place_line(py, x0, x1, style);
        Ok(())
    }

    /// Draw the image at `path` inside `region`, aspect preserved.
    pub fn region_image(&mut self, region: RegionId, path: impl AsRef<Path>) -> Result<()> {
        let surface = self.surface_mut()?;
        surface.region(region)?;
        let asset = ImageAsset::load(path.as_ref())?;
        surface.place_image(region, asset)
    }

    pub fn measure_text(&self, text: &str, style: &TextStyle) -> Result<Size> {
        Ok(self.surface()?.measure_text(text, style))
    }

    /// Bold title at the left margin, optionally followed by a subtitle placed
    /// after the title's measured width.
    pub fn set_title(&mut self, y: f32, title: &str, subtitle: Option<&str>) -> Result<()> {
        layout::set_title(self.surface_mut()?, y, title, subtitle);
        Ok(())
    }

    pub fn set_demographics(&mut self, region: Rect, fields: &FieldSet) -> Result<()> {
        layout::set_demographics(self.surface_mut()?, region, fields)
    }

    /// Equal-width grid below the top edge of `region`; the region height is
    /// not used, rows run as far as the data goes.
    pub fn create_table(&mut self, region: Rect, spec: &TableSpec, row_header: bool) -> Result<()> {
        layout::create_table(self.surface_mut()?, region, spec, row_header)
    }

    /// Footer zones at `y`, defaulting to the bottom margin.
    pub fn set_footer(&mut self, spec: &FooterSpec, y: Option<f32>) -> Result<()> {
        layout::set_footer(self.surface_mut()?, spec, y)
    }

    /// Write the page to `path` as PDF and close the canvas. Any later call,
    /// including a second export, fails with [`Error::Closed`].
    pub fn export(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let t0 = Instant::now();
        let path = path.as_ref();

        let bytes = pdf::render(self.surface()?)?;
        let t_render = t0.elapsed();

        std::fs::write(path, &bytes).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        self.surface = None;

        log::info!(
            "Timing: render={:.1}ms, write={:.1}ms (output {} bytes to {})",
            t_render.as_secs_f64() * 1000.0,
            (t0.elapsed() - t_render).as_secs_f64() * 1000.0,
            bytes.len(),
            path.display(),
        );

        Ok(path.to_path_buf())
    }
}
