mod assets;
mod canvas;
mod description;
mod error;
mod fonts;
mod layout;
mod model;
mod pdf;
mod surface;

pub use assets::{ImageAsset, ImageFormat};
pub use canvas::ReportCanvas;
pub use description::{
    DemographicsDescription, LineDescription, ReportDescription, TableDescription,
    TextDescription, TitleDescription,
};
pub use error::{Error, Result};
pub use model::{
    A4_HEIGHT_PT, A4_WIDTH_PT, Color, FieldSet, FieldValue, FontSize, FooterEntry, FooterImage,
    FooterPosition, FooterSpec, FooterText, HAlign, LineStyle, Margins, PageSetup, Rect,
    TableColumn, TableSpec, TextStyle,
};
pub use surface::{ImageItem, LineItem, Primitive, RegionId, Size, TextItem};

use std::path::{Path, PathBuf};

/// Render a JSON report description file to a PDF at `output`.
pub fn render_description_file(input: &Path, output: &Path) -> Result<PathBuf> {
    let description = ReportDescription::from_path(input)?;
    let mut canvas = ReportCanvas::with_setup(description.page.clone());
    description.render_into(&mut canvas)?;
    canvas.export(output)
}
