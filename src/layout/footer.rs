use crate::assets::ImageAsset;
use crate::error::{Error, Result};
use crate::model::{
    Color, FontSize, FooterEntry, FooterImage, FooterPosition, FooterSpec, FooterText, Margins,
    Rect, TextStyle,
};
use crate::surface::PageSurface;

const DEFAULT_FONT_SIZE: FontSize = FontSize::XSmall;
const DEFAULT_LINE_SPACING: f32 = 1.5;
/// Default image height is this fraction of the space between footer and top margin.
const IMAGE_HEIGHT_FRACTION: f32 = 1.0 / 15.0;
/// Images sit slightly below the footer baseline.
const IMAGE_DROP: f32 = 0.008;

fn text_anchor(position: FooterPosition, margins: Margins) -> f32 {
    match position {
        FooterPosition::Left => margins.left,
        FooterPosition::Center => 0.5,
        FooterPosition::Right => 1.0 - margins.right,
    }
}

fn image_left(position: FooterPosition, width: f32, margins: Margins) -> f32 {
    match position {
        FooterPosition::Left => margins.left,
        FooterPosition::Center => 0.5 - width / 2.0,
        FooterPosition::Right => 1.0 - margins.right - width,
    }
}

fn place_text(surface: &mut PageSurface, position: FooterPosition, text: &FooterText, y: f32) {
    let style = TextStyle {
        size: text.font_size.unwrap_or(DEFAULT_FONT_SIZE),
        bold: false,
        color: text.color.unwrap_or(Color::BLACK),
        align: position.align(),
        line_spacing: text.line_spacing.unwrap_or(DEFAULT_LINE_SPACING),
    };
    let x = text_anchor(position, surface.margins());
    surface.place_text(x, y, &text.content, &style);
}

fn place_image(
    surface: &mut PageSurface,
    position: FooterPosition,
    image: &FooterImage,
    y: f32,
) -> Result<()> {
    if image.source.as_os_str().is_empty() {
        return Err(Error::InvalidSpec(format!(
            "footer image at {position:?} has no source"
        )));
    }
    let asset = ImageAsset::load(&image.source)?;

    let margins = surface.margins();
    let height = image
        .height
        .unwrap_or((1.0 - margins.top - y) * IMAGE_HEIGHT_FRACTION);
    let width = height * asset.aspect_ratio();
    let rect = Rect::new(image_left(position, width, margins), y - IMAGE_DROP, width, height);
    log::debug!(
        "footer image {} at {position:?}: {width:.4}x{height:.4}",
        image.source.display()
    );

    let region = surface.add_region(rect)?;
    surface.place_image(region, asset)
}

pub(crate) fn set_footer(surface: &mut PageSurface, spec: &FooterSpec, y: Option<f32>) -> Result<()> {
    let y = y.unwrap_or(surface.margins().bottom);
    for position in FooterPosition::ALL {
        match spec.get(position) {
            Some(FooterEntry::Text(text)) => place_text(surface, position, text, y),
            Some(FooterEntry::Image(image)) => place_image(surface, position, image, y)?,
            None => {}
        }
    }
    Ok(())
}
