use crate::model::TextStyle;
use crate::surface::PageSurface;

const TITLE_SIZE: f32 = 24.0;
const SUBTITLE_SIZE: f32 = 16.0;
/// Per-character correction for the measured title overshooting its glyphs.
const SUBTITLE_PULLBACK: f32 = 0.005;

pub(crate) fn set_title(surface: &mut PageSurface, y: f32, title: &str, subtitle: Option<&str>) {
    let x = surface.margins().left;
    let title_style = TextStyle::sized(TITLE_SIZE).bold();
    surface.place_text(x, y, title, &title_style);

    let Some(subtitle) = subtitle else {
        return;
    };

    let measured = surface.measure_text(title, &title_style);
    let sub_x = x + measured.width - SUBTITLE_PULLBACK * title.chars().count() as f32;
    log::debug!(
        "title {title:?}: width={:.4} → subtitle at x={sub_x:.4}",
        measured.width
    );
    surface.place_text(sub_x, y, subtitle, &TextStyle::sized(SUBTITLE_SIZE));
}
