use crate::error::Result;
use crate::model::{FieldSet, HAlign, LineStyle, Rect, TextStyle};
use crate::surface::{PageSurface, check_bounds};

const EDGE_PAD: f32 = 0.01;
const LABEL_DROP: f32 = 0.015;
const VALUE_DROP: f32 = 0.03;
const LABEL_SIZE: f32 = 7.0;
const VALUE_SIZE: f32 = 9.0;

/// Left edge of every field. Widths follow the longer of label and value in
/// characters, not the rendered text width.
fn field_offsets(region: Rect, fields: &FieldSet) -> Vec<f32> {
    let lens: Vec<usize> = fields
        .iter()
        .map(|(label, value)| label.chars().count().max(value.chars().count()))
        .collect();
    let total: usize = lens.iter().sum();
    let col_width = if total == 0 {
        0.0
    } else {
        (region.width - 2.0 * EDGE_PAD) / total as f32
    };

    let x0 = region.left + EDGE_PAD;
    let mut consumed = 0usize;
    lens.iter()
        .map(|len| {
            let x = x0 + consumed as f32 * col_width;
            consumed += len;
            x
        })
        .collect()
}

pub(crate) fn set_demographics(
    surface: &mut PageSurface,
    region: Rect,
    fields: &FieldSet,
) -> Result<()> {
    check_bounds(region)?;

    let top = region.top();
    let right = region.right();
    let rule = LineStyle::default();
    surface.place_line(top, region.left, right, &rule);
    surface.place_line(region.bottom, region.left, right, &rule);

    if fields.is_empty() {
        return Ok(());
    }

    let n = fields.len();
    let offsets = field_offsets(region, fields);
    for (i, ((label, value), x)) in fields.iter().zip(offsets).enumerate() {
        // The trailing field is pinned to the right edge
        let (x, align) = if n > 1 && i == n - 1 {
            (right - EDGE_PAD, HAlign::Right)
        } else {
            (x, HAlign::Left)
        };
        log::debug!("demographics field {i} {label:?} at x={x:.4} ({align:?})");
        surface.place_text(x, top - LABEL_DROP, label, &TextStyle::sized(LABEL_SIZE).aligned(align));
        surface.place_text(x, top - VALUE_DROP, value, &TextStyle::sized(VALUE_SIZE).aligned(align));
    }
    Ok(())
}
