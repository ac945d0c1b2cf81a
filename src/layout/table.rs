use crate::error::Result;
use crate::model::{LineStyle, Rect, TableSpec, TextStyle};
use crate::surface::{PageSurface, check_bounds};

// Vertical offsets below the region top
const HEADER_RULE_TOP: f32 = 0.01;
const HEADER_BASELINE: f32 = 0.03;
const HEADER_RULE_BOTTOM: f32 = 0.04;
const FIRST_ROW_BASELINE: f32 = 0.06;
const FIRST_ROW_DIVIDER: f32 = 0.069;
const ROW_STEP: f32 = 0.025;

const CELL_INSET: f32 = 0.015;
const LABEL_INSET: f32 = 0.01;
const TEXT_SIZE: f32 = 8.0;

fn row_baseline(top: f32, row: usize) -> f32 {
    top - FIRST_ROW_BASELINE - row as f32 * ROW_STEP
}

fn row_divider(top: f32, row: usize) -> f32 {
    top - FIRST_ROW_DIVIDER - row as f32 * ROW_STEP
}

pub(crate) fn create_table(
    surface: &mut PageSurface,
    region: Rect,
    spec: &TableSpec,
    row_header: bool,
) -> Result<()> {
    check_bounds(region)?;

    let rh = usize::from(row_header);
    let n_cols = spec.columns().len() + rh;
    let col_width = region.width / n_cols.max(1) as f32;
    let x = region.left;
    let top = region.top();
    log::debug!(
        "table: {} data columns, row_header={row_header}, col_width={col_width:.4}",
        spec.columns().len()
    );

    let rule = LineStyle::default();
    let divider = LineStyle::divider();
    let header_style = TextStyle::sized(TEXT_SIZE).bold();
    let cell_style = TextStyle::sized(TEXT_SIZE);

    surface.place_line(top - HEADER_RULE_TOP, x, region.right(), &rule);
    for (c, column) in spec.columns().iter().enumerate() {
        let cx = x + CELL_INSET + (c + rh) as f32 * col_width;
        surface.place_text(cx, top - HEADER_BASELINE, &column.name, &header_style);
    }
    surface.place_line(top - HEADER_RULE_BOTTOM, x, region.right(), &rule);

    for (c, column) in spec.columns().iter().enumerate() {
        let i = (c + rh) as f32;
        for (r, (label, value)) in column.rows.iter().enumerate() {
            let y = row_baseline(top, r);
            let y_div = row_divider(top, r);
            if c == 0 && row_header {
                surface.place_text(x + LABEL_INSET, y, label, &header_style);
                surface.place_line(y_div, x, x + col_width, &divider);
            }
            surface.place_text(x + CELL_INSET + i * col_width, y, value, &cell_style);
            surface.place_line(
                y_div,
                x + LABEL_INSET + i * col_width,
                x + (i + 1.0) * col_width,
                &divider,
            );
        }
    }

    // Close the grid under the last row of the rightmost column
    if let Some(last) = spec.columns().last()
        && let Some(last_row) = last.rows.len().checked_sub(1)
    {
        let i = (spec.columns().len() - 1 + rh) as f32;
        surface.place_line(
            row_divider(top, last_row),
            x + LABEL_INSET + i * col_width,
            x + (i + 1.0) * col_width,
            &divider,
        );
    }
    Ok(())
}
