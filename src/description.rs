//! JSON description of a whole report, applied to a canvas in one call.
//!
//! ```json
//! {
//!   "page": { "title": "Lab results" },
//!   "title": { "y": 0.9, "title": "Report", "subtitle": "Q3" },
//!   "demographics": [{ "region": [0.075, 0.82, 0.85, 0.05],
//!                      "fields": { "Name": "Jane Doe", "Date": "2024-05-01" } }],
//!   "tables": [{ "region": [0.075, 0.5, 0.85, 0.3],
//!                "data": { "2023": { "Visits": 12 }, "2024": { "Visits": 15 } } }],
//!   "footer": { "left": { "type": "text", "content": "Dept. of Medicine" },
//!               "right": { "type": "img", "src": "logo.png" } }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::canvas::ReportCanvas;
use crate::error::{Error, Result};
use crate::model::{FieldSet, FooterEntry, FooterSpec, LineStyle, PageSetup, Rect, TableSpec, TextStyle};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TitleDescription {
    pub y: f32,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextDescription {
    pub x: f32,
    pub y: f32,
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineDescription {
    pub y: f32,
    #[serde(alias = "xmin")]
    pub x_start: f32,
    #[serde(alias = "xmax")]
    pub x_end: f32,
    #[serde(default)]
    pub style: LineStyle,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemographicsDescription {
    /// `[left, bottom, width, height]`; the strip hangs from `bottom + height`.
    pub region: Rect,
    #[serde(default)]
    pub fields: FieldSet,
}

fn default_row_header() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDescription {
    /// `[left, bottom, width, height]`; rows run down from `bottom + height`.
    pub region: Rect,
    pub data: TableSpec,
    #[serde(default = "default_row_header", alias = "rowheader")]
    pub row_header: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportDescription {
    pub page: PageSetup,
    pub title: Option<TitleDescription>,
    pub demographics: Vec<DemographicsDescription>,
    pub tables: Vec<TableDescription>,
    pub texts: Vec<TextDescription>,
    pub lines: Vec<LineDescription>,
    pub footer: Option<FooterSpec>,
    /// Footer baseline; the bottom margin when absent.
    pub footer_y: Option<f32>,
}

impl ReportDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSpec(e.to_string()))
    }

    /// Parse a description file. Relative footer image paths resolve against
    /// the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
        })?;
        let mut description = Self::from_json(&json)?;
        if let (Some(base), Some(footer)) = (path.parent(), description.footer.as_mut()) {
            for entry in footer.entries_mut() {
                if let FooterEntry::Image(image) = entry
                    && image.source.is_relative()
                    && !image.source.as_os_str().is_empty()
                {
                    image.source = base.join(&image.source);
                }
            }
        }
        Ok(description)
    }

    /// Draw every described element onto `canvas`. Stops at the first error,
    /// leaving whatever was already drawn in place.
    pub fn render_into(&self, canvas: &mut ReportCanvas) -> Result<()> {
        if let Some(title) = &self.title {
            canvas.set_title(title.y, &title.title, title.subtitle.as_deref())?;
        }
        for strip in &self.demographics {
            canvas.set_demographics(strip.region, &strip.fields)?;
        }
        for table in &self.tables {
            canvas.create_table(table.region, &table.data, table.row_header)?;
        }
        for text in &self.texts {
            canvas.place_text(text.x, text.y, &text.text, &text.style)?;
        }
        for line in &self.lines {
            canvas.place_line(line.y, line.x_start, line.x_end, &line.style)?;
        }
        if let Some(footer) = &self.footer {
            canvas.set_footer(footer, self.footer_y)?;
        }
        Ok(())
    }
}
