use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// An image file read into memory, with its native pixel size.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    pub(crate) data: Vec<u8>,
    pub format: ImageFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub source: PathBuf,
}

impl ImageAsset {
    /// Read and probe an image. Absent, unreadable or undecodable files all
    /// surface as `MissingAsset` naming the path.
    pub fn load(path: &Path) -> Result<Self> {
        let missing = |reason: String| Error::MissingAsset {
            path: path.to_path_buf(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| missing(e.to_string()))?;

        let format = match image::guess_format(&data) {
            Ok(image::ImageFormat::Jpeg) => ImageFormat::Jpeg,
            Ok(image::ImageFormat::Png) => ImageFormat::Png,
            Ok(other) => return Err(missing(format!("unsupported image format {other:?}"))),
            Err(e) => return Err(missing(e.to_string())),
        };

        let (pixel_width, pixel_height) = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .map_err(|e| missing(e.to_string()))?
            .into_dimensions()
            .map_err(|e| missing(e.to_string()))?;

        if pixel_width == 0 || pixel_height == 0 {
            return Err(missing("image has no pixels".into()));
        }

        log::debug!(
            "Loaded {} ({:?}, {}x{} px, {} bytes)",
            path.display(),
            format,
            pixel_width,
            pixel_height,
            data.len()
        );

        Ok(Self {
            data,
            format,
            pixel_width,
            pixel_height,
            source: path.to_path_buf(),
        })
    }

    /// Native width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.pixel_width as f32 / self.pixel_height as f32
    }
}
