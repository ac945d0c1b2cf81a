use std::io::Cursor;

use image::ImageDecoder;
use pdf_writer::{Filter, Pdf, Ref};

use crate::assets::{ImageAsset, ImageFormat};
use crate::error::{Error, Result};

/// Write `asset` as an image XObject and return its resource name.
/// Interpolation is disabled so scaled-up logos keep hard pixel edges.
pub(super) fn embed_image(
    asset: &ImageAsset,
    image_xobjects: &mut Vec<(String, Ref)>,
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<String> {
    let undecodable = |reason: String| Error::MissingAsset {
        path: asset.source.clone(),
        reason,
    };

    let xobj_ref = alloc();
    let pdf_name = format!("Im{}", image_xobjects.len() + 1);

    match asset.format {
        ImageFormat::Jpeg => {
            let grayscale = image::codecs::jpeg::JpegDecoder::new(Cursor::new(&asset.data))
                .map(|d| d.color_type() == image::ColorType::L8)
                .map_err(|e| undecodable(e.to_string()))?;
            let mut xobj = pdf.image_xobject(xobj_ref, &asset.data);
            xobj.filter(Filter::DctDecode);
            xobj.width(asset.pixel_width as i32);
            xobj.height(asset.pixel_height as i32);
            if grayscale {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
            xobj.interpolate(false);
        }
        ImageFormat::Png => {
            let decoded = image::load_from_memory_with_format(&asset.data, image::ImageFormat::Png)
                .map_err(|e| undecodable(e.to_string()))?;
            let rgba = decoded.to_rgba8();
            let (w, h) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

            let rgb_data: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

            let smask_ref = if has_alpha {
                let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w as i32);
                mask.height(h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask.interpolate(false);
                Some(mask_ref)
            } else {
                None
            };

            let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            xobj.interpolate(false);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }

    log::debug!(
        "embedded {} as {pdf_name} ({}x{} px)",
        asset.source.display(),
        asset.pixel_width,
        asset.pixel_height
    );
    image_xobjects.push((pdf_name.clone(), xobj_ref));
    Ok(pdf_name)
}
