//! Alert composites: the current radar reading as a greyscale stretch with
//! changed pixels painted red on top.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use crate::error::{Result, WatchError};
use crate::raster::{Mask, Raster};

const RED: [f32; 3] = [255.0, 0.0, 0.0];

/// Render `background` with `mask` blended over it at `opacity` (0..=1).
/// No-data background pixels are black.
pub fn render_composite(background: &Raster, mask: &Mask, opacity: f32) -> Result<RgbaImage> {
    let (height, width) = background.shape();
    if mask.shape() != (height, width) {
        return Err(WatchError::DetectionCompute(format!(
            "mask {:?} does not match background {:?}",
            mask.shape(),
            (height, width)
        )));
    }
    let alpha = opacity.clamp(0.0, 1.0);
    let (lo, hi) = background.valid_range().unwrap_or((0.0, 0.0));
    let span = hi - lo;

    let mut img = RgbaImage::new(width as u32, height as u32);
    for row in 0..height {
        for col in 0..width {
            let grey = match background.get(row, col) {
                Some(v) if !v.is_nan() => {
                    if span > 0.0 {
                        (v - lo) / span * 255.0
                    } else {
                        128.0
                    }
                }
                _ => 0.0,
            };
            let px = if mask.get(row, col) == Some(true) {
                let blend = |c: f32| (grey * (1.0 - alpha) + c * alpha).round() as u8;
                Rgba([blend(RED[0]), blend(RED[1]), blend(RED[2]), 255])
            } else {
                let g = grey.round() as u8;
                Rgba([g, g, g, 255])
            };
            img.put_pixel(col as u32, row as u32, px);
        }
    }
    Ok(img)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    Ok(buf)
}
