//! PNG export of the canvas.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage, RgbaImage};

use crate::grid::Grid;
use crate::render::Framebuffer;

/// Upper bound on exported pixels (64 Mpx, about 192 MB of RGB).
pub const MAX_EXPORT_PIXELS: u64 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("scale must be at least 1")]
    ZeroScale,
    #[error("export of {width}x{height} pixels exceeds the {max} pixel limit", max = MAX_EXPORT_PIXELS)]
    TooLarge { width: u64, height: u64 },
    #[error("png encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Confirmed grid as an image, `scale` screen pixels per cell.
///
/// # Errors
///
/// Returns [`ExportError::ZeroScale`] when `scale` is zero and
/// [`ExportError::TooLarge`] when the scaled image exceeds
/// [`MAX_EXPORT_PIXELS`].
pub fn grid_image(grid: &Grid, scale: u32) -> Result<RgbImage, ExportError> {
    let (image_width, image_height) = scaled_size(grid, scale)?;
    let cells = grid.cells();
    let width = grid.width() as usize;
    Ok(RgbImage::from_fn(image_width, image_height, |px, py| {
        let color = cells[(py / scale) as usize * width + (px / scale) as usize];
        let (r, g, b) = color.rgb();
        Rgb([r, g, b])
    }))
}

/// Image dimensions for `grid` at `scale`, bounded by [`MAX_EXPORT_PIXELS`].
fn scaled_size(grid: &Grid, scale: u32) -> Result<(u32, u32), ExportError> {
    if scale == 0 {
        return Err(ExportError::ZeroScale);
    }
    let width = u64::from(grid.width()) * u64::from(scale);
    let height = u64::from(grid.height()) * u64::from(scale);
    let too_large = ExportError::TooLarge { width, height };
    if width.saturating_mul(height) > MAX_EXPORT_PIXELS {
        return Err(too_large);
    }
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(too_large),
    }
}

/// Encode the confirmed grid as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError`] on a zero scale or an encoder failure.
pub fn grid_png(grid: &Grid, scale: u32) -> Result<Vec<u8>, ExportError> {
    let image = grid_image(grid, scale)?;
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Write the confirmed grid to a PNG file.
///
/// # Errors
///
/// Returns [`ExportError`] on a zero scale, an encoder failure or an I/O error.
pub fn save_grid_png(grid: &Grid, scale: u32, path: &Path) -> Result<(), ExportError> {
    grid_image(grid, scale)?.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Encode a rendered framebuffer (overlay and preview included) as PNG.
///
/// # Errors
///
/// Returns [`ExportError::Image`] when the encoder fails.
pub fn framebuffer_png(fb: &Framebuffer) -> Result<Vec<u8>, ExportError> {
    let image = RgbaImage::from_raw(fb.width(), fb.height(), fb.as_rgba_bytes()).ok_or_else(|| {
        ExportError::Image(image::ImageError::Parameter(image::error::ParameterError::from_kind(
            image::error::ParameterErrorKind::DimensionMismatch,
        )))
    })?;
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
