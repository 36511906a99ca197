//! Rendering: draws grid cells, the grid overlay and the preview pixel.
//!
//! This module is the only place that produces pixels. It receives read-only
//! views of the grid and overlay state and writes through a [`Surface`], so
//! the same drawing code targets the browser canvas (`Canvas2dSurface`,
//! feature `web`) and the in-memory [`Framebuffer`].
//!
//! Drawing a cell always repaints it in layer order: confirmed color (opaque),
//! then the grid outline, then the preview when it sits on that cell. Erasing
//! a preview is therefore just redrawing its cell.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::color::Color;
use crate::consts::{GRID_LINE, PREVIEW_ALPHA};
use crate::grid::{Grid, PixelUpdate};
use crate::viewport::{Rect, Viewport};

/// Minimal 2D drawing target.
pub trait Surface {
    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Fill `rect` with `color` at `alpha` (1.0 = opaque), source-over.
    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64);

    /// Draw a one-pixel outline just inside `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color);
}

/// Client-local layers drawn above the confirmed grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlay {
    pub show_grid: bool,
    pub preview: Option<PixelUpdate>,
}

/// Repaint the whole canvas.
pub fn draw_full(surface: &mut impl Surface, grid: &Grid, viewport: &Viewport, overlay: &Overlay) {
    surface.clear();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            draw_confirmed(surface, grid, viewport, overlay, x, y);
        }
    }
    if let Some(preview) = overlay.preview {
        draw_preview(surface, viewport, &preview);
    }
}

/// Repaint a single cell, including the preview if it sits there.
pub fn draw_cell(surface: &mut impl Surface, grid: &Grid, viewport: &Viewport, overlay: &Overlay, x: u32, y: u32) {
    if !grid.contains(x, y) {
        return;
    }
    draw_confirmed(surface, grid, viewport, overlay, x, y);
    if let Some(preview) = overlay.preview.filter(|p| p.x == x && p.y == y) {
        draw_preview(surface, viewport, &preview);
    }
}

fn draw_confirmed(surface: &mut impl Surface, grid: &Grid, viewport: &Viewport, overlay: &Overlay, x: u32, y: u32) {
    let Some(color) = grid.get(x, y) else {
        return;
    };
    let rect = viewport.cell_rect(x, y);
    surface.fill_rect(rect, color, 1.0);
    if overlay.show_grid {
        surface.stroke_rect(rect, GRID_LINE);
    }
}

fn draw_preview(surface: &mut impl Surface, viewport: &Viewport, preview: &PixelUpdate) {
    surface.fill_rect(viewport.cell_rect(preview.x, preview.y), preview.color, PREVIEW_ALPHA);
}

// =============================================================
// In-memory surface
// =============================================================

/// RGBA pixel buffer at screen resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Framebuffer {
    /// Transparent buffer of `width`×`height` screen pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![[0; 4]; width as usize * height as usize] }
    }

    /// Buffer sized for `viewport`.
    #[must_use]
    pub fn for_viewport(viewport: &Viewport) -> Self {
        let (w, h) = viewport.screen_size();
        Self::new(w, h)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA at a screen pixel, `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// RGBA at the center of a cell.
    #[must_use]
    pub fn cell_center(&self, viewport: &Viewport, x: u32, y: u32) -> Option<[u8; 4]> {
        let rect = viewport.cell_rect(x, y);
        self.pixel(rect.x + rect.width / 2, rect.y + rect.height / 2)
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = rgba;
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f64) {
        let Some(dst) = self.pixel(x, y) else {
            return;
        };
        self.put(x, y, source_over(dst, color, alpha));
    }
}

impl Surface for Framebuffer {
    fn clear(&mut self) {
        self.pixels.fill([0; 4]);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64) {
        for y in rect.y..rect.y.saturating_add(rect.height) {
            for x in rect.x..rect.x.saturating_add(rect.width) {
                self.blend(x, y, color, alpha);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let (r, g, b) = color.rgb();
        let rgba = [r, g, b, 255];
        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;
        for x in rect.x..=right {
            self.put(x, rect.y, rgba);
            self.put(x, bottom, rgba);
        }
        for y in rect.y..=bottom {
            self.put(rect.x, y, rgba);
            self.put(right, y, rgba);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn source_over(dst: [u8; 4], color: Color, alpha: f64) -> [u8; 4] {
    let src_a = alpha.clamp(0.0, 1.0);
    let dst_a = f64::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return [0; 4];
    }
    let (r, g, b) = color.rgb();
    let mix = |src: u8, dst: u8| -> u8 {
        let v = (f64::from(src) * src_a + f64::from(dst) * dst_a * (1.0 - src_a)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    [mix(r, dst[0]), mix(g, dst[1]), mix(b, dst[2]), (out_a * 255.0).round() as u8]
}

// =============================================================
// Browser surface
// =============================================================

/// Surface over a `<canvas>` 2D context.
#[cfg(feature = "web")]
pub struct Canvas2dSurface {
    ctx: web_sys::CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

#[cfg(feature = "web")]
impl Canvas2dSurface {
    /// Bind to the canvas element's 2D context.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the element has no 2D context.
    pub fn from_canvas(canvas: &web_sys::HtmlCanvasElement) -> Result<Self, wasm_bindgen::JsValue> {
        use wasm_bindgen::JsCast;

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| wasm_bindgen::JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .map_err(wasm_bindgen::JsValue::from)?;
        Ok(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }
}

#[cfg(feature = "web")]
impl Surface for Canvas2dSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, alpha: f64) {
        if alpha >= 1.0 {
            self.ctx.set_fill_style_str(&color.to_hex());
        } else {
            self.ctx.set_fill_style_str(&color.to_css_rgba(alpha));
        }
        self.ctx.fill_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_hex());
        self.ctx.set_line_width(1.0);
        self.ctx.stroke_rect(
            f64::from(rect.x) + 0.5,
            f64::from(rect.y) + 0.5,
            f64::from(rect.width) - 1.0,
            f64::from(rect.height) - 1.0,
        );
    }
}
