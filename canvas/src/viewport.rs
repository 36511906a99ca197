//! Screen ↔ cell mapping.
//!
//! The canvas is drawn unscaled at `pixel_size` screen pixels per cell with
//! its origin at the element's top-left corner. Pointer events arrive as
//! screen points relative to that corner.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// A point in screen space (CSS pixels relative to the canvas origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Cell geometry for a `width`×`height` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_size: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32, pixel_size: u32) -> Self {
        Self { width, height, pixel_size: pixel_size.max(1) }
    }

    /// Canvas size in screen pixels, saturating at `u32::MAX`.
    #[must_use]
    pub fn screen_size(&self) -> (u32, u32) {
        (self.width.saturating_mul(self.pixel_size), self.height.saturating_mul(self.pixel_size))
    }

    /// The cell under a screen point, or `None` outside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cell_at(&self, screen: Point) -> Option<(u32, u32)> {
        if !screen.x.is_finite() || !screen.y.is_finite() || screen.x < 0.0 || screen.y < 0.0 {
            return None;
        }
        let size = f64::from(self.pixel_size);
        let x = (screen.x / size).floor();
        let y = (screen.y / size).floor();
        if x >= f64::from(self.width) || y >= f64::from(self.height) {
            return None;
        }
        Some((x as u32, y as u32))
    }

    /// Screen rectangle covered by cell `(x, y)`.
    #[must_use]
    pub fn cell_rect(&self, x: u32, y: u32) -> Rect {
        Rect {
            x: x.saturating_mul(self.pixel_size),
            y: y.saturating_mul(self.pixel_size),
            width: self.pixel_size,
            height: self.pixel_size,
        }
    }
}
