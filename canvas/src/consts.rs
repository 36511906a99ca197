//! Shared constants for the canvas crate.

use crate::color::Color;

// ── Canvas ──────────────────────────────────────────────────────

/// Grid width in cells.
pub const WIDTH: u32 = 500;

/// Grid height in cells.
pub const HEIGHT: u32 = 500;

/// Edge length of one cell in screen pixels.
pub const PIXEL_SIZE: u32 = 10;

/// Color of cells the server has never written.
pub const BACKGROUND: Color = Color::WHITE;

// ── Placement ───────────────────────────────────────────────────

/// Minimum interval between two local placements.
pub const PIXEL_COOLDOWN_MS: u64 = 10_000;

/// Opacity of the unconfirmed preview pixel.
pub const PREVIEW_ALPHA: f64 = 0.5;

// ── Overlay ─────────────────────────────────────────────────────

/// Grid-line color.
pub const GRID_LINE: Color = Color::BLACK;

// ── Storage keys ────────────────────────────────────────────────

pub const KEY_LAST_PIXEL_TIME: &str = "last_pixel_time";
pub const KEY_CURRENT_COLOR: &str = "current_color";
pub const KEY_SHOW_GRID: &str = "show_grid";
