//! Pixel grid: the W×H row-major color matrix and single-cell updates.
//!
//! The grid is the only authoritative visual state the client holds. It is
//! created filled with a background color, replaced wholesale by snapshots and
//! mutated one cell at a time by updates. Its length is fixed at `W*H` for its
//! whole life; every mutation path validates coordinates or length first.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Color;

/// Errors raised by grid mutations and snapshot decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A pixel coordinate falls outside the grid.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} canvas")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    /// A snapshot does not contain exactly `width * height` cells.
    #[error("snapshot has {actual} cells, expected {expected}")]
    SnapshotLength { expected: usize, actual: usize },
    /// A snapshot payload is not an array of colors.
    #[error("malformed snapshot: {0}")]
    SnapshotFormat(String),
}

/// A single pixel write, either placed locally or confirmed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelUpdate {
    pub x: u32,
    pub y: u32,
    pub color: Color,
}

impl PixelUpdate {
    #[must_use]
    pub fn new(x: u32, y: u32, color: Color) -> Self {
        Self { x, y, color }
    }

    /// Whether this update targets the same cell as `other`.
    #[must_use]
    pub fn same_cell(&self, other: &PixelUpdate) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Fixed-size row-major color matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Color>,
}

impl Grid {
    /// Create a grid with every cell set to `fill`.
    #[must_use]
    pub fn filled(width: u32, height: u32, fill: Color) -> Self {
        Self { width, height, cells: vec![fill; cell_count(width, height)] }
    }

    /// Build a grid from row-major cells, rejecting the wrong length.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SnapshotLength`] when `cells.len() != width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Color>) -> Result<Self, GridError> {
        let expected = cell_count(width, height);
        if cells.len() != expected {
            return Err(GridError::SnapshotLength { expected, actual: cells.len() });
        }
        Ok(Self { width, height, cells })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major cells.
    #[must_use]
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Color at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        match self.index(x, y) {
            Ok(i) => Some(self.cells[i]),
            Err(_) => None,
        }
    }

    /// Write one cell. Always assigns, even if the value is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn set(&mut self, x: u32, y: u32, color: Color) -> Result<(), GridError> {
        let i = self.index(x, y)?;
        self.cells[i] = color;
        Ok(())
    }

    /// Apply a [`PixelUpdate`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn apply(&mut self, update: &PixelUpdate) -> Result<(), GridError> {
        self.set(update.x, update.y, update.color)
    }

    /// Check an update's coordinates without applying it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] for coordinates outside the grid.
    pub fn check(&self, update: &PixelUpdate) -> Result<(), GridError> {
        self.index(update.x, update.y).map(|_| ())
    }

    /// Replace every cell from a row-major snapshot. The grid is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::SnapshotLength`] when the snapshot has the wrong size.
    pub fn replace(&mut self, cells: Vec<Color>) -> Result<(), GridError> {
        let expected = self.cells.len();
        if cells.len() != expected {
            return Err(GridError::SnapshotLength { expected, actual: cells.len() });
        }
        self.cells = cells;
        Ok(())
    }
}

fn cell_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Decode a snapshot payload into row-major colors.
///
/// Accepts a flat array of packed colors, a nested `[[row], ...]` array, an
/// object with a `pixels` array, or a JSON string holding any of those (the
/// socket server sends its canvas pre-serialized).
///
/// # Errors
///
/// Returns [`GridError::SnapshotFormat`] when the value is none of the above
/// or any element is not a color.
pub fn parse_snapshot(value: &Value) -> Result<Vec<Color>, GridError> {
    match value {
        Value::String(raw) => {
            let inner = serde_json::from_str::<Value>(raw)
                .map_err(|e| GridError::SnapshotFormat(e.to_string()))?;
            if inner.is_string() {
                return Err(GridError::SnapshotFormat("doubly encoded snapshot".to_owned()));
            }
            parse_snapshot(&inner)
        }
        Value::Object(map) => match map.get("pixels") {
            Some(pixels) if !pixels.is_object() => parse_snapshot(pixels),
            _ => Err(GridError::SnapshotFormat("missing `pixels` array".to_owned())),
        },
        Value::Array(items) => {
            let nested = items.first().is_some_and(Value::is_array);
            if nested {
                let mut out = Vec::new();
                for row in items {
                    let Some(row) = row.as_array() else {
                        return Err(GridError::SnapshotFormat("mixed rows and cells".to_owned()));
                    };
                    out.extend(parse_cells(row)?);
                }
                Ok(out)
            } else {
                parse_cells(items)
            }
        }
        other => Err(GridError::SnapshotFormat(format!("unexpected {}", kind_name(other)))),
    }
}

fn parse_cells(items: &[Value]) -> Result<Vec<Color>, GridError> {
    items
        .iter()
        .map(|item| {
            Color::deserialize(item).map_err(|e| GridError::SnapshotFormat(e.to_string()))
        })
        .collect()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
