use serde_json::json;

use super::*;

const RED: Color = Color::new(0xFF_0000);

#[test]
fn filled_grid_has_width_times_height_cells() {
    let grid = Grid::filled(500, 500, Color::BLACK);
    assert_eq!(grid.cells().len(), 250_000);
    assert_eq!(grid.get(499, 499), Some(Color::BLACK));
}

#[test]
fn set_then_get_returns_color() {
    let mut grid = Grid::filled(4, 3, Color::WHITE);
    grid.set(3, 2, RED).expect("in bounds");
    assert_eq!(grid.get(3, 2), Some(RED));
    assert_eq!(grid.cells()[2 * 4 + 3], RED);
}

#[test]
fn set_same_value_is_accepted() {
    let mut grid = Grid::filled(2, 2, RED);
    assert!(grid.set(1, 1, RED).is_ok());
    assert_eq!(grid.get(1, 1), Some(RED));
}

#[test]
fn out_of_bounds_is_rejected_without_mutation() {
    let mut grid = Grid::filled(2, 2, Color::WHITE);
    let before = grid.clone();
    let err = grid.apply(&PixelUpdate::new(2, 0, RED)).expect_err("x == width");
    assert_eq!(err, GridError::OutOfBounds { x: 2, y: 0, width: 2, height: 2 });
    assert_eq!(grid, before);
    assert_eq!(grid.get(0, 2), None);
}

#[test]
fn replace_rejects_wrong_length_and_keeps_cells() {
    let mut grid = Grid::filled(2, 2, Color::WHITE);
    let err = grid.replace(vec![RED; 3]).expect_err("short snapshot");
    assert_eq!(err, GridError::SnapshotLength { expected: 4, actual: 3 });
    assert!(grid.cells().iter().all(|c| *c == Color::WHITE));
}

#[test]
fn from_cells_checks_length() {
    assert!(Grid::from_cells(2, 2, vec![RED; 4]).is_ok());
    assert!(Grid::from_cells(2, 2, vec![RED; 5]).is_err());
}

#[test]
fn pixel_update_deserializes_with_normalized_color() {
    let update: PixelUpdate =
        serde_json::from_value(json!({"x": 3, "y": 4, "color": 4_294_901_760_u64})).expect("update");
    assert_eq!(update, PixelUpdate::new(3, 4, RED));
}

#[test]
fn pixel_update_rejects_negative_coordinates() {
    let result = serde_json::from_value::<PixelUpdate>(json!({"x": -1, "y": 0, "color": 0}));
    assert!(result.is_err());
}

#[test]
fn pixel_update_serializes_packed_color() {
    let value = serde_json::to_value(PixelUpdate::new(1, 2, RED)).expect("serialize");
    assert_eq!(value, json!({"x": 1, "y": 2, "color": 16_711_680}));
}

#[test]
fn parse_snapshot_flat_array() {
    let cells = parse_snapshot(&json!([0, 16_711_680, -1, 4_294_967_295_u64])).expect("flat");
    assert_eq!(cells, vec![Color::BLACK, RED, Color::WHITE, Color::WHITE]);
}

#[test]
fn parse_snapshot_nested_rows_are_row_major() {
    let cells = parse_snapshot(&json!([[1, 2], [3, 4]])).expect("nested");
    let packed: Vec<u32> = cells.iter().map(|c| c.packed()).collect();
    assert_eq!(packed, vec![1, 2, 3, 4]);
}

#[test]
fn parse_snapshot_accepts_json_encoded_string_and_pixels_object() {
    let from_string = parse_snapshot(&json!("[[4294967295, 0]]")).expect("string");
    assert_eq!(from_string, vec![Color::WHITE, Color::BLACK]);

    let from_object = parse_snapshot(&json!({"pixels": [255]})).expect("object");
    assert_eq!(from_object, vec![Color::new(0xFF)]);
}

#[test]
fn parse_snapshot_rejects_malformed_payloads() {
    assert!(matches!(parse_snapshot(&json!(42)), Err(GridError::SnapshotFormat(_))));
    assert!(matches!(parse_snapshot(&json!({"cells": []})), Err(GridError::SnapshotFormat(_))));
    assert!(matches!(parse_snapshot(&json!([[1], 2])), Err(GridError::SnapshotFormat(_))));
    assert!(matches!(parse_snapshot(&json!([1, "nope"])), Err(GridError::SnapshotFormat(_))));
    assert!(matches!(parse_snapshot(&json!("not json")), Err(GridError::SnapshotFormat(_))));
}
