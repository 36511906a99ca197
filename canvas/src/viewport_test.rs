use super::*;

fn viewport() -> Viewport {
    Viewport::new(500, 500, 10)
}

#[test]
fn screen_size_scales_by_pixel_size() {
    assert_eq!(viewport().screen_size(), (5000, 5000));
}

#[test]
fn cell_at_floors_screen_coordinates() {
    let vp = viewport();
    assert_eq!(vp.cell_at(Point::new(0.0, 0.0)), Some((0, 0)));
    assert_eq!(vp.cell_at(Point::new(9.99, 10.0)), Some((0, 1)));
    assert_eq!(vp.cell_at(Point::new(35.5, 42.0)), Some((3, 4)));
    assert_eq!(vp.cell_at(Point::new(4999.9, 4999.9)), Some((499, 499)));
}

#[test]
fn cell_at_rejects_points_off_canvas() {
    let vp = viewport();
    assert_eq!(vp.cell_at(Point::new(-0.1, 5.0)), None);
    assert_eq!(vp.cell_at(Point::new(5000.0, 5.0)), None);
    assert_eq!(vp.cell_at(Point::new(5.0, f64::NAN)), None);
}

#[test]
fn cell_rect_covers_one_cell() {
    assert_eq!(viewport().cell_rect(3, 4), Rect { x: 30, y: 40, width: 10, height: 10 });
}

#[test]
fn zero_pixel_size_is_clamped() {
    let vp = Viewport::new(2, 2, 0);
    assert_eq!(vp.pixel_size, 1);
    assert_eq!(vp.cell_at(Point::new(1.5, 0.0)), Some((1, 0)));
}

#[test]
fn huge_geometry_saturates_instead_of_overflowing() {
    let vp = Viewport::new(u32::MAX, 3, u32::MAX);
    assert_eq!(vp.screen_size(), (u32::MAX, u32::MAX));
    assert_eq!(vp.cell_rect(2, 0), Rect { x: u32::MAX, y: 0, width: u32::MAX, height: u32::MAX });
}
