/// Axis-aligned rectangle in integer pixel space, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Saturates at `i32::MAX` for rectangles reaching past the pixel range.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }
}

/// Integer point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointPx {
    pub x: i32,
    pub y: i32,
}

impl PointPx {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, other: PointPx) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

/// Narrows a wide intermediate back to pixel space, pinning at the `i32` limits.
pub fn saturate_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Inclusive on every edge: a point on the right or bottom boundary is inside.
pub fn point_in_rect(rect: &Rect, x: i32, y: i32) -> bool {
    rect.x <= x && x <= rect.right() && rect.y <= y && y <= rect.bottom()
}

/// Strict overlap: rectangles that only share an edge do not overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_in_rect_includes_far_corner() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(point_in_rect(&rect, 10, 10));
        assert!(point_in_rect(&rect, 0, 0));
        assert!(!point_in_rect(&rect, 11, 5));
        assert!(!point_in_rect(&rect, 5, -1));
    }

    #[test]
    fn edge_touching_rects_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&b, &a));

        let shifted = Rect { x: 9, ..b };
        assert!(overlaps(&a, &shifted));
        assert!(overlaps(&shifted, &a));
    }

    #[test]
    fn vertical_edge_touch_is_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let below = Rect::new(0, 10, 10, 10);
        assert!(!overlaps(&a, &below));
        assert!(overlaps(&a, &below.translated(0, -1)));
    }

    #[test]
    fn boundary_point_is_inside_even_when_rects_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(point_in_rect(&a, 10, 5));
        assert!(point_in_rect(&b, 10, 5));
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn far_edges_saturate_at_the_pixel_range() {
        let far = Rect::new(2_147_483_000, 2_147_483_000, 1000, 1000);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(far.bottom(), i32::MAX);
        assert!(point_in_rect(&far, i32::MAX, 2_147_483_500));
        assert!(!point_in_rect(&far, 0, 0));
        assert!(overlaps(&far, &Rect::new(i32::MAX - 10, i32::MAX - 10, 5, 5)));
        assert_eq!(
            PointPx::new(i32::MAX - 1, i32::MIN + 1).offset_by(PointPx::new(5, -5)),
            PointPx::new(i32::MAX, i32::MIN)
        );
    }

    #[test]
    fn saturate_i32_pins_out_of_range_values() {
        assert_eq!(saturate_i32(-5), -5);
        assert_eq!(saturate_i32(i64::from(i32::MAX) * 2), i32::MAX);
        assert_eq!(saturate_i32(i64::from(i32::MIN) - 1), i32::MIN);
    }

    #[test]
    fn contained_rect_overlaps() {
        let outer = Rect::new(0, 0, 100, 100);
        let inner = Rect::new(40, 40, 5, 5);
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&inner, &outer));
    }
}
