use editor_engine::{saturate_i32, PointPx, Rect};

/// Where the viewport looks into the scene, and how minimap pixels map onto it.
///
/// The offset is never clamped: following a block near the scene edge shows
/// the blank area past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ViewportMapper {
    offset: PointPx,
    width: i32,
    height: i32,
    minimap_ratio: i32,
}

impl ViewportMapper {
    pub(crate) fn new(width: u32, height: u32, minimap_ratio: u32) -> Self {
        Self {
            offset: PointPx::default(),
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            minimap_ratio: i32::try_from(minimap_ratio.max(1)).unwrap_or(i32::MAX),
        }
    }

    pub(crate) fn offset(&self) -> PointPx {
        self.offset
    }

    pub(crate) fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// The scene rectangle currently shown.
    pub(crate) fn view_rect(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.width, self.height)
    }

    /// Centers the viewport on `target`; returns whether the offset moved.
    pub(crate) fn follow(&mut self, target: &Rect) -> bool {
        let x = centered_origin(target.x, target.w, self.width);
        let y = centered_origin(target.y, target.h, self.height);
        self.set_offset(PointPx::new(x, y))
    }

    /// Minimap pixel coordinates scaled up by the ratio become the new offset.
    pub(crate) fn set_from_minimap(&mut self, minimap_local: PointPx) -> bool {
        self.set_offset(PointPx::new(
            minimap_local.x.saturating_mul(self.minimap_ratio),
            minimap_local.y.saturating_mul(self.minimap_ratio),
        ))
    }

    pub(crate) fn viewport_to_scene(&self, viewport_local: PointPx) -> PointPx {
        viewport_local.offset_by(self.offset)
    }

    /// The viewport outline in minimap pixels.
    pub(crate) fn minimap_indicator(&self) -> Rect {
        Rect::new(
            self.offset.x.div_euclid(self.minimap_ratio),
            self.offset.y.div_euclid(self.minimap_ratio),
            self.width / self.minimap_ratio,
            self.height / self.minimap_ratio,
        )
    }

    fn set_offset(&mut self, offset: PointPx) -> bool {
        if self.offset == offset {
            return false;
        }
        self.offset = offset;
        true
    }
}

/// `floor(start - viewport / 2 + size / 2)`
fn centered_origin(start: i32, size: i32, viewport: i32) -> i32 {
    let doubled = 2 * i64::from(start) + i64::from(size) - i64::from(viewport);
    saturate_i32(doubled.div_euclid(2))
}
