use crate::app::geometry::{PointPx, Rect};
use crate::app::textures::Bitmap;

use super::text;

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Owned RGBA8 drawing target. Every primitive clips silently at the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.offset_of(x, y)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let Some(offset) = self.offset_of(x, y) {
            self.rgba[offset..offset + 4].copy_from_slice(&color);
        }
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.rgba.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let Some(clipped) = self.clip(rect) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let start = self.row_offset(y) + clipped.x as usize * 4;
            let end = start + clipped.w as usize * 4;
            for chunk in self.rgba[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&color);
            }
        }
    }

    /// One-pixel outline on the innermost ring of `rect`. Only the part of
    /// each edge that lands on the surface is visited.
    pub fn stroke_rect(&mut self, rect: Rect, color: [u8; 4]) {
        if rect.w <= 0 || rect.h <= 0 {
            return;
        }
        let Some(visible) = self.clip(rect) else {
            return;
        };
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        self.fill_rect(Rect::new(visible.x, rect.y, visible.w, 1), color);
        self.fill_rect(Rect::new(visible.x, bottom, visible.w, 1), color);
        self.fill_rect(Rect::new(rect.x, visible.y, 1, visible.h), color);
        self.fill_rect(Rect::new(right, visible.y, 1, visible.h), color);
    }

    /// Nearest-neighbour stretch of `bitmap` into `dest`. Fully transparent
    /// source pixels are skipped.
    pub fn draw_bitmap_scaled(&mut self, bitmap: &Bitmap, dest: Rect) {
        if bitmap.width() == 0 || bitmap.height() == 0 || dest.w <= 0 || dest.h <= 0 {
            return;
        }
        let Some(clipped) = self.clip(dest) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let src_y = scale_index(y, dest.y, dest.h, bitmap.height());
            for x in clipped.x..clipped.right() {
                let src_x = scale_index(x, dest.x, dest.w, bitmap.width());
                if let Some(color) = bitmap.pixel(src_x, src_y) {
                    if color[3] != 0 {
                        self.put_pixel(x, y, color);
                    }
                }
            }
        }
    }

    /// Repeats `bitmap` at its native size from the origin across the whole surface.
    pub fn tile_bitmap(&mut self, bitmap: &Bitmap) {
        let (tile_w, tile_h) = (bitmap.width(), bitmap.height());
        if tile_w == 0 || tile_h == 0 {
            return;
        }
        for y in 0..self.height {
            let src_y = y % tile_h;
            let row = self.row_offset(y as i32);
            for x in 0..self.width {
                if let Some(color) = bitmap.pixel(x % tile_w, src_y) {
                    let offset = row + x as usize * 4;
                    self.rgba[offset..offset + 4].copy_from_slice(&color);
                }
            }
        }
    }

    /// Nearest-neighbour copy of the whole `source` into `dest`.
    pub fn blit_scaled_from(&mut self, source: &Surface, dest: Rect) {
        if source.width == 0 || source.height == 0 || dest.w <= 0 || dest.h <= 0 {
            return;
        }
        let Some(clipped) = self.clip(dest) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let src_y = scale_index(y, dest.y, dest.h, source.height);
            let src_row = source.row_offset(src_y as i32);
            for x in clipped.x..clipped.right() {
                let src_x = scale_index(x, dest.x, dest.w, source.width);
                let src_offset = src_row + src_x as usize * 4;
                let dst_offset = self.row_offset(y) + x as usize * 4;
                self.rgba[dst_offset..dst_offset + 4]
                    .copy_from_slice(&source.rgba[src_offset..src_offset + 4]);
            }
        }
    }

    /// 1:1 copy of `region` of `source` to `dest`. Destination pixels whose
    /// source falls outside `source` are left as they were.
    pub fn blit_region_from(&mut self, source: &Surface, region: Rect, dest: PointPx) {
        let Some(src) = source.clip(region) else {
            return;
        };
        let shift_x = i64::from(dest.x) - i64::from(region.x);
        let shift_y = i64::from(dest.y) - i64::from(region.y);
        // A shifted origin outside i32 puts the whole region off this surface.
        let (Ok(moved_x), Ok(moved_y)) = (
            i32::try_from(i64::from(src.x) + shift_x),
            i32::try_from(i64::from(src.y) + shift_y),
        ) else {
            return;
        };
        let Some(dst) = self.clip(Rect::new(moved_x, moved_y, src.w, src.h)) else {
            return;
        };
        let row_bytes = dst.w as usize * 4;
        let src_x = (i64::from(dst.x) - shift_x) as usize;
        for y in dst.y..dst.bottom() {
            let src_y = (i64::from(y) - shift_y) as i32;
            let src_start = source.row_offset(src_y) + src_x * 4;
            let dst_start = self.row_offset(y) + dst.x as usize * 4;
            self.rgba[dst_start..dst_start + row_bytes]
                .copy_from_slice(&source.rgba[src_start..src_start + row_bytes]);
        }
    }

    pub fn draw_surface_at(&mut self, source: &Surface, at: PointPx) {
        self.blit_region_from(source, source.bounds(), at);
    }

    pub fn draw_text(&mut self, at: PointPx, text: &str, scale: i32, color: [u8; 4]) {
        text::draw_text(self, at.x, at.y, text, scale, color);
    }

    fn clip(&self, rect: Rect) -> Option<Rect> {
        let left = rect.x.max(0);
        let top = rect.y.max(0);
        let right = rect.right().min(self.width as i32);
        let bottom = rect.bottom().min(self.height as i32);
        (left < right && top < bottom).then(|| Rect::new(left, top, right - left, bottom - top))
    }

    fn row_offset(&self, y: i32) -> usize {
        y as usize * self.width as usize * 4
    }

    fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(self.row_offset(y) + x as usize * 4)
    }
}

/// Source index for destination pixel `pos` of a span starting at `dest_start`.
fn scale_index(pos: i32, dest_start: i32, dest_len: i32, src_len: u32) -> u32 {
    let offset = (i64::from(pos) - i64::from(dest_start)).max(0) as u128;
    let index = offset * u128::from(src_len) / dest_len.max(1) as u128;
    index.min(u128::from(src_len.saturating_sub(1))) as u32
}
