use editor_engine::{
    glyph_advance_px, line_advance_px, PointPx, Rect, Surface, BLACK, GLYPH_HEIGHT, WHITE,
};

use super::store::{Block, BlockId, SceneStore, TextureState};
use super::viewport::ViewportMapper;
use crate::app::config::{EditorConfig, EditorLayout};

const INDICATOR_COLOR: [u8; 4] = [255, 0, 0, 255];
const WINDOW_BACKGROUND: [u8; 4] = [64, 64, 64, 255];
const PANEL_BACKGROUND: [u8; 4] = [232, 232, 232, 255];
const PANEL_TEXT_COLOR: [u8; 4] = [24, 24, 24, 255];
const PANEL_PADDING_PX: i32 = 6;
const PANEL_TEXT_SCALE: i32 = 2;
const LABEL_TEXT_SCALE: i32 = 2;
const LABEL_LEFT_SHIFT_PX: i32 = 80;

/// Block being dragged and where the pointer sits inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DragOverlay {
    pub(crate) block: BlockId,
    pub(crate) pointer_viewport: PointPx,
}

/// Scene, minimap and viewport surfaces, redrawn together and then composed
/// into the window framebuffer next to the block list panel.
pub(crate) struct RenderPipeline {
    layout: EditorLayout,
    scene: Surface,
    minimap: Surface,
    viewport: Surface,
}

impl RenderPipeline {
    pub(crate) fn new(config: &EditorConfig) -> Self {
        let layout = config.layout();
        let (minimap_w, minimap_h) = config.minimap_size();
        Self {
            layout,
            scene: Surface::new(config.scene_width, config.scene_height),
            minimap: Surface::new(minimap_w, minimap_h),
            viewport: Surface::new(config.viewport_width, config.viewport_height),
        }
    }

    pub(crate) fn render(
        &mut self,
        store: &SceneStore,
        mapper: &ViewportMapper,
        drag: Option<DragOverlay>,
        out: &mut Surface,
    ) {
        draw_scene(&mut self.scene, store, drag, mapper.size());
        draw_minimap(&mut self.minimap, &self.scene, mapper.minimap_indicator());
        draw_viewport(&mut self.viewport, &self.scene, mapper.view_rect());

        out.clear(WINDOW_BACKGROUND);
        out.draw_surface_at(&self.viewport, origin_of(self.layout.viewport));
        out.draw_surface_at(&self.minimap, origin_of(self.layout.minimap));
        draw_block_panel(out, self.layout.panel, store);
    }

    #[cfg(test)]
    pub(crate) fn scene_surface(&self) -> &Surface {
        &self.scene
    }

    #[cfg(test)]
    pub(crate) fn minimap_surface(&self) -> &Surface {
        &self.minimap
    }

    #[cfg(test)]
    pub(crate) fn viewport_surface(&self) -> &Surface {
        &self.viewport
    }
}

/// Background, every block in collection order, then the drag and selection
/// outlines on top.
pub(crate) fn draw_scene(
    surface: &mut Surface,
    store: &SceneStore,
    drag: Option<DragOverlay>,
    viewport_size: (i32, i32),
) {
    match store.background() {
        Some(background) => {
            surface.clear(WHITE);
            surface.tile_bitmap(background);
        }
        None => surface.clear(WHITE),
    }

    for block in store.blocks() {
        draw_block(surface, block);
    }

    if let Some(drag) = drag {
        if let Some(block) = store.block(drag.block) {
            surface.stroke_rect(block.rect, BLACK);
            let label = format!("({}, {})", block.rect.x, block.rect.y);
            let at = label_origin(block.rect, drag.pointer_viewport, viewport_size);
            surface.draw_text(at, &label, LABEL_TEXT_SCALE, BLACK);
        }
    }

    if let Some(block) = store.selected().and_then(|id| store.block(id)) {
        surface.stroke_rect(block.rect, BLACK);
    }
}

fn draw_block(surface: &mut Surface, block: &Block) {
    match &block.texture {
        TextureState::None => surface.fill_rect(block.rect, block.color.rgba()),
        TextureState::Pending(_) => {}
        TextureState::Loaded(bitmap) => surface.draw_bitmap_scaled(bitmap, block.rect),
    }
}

/// Top-left of the drag label. The label sits past the block's right edge, or
/// left of the block when the pointer is in the right half of the viewport,
/// and above the block's bottom edge when the pointer is in the top half.
pub(crate) fn label_origin(block: Rect, pointer_viewport: PointPx, viewport_size: (i32, i32)) -> PointPx {
    let (viewport_w, viewport_h) = viewport_size;
    let x = if pointer_viewport.x < viewport_w / 2 {
        block.right()
    } else {
        block.x.saturating_sub(LABEL_LEFT_SHIFT_PX)
    };
    let baseline = if pointer_viewport.y < viewport_h / 2 {
        block.bottom()
    } else {
        block.y
    };
    PointPx::new(x, baseline.saturating_sub(GLYPH_HEIGHT * LABEL_TEXT_SCALE))
}

pub(crate) fn draw_minimap(minimap: &mut Surface, scene: &Surface, indicator: Rect) {
    minimap.clear(WHITE);
    let bounds = minimap.bounds();
    minimap.blit_scaled_from(scene, bounds);
    minimap.stroke_rect(indicator, INDICATOR_COLOR);
}

pub(crate) fn draw_viewport(viewport: &mut Surface, scene: &Surface, view: Rect) {
    viewport.clear(WHITE);
    viewport.blit_region_from(scene, view, PointPx::new(0, 0));
}

/// One line per block: flags (`C` controllable, `L` camera-locked,
/// `*` selected, `#` collision), id and name.
pub(crate) fn draw_block_panel(out: &mut Surface, panel: Rect, store: &SceneStore) {
    out.fill_rect(panel, PANEL_BACKGROUND);

    let lines = panel_lines(store, panel);
    let line_height = line_advance_px(PANEL_TEXT_SCALE);
    for (row, line) in lines.iter().enumerate() {
        let at = PointPx::new(
            panel.x + PANEL_PADDING_PX,
            panel.y + PANEL_PADDING_PX + row as i32 * line_height,
        );
        out.draw_text(at, line, PANEL_TEXT_SCALE, PANEL_TEXT_COLOR);
    }
}

pub(crate) fn panel_lines(store: &SceneStore, panel: Rect) -> Vec<String> {
    let max_chars = ((panel.w - 2 * PANEL_PADDING_PX) / glyph_advance_px(PANEL_TEXT_SCALE)).max(0) as usize;
    let max_rows = ((panel.h - 2 * PANEL_PADDING_PX) / line_advance_px(PANEL_TEXT_SCALE)).max(0) as usize;
    if max_rows == 0 {
        return Vec::new();
    }

    let blocks = store.blocks();
    let mut lines = vec![format!("BLOCKS {}", blocks.len())];
    let room = max_rows - 1;
    let shown = if blocks.len() > room {
        room.saturating_sub(1)
    } else {
        blocks.len()
    };
    for block in &blocks[..shown] {
        lines.push(block_line(block, store.selected() == Some(block.id)));
    }
    if shown < blocks.len() && room > 0 {
        lines.push(format!("+{} more", blocks.len() - shown));
    }

    lines
        .into_iter()
        .map(|line| line.chars().take(max_chars).collect())
        .collect()
}

fn block_line(block: &Block, selected: bool) -> String {
    let flag = |on: bool, mark: char| if on { mark } else { '-' };
    format!(
        "{}{}{}{} {} {}",
        flag(block.controllable, 'C'),
        flag(block.camera_locked, 'L'),
        flag(selected, '*'),
        flag(block.is_collision(), '#'),
        block.id,
        block.name
    )
}

fn origin_of(rect: Rect) -> PointPx {
    PointPx::new(rect.x, rect.y)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use editor_engine::{Bitmap, DecodeTicket};

    use super::*;
    use crate::app::editor::store::{BlockColor, BlockKind, NewBlock};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn small_config() -> EditorConfig {
        EditorConfig {
            scene_width: 100,
            scene_height: 100,
            viewport_width: 40,
            viewport_height: 30,
            ..EditorConfig::default()
        }
    }

    fn add(store: &mut SceneStore, rect: Rect, color: BlockColor) -> BlockId {
        store.add_block(NewBlock {
            name: "b".to_string(),
            rect,
            kind: BlockKind::Block,
            color,
        })
    }

    fn render(store: &SceneStore, mapper: &ViewportMapper) -> (RenderPipeline, Surface) {
        let config = small_config();
        let layout = config.layout();
        let mut pipeline = RenderPipeline::new(&config);
        let mut out = Surface::new(layout.framebuffer_width, layout.framebuffer_height);
        pipeline.render(store, mapper, None, &mut out);
        (pipeline, out)
    }

    #[test]
    fn later_blocks_draw_over_earlier_ones() {
        let mut store = SceneStore::new();
        add(&mut store, Rect::new(0, 0, 20, 20), BlockColor::Red);
        add(&mut store, Rect::new(10, 10, 20, 20), BlockColor::Blue);
        let (pipeline, _) = render(&store, &ViewportMapper::new(40, 30, 5));

        let scene = pipeline.scene_surface();
        assert_eq!(scene.pixel(5, 5), Some(RED));
        assert_eq!(scene.pixel(15, 15), Some(BLUE));
        assert_eq!(scene.pixel(50, 50), Some(WHITE));
    }

    #[test]
    fn pending_texture_hides_block_until_loaded() {
        let mut store = SceneStore::new();
        let id = add(&mut store, Rect::new(0, 0, 10, 10), BlockColor::Red);
        store.set_texture_pending(id, DecodeTicket(1));
        let mapper = ViewportMapper::new(40, 30, 5);

        let (pipeline, _) = render(&store, &mapper);
        assert_eq!(pipeline.scene_surface().pixel(4, 4), Some(WHITE));

        let green = Arc::new(Bitmap::solid(2, 2, [0, 255, 0, 255]));
        store.complete_texture(DecodeTicket(1), Some(green));
        let (pipeline, _) = render(&store, &mapper);
        assert_eq!(pipeline.scene_surface().pixel(4, 4), Some([0, 255, 0, 255]));
    }

    #[test]
    fn background_tiles_under_blocks() {
        let mut store = SceneStore::new();
        let mut rgba = Vec::new();
        for color in [[1, 1, 1, 255], [2, 2, 2, 255]] {
            rgba.extend_from_slice(&color);
        }
        let tile = Bitmap::from_rgba(2, 1, rgba).expect("tile");
        store.set_background_pending(DecodeTicket(3));
        store.complete_background(DecodeTicket(3), Some(Arc::new(tile)));

        let (pipeline, _) = render(&store, &ViewportMapper::new(40, 30, 5));
        let scene = pipeline.scene_surface();
        assert_eq!(scene.pixel(0, 0), Some([1, 1, 1, 255]));
        assert_eq!(scene.pixel(1, 7), Some([2, 2, 2, 255]));
        assert_eq!(scene.pixel(98, 99), Some([1, 1, 1, 255]));
    }

    #[test]
    fn selected_block_gets_black_outline() {
        let mut store = SceneStore::new();
        let id = add(&mut store, Rect::new(10, 10, 10, 10), BlockColor::Red);
        store.select(Some(id));
        let (pipeline, _) = render(&store, &ViewportMapper::new(40, 30, 5));
        let scene = pipeline.scene_surface();
        assert_eq!(scene.pixel(10, 10), Some(BLACK));
        assert_eq!(scene.pixel(19, 15), Some(BLACK));
        assert_eq!(scene.pixel(15, 15), Some(RED));
    }

    #[test]
    fn minimap_shows_indicator_at_scaled_offset() {
        let store = SceneStore::new();
        let mut mapper = ViewportMapper::new(40, 30, 5);
        mapper.set_from_minimap(PointPx::new(4, 6));
        let (pipeline, _) = render(&store, &mapper);

        let minimap = pipeline.minimap_surface();
        assert_eq!((minimap.width(), minimap.height()), (20, 20));
        assert_eq!(minimap.pixel(4, 6), Some(INDICATOR_COLOR));
        assert_eq!(minimap.pixel(4 + 7, 6 + 5), Some(INDICATOR_COLOR));
        assert_eq!(minimap.pixel(6, 8), Some(WHITE));
    }

    #[test]
    fn viewport_is_a_one_to_one_slice_with_white_outside_scene() {
        let mut store = SceneStore::new();
        add(&mut store, Rect::new(80, 80, 20, 20), BlockColor::Blue);
        let mut mapper = ViewportMapper::new(40, 30, 5);
        mapper.set_from_minimap(PointPx::new(15, 15));
        let (pipeline, out) = render(&store, &mapper);

        let viewport = pipeline.viewport_surface();
        assert_eq!(viewport.pixel(5, 5), Some(BLUE));
        assert_eq!(viewport.pixel(30, 5), Some(WHITE));
        assert_eq!(out.pixel(5, 5), Some(BLUE));
    }

    #[test]
    fn window_composes_minimap_right_of_viewport() {
        let mut store = SceneStore::new();
        add(&mut store, Rect::new(0, 0, 100, 100), BlockColor::Blue);
        let (_, out) = render(&store, &ViewportMapper::new(40, 30, 5));
        let layout = small_config().layout();
        assert_eq!(out.pixel(layout.minimap.x + 10, 10), Some(BLUE));
        assert_eq!(out.pixel(layout.viewport.right() + 2, 2), Some(WINDOW_BACKGROUND));
    }

    #[test]
    fn drag_label_switches_sides_by_pointer_quadrant() {
        let block = Rect::new(200, 100, 50, 40);
        let text_h = GLYPH_HEIGHT * LABEL_TEXT_SCALE;
        let viewport = (800, 600);
        assert_eq!(
            label_origin(block, PointPx::new(10, 10), viewport),
            PointPx::new(250, 140 - text_h)
        );
        assert_eq!(
            label_origin(block, PointPx::new(10, 500), viewport),
            PointPx::new(250, 100 - text_h)
        );
        assert_eq!(
            label_origin(block, PointPx::new(700, 10), viewport),
            PointPx::new(120, 140 - text_h)
        );
        assert_eq!(
            label_origin(block, PointPx::new(700, 500), viewport),
            PointPx::new(120, 100 - text_h)
        );
    }

    #[test]
    fn dragged_block_gets_outline_and_label() {
        let mut store = SceneStore::new();
        let id = add(&mut store, Rect::new(10, 40, 20, 20), BlockColor::Red);
        let mut scene = Surface::new(100, 100);
        let drag = DragOverlay {
            block: id,
            pointer_viewport: PointPx::new(1, 1),
        };
        draw_scene(&mut scene, &store, Some(drag), (40, 30));
        assert_eq!(scene.pixel(10, 40), Some(BLACK));
        let label_top = 60 - GLYPH_HEIGHT * LABEL_TEXT_SCALE;
        let label_pixels = (30..60)
            .flat_map(|x| (label_top..60).map(move |y| (x, y)))
            .filter(|&(x, y)| scene.pixel(x, y) == Some(BLACK))
            .count();
        assert!(label_pixels > 0);
    }

    #[test]
    fn panel_lists_flags_and_truncates() {
        let mut store = SceneStore::new();
        let a = add(&mut store, Rect::new(0, 0, 1, 1), BlockColor::Red);
        store.add_block(NewBlock {
            name: "wall".to_string(),
            rect: Rect::new(0, 0, 1, 1),
            kind: BlockKind::Collision,
            color: BlockColor::Blue,
        });
        store.set_controllable(a, true);
        store.set_camera_locked(a, true);
        store.select(Some(a));

        let lines = panel_lines(&store, Rect::new(0, 0, 400, 200));
        assert_eq!(lines, vec!["BLOCKS 2", "CL*- 0 b", "---# 1 wall"]);

        for _ in 0..20 {
            add(&mut store, Rect::new(0, 0, 1, 1), BlockColor::Red);
        }
        let lines = panel_lines(&store, Rect::new(0, 0, 400, 12 + 14 * 4));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "+20 more");

        let narrow = panel_lines(&store, Rect::new(0, 0, 12 + 8 * 3, 100));
        assert!(narrow.iter().all(|line| line.chars().count() <= 3));
    }
}
