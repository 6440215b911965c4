mod commands;
mod forms;
mod movement;
mod render;
mod store;
mod viewport;

#[cfg(test)]
mod tests;

use std::path::Path;

use editor_engine::{
    saturate_i32, ConsoleCommandSpec, ConsoleReply, DecodeCompletion, ImageDecoder, InputSnapshot,
    PointPx, PointerEvent, PointerEventKind, Rect, Scene, SceneCommand, Surface,
};
use tracing::{debug, info, warn};

use self::movement::SceneBounds;
use self::render::{DragOverlay, RenderPipeline};
use self::store::{BlockId, BlockPatch, SceneStore};
use self::viewport::ViewportMapper;
use super::config::{EditorConfig, EditorLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerRegion {
    Viewport,
    Minimap,
}

#[derive(Debug, Default)]
struct PointerState {
    dragged: Option<BlockId>,
    /// Scene coordinates of the press that started the drag.
    down_scene: PointPx,
    /// Latest pointer position inside the viewport; places the drag label.
    pointer_viewport: PointPx,
    minimap_armed: bool,
}

impl PointerState {
    fn button_down(&self) -> bool {
        self.dragged.is_some() || self.minimap_armed
    }
}

/// The editor as one `Scene`: owns the block store, the camera, the pointer
/// state, the pending image decodes and the render pipeline.
pub(crate) struct EditorScene {
    config: EditorConfig,
    layout: EditorLayout,
    store: SceneStore,
    mapper: ViewportMapper,
    pipeline: RenderPipeline,
    decoder: ImageDecoder,
    completions: Vec<DecodeCompletion>,
    pointer: PointerState,
    observed_revision: u64,
    dirty: bool,
}

impl EditorScene {
    pub(crate) fn new(config: EditorConfig) -> Self {
        let mapper = ViewportMapper::new(
            config.viewport_width,
            config.viewport_height,
            config.minimap_ratio,
        );
        Self {
            layout: config.layout(),
            pipeline: RenderPipeline::new(&config),
            store: SceneStore::new(),
            mapper,
            decoder: ImageDecoder::new(),
            completions: Vec::new(),
            pointer: PointerState::default(),
            observed_revision: 0,
            dirty: true,
            config,
        }
    }

    fn bounds(&self) -> SceneBounds {
        SceneBounds {
            width: i32::try_from(self.config.scene_width).unwrap_or(i32::MAX),
            height: i32::try_from(self.config.scene_height).unwrap_or(i32::MAX),
        }
    }

    fn region_at(&self, position: PointPx) -> Option<PointerRegion> {
        if contains(self.layout.viewport, position) {
            Some(PointerRegion::Viewport)
        } else if contains(self.layout.minimap, position) {
            Some(PointerRegion::Minimap)
        } else {
            None
        }
    }

    fn pointer_down(&mut self, position: PointPx) {
        match self.region_at(position) {
            Some(PointerRegion::Viewport) => {
                let local = local_to(self.layout.viewport, position);
                let scene_point = self.mapper.viewport_to_scene(local);
                match self.store.hit_test(scene_point.x, scene_point.y) {
                    Some(id) => {
                        self.store.select(Some(id));
                        self.pointer.dragged = Some(id);
                        self.pointer.down_scene = scene_point;
                        self.pointer.pointer_viewport = local;
                        debug!(id = id.0, x = scene_point.x, y = scene_point.y, "drag_started");
                    }
                    None => {
                        self.store.select(None);
                    }
                }
            }
            Some(PointerRegion::Minimap) => {
                self.pointer.minimap_armed = true;
            }
            None => {}
        }
    }

    fn pointer_moved(&mut self, position: PointPx) {
        if let Some(id) = self.pointer.dragged {
            if self.region_at(position) != Some(PointerRegion::Viewport) {
                self.release_pointer();
                return;
            }
            let local = local_to(self.layout.viewport, position);
            let scene_point = self.mapper.viewport_to_scene(local);
            self.pointer.pointer_viewport = local;
            self.dirty = true;
            let Some(block) = self.store.block(id) else {
                return;
            };
            let patch = BlockPatch::moved_to(
                centered_start(scene_point.x, block.rect.w),
                centered_start(scene_point.y, block.rect.h),
            );
            self.store.update_block(id, patch);
        } else if self.pointer.minimap_armed {
            if self.region_at(position) != Some(PointerRegion::Minimap) {
                self.release_pointer();
                return;
            }
            let local = local_to(self.layout.minimap, position);
            if self.mapper.set_from_minimap(local) {
                self.dirty = true;
            }
        }
    }

    fn release_pointer(&mut self) {
        if let Some(id) = self.pointer.dragged.take() {
            debug!(
                id = id.0,
                from_x = self.pointer.down_scene.x,
                from_y = self.pointer.down_scene.y,
                "drag_finished"
            );
            self.dirty = true;
        }
        self.pointer.minimap_armed = false;
    }

    fn drag_overlay(&self) -> Option<DragOverlay> {
        self.pointer.dragged.map(|block| DragOverlay {
            block,
            pointer_viewport: self.pointer.pointer_viewport,
        })
    }

    /// Re-runs camera follow and raises the redraw flag after any change.
    fn sync_after_change(&mut self) {
        let revision = self.store.revision();
        if revision != self.observed_revision {
            self.observed_revision = revision;
            self.dirty = true;
        }
        if let Some(locked) = self.store.camera_locked_block() {
            let target = locked.rect;
            if self.mapper.follow(&target) {
                self.dirty = true;
            }
        }
    }

    fn request_texture(&mut self, id: BlockId, path: &Path) -> bool {
        if self.store.block(id).is_none() {
            debug!(id = id.0, "texture_target_missing");
            return false;
        }
        let ticket = self.decoder.request(path);
        info!(id = id.0, ticket = ticket.0, path = %path.display(), "texture_requested");
        self.store.set_texture_pending(id, ticket)
    }

    fn request_background(&mut self, path: &Path) {
        let ticket = self.decoder.request(path);
        info!(ticket = ticket.0, path = %path.display(), "background_requested");
        self.store.set_background_pending(ticket);
    }

    fn apply_completion(&mut self, completion: DecodeCompletion) {
        let DecodeCompletion {
            ticket,
            path,
            result,
        } = completion;
        let bitmap = match result {
            Ok(bitmap) => Some(bitmap),
            Err(error) => {
                warn!(ticket = ticket.0, path = %path.display(), error = %error, "texture_decode_failed");
                None
            }
        };
        if self.store.complete_texture(ticket, bitmap.clone()) {
            return;
        }
        if !self.store.complete_background(ticket, bitmap) {
            debug!(ticket = ticket.0, path = %path.display(), "decode_completion_stale");
        }
    }

    fn apply_pending_completions(&mut self) -> bool {
        self.decoder.drain_completions_into(&mut self.completions);
        if self.completions.is_empty() {
            return false;
        }
        let completions = std::mem::take(&mut self.completions);
        for completion in completions {
            self.apply_completion(completion);
        }
        self.sync_after_change();
        true
    }

    /// Blocks until every requested decode has been applied.
    #[cfg(test)]
    fn wait_for_decodes(&mut self) {
        while self.decoder.in_flight() > 0 {
            match self.decoder.recv_timeout(std::time::Duration::from_secs(5)) {
                Some(completion) => self.apply_completion(completion),
                None => break,
            }
        }
        self.sync_after_change();
    }
}

impl Scene for EditorScene {
    fn load(&mut self) {
        self.dirty = true;
        info!(
            scene_width = self.config.scene_width,
            scene_height = self.config.scene_height,
            "editor_ready"
        );
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if let Some(direction) = movement::held_direction(input.keys()) {
            let step = i32::try_from(self.config.movement_step).unwrap_or(i32::MAX);
            let bounds = self.bounds();
            movement::apply_movement(&mut self.store, direction, step, bounds);
        }
        self.sync_after_change();
        SceneCommand::None
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerEventKind::Down if event.is_primary() => self.pointer_down(event.position),
            PointerEventKind::Down => {}
            PointerEventKind::Move => self.pointer_moved(event.position),
            PointerEventKind::Up | PointerEventKind::Leave => {
                if self.pointer.button_down() {
                    self.release_pointer();
                }
            }
        }
        self.sync_after_change();
    }

    fn handle_file_dropped(&mut self, path: &Path) {
        match self.store.selected() {
            Some(id) => {
                self.request_texture(id, path);
            }
            None => self.request_background(path),
        }
        self.sync_after_change();
    }

    fn poll_background_work(&mut self) -> bool {
        self.apply_pending_completions()
    }

    fn console_commands(&self) -> Vec<ConsoleCommandSpec> {
        commands::EDITOR_COMMANDS.to_vec()
    }

    fn execute_console_command(&mut self, name: &str, args: &[String]) -> ConsoleReply {
        let reply = self.run_command(name, args);
        self.sync_after_change();
        reply
    }

    fn render(&mut self, surface: &mut Surface) {
        let drag = self.drag_overlay();
        self.pipeline.render(&self.store, &self.mapper, drag, surface);
        self.dirty = false;
    }

    fn needs_redraw(&self) -> bool {
        self.dirty
    }

    fn unload(&mut self) {
        info!(
            blocks = self.store.blocks().len(),
            entities = self.store.entities().len(),
            pending_decodes = self.decoder.in_flight(),
            "editor_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        let offset = self.mapper.offset();
        Some(format!(
            "{} | {} blocks | view {},{}",
            self.config.window_title,
            self.store.blocks().len(),
            offset.x,
            offset.y
        ))
    }
}

/// Half-open containment for window regions.
fn contains(region: Rect, position: PointPx) -> bool {
    position.x >= region.x
        && position.x < region.right()
        && position.y >= region.y
        && position.y < region.bottom()
}

fn local_to(region: Rect, position: PointPx) -> PointPx {
    PointPx::new(position.x - region.x, position.y - region.y)
}

/// `floor(center - size / 2)`
fn centered_start(center: i32, size: i32) -> i32 {
    saturate_i32((2 * i64::from(center) - i64::from(size)).div_euclid(2))
}
